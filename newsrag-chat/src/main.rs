mod session;
mod settings;

use std::sync::Arc;

use anyhow::Context;
use newsrag::{
    Document, EmbeddingProvider, ExtractiveGenerationProvider, GenerationProvider,
    HashingEmbeddingProvider, RagConfig, RagPipeline, load_corpus,
};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::session::Session;
use crate::settings::{Backend, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let settings = Settings::from_env()?;
    let corpus = load_corpus(&settings.corpus_path)
        .with_context(|| format!("cannot load corpus {}", settings.corpus_path.display()))?;

    let pipeline = Arc::new(build_pipeline(&settings, corpus).await?);
    info!(documents = pipeline.len(), backend = ?settings.backend, "pipeline ready");

    let mut session = Session::new(settings.top_k);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    session::run(&pipeline, &mut session, stdin, &mut stdout).await
}

async fn build_pipeline(
    settings: &Settings,
    corpus: Vec<Document>,
) -> anyhow::Result<RagPipeline> {
    let config = RagConfig::builder()
        .top_k(settings.top_k)
        .max_new_tokens(settings.max_new_tokens)
        .build()?;

    let (embedder, generator) = providers(settings)?;
    let pipeline = RagPipeline::builder()
        .config(config)
        .embedding_provider(embedder)
        .generation_provider(generator)
        .build(corpus)
        .await?;
    Ok(pipeline)
}

type Providers = (Arc<dyn EmbeddingProvider>, Arc<dyn GenerationProvider>);

fn providers(settings: &Settings) -> anyhow::Result<Providers> {
    match settings.backend {
        Backend::Local => {
            let embedder: Arc<dyn EmbeddingProvider> =
                Arc::new(HashingEmbeddingProvider::default());
            let generator: Arc<dyn GenerationProvider> = Arc::new(ExtractiveGenerationProvider);
            Ok((embedder, generator))
        }
        Backend::OpenAI => openai_providers(settings),
    }
}

#[cfg(feature = "openai")]
fn openai_providers(settings: &Settings) -> anyhow::Result<Providers> {
    use newsrag::openai::{OpenAIEmbeddingProvider, OpenAIGenerationProvider};

    let api_key = settings.api_key.clone().context("OPENAI_API_KEY is not set")?;
    let mut embedder = OpenAIEmbeddingProvider::new(api_key.clone())?
        .with_base_url(&settings.base_url)
        .with_model(&settings.embedding_model);
    if let Some(dims) = settings.embedding_dimensions {
        embedder = embedder.with_dimensions(dims);
    }
    if let Some(width) = settings.embedding_width {
        embedder = embedder.with_expected_dimensions(width);
    }
    let generator = OpenAIGenerationProvider::new(api_key)?
        .with_base_url(&settings.base_url)
        .with_model(&settings.chat_model);
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(embedder);
    let generator: Arc<dyn GenerationProvider> = Arc::new(generator);
    Ok((embedder, generator))
}

#[cfg(not(feature = "openai"))]
fn openai_providers(_settings: &Settings) -> anyhow::Result<Providers> {
    anyhow::bail!("newsrag-chat was built without the `openai` feature")
}
