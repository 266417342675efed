//! Runtime settings read from environment variables.

use std::path::PathBuf;

use anyhow::{Context, bail};
use newsrag::parse_top_k;

/// Which model backends the chat uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Hashing embeddings and extractive answers; no network.
    Local,
    /// OpenAI-compatible HTTP endpoints.
    OpenAI,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub corpus_path: PathBuf,
    pub top_k: usize,
    pub max_new_tokens: usize,
    pub backend: Backend,
    pub base_url: String,
    pub embedding_model: String,
    pub embedding_dimensions: Option<usize>,
    pub embedding_width: Option<usize>,
    pub chat_model: String,
    pub api_key: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let top_k = parse_top_k(&get("NEWSRAG_TOP_K", "3")).context("invalid NEWSRAG_TOP_K")?;
        let max_new_tokens = get("NEWSRAG_MAX_NEW_TOKENS", "64")
            .trim()
            .parse::<usize>()
            .context("invalid NEWSRAG_MAX_NEW_TOKENS")?;

        let embedding_dimensions = lookup("NEWSRAG_EMBEDDING_DIMENSIONS")
            .map(|raw| raw.trim().parse::<usize>())
            .transpose()
            .context("invalid NEWSRAG_EMBEDDING_DIMENSIONS")?;
        let embedding_width = lookup("NEWSRAG_EMBEDDING_WIDTH")
            .map(|raw| raw.trim().parse::<usize>())
            .transpose()
            .context("invalid NEWSRAG_EMBEDDING_WIDTH")?;

        let backend = match get("NEWSRAG_BACKEND", "local").trim().to_ascii_lowercase().as_str() {
            "local" => Backend::Local,
            "openai" => Backend::OpenAI,
            other => bail!("unknown NEWSRAG_BACKEND '{other}' (expected 'local' or 'openai')"),
        };

        let api_key = lookup("OPENAI_API_KEY").filter(|key| !key.is_empty());
        if backend == Backend::OpenAI && api_key.is_none() {
            bail!("NEWSRAG_BACKEND=openai requires OPENAI_API_KEY");
        }

        Ok(Self {
            corpus_path: PathBuf::from(get("NEWSRAG_CORPUS", "data/news_sample.txt")),
            top_k,
            max_new_tokens,
            backend,
            base_url: get("NEWSRAG_BASE_URL", "https://api.openai.com/v1"),
            embedding_model: get("NEWSRAG_EMBEDDING_MODEL", "text-embedding-3-small"),
            embedding_dimensions,
            embedding_width,
            chat_model: get("NEWSRAG_CHAT_MODEL", "gpt-4o-mini"),
            api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_use_local_backend() {
        let settings = settings(&[]).unwrap();
        assert_eq!(settings.backend, Backend::Local);
        assert_eq!(settings.top_k, 3);
        assert_eq!(settings.max_new_tokens, 64);
        assert_eq!(settings.corpus_path, PathBuf::from("data/news_sample.txt"));
    }

    #[test]
    fn overrides_are_applied() {
        let settings = settings(&[
            ("NEWSRAG_TOP_K", "5"),
            ("NEWSRAG_BACKEND", "OpenAI"),
            ("OPENAI_API_KEY", "sk-test"),
            ("NEWSRAG_BASE_URL", "http://localhost:11434/v1"),
        ])
        .unwrap();
        assert_eq!(settings.top_k, 5);
        assert_eq!(settings.backend, Backend::OpenAI);
        assert_eq!(settings.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.base_url, "http://localhost:11434/v1");
        assert_eq!(settings.embedding_dimensions, None);
        assert_eq!(settings.embedding_width, None);
    }

    #[test]
    fn embedding_width_is_separate_from_requested_dimensions() {
        let settings = settings(&[("NEWSRAG_EMBEDDING_WIDTH", "768")]).unwrap();
        assert_eq!(settings.embedding_width, Some(768));
        assert_eq!(settings.embedding_dimensions, None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(settings(&[("NEWSRAG_TOP_K", "0")]).is_err());
        assert!(settings(&[("NEWSRAG_TOP_K", "-2")]).is_err());
        assert!(settings(&[("NEWSRAG_MAX_NEW_TOKENS", "lots")]).is_err());
        assert!(settings(&[("NEWSRAG_BACKEND", "gpu")]).is_err());
        assert!(settings(&[("NEWSRAG_EMBEDDING_DIMENSIONS", "wide")]).is_err());
        assert!(settings(&[("NEWSRAG_EMBEDDING_WIDTH", "")]).is_err());
        assert!(settings(&[("NEWSRAG_BACKEND", "openai")]).is_err());
    }
}
