//! Interactive chat session over a built pipeline.

use std::fmt;
use std::io::Write;

use newsrag::{RagPipeline, parse_top_k};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info};

/// Shown instead of an answer when the pipeline fails.
pub const FAILURE_MESSAGE: &str =
    "Sorry, something went wrong while answering. Please try again.";

const HELP: &str = "Ask a question about the news, or use:
  /sources <question>  show the retrieved articles
  /k <n>               number of articles /sources lists
  /history             show this session
  /help                show this list
  /quit                exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Assistant => f.write_str("assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Ask(&'a str),
    Sources(&'a str),
    SetTopK(&'a str),
    History,
    Help,
    Quit,
    Empty,
}

pub fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Ask(line);
    };
    let (name, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    match name {
        "sources" => Command::Sources(arg.trim()),
        "k" => Command::SetTopK(arg.trim()),
        "history" => Command::History,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Help,
    }
}

/// Session-scoped history plus the `/sources` list size.
#[derive(Debug)]
pub struct Session {
    history: Vec<ConversationTurn>,
    sources_top_k: usize,
}

impl Session {
    pub fn new(sources_top_k: usize) -> Self {
        Self { history: Vec::new(), sources_top_k }
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Answer one question, recording both turns. Failures become [`FAILURE_MESSAGE`].
    pub async fn ask(&mut self, pipeline: &RagPipeline, query: &str) -> &str {
        self.history.push(ConversationTurn { role: Role::User, content: query.to_string() });

        let content = match pipeline.answer(query).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "failed to answer question");
                FAILURE_MESSAGE.to_string()
            }
        };

        self.history.push(ConversationTurn { role: Role::Assistant, content });
        &self.history[self.history.len() - 1].content
    }

    /// Handle one input line. Returns `false` when the session should end.
    pub async fn handle_line<W: Write>(
        &mut self,
        pipeline: &RagPipeline,
        line: &str,
        out: &mut W,
    ) -> std::io::Result<bool> {
        match parse_command(line) {
            Command::Empty => {}
            Command::Quit => return Ok(false),
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Ask(query) => {
                let answer = self.ask(pipeline, query).await;
                writeln!(out, "{answer}")?;
            }
            Command::History => {
                for turn in &self.history {
                    writeln!(out, "[{}] {}", turn.role, turn.content)?;
                }
            }
            Command::SetTopK(raw) => match parse_top_k(raw) {
                Ok(k) => {
                    self.sources_top_k = k;
                    writeln!(out, "/sources now lists {k} article(s)")?;
                }
                Err(e) => writeln!(out, "{e}")?,
            },
            Command::Sources("") => writeln!(out, "usage: /sources <question>")?,
            Command::Sources(query) => match pipeline
                .retrieve_scored(query, self.sources_top_k)
                .await
            {
                Ok(results) if results.is_empty() => writeln!(out, "(no articles)")?,
                Ok(results) => {
                    for (rank, result) in results.iter().enumerate() {
                        writeln!(
                            out,
                            "{}. [distance={:.4}] #{} {}",
                            rank + 1,
                            result.distance,
                            result.document.index,
                            result.document.text
                        )?;
                    }
                }
                Err(e) => {
                    error!(error = %e, "failed to retrieve sources");
                    writeln!(out, "{FAILURE_MESSAGE}")?;
                }
            },
        }
        Ok(true)
    }
}

/// Read questions line by line until EOF or `/quit`.
pub async fn run<R, W>(
    pipeline: &RagPipeline,
    session: &mut Session,
    reader: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "News Q&A over {} articles. Type /help for commands.", pipeline.len())?;
    let mut lines = reader.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if !session.handle_line(pipeline, &line, out).await? {
            break;
        }
    }
    info!(turns = session.history().len(), "chat session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use newsrag::{
        Document, ExtractiveGenerationProvider, GenerationProvider, GenerationRequest,
        HashingEmbeddingProvider, RagError,
    };

    use super::*;

    struct Unavailable;

    #[async_trait]
    impl GenerationProvider for Unavailable {
        async fn generate(&self, _request: &GenerationRequest) -> newsrag::Result<String> {
            Err(RagError::Generation { provider: "test".into(), message: "offline".into() })
        }
    }

    async fn pipeline(generator: Arc<dyn GenerationProvider>) -> RagPipeline {
        RagPipeline::builder()
            .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
            .generation_provider(generator)
            .build(Document::corpus([
                "The Olympics were held in Tokyo.",
                "An infrastructure bill was passed in Congress.",
            ]))
            .await
            .unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("  "), Command::Empty);
        assert_eq!(parse_command("Who won?"), Command::Ask("Who won?"));
        assert_eq!(parse_command("/sources  Tokyo "), Command::Sources("Tokyo"));
        assert_eq!(parse_command("/k 5"), Command::SetTopK("5"));
        assert_eq!(parse_command("/history"), Command::History);
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert_eq!(parse_command("/help"), Command::Help);
        assert_eq!(parse_command("/nope"), Command::Help);
    }

    #[tokio::test]
    async fn help_lists_every_command() {
        let pipeline = pipeline(Arc::new(ExtractiveGenerationProvider)).await;
        let mut session = Session::new(3);
        let mut out = Vec::new();

        assert!(session.handle_line(&pipeline, "/help", &mut out).await.unwrap());

        let printed = String::from_utf8(out).unwrap();
        for command in ["/sources", "/k", "/history", "/help", "/quit"] {
            assert!(printed.contains(command), "{command} missing from help");
        }
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn answers_are_recorded_in_history() {
        let pipeline = pipeline(Arc::new(ExtractiveGenerationProvider)).await;
        let mut session = Session::new(3);

        let answer = session.ask(&pipeline, "Tokyo Olympics").await.to_string();
        assert_eq!(answer, "The Olympics were held in Tokyo.");
        assert_eq!(
            session.history(),
            [
                ConversationTurn { role: Role::User, content: "Tokyo Olympics".into() },
                ConversationTurn { role: Role::Assistant, content: answer },
            ]
        );
    }

    #[tokio::test]
    async fn failures_show_generic_message_and_session_continues() {
        let pipeline = pipeline(Arc::new(Unavailable)).await;
        let mut session = Session::new(3);
        let mut out = Vec::new();

        assert!(session.handle_line(&pipeline, "Tokyo?", &mut out).await.unwrap());
        assert!(session.handle_line(&pipeline, "Congress?", &mut out).await.unwrap());

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.matches(FAILURE_MESSAGE).count(), 2);
        assert_eq!(session.history().len(), 4);
    }

    #[tokio::test]
    async fn run_reads_until_quit() {
        let pipeline = pipeline(Arc::new(ExtractiveGenerationProvider)).await;
        let mut session = Session::new(1);
        let mut out = Vec::new();
        let input: &[u8] = b"/k 0\n/sources Congress bill\n\nTokyo Olympics\n/quit\nignored\n";

        run(&pipeline, &mut session, input, &mut out).await.unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("top_k must be positive"));
        assert!(printed.contains("1. [distance="));
        assert!(printed.contains("#1 An infrastructure bill was passed in Congress."));
        assert!(printed.contains("The Olympics were held in Tokyo."));
        assert_eq!(session.history().len(), 2);
    }
}
