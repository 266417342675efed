//! Corpus loading from flat, line-per-document text files.

use std::fs;
use std::path::Path;

use tracing::{error, info};

use crate::document::Document;
use crate::error::{RagError, Result};

/// Load a corpus file with one document per non-empty line.
///
/// Lines are trimmed; blank lines are skipped. Document positions follow
/// the order of the remaining lines.
///
/// # Errors
///
/// Returns [`RagError::CorpusLoad`] if the file is missing, unreadable, or
/// not valid UTF-8. An empty file yields an empty corpus.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let path_str = path.display().to_string();

    let bytes = fs::read(path).map_err(|e| {
        error!(path = %path_str, error = %e, "failed to read corpus");
        RagError::CorpusLoad { path: path_str.clone(), message: e.to_string() }
    })?;

    let text = String::from_utf8(bytes).map_err(|e| {
        error!(path = %path_str, error = %e, "corpus is not valid UTF-8");
        RagError::CorpusLoad { path: path_str.clone(), message: format!("invalid UTF-8: {e}") }
    })?;

    let documents = parse_corpus(&text);
    info!(path = %path_str, document_count = documents.len(), "loaded corpus");
    Ok(documents)
}

/// Split in-memory text into documents, one per non-empty trimmed line.
pub fn parse_corpus(text: &str) -> Vec<Document> {
    Document::corpus(text.lines().map(str::trim).filter(|line| !line.is_empty()))
}
