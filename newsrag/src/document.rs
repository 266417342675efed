//! Data types for corpus documents and retrieval results.

use serde::{Deserialize, Serialize};

/// A single corpus entry: one non-empty line of the source text.
///
/// A document's identity is its `index`, the position it was loaded at.
/// The similarity index maps search hits back to documents through this
/// position, so corpus order must never change after loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Document {
    /// Position of the document in the loaded corpus.
    pub index: usize,
    /// The text content of the document.
    pub text: String,
}

impl Document {
    /// Create a document at the given corpus position.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self { index, text: text.into() }
    }

    /// Build an ordered corpus from plain strings, assigning positions `0..n`.
    pub fn corpus<I, S>(texts: I) -> Vec<Document>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts.into_iter().enumerate().map(|(index, text)| Document::new(index, text)).collect()
    }
}

/// A raw hit from the similarity index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Neighbor {
    /// Position of the matching vector in the index.
    pub position: usize,
    /// Distance to the query (lower is nearer).
    pub distance: f32,
}

/// A retrieved [`Document`] paired with its distance to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedDocument {
    /// The retrieved document.
    pub document: Document,
    /// The distance to the query (lower is more relevant).
    pub distance: f32,
}
