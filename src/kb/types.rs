use serde::{Deserialize, Serialize};

/// A curated Q&A fact: keywords for matching, a prose answer, and the
/// canonical link to the official page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbEntry {
    pub title: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub answer: String,
    pub url: String,
}

/// An unstructured passage of a larger document, used for coarse
/// substring matching when no curated entry exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbChunk {
    pub text: String,
    pub url: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// One retrievable knowledge-base unit.
#[derive(Debug, Clone)]
pub enum KbUnit {
    Entry(KbEntry),
    Chunk(KbChunk),
}

impl KbUnit {
    pub fn url(&self) -> &str {
        match self {
            KbUnit::Entry(e) => &e.url,
            KbUnit::Chunk(c) => &c.url,
        }
    }

    /// Human-readable label: entry title, or the chunk's source (falling
    /// back to its URL).
    pub fn label(&self) -> &str {
        match self {
            KbUnit::Entry(e) => &e.title,
            KbUnit::Chunk(c) => c.source.as_deref().unwrap_or(&c.url),
        }
    }

    pub fn as_entry(&self) -> Option<&KbEntry> {
        match self {
            KbUnit::Entry(e) => Some(e),
            KbUnit::Chunk(_) => None,
        }
    }
}

/// Parsed KB document. A municipality ships either curated `entries`,
/// free-text `chunks` of its website, or both; `site` is the official
/// homepage used in degraded replies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub entries: Vec<KbEntry>,
    #[serde(default)]
    pub chunks: Vec<KbChunk>,
    #[serde(default)]
    pub site: Option<String>,
}

impl KnowledgeBase {
    /// All units in KB order: entries first, then chunks. Retrieval ties
    /// keep this order, so the KB file's ordering is meaningful.
    pub fn units(&self) -> Vec<KbUnit> {
        self.entries
            .iter()
            .cloned()
            .map(KbUnit::Entry)
            .chain(self.chunks.iter().cloned().map(KbUnit::Chunk))
            .collect()
    }
}
