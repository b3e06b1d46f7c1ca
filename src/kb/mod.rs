pub mod types;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use types::KnowledgeBase;

/// Why a KB snapshot could not be produced. Callers recover with a
/// generic reply; this never aborts the pipeline.
#[derive(Debug, Error)]
pub enum KbError {
    #[error("knowledge base file could not be read")]
    Read(#[source] std::io::Error),
    #[error("knowledge base file is not valid JSON")]
    Parse(#[source] serde_json::Error),
}

struct CachedKb {
    loaded_at: Instant,
    kb: Arc<KnowledgeBase>,
}

/// Loads the KB JSON file and hands out immutable snapshots. The parsed
/// document is cached for `ttl`, so edits to the file are picked up
/// without a restart while requests stay cheap.
pub struct KbStore {
    path: PathBuf,
    ttl: Duration,
    cache: tokio::sync::RwLock<Option<CachedKb>>,
}

impl KbStore {
    pub fn new(path: PathBuf, ttl: Duration) -> Self {
        Self {
            path,
            ttl,
            cache: tokio::sync::RwLock::new(None),
        }
    }

    /// A read-only snapshot of the KB for the duration of one request.
    pub async fn snapshot(&self) -> Result<Arc<KnowledgeBase>, KbError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.loaded_at.elapsed() < self.ttl {
                    return Ok(cached.kb.clone());
                }
            }
        }

        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(KbError::Read)?;
        let kb: KnowledgeBase = serde_json::from_str(&raw).map_err(KbError::Parse)?;
        let kb = Arc::new(kb);

        debug!(
            path = %self.path.display(),
            entries = kb.entries.len(),
            chunks = kb.chunks.len(),
            "knowledge base reloaded"
        );

        let mut cache = self.cache.write().await;
        *cache = Some(CachedKb {
            loaded_at: Instant::now(),
            kb: kb.clone(),
        });

        Ok(kb)
    }
}
