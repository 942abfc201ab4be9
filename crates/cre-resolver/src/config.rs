//! Resolver configuration

use crate::error::{ResolveError, ResolveResult};
use cre_cache::CacheConfig;
use serde::{Deserialize, Serialize};

/// Chunked filtering limits
///
/// Chunk size is `min(max(min_chunk, max_results * result_multiplier), max_chunk)`
/// when a result limit is set, `max_chunk` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Smallest chunk submitted when a result limit is set
    pub min_chunk: usize,
    /// Chunk size per requested result
    pub result_multiplier: usize,
    /// Largest chunk the store accepts safely
    pub max_chunk: usize,
}

impl ChunkConfig {
    /// Chunk size for a request limited to `max_results` (0 = unlimited)
    #[must_use]
    pub fn chunk_size(&self, max_results: usize) -> usize {
        let size = if max_results > 0 {
            self.min_chunk
                .max(max_results.saturating_mul(self.result_multiplier))
                .min(self.max_chunk)
        } else {
            self.max_chunk
        };
        size.max(1)
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            min_chunk: 100,
            result_multiplier: 2,
            max_chunk: 999,
        }
    }
}

/// Resolver configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Chunked filtering limits
    pub chunk: ChunkConfig,
    /// Relationship cache settings
    pub relationship_cache: CacheConfig,
}

impl ResolverConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With chunk limits
    #[inline]
    #[must_use]
    pub fn with_chunk(mut self, chunk: ChunkConfig) -> Self {
        self.chunk = chunk;
        self
    }

    /// With relationship cache settings
    #[inline]
    #[must_use]
    pub fn with_relationship_cache(mut self, cache: CacheConfig) -> Self {
        self.relationship_cache = cache;
        self
    }

    /// Parse TOML; absent keys take their defaults
    pub fn from_toml_str(source: &str) -> ResolveResult<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| ResolveError::configuration(format!("invalid resolver config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject limits that cannot produce a usable chunk
    pub fn validate(&self) -> ResolveResult<()> {
        if self.chunk.max_chunk == 0 {
            return Err(ResolveError::configuration("chunk.max_chunk must be positive"));
        }
        if self.chunk.min_chunk > self.chunk.max_chunk {
            return Err(ResolveError::configuration(format!(
                "chunk.min_chunk ({}) exceeds chunk.max_chunk ({})",
                self.chunk.min_chunk, self.chunk.max_chunk
            )));
        }
        if self.relationship_cache.category.trim().is_empty() {
            return Err(ResolveError::configuration(
                "relationship_cache.category must not be blank",
            ));
        }
        Ok(())
    }
}
