//! Layered configuration (§10.3).
//!
//! Defaults come from `mcb_domain::constants`; a TOML file overlays them,
//! then environment variables prefixed `MCB_` overlay the file, mirroring
//! the reference codebase's `figment`-based config crate. `Config::load`
//! validates the merged result before returning it.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use mcb_domain::constants::{
    self, CHUNK_FORCE_SPLIT_MULTIPLE, DEFAULT_CHUNK_OVERLAP_TOKENS, DEFAULT_CHUNK_TARGET_TOKENS,
    DEFAULT_CLASSIFIER_CONFIDENCE_CUTOFF, DEFAULT_CLASSIFIER_HEADER_LINES, DEFAULT_DENSE_BATCH_SIZE,
    DEFAULT_DOCUMENT_FAILURE_RATE_THRESHOLD, DEFAULT_EMBEDDING_BATCH_PARALLELISM, DEFAULT_FILE_CONCURRENCY,
    DEFAULT_MAX_RETRY_ATTEMPTS, DEFAULT_OCR_THRESHOLD_RELAXATION, DEFAULT_PROGRESS_BUS_BUFFER, DEFAULT_RETRY_BACKOFF_CEILING_SECS,
    DEFAULT_RRF_K, DEFAULT_SEGMENT_CONCURRENCY, DEFAULT_SOFT_BOUNDARY_THRESHOLD, DEFAULT_UPSERT_BATCH_SIZE, DEFAULT_UPSERT_PARALLELISM,
    FACT_DEDUP_COSINE_THRESHOLD, FACT_DEDUP_TEXT_EQUALITY_THRESHOLD,
};
use mcb_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Per-RPC timeout settings, in seconds (§5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    pub boundary_detection_secs: u64,
    pub classification_secs: u64,
    pub embedding_batch_secs: u64,
    pub upsert_batch_secs: u64,
    pub fact_extraction_unit_secs: u64,
    pub access_oracle_secs: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            boundary_detection_secs: constants::timeouts::BOUNDARY_DETECTION_SECS,
            classification_secs: constants::timeouts::CLASSIFICATION_SECS,
            embedding_batch_secs: constants::timeouts::EMBEDDING_BATCH_SECS,
            upsert_batch_secs: constants::timeouts::UPSERT_BATCH_SECS,
            fact_extraction_unit_secs: constants::timeouts::FACT_EXTRACTION_UNIT_SECS,
            access_oracle_secs: constants::timeouts::ACCESS_ORACLE_SECS,
        }
    }
}

/// Embedding/LLM backend endpoint settings (§6.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Base URL of the dense-embedding HTTP backend.
    pub embedding_url: String,
    /// Base URL of the LLM classifier/fact-extraction HTTP backend.
    pub llm_url: String,
    /// Dimensionality `D` every dense vector must have (§3).
    pub dense_dimensions: usize,
    /// Base URL of the case-access authorization backend. `None` runs with
    /// `AllowAllAccessOracle` (single-tenant deployments, §1 Non-goals).
    pub access_oracle_url: Option<String>,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            embedding_url: "http://localhost:11434/api/embeddings".to_owned(),
            llm_url: "http://localhost:11434/api/generate".to_owned(),
            dense_dimensions: 1536,
            access_oracle_url: None,
        }
    }
}

/// Full, validated runtime configuration for one process (§10.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub file_concurrency: usize,
    pub segment_concurrency: usize,
    pub embedding_batch_parallelism: usize,
    pub upsert_parallelism: usize,

    pub soft_boundary_threshold: f32,
    pub ocr_threshold_relaxation: f32,

    pub classifier_confidence_cutoff: f32,
    pub classifier_header_lines: usize,

    pub chunk_target_tokens: u32,
    pub chunk_overlap_tokens: u32,
    pub chunk_force_split_multiple: u32,

    pub dense_batch_size: usize,

    pub rrf_k: u32,
    pub upsert_batch_size: usize,

    pub document_failure_rate_threshold: f32,
    pub max_retry_attempts: u32,
    pub retry_backoff_ceiling_secs: u64,

    pub progress_bus_buffer: usize,

    pub fact_dedup_cosine_threshold: f32,
    pub fact_dedup_text_equality_threshold: f32,

    pub shared_collections: Vec<String>,

    pub timeouts: TimeoutsConfig,
    pub endpoints: EndpointsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_concurrency: DEFAULT_FILE_CONCURRENCY,
            segment_concurrency: DEFAULT_SEGMENT_CONCURRENCY,
            embedding_batch_parallelism: DEFAULT_EMBEDDING_BATCH_PARALLELISM,
            upsert_parallelism: DEFAULT_UPSERT_PARALLELISM,
            soft_boundary_threshold: DEFAULT_SOFT_BOUNDARY_THRESHOLD,
            ocr_threshold_relaxation: DEFAULT_OCR_THRESHOLD_RELAXATION,
            classifier_confidence_cutoff: DEFAULT_CLASSIFIER_CONFIDENCE_CUTOFF,
            classifier_header_lines: DEFAULT_CLASSIFIER_HEADER_LINES,
            chunk_target_tokens: DEFAULT_CHUNK_TARGET_TOKENS,
            chunk_overlap_tokens: DEFAULT_CHUNK_OVERLAP_TOKENS,
            chunk_force_split_multiple: CHUNK_FORCE_SPLIT_MULTIPLE,
            dense_batch_size: DEFAULT_DENSE_BATCH_SIZE,
            rrf_k: DEFAULT_RRF_K,
            upsert_batch_size: DEFAULT_UPSERT_BATCH_SIZE,
            document_failure_rate_threshold: DEFAULT_DOCUMENT_FAILURE_RATE_THRESHOLD,
            max_retry_attempts: DEFAULT_MAX_RETRY_ATTEMPTS,
            retry_backoff_ceiling_secs: DEFAULT_RETRY_BACKOFF_CEILING_SECS,
            progress_bus_buffer: DEFAULT_PROGRESS_BUS_BUFFER,
            fact_dedup_cosine_threshold: FACT_DEDUP_COSINE_THRESHOLD,
            fact_dedup_text_equality_threshold: FACT_DEDUP_TEXT_EQUALITY_THRESHOLD,
            shared_collections: vec![
                "florida_statutes".to_owned(),
                "fmcsr_regulations".to_owned(),
                "federal_rules".to_owned(),
                "case_law_precedents".to_owned(),
            ],
            timeouts: TimeoutsConfig::default(),
            endpoints: EndpointsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then an optional TOML file, then
    /// `MCB_`-prefixed environment variables, in that priority order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file/environment cannot be parsed,
    /// or if the merged result fails [`Config::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed("MCB_").split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| Error::config_with_source("failed to load configuration", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate invariants that must hold before any component uses this config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if any knob is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.dense_dimensions == 0 {
            return Err(Error::config("dense_dimensions must be > 0"));
        }
        for (name, value) in [
            ("file_concurrency", self.file_concurrency),
            ("segment_concurrency", self.segment_concurrency),
            ("embedding_batch_parallelism", self.embedding_batch_parallelism),
            ("upsert_parallelism", self.upsert_parallelism),
        ] {
            if value == 0 {
                return Err(Error::config(format!("{name} must be > 0")));
            }
        }
        if !(0.0..=1.0).contains(&self.soft_boundary_threshold) {
            return Err(Error::config("soft_boundary_threshold must be within [0, 1]"));
        }
        if self.chunk_overlap_tokens >= self.chunk_target_tokens {
            return Err(Error::config("chunk_overlap_tokens must be smaller than chunk_target_tokens"));
        }
        if self.max_retry_attempts == 0 {
            return Err(Error::config("max_retry_attempts must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Config::default().validate().expect("defaults must be valid");
    }

    #[test]
    fn rejects_zero_dense_dimensions() {
        let mut config = Config::default();
        config.endpoints.dense_dimensions = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_overlap_not_smaller_than_target() {
        let mut config = Config::default();
        config.chunk_overlap_tokens = config.chunk_target_tokens;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_with_no_file_falls_back_to_defaults() {
        let config = Config::load(None).expect("defaults must load");
        assert_eq!(config.file_concurrency, DEFAULT_FILE_CONCURRENCY);
    }

    #[test]
    fn environment_override_takes_priority_over_defaults() {
        // SAFETY: test-local, single-threaded-enough for this narrow check; no
        // other test in this module reads MCB_FILE_CONCURRENCY concurrently.
        unsafe {
            std::env::set_var("MCB_FILE_CONCURRENCY", "9");
        }
        let config = Config::load(None).expect("env override must load");
        unsafe {
            std::env::remove_var("MCB_FILE_CONCURRENCY");
        }
        assert_eq!(config.file_concurrency, 9);
    }
}
