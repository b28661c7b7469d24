//! Configuration for text extraction calls.
//!
//! An [`ExtractionConfig`] is a plain value passed to every call. There is no
//! process-wide configuration: the pool-size default is computed when a config
//! is built and travels with it.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Page count above which page-level parallelism is used by default.
pub const DEFAULT_PAGE_PARALLEL_THRESHOLD: usize = 100;

/// Upper bound of the default worker count.
pub const MAX_DEFAULT_WORKERS: usize = 32;

/// Default worker cap: `min(32, available_parallelism + 4)`.
pub fn default_max_workers() -> usize {
    MAX_DEFAULT_WORKERS.min(num_cpus::get() + 4)
}

/// Text extraction configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Enable the page-parallel and batch-parallel paths.
    pub use_multithreading: bool,

    /// Worker pool size cap.
    pub max_workers: usize,

    /// A document needs strictly more pages than this to be extracted
    /// page-parallel.
    pub page_parallel_threshold: usize,

    /// Use the layout-analysing precision scanner instead of the fast one.
    pub detailed: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            use_multithreading: true,
            max_workers: default_max_workers(),
            page_parallel_threshold: DEFAULT_PAGE_PARALLEL_THRESHOLD,
            detailed: false,
        }
    }

    /// Single-threaded configuration; every call runs sequentially.
    pub fn sequential() -> Self {
        Self::new().with_multithreading(false)
    }

    /// Enable or disable the parallel paths.
    pub fn with_multithreading(mut self, enable: bool) -> Self {
        self.use_multithreading = enable;
        self
    }

    /// Cap the worker pool size.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Set the page count above which page parallelism kicks in.
    pub fn with_page_parallel_threshold(mut self, threshold: usize) -> Self {
        self.page_parallel_threshold = threshold;
        self
    }

    /// Select the precision scanner.
    pub fn with_detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    /// Check the configuration before any work is started.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }
}
