//! Multi-document extraction with per-document failure isolation.
//!
//! Inputs are validated up front; after that every path gets exactly one
//! entry in the result, holding either its text or the error that stopped
//! it. Documents run concurrently on a bounded pool, and each one is
//! extracted with page parallelism disabled so the two pools never nest.

use crate::config::ExtractionConfig;
use crate::document::DocumentHandle;
use crate::error::{BatchError, BatchItemError, BatchItemErrorKind};
use crate::pipeline::cancel::CancellationToken;
use crate::pipeline::coordinator::ExtractionCoordinator;
use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Outcome of one document in a batch.
pub type BatchItemResult = std::result::Result<String, BatchItemError>;

/// Per-path outcomes of [`batch_extract`], in input order.
#[derive(Debug, Default)]
pub struct BatchResult {
    entries: IndexMap<PathBuf, BatchItemResult>,
}

impl BatchResult {
    /// Number of entries; always the number of requested paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch was empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Outcome for `path`.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&BatchItemResult> {
        self.entries.get(path.as_ref())
    }

    /// Iterate over `(path, outcome)` pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &BatchItemResult)> {
        self.entries.iter().map(|(path, result)| (path.as_path(), result))
    }

    /// Paths that produced text, with their text.
    pub fn successes(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.iter()
            .filter_map(|(path, result)| result.as_ref().ok().map(|text| (path, text.as_str())))
    }

    /// Paths that failed, with their error.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &BatchItemError)> {
        self.iter()
            .filter_map(|(path, result)| result.as_ref().err().map(|err| (path, err)))
    }

    /// Classification of the failure for `path`, if it failed.
    pub fn error_kind(&self, path: impl AsRef<Path>) -> Option<BatchItemErrorKind> {
        self.get(path)?.as_ref().err().map(BatchItemError::kind)
    }

    /// The underlying ordered map.
    pub fn into_inner(self) -> IndexMap<PathBuf, BatchItemResult> {
        self.entries
    }
}

impl IntoIterator for BatchResult {
    type Item = (PathBuf, BatchItemResult);
    type IntoIter = indexmap::map::IntoIter<PathBuf, BatchItemResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Extracts the text of many documents.
///
/// # Examples
///
/// ```no_run
/// use pdf_harvest::config::ExtractionConfig;
/// use pdf_harvest::pipeline::BatchCoordinator;
///
/// let batch = BatchCoordinator::new(ExtractionConfig::default())?;
/// let results = batch.run(&["a.pdf", "b.pdf"])?;
/// for (path, err) in results.failures() {
///     eprintln!("{}: {}", path.display(), err);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct BatchCoordinator {
    config: ExtractionConfig,
    cancel: Option<CancellationToken>,
}

impl BatchCoordinator {
    /// Validate `config`.
    pub fn new(config: ExtractionConfig) -> Result<Self, BatchError> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: None,
        })
    }

    /// Check `token` before each document (and each page within it).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Extract every path. Fails only when the input list is invalid or the
    /// worker pool cannot be created; document failures are recorded in the
    /// result.
    pub fn run<P: AsRef<Path>>(&self, paths: &[P]) -> Result<BatchResult, BatchError> {
        let paths = validate_paths(paths)?;
        if paths.is_empty() {
            return Ok(BatchResult::default());
        }

        let start = Instant::now();
        let parallel = self.config.use_multithreading && paths.len() > 1;
        let workers = self.config.max_workers.min(paths.len());
        log::info!(
            "Processing {} documents ({})",
            paths.len(),
            if parallel {
                format!("{} workers", workers)
            } else {
                "sequential".to_string()
            }
        );

        let document_config = if parallel {
            self.config.clone().with_multithreading(false)
        } else {
            self.config.clone()
        };
        let mut coordinator = ExtractionCoordinator::new(document_config)?;
        if let Some(token) = &self.cancel {
            coordinator = coordinator.with_cancellation(token.clone());
        }

        let completed = AtomicUsize::new(0);
        let process = |path: &PathBuf| {
            let outcome = self.process_one(&coordinator, path);
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            log::debug!("[{}/{}] {}", done, paths.len(), path.display());
            (path.clone(), outcome)
        };

        let outcomes: Vec<(PathBuf, BatchItemResult)> = if parallel {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("pdf-batch-{}", i))
                .build()
                .map_err(|e| BatchError::WorkerPool(e.to_string()))?;
            pool.install(|| paths.par_iter().map(process).collect())
        } else {
            paths.iter().map(process).collect()
        };

        let result = BatchResult {
            entries: outcomes.into_iter().collect(),
        };
        log::info!(
            "Processed {} documents in {:.2?}: {} succeeded, {} failed",
            result.len(),
            start.elapsed(),
            result.successes().count(),
            result.failures().count()
        );
        Ok(result)
    }

    fn process_one(&self, coordinator: &ExtractionCoordinator, path: &Path) -> BatchItemResult {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Err(BatchItemError::Cancelled {
                path: path.to_path_buf(),
            });
        }
        let outcome = DocumentHandle::open(path)
            .map_err(BatchItemError::from)
            .and_then(|handle| coordinator.extract_text(handle).map_err(BatchItemError::from));
        if let Err(e) = &outcome {
            log::error!("Failed to process {}: {}", path.display(), e);
        }
        outcome
    }
}

/// Reject empty and duplicate paths, keeping input order.
fn validate_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PathBuf>, BatchError> {
    let mut unique = IndexSet::with_capacity(paths.len());
    for (position, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(BatchError::EmptyIdentifier { position });
        }
        if !unique.insert(path.to_path_buf()) {
            return Err(BatchError::DuplicateIdentifier {
                path: path.to_path_buf(),
            });
        }
    }
    Ok(unique.into_iter().collect())
}

/// Extract the text of every path with `config`.
///
/// # Examples
///
/// ```no_run
/// use pdf_harvest::{batch_extract, ExtractionConfig};
///
/// let results = batch_extract(&["ok.pdf", "missing.pdf"], &ExtractionConfig::default())?;
/// assert_eq!(results.len(), 2);
/// # Ok::<(), pdf_harvest::error::BatchError>(())
/// ```
pub fn batch_extract<P: AsRef<Path>>(
    paths: &[P],
    config: &ExtractionConfig,
) -> Result<BatchResult, BatchError> {
    BatchCoordinator::new(config.clone())?.run(paths)
}
