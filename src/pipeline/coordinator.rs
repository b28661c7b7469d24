//! Whole-document extraction.
//!
//! The coordinator owns one page extractor and decides, per document,
//! whether pages are processed in order on the calling thread or spread
//! over a dedicated worker pool. Both paths produce identical output: page
//! results land in index-addressed slots and are joined in page order.

use crate::config::ExtractionConfig;
use crate::document::DocumentHandle;
use crate::error::{ConfigError, ExtractionError, PageExtractionError, Result};
use crate::extractors::{select_extractor, PageExtractor};
use crate::layout::TextBlock;
use crate::pipeline::cancel::CancellationToken;
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

/// How the pages of one document are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Pages in order on the calling thread
    Sequential,
    /// Pages spread over a pool of `workers` threads
    PageParallel {
        /// Pool size
        workers: usize,
    },
}

impl ExecutionMode {
    /// Number of threads doing page work.
    pub fn worker_count(&self) -> usize {
        match self {
            ExecutionMode::Sequential => 1,
            ExecutionMode::PageParallel { workers } => *workers,
        }
    }
}

/// Pick the execution mode for a document of `page_count` pages.
///
/// Page parallelism is used only when multithreading is enabled and the
/// document has more pages than the configured threshold. The pool never
/// has more workers than pages.
///
/// # Examples
///
/// ```
/// use pdf_harvest::config::ExtractionConfig;
/// use pdf_harvest::pipeline::{select_mode, ExecutionMode};
///
/// let config = ExtractionConfig::new().with_max_workers(8);
/// assert_eq!(select_mode(50, &config), ExecutionMode::Sequential);
/// assert_eq!(select_mode(150, &config), ExecutionMode::PageParallel { workers: 8 });
/// ```
pub fn select_mode(page_count: usize, config: &ExtractionConfig) -> ExecutionMode {
    if config.use_multithreading && page_count > config.page_parallel_threshold {
        ExecutionMode::PageParallel {
            workers: config.max_workers.min(page_count).max(1),
        }
    } else {
        ExecutionMode::Sequential
    }
}

/// Requested output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Concatenated plain text
    Text,
    /// Positioned blocks
    Blocks,
}

/// Result of [`ExtractionCoordinator::extract`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutput {
    /// Plain text of all pages
    Text(String),
    /// Blocks of all pages, in page order
    Blocks(Vec<TextBlock>),
}

impl ExtractionOutput {
    /// The text, if this is a text result.
    pub fn into_text(self) -> Option<String> {
        match self {
            ExtractionOutput::Text(text) => Some(text),
            ExtractionOutput::Blocks(_) => None,
        }
    }

    /// The blocks, if this is a block result.
    pub fn into_blocks(self) -> Option<Vec<TextBlock>> {
        match self {
            ExtractionOutput::Blocks(blocks) => Some(blocks),
            ExtractionOutput::Text(_) => None,
        }
    }
}

/// Extracts whole documents with a fixed configuration.
///
/// # Examples
///
/// ```no_run
/// use pdf_harvest::config::ExtractionConfig;
/// use pdf_harvest::document::DocumentHandle;
/// use pdf_harvest::pipeline::ExtractionCoordinator;
///
/// let coordinator = ExtractionCoordinator::new(ExtractionConfig::default())?;
/// let text = coordinator.extract_text(DocumentHandle::open("paper.pdf")?)?;
/// println!("{}", text);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ExtractionCoordinator {
    config: ExtractionConfig,
    extractor: Box<dyn PageExtractor>,
    cancel: Option<CancellationToken>,
}

impl std::fmt::Debug for ExtractionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionCoordinator")
            .field("config", &self.config)
            .field("extractor", &self.extractor.name())
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

impl ExtractionCoordinator {
    /// Validate `config` and select its page extractor.
    pub fn new(config: ExtractionConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let extractor = select_extractor(&config);
        Ok(Self {
            config,
            extractor,
            cancel: None,
        })
    }

    /// Check `token` before every page.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Plain text of every page, concatenated without separators.
    ///
    /// The handle is released before returning, on success and on failure.
    pub fn extract_text(&self, handle: DocumentHandle) -> Result<String> {
        self.extract(handle, OutputKind::Text)
            .map(|output| output.into_text().unwrap_or_default())
    }

    /// Blocks of every page, ordered by page number and then by position
    /// within the page.
    ///
    /// The handle is released before returning, on success and on failure.
    pub fn extract_text_with_metadata(&self, handle: DocumentHandle) -> Result<Vec<TextBlock>> {
        self.extract(handle, OutputKind::Blocks)
            .map(|output| output.into_blocks().unwrap_or_default())
    }

    /// Extract the whole document in the requested shape. The first failing
    /// page fails the call; no partial output is returned.
    pub fn extract(&self, mut handle: DocumentHandle, kind: OutputKind) -> Result<ExtractionOutput> {
        let start = Instant::now();
        let page_count = handle.page_count();
        let mode = select_mode(page_count, &self.config);
        log::info!(
            "Extracting {:?} from {} ({} pages, {:?}, {} scanner)",
            kind,
            handle.path().display(),
            page_count,
            mode,
            self.extractor.name()
        );

        let result = match kind {
            OutputKind::Text => self
                .run_pages(&handle, mode, |extractor, handle, index| {
                    extractor.extract_page(handle, index)
                })
                .map(|pages| ExtractionOutput::Text(pages.concat())),
            OutputKind::Blocks => self
                .run_pages(&handle, mode, |extractor, handle, index| {
                    extractor.extract_page_blocks(handle, index)
                })
                .map(|pages| ExtractionOutput::Blocks(pages.into_iter().flatten().collect())),
        };
        handle.close();

        match &result {
            Ok(ExtractionOutput::Text(text)) => log::info!(
                "Extracted {} characters from {} in {:.2?}",
                text.chars().count(),
                handle.path().display(),
                start.elapsed()
            ),
            Ok(ExtractionOutput::Blocks(blocks)) => log::info!(
                "Extracted {} blocks from {} in {:.2?}",
                blocks.len(),
                handle.path().display(),
                start.elapsed()
            ),
            Err(e) => log::warn!(
                "Extraction of {} failed after {:.2?}: {}",
                handle.path().display(),
                start.elapsed(),
                e
            ),
        }
        result
    }

    /// Run `page_fn` over every page, collecting results in page order.
    fn run_pages<T, F>(&self, handle: &DocumentHandle, mode: ExecutionMode, page_fn: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(&dyn PageExtractor, &DocumentHandle, usize) -> std::result::Result<T, PageExtractionError>
            + Sync,
    {
        let page_count = handle.page_count();
        let run_page = |index: usize| -> Result<T> {
            self.check_cancelled(handle.path(), index)?;
            log::debug!("Page {}/{} of {}", index + 1, page_count, handle.path().display());
            Ok(page_fn(self.extractor.as_ref(), handle, index)?)
        };

        match mode {
            ExecutionMode::Sequential => (0..page_count).map(run_page).collect(),
            ExecutionMode::PageParallel { workers } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("pdf-page-{}", i))
                    .build()
                    .map_err(|e| ExtractionError::WorkerPool {
                        path: handle.path().to_path_buf(),
                        reason: e.to_string(),
                    })?;
                pool.install(|| (0..page_count).into_par_iter().map(run_page).collect())
            },
        }
    }

    fn check_cancelled(&self, path: &Path, page_index: usize) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(ExtractionError::Cancelled {
                path: path.to_path_buf(),
                page_index,
            }),
            _ => Ok(()),
        }
    }
}

/// Extract the plain text of `handle` with `config`.
///
/// # Examples
///
/// ```no_run
/// use pdf_harvest::{extract_text, DocumentHandle, ExtractionConfig};
///
/// let text = extract_text(DocumentHandle::open("paper.pdf")?, &ExtractionConfig::default())?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn extract_text(handle: DocumentHandle, config: &ExtractionConfig) -> Result<String> {
    ExtractionCoordinator::new(config.clone())?.extract_text(handle)
}

/// Extract the positioned blocks of `handle` with `config`.
pub fn extract_text_with_metadata(
    handle: DocumentHandle,
    config: &ExtractionConfig,
) -> Result<Vec<TextBlock>> {
    ExtractionCoordinator::new(config.clone())?.extract_text_with_metadata(handle)
}

/// Open `path` and extract its plain text.
pub fn extract_text_from_path(path: impl AsRef<Path>, config: &ExtractionConfig) -> Result<String> {
    let coordinator = ExtractionCoordinator::new(config.clone())?;
    coordinator.extract_text(DocumentHandle::open(path)?)
}

/// Open `path` and extract its positioned blocks.
pub fn extract_blocks_from_path(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<Vec<TextBlock>> {
    let coordinator = ExtractionCoordinator::new(config.clone())?;
    coordinator.extract_text_with_metadata(DocumentHandle::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{handle, pdf_bytes_with_missing_contents};

    fn numbered_pages(count: usize) -> Vec<Vec<u8>> {
        (1..=count)
            .map(|n| format!("BT /F1 12 Tf 72 720 Td (Page {}) Tj ET", n).into_bytes())
            .collect()
    }

    fn open(pages: &[Vec<u8>]) -> DocumentHandle {
        let slices: Vec<&[u8]> = pages.iter().map(Vec::as_slice).collect();
        handle(&slices)
    }

    #[test]
    fn test_select_mode_threshold_is_exclusive() {
        let config = ExtractionConfig::new().with_max_workers(4);
        assert_eq!(select_mode(100, &config), ExecutionMode::Sequential);
        assert_eq!(select_mode(101, &config), ExecutionMode::PageParallel { workers: 4 });
        assert_eq!(
            select_mode(101, &config.clone().with_multithreading(false)),
            ExecutionMode::Sequential
        );
    }

    #[test]
    fn test_select_mode_caps_workers_at_page_count() {
        let config = ExtractionConfig::new()
            .with_max_workers(32)
            .with_page_parallel_threshold(2);
        assert_eq!(select_mode(3, &config), ExecutionMode::PageParallel { workers: 3 });
        assert_eq!(select_mode(3, &config).worker_count(), 3);
    }

    #[test]
    fn test_three_pages_concatenate_without_separator() {
        let text = extract_text(open(&numbered_pages(3)), &ExtractionConfig::default()).unwrap();
        assert_eq!(text, "Page 1Page 2Page 3");
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let pages = numbered_pages(12);
        let parallel = ExtractionConfig::new()
            .with_max_workers(4)
            .with_page_parallel_threshold(5);
        let sequential = parallel.clone().with_multithreading(false);

        let a = extract_text(open(&pages), &parallel).unwrap();
        let b = extract_text(open(&pages), &sequential).unwrap();
        assert_eq!(a, b);

        let blocks_a = extract_text_with_metadata(open(&pages), &parallel).unwrap();
        let blocks_b = extract_text_with_metadata(open(&pages), &sequential).unwrap();
        assert_eq!(blocks_a, blocks_b);
        let page_nums: Vec<u32> = blocks_a.iter().map(|b| b.page_num()).collect();
        assert_eq!(page_nums, (1..=12).collect::<Vec<u32>>());
    }

    #[test]
    fn test_corrupt_page_fails_whole_call() {
        let page: &[u8] = b"BT (a) Tj ET";
        let pages = vec![page; 6];
        let bytes = pdf_bytes_with_missing_contents(&pages, 4);
        let config = ExtractionConfig::new().with_page_parallel_threshold(2);
        let handle = DocumentHandle::from_bytes("broken.pdf", &bytes).unwrap();

        match extract_text(handle, &config) {
            Err(ExtractionError::Page(err)) => assert_eq!(err.page_index(), 4),
            other => panic!("expected page error, got {:?}", other),
        }
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let coordinator = ExtractionCoordinator::new(ExtractionConfig::sequential())
            .unwrap()
            .with_cancellation(token);
        let err = coordinator.extract_text(open(&numbered_pages(2))).unwrap_err();
        assert!(matches!(err, ExtractionError::Cancelled { page_index: 0, .. }));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = ExtractionConfig::new().with_max_workers(0);
        let err = extract_text(open(&numbered_pages(1)), &config).unwrap_err();
        assert!(matches!(err, ExtractionError::Config(ConfigError::ZeroWorkers)));
    }

    #[test]
    fn test_empty_document_yields_empty_output() {
        let text = extract_text(open(&[]), &ExtractionConfig::default()).unwrap();
        assert!(text.is_empty());
    }
}
