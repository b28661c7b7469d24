//! Error types for document opening, page extraction and batch processing.
//!
//! Every error carries the path of the document it originated from, and the
//! zero-based page index where one applies, so that a failure surfaced from
//! deep inside a worker pool can still be traced back to its input.

use std::path::{Path, PathBuf};

/// Result type alias for single-document extraction.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Failure to open a document. No handle is produced.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// The path does not exist
    #[error("Document not found: {}", .path.display())]
    NotFound {
        /// Requested path
        path: PathBuf,
    },

    /// The path exists but could not be read
    #[error("Cannot read {}: {source}", .path.display())]
    Unreadable {
        /// Requested path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a PDF the backend can parse
    #[error("Corrupt or unsupported PDF {}: {reason}", .path.display())]
    CorruptFormat {
        /// Requested path
        path: PathBuf,
        /// Backend message
        reason: String,
    },
}

impl OpenError {
    /// Path of the document that failed to open.
    pub fn path(&self) -> &Path {
        match self {
            OpenError::NotFound { path }
            | OpenError::Unreadable { path, .. }
            | OpenError::CorruptFormat { path, .. } => path,
        }
    }
}

/// Failure while extracting a single page.
#[derive(Debug, thiserror::Error)]
pub enum PageExtractionError {
    /// The page object or its content stream is damaged
    #[error("Corrupt page {page_index} in {}: {reason}", .path.display())]
    CorruptPage {
        /// Document path
        path: PathBuf,
        /// Zero-based page index
        page_index: usize,
        /// What was wrong with the page
        reason: String,
    },

    /// The document backend failed for a reason unrelated to page content
    #[error("Backend failure on page {page_index} in {}: {reason}", .path.display())]
    BackendFailure {
        /// Document path
        path: PathBuf,
        /// Zero-based page index
        page_index: usize,
        /// Backend message
        reason: String,
    },
}

impl PageExtractionError {
    pub(crate) fn corrupt(path: &Path, page_index: usize, reason: impl Into<String>) -> Self {
        PageExtractionError::CorruptPage {
            path: path.to_path_buf(),
            page_index,
            reason: reason.into(),
        }
    }

    pub(crate) fn backend(path: &Path, page_index: usize, reason: impl Into<String>) -> Self {
        PageExtractionError::BackendFailure {
            path: path.to_path_buf(),
            page_index,
            reason: reason.into(),
        }
    }

    /// Zero-based index of the failing page.
    pub fn page_index(&self) -> usize {
        match self {
            PageExtractionError::CorruptPage { page_index, .. }
            | PageExtractionError::BackendFailure { page_index, .. } => *page_index,
        }
    }

    /// Path of the document containing the failing page.
    pub fn path(&self) -> &Path {
        match self {
            PageExtractionError::CorruptPage { path, .. }
            | PageExtractionError::BackendFailure { path, .. } => path,
        }
    }
}

/// Invalid extraction configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A worker pool needs at least one thread
    #[error("max_workers must be at least 1")]
    ZeroWorkers,
}

/// Failure of a whole-document extraction call.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// Opening the document failed
    #[error(transparent)]
    Open(#[from] OpenError),

    /// A page failed; the whole call fails with it
    #[error(transparent)]
    Page(#[from] PageExtractionError),

    /// The configuration was rejected before any work started
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The page worker pool could not be created
    #[error("Cannot start worker pool for {}: {reason}", .path.display())]
    WorkerPool {
        /// Document path
        path: PathBuf,
        /// Pool builder message
        reason: String,
    },

    /// The caller cancelled the call before the page was started
    #[error("Extraction of {} cancelled before page {page_index}", .path.display())]
    Cancelled {
        /// Document path
        path: PathBuf,
        /// First page that was not started
        page_index: usize,
    },
}

/// Failure recorded for one entry of a batch. Never aborts sibling entries.
#[derive(Debug, thiserror::Error)]
pub enum BatchItemError {
    /// The document could not be opened
    #[error(transparent)]
    Open(#[from] OpenError),

    /// The document opened but extraction failed
    #[error(transparent)]
    Extraction(ExtractionError),

    /// The batch was cancelled before this document was started
    #[error("Batch cancelled before {} was processed", .path.display())]
    Cancelled {
        /// Document path
        path: PathBuf,
    },
}

impl From<ExtractionError> for BatchItemError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Open(open) => BatchItemError::Open(open),
            other => BatchItemError::Extraction(other),
        }
    }
}

/// Flat classification of a [`BatchItemError`], convenient for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchItemErrorKind {
    /// See [`OpenError::NotFound`]
    NotFound,
    /// See [`OpenError::Unreadable`]
    Unreadable,
    /// See [`OpenError::CorruptFormat`]
    CorruptFormat,
    /// See [`PageExtractionError::CorruptPage`]
    CorruptPage,
    /// See [`PageExtractionError::BackendFailure`]
    BackendFailure,
    /// Pool or configuration failure inside the per-document call
    Internal,
    /// Cancelled before or during the document
    Cancelled,
}

impl BatchItemError {
    /// Classify this error.
    pub fn kind(&self) -> BatchItemErrorKind {
        match self {
            BatchItemError::Open(open) | BatchItemError::Extraction(ExtractionError::Open(open)) => {
                open_kind(open)
            },
            BatchItemError::Extraction(ExtractionError::Page(
                PageExtractionError::CorruptPage { .. },
            )) => BatchItemErrorKind::CorruptPage,
            BatchItemError::Extraction(ExtractionError::Page(
                PageExtractionError::BackendFailure { .. },
            )) => BatchItemErrorKind::BackendFailure,
            BatchItemError::Extraction(ExtractionError::Cancelled { .. })
            | BatchItemError::Cancelled { .. } => BatchItemErrorKind::Cancelled,
            BatchItemError::Extraction(_) => BatchItemErrorKind::Internal,
        }
    }
}

fn open_kind(err: &OpenError) -> BatchItemErrorKind {
    match err {
        OpenError::NotFound { .. } => BatchItemErrorKind::NotFound,
        OpenError::Unreadable { .. } => BatchItemErrorKind::Unreadable,
        OpenError::CorruptFormat { .. } => BatchItemErrorKind::CorruptFormat,
    }
}

/// Rejection of a whole batch call. Raised before any document is touched.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// An input path was empty
    #[error("Empty document identifier at position {position}")]
    EmptyIdentifier {
        /// Position in the input list
        position: usize,
    },

    /// The same path was requested twice
    #[error("Duplicate document identifier: {}", .path.display())]
    DuplicateIdentifier {
        /// The repeated path
        path: PathBuf,
    },

    /// The configuration was rejected
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The batch worker pool could not be created
    #[error("Cannot start batch worker pool: {0}")]
    WorkerPool(String),
}
