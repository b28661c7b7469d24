//! Document-level extraction pipeline.
//!
//! ```text
//! paths ──[BatchCoordinator]──┬─ one document per batch worker
//!                             ↓
//!             DocumentHandle ──[ExtractionCoordinator]──┬─ one page per page worker
//!                                                       ↓
//!                                   [PageExtractor] (fast | precision)
//!                                                       ↓
//!                                  String / Vec<TextBlock>, in page order
//! ```
//!
//! The two worker pools never nest: documents processed by a parallel
//! batch are extracted page by page on their batch worker.

pub mod batch;
pub mod cancel;
pub mod coordinator;

pub use batch::{batch_extract, BatchCoordinator, BatchItemResult, BatchResult};
pub use cancel::CancellationToken;
pub use coordinator::{
    extract_blocks_from_path, extract_text, extract_text_from_path, extract_text_with_metadata,
    select_mode, ExecutionMode, ExtractionCoordinator, ExtractionOutput, OutputKind,
};
