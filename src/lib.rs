// src/lib.rs
pub mod colors;
pub mod correlator;
pub mod display;
pub mod error;
pub mod input;
pub mod logging;
pub mod output_format;
pub mod pattern_extraction;
pub mod pipeline;
pub mod record;
pub mod stats;
pub mod tty;

pub use error::*;
pub use pipeline::*;

pub use correlator::{correlate, TIMESTAMP_KEYS};
pub use display::{ConsoleRenderer, DisplayOptions};
pub use output_format::{CsvLayout, ExportFormat, FileExporter};
pub use pattern_extraction::{Parser, PatternExtractor};
pub use pipeline::cancel::CancellationToken;
pub use pipeline::config::{FileConfig, PipelineConfig};
pub use pipeline::context::ExtractionResult;
pub use record::{CorrelationGroup, Record};
pub use stats::{aggregate, Aggregation, ColumnStats, StatValue, Statistics};
