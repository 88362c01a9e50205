pub mod error;
pub mod formats;
pub mod naming;
pub mod pipeline;
pub mod resize;
pub mod settings;

pub use error::ExportError;
pub use pipeline::{BatchExporter, ExportProgress, ExportReport, ItemOutcome};
pub use settings::{ExportSettings, NamingMode, OutputFormat, ResizeMode};
