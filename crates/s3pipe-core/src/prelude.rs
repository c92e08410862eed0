//! Prelude module for convenient imports.

pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::command::{CommandOutput, CommandRunner, ExitPolicy};
pub use crate::config::{ExportConfig, StorageSettings};
pub use crate::error::{ExportError, ExportResult};
pub use crate::exporter::{ExportReport, Exporter};
pub use crate::sink::{ObjectSink, PutObject};
pub use crate::template::PathTemplate;
