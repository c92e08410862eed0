#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod clock;
mod command;
mod config;
mod error;
mod exporter;
mod sink;
mod template;

#[doc(hidden)]
pub mod prelude;

pub use clock::{Clock, FixedClock, SystemClock};
pub use command::{CommandOutput, CommandRunner, ExitPolicy};
pub use config::{ExportConfig, StorageSettings, resolve_config_path};
pub use error::{BoxedError, ExportError, ExportResult, Stage};
pub use exporter::{ExportReport, Exporter};
pub use sink::{ObjectSink, PutObject};
pub use template::{PathTemplate, Placeholder};
