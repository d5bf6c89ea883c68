pub mod bind;
pub mod convert;
pub mod diag;
pub mod error;
pub mod host;
pub mod logging;
pub mod schema;
pub mod sched;
pub mod session;
pub mod template;

pub use bind::{ReaderSource, bind_builder, bind_reader};
pub use convert::TypeConverter;
pub use diag::{CollectingSink, Diagnostic, DiagnosticSink, Severity, TracingSink};
pub use error::{CompileError, Result};
pub use host::{HostEnv, StaticHost};
pub use schema::{
    BuilderSchema, ReadQuery, ReadSegment, ReadVar, ReaderSchema, WriteQuery, WriteSegment, WriteVar,
};
pub use sched::{CompileReport, ProcessingStep, Scheduler, StepReport};
pub use session::CompileSession;
