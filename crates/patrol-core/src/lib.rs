pub mod context;
pub mod endpoint;
pub mod error;
pub mod outcome;
pub mod output;
pub mod runner;
pub mod sink;
pub mod testutil;
pub mod traits;

pub use context::RunContext;
pub use endpoint::{EndpointDescriptor, Method, ParamSpec};
pub use error::AppError;
pub use outcome::{Classification, OutcomeRecord, ResponseStatus};
pub use runner::{EndpointRunner, RunSummary};
pub use sink::RotatingFileSink;
pub use traits::{CallResponse, Caller, ErrorSink};
