//! Invocation envelopes for locally simulated function calls.
//!
//! A [`RequestDescriptor`] describes one request the platform would route to
//! a function. [`envelope::encode`] turns it into the stdin bytes and
//! environment a container expects for a given [`ExecutionFormat`], and
//! [`hot::repeat`] replays that encoding for a warm container serving
//! several requests from one stdin stream.

pub mod declaration;
pub mod env;
pub mod envelope;
pub mod error;
pub mod format;
pub mod hot;
pub mod output;
pub mod request;

pub use declaration::{ConfigExpectation, FunctionDeclaration, InvocationKind};
pub use env::{EnvList, EnvSource, MemoryEnv, ProcessEnv};
pub use envelope::Envelope;
pub use error::EnvelopeError;
pub use format::ExecutionFormat;
pub use output::OutputTransform;
pub use request::RequestDescriptor;
