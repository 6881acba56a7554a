//! Container dispatch for fnrun.
//!
//! [`Dispatcher`] turns a function declaration plus an
//! [`InvocationRequest`] into a single `docker run --rm -i` invocation,
//! feeding the encoded envelope on stdin and relaying the container's
//! output back to the caller.
//!
//! ```rust,no_run
//! use fnrun_core::{ExecutionFormat, FunctionDeclaration};
//! use fnrun_runtime::{Dispatcher, InvocationRequest};
//!
//! # async fn run() -> Result<(), fnrun_runtime::DispatchError> {
//! let declaration = FunctionDeclaration::new("acme/hello");
//! let request = InvocationRequest {
//!     input: Some(br#"{"name":"Bob"}"#.to_vec()),
//!     format: Some(ExecutionFormat::Json),
//!     runs: 3,
//!     ..Default::default()
//! };
//!
//! let mut stdout = tokio::io::stdout();
//! let mut stderr = tokio::io::stderr();
//! Dispatcher::new()
//!     .invoke(&declaration, request, &mut stdout, &mut stderr)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod dispatcher;
pub mod error;

pub use dispatcher::{
    DispatchOutcome, Dispatcher, InvocationRequest, LaunchSpec, PASSTHROUGH_VARS, passthrough_env,
    run_args,
};
pub use error::DispatchError;
