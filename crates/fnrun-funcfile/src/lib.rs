//! Everything fnrun needs from a function's directory before it can be
//! invoked: the declaration file, its expected configuration and the image
//! build.

pub mod build;
pub mod error;
pub mod expects;
pub mod locate;

pub use build::ImageBuilder;
pub use error::FuncfileError;
pub use expects::{check_expectations, parse_env_flags};
pub use locate::{LoadedFunction, load, resolve_function_dir};
