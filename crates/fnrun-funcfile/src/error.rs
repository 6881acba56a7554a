use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FuncfileError {
    #[error("could not find function declaration (func.yaml, func.yml, func.json or func.toml) in {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to parse {}: {message}", path.display())]
    ParseError { path: PathBuf, message: String },

    #[error("required config {name} is not set; export it or pass `-e {name}=<value>`")]
    MissingConfig { name: String },

    #[error("build failed: {0}")]
    BuildError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
