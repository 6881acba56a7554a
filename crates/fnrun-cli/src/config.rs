use std::path::{Path, PathBuf};

use anyhow::Context;
use fnrun_core::EnvSource;
use serde::Deserialize;

const CONFIG_FILE: &str = "fnrun.toml";

/// Environment variable that overrides `registry.prefix`.
pub const REGISTRY_ENV: &str = "FN_REGISTRY";

#[derive(Debug, Default, Deserialize)]
pub struct FnrunConfig {
    #[serde(default)]
    pub docker: DockerConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

#[derive(Debug, Deserialize)]
pub struct DockerConfig {
    #[serde(default = "default_docker_bin")]
    pub bin: String,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            bin: default_docker_bin(),
        }
    }
}

fn default_docker_bin() -> String {
    "docker".into()
}

#[derive(Debug, Default, Deserialize)]
pub struct RegistryConfig {
    pub prefix: Option<String>,
}

impl FnrunConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Load an explicit config file, or the first of `./fnrun.toml` and
    /// `<config dir>/fnrun/fnrun.toml` that exists. Defaults otherwise.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match candidate_paths(cwd).into_iter().find(|p| p.is_file()) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Using config file");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Registry prefix, with `FN_REGISTRY` taking precedence over the file.
    pub fn registry_prefix<S: EnvSource + ?Sized>(&self, env: &S) -> Option<String> {
        env.var(REGISTRY_ENV)
            .filter(|r| !r.is_empty())
            .or_else(|| self.registry.prefix.clone())
    }
}

fn candidate_paths(cwd: &Path) -> Vec<PathBuf> {
    let mut paths = vec![cwd.join(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("fnrun").join(CONFIG_FILE));
    }
    paths
}
