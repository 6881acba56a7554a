use serde::{Deserialize, Deserializer, Serialize};

use crate::format::ExecutionFormat;

/// Timeout applied when the declaration does not set one.
pub const DEFAULT_TIMEOUT_SECS: u32 = 30;

/// Memory applied when the declaration does not set one.
pub const DEFAULT_MEMORY_MB: u64 = 128;

/// A function's declared metadata, as read from its declaration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Explicit image reference. Derived from name and version when unset.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_memory")]
    pub memory: u64,
    #[serde(default)]
    pub timeout: Option<u32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub format: Option<ExecutionFormat>,
    #[serde(default, rename = "type")]
    pub kind: InvocationKind,
    /// Shell commands run in the function directory before the image build.
    #[serde(default)]
    pub build: Vec<String>,
    #[serde(default)]
    pub expects: Expects,
}

fn default_memory() -> u64 {
    DEFAULT_MEMORY_MB
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<ExecutionFormat>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) => name.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationKind {
    #[default]
    Sync,
    /// Accepted for compatibility; dispatched exactly like `sync`.
    Async,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expects {
    #[serde(default)]
    pub config: Vec<ConfigExpectation>,
}

/// A configuration variable the function expects in its environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigExpectation {
    pub name: String,
    #[serde(default)]
    pub required: bool,
}

impl FunctionDeclaration {
    /// A declaration with every optional field at its default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            image: None,
            memory: DEFAULT_MEMORY_MB,
            timeout: None,
            format: None,
            kind: InvocationKind::default(),
            build: Vec::new(),
            expects: Expects::default(),
        }
    }

    /// Apply a caller memory override. `None` and `Some(0)` keep the
    /// declared value.
    pub fn apply_memory_override(&mut self, memory_mb: Option<u64>) {
        if let Some(memory) = memory_mb.filter(|&m| m != 0) {
            self.memory = memory;
        }
    }

    pub fn timeout_secs(&self) -> u32 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Image reference the container is launched from.
    ///
    /// An explicit `image` wins. Otherwise the name is prefixed with
    /// `registry` when it has no `/`, and suffixed with `:version` when a
    /// version is declared.
    pub fn image_name(&self, registry: Option<&str>) -> String {
        if let Some(image) = self.image.as_deref().filter(|i| !i.is_empty()) {
            return image.to_string();
        }

        let mut name = self.name.clone();
        if !name.contains('/')
            && let Some(reg) = registry.map(|r| r.trim_end_matches('/')).filter(|r| !r.is_empty())
        {
            name = format!("{reg}/{name}");
        }
        match self.version.as_deref().filter(|v| !v.is_empty()) {
            Some(version) => format!("{name}:{version}"),
            None => name,
        }
    }
}
