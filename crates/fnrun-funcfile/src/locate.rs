use std::path::{Path, PathBuf};

use fnrun_core::FunctionDeclaration;

use crate::error::FuncfileError;

/// Declaration file names, in lookup order.
pub const FUNCFILE_NAMES: [&str; 4] = ["func.yaml", "func.yml", "func.json", "func.toml"];

/// A parsed declaration together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedFunction {
    pub path: PathBuf,
    pub declaration: FunctionDeclaration,
}

impl LoadedFunction {
    /// Directory holding the declaration file (the image build context).
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Resolve the function directory from the working directory and an
/// optional relative (or absolute) argument. Never touches the process's
/// current directory.
pub fn resolve_function_dir(cwd: &Path, arg: Option<&str>) -> PathBuf {
    match arg.map(str::trim).filter(|a| !a.is_empty()) {
        Some(rel) => cwd.join(rel.trim_start_matches("./")),
        None => cwd.to_path_buf(),
    }
}

/// Find the first declaration file present in `dir`.
pub fn find_funcfile(dir: &Path) -> Result<PathBuf, FuncfileError> {
    FUNCFILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| FuncfileError::NotFound(dir.to_path_buf()))
}

/// Parse a declaration file, choosing the parser by extension.
pub fn parse_funcfile(path: &Path) -> Result<FunctionDeclaration, FuncfileError> {
    let content = std::fs::read_to_string(path)?;
    let parse_error = |message: String| FuncfileError::ParseError {
        path: path.to_path_buf(),
        message,
    };

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string())),
        Some("json") => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
        Some("toml") => toml::from_str(&content).map_err(|e| parse_error(e.to_string())),
        other => Err(parse_error(format!("unsupported declaration format {other:?}"))),
    }
}

/// Locate and parse the declaration in `dir`, backfilling an empty name
/// with the directory's name.
pub fn load(dir: &Path) -> Result<LoadedFunction, FuncfileError> {
    let path = find_funcfile(dir)?;
    let mut declaration = parse_funcfile(&path)?;

    if declaration.name.is_empty()
        && let Some(dir_name) = path.parent().and_then(Path::file_name)
    {
        declaration.name = dir_name.to_string_lossy().into_owned();
        tracing::debug!(name = %declaration.name, "Function name taken from directory");
    }

    tracing::info!(path = %path.display(), name = %declaration.name, "Loaded function declaration");
    Ok(LoadedFunction { path, declaration })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnrun_core::ExecutionFormat;
    use tempfile::TempDir;

    #[test]
    fn resolves_without_changing_directory() {
        let cwd = Path::new("/work/functions");
        assert_eq!(resolve_function_dir(cwd, None), PathBuf::from("/work/functions"));
        assert_eq!(resolve_function_dir(cwd, Some("")), PathBuf::from("/work/functions"));
        assert_eq!(
            resolve_function_dir(cwd, Some("./hello")),
            PathBuf::from("/work/functions/hello")
        );
        assert_eq!(resolve_function_dir(cwd, Some("/abs/fn")), PathBuf::from("/abs/fn"));
    }

    #[test]
    fn yaml_wins_over_json() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("func.json"), r#"{"name":"from-json"}"#).unwrap();
        std::fs::write(tmp.path().join("func.yaml"), "name: from-yaml\n").unwrap();

        let loaded = load(tmp.path()).unwrap();
        assert_eq!(loaded.declaration.name, "from-yaml");
        assert_eq!(loaded.path, tmp.path().join("func.yaml"));
    }

    #[test]
    fn parses_toml_declaration() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("func.toml"),
            r#"
name = "hello"
memory = 64
format = "http"

[[expects.config]]
name = "API_KEY"
required = true
"#,
        )
        .unwrap();

        let decl = load(tmp.path()).unwrap().declaration;
        assert_eq!(decl.memory, 64);
        assert_eq!(decl.format, Some(ExecutionFormat::Http));
        assert_eq!(decl.expects.config[0].name, "API_KEY");
    }

    #[test]
    fn backfills_name_from_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("greeter");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("func.yaml"), "memory: 256\n").unwrap();

        let loaded = load(&dir).unwrap();
        assert_eq!(loaded.declaration.name, "greeter");
        assert_eq!(loaded.dir(), dir.as_path());
    }

    #[test]
    fn missing_declaration_is_not_found() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(load(tmp.path()), Err(FuncfileError::NotFound(_))));
    }

    #[test]
    fn parse_error_names_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("func.json"), "{ not json").unwrap();

        let err = load(tmp.path()).unwrap_err();
        assert!(matches!(err, FuncfileError::ParseError { .. }));
        assert!(err.to_string().contains("func.json"));
    }
}
