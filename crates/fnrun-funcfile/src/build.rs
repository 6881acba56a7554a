use std::path::Path;

use crate::error::FuncfileError;
use crate::locate::LoadedFunction;

/// Builds a function's container image from its directory.
///
/// Declared `build` commands run first (through `sh -c`, in the function
/// directory), then `docker build` tags the image.
pub struct ImageBuilder {
    docker_bin: String,
    shell: String,
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self {
            docker_bin: "docker".into(),
            shell: "sh".into(),
        }
    }

    /// Override the container runtime client binary.
    pub fn with_bin(mut self, path: impl Into<String>) -> Self {
        self.docker_bin = path.into();
        self
    }

    /// Arguments passed to the runtime client for the image build.
    pub fn build_args(&self, image: &str, context: &Path, no_cache: bool) -> Vec<String> {
        let mut args = vec!["build".to_string(), "-t".to_string(), image.to_string()];
        if no_cache {
            args.push("--no-cache".into());
        }
        args.push(context.display().to_string());
        args
    }

    pub async fn build(
        &self,
        function: &LoadedFunction,
        image: &str,
        no_cache: bool,
    ) -> Result<(), FuncfileError> {
        let dir = function.dir();

        for command in &function.declaration.build {
            tracing::info!(command = %command, "Running build command");
            let output = tokio::process::Command::new(&self.shell)
                .arg("-c")
                .arg(command)
                .current_dir(dir)
                .output()
                .await
                .map_err(|e| {
                    FuncfileError::BuildError(format!("failed to run `{command}`: {e}"))
                })?;
            if !output.status.success() {
                return Err(FuncfileError::BuildError(format!(
                    "`{command}` failed ({}):\n{}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr)
                )));
            }
        }

        if !dir.join("Dockerfile").is_file() {
            return Err(FuncfileError::BuildError(format!(
                "no Dockerfile in {}",
                dir.display()
            )));
        }

        let args = self.build_args(image, dir, no_cache);
        tracing::info!(image, no_cache, "Building function image");

        let output = tokio::process::Command::new(&self.docker_bin)
            .args(&args)
            .output()
            .await
            .map_err(|e| {
                FuncfileError::BuildError(format!(
                    "failed to run {}: {e}. Is it installed?",
                    self.docker_bin
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(FuncfileError::BuildError(format!(
                "{} build failed:\nstdout: {stdout}\nstderr: {stderr}",
                self.docker_bin
            )));
        }

        tracing::info!(image, "Function image built");
        Ok(())
    }
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnrun_core::FunctionDeclaration;
    use tempfile::TempDir;

    fn loaded(dir: &Path, build: Vec<String>) -> LoadedFunction {
        let mut declaration = FunctionDeclaration::new("hello");
        declaration.build = build;
        LoadedFunction {
            path: dir.join("func.yaml"),
            declaration,
        }
    }

    #[test]
    fn build_args_include_no_cache() {
        let builder = ImageBuilder::new();
        let ctx = Path::new("/src/hello");

        assert_eq!(
            builder.build_args("hello:0.0.1", ctx, false),
            vec!["build", "-t", "hello:0.0.1", "/src/hello"]
        );
        assert_eq!(
            builder.build_args("hello:0.0.1", ctx, true),
            vec!["build", "-t", "hello:0.0.1", "--no-cache", "/src/hello"]
        );
    }

    #[tokio::test]
    async fn fails_without_dockerfile() {
        let tmp = TempDir::new().unwrap();
        let err = ImageBuilder::new()
            .build(&loaded(tmp.path(), vec![]), "hello", false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Dockerfile"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_build_commands_then_docker_build() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("Dockerfile"), "FROM scratch\n").unwrap();

        let log = tmp.path().join("docker.log");
        let fake = tmp.path().join("fake-docker");
        std::fs::write(&fake, format!("#!/bin/sh\necho \"$@\" > {}\n", log.display())).unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let function = loaded(tmp.path(), vec!["echo built > artifact.txt".into()]);
        ImageBuilder::new()
            .with_bin(fake.display().to_string())
            .build(&function, "hello:1.0.0", true)
            .await
            .unwrap();

        assert!(tmp.path().join("artifact.txt").exists());
        let logged = std::fs::read_to_string(&log).unwrap();
        assert!(logged.starts_with("build -t hello:1.0.0 --no-cache"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_build_command_stops_build() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("Dockerfile"), "FROM scratch\n").unwrap();

        let err = ImageBuilder::new()
            .with_bin("/nonexistent/docker")
            .build(&loaded(tmp.path(), vec!["exit 3".into()]), "hello", false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exit 3"));
    }
}
