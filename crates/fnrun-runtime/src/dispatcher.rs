use std::process::Stdio;

use chrono::Utc;
use fnrun_core::output::relay;
use fnrun_core::{
    EnvList, EnvSource, Envelope, ExecutionFormat, FunctionDeclaration, InvocationKind,
    ProcessEnv, RequestDescriptor, hot,
};
use http::Method;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::process::Command;

use crate::error::DispatchError;

/// Client variables copied from the invoking process so the runtime client
/// reaches the same (possibly remote) daemon.
pub const PASSTHROUGH_VARS: [&str; 4] = [
    "DOCKER_TLS_VERIFY",
    "DOCKER_HOST",
    "DOCKER_CERT_PATH",
    "DOCKER_MACHINE_NAME",
];

/// Resource and wiring settings for one container launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub image: String,
    pub memory_mb: u64,
    pub links: Vec<String>,
}

/// A caller's request to invoke a function once (or `runs` times, hot).
#[derive(Debug, Clone, Default)]
pub struct InvocationRequest {
    /// Explicit method; defaults from the presence of `input`.
    pub method: Option<Method>,
    /// Request body; `None` when the caller supplied no input.
    pub input: Option<Vec<u8>>,
    pub env: EnvList,
    pub links: Vec<String>,
    /// Explicit format; falls back to the declared one, then `default`.
    pub format: Option<ExecutionFormat>,
    pub runs: i64,
}

/// What a successful dispatch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub format: ExecutionFormat,
    /// Output records relayed, for line-delimited formats.
    pub records: Option<usize>,
}

/// Arguments for `<docker> run`, in the order the runtime client expects:
/// flags, links, environment, then the image.
pub fn run_args(launch: &LaunchSpec, env: &EnvList) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "--rm".to_string(),
        "-i".to_string(),
        format!("--memory={}m", launch.memory_mb),
    ];
    for link in &launch.links {
        args.push("--link".into());
        args.push(link.clone());
    }
    for assignment in env.assignments() {
        args.push("-e".into());
        args.push(assignment);
    }
    args.push(launch.image.clone());
    args
}

/// Passthrough variables set in `source`, in [`PASSTHROUGH_VARS`] order.
pub fn passthrough_env<S: EnvSource + ?Sized>(source: &S) -> Vec<(String, String)> {
    PASSTHROUGH_VARS
        .iter()
        .filter_map(|&key| source.var(key).map(|value| (key.to_string(), value)))
        .collect()
}

/// Launches function containers through the runtime client CLI.
///
/// Each dispatch spawns exactly one client process and waits for it; hot
/// repetitions travel inside the stdin batch rather than as extra launches.
pub struct Dispatcher {
    docker_bin: String,
    registry: Option<String>,
    passthrough: Vec<(String, String)>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            docker_bin: "docker".into(),
            registry: None,
            passthrough: passthrough_env(&ProcessEnv),
        }
    }

    /// Override the runtime client binary.
    pub fn with_bin(mut self, path: impl Into<String>) -> Self {
        self.docker_bin = path.into();
        self
    }

    /// Registry prefix for images whose name has no repository part.
    pub fn with_registry(mut self, registry: Option<String>) -> Self {
        self.registry = registry.filter(|r| !r.is_empty());
        self
    }

    /// Take passthrough variables from `source` instead of the process.
    pub fn with_env_source<S: EnvSource + ?Sized>(mut self, source: &S) -> Self {
        self.passthrough = passthrough_env(source);
        self
    }

    pub fn image_for(&self, declaration: &FunctionDeclaration) -> String {
        declaration.image_name(self.registry.as_deref())
    }

    /// Encode `request` for `declaration` and run its container to
    /// completion. Encoding errors abort before anything is launched.
    pub async fn invoke<O, E>(
        &self,
        declaration: &FunctionDeclaration,
        request: InvocationRequest,
        stdout: &mut O,
        stderr: &mut E,
    ) -> Result<DispatchOutcome, DispatchError>
    where
        O: AsyncWrite + Unpin + ?Sized,
        E: AsyncWrite + Unpin + ?Sized,
    {
        let format = request.format.or(declaration.format).unwrap_or_default();
        if declaration.kind == InvocationKind::Async {
            tracing::debug!(name = %declaration.name, "Async function dispatched synchronously");
        }

        let descriptor = RequestDescriptor::local(
            declaration,
            request.method,
            request.input,
            request.env,
            Utc::now(),
        );
        let envelope = hot::repeat(&descriptor, format, request.runs)?;

        let launch = LaunchSpec {
            image: self.image_for(declaration),
            memory_mb: declaration.memory,
            links: request.links,
        };

        let records = self.dispatch(&launch, envelope, stdout, stderr).await?;
        Ok(DispatchOutcome { format, records })
    }

    /// Run one container with `envelope`, relaying its stdout through the
    /// envelope's output transform and its stderr unmodified.
    pub async fn dispatch<O, E>(
        &self,
        launch: &LaunchSpec,
        envelope: Envelope,
        stdout: &mut O,
        stderr: &mut E,
    ) -> Result<Option<usize>, DispatchError>
    where
        O: AsyncWrite + Unpin + ?Sized,
        E: AsyncWrite + Unpin + ?Sized,
    {
        let args = run_args(launch, &envelope.env);
        tracing::info!(
            image = %launch.image,
            memory_mb = launch.memory_mb,
            links = launch.links.len(),
            env_vars = envelope.env.len(),
            stdin_bytes = envelope.stdin.len(),
            "Launching function container"
        );
        tracing::debug!(bin = %self.docker_bin, args = ?args, "Container command");

        let mut child = Command::new(&self.docker_bin)
            .args(&args)
            .envs(self.passthrough.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DispatchError::SpawnFailed {
                bin: self.docker_bin.clone(),
                source,
            })?;

        let (Some(mut child_stdin), Some(child_stdout), Some(mut child_stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(DispatchError::Io(std::io::Error::other(
                "child process stdio was not captured",
            )));
        };

        let input = envelope.stdin;
        let feed = async move {
            match child_stdin.write_all(&input).await {
                // The container may exit without draining its input.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                other => other?,
            }
            drop(child_stdin);
            Ok::<_, std::io::Error>(())
        };
        let out = relay(envelope.output, child_stdout, stdout);
        let err = async {
            tokio::io::copy(&mut child_stderr, stderr).await?;
            stderr.flush().await
        };

        let ((), records, ()) = tokio::try_join!(feed, out, err)?;
        let status = child.wait().await?;

        if !status.success() {
            tracing::warn!(code = ?status.code(), "Function container failed");
            return Err(DispatchError::NonZeroExit {
                code: status.code(),
            });
        }

        tracing::info!(records = ?records, "Function container finished");
        Ok(records)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
