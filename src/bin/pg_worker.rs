//! Runs one embedded `PostgreSQL` lifecycle step as an unprivileged user.
//!
//! Usage:
//!
//! ```text
//! pg_worker <setup|start|stop> <config-path>
//! ```
//!
//! The file at `config-path` holds a JSON [`WorkerPayload`]: the cluster
//! settings plus the environment overrides to apply before `PostgreSQL`
//! runs. When started as root the worker re-executes itself as `nobody`,
//! because `initdb` and `postgres` refuse to run with root privileges.

#[cfg(unix)]
use camino::{Utf8Path, Utf8PathBuf};
#[cfg(unix)]
use nix::unistd::{Uid, User, initgroups, setgid, setuid};
#[cfg(unix)]
use pg_embedded_setup_unpriv::ambient_dir_and_path;
#[cfg(unix)]
use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
#[cfg(unix)]
use postgresql_embedded::{PostgreSQL, Status};
#[cfg(unix)]
use std::ffi::CString;
#[cfg(unix)]
use std::io::{self, Read};
#[cfg(unix)]
use std::process::Command;
#[cfg(unix)]
use thiserror::Error;

#[cfg(unix)]
const REEXEC_MARKER: &str = "PG_WORKER_REEXEC";
#[cfg(unix)]
const TRUSTED_PATH: &str = "/usr/sbin:/usr/bin:/sbin:/bin";
#[cfg(unix)]
const UNPRIVILEGED_USER: &str = "nobody";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
#[derive(Debug, Error)]
enum WorkerError {
    #[error("usage: pg_worker <setup|start|stop> <config-path>: {0}")]
    Usage(String),
    #[error("failed to read worker config: {0}")]
    ConfigRead(#[source] BoxError),
    #[error("failed to parse worker config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("invalid cluster settings: {0}")]
    Settings(String),
    #[error("failed to build runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("failed to drop privileges: {0}")]
    PrivilegeDrop(String),
    #[error("postgres {operation} failed: {message}")]
    Postgres {
        operation: &'static str,
        message: String,
    },
}

#[cfg(unix)]
#[derive(Debug, Clone, Copy)]
enum Operation {
    Setup,
    Start,
    Stop,
}

#[cfg(unix)]
impl Operation {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }

    fn parse(value: &str) -> Result<Self, WorkerError> {
        match value {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(WorkerError::Usage(format!("unknown operation '{other}'"))),
        }
    }

    fn failed(self, err: &impl std::fmt::Display) -> WorkerError {
        WorkerError::Postgres {
            operation: self.as_str(),
            message: err.to_string(),
        }
    }
}

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    let args = collect_args()?;
    reexec_unprivileged(&args)?;
    let (operation, config_path) = parse_args(&args)?;
    run(operation, &config_path).map_err(Into::into)
}

#[cfg(unix)]
fn collect_args() -> Result<Vec<Utf8PathBuf>, WorkerError> {
    std::env::args_os()
        .map(|arg| {
            arg.into_string()
                .map(Utf8PathBuf::from)
                .map_err(|_| WorkerError::Usage("arguments must be valid UTF-8".into()))
        })
        .collect()
}

#[cfg(unix)]
fn parse_args(args: &[Utf8PathBuf]) -> Result<(Operation, Utf8PathBuf), WorkerError> {
    match args {
        [_, operation, config_path] => {
            Ok((Operation::parse(operation.as_str())?, config_path.clone()))
        }
        _ => Err(WorkerError::Usage(format!(
            "expected 2 arguments, got {}",
            args.len().saturating_sub(1)
        ))),
    }
}

#[cfg(unix)]
fn run(operation: Operation, config_path: &Utf8Path) -> Result<(), WorkerError> {
    let payload = load_payload(config_path)?;
    drop_privileges()?;
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| WorkerError::Settings(err.to_string()))?;
    apply_environment(&payload.environment);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(WorkerError::Runtime)?;
    let mut postgres = PostgreSQL::new(settings);
    runtime.block_on(async {
        match operation {
            Operation::Setup => {
                postgres.setup().await.map_err(|err| operation.failed(&err))?;
                ensure_started(&mut postgres, operation).await
            }
            Operation::Start => ensure_started(&mut postgres, operation).await,
            Operation::Stop => postgres.stop().await.map_err(|err| operation.failed(&err)),
        }
    })?;

    if matches!(operation, Operation::Setup | Operation::Start) {
        // The server must outlive this process.
        let _running = std::mem::ManuallyDrop::new(postgres);
    }
    Ok(())
}

#[cfg(unix)]
async fn ensure_started(postgres: &mut PostgreSQL, operation: Operation) -> Result<(), WorkerError> {
    if matches!(postgres.status(), Status::Started) {
        return Ok(());
    }
    postgres.start().await.map_err(|err| operation.failed(&err))
}

#[cfg(unix)]
fn load_payload(path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
    let (dir, relative) =
        ambient_dir_and_path(path).map_err(|err| WorkerError::ConfigRead(err.into()))?;
    let mut file = dir
        .open(relative.as_std_path())
        .map_err(|err| WorkerError::ConfigRead(Box::new(err)))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|err| WorkerError::ConfigRead(Box::new(err)))?;
    serde_json::from_slice(&bytes).map_err(WorkerError::ConfigParse)
}

/// Re-executes the worker as the unprivileged user when running as root.
///
/// Falls back to dropping privileges in-process when `runuser` is missing.
#[cfg(unix)]
fn reexec_unprivileged(args: &[Utf8PathBuf]) -> Result<(), WorkerError> {
    if !Uid::effective().is_root() || std::env::var_os(REEXEC_MARKER).is_some() {
        return Ok(());
    }

    let exe = std::env::current_exe().map_err(WorkerError::Runtime)?;
    let outcome = Command::new("runuser")
        .arg("-u")
        .arg(UNPRIVILEGED_USER)
        .arg("--")
        .arg(&exe)
        .args(args.iter().skip(1).map(|arg| arg.as_std_path()))
        .env(REEXEC_MARKER, "1")
        .env("PATH", TRUSTED_PATH)
        .status();
    match outcome {
        Ok(status) => std::process::exit(status.code().unwrap_or(1)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(WorkerError::PrivilegeDrop(err.to_string())),
    }
}

#[cfg(unix)]
fn drop_privileges() -> Result<(), WorkerError> {
    if !Uid::effective().is_root() {
        return Ok(());
    }

    let user = User::from_name(UNPRIVILEGED_USER)
        .map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?
        .ok_or_else(|| {
            WorkerError::PrivilegeDrop(format!("user '{UNPRIVILEGED_USER}' not found"))
        })?;
    let name = CString::new(user.name.clone())
        .map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;
    initgroups(&name, user.gid).map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;
    setgid(user.gid).map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;
    setuid(user.uid).map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;

    // SAFETY: the worker is single-threaded until the runtime is built.
    unsafe {
        std::env::set_var("HOME", &user.dir);
        std::env::set_var("USER", &user.name);
        std::env::set_var("LOGNAME", &user.name);
    }
    Ok(())
}

#[cfg(unix)]
fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
    for (key, value) in environment {
        // SAFETY: the worker is single-threaded until the runtime is built.
        unsafe {
            match value {
                Some(secret) => std::env::set_var(key, secret.expose()),
                None => std::env::remove_var(key),
            }
        }
    }
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker is only supported on Unix platforms".into())
}
