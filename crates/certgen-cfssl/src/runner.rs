//! Invocation of the `cfssl` binary.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use certgen_core::SigningProfile;
use tokio::process::Command;
use tracing::{debug, info};

use crate::bundle::Bundle;
use crate::error::{CfsslError, Result};

/// Program looked up on `PATH` when none is configured
pub const DEFAULT_PROGRAM: &str = "cfssl";

/// Default limit for a single cfssl run
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Inputs for signing one member certificate with the cluster CA.
#[derive(Debug, Clone, Copy)]
pub struct SignRequest<'a> {
    /// CA certificate (`-ca`)
    pub ca_cert: &'a Path,
    /// CA private key (`-ca-key`)
    pub ca_key: &'a Path,
    /// Signing policy (`-config`)
    pub ca_config: &'a Path,
    /// Profile within the policy (`-profile`)
    pub profile: SigningProfile,
    /// Member CSR document
    pub csr: &'a Path,
}

/// Handle on a cfssl installation
#[derive(Debug, Clone)]
pub struct Cfssl {
    program: PathBuf,
    timeout: Duration,
}

impl Default for Cfssl {
    fn default() -> Self {
        CfsslBuilder::new().build()
    }
}

impl Cfssl {
    /// Use the given binary with default settings
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CfsslBuilder::new().program(program).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> CfsslBuilder {
        CfsslBuilder::new()
    }

    /// Binary this handle runs
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Self-sign a new CA from its CSR document (`gencert -initca`).
    pub async fn init_ca(&self, ca_csr: &Path) -> Result<Bundle> {
        info!(csr = %ca_csr.display(), "generating CA certificate");
        self.run(init_ca_args(ca_csr)).await
    }

    /// Issue a certificate for one member CSR.
    pub async fn sign(&self, request: &SignRequest<'_>) -> Result<Bundle> {
        info!(
            csr = %request.csr.display(),
            profile = %request.profile,
            "signing member certificate"
        );
        self.run(sign_args(request)).await
    }

    async fn run(&self, args: Vec<OsString>) -> Result<Bundle> {
        let program = self.program.display().to_string();
        debug!(program = %program, ?args, "spawning cfssl");

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CfsslError::Spawn {
                program: program.clone(),
                source,
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| CfsslError::Timeout {
                program: program.clone(),
                after: self.timeout,
            })?
            .map_err(|source| CfsslError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CfsslError::Failed {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Bundle::from_json(&output.stdout)
    }
}

fn init_ca_args(ca_csr: &Path) -> Vec<OsString> {
    vec![
        OsString::from("gencert"),
        OsString::from("-initca"),
        ca_csr.as_os_str().to_owned(),
    ]
}

fn flag(name: &str, value: &Path) -> OsString {
    let mut arg = OsString::from(format!("-{name}="));
    arg.push(value.as_os_str());
    arg
}

fn sign_args(request: &SignRequest<'_>) -> Vec<OsString> {
    vec![
        OsString::from("gencert"),
        flag("ca", request.ca_cert),
        flag("ca-key", request.ca_key),
        flag("config", request.ca_config),
        OsString::from(format!("-profile={}", request.profile)),
        request.csr.as_os_str().to_owned(),
    ]
}

/// Builder for configuring a [`Cfssl`] handle
#[derive(Debug, Clone)]
pub struct CfsslBuilder {
    program: PathBuf,
    timeout: Duration,
}

impl Default for CfsslBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CfsslBuilder {
    /// Start from `cfssl` on `PATH` and the default timeout
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the binary to run
    #[must_use]
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the per-invocation timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the handle
    #[must_use]
    pub fn build(self) -> Cfssl {
        Cfssl {
            program: self.program,
            timeout: self.timeout,
        }
    }
}
