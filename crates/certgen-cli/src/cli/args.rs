//! Command-line argument definitions using clap.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Generate cfssl documents and certificates for an etcd cluster
///
/// Reads a cluster description, writes the CA policy, CA CSR and one CSR per
/// member under OUT_DIR/json, then runs cfssl to issue the CA and every
/// member certificate.
#[derive(Parser, Debug)]
#[command(name = "etcd-certgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Cluster description (YAML with a top-level `etcd` block)
    pub config: PathBuf,

    /// Directory to write documents and certificates into
    #[arg(default_value = ".")]
    pub out_dir: PathBuf,

    /// cfssl binary to run
    #[arg(long, env = "CFSSL_BIN")]
    pub cfssl: Option<PathBuf>,

    /// Signing profile used for member certificates
    #[arg(long, value_enum, default_value_t = Profile::Peer)]
    pub profile: Profile,

    /// Write the documents but do not run cfssl
    #[arg(long, conflicts_with = "dry_run")]
    pub no_issue: bool,

    /// Print the documents instead of writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Format used by --dry-run
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Settings file (defaults to the platform config directory)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Signing profile names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// TLS server certificates
    Server,
    /// TLS client certificates
    Client,
    /// Member-to-member certificates (server and client auth)
    Peer,
}

impl From<Profile> for certgen_core::SigningProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Server => Self::Server,
            Profile::Client => Self::Client,
            Profile::Peer => Self::Peer,
        }
    }
}
