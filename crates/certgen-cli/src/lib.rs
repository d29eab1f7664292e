//! # certgen-cli
//!
//! Command-line front end that bootstraps the PKI of an etcd cluster.
//!
//! ## Features
//!
//! - **Documents**: CA signing policy, CA CSR and one CSR per member, as cfssl JSON
//! - **Issuance**: runs `cfssl gencert` for the CA and every member
//! - **Dry run**: `--dry-run` prints the documents as JSON or YAML
//! - **Settings**: optional TOML file for the cfssl binary, document directory and timeout

pub mod cli;
pub mod issue;
pub mod layout;
pub mod logging;
pub mod output;
pub mod settings;

pub use cli::run;
