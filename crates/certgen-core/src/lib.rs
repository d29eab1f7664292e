//! Core configuration derivation for etcd cluster PKI.
//!
//! This crate turns a small cluster description into the JSON documents cfssl
//! needs to bootstrap a CA and issue one certificate per cluster member:
//!
//! - **Resolution**: [`resolve`] applies defaults and validates the `etcd` block
//! - **Generation**: [`generate`] derives the CA policy, CA CSR and node CSRs
//! - **Errors**: [`CertgenError`] for every way resolution can fail
//!
//! Nothing here performs I/O; writing the documents and running cfssl is left
//! to the caller.
//!
//! # Example
//!
//! ```rust
//! use certgen_core::{generate, resolve_str};
//!
//! let config = resolve_str(
//!     "etcd:\n  cluster:\n    foo.example.com:\n      n1: [10.0.0.1]\n",
//! )?;
//! let docs = generate(&config);
//!
//! assert_eq!(docs.ca_csr.common_name, "foo.example.com");
//! assert_eq!(docs.node_csrs["n1"].hosts, vec!["n1", "10.0.0.1"]);
//! # Ok::<(), certgen_core::CertgenError>(())
//! ```

pub mod config;
pub mod documents;
mod error;

pub use config::{resolve, resolve_str, Nodes, ResolvedConfig, SubjectDetails};
pub use documents::{
    generate, CaConfig, CaCsr, DocumentSet, KeySize, KeySpec, NodeCsr, Profile, SigningProfile,
    Usage,
};
pub use error::{CertgenError, Result};
