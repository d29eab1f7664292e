//! cfssl driver for etcd cluster certificates.
//!
//! [`Cfssl`] runs `cfssl gencert` once for the CA and once per member, and
//! [`Bundle`] stores each result the way `cfssljson -bare` would.

mod bundle;
mod error;
mod runner;

pub use bundle::{BareFiles, Bundle};
pub use error::{CfsslError, Result};
pub use runner::{Cfssl, CfsslBuilder, SignRequest, DEFAULT_PROGRAM};
