//! Cluster description resolution.
//!
//! The input document is read into a loosely-typed [`serde_yaml::Value`] and
//! the `etcd` block is then deserialized through a schema whose fields are all
//! optional. Present keys override the defaults held by
//! [`ResolvedConfig::default`]; absent keys keep them.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{CertgenError, Result};

/// Ordered mapping from node hostname to its addresses.
pub type Nodes = IndexMap<String, Vec<String>>;

/// Subject name attributes (`OU`, `O`, `C`, ...) copied into every CSR.
pub type SubjectDetails = IndexMap<String, String>;

/// Name of the top-level section holding the cluster description.
pub const ROOT_SECTION: &str = "etcd";

/// Fully defaulted cluster description.
///
/// Built once per run by [`resolve`] and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Certificate lifetime as a cfssl duration string (`24h`, `8760h`).
    pub expiry: String,

    /// Key algorithm passed to cfssl (`rsa`, `ecdsa`).
    pub key_algorithm: String,

    /// Key size, kept in its textual form.
    pub key_size: String,

    /// Subject attributes embedded in every CSR.
    pub subject_details: SubjectDetails,

    /// Parsed for compatibility. Not used when generating documents.
    pub include_localhost: bool,

    /// Common name of the cluster CA.
    pub cluster_name: String,

    /// Cluster members in declaration order.
    pub nodes: Nodes,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            expiry: String::from("24h"),
            key_algorithm: String::from("rsa"),
            key_size: String::from("4096"),
            subject_details: IndexMap::from([(String::from("OU"), String::from("example.com"))]),
            include_localhost: false,
            cluster_name: String::from("etcd.example.com"),
            nodes: IndexMap::from([
                (
                    String::from("1.example.com"),
                    vec![String::from("1.1.1.1"), String::from("1.2.3.4")],
                ),
                (
                    String::from("2.example.com"),
                    vec![String::from("2.1.1.1"), String::from("2.2.3.4")],
                ),
            ]),
        }
    }
}

impl ResolvedConfig {
    /// Overlay the keys present in `raw` onto `self`.
    fn apply(mut self, raw: RawEtcd) -> Result<Self> {
        if let Some(expiry) = raw.expiry {
            self.expiry = expiry;
        }
        if let Some(details) = raw.details {
            self.subject_details = details;
        }
        if let Some(include_localhost) = raw.include_localhost {
            self.include_localhost = include_localhost;
        }

        if let Some(key) = raw.key {
            if let Some(algo) = key.algo {
                self.key_algorithm = algo;
            }
            if let Some(size) = key.size {
                self.key_size = size.into_string();
            }
        }

        if let Some(cluster) = raw.cluster {
            if cluster.len() != 1 {
                return Err(CertgenError::MultipleClusters {
                    count: cluster.len(),
                });
            }
            if let Some((name, nodes)) = cluster.into_iter().next() {
                self.cluster_name = name;
                self.nodes = nodes;
            }
        }

        Ok(self)
    }
}

/// Schema of the `etcd` block. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct RawEtcd {
    #[serde(default)]
    expiry: Option<String>,

    #[serde(default)]
    key: Option<RawKey>,

    #[serde(default)]
    details: Option<SubjectDetails>,

    #[serde(default)]
    include_localhost: Option<bool>,

    #[serde(default)]
    cluster: Option<IndexMap<String, Nodes>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawKey {
    #[serde(default)]
    algo: Option<String>,

    #[serde(default)]
    size: Option<Scalar>,
}

/// A key size written either as `"4096"` or `4096`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Integer(u64),
    Text(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Integer(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

/// Resolve an already parsed document into a [`ResolvedConfig`].
///
/// # Errors
///
/// - [`CertgenError::MissingSection`] if there is no `etcd` block
/// - [`CertgenError::MultipleClusters`] if `cluster` does not name exactly one cluster
/// - [`CertgenError::MalformedInput`] on any type mismatch
pub fn resolve(raw: &Value) -> Result<ResolvedConfig> {
    if !raw.is_mapping() {
        return Err(CertgenError::MalformedInput(String::from(
            "top level of the document must be a mapping",
        )));
    }

    let etcd = raw
        .get(ROOT_SECTION)
        .filter(|v| !v.is_null())
        .ok_or(CertgenError::MissingSection(ROOT_SECTION))?;

    let raw_etcd: RawEtcd = serde_yaml::from_value(etcd.clone())?;
    ResolvedConfig::default().apply(raw_etcd)
}

/// Parse YAML text and resolve it.
pub fn resolve_str(input: &str) -> Result<ResolvedConfig> {
    let raw: Value = serde_yaml::from_str(input)?;
    resolve(&raw)
}
