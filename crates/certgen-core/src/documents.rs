//! cfssl documents derived from a [`ResolvedConfig`].
//!
//! Field names follow the JSON cfssl reads: the CA signing policy
//! (`signing.default`, `signing.profiles`) and CSRs (`CN`, `hosts`, `key`,
//! `names`).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::config::{ResolvedConfig, SubjectDetails};

/// Key usages cfssl understands in a signing profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Usage {
    /// Digital signature
    #[serde(rename = "signing")]
    Signing,
    /// Key encipherment
    #[serde(rename = "key encipherment")]
    KeyEncipherment,
    /// TLS server authentication
    #[serde(rename = "server auth")]
    ServerAuth,
    /// TLS client authentication
    #[serde(rename = "client auth")]
    ClientAuth,
}

/// Named signing profiles written to the CA policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningProfile {
    /// Certificates presented by servers to clients
    Server,
    /// Certificates presented by clients to servers
    Client,
    /// Certificates used between cluster members in both directions
    #[default]
    Peer,
}

impl SigningProfile {
    /// All profiles in the order they appear in the policy.
    pub const ALL: [Self; 3] = [Self::Server, Self::Client, Self::Peer];

    /// Fixed usage table for this profile.
    #[must_use]
    pub const fn usages(self) -> &'static [Usage] {
        match self {
            Self::Server => &[Usage::Signing, Usage::KeyEncipherment, Usage::ServerAuth],
            Self::Client => &[Usage::Signing, Usage::KeyEncipherment, Usage::ClientAuth],
            Self::Peer => &[
                Usage::Signing,
                Usage::KeyEncipherment,
                Usage::ServerAuth,
                Usage::ClientAuth,
            ],
        }
    }

    /// Name passed to `cfssl gencert -profile`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Client => "client",
            Self::Peer => "peer",
        }
    }
}

impl std::fmt::Display for SigningProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CA signing policy (`-config` for `cfssl gencert`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaConfig {
    /// Signing section
    pub signing: Signing,
}

/// Default policy plus named profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signing {
    /// Policy applied when no profile is requested
    pub default: SigningDefault,
    /// Named profiles
    pub profiles: Profiles,
}

/// Default signing policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningDefault {
    /// Certificate lifetime
    pub expiry: String,
}

/// The three fixed profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profiles {
    pub server: Profile,
    pub client: Profile,
    pub peer: Profile,
}

impl Profiles {
    /// Look up a profile by name.
    #[must_use]
    pub const fn get(&self, profile: SigningProfile) -> &Profile {
        match profile {
            SigningProfile::Server => &self.server,
            SigningProfile::Client => &self.client,
            SigningProfile::Peer => &self.peer,
        }
    }
}

/// A single signing profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    /// Certificate lifetime
    pub expiry: String,
    /// Allowed key usages
    pub usages: Vec<Usage>,
}

impl Profile {
    fn new(profile: SigningProfile, expiry: &str) -> Self {
        Self {
            expiry: expiry.to_string(),
            usages: profile.usages().to_vec(),
        }
    }
}

/// Key size as written in a CSR.
///
/// cfssl decodes `key.size` as an integer, so a purely numeric size is
/// emitted as a JSON number. Anything else is passed through as a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySize(pub String);

impl Serialize for KeySize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<u64>() {
            Ok(n) => serializer.serialize_u64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

/// Key request block of a CSR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySpec {
    /// Algorithm name
    pub algo: String,
    /// Key size
    pub size: KeySize,
}

/// CSR for the self-signed cluster CA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaCsr {
    /// Common name (the cluster name)
    #[serde(rename = "CN")]
    pub common_name: String,
    /// Key request
    pub key: KeySpec,
    /// Subject names, always a single entry
    pub names: Vec<SubjectDetails>,
}

/// CSR for one cluster member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeCsr {
    /// Common name (the node name)
    #[serde(rename = "CN")]
    pub common_name: String,
    /// Node name followed by its addresses
    pub hosts: Vec<String>,
    /// Key request
    pub key: KeySpec,
    /// Subject names, always a single entry
    pub names: Vec<SubjectDetails>,
}

/// Every document needed to bootstrap the cluster PKI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSet {
    /// CA signing policy
    pub ca_config: CaConfig,
    /// CA CSR
    pub ca_csr: CaCsr,
    /// Node CSRs keyed by node name, in declaration order
    pub node_csrs: IndexMap<String, NodeCsr>,
}

/// Build the CA signing policy.
#[must_use]
pub fn ca_config(config: &ResolvedConfig) -> CaConfig {
    let expiry = config.expiry.as_str();
    CaConfig {
        signing: Signing {
            default: SigningDefault {
                expiry: expiry.to_string(),
            },
            profiles: Profiles {
                server: Profile::new(SigningProfile::Server, expiry),
                client: Profile::new(SigningProfile::Client, expiry),
                peer: Profile::new(SigningProfile::Peer, expiry),
            },
        },
    }
}

fn key_spec(config: &ResolvedConfig) -> KeySpec {
    KeySpec {
        algo: config.key_algorithm.clone(),
        size: KeySize(config.key_size.clone()),
    }
}

/// Build the CA CSR.
#[must_use]
pub fn ca_csr(config: &ResolvedConfig) -> CaCsr {
    CaCsr {
        common_name: config.cluster_name.clone(),
        key: key_spec(config),
        names: vec![config.subject_details.clone()],
    }
}

/// Build one CSR per node, preserving node order.
#[must_use]
pub fn node_csrs(config: &ResolvedConfig) -> IndexMap<String, NodeCsr> {
    config
        .nodes
        .iter()
        .map(|(node, addresses)| {
            let hosts = std::iter::once(node.clone())
                .chain(addresses.iter().cloned())
                .collect();
            let csr = NodeCsr {
                common_name: node.clone(),
                hosts,
                key: key_spec(config),
                names: vec![config.subject_details.clone()],
            };
            (node.clone(), csr)
        })
        .collect()
}

/// Generate the full document set.
#[must_use]
pub fn generate(config: &ResolvedConfig) -> DocumentSet {
    DocumentSet {
        ca_config: ca_config(config),
        ca_csr: ca_csr(config),
        node_csrs: node_csrs(config),
    }
}
