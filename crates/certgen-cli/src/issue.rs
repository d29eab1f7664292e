//! Issuance of the CA and member certificates through cfssl.

use anyhow::{Context, Result};
use certgen_cfssl::{BareFiles, Cfssl, SignRequest};
use certgen_core::{DocumentSet, SigningProfile};
use tracing::info;

use crate::layout::OutputLayout;

/// Base name cfssl artifacts of the CA are written under.
const CA_BASE: &str = crate::layout::CA_DIR;

/// Files produced by one issuance run.
#[derive(Debug, Clone)]
pub struct Issued {
    /// CA certificate and key
    pub ca: BareFiles,
    /// Member certificates in node order
    pub nodes: Vec<(String, BareFiles)>,
}

/// Self-sign the CA, then sign every member CSR with it.
///
/// Documents must already be written to `layout`. Invocations run one after
/// another and the first failure stops the run.
pub async fn issue_all(
    cfssl: &Cfssl,
    layout: &OutputLayout,
    docs: &DocumentSet,
    profile: SigningProfile,
) -> Result<Issued> {
    let ca_dir = layout.ca_dir();
    tokio::fs::create_dir_all(&ca_dir)
        .await
        .with_context(|| format!("failed to create {}", ca_dir.display()))?;

    let ca = cfssl
        .init_ca(&layout.ca_csr())
        .await
        .context("failed to generate the CA certificate")?
        .write_bare(&ca_dir, CA_BASE)
        .await?;
    info!(cert = %ca.cert.display(), "CA certificate written");

    let ca_config = layout.ca_config();
    let mut nodes = Vec::with_capacity(docs.node_csrs.len());

    for node in docs.node_csrs.keys() {
        let node_dir = layout.node_dir(node);
        tokio::fs::create_dir_all(&node_dir)
            .await
            .with_context(|| format!("failed to create {}", node_dir.display()))?;

        let csr = layout.node_csr(node);
        let request = SignRequest {
            ca_cert: &ca.cert,
            ca_key: &ca.key,
            ca_config: &ca_config,
            profile,
            csr: &csr,
        };

        let files = cfssl
            .sign(&request)
            .await
            .with_context(|| format!("failed to issue the certificate for {node}"))?
            .write_bare(&node_dir, node)
            .await?;
        info!(node = %node, cert = %files.cert.display(), "member certificate written");

        nodes.push((node.clone(), files));
    }

    Ok(Issued { ca, nodes })
}
