//! etcd-certgen - cfssl documents and certificates for an etcd cluster.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    certgen_cli::run().await
}
