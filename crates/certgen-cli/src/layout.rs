//! On-disk layout of documents and issued certificates.
//!
//! ```text
//! <out>/json/ca_conf.json
//! <out>/json/ca_csr.json
//! <out>/json/<node>.csr.json
//! <out>/ca/ca.pem, ca-key.pem, ca.csr
//! <out>/<node>/<node>.pem, <node>-key.pem, <node>.csr
//! ```

use anyhow::{Context, Result};
use certgen_core::DocumentSet;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Directory under the output root holding the CA artifacts.
pub const CA_DIR: &str = "ca";

/// Paths under one output directory.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    json_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>, json_dir: &str) -> Self {
        let root = root.into();
        let json_dir = root.join(json_dir);
        Self { root, json_dir }
    }

    pub fn json_dir(&self) -> &Path {
        &self.json_dir
    }

    /// CA signing policy document.
    pub fn ca_config(&self) -> PathBuf {
        self.json_dir.join("ca_conf.json")
    }

    /// CA CSR document.
    pub fn ca_csr(&self) -> PathBuf {
        self.json_dir.join("ca_csr.json")
    }

    /// CSR document for `node`.
    pub fn node_csr(&self, node: &str) -> PathBuf {
        self.json_dir.join(format!("{node}.csr.json"))
    }

    /// Directory receiving the CA key and certificate.
    pub fn ca_dir(&self) -> PathBuf {
        self.root.join(CA_DIR)
    }

    /// Directory receiving the key and certificate of `node`.
    pub fn node_dir(&self, node: &str) -> PathBuf {
        self.root.join(node)
    }

    /// Reject a node whose directory would be the CA or document directory.
    ///
    /// Names are compared case-insensitively since the output may live on a
    /// case-insensitive filesystem.
    pub fn check_node_dir(&self, node: &str) -> Result<()> {
        let node_dir = self.node_dir(node);
        for reserved in [self.ca_dir(), self.json_dir.clone()] {
            let same = reserved.parent() == node_dir.parent()
                && reserved
                    .file_name()
                    .zip(node_dir.file_name())
                    .is_some_and(|(a, b)| a.eq_ignore_ascii_case(b));
            if same {
                anyhow::bail!(
                    "node name {node:?} collides with the output directory {}",
                    reserved.display()
                );
            }
        }
        Ok(())
    }

    /// Write every document, creating the document directory if needed.
    ///
    /// Node names are checked before anything touches the disk.
    pub async fn write_documents(&self, docs: &DocumentSet) -> Result<Vec<PathBuf>> {
        for node in docs.node_csrs.keys() {
            check_node_name(node)?;
            self.check_node_dir(node)?;
        }

        tokio::fs::create_dir_all(&self.json_dir)
            .await
            .with_context(|| format!("failed to create {}", self.json_dir.display()))?;

        let mut written = Vec::with_capacity(docs.node_csrs.len() + 2);

        let path = self.ca_config();
        write_json(&path, &docs.ca_config).await?;
        written.push(path);

        let path = self.ca_csr();
        write_json(&path, &docs.ca_csr).await?;
        written.push(path);

        for (node, csr) in &docs.node_csrs {
            let path = self.node_csr(node);
            write_json(&path, csr).await?;
            written.push(path);
        }

        Ok(written)
    }
}

/// Node names become file and directory names, so they must be a single
/// normal path component.
pub fn check_node_name(node: &str) -> Result<()> {
    let mut components = Path::new(node).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !node.contains(['/', '\\']) => Ok(()),
        _ => anyhow::bail!("node name {node:?} cannot be used as a file name"),
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), "wrote document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use certgen_core::{generate, resolve_str, ResolvedConfig};

    #[test]
    fn test_paths() {
        let layout = OutputLayout::new("/srv/pki", "json");
        assert_eq!(layout.ca_config(), PathBuf::from("/srv/pki/json/ca_conf.json"));
        assert_eq!(layout.ca_csr(), PathBuf::from("/srv/pki/json/ca_csr.json"));
        assert_eq!(layout.node_csr("n1"), PathBuf::from("/srv/pki/json/n1.csr.json"));
        assert_eq!(layout.ca_dir(), PathBuf::from("/srv/pki/ca"));
        assert_eq!(layout.node_dir("n1"), PathBuf::from("/srv/pki/n1"));
    }

    #[test]
    fn test_node_name_check() {
        assert!(check_node_name("1.example.com").is_ok());
        assert!(check_node_name("..").is_err());
        assert!(check_node_name(".").is_err());
        assert!(check_node_name("").is_err());
        assert!(check_node_name("a/b").is_err());
        assert!(check_node_name("/etc").is_err());
    }

    #[tokio::test]
    async fn test_write_documents() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path(), "json");
        let docs = generate(&ResolvedConfig::default());

        let written = layout.write_documents(&docs).await.unwrap();

        assert_eq!(written.len(), 4);
        let csr: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(layout.node_csr("1.example.com")).unwrap())
                .unwrap();
        assert_eq!(csr["CN"], "1.example.com");
        assert_eq!(csr["hosts"][1], "1.1.1.1");
        assert!(layout.ca_config().exists());
        assert!(layout.ca_csr().exists());
    }

    #[test]
    fn test_reserved_node_dirs() {
        let layout = OutputLayout::new("/srv/pki", "csr");
        assert!(layout.check_node_dir("ca").is_err());
        assert!(layout.check_node_dir("CA").is_err());
        assert!(layout.check_node_dir("csr").is_err());
        assert!(layout.check_node_dir("json").is_ok());
        assert!(layout.check_node_dir("ca.example.com").is_ok());

        let nested = OutputLayout::new("/srv/pki", "docs/json");
        assert!(nested.check_node_dir("json").is_ok());
        assert!(nested.check_node_dir("docs").is_ok());
    }

    #[tokio::test]
    async fn test_ca_node_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path(), "json");
        let config =
            resolve_str("etcd:\n  cluster:\n    c:\n      ca: [10.0.0.1]\n      n2: [10.0.0.2]\n")
                .unwrap();

        assert!(layout.write_documents(&generate(&config)).await.is_err());
        assert!(!layout.json_dir().exists());
    }

    #[tokio::test]
    async fn test_bad_node_name_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path(), "json");
        let config = resolve_str("etcd:\n  cluster:\n    c:\n      ../escape: [1.1.1.1]\n").unwrap();

        assert!(layout.write_documents(&generate(&config)).await.is_err());
        assert!(!layout.json_dir().exists());
    }
}
