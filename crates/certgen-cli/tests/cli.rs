use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const SINGLE_CLUSTER: &str = "\
etcd:
  expiry: 8760h
  details:
    O: acme
    OU: infra
  cluster:
    foo.example.com:
      n1: [10.0.0.1]
      n2: [10.0.0.2, 192.168.0.2]
";

const TWO_CLUSTERS: &str = "\
etcd:
  cluster:
    a:
      n1: [10.0.0.1]
    b:
      n2: [10.0.0.2]
";

/// Fake `gencert` script run as `sh gencert <args>`; records its arguments.
#[cfg(unix)]
const FAKE_GENCERT: &str = r#"printf '%s\n' "$*" >> calls.log
case "$1" in
  -initca) printf '{"cert":"ca-cert","key":"ca-key","csr":"ca-csr"}' ;;
  *) printf '{"cert":"member-cert","key":"member-key","csr":"member-csr"}' ;;
esac
"#;

fn workspace(config: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cluster.yaml"), config).unwrap();
    dir
}

fn certgen(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("etcd-certgen").unwrap();
    cmd.current_dir(dir)
        .env_remove("CFSSL_BIN")
        .env_remove("RUST_LOG")
        .arg("--settings")
        .arg(dir.join("settings.toml"));
    cmd
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn missing_config_argument_fails_with_usage() {
    Command::cargo_bin("etcd-certgen")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn dry_run_prints_documents_and_writes_nothing() {
    let dir = workspace(SINGLE_CLUSTER);

    let output = certgen(dir.path())
        .args(["cluster.yaml", "out", "--dry-run"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let docs: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(docs["ca_csr"]["CN"], "foo.example.com");
    assert_eq!(docs["node_csrs"]["n1"]["hosts"], serde_json::json!(["n1", "10.0.0.1"]));
    assert_eq!(docs["ca_config"]["signing"]["profiles"]["peer"]["expiry"], "8760h");
    assert!(!dir.path().join("out").exists());
}

#[test]
fn dry_run_yaml() {
    let dir = workspace(SINGLE_CLUSTER);

    certgen(dir.path())
        .args(["cluster.yaml", "--dry-run", "--output", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CN: foo.example.com"));
}

#[test]
fn no_issue_writes_json_layout() {
    let dir = workspace(SINGLE_CLUSTER);

    certgen(dir.path())
        .args(["cluster.yaml", "out", "--no-issue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote 4 documents"));

    let json = dir.path().join("out/json");
    let ca_conf = read_json(&json.join("ca_conf.json"));
    assert_eq!(ca_conf["signing"]["default"]["expiry"], "8760h");

    let ca_csr = read_json(&json.join("ca_csr.json"));
    assert_eq!(ca_csr["CN"], "foo.example.com");
    assert_eq!(ca_csr["key"], serde_json::json!({"algo": "rsa", "size": 4096}));
    assert_eq!(ca_csr["names"], serde_json::json!([{"O": "acme", "OU": "infra"}]));

    let n2 = read_json(&json.join("n2.csr.json"));
    assert_eq!(
        n2["hosts"],
        serde_json::json!(["n2", "10.0.0.2", "192.168.0.2"])
    );
    assert!(!dir.path().join("out/ca").exists());
}

#[test]
fn output_dir_defaults_to_cwd() {
    let dir = workspace(SINGLE_CLUSTER);

    certgen(dir.path())
        .args(["cluster.yaml", "--no-issue"])
        .assert()
        .success();

    assert!(dir.path().join("json/n1.csr.json").exists());
}

#[test]
fn settings_json_dir_is_honoured() {
    let dir = workspace(SINGLE_CLUSTER);
    std::fs::write(dir.path().join("settings.toml"), "json_dir = \"csr\"\n").unwrap();

    certgen(dir.path())
        .args(["cluster.yaml", "out", "--no-issue"])
        .assert()
        .success();

    assert!(dir.path().join("out/csr/ca_conf.json").exists());
}

#[test]
fn multiple_clusters_fail_without_output() {
    let dir = workspace(TWO_CLUSTERS);

    certgen(dir.path())
        .args(["cluster.yaml", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only one cluster is supported"));

    assert!(!dir.path().join("out").exists());
}

#[test]
fn malformed_input_fails() {
    let dir = workspace("etcd:\n  cluster: [a, b]\n");

    certgen(dir.path())
        .args(["cluster.yaml", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed input"));
}

#[test]
fn missing_input_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    certgen(dir.path())
        .args(["absent.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn unavailable_cfssl_fails_after_writing_documents() {
    let dir = workspace(SINGLE_CLUSTER);

    certgen(dir.path())
        .args(["cluster.yaml", "out", "--cfssl", "/nonexistent/certgen/cfssl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to generate the CA certificate"));

    assert!(dir.path().join("out/json/ca_csr.json").exists());
}

#[cfg(unix)]
#[test]
fn issues_ca_then_every_member() {
    let dir = workspace(SINGLE_CLUSTER);
    std::fs::write(dir.path().join("gencert"), FAKE_GENCERT).unwrap();

    certgen(dir.path())
        .args(["cluster.yaml", "out", "--cfssl", "sh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Issued:"));

    let out = dir.path().join("out");
    assert_eq!(std::fs::read_to_string(out.join("ca/ca.pem")).unwrap(), "ca-cert");
    assert_eq!(std::fs::read_to_string(out.join("ca/ca-key.pem")).unwrap(), "ca-key");
    assert_eq!(std::fs::read_to_string(out.join("n1/n1.pem")).unwrap(), "member-cert");
    assert_eq!(std::fs::read_to_string(out.join("n2/n2-key.pem")).unwrap(), "member-key");
    assert!(out.join("n2/n2.csr").exists());

    let calls = std::fs::read_to_string(dir.path().join("calls.log")).unwrap();
    let calls: Vec<&str> = calls.lines().collect();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], "-initca out/json/ca_csr.json");
    assert_eq!(
        calls[1],
        "-ca=out/ca/ca.pem -ca-key=out/ca/ca-key.pem -config=out/json/ca_conf.json -profile=peer out/json/n1.csr.json"
    );
    assert!(calls[2].ends_with("-profile=peer out/json/n2.csr.json"));
}

#[cfg(unix)]
#[test]
fn node_named_like_ca_dir_is_rejected_before_issuing() {
    let dir = workspace("etcd:\n  cluster:\n    c:\n      ca: [10.0.0.1]\n      n2: [10.0.0.2]\n");
    std::fs::write(dir.path().join("gencert"), FAKE_GENCERT).unwrap();

    certgen(dir.path())
        .args(["cluster.yaml", "out", "--cfssl", "sh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("collides with the output directory"));

    assert!(!dir.path().join("out").exists());
    assert!(!dir.path().join("calls.log").exists());
}
