mod common;
use common::TestEnv;

#[test]
fn config_json_prints_paths() {
    let t = TestEnv::new();
    let out = t
        .bin()
        .args(["config", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert!(v.get("storage").is_some());
    let cfgdir = v.get("config_dir").and_then(|s| s.as_str()).unwrap_or("");
    assert!(cfgdir.contains("galleria"));
}

#[test]
fn sync_without_endpoint_fails() {
    let t = TestEnv::new();
    t.bin().arg("sync").assert().failure();
}
