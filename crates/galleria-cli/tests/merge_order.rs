mod common;
use common::TestEnv;
use predicates::prelude::*;

#[test]
fn local_upload_precedes_manifest_and_tag_filters() {
    let t = TestEnv::new();
    t.write_manifest(r#"[{"src":"a.jpg","title":"A","tags":["x"]}]"#);
    let png = t.write_png("b.png");
    t.bin()
        .arg("upload")
        .arg(&png)
        .args(["--title", "B", "--description", "new bed", "--tags", "y, z, extra"])
        .assert()
        .success()
        .stdout(predicate::str::contains("uploaded B [y,z]"));

    assert_eq!(t.titles(&[]), ["B", "A"]);
    assert_eq!(t.titles(&["--tag", "x"]), ["A"]);
    assert_eq!(t.titles(&["--query", "BED"]), ["B"]);

    let v = t.list_json(&[]);
    assert!(v[0]["src"].as_str().unwrap().starts_with("data:image/jpeg;base64,"));
    assert_eq!(v[0]["tags"], serde_json::json!(["y", "z"]));
}

#[test]
fn missing_manifest_renders_empty_gallery() {
    let t = TestEnv::new();
    t.bin().arg("render").assert().success().stdout("");
    assert!(t.titles(&[]).is_empty());
}

#[test]
fn malformed_manifest_is_ignored() {
    let t = TestEnv::new();
    t.write_manifest("<!doctype html><p>not found</p>");
    t.bin()
        .args(["add", "--src", "images/c.jpg", "--title", "C", "--date", "2024-04-04"])
        .assert()
        .success();
    assert_eq!(t.titles(&[]), ["C"]);
}

#[test]
fn tags_lists_distinct_tags() {
    let t = TestEnv::new();
    t.write_manifest(r#"[{"src":"a.jpg","tags":["x","y"]},{"src":"b.jpg","tags":["y","z"]}]"#);
    t.bin()
        .arg("tags")
        .assert()
        .success()
        .stdout("x\ny\nz\n");
}
