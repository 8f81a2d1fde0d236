mod common;
use common::TestEnv;
use predicates::prelude::*;

#[test]
fn delete_removes_local_duplicates_keeps_manifest() {
    let t = TestEnv::new();
    t.write_manifest(r#"[{"src":"images/a.jpg","title":"Remote"}]"#);
    for title in ["Local 1", "Local 2"] {
        t.bin()
            .args(["add", "--src", "images/a.jpg", "--title", title, "--date", "2024-01-01"])
            .assert()
            .success();
    }
    assert_eq!(t.titles(&[]), ["Local 2", "Local 1", "Remote"]);

    t.bin()
        .args(["delete", "images/a.jpg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted 2 local photo(s)"));
    assert_eq!(t.titles(&[]), ["Remote"]);

    t.bin()
        .args(["delete", "images/a.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no local photo"));
}
