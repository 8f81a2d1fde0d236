#![allow(dead_code)]
use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    _dir: TempDir,
    pub db: PathBuf,
    pub cfg: PathBuf,
    pub site: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = dir.path().join("config");
        std::fs::create_dir_all(&cfg).expect("cfg dir");
        let site = dir.path().join("site");
        std::fs::create_dir_all(&site).expect("site dir");
        let db = dir.path().join("galleria.db");
        Self {
            _dir: dir,
            db,
            cfg,
            site,
        }
    }

    /// Command with isolated config, database and (missing) manifest.
    pub fn bin(&self) -> Command {
        let mut cmd = Command::cargo_bin("galleria").unwrap();
        cmd.env("XDG_CONFIG_HOME", &self.cfg);
        cmd.env_remove("RUST_LOG");
        cmd.arg("--db").arg(&self.db);
        cmd.arg("--manifest").arg(self.manifest_path());
        cmd
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.site.join("photos.json")
    }

    pub fn write_manifest(&self, json: &str) {
        std::fs::write(self.manifest_path(), json).unwrap();
    }

    pub fn write_png(&self, name: &str) -> PathBuf {
        use image::{ImageBuffer, Rgba, RgbaImage};
        let path = self.site.join(name);
        let img: RgbaImage = ImageBuffer::from_pixel(4, 4, Rgba([245, 159, 176, 255]));
        img.save(&path).unwrap();
        path
    }

    pub fn list_json(&self, extra: &[&str]) -> serde_json::Value {
        let out = self
            .bin()
            .arg("list")
            .args(extra)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).unwrap()
    }

    pub fn titles(&self, extra: &[&str]) -> Vec<String> {
        self.list_json(extra)
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap().to_string())
            .collect()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
