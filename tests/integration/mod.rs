// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests
#![allow(dead_code)]

use chrono::NaiveDate;
use clipform::{Config, Pipeline};
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use tempfile::TempDir;

/// Reference date every integration test pins
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid reference date")
}

static SHARED_PIPELINE: OnceLock<Pipeline> = OnceLock::new();

/// Default-config pipeline shared across tests in one binary
pub fn shared_pipeline() -> &'static Pipeline {
    SHARED_PIPELINE.get_or_init(|| pipeline_with(Config::default()))
}

pub fn pipeline_with(config: Config) -> Pipeline {
    Pipeline::new(config)
        .expect("Pipeline construction should succeed")
        .with_today(today())
}

/// Temporary directory holding config files
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            root_path,
        }
    }

    /// Write a TOML config file and return its path
    pub fn create_config_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root_path.join(name);
        fs::write(&path, content).expect("Failed to write config file");
        path
    }
}
