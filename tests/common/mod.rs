#![allow(dead_code)]

pub mod fake_api;

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

pub use fake_api::{FakeApi, GOOD_TOKEN, spawn_fake_api};

/// Runs the clinic-console binary against an isolated config file
pub struct ConsoleTest {
    pub temp_dir: TempDir,
    api_url: Option<String>,
}

impl ConsoleTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        ConsoleTest {
            temp_dir,
            api_url: None,
        }
    }

    /// Point the binary at `api_url` through the environment.
    pub fn with_api(mut self, api_url: &str) -> Self {
        self.api_url = Some(api_url.to_string());
        self
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("config.yaml")
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.config_path()).unwrap_or_default()
    }

    pub fn run(&self, args: &[&str]) -> Output {
        let mut command = Command::new(env!("CARGO_BIN_EXE_clinic-console"));
        command
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("CLINIC_CONSOLE_CONFIG", self.config_path())
            .env("NO_COLOR", "1")
            .env_remove("CLINIC_API_TOKEN")
            .env_remove("RUST_LOG");
        match &self.api_url {
            Some(url) => command.env("CLINIC_API_URL", url),
            None => command.env_remove("CLINIC_API_URL"),
        };
        command
            .output()
            .expect("Failed to execute clinic-console command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }
}
