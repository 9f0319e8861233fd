#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use leadflow::api::ApiSettings;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::MockServer;

/// Success envelope around `data`.
pub fn envelope(data: Value) -> Value {
    json!({ "code": 0, "message": "ok", "data": data })
}

/// Failure envelope with a non-zero code.
pub fn failure(code: i64, message: &str) -> Value {
    json!({ "code": code, "message": message, "data": null })
}

pub fn page(content: Value, total: u64) -> Value {
    envelope(json!({ "content": content, "totalElements": total }))
}

pub fn settings(server: &MockServer) -> ApiSettings {
    ApiSettings::new(&server.uri())
        .expect("mock server uri")
        .with_token("lf_test_token")
}

/// Runs the `leadflow` binary against an isolated root directory.
pub struct LeadflowTest {
    pub temp_dir: TempDir,
    base_url: Option<String>,
}

impl LeadflowTest {
    pub fn new() -> Self {
        LeadflowTest {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            base_url: None,
        }
    }

    /// Point the binary at `server`.
    pub fn with_server(mut self, server: &MockServer) -> Self {
        self.base_url = Some(server.uri());
        self
    }

    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join(".leadflow")
    }

    pub fn run(&self, args: &[&str]) -> Output {
        let mut command = Command::new(env!("CARGO_BIN_EXE_leadflow"));
        command
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("LEADFLOW_ROOT", self.root())
            .env("NO_COLOR", "1")
            .env_remove("LEADFLOW_API_TOKEN")
            .env_remove("LEADFLOW_BASE_URL")
            .env_remove("LEADFLOW_STORAGE")
            .env_remove("LEADFLOW_ORG")
            .env_remove("LEADFLOW_WORKSPACE")
            .env_remove("LEADFLOW_LOG");
        if let Some(url) = &self.base_url {
            command.env("LEADFLOW_BASE_URL", url);
        }
        command.output().expect("Failed to execute leadflow command")
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

    pub fn run_json(&self, args: &[&str]) -> Value {
        let stdout = self.run_success(args);
        serde_json::from_str(&stdout).expect("command output is JSON")
    }

    pub fn write_config(&self, content: &str) {
        fs::create_dir_all(self.root()).expect("Failed to create .leadflow directory");
        fs::write(self.root().join("config.yaml"), content).expect("Failed to write config file");
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.root().join("config.yaml")).expect("Failed to read config file")
    }

    pub fn read_storage(&self) -> Value {
        let content = fs::read_to_string(self.root().join("storage.json"))
            .expect("Failed to read storage file");
        serde_json::from_str(&content).expect("storage is JSON")
    }
}
