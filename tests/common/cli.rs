use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch workspace with its own database file and no ambient config.
pub struct CliWorkspace {
    pub dir: TempDir,
}

impl CliWorkspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("boostme.db")
    }

    pub fn dsn(&self) -> String {
        format!("sqlite:///{}", self.db_path().display())
    }

    /// `boostme` run inside the workspace with a scrubbed environment.
    pub fn bare_cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("boostme").expect("binary built");
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env_remove("RUST_LOG")
            .env_remove("DB_URL")
            .env_remove("DEBUG")
            .env_remove("BOOSTME_DB_URL")
            .env_remove("BOOSTME_PROFILE")
            .env_remove("BOOSTME_SEED")
            .env_remove("BOOSTME_LOG_FILE");
        cmd
    }

    /// `boostme --db <workspace db>`.
    pub fn cmd(&self) -> Command {
        let mut cmd = self.bare_cmd();
        cmd.arg("--db").arg(self.dsn());
        cmd
    }

    /// Run with `--json` and parse stdout, asserting the expected exit code.
    pub fn json(&self, args: &[&str], code: i32) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run boostme");
        assert_eq!(
            output.status.code(),
            Some(code),
            "args {args:?}\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is JSON")
    }
}
