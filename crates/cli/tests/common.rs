// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::{Path, PathBuf};
use std::process::Output;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use mp_relay::RelayState;
use tokio::net::TcpListener;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn mailpulse() -> Command {
    cargo_bin_cmd!("mailpulse")
}

/// A URL nothing is listening on.
pub fn closed_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("ws://127.0.0.1:{}/notifications", port)
}

/// Temp config dir with its own `mailpulse.toml` and token file.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    /// Sandbox pointing at a relay that is not running.
    pub fn new() -> Self {
        Self::with_url(&closed_url())
    }

    pub fn with_url(url: &str) -> Self {
        Self::with_config(&format!(
            "url = \"{}\"\nconnect_timeout_secs = 2\nauto_reconnect = false\n",
            url
        ))
    }

    /// Sandbox with extra config lines; `token_file` is always added.
    pub fn with_config(extra: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let token_file = dir.path().join("token");
        let content = format!(
            "{}token_file = \"{}\"\n",
            extra,
            token_file.display()
        );
        std::fs::write(dir.path().join("mailpulse.toml"), content).unwrap();
        Sandbox { dir }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("mailpulse.toml")
    }

    pub fn token_path(&self) -> PathBuf {
        self.dir.path().join("token")
    }

    pub fn store_token(&self, token: &str) {
        std::fs::write(self.token_path(), format!("{}\n", token)).unwrap();
    }

    /// `mailpulse --config <sandbox>/mailpulse.toml`, isolated from the
    /// caller's environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = mailpulse();
        cmd.arg("--config")
            .arg(self.config_path())
            .env("XDG_CONFIG_HOME", self.dir.path())
            .env("HOME", self.dir.path())
            .env("NO_COLOR", "1")
            .env_remove("MAILPULSE_TOKEN")
            .env_remove("MAILPULSE_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run the command off the async runtime so an in-process relay keeps
    /// serving while it executes.
    pub async fn run(&self, args: &[&str]) -> Output {
        let mut cmd = self.cmd();
        cmd.args(args);
        tokio::task::spawn_blocking(move || cmd.output())
            .await
            .unwrap()
            .unwrap()
    }
}

/// In-process relay on a random port.
pub struct Relay {
    pub state: RelayState,
    pub url: String,
}

impl Relay {
    pub async fn start(tokens: &[&str]) -> Self {
        let state = RelayState::new(tokens.iter().map(|t| t.to_string()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/notifications", listener.local_addr().unwrap());

        let serving = state.clone();
        tokio::spawn(async move {
            let _ = mp_relay::serve(listener, serving).await;
        });

        Relay { state, url }
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        self.state.shutdown();
    }
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn exists(path: &Path) -> bool {
    path.exists()
}
