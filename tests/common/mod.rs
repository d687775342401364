//! Shared integration-test harness: a fake Twilio gateway, config fixtures,
//! and a helper for spawning the `catfacts` binary.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use axum::extract::{Path as UrlPath, State};
use axum::routing::post;
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

/// Default timeout for anything a test waits on.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ADMIN: &str = "+15551234567";
pub const SENDER: &str = "+15550001111";
pub const TARGET: &str = "5559998888";

// ============================================================================
// Fake gateway
// ============================================================================

/// A message the fake gateway accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayMessage {
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Body")]
    pub body: String,
}

/// Local stand-in for the Twilio Messages API.
pub struct FakeGateway {
    pub base_url: String,
    received: mpsc::UnboundedReceiver<GatewayMessage>,
}

impl FakeGateway {
    #[allow(clippy::missing_panics_doc)]
    pub async fn start() -> Self {
        let (tx, received) = mpsc::unbounded_channel();
        let app = Router::new()
            .route(
                "/2010-04-01/Accounts/{sid}/Messages.json",
                post(accept_message),
            )
            .with_state(tx);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{addr}"),
            received,
        }
    }

    /// Waits for the next accepted message.
    #[allow(clippy::missing_panics_doc)]
    pub async fn next(&mut self) -> GatewayMessage {
        tokio::time::timeout(DEFAULT_TIMEOUT, self.received.recv())
            .await
            .expect("timed out waiting for gateway message")
            .expect("gateway channel closed")
    }

    /// Collects the next `n` messages.
    pub async fn take(&mut self, n: usize) -> Vec<GatewayMessage> {
        let mut messages = Vec::with_capacity(n);
        for _ in 0..n {
            messages.push(self.next().await);
        }
        messages
    }

    /// Asserts nothing arrives within `quiet`.
    #[allow(clippy::missing_panics_doc)]
    pub async fn assert_quiet(&mut self, quiet: Duration) {
        if let Ok(Some(msg)) = tokio::time::timeout(quiet, self.received.recv()).await {
            panic!("unexpected gateway message: {msg:?}");
        }
    }
}

async fn accept_message(
    State(tx): State<mpsc::UnboundedSender<GatewayMessage>>,
    UrlPath(sid): UrlPath<String>,
    Form(message): Form<GatewayMessage>,
) -> Json<Value> {
    let _ = tx.send(message);
    Json(json!({ "sid": format!("SM{sid}"), "status": "queued" }))
}

// ============================================================================
// Fixtures
// ============================================================================

/// Writes a facts file and a config pointing at `gateway_url`, returning the
/// config path.
#[allow(clippy::missing_panics_doc)]
pub fn write_fixture(dir: &Path, gateway_url: &str, facts: &[&str], interval_ms: u64) -> PathBuf {
    std::fs::create_dir_all(dir.join("data")).unwrap();
    std::fs::write(
        dir.join("data/catfacts.json"),
        serde_json::to_string(facts).unwrap(),
    )
    .unwrap();

    let config = format!(
        r#"
twilio_sid: ACtest
twilio_auth_token: secret
twilio_api_base: "{gateway_url}"
catfacts_number: "{SENDER}"
authorized_users: ["{ADMIN}"]
attackInterval: {interval_ms}
server_root: "https://catfacts.example.com"
"#
    );
    let path = dir.join("config.yaml");
    std::fs::write(&path, config).unwrap();
    path
}

// ============================================================================
// Binary
// ============================================================================

/// Runs the binary to completion with `ENVIRONMENT` cleared.
#[allow(clippy::missing_panics_doc)]
pub async fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_catfacts"))
        .args(args)
        .env_remove("ENVIRONMENT")
        .env_remove("CATFACTS_CONFIG")
        .stdin(Stdio::null())
        .output()
        .await
        .expect("failed to run catfacts")
}

/// A `catfacts serve` process on an ephemeral port.
///
/// The child process is killed on drop via `kill_on_drop(true)`.
pub struct ServeProcess {
    child: Child,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl ServeProcess {
    /// Spawns `catfacts serve` and reads stderr until the
    /// "HTTP server listening" line to discover the port.
    #[allow(clippy::missing_panics_doc)]
    pub async fn start(config_path: &Path, events_file: &Path) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_catfacts"))
            .args([
                "serve",
                "--config",
                config_path.to_str().unwrap(),
                "--http",
                "127.0.0.1:0",
                "--events-file",
                events_file.to_str().unwrap(),
                "--color",
                "never",
                "-v",
            ])
            .env_remove("ENVIRONMENT")
            .env_remove("CATFACTS_LOG_LEVEL")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .expect("failed to spawn catfacts");

        let stderr = child.stderr.take().expect("stderr not captured");
        let mut reader = BufReader::new(stderr);
        let mut line = String::new();
        let mut port: Option<u16> = None;

        let deadline = tokio::time::Instant::now() + DEFAULT_TIMEOUT;
        while tokio::time::Instant::now() < deadline {
            line.clear();
            let n = tokio::time::timeout(DEFAULT_TIMEOUT, reader.read_line(&mut line))
                .await
                .expect("timed out waiting for HTTP server startup")
                .expect("failed to read stderr");
            assert!(n > 0, "server exited before printing listening address");

            if line.contains("HTTP server listening") {
                if let Some(start) = line.find("127.0.0.1:") {
                    let digits: String = line[start + "127.0.0.1:".len()..]
                        .chars()
                        .take_while(char::is_ascii_digit)
                        .collect();
                    port = digits.parse().ok();
                }
                break;
            }
        }

        // Keep draining stderr so the child never blocks on a full pipe
        tokio::spawn(async move {
            let mut sink = String::new();
            while reader.read_line(&mut sink).await.is_ok_and(|n| n > 0) {
                sink.clear();
            }
        });

        let port = port.expect("failed to discover HTTP server port from stderr");
        Self {
            child,
            base_url: format!("http://127.0.0.1:{port}"),
            client: reqwest::Client::new(),
        }
    }

    /// Posts an inbound SMS the way the gateway would.
    #[allow(clippy::missing_panics_doc)]
    pub async fn sms(&self, from: &str, body: &str) -> (u16, String) {
        let resp = self
            .client
            .post(format!("{}/incoming-sms", self.base_url))
            .form(&[("From", from), ("Body", body)])
            .send()
            .await
            .expect("POST /incoming-sms failed");
        let status = resp.status().as_u16();
        (status, resp.text().await.unwrap_or_default())
    }

    /// Sends SIGTERM and waits for exit.
    #[allow(clippy::missing_panics_doc)]
    pub async fn terminate(mut self) -> std::process::ExitStatus {
        let pid = self.child.id().expect("child already exited");
        let _ = std::process::Command::new("kill")
            .args(["-TERM", &pid.to_string()])
            .status();
        tokio::time::timeout(DEFAULT_TIMEOUT, self.child.wait())
            .await
            .expect("server did not exit after SIGTERM")
            .expect("wait failed")
    }
}
