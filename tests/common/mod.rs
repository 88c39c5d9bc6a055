#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use tempfile::TempDir;

/// A running `virtual-hr` process, killed on drop.
pub struct Server {
    child: Child,
    pub base_url: String,
    pub database: PathBuf,
    _logs: TempDir,
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Server {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub fn base_cmd(database: &Path, listen: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_virtual-hr"));
    cmd.env("DOTENV_PATH", "/nonexistent/.env")
        .env("RUST_LOG", "warn,virtual_hr=info")
        .arg("--database")
        .arg(database)
        .arg("--api-listen")
        .arg(listen)
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd
}

const LISTENING_MARKER: &str = "REST listening on http://";

/// Address the server reported binding to, once the line reaches `log_file`.
fn bound_addr(log_file: &Path) -> Option<String> {
    let logs = std::fs::read_to_string(log_file).ok()?;
    let start = logs.find(LISTENING_MARKER)? + LISTENING_MARKER.len();
    let addr: String = logs[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ':')
        .collect();
    // A line still being written has no terminator after the port yet.
    let complete = logs.len() > start + addr.len();
    (complete && addr.contains(':')).then_some(addr)
}

pub fn client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("http client")
}

/// Starts the binary against `database` on an OS-assigned port, reads the
/// port back from its log file and waits until `/health` answers.
pub fn start_server(database: &Path) -> Server {
    let logs = TempDir::new().expect("log dir");
    let log_file = logs.path().join("virtual_hr.log");
    let mut child = base_cmd(database, "127.0.0.1:0")
        .arg("--log-file")
        .arg(&log_file)
        .spawn()
        .expect("spawn virtual-hr");

    let deadline = Instant::now() + Duration::from_secs(20);
    let addr = loop {
        if let Some(addr) = bound_addr(&log_file) {
            break addr;
        }
        if let Ok(Some(status)) = child.try_wait() {
            panic!("virtual-hr exited before listening: {status}");
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            panic!("virtual-hr did not report a listen address");
        }
        std::thread::sleep(Duration::from_millis(50));
    };

    let server = Server {
        child,
        base_url: format!("http://{}", addr),
        database: database.to_path_buf(),
        _logs: logs,
    };

    let client = client();
    loop {
        if let Ok(resp) = client.get(server.url("/health")).send() {
            if resp.status().is_success() {
                return server;
            }
        }
        assert!(Instant::now() < deadline, "virtual-hr did not become ready");
        std::thread::sleep(Duration::from_millis(100));
    }
}

pub fn start_fresh() -> (TempDir, Server) {
    let dir = TempDir::new().expect("temp dir");
    let server = start_server(&dir.path().join("virtual_hr.sqlite"));
    (dir, server)
}
