//! The server binary stops on SIGTERM even while its client holds stdin open.

#![cfg(all(unix, feature = "mcp-stdio"))]

use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};

fn spawn_server() -> Child {
    Command::new(env!("CARGO_BIN_EXE_azure-mcp-server"))
        .env_clear()
        .env("PATH", std::env::var_os("PATH").unwrap_or_default())
        .env("RUST_LOG", "info")
        .env("AZURE_TENANT_ID", "tenant-1")
        .env("AZURE_CLIENT_ID", "client-1")
        .env("AZURE_CLIENT_SECRET", "secret")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .unwrap()
}

async fn wait_for_log(stderr: ChildStderr, needle: &str) -> BufReader<ChildStderr> {
    let mut reader = BufReader::new(stderr);
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader.read_line(&mut line).await.unwrap();
        assert!(read > 0, "server exited before logging {needle:?}");
        if line.contains(needle) {
            return reader;
        }
    }
}

#[tokio::test]
async fn test_sigterm_stops_server_with_stdin_open() {
    let mut child = spawn_server();
    let stdin = child.stdin.take().unwrap();
    let stderr = child.stderr.take().unwrap();

    let _stderr = tokio::time::timeout(
        Duration::from_secs(30),
        wait_for_log(stderr, "MCP server ready"),
    )
    .await
    .unwrap();

    let pid = child.id().unwrap();
    let killed = std::process::Command::new("kill")
        .args(["-TERM", &pid.to_string()])
        .status()
        .unwrap();
    assert!(killed.success());

    let status = tokio::time::timeout(Duration::from_secs(10), child.wait())
        .await
        .expect("server still running after SIGTERM")
        .unwrap();
    assert!(status.success(), "exit status: {status}");
    drop(stdin);
}

#[tokio::test]
async fn test_stdin_close_stops_server() {
    let mut child = spawn_server();
    let stdin = child.stdin.take().unwrap();
    let stderr = child.stderr.take().unwrap();

    let _stderr = tokio::time::timeout(
        Duration::from_secs(30),
        wait_for_log(stderr, "MCP server ready"),
    )
    .await
    .unwrap();
    drop(stdin);

    let status = tokio::time::timeout(Duration::from_secs(10), child.wait())
        .await
        .expect("server still running after stdin closed")
        .unwrap();
    assert!(status.success(), "exit status: {status}");
}
