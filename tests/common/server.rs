//! Test server management.
//!
//! Spawns and manages parleyd instances for integration testing. The
//! spawned process's stdin doubles as the operator console, so tests can
//! drive `#stop`/`#start`/`#close` and friends.

use std::io::Write;
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// A test server instance.
pub struct TestServer {
    child: Child,
    stdin: ChildStdin,
    port: u16,
    _data_dir: TempDir,
}

impl TestServer {
    /// Spawn a test server with the default (echoing) relay policy.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        Self::spawn_with(port, true).await
    }

    /// Spawn a test server with an explicit echo policy.
    #[allow(dead_code)]
    pub async fn spawn_with(port: u16, echo_to_sender: bool) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;

        // Minimal test configuration; throttling raised out of the way.
        let config_path = data_dir.path().join("config.toml");
        let config_content = format!(
            r#"
[server]
name = "test.server"

[listen]
address = "127.0.0.1"
port = {port}

[relay]
echo_to_sender = {echo_to_sender}
message_rate = 1000.0
message_burst = 1000.0
"#
        );
        std::fs::write(&config_path, config_content)?;

        let mut child = Command::new(env!("CARGO_BIN_EXE_parleyd"))
            .arg(port.to_string())
            .arg(&config_path)
            .stdin(Stdio::piped())
            .spawn()?;

        let stdin = child.stdin.take().expect("child stdin is piped");

        let server = Self {
            child,
            stdin,
            port,
            _data_dir: data_dir,
        };

        server.wait_until_ready().await?;
        Ok(server)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Type a line at the operator console.
    #[allow(dead_code)]
    pub fn console(&mut self, line: &str) -> anyhow::Result<()> {
        self.stdin.write_all(line.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Create a new test client connected to this server.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address()).await
    }

    /// Wait for the server process to exit (after `#quit`).
    #[allow(dead_code)]
    pub async fn wait_exit(&mut self) -> anyhow::Result<ExitStatus> {
        for _ in 0..50 {
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server did not exit within 5 seconds")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
