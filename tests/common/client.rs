//! Test chat client.
//!
//! A raw line-oriented client for integration testing: send lines, assert
//! on received lines, observe the connection closing.

use parley_proto::login;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// A test chat client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Send a raw line.
    pub async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Send the login announcement for an identity.
    pub async fn login(&mut self, identity: &str) -> anyhow::Result<()> {
        self.send_line(&login::announcement(identity)).await
    }

    /// Receive a single line, failing on timeout or closed connection.
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        match self.try_recv_line(Duration::from_secs(5)).await? {
            Some(line) => Ok(line),
            None => anyhow::bail!("connection closed"),
        }
    }

    /// Receive a line with a timeout. `Ok(None)` means the server closed
    /// the connection.
    pub async fn try_recv_line(&mut self, dur: Duration) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Assert that the server closes this connection within the timeout.
    #[allow(dead_code)]
    pub async fn expect_closed(&mut self) -> anyhow::Result<()> {
        loop {
            match self.try_recv_line(Duration::from_secs(5)).await? {
                Some(_) => continue,
                None => return Ok(()),
            }
        }
    }
}
