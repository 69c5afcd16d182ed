//! Server lifecycle driven from the operator console: stop/start gating,
//! close semantics, port changes, clean shutdown.

mod common;

use common::TestServer;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::sleep;

/// How long to wait for a console command to take effect.
const SETTLE: Duration = Duration::from_millis(500);

#[tokio::test]
async fn test_stop_gates_new_connections() -> anyhow::Result<()> {
    let mut server = TestServer::spawn(7731).await?;

    let mut early = server.connect().await?;
    early.login("early").await?;
    assert_eq!(early.recv_line().await?, "early has logged on.");

    server.console("#stop")?;
    sleep(SETTLE).await;

    // New connections are refused while stopped...
    assert!(TcpStream::connect(server.address()).await.is_err());

    // ...but the existing client is unaffected.
    early.send_line("still here").await?;
    assert_eq!(early.recv_line().await?, "early> still here");

    server.console("#start")?;
    sleep(SETTLE).await;

    let mut late = server.connect().await?;
    late.login("late").await?;
    assert_eq!(late.recv_line().await?, "late has logged on.");

    Ok(())
}

#[tokio::test]
async fn test_close_force_closes_all_connections() -> anyhow::Result<()> {
    let mut server = TestServer::spawn(7732).await?;

    let mut alice = server.connect().await?;
    alice.login("alice").await?;
    assert_eq!(alice.recv_line().await?, "alice has logged on.");

    let mut bob = server.connect().await?;
    bob.login("bob").await?;
    assert_eq!(bob.recv_line().await?, "bob has logged on.");

    server.console("#close")?;

    alice.expect_closed().await?;
    bob.expect_closed().await?;

    // Closed is terminal: nothing is accepting anymore.
    sleep(SETTLE).await;
    assert!(TcpStream::connect(server.address()).await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_setport_rejected_while_listening() -> anyhow::Result<()> {
    let mut server = TestServer::spawn(7733).await?;

    // Rejected: the server keeps listening on the original port.
    server.console("#setport 7743")?;
    sleep(SETTLE).await;
    assert!(TcpStream::connect("127.0.0.1:7733").await.is_ok());
    assert!(TcpStream::connect("127.0.0.1:7743").await.is_err());

    // Legal while stopped, effective on the next start.
    server.console("#stop")?;
    sleep(SETTLE).await;
    server.console("#setport 7743")?;
    server.console("#start")?;
    sleep(SETTLE).await;

    assert!(TcpStream::connect("127.0.0.1:7743").await.is_ok());
    assert!(TcpStream::connect("127.0.0.1:7733").await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_quit_exits_cleanly() -> anyhow::Result<()> {
    let mut server = TestServer::spawn(7734).await?;

    let mut client = server.connect().await?;
    client.login("alice").await?;
    assert_eq!(client.recv_line().await?, "alice has logged on.");

    server.console("#quit")?;

    client.expect_closed().await?;
    let status = server.wait_exit().await?;
    assert!(status.success());

    Ok(())
}
