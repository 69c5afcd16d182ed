//! Broadcast behavior: identity prefixing and the echo policy.

mod common;

use common::TestServer;
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test]
async fn test_identified_roundtrip_with_echo() -> anyhow::Result<()> {
    let server = TestServer::spawn(7711).await?;

    let mut alice = server.connect().await?;
    alice.login("alice").await?;
    // Default policy echoes broadcasts back to the sender, so alice sees
    // her own announcement once the server has processed it.
    assert_eq!(alice.recv_line().await?, "alice has logged on.");

    let mut bob = server.connect().await?;
    bob.login("bob").await?;
    assert_eq!(bob.recv_line().await?, "bob has logged on.");
    assert_eq!(alice.recv_line().await?, "bob has logged on.");

    alice.send_line("hi").await?;
    assert_eq!(bob.recv_line().await?, "alice> hi");
    assert_eq!(alice.recv_line().await?, "alice> hi");

    Ok(())
}

#[tokio::test]
async fn test_echo_disabled_skips_sender() -> anyhow::Result<()> {
    let server = TestServer::spawn_with(7712, false).await?;

    let mut alice = server.connect().await?;
    alice.login("alice").await?;
    // No echo to observe; give the server a moment to bind the identity.
    sleep(Duration::from_millis(300)).await;

    let mut bob = server.connect().await?;
    bob.login("bob").await?;
    assert_eq!(alice.recv_line().await?, "bob has logged on.");

    alice.send_line("hi").await?;
    assert_eq!(bob.recv_line().await?, "alice> hi");

    // Alice never receives her own message: the next line she sees is
    // bob's marker, which the server processed after "hi".
    bob.send_line("marker").await?;
    assert_eq!(alice.recv_line().await?, "bob> marker");

    Ok(())
}
