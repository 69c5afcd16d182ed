//! Client console command handlers.

use crate::session::ClientSession;
use async_trait::async_trait;
use parley_proto::{Handler, RouteError, RouteResult, Router};

/// Build the router with every client command registered.
pub fn client_router() -> Router<ClientSession> {
    let mut router = Router::new();
    router.insert("quit", Box::new(QuitHandler));
    router.insert("logoff", Box::new(LogoffHandler));
    router.insert("login", Box::new(LoginHandler));
    router.insert("gethost", Box::new(GetHostHandler));
    router.insert("getport", Box::new(GetPortHandler));
    router.insert("sethost", Box::new(SetHostHandler));
    router.insert("setport", Box::new(SetPortHandler));
    router
}

/// `#quit` - disconnect and terminate the client.
pub struct QuitHandler;

#[async_trait]
impl Handler<ClientSession> for QuitHandler {
    async fn handle(&self, session: &mut ClientSession, _args: &[String]) -> RouteResult {
        session.disconnect().await;
        session.quitting = true;
        Ok(())
    }
}

/// `#logoff` - disconnect but keep the client running.
pub struct LogoffHandler;

#[async_trait]
impl Handler<ClientSession> for LogoffHandler {
    async fn handle(&self, session: &mut ClientSession, _args: &[String]) -> RouteResult {
        if session.is_connected() {
            session.disconnect().await;
        } else {
            session.display("Not connected to a server.");
        }
        Ok(())
    }
}

/// `#login` - open the connection, only when not already connected.
pub struct LoginHandler;

#[async_trait]
impl Handler<ClientSession> for LoginHandler {
    async fn handle(&self, session: &mut ClientSession, _args: &[String]) -> RouteResult {
        if session.is_connected() {
            session.display("You are already connected to the server.");
            return Ok(());
        }
        match session.connect().await {
            Ok(()) => {
                let notice =
                    format!("Connected to {}:{}.", session.host(), session.port());
                session.display(&notice);
            }
            Err(e) => {
                let notice = format!(
                    "Cannot open connection to {}:{}: {e}",
                    session.host(),
                    session.port()
                );
                session.display(&notice);
            }
        }
        Ok(())
    }
}

/// `#gethost` - display the configured host.
pub struct GetHostHandler;

#[async_trait]
impl Handler<ClientSession> for GetHostHandler {
    async fn handle(&self, session: &mut ClientSession, _args: &[String]) -> RouteResult {
        let notice = format!("Current host: {}", session.host());
        session.display(&notice);
        Ok(())
    }
}

/// `#getport` - display the configured port.
pub struct GetPortHandler;

#[async_trait]
impl Handler<ClientSession> for GetPortHandler {
    async fn handle(&self, session: &mut ClientSession, _args: &[String]) -> RouteResult {
        let notice = format!("Current port: {}", session.port());
        session.display(&notice);
        Ok(())
    }
}

/// `#sethost <host>` - change the target host; only while disconnected.
pub struct SetHostHandler;

#[async_trait]
impl Handler<ClientSession> for SetHostHandler {
    async fn handle(&self, session: &mut ClientSession, args: &[String]) -> RouteResult {
        let [host] = args else {
            return Err(RouteError::Usage("#sethost <host>"));
        };
        if session.is_connected() {
            session.display("Cannot change host while connected. Log off first.");
            return Ok(());
        }
        session.set_host(host.clone());
        let notice = format!("Host set to {host}.");
        session.display(&notice);
        Ok(())
    }
}

/// `#setport <port>` - change the target port; only while disconnected.
pub struct SetPortHandler;

#[async_trait]
impl Handler<ClientSession> for SetPortHandler {
    async fn handle(&self, session: &mut ClientSession, args: &[String]) -> RouteResult {
        let [arg] = args else {
            return Err(RouteError::Usage("#setport <port>"));
        };
        let port: u16 = arg
            .parse()
            .map_err(|_| RouteError::Usage("#setport <port>"))?;
        if session.is_connected() {
            session.display("Cannot change port while connected. Log off first.");
            return Ok(());
        }
        session.set_port(port);
        let notice = format!("Port set to {port}.");
        session.display(&notice);
        Ok(())
    }
}
