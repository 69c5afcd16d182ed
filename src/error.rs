//! Unified error handling for parleyd.
//!
//! Command-dispatch diagnostics (`RouteError`) live in `parley-proto`; this
//! module holds the transport- and lifecycle-level errors. All of them are
//! handled at the boundary where they occur and converted into a diagnostic
//! or an isolated per-peer closure, never propagated as a fault.

use thiserror::Error;

/// The peer is gone (closed, or its outgoing queue saturated); the send was
/// dropped. Always isolated to the one peer it names.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("connection closed")]
pub struct ConnectionClosed;

/// Errors from starting or resuming the listener.
///
/// A bind failure is reported to the operator and leaves the server state
/// unchanged.
#[derive(Debug, Error)]
pub enum ListenError {
    #[error("already listening")]
    AlreadyListening,

    #[error("server is closed")]
    Closed,

    #[error("failed to bind listener: {0}")]
    Bind(#[from] std::io::Error),
}

/// Rejected port change.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortChangeError {
    #[error("cannot change port while listening")]
    Listening,
}
