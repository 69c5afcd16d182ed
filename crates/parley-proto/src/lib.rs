//! # parley-proto
//!
//! Wire protocol for the parley broadcast chat service.
//!
//! The protocol is deliberately small: newline-delimited UTF-8 text, where a
//! line whose first non-whitespace character is `#` is a control command and
//! every other line is a chat payload. The one structured payload inside the
//! chat stream is the login announcement (`<identity> has logged on.`), kept
//! behind [`login`] so the binding policy stays independent of the phrasing.
//!
//! ## Quick Start
//!
//! ```rust
//! use parley_proto::{Input, MARKER};
//!
//! match Input::parse("#setport 6667") {
//!     Input::Command(cmd) => {
//!         assert_eq!(cmd.name, "setport");
//!         assert_eq!(cmd.args, vec!["6667"]);
//!     }
//!     Input::Chat(_) => unreachable!(),
//! }
//! assert_eq!(MARKER, '#');
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod input;
#[cfg(feature = "tokio")]
pub mod line;
pub mod login;
pub mod router;

pub use self::error::ProtocolError;
pub use self::input::{Command, Input, MARKER};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::login::{announcement, parse_announcement, LOGIN_SENTINEL};
pub use self::router::{Handler, RouteError, RouteResult, Router};
