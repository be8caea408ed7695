//! NodeMCU File-System Protocol
//!
//! This crate drives the file system of an ESP8266 running the NodeMCU Lua
//! firmware through its interactive serial console. There is no binary
//! protocol: every operation is one or more Lua statements typed at the REPL,
//! and results are read back from what the console prints.
//!
//! # Protocol Overview
//!
//! - **Commands** (host → device): one Lua statement terminated with `\r\n`.
//!   All data is embedded as escaped, ASCII-only string literals.
//! - **Echo**: the console echoes every statement verbatim, followed by `\r\n`,
//!   before any output. The echo is always discarded.
//! - **Responses** (device → host): a printed line (`true`, `nil`, a number),
//!   raw bytes of a known length (`uart.write`), or free-form output that ends
//!   when the `> ` prompt reappears.
//!
//! # Example
//!
//! ```rust,ignore
//! use nodemcu_protocol::{Session, TcpChannel};
//!
//! let channel = TcpChannel::connect("127.0.0.1:2000", Duration::from_secs(2))?;
//! let mut session = Session::new(channel);
//! session.flush()?;
//! if session.get_version()?.is_supported() {
//!     session.write_file("init.lua", b"print('hello')")?;
//! }
//! ```

mod channel;
mod codec;
mod commands;
mod error;
mod literal;
mod responses;
mod session;

pub use channel::*;
pub use codec::*;
pub use commands::*;
pub use error::*;
pub use literal::*;
pub use responses::*;
pub use session::*;
