//! # kvorm-cli
//!
//! Replays REST request scripts against an in-memory kvorm server.
//!
//! A script holds one request per line:
//!
//! ```text
//! # create, read, update, delete
//! POST /widget {"name": "gear", "count": 3}
//! GET /widget/1
//! PUT /widget/1 {"active": true}
//! DELETE /widget/1
//! ```
//!
//! Each request prints one line, `STATUS BODY`. Blank lines and lines starting
//! with `#` are skipped.

pub mod demo;
pub mod script;

pub use demo::{demo_server, DemoServer, Note, Widget};
pub use script::{execute, parse_line, run_script, ScriptError, ScriptLine};
