//! The per-command surface of [`crate::Client`], one module per
//! data-structure category. Every method follows the same shape: build the
//! command frame, round-trip it, convert the reply. No caching, batching or
//! local validation happens on the way.

pub mod hash;
pub mod list;
pub mod set;
pub mod stream;
pub mod string;
pub mod zset;

use crate::cmd::Cmd;

/// Appends the optional MATCH/COUNT clauses shared by the SCAN family.
pub(crate) fn scan_args(cmd: Cmd, pattern: Option<&str>, count: Option<u64>) -> Cmd {
    let cmd = match pattern {
        Some(pattern) => cmd.arg("MATCH").arg(pattern),
        None => cmd,
    };
    match count {
        Some(count) => cmd.arg("COUNT").arg(count),
        None => cmd,
    }
}
