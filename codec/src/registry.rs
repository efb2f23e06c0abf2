//! Process-wide protocol table.
//!
//! The table is installed once at startup and read without locking after.

use std::sync::OnceLock;

use schema::Protocol;
use tracing::info;

use crate::error::{CodecError, CodecResult};

static PROTOCOL: OnceLock<Protocol> = OnceLock::new();

/// Installs the process-wide protocol table.
///
/// Only the first call succeeds; later calls return
/// [`CodecError::ProtocolAlreadyInstalled`] and leave the table unchanged.
pub fn install_protocol(protocol: Protocol) -> CodecResult<&'static Protocol> {
    let mut installed = false;
    let table = PROTOCOL.get_or_init(|| {
        installed = true;
        protocol
    });
    if !installed {
        return Err(CodecError::ProtocolAlreadyInstalled);
    }
    info!(
        packets = table.len(),
        fingerprint = format_args!("{:016x}", table.fingerprint()),
        "installed protocol table"
    );
    Ok(table)
}

/// The installed protocol table, if any.
#[must_use]
pub fn protocol() -> Option<&'static Protocol> {
    PROTOCOL.get()
}
