//! Configurable limits for datagram encoding.

/// Default maximum transmission unit in bytes.
pub const MTU: usize = 1200;

/// Wire-level limits applied when building datagrams.
///
/// The MTU bounds every buffer the encoder emits, header included. It is
/// measured before zero-coding, which can only shrink a datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum datagram size in bytes.
    pub mtu: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { mtu: MTU }
    }
}

impl Limits {
    /// Creates limits with the given MTU.
    #[must_use]
    pub const fn with_mtu(mtu: usize) -> Self {
        Self { mtu }
    }

    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self { mtu: 256 }
    }

    /// Creates limits with no restrictions (never fragments).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self { mtu: usize::MAX }
    }
}
