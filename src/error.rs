//! Unified error types for the switchlink core.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! caller's error handling uniform. All variants are `Copy` so outcomes can
//! be stored in events and passed through the exchange machinery without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
///
/// Each accepted exchange terminates with exactly one outcome; the failure
/// half of that outcome is one of these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid — rejected at startup, never at runtime.
    Config(ConfigError),
    /// The device identifier has no registered peer address.
    PeerNotFound,
    /// An exchange is already in flight for this device (explicit
    /// backpressure — sends are never silently queued).
    Busy,
    /// An inbound frame could not be parsed.
    Decode(DecodeError),
    /// The transport failed to transmit locally.
    Link(LinkError),
    /// All attempts were exhausted without a matching acknowledgement.
    Timeout,
    /// The exchange was cancelled before completion.
    Cancelled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::PeerNotFound => write!(f, "peer not registered"),
            Self::Busy => write!(f, "exchange already in flight"),
            Self::Decode(e) => write!(f, "decode: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Timeout => write!(f, "no acknowledgement after all attempts"),
            Self::Cancelled => write!(f, "exchange cancelled"),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Peer address string failed MAC validation.
    InvalidAddress(AddrError),
    /// `retry_count` outside [1, 100].
    RetryCountOutOfRange,
    /// `retry_interval_ms` outside [10, 5000].
    RetryIntervalOutOfRange,
    /// Response token must be non-empty.
    EmptyToken,
    /// Two switches share the same device identifier.
    DuplicateDevice,
    /// More switches than the registry can hold.
    TooManyPeers,
    /// Stored/provisioned config failed deserialization.
    Corrupted,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAddress(e) => write!(f, "invalid peer address: {e}"),
            Self::RetryCountOutOfRange => write!(f, "retry_count out of range [1, 100]"),
            Self::RetryIntervalOutOfRange => {
                write!(f, "retry_interval_ms out of range [10, 5000]")
            }
            Self::EmptyToken => write!(f, "response token is empty"),
            Self::DuplicateDevice => write!(f, "duplicate device identifier"),
            Self::TooManyPeers => write!(f, "too many peers configured"),
            Self::Corrupted => write!(f, "config corrupted"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Address parse errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrError {
    /// Not exactly 6 colon/hyphen-separated groups.
    WrongGroupCount,
    /// A group is not exactly 2 characters.
    WrongGroupLength,
    /// A group contains a non-hex character.
    NonHexDigit,
}

impl fmt::Display for AddrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongGroupCount => write!(f, "MAC address must have 6 pairs of hex digits"),
            Self::WrongGroupLength => write!(f, "each MAC group must be 2 hex digits"),
            Self::NonHexDigit => write!(f, "invalid hex digit in MAC address"),
        }
    }
}

impl From<AddrError> for Error {
    fn from(e: AddrError) -> Self {
        Self::Config(ConfigError::InvalidAddress(e))
    }
}

// ---------------------------------------------------------------------------
// Frame decode errors
// ---------------------------------------------------------------------------

/// Decoding never panics on adversarial input; it returns this instead.
/// Malformed inbound frames are logged and dropped — the link carries
/// unrelated traffic, so this is not propagated to any caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer is not a well-formed frame. The string names the first
    /// violated layout rule (truncation, bad tag, length overrun, ...).
    Malformed(&'static str),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(why) => write!(f, "malformed frame: {why}"),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Local transmit-side failures reported by the transport adapter.
/// A failed transmit consumes one attempt; retries are the recovery path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The radio rejected the frame (TX queue full, not initialised, ...).
    SendFailed,
    /// The transport could not add the peer to its peer table.
    PeerAddFailed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SendFailed => write!(f, "transmit failed"),
            Self::PeerAddFailed => write!(f, "peer table add failed"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
