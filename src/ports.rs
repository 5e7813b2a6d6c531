//! Port traits — the boundary between the exchange core and the radio.
//!
//! ```text
//!   ESP-NOW binding ──▶ TransportPort ──▶ LinkService (domain)
//!                                          │
//!                          EventSink ◀─────┘
//! ```
//!
//! The driven adapter (the real ESP-NOW component on target, a mock on the
//! host) implements [`TransportPort`]. The [`LinkService`] consumes it via
//! generics at each call site, so the core never touches the radio API.
//!
//! Everything runs on one cooperative event loop: `send`, the receive
//! callback and the poll timer all execute in the same context, so port
//! implementations must be non-blocking — `send` hands the frame to the
//! radio and returns, completion is observed through a later
//! acknowledgement frame, never by waiting here.
//!
//! [`LinkService`]: crate::service::LinkService

use crate::addr::LinkAddress;
use crate::error::LinkError;
use crate::events::LinkEvent;

// ───────────────────────────────────────────────────────────────
// Transport port (domain → link layer)
// ───────────────────────────────────────────────────────────────

/// Raw frame transmission over the link.
///
/// Radio channel management, peer-table capacity and encryption are the
/// transport's responsibility; the core only resolves *who* to send to
/// and *what* bytes to send.
pub trait TransportPort {
    /// Hand an encoded frame to the link layer. Fire-and-forget: success
    /// means "accepted for transmission", not "delivered".
    fn send(&mut self, address: LinkAddress, frame: &[u8]) -> Result<(), LinkError>;

    /// Make the link layer aware of a peer before the first send to it.
    /// Idempotent — registering the same address twice is a no-op.
    fn ensure_peer(&mut self, address: LinkAddress) -> Result<(), LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / host integration)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`LinkEvent`]s through this port.
/// Adapters decide where they go — serial log, state publication to the
/// host framework, a test recorder.
///
/// Every accepted exchange produces exactly one terminal event
/// (`ExchangeSucceeded` or `ExchangeFailed`) through this sink.
pub trait EventSink {
    fn emit(&mut self, event: &LinkEvent);
}

// ───────────────────────────────────────────────────────────────
// Null transport
// ───────────────────────────────────────────────────────────────

/// A transport that accepts every frame and drops it.
/// Useful before the radio is initialised.
pub struct NullTransport;

impl TransportPort for NullTransport {
    fn send(&mut self, _address: LinkAddress, _frame: &[u8]) -> Result<(), LinkError> {
        Ok(())
    }

    fn ensure_peer(&mut self, _address: LinkAddress) -> Result<(), LinkError> {
        Ok(())
    }
}
