//! Mock link adapters for integration tests.
//!
//! Records every transmitted frame and emitted event so tests can assert
//! on the full exchange history without touching a real radio.

use switchlink::addr::LinkAddress;
use switchlink::error::LinkError;
use switchlink::events::LinkEvent;
use switchlink::ports::{EventSink, TransportPort};

// ── MockTransport ─────────────────────────────────────────────

/// Transport that captures frames instead of radiating them.
pub struct MockTransport {
    /// Every frame handed to `send`, in order.
    pub sent: Vec<(LinkAddress, Vec<u8>)>,
    /// Every address handed to `ensure_peer`.
    pub peers: Vec<LinkAddress>,
    /// When true, `send` reports a local transmit failure.
    pub fail_sends: bool,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            peers: Vec::new(),
            fail_sends: false,
        }
    }

    /// Frames sent to one address.
    pub fn sent_to(&self, address: LinkAddress) -> Vec<&[u8]> {
        self.sent
            .iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, f)| f.as_slice())
            .collect()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportPort for MockTransport {
    fn send(&mut self, address: LinkAddress, frame: &[u8]) -> Result<(), LinkError> {
        if self.fail_sends {
            return Err(LinkError::SendFailed);
        }
        self.sent.push((address, frame.to_vec()));
        Ok(())
    }

    fn ensure_peer(&mut self, address: LinkAddress) -> Result<(), LinkError> {
        if !self.peers.contains(&address) {
            self.peers.push(address);
        }
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Event sink that keeps every emitted event.
pub struct RecordingSink {
    pub events: Vec<LinkEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Only the terminal outcomes (succeeded / failed).
    pub fn outcomes(&self) -> Vec<&LinkEvent> {
        self.events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    LinkEvent::ExchangeSucceeded { .. } | LinkEvent::ExchangeFailed { .. }
                )
            })
            .collect()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &LinkEvent) {
        self.events.push(event.clone());
    }
}
