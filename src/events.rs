//! Outbound link events.
//!
//! The [`LinkService`](crate::service::LinkService) emits these through the
//! [`EventSink`](crate::ports::EventSink) port. Adapters on the other side
//! decide what to do with them — log to serial, publish optimistic switch
//! state back to the host framework, record them in tests.

use crate::addr::LinkAddress;
use crate::config::DeviceId;
use crate::error::Error;
use crate::frame::AckPayload;

/// Structured events emitted by the exchange core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A peer was registered with the transport at startup.
    PeerRegistered {
        device: DeviceId,
        address: LinkAddress,
    },

    /// One transmission of an in-flight exchange went out.
    /// `attempt` counts from 1 up to `of` (the configured retry_count).
    AttemptSent {
        device: DeviceId,
        attempt: u8,
        of: u8,
    },

    /// A matching acknowledgement arrived; the exchange is complete.
    ExchangeSucceeded {
        device: DeviceId,
        payload: AckPayload,
    },

    /// The exchange terminated without a matching acknowledgement
    /// (`Timeout`, `Link`, or `Cancelled`).
    ExchangeFailed { device: DeviceId, error: Error },
}
