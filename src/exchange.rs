//! Command/acknowledgement exchange state machine.
//!
//! One [`Exchanger`] exists per configured switch and drives at most one
//! outstanding command at a time:
//!
//! ```text
//! Idle ──begin──▶ AwaitingResponse ──matching ack──▶ Idle  (Succeeded)
//!                   │        ▲
//!                   │ deadline, attempt < retry_count: resend
//!                   ▼        │
//!                 (re-arm) ──┘
//!                   │ deadline, attempt == retry_count
//!                   ▼
//!                 Idle  (Failed: Timeout)
//! ```
//!
//! The machine advances from exactly two event sources — the poll timer
//! and the frame-received path — both on the same cooperative loop, so no
//! locking exists here. Every accepted `begin` terminates with exactly one
//! outcome delivered through the [`EventSink`]: `ExchangeSucceeded`, or
//! `ExchangeFailed` with `Timeout`, `Link`, or `Cancelled`.
//!
//! `retry_count` is the TOTAL number of transmissions (1 initial send plus
//! `retry_count − 1` retries), matching the peer firmware's convention.

use heapless::Vec;
use log::{debug, info, warn};

use crate::addr::LinkAddress;
use crate::config::{DeviceId, SwitchConfig};
use crate::error::{Error, Result};
use crate::events::LinkEvent;
use crate::frame::{self, AckPayload, Frame, MAX_FRAME_LEN, SwitchCommand, Token};
use crate::ports::{EventSink, TransportPort};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Observable state of one exchanger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    /// No outstanding command.
    Idle,
    /// A command is in flight; the retry timer is armed.
    AwaitingResponse,
}

/// Book-keeping for the one in-flight command.
///
/// Created on `begin`, destroyed on success, exhaustion, or cancellation.
/// Owned exclusively by the exchanger — never shared.
struct PendingExchange {
    /// Resolved peer address; acks from any other source are unrelated.
    address: LinkAddress,
    /// The encoded frame, kept verbatim so every retry resends identical
    /// bytes.
    wire: Vec<u8, MAX_FRAME_LEN>,
    /// Transmissions so far, in [1, retry_count].
    attempt: u8,
    /// When the armed retry timer fires (same clock as `now_ms`).
    deadline_ms: u64,
}

// ---------------------------------------------------------------------------
// Exchanger
// ---------------------------------------------------------------------------

/// Drives the command/acknowledgement exchange for one switch peer.
pub struct Exchanger {
    device: DeviceId,
    expected_token: Token,
    retry_count: u8,
    retry_interval_ms: u32,
    pending: Option<PendingExchange>,
}

impl Exchanger {
    /// Build from a validated [`SwitchConfig`].
    pub fn new(config: &SwitchConfig) -> Self {
        Self {
            device: config.device_id.clone(),
            expected_token: config.response_token.clone(),
            retry_count: config.retry_count,
            retry_interval_ms: config.retry_interval_ms,
            pending: None,
        }
    }

    /// Device identifier this exchanger serves.
    pub fn device(&self) -> &DeviceId {
        &self.device
    }

    pub fn state(&self) -> ExchangeState {
        if self.pending.is_some() {
            ExchangeState::AwaitingResponse
        } else {
            ExchangeState::Idle
        }
    }

    /// Address of the in-flight exchange, if any.
    pub fn pending_address(&self) -> Option<LinkAddress> {
        self.pending.as_ref().map(|p| p.address)
    }

    /// Start an exchange: encode, transmit attempt 1, arm the retry timer.
    ///
    /// Returns `Err(Busy)` if a command is already in flight — explicit
    /// backpressure, nothing is queued. After `Ok(())` the terminal
    /// outcome arrives through `sink`, exactly once.
    pub fn begin(
        &mut self,
        address: LinkAddress,
        command: SwitchCommand,
        channel: u8,
        now_ms: u64,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if self.pending.is_some() {
            return Err(Error::Busy);
        }

        let wire = frame::encode(&Frame::Command {
            channel,
            command,
            token: self.expected_token.clone(),
        });

        info!(
            "'{}': {command:?} -> {address} ({} attempts max, {} ms apart)",
            self.device, self.retry_count, self.retry_interval_ms
        );

        self.pending = Some(PendingExchange {
            address,
            wire,
            attempt: 1,
            deadline_ms: now_ms + u64::from(self.retry_interval_ms),
        });
        self.transmit(transport, sink);
        Ok(())
    }

    /// Frame-received path. Returns `true` when the ack completed this
    /// exchange; `false` means the frame was not for us and the caller may
    /// offer it elsewhere. Non-matching frames leave the state — and the
    /// armed deadline — untouched.
    pub fn on_ack(
        &mut self,
        source: LinkAddress,
        token: &Token,
        payload: &AckPayload,
        sink: &mut impl EventSink,
    ) -> bool {
        let Some(pending) = self.pending.as_ref() else {
            return false;
        };
        if source != pending.address {
            return false;
        }
        if *token != self.expected_token {
            debug!(
                "'{}': ack from {source} with foreign token ignored",
                self.device
            );
            return false;
        }

        info!(
            "'{}': acknowledged after attempt {}",
            self.device,
            pending.attempt
        );
        self.pending = None;
        sink.emit(&LinkEvent::ExchangeSucceeded {
            device: self.device.clone(),
            payload: payload.clone(),
        });
        true
    }

    /// Timer path. Call with the loop's monotonic clock; fires the armed
    /// deadline when due, resending or declaring exhaustion.
    pub fn poll(
        &mut self,
        now_ms: u64,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        if now_ms < pending.deadline_ms {
            return;
        }

        if pending.attempt >= self.retry_count {
            warn!(
                "'{}': no response after {} attempts",
                self.device, self.retry_count
            );
            self.fail(Error::Timeout, sink);
            return;
        }

        pending.attempt += 1;
        pending.deadline_ms = now_ms + u64::from(self.retry_interval_ms);
        self.transmit(transport, sink);
    }

    /// Abort the in-flight exchange, if any. The timer is disarmed and the
    /// caller sees a `Cancelled` outcome; an idle exchanger is a no-op.
    /// Returns whether anything was cancelled.
    pub fn cancel(&mut self, sink: &mut impl EventSink) -> bool {
        if self.pending.is_none() {
            return false;
        }
        info!("'{}': exchange cancelled", self.device);
        self.fail(Error::Cancelled, sink);
        true
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// Transmit the pending frame once. A local transmit failure consumes
    /// the attempt (the armed deadline still drives the next retry); when
    /// it was the final attempt there is nothing in flight to wait for, so
    /// the exchange terminates with the link error immediately.
    fn transmit(&mut self, transport: &mut impl TransportPort, sink: &mut impl EventSink) {
        let Some(pending) = self.pending.as_ref() else {
            return;
        };
        let attempt = pending.attempt;
        let address = pending.address;

        match transport.send(address, &pending.wire) {
            Ok(()) => {
                debug!(
                    "'{}': attempt {}/{} sent",
                    self.device, attempt, self.retry_count
                );
                sink.emit(&LinkEvent::AttemptSent {
                    device: self.device.clone(),
                    attempt,
                    of: self.retry_count,
                });
            }
            Err(e) => {
                warn!(
                    "'{}': attempt {}/{} transmit failed: {e}",
                    self.device, attempt, self.retry_count
                );
                if attempt >= self.retry_count {
                    self.fail(Error::Link(e), sink);
                }
            }
        }
    }

    /// Terminal failure: drop the pending exchange (disarming its timer)
    /// and deliver the one failure outcome.
    fn fail(&mut self, error: Error, sink: &mut impl EventSink) {
        self.pending = None;
        sink.emit(&LinkEvent::ExchangeFailed {
            device: self.device.clone(),
            error,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
