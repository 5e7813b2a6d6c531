//! Link service — the domain core.
//!
//! [`LinkService`] owns the peer registry and one [`Exchanger`] per
//! configured switch. It exposes a clean, radio-agnostic API; all I/O
//! flows through port traits injected at call sites, so the whole service
//! runs against mock adapters on the host.
//!
//! ```text
//!  rx callback ──▶ ┌────────────────────────┐ ──▶ EventSink
//!  poll timer  ──▶ │      LinkService        │
//!                  │  Registry · Exchangers  │ ──▶ TransportPort
//!  commands    ──▶ └────────────────────────┘
//! ```
//!
//! All three entry points run on the same cooperative loop; nothing here
//! blocks, and each call does a small, bounded amount of work.

use log::{debug, info, warn};

use crate::addr::LinkAddress;
use crate::config::{LinkConfig, MAX_SWITCHES};
use crate::error::{ConfigError, Error, Result};
use crate::events::LinkEvent;
use crate::exchange::{ExchangeState, Exchanger};
use crate::frame::{self, Frame, SwitchCommand};
use crate::peers::PeerRegistry;
use crate::ports::{EventSink, TransportPort};

/// Wi-Fi channels ESP-NOW can occupy.
const CHANNEL_MIN: u8 = 1;
const CHANNEL_MAX: u8 = 14;

/// The link service orchestrates every exchange.
pub struct LinkService {
    registry: PeerRegistry,
    exchangers: heapless::Vec<Exchanger, MAX_SWITCHES>,
    /// Current Wi-Fi channel, embedded in every outgoing command so peers
    /// that drifted can follow the controller.
    channel: u8,
}

impl LinkService {
    /// Build the service from a configuration.
    ///
    /// Validates the whole config up front — a service is never
    /// constructed from parameters the runtime would have to re-check.
    /// Does **not** touch the transport; call [`start`](Self::start) next.
    pub fn new(config: &LinkConfig) -> Result<Self> {
        config.validate()?;

        let mut registry = PeerRegistry::new();
        let mut exchangers = heapless::Vec::new();
        for switch in &config.switches {
            registry.register(&switch.device_id, switch.address()?)?;
            exchangers
                .push(Exchanger::new(switch))
                .map_err(|_| Error::Config(ConfigError::TooManyPeers))?;
        }

        Ok(Self {
            registry,
            exchangers,
            channel: CHANNEL_MIN,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce every configured peer to the transport.
    ///
    /// Call once after the radio is up. Transport peer-table failures here
    /// are fatal: a peer the link layer refuses can never be commanded.
    pub fn start(
        &mut self,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        info!("link service: {} switch peer(s)", self.registry.len());
        for (device, address) in self.registry.iter() {
            transport.ensure_peer(*address)?;
            info!("  '{device}' -> {address}");
            sink.emit(&LinkEvent::PeerRegistered {
                device: device.clone(),
                address: *address,
            });
        }
        Ok(())
    }

    /// Follow a Wi-Fi channel change. Out-of-range values fall back to
    /// channel 1, mirroring the peer firmware.
    pub fn set_channel(&mut self, channel: u8) {
        self.channel = if (CHANNEL_MIN..=CHANNEL_MAX).contains(&channel) {
            channel
        } else {
            warn!("channel {channel} out of range, falling back to {CHANNEL_MIN}");
            CHANNEL_MIN
        };
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    // ── Command entry points ──────────────────────────────────

    /// Command a switch peer on or off.
    pub fn send_switch_command(
        &mut self,
        device: &str,
        on: bool,
        now_ms: u64,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let command = if on {
            SwitchCommand::On
        } else {
            SwitchCommand::Off
        };
        self.begin_exchange(device, command, now_ms, transport, sink)
    }

    /// Ask a peer for its switch state and supply voltage.
    pub fn send_status_query(
        &mut self,
        device: &str,
        now_ms: u64,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.begin_exchange(device, SwitchCommand::StatusQuery, now_ms, transport, sink)
    }

    /// Ask a peer for its firmware version.
    pub fn send_version_query(
        &mut self,
        device: &str,
        now_ms: u64,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.begin_exchange(device, SwitchCommand::VersionQuery, now_ms, transport, sink)
    }

    /// Abort the in-flight exchange for `device`, if any.
    /// Returns whether anything was cancelled.
    pub fn cancel(&mut self, device: &str, sink: &mut impl EventSink) -> Result<bool> {
        let exchanger = self
            .exchangers
            .iter_mut()
            .find(|e| e.device().as_str() == device)
            .ok_or(Error::PeerNotFound)?;
        Ok(exchanger.cancel(sink))
    }

    // ── Event-loop entry points ───────────────────────────────

    /// Frame-received callback. The link carries unrelated traffic:
    /// malformed frames, commands from other controllers, and acks for
    /// nobody are logged and dropped here — they never crash the loop and
    /// never reset a retry timer.
    pub fn on_frame_received(
        &mut self,
        source: LinkAddress,
        bytes: &[u8],
        sink: &mut impl EventSink,
    ) {
        let frame = match frame::decode(bytes) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("dropping frame from {source}: {e}");
                return;
            }
        };

        match frame {
            Frame::Command { .. } => {
                // We are the controller side; overheard commands from
                // other controllers are not ours to answer.
                debug!("ignoring overheard command from {source}");
            }
            Frame::Ack { token, payload } => {
                let claimed = self
                    .exchangers
                    .iter_mut()
                    .any(|e| e.on_ack(source, &token, &payload, sink));
                if !claimed {
                    debug!("unclaimed ack from {source} dropped");
                }
            }
        }
    }

    /// Drive every armed retry timer. Call on the loop's poll cadence
    /// ([`LinkConfig::poll_interval_ms`]) with a monotonic clock.
    pub fn poll(
        &mut self,
        now_ms: u64,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        for exchanger in &mut self.exchangers {
            exchanger.poll(now_ms, transport, sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Exchange state for one device.
    pub fn state_of(&self, device: &str) -> Result<ExchangeState> {
        self.exchangers
            .iter()
            .find(|e| e.device().as_str() == device)
            .map(Exchanger::state)
            .ok_or(Error::PeerNotFound)
    }

    /// Whether any exchange is currently in flight.
    pub fn any_in_flight(&self) -> bool {
        self.exchangers
            .iter()
            .any(|e| e.state() == ExchangeState::AwaitingResponse)
    }

    // ── Internal ──────────────────────────────────────────────

    fn begin_exchange(
        &mut self,
        device: &str,
        command: SwitchCommand,
        now_ms: u64,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let address = self.registry.resolve(device)?;
        let exchanger = self
            .exchangers
            .iter_mut()
            .find(|e| e.device().as_str() == device)
            .ok_or(Error::PeerNotFound)?;
        let channel = self.channel;
        exchanger.begin(address, command, channel, now_ms, transport, sink)
    }
}
