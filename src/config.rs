//! Link configuration parameters.
//!
//! One [`SwitchConfig`] per remote switch peer, collected in a
//! [`LinkConfig`]. Values arrive from NVS (non-volatile storage) or a
//! provisioning payload, are validated exactly once at startup, and are
//! never re-validated at runtime — a config that fails [`LinkConfig::validate`]
//! never reaches the exchange machinery.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::addr::LinkAddress;
use crate::error::{ConfigError, Error, Result};
use crate::frame::{MAX_TOKEN_LEN, Token};

/// Upper bound on a device identifier, in bytes.
pub const MAX_DEVICE_ID_LEN: usize = 24;
/// Maximum number of switch peers one controller drives.
pub const MAX_SWITCHES: usize = 8;

/// A bounded logical device identifier.
pub type DeviceId = String<MAX_DEVICE_ID_LEN>;

/// Total transmissions per exchange: 1 initial send + N−1 retries.
pub const RETRY_COUNT_MIN: u8 = 1;
pub const RETRY_COUNT_MAX: u8 = 100;
pub const DEFAULT_RETRY_COUNT: u8 = 40;

/// Delay between transmissions, in milliseconds.
pub const RETRY_INTERVAL_MIN_MS: u32 = 10;
pub const RETRY_INTERVAL_MAX_MS: u32 = 5000;
pub const DEFAULT_RETRY_INTERVAL_MS: u32 = 100;

/// How often the host loop should call [`LinkService::poll`].
///
/// [`LinkService::poll`]: crate::service::LinkService::poll
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 10;

// ---------------------------------------------------------------------------
// Per-switch configuration
// ---------------------------------------------------------------------------

/// Configuration for one remote switch peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchConfig {
    /// Logical identifier, e.g. `"living-room"`. Stable for the lifetime
    /// of the configuration.
    pub device_id: DeviceId,
    /// Peer MAC address, 6 groups of 2 hex digits, `:` or `-` separated,
    /// any case. Parsed and normalised by [`SwitchConfig::address`].
    pub peer_address: String<17>,
    /// Token the peer echoes in a valid acknowledgement. An ack without
    /// this exact token is overheard cross-talk and is ignored.
    pub response_token: Token,
    /// Total transmissions before giving up, in [1, 100].
    #[serde(default = "default_retry_count")]
    pub retry_count: u8,
    /// Delay between transmissions in milliseconds, in [10, 5000].
    #[serde(default = "default_retry_interval")]
    pub retry_interval_ms: u32,
}

fn default_retry_count() -> u8 {
    DEFAULT_RETRY_COUNT
}

fn default_retry_interval() -> u32 {
    DEFAULT_RETRY_INTERVAL_MS
}

impl SwitchConfig {
    /// Parse the configured peer address into its binary form.
    pub fn address(&self) -> Result<LinkAddress> {
        Ok(self.peer_address.parse::<LinkAddress>()?)
    }

    /// Range/format validation. Called once from [`LinkConfig::validate`].
    pub fn validate(&self) -> Result<()> {
        self.address()?;
        if self.response_token.is_empty() {
            return Err(ConfigError::EmptyToken.into());
        }
        debug_assert!(self.response_token.len() <= MAX_TOKEN_LEN);
        if !(RETRY_COUNT_MIN..=RETRY_COUNT_MAX).contains(&self.retry_count) {
            return Err(ConfigError::RetryCountOutOfRange.into());
        }
        if !(RETRY_INTERVAL_MIN_MS..=RETRY_INTERVAL_MAX_MS).contains(&self.retry_interval_ms) {
            return Err(ConfigError::RetryIntervalOutOfRange.into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Controller configuration
// ---------------------------------------------------------------------------

/// Full controller configuration: every switch peer plus loop timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// The switch peers this controller drives.
    pub switches: Vec<SwitchConfig, MAX_SWITCHES>,
    /// Poll cadence for the retry timers (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u32,
}

fn default_poll_interval() -> u32 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            switches: Vec::new(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl LinkConfig {
    /// Validate every switch entry and cross-entry invariants.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::RetryIntervalOutOfRange.into());
        }
        for (i, switch) in self.switches.iter().enumerate() {
            switch.validate()?;
            if self.switches[..i]
                .iter()
                .any(|other| other.device_id == switch.device_id)
            {
                return Err(ConfigError::DuplicateDevice.into());
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON provisioning payload.
    pub fn from_json(payload: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(payload).map_err(|_| Error::Config(ConfigError::Corrupted))?;
        config.validate()?;
        Ok(config)
    }

    /// Compact binary form for NVS persistence.
    pub fn to_nvs_bytes(&self) -> Result<std::vec::Vec<u8>> {
        postcard::to_allocvec(self).map_err(|_| Error::Config(ConfigError::Corrupted))
    }

    /// Load and validate a config previously stored with
    /// [`to_nvs_bytes`](Self::to_nvs_bytes).
    pub fn from_nvs_bytes(bytes: &[u8]) -> Result<Self> {
        let config: Self =
            postcard::from_bytes(bytes).map_err(|_| Error::Config(ConfigError::Corrupted))?;
        config.validate()?;
        Ok(config)
    }
}
