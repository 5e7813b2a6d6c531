//! Peer registry — logical device identifiers to link-layer addresses.
//!
//! Fixed-capacity map populated at startup from [`LinkConfig`]. Sending to
//! an identifier that was never registered fails fast with
//! [`Error::PeerNotFound`] rather than silently dropping the command.
//!
//! [`LinkConfig`]: crate::config::LinkConfig

use heapless::FnvIndexMap;
use log::info;

use crate::addr::LinkAddress;
use crate::config::{DeviceId, MAX_SWITCHES};
use crate::error::{ConfigError, Error, Result};

/// Maps device identifiers to peer addresses.
pub struct PeerRegistry {
    // Capacity must be a power of two (FnvIndexMap requirement);
    // MAX_SWITCHES is.
    map: FnvIndexMap<DeviceId, LinkAddress, MAX_SWITCHES>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self {
            map: FnvIndexMap::new(),
        }
    }

    /// Register a peer. Idempotent: re-registering an existing identifier
    /// updates its address.
    pub fn register(&mut self, device: &DeviceId, address: LinkAddress) -> Result<()> {
        if let Some(slot) = self.map.get_mut(device) {
            info!("peer '{device}' re-registered at {address}");
            *slot = address;
            return Ok(());
        }
        self.map
            .insert(device.clone(), address)
            .map_err(|_| Error::Config(ConfigError::TooManyPeers))?;
        info!("peer '{device}' registered at {address}");
        Ok(())
    }

    /// Resolve an identifier to its link address.
    pub fn resolve(&self, device: &str) -> Result<LinkAddress> {
        self.map
            .iter()
            .find(|(id, _)| id.as_str() == device)
            .map(|(_, addr)| *addr)
            .ok_or(Error::PeerNotFound)
    }

    /// Number of registered peers.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over registered (device, address) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&DeviceId, &LinkAddress)> {
        self.map.iter()
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
