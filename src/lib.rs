//! Switchlink — ESP-NOW command/acknowledgement exchange core.
//!
//! A controller node commands remote switch peers over ESP-NOW: it sends a
//! command frame to a MAC-addressed peer, waits for an acknowledgement
//! carrying the peer's response token, and retries on a bounded schedule
//! until a matching acknowledgement arrives or the attempt budget is
//! exhausted.
//!
//! The crate is pure logic: all radio I/O goes through the
//! [`ports::TransportPort`] trait, so everything here runs and tests on the
//! host. The ESP-NOW binding implements the port on target.

#![deny(unused_must_use)]

pub mod addr;
pub mod config;
pub mod error;
pub mod events;
pub mod exchange;
pub mod frame;
pub mod peers;
pub mod ports;
pub mod service;
