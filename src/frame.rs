//! Command/acknowledgement frame codec.
//!
//! Wire format (fixed layout, bounded fields):
//! ```text
//! Command      ┌──────┬─────────┬─────────┬───────────┬─────────────┐
//! (tag 0x01)   │ tag  │ channel │ command │ token_len │ token bytes │
//!              │ 1 B  │ 1 B     │ 1 B     │ 1 B       │ 0–32 B      │
//!              └──────┴─────────┴─────────┴───────────┴─────────────┘
//!
//! Ack          ┌──────┬───────────┬─────────────┬──────┬──────────────┐
//! (tag 0x02)   │ tag  │ token_len │ token bytes │ kind │ kind payload │
//!              │ 1 B  │ 1 B       │ 0–32 B      │ 1 B  │ see below    │
//!              └──────┴───────────┴─────────────┴──────┴──────────────┘
//!
//! kind 0x01 (status):  state (1 B, 0/1) + supply voltage mV (2 B LE)
//! kind 0x02 (version): len (1 B) + version string (1–16 B)
//! ```
//!
//! The command byte is the peer's on-wire command alphabet: `'0'`/`'1'`
//! set the switch state, `'?'` queries status, `'V'` queries the firmware
//! version. Commands carry the sender's Wi-Fi channel so a peer that
//! drifted can follow the controller.
//!
//! Decoding is strict and total: a buffer that is short, carries an
//! unknown tag, overruns a declared length, or has trailing bytes yields
//! [`DecodeError::Malformed`]. It never panics on adversarial input.

use heapless::{String, Vec};

use crate::error::DecodeError;

/// Upper bound on the response token, in bytes.
pub const MAX_TOKEN_LEN: usize = 32;
/// Upper bound on a peer firmware version string, in bytes.
pub const MAX_VERSION_LEN: usize = 16;
/// Upper bound on any encoded frame. Sized to the worst-case layout above.
pub const MAX_FRAME_LEN: usize = 64;

/// A bounded response token.
pub type Token = String<MAX_TOKEN_LEN>;

const TAG_COMMAND: u8 = 0x01;
const TAG_ACK: u8 = 0x02;

const ACK_KIND_STATUS: u8 = 0x01;
const ACK_KIND_VERSION: u8 = 0x02;

// ---------------------------------------------------------------------------
// Frame model
// ---------------------------------------------------------------------------

/// Commands a controller can address to a switch peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchCommand {
    /// Turn the switch off (`'0'`).
    Off,
    /// Turn the switch on (`'1'`).
    On,
    /// Ask for switch state and supply voltage (`'?'`).
    StatusQuery,
    /// Ask for the peer firmware version (`'V'`).
    VersionQuery,
}

impl SwitchCommand {
    const fn wire_byte(self) -> u8 {
        match self {
            Self::Off => b'0',
            Self::On => b'1',
            Self::StatusQuery => b'?',
            Self::VersionQuery => b'V',
        }
    }

    const fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            b'0' => Some(Self::Off),
            b'1' => Some(Self::On),
            b'?' => Some(Self::StatusQuery),
            b'V' => Some(Self::VersionQuery),
            _ => None,
        }
    }
}

/// Payload of a valid acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckPayload {
    /// Switch state plus battery/supply voltage.
    Status { on: bool, voltage_mv: u16 },
    /// Peer firmware version string.
    Version(String<MAX_VERSION_LEN>),
}

/// A decoded link frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Controller → peer.
    Command {
        channel: u8,
        command: SwitchCommand,
        token: Token,
    },
    /// Peer → controller.
    Ack { token: Token, payload: AckPayload },
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Serialise a frame into its wire form.
///
/// Field bounds are enforced by the `heapless` types in [`Frame`], so the
/// output always fits [`MAX_FRAME_LEN`] and encoding cannot fail.
pub fn encode(frame: &Frame) -> Vec<u8, MAX_FRAME_LEN> {
    let mut buf: Vec<u8, MAX_FRAME_LEN> = Vec::new();

    match frame {
        Frame::Command {
            channel,
            command,
            token,
        } => {
            put(&mut buf, &[TAG_COMMAND, *channel, command.wire_byte()]);
            put(&mut buf, &[token.len() as u8]);
            put(&mut buf, token.as_bytes());
        }
        Frame::Ack { token, payload } => {
            put(&mut buf, &[TAG_ACK, token.len() as u8]);
            put(&mut buf, token.as_bytes());
            match payload {
                AckPayload::Status { on, voltage_mv } => {
                    put(&mut buf, &[ACK_KIND_STATUS, u8::from(*on)]);
                    put(&mut buf, &voltage_mv.to_le_bytes());
                }
                AckPayload::Version(version) => {
                    put(&mut buf, &[ACK_KIND_VERSION, version.len() as u8]);
                    put(&mut buf, version.as_bytes());
                }
            }
        }
    }

    buf
}

fn put(buf: &mut Vec<u8, MAX_FRAME_LEN>, bytes: &[u8]) {
    // Capacity covers the worst-case frame; overflow is unreachable.
    let res = buf.extend_from_slice(bytes);
    debug_assert!(res.is_ok());
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Parse a raw buffer into a [`Frame`].
pub fn decode(bytes: &[u8]) -> Result<Frame, DecodeError> {
    let (&tag, rest) = bytes
        .split_first()
        .ok_or(DecodeError::Malformed("empty buffer"))?;

    match tag {
        TAG_COMMAND => decode_command(rest),
        TAG_ACK => decode_ack(rest),
        _ => Err(DecodeError::Malformed("unknown frame tag")),
    }
}

fn decode_command(rest: &[u8]) -> Result<Frame, DecodeError> {
    if rest.len() < 3 {
        return Err(DecodeError::Malformed("command header truncated"));
    }
    let channel = rest[0];
    let command = SwitchCommand::from_wire(rest[1])
        .ok_or(DecodeError::Malformed("unknown command byte"))?;
    let (token, tail) = take_token(&rest[2..])?;
    if !tail.is_empty() {
        return Err(DecodeError::Malformed("trailing bytes after command"));
    }
    Ok(Frame::Command {
        channel,
        command,
        token,
    })
}

fn decode_ack(rest: &[u8]) -> Result<Frame, DecodeError> {
    let (token, tail) = take_token(rest)?;
    let (&kind, body) = tail
        .split_first()
        .ok_or(DecodeError::Malformed("ack kind missing"))?;

    let payload = match kind {
        ACK_KIND_STATUS => {
            if body.len() != 3 {
                return Err(DecodeError::Malformed("status payload must be 3 bytes"));
            }
            let on = match body[0] {
                0 => false,
                1 => true,
                _ => return Err(DecodeError::Malformed("bad switch state byte")),
            };
            let voltage_mv = u16::from_le_bytes([body[1], body[2]]);
            AckPayload::Status { on, voltage_mv }
        }
        ACK_KIND_VERSION => {
            let (&len, text) = body
                .split_first()
                .ok_or(DecodeError::Malformed("version length missing"))?;
            let len = len as usize;
            if len == 0 || len > MAX_VERSION_LEN {
                return Err(DecodeError::Malformed("version length out of range"));
            }
            if text.len() != len {
                return Err(DecodeError::Malformed("version length mismatch"));
            }
            let s = core::str::from_utf8(text)
                .map_err(|_| DecodeError::Malformed("version not UTF-8"))?;
            let mut version = String::new();
            version
                .push_str(s)
                .map_err(|()| DecodeError::Malformed("version too long"))?;
            AckPayload::Version(version)
        }
        _ => return Err(DecodeError::Malformed("unknown ack kind")),
    };

    Ok(Frame::Ack { token, payload })
}

/// Read a `len`-prefixed token; returns the token and the remaining tail.
fn take_token(bytes: &[u8]) -> Result<(Token, &[u8]), DecodeError> {
    let (&len, rest) = bytes
        .split_first()
        .ok_or(DecodeError::Malformed("token length missing"))?;
    let len = len as usize;
    if len > MAX_TOKEN_LEN {
        return Err(DecodeError::Malformed("token too long"));
    }
    if rest.len() < len {
        return Err(DecodeError::Malformed("token truncated"));
    }
    let (raw, tail) = rest.split_at(len);
    let s = core::str::from_utf8(raw).map_err(|_| DecodeError::Malformed("token not UTF-8"))?;
    let mut token = Token::new();
    token
        .push_str(s)
        .map_err(|()| DecodeError::Malformed("token too long"))?;
    Ok((token, tail))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
