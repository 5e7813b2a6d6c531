//! Fuzz target: `frame::decode`
//!
//! Drives arbitrary byte sequences through the wire-frame decoder and
//! asserts that it never panics and that every accepted frame re-encodes
//! to the exact input bytes (the layout has no redundant encodings).
//!
//! cargo fuzz run fuzz_frame_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use switchlink::frame;

fuzz_target!(|data: &[u8]| {
    if let Ok(decoded) = frame::decode(data) {
        let reencoded = frame::encode(&decoded);
        assert_eq!(
            reencoded.as_slice(),
            data,
            "accepted frame did not re-encode to its input bytes"
        );
    }
});
