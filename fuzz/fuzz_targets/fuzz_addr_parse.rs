//! Fuzz target: `LinkAddress::from_str`
//!
//! Throws arbitrary (possibly non-UTF-8) bytes at the MAC address parser
//! and asserts that it never panics and that anything it accepts survives
//! a display/parse round trip.
//!
//! cargo fuzz run fuzz_addr_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use switchlink::addr::LinkAddress;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok(addr) = text.parse::<LinkAddress>() {
        let canonical = addr.to_string();
        let reparsed: LinkAddress = canonical.parse().unwrap();
        assert_eq!(reparsed, addr, "canonical form must reparse identically");
    }
});
