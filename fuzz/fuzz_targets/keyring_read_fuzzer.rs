//! Fuzz target for loading keyrings from untrusted bytes
//!
//! # Strategy
//!
//! - Raw bytes fed straight to `Ring::read`
//! - A valid keyring with one byte overwritten
//!
//! # Invariants
//!
//! - `Ring::read` never panics; every failure is a `KeyringError`
//! - A loaded ring satisfies its own invariants: the active id is stored
//!   and the ring writes back without error

#![no_main]

use arbitrary::Arbitrary;
use keyring_core::{Config, Ring, StaticKey};
use libfuzzer_sys::fuzz_target;

const ACCESS_KEY: [u8; 32] = [0x42; 32];

#[derive(Debug, Clone, Arbitrary)]
enum Input {
    Raw(Vec<u8>),
    Mutated { keys: Vec<Vec<u8>>, position: u16, value: u8 },
}

fuzz_target!(|input: Input| {
    let data = match input {
        Input::Raw(bytes) => bytes,
        Input::Mutated { keys, position, value } => {
            let Ok(mut ring) = Ring::new(Config {
                initial_key: b"fuzz",
                access_key: &ACCESS_KEY,
                ..Config::default()
            }) else {
                return;
            };
            for key in keys.iter().filter(|k| !k.is_empty()).take(8) {
                ring.add(key);
            }

            let mut data = Vec::new();
            if ring.write_to(&mut data).is_err() {
                return;
            }
            let position = usize::from(position) % data.len();
            data[position] = value;
            data
        },
    };

    if let Ok(ring) = Ring::read(&data[..], StaticKey::new(&ACCESS_KEY)) {
        assert!(ring.has(ring.active()));
        assert!(!ring.is_empty());
        let mut out = Vec::new();
        assert!(ring.write_to(&mut out).is_ok());
    }
});
