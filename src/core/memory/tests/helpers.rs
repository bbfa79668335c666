// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Helper functions for memory tests

use super::*;

/// Creates a Bus with a recognisable BIOS pattern (byte i = i & 0xFF)
pub fn create_bus_with_bios_pattern() -> Bus {
    let mut bus = Bus::new();
    let pattern: Vec<u8> = (0..Bus::BIOS_SIZE).map(|i| i as u8).collect();
    bus.load_bios_bytes(&pattern).unwrap();
    bus
}

/// Creates a Bus with a cartridge built from `len` bytes of 0xA5
pub fn create_bus_with_rom(len: usize) -> Bus {
    let mut bus = Bus::new();
    bus.load_rom_bytes(&vec![0xA5; len]);
    bus
}
