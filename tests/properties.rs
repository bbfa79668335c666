// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Property tests for the memory bus, ROM loader and condition evaluator

use gbarx::core::cpu::{Condition, Psr};
use gbarx::core::loader::pad_rom;
use gbarx::core::memory::Bus;
use proptest::prelude::*;

/// Straightforward restatement of the ARM condition table
fn reference_condition(cond: u32, n: bool, z: bool, c: bool, v: bool) -> bool {
    match cond {
        0x0 => z,
        0x1 => !z,
        0x2 => c,
        0x3 => !c,
        0x4 => n,
        0x5 => !n,
        0x6 => v,
        0x7 => !v,
        0x8 => c && !z,
        0x9 => !c || z,
        0xA => n == v,
        0xB => n != v,
        0xC => !z && n == v,
        0xD => z || n != v,
        0xE => true,
        _ => false,
    }
}

proptest! {
    #[test]
    fn iwram_word_round_trip_with_mirroring(offset in 0u32..0x8000, mirror in 0u32..0x200, value in any::<u32>()) {
        let mut bus = Bus::new();
        let offset = offset & !3;
        bus.write32(0x0300_0000 + offset, value).unwrap();

        let mirrored = 0x0300_0000 + (mirror << 15) + offset;
        prop_assert_eq!(bus.read32(mirrored).unwrap(), value, "mirror at {:#010x}", mirrored);
    }

    #[test]
    fn ewram_byte_writes_compose_little_endian(offset in 0u32..0x4_0000, bytes in any::<[u8; 4]>()) {
        let mut bus = Bus::new();
        let addr = 0x0200_0000 + (offset & !3);
        for (i, &byte) in bytes.iter().enumerate() {
            bus.write8(addr + i as u32, byte).unwrap();
        }

        prop_assert_eq!(bus.read32(addr).unwrap(), u32::from_le_bytes(bytes));
        prop_assert_eq!(bus.read16(addr + 2).unwrap(), u16::from_le_bytes([bytes[2], bytes[3]]));
    }

    #[test]
    fn condition_matches_reference(cond in 0u32..16, flags in 0u32..16) {
        let psr = Psr::from_bits_retain(flags << 28);
        let expected = reference_condition(
            cond,
            flags & 0b1000 != 0,
            flags & 0b0100 != 0,
            flags & 0b0010 != 0,
            flags & 0b0001 != 0,
        );
        prop_assert_eq!(Condition::from_bits(cond).passes(psr), expected, "cond={:#x} flags={:#06b}", cond, flags);
    }

    #[test]
    fn pad_rom_rounds_to_power_of_two(len in 0usize..0x2_0000) {
        let data = vec![0xA5u8; len];
        let rom = pad_rom(data);

        prop_assert!(rom.len().is_power_of_two());
        prop_assert!(rom.len() >= len);
        prop_assert!(rom[..len].iter().all(|&b| b == 0xA5));
        prop_assert!(rom[len..].iter().all(|&b| b == 0));
    }

    #[test]
    fn bios_writes_are_ignored(offset in 0u32..0x4000, value in any::<u32>()) {
        let mut bus = Bus::new();
        bus.load_bios_bytes(&[0x5A; 0x4000]).unwrap();
        let addr = offset & !3;

        bus.write32(addr, value).unwrap();
        bus.write8(addr + 1, value as u8).unwrap();

        prop_assert_eq!(bus.read32(addr).unwrap(), 0x5A5A_5A5A);
    }
}
