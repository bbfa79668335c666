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

//! Test ROM utilities and small test programs

/// Serialize ARM instructions into a little-endian ROM image
#[allow(dead_code)]
pub fn arm_rom(program: &[u32]) -> Vec<u8> {
    program.iter().flat_map(|word| word.to_le_bytes()).collect()
}

/// Serialize Thumb instructions into a little-endian ROM image
#[allow(dead_code)]
pub fn thumb_rom(program: &[u16]) -> Vec<u8> {
    program.iter().flat_map(|half| half.to_le_bytes()).collect()
}

/// Thumb program: unconditional branch forward by 16 bytes
///
/// `B` at 0x08000000 with offset field 8 lands at 0x08000000 + 4 + 16.
#[allow(dead_code)]
pub fn test_program_thumb_branch() -> Vec<u16> {
    vec![
        0xE008, // B     #+16
    ]
}

/// ARM program: register arithmetic
#[allow(dead_code)]
pub fn test_program_basic_arithmetic() -> Vec<u32> {
    vec![
        0xE3A0_1001, // MOV   r1, #1
        0xE3A0_2002, // MOV   r2, #2
        0xE081_3002, // ADD   r3, r1, r2      ; r3 = 3
        0xE053_3003, // SUBS  r3, r3, r3      ; r3 = 0, Z set
    ]
}

/// ARM program: store then load through internal work RAM
#[allow(dead_code)]
pub fn test_program_load_store() -> Vec<u32> {
    vec![
        0xE3A0_1403, // MOV   r1, #0x03000000
        0xE3A0_20AA, // MOV   r2, #0xAA
        0xE581_2000, // STR   r2, [r1]
        0xE591_3000, // LDR   r3, [r1]
        0xE5D1_4000, // LDRB  r4, [r1]
    ]
}

/// ARM program: switch to Thumb state with BX and run one Thumb instruction
///
/// The Thumb half lives at ROM offset 0x10.
#[allow(dead_code)]
pub fn test_program_interworking() -> Vec<u8> {
    let mut rom = arm_rom(&[
        0xE28F_0009, // ADD   r0, pc, #9      ; 0x08000010 | 1
        0xE12F_FF10, // BX    r0
        0xE3A0_50EE, // MOV   r5, #0xEE       ; never reached
        0xE3A0_50EE, // MOV   r5, #0xEE       ; never reached
    ]);
    rom.extend(thumb_rom(&[
        0x2142, // MOV   r1, #0x42
        0x46C0, // MOV   r8, r8          ; puts BX on a word boundary
        0x4778, // BX    pc              ; back to ARM at 0x08000018
        0x46C0, // MOV   r8, r8          ; never reached
    ]));
    rom.extend(arm_rom(&[
        0xE3A0_2007, // MOV   r2, #7
    ]));
    rom
}

/// Get the boot ROM path from the environment or the default location
#[allow(dead_code)]
pub fn get_bios_path() -> Option<String> {
    std::env::var("GBARX_BIOS").ok().or_else(|| {
        let default_path = "gba_bios.bin";
        if std::path::Path::new(default_path).exists() {
            Some(default_path.to_string())
        } else {
            None
        }
    })
}

/// Check if a boot ROM is available for testing
#[allow(dead_code)]
pub fn is_bios_available() -> bool {
    get_bios_path().is_some()
}
