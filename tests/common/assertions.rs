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

//! Custom assertions for GBA emulator testing

use gbarx::core::cpu::CPU;
use gbarx::core::memory::Bus;

/// Assert CPU register has expected value
#[allow(dead_code)]
pub fn assert_cpu_reg(cpu: &CPU, reg: usize, expected: u32) {
    let actual = cpu.regs().reg(reg);
    assert_eq!(
        actual, expected,
        "Register r{} mismatch: expected 0x{:08X}, got 0x{:08X}",
        reg, expected, actual
    );
}

/// Assert CPU PC is at expected address
#[allow(dead_code)]
pub fn assert_cpu_pc(cpu: &CPU, expected: u32) {
    let actual = cpu.regs().pc();
    assert_eq!(
        actual, expected,
        "PC mismatch: expected 0x{:08X}, got 0x{:08X}",
        expected, actual
    );
}

/// Assert memory contains expected word at address
#[allow(dead_code)]
pub fn assert_memory_word(bus: &Bus, addr: u32, expected: u32) {
    let actual = bus.read32(addr).expect("Failed to read memory");
    assert_eq!(
        actual, expected,
        "Memory at 0x{:08X} mismatch: expected 0x{:08X}, got 0x{:08X}",
        addr, expected, actual
    );
}

/// Assert memory contains expected byte at address
#[allow(dead_code)]
pub fn assert_memory_byte(bus: &Bus, addr: u32, expected: u8) {
    let actual = bus.read8(addr).expect("Failed to read memory");
    assert_eq!(
        actual, expected,
        "Memory at 0x{:08X} mismatch: expected 0x{:02X}, got 0x{:02X}",
        addr, expected, actual
    );
}
