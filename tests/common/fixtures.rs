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

//! Test fixtures for common test scenarios

use gbarx::core::cpu::CPU;
use gbarx::core::memory::Bus;
use gbarx::core::system::System;

/// External work RAM base, where loose test programs are placed
#[allow(dead_code)]
pub const PROGRAM_BASE: u32 = 0x0200_0000;

/// Create a CPU with default memory bus for testing
#[allow(dead_code)]
pub fn create_cpu_with_bus() -> (CPU, Bus) {
    let cpu = CPU::new();
    let bus = Bus::new();
    (cpu, bus)
}

/// Create a System with initialized components
#[allow(dead_code)]
pub fn create_test_system() -> System {
    System::new()
}

/// Write an ARM program into memory at the given address
#[allow(dead_code)]
pub fn load_arm_program(bus: &mut Bus, start_addr: u32, program: &[u32]) {
    for (i, &instruction) in program.iter().enumerate() {
        let addr = start_addr + (i as u32 * 4);
        bus.write32(addr, instruction)
            .expect("Failed to write to memory");
    }
}

/// Write a Thumb program into memory at the given address
#[allow(dead_code)]
pub fn load_thumb_program(bus: &mut Bus, start_addr: u32, program: &[u16]) {
    for (i, &instruction) in program.iter().enumerate() {
        let addr = start_addr + (i as u32 * 2);
        bus.write16(addr, instruction)
            .expect("Failed to write to memory");
    }
}

/// Create a System booted straight into a cartridge image
#[allow(dead_code)]
pub fn rom_system(rom: &[u8]) -> System {
    let mut system = System::new();
    system.load_rom_bytes(rom);
    system.skip_bios();
    system
}

/// Execute N CPU instructions, stopping at the first error
#[allow(dead_code)]
pub fn execute_n_instructions(cpu: &mut CPU, bus: &mut Bus, n: usize) {
    for _ in 0..n {
        if cpu.step(bus).is_err() {
            break;
        }
    }
}
