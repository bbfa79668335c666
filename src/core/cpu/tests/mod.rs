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

//! CPU test modules
//!
//! Tests are organized into the following categories:
//! - `basic`: CPU initialization, reset, fetch and step outcomes
//! - `registers`: Mode switching and banked registers
//! - `condition`: Condition code truth table
//! - `decode`: Decode table classification
//! - `arm`: ARM instruction execution
//! - `thumb`: Thumb instruction execution

use super::*;






#[cfg(test)]
mod thumb;

/// Programs are placed at the start of external work RAM
pub(super) const CODE_BASE: u32 = 0x0200_0000;

/// Scratch data area in internal work RAM
pub(super) const DATA_BASE: u32 = 0x0300_0000;

/// Create a CPU in ARM state with `program` loaded at `CODE_BASE`
pub(super) fn setup_arm(program: &[u32]) -> (CPU, Bus) {
    let mut bus = Bus::new();
    for (i, &word) in program.iter().enumerate() {
        bus.write32(CODE_BASE + (i as u32) * 4, word).unwrap();
    }

    let mut cpu = CPU::new();
    cpu.regs_mut().set_pc(CODE_BASE);
    (cpu, bus)
}

/// Create a CPU in Thumb state with `program` loaded at `CODE_BASE`
pub(super) fn setup_thumb(program: &[u16]) -> (CPU, Bus) {
    let mut bus = Bus::new();
    for (i, &half) in program.iter().enumerate() {
        bus.write16(CODE_BASE + (i as u32) * 2, half).unwrap();
    }

    let mut cpu = CPU::new();
    cpu.regs_mut().set_thumb(true);
    cpu.regs_mut().set_pc(CODE_BASE);
    (cpu, bus)
}

/// Execute `count` instructions, panicking on bus errors
pub(super) fn run(cpu: &mut CPU, bus: &mut Bus, count: usize) {
    for _ in 0..count {
        cpu.step(bus).unwrap();
    }
}
