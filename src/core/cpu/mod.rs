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

use std::sync::Arc;

use crate::core::error::Result;
use crate::core::memory::Bus;

/// CPU (ARM7TDMI) emulation implementation
///
/// # Specifications
/// - Architecture: ARMv4T (32-bit ARM and 16-bit Thumb instruction sets)
/// - Clock frequency: 16.78 MHz
/// - Registers: 16 visible general-purpose registers, CPSR, banked R8-R14 and SPSRs
///
/// # Example
/// ```
/// use gbarx::core::cpu::CPU;
///
/// let mut cpu = CPU::new();
/// cpu.reset();
/// assert_eq!(cpu.regs().pc(), 0);
/// assert_eq!(cpu.regs().cpsr().bits(), 0xD3);
/// ```
pub struct CPU {
    /// Register file (general-purpose, status and banked registers)
    regs: Registers,

    /// Instruction class lookup tables
    ///
    /// Immutable after construction, so several CPUs may share one copy.
    tables: Arc<DecodeTables>,
}

/// Result of a single [`CPU::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The instruction was dispatched to its handler
    Executed,
    /// The ARM condition field failed; only the fetch took effect
    Skipped,
}

// Module declarations
mod condition;
mod decode;
mod instructions;
mod registers;
#[cfg(test)]
mod tests;

// Re-exports
pub use condition::Condition;
pub use decode::{
    classify_arm, classify_thumb, ArmInstruction, DecodeTables, ThumbInstruction,
    ARM_TABLE_SIZE, THUMB_TABLE_SIZE,
};
pub use registers::{Mode, Psr, Registers};

impl CPU {
    /// Undefined-instruction exception vector
    pub const VECTOR_UNDEFINED: u32 = 0x0000_0004;

    /// Software-interrupt exception vector
    pub const VECTOR_SWI: u32 = 0x0000_0008;

    /// Create a new CPU in the power-on state with freshly built decode tables
    ///
    /// # Example
    /// ```
    /// use gbarx::core::cpu::CPU;
    ///
    /// let cpu = CPU::new();
    /// assert_eq!(cpu.regs().reg(0), 0);
    /// ```
    pub fn new() -> Self {
        Self::with_tables(Arc::new(DecodeTables::build()))
    }

    /// Create a new CPU that shares already built decode tables
    ///
    /// # Arguments
    ///
    /// * `tables` - Decode tables, typically shared with other CPUs
    pub fn with_tables(tables: Arc<DecodeTables>) -> Self {
        Self {
            regs: Registers::new(),
            tables,
        }
    }

    /// Reset the CPU to its power-on state
    ///
    /// All registers are cleared, PC is set to the boot ROM entry (0x00000000)
    /// and CPSR enters Supervisor mode with IRQ and FIQ disabled.
    pub fn reset(&mut self) {
        self.regs.reset();
    }

    pub fn regs(&self) -> &Registers {
        &self.regs
    }

    pub fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    pub fn tables(&self) -> &Arc<DecodeTables> {
        &self.tables
    }

    /// Execute a single instruction
    ///
    /// Fetches the instruction at PC (16 bits in Thumb state, 32 bits in ARM
    /// state), advances PC past it, evaluates the condition field for ARM
    /// instructions and runs the handler selected by the decode tables.
    ///
    /// # Arguments
    ///
    /// * `bus` - Memory bus for instruction fetch and data access
    ///
    /// # Returns
    ///
    /// - `Ok(StepOutcome::Executed)` if the handler ran
    /// - `Ok(StepOutcome::Skipped)` if the condition check failed
    /// - `Err(EmulatorError)` if a bus access failed
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::cpu::{StepOutcome, CPU};
    /// use gbarx::core::memory::Bus;
    ///
    /// let mut cpu = CPU::new();
    /// let mut bus = Bus::new();
    ///
    /// // MOVNE r0, #1 with Z clear
    /// bus.write32(0x0200_0000, 0x13A0_0001).unwrap();
    /// cpu.regs_mut().set_pc(0x0200_0000);
    /// assert_eq!(cpu.step(&mut bus).unwrap(), StepOutcome::Executed);
    /// assert_eq!(cpu.regs().reg(0), 1);
    /// ```
    pub fn step(&mut self, bus: &mut Bus) -> Result<StepOutcome> {
        let pc = self.regs.pc();

        if self.regs.is_thumb() {
            let instruction = bus.read16(pc)?;
            self.regs.set_instruction(u32::from(instruction));
            self.regs.set_pc(pc.wrapping_add(2));

            let op = self.tables.thumb(DecodeTables::thumb_key(instruction));
            log::trace!("0x{:08X}: {:04X}  {:?}", pc, instruction, op);

            self.execute_thumb(op, instruction, bus)?;
            return Ok(StepOutcome::Executed);
        }

        let instruction = bus.read32(pc)?;
        self.regs.set_instruction(instruction);
        self.regs.set_pc(pc.wrapping_add(4));

        let op = self.tables.arm(DecodeTables::arm_key(instruction));
        log::trace!("0x{:08X}: {:08X}  {:?}", pc, instruction, op);

        let condition = Condition::of_arm(instruction);
        if !condition.passes(self.regs.cpsr()) {
            log::debug!("0x{:08X}: condition {:?} failed, skipping", pc, condition);
            return Ok(StepOutcome::Skipped);
        }
        log::debug!("0x{:08X}: condition {:?} passed", pc, condition);

        self.execute_arm(op, instruction, bus)?;
        Ok(StepOutcome::Executed)
    }

    /// Dump all register values to stdout
    ///
    /// Useful for debugging.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gbarx::core::cpu::CPU;
    ///
    /// let cpu = CPU::new();
    /// cpu.dump_registers();
    /// ```
    pub fn dump_registers(&self) {
        println!("CPU Registers:");
        println!(
            "PC: 0x{:08X}  CPSR: 0x{:08X}  Mode: {:?}  State: {}",
            self.regs.pc(),
            self.regs.cpsr().bits(),
            self.regs.mode(),
            if self.regs.is_thumb() { "Thumb" } else { "ARM" }
        );
        println!();

        // Print general-purpose registers in rows of 4
        for i in 0..16 {
            if i % 4 == 0 && i > 0 {
                println!();
            }
            print!("r{:2}: 0x{:08X}  ", i, self.regs.reg(i));
        }
        println!("\n");
    }
}

impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}
