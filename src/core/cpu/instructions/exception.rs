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

use super::super::registers::{Mode, Psr, Registers};
use super::super::CPU;
use crate::core::error::Result;

impl CPU {
    // === Exception Instructions ===

    /// SWI: Software interrupt
    ///
    /// Enters Supervisor mode at vector 0x08. The comment field is left for
    /// the handler to read back through LR.
    pub(in crate::core::cpu) fn software_interrupt(&mut self) -> Result<()> {
        log::debug!(
            "SWI 0x{:X} at 0x{:08X}",
            self.swi_comment(),
            self.regs.pc().wrapping_sub(self.regs.instruction_size())
        );
        self.enter_exception(Mode::Supervisor, Self::VECTOR_SWI);
        Ok(())
    }

    /// Undefined instruction (including every coprocessor instruction)
    ///
    /// Enters Undefined mode at vector 0x04.
    pub(in crate::core::cpu) fn undefined_instruction(&mut self, instruction: u32) -> Result<()> {
        let pc = self.regs.pc().wrapping_sub(self.regs.instruction_size());
        log::warn!(
            "Undefined instruction 0x{:08X} at 0x{:08X}",
            instruction,
            pc
        );
        self.enter_exception(Mode::Undefined, Self::VECTOR_UNDEFINED);
        Ok(())
    }

    /// Take an exception
    ///
    /// The CPSR is saved to the new mode's SPSR, LR receives the address
    /// of the instruction after the one that raised it, and execution
    /// continues in ARM state with IRQs disabled at `vector`.
    ///
    /// # Arguments
    ///
    /// * `mode` - Mode the exception is handled in
    /// * `vector` - Exception vector address
    pub(in crate::core::cpu) fn enter_exception(&mut self, mode: Mode, vector: u32) {
        let cpsr = self.regs.cpsr();
        let return_address = self.regs.pc();

        self.regs.switch_mode(mode);
        self.regs.set_spsr(cpsr);
        self.regs.set_reg(Registers::LR, return_address);
        self.regs.set_thumb(false);
        self.regs.set_flag(Psr::I, true);
        self.regs.set_pc(vector);
    }

    fn swi_comment(&self) -> u32 {
        if self.regs.is_thumb() {
            self.regs.instruction() & 0xFF
        } else {
            self.regs.instruction() & 0x00FF_FFFF
        }
    }
}
