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

use super::super::condition::Condition;
use super::super::registers::Registers;
use super::super::CPU;
use crate::core::error::Result;

impl CPU {
    // === Branch Instructions ===

    /// B/BL: Branch (with link)
    ///
    /// Format: | cond | 101 | L | offset24 |
    /// Operation: PC = PC + 8 + (sign_extend(offset24) << 2)
    ///
    /// With L set, LR receives the address of the following instruction.
    pub(in crate::core::cpu) fn arm_branch(&mut self, instruction: u32) -> Result<()> {
        let link = instruction & (1 << 24) != 0;
        let offset = (((instruction & 0x00FF_FFFF) << 8) as i32 >> 6) as u32;

        if link {
            self.regs.set_reg(Registers::LR, self.regs.pc());
        }

        let target = self.regs.operand(Registers::PC).wrapping_add(offset);
        self.regs.branch_to(target);
        Ok(())
    }

    /// BX: Branch and exchange instruction set
    ///
    /// Format: | cond | 000100101111111111110001 | Rm |
    ///
    /// Bit 0 of Rm selects the new state (1 = Thumb).
    pub(in crate::core::cpu) fn arm_branch_exchange(&mut self, instruction: u32) -> Result<()> {
        let rm = (instruction & 0xF) as usize;
        let target = self.regs.operand(rm);
        self.exchange(target);
        Ok(())
    }

    /// Switch state according to bit 0 of `target` and jump there
    pub(in crate::core::cpu) fn exchange(&mut self, target: u32) {
        let thumb = target & 1 != 0;
        if thumb != self.regs.is_thumb() {
            log::trace!(
                "BX to 0x{:08X}, entering {} state",
                target,
                if thumb { "Thumb" } else { "ARM" }
            );
        }
        self.regs.set_thumb(thumb);
        self.regs.branch_to(target);
    }

    /// Format 16: B<cond> label
    ///
    /// Operation: if cond then PC = PC + 4 + (sign_extend(offset8) << 1)
    pub(in crate::core::cpu) fn thumb_conditional_branch(&mut self, instruction: u16) -> Result<()> {
        let condition = Condition::from_bits(u32::from(instruction >> 8));
        if !condition.passes(self.regs.cpsr()) {
            return Ok(());
        }

        let offset = ((instruction as u8 as i8 as i32) << 1) as u32;
        let target = self.regs.operand(Registers::PC).wrapping_add(offset);
        self.regs.branch_to(target);
        Ok(())
    }

    /// Format 18: B label
    ///
    /// Operation: PC = PC + 4 + (sign_extend(offset11) << 1)
    pub(in crate::core::cpu) fn thumb_branch(&mut self, instruction: u16) -> Result<()> {
        let offset = ((u32::from(instruction & 0x7FF) << 21) as i32 >> 20) as u32;
        let target = self.regs.operand(Registers::PC).wrapping_add(offset);
        self.regs.branch_to(target);
        Ok(())
    }

    /// Format 19: BL label, executed as two consecutive halves
    ///
    /// The first half (H = 0) stores PC + 4 + (sign_extend(offset) << 12) in
    /// LR. The second half (H = 1) jumps to LR + (offset << 1) and leaves the
    /// return address, with bit 0 set, in LR.
    pub(in crate::core::cpu) fn thumb_long_branch_link(&mut self, instruction: u16) -> Result<()> {
        let offset = u32::from(instruction & 0x7FF);

        if instruction & (1 << 11) == 0 {
            let high = ((offset << 21) as i32 >> 9) as u32;
            let lr = self.regs.operand(Registers::PC).wrapping_add(high);
            self.regs.set_reg(Registers::LR, lr);
        } else {
            let target = self.regs.reg(Registers::LR).wrapping_add(offset << 1);
            let return_address = self.regs.pc() | 1;
            self.regs.set_reg(Registers::LR, return_address);
            self.regs.branch_to(target);
        }
        Ok(())
    }
}
