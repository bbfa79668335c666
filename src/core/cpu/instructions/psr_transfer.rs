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

use super::super::decode::ArmInstruction;
use super::super::registers::Psr;
use super::super::CPU;
use super::alu::rotated_immediate;
use crate::core::error::Result;

impl CPU {
    // === PSR Transfer ===

    /// MRS: Move PSR to register
    ///
    /// Format: | cond | 00010 | Ps | 001111 | Rd | 000000000000 |
    pub(in crate::core::cpu) fn arm_mrs(&mut self, instruction: u32) -> Result<()> {
        let use_spsr = instruction & (1 << 22) != 0;
        let rd = ((instruction >> 12) & 0xF) as usize;

        let psr = if use_spsr {
            self.regs.spsr()
        } else {
            self.regs.cpsr()
        };

        self.regs.set_reg(rd, psr.bits());
        Ok(())
    }

    /// MSR: Move register or immediate to PSR fields
    ///
    /// Bits 19-16 select which bytes are written (flags, status, extension,
    /// control). In User mode only the flag byte of the CPSR can change, and
    /// the T bit is never written by MSR.
    pub(in crate::core::cpu) fn arm_msr(
        &mut self,
        op: ArmInstruction,
        instruction: u32,
    ) -> Result<()> {
        let use_spsr = instruction & (1 << 22) != 0;

        let value = if op == ArmInstruction::MsrImmediate {
            rotated_immediate(instruction, false).0
        } else {
            self.regs.reg((instruction & 0xF) as usize)
        };

        let mut mask = 0u32;
        for byte in 0..4 {
            if instruction & (1 << (16 + byte)) != 0 {
                mask |= 0xFF << (byte * 8);
            }
        }

        if use_spsr {
            let spsr = self.regs.spsr().bits();
            self.regs
                .set_spsr(Psr::from_bits_retain((spsr & !mask) | (value & mask)));
            return Ok(());
        }

        let privileged = self.regs.mode().is_some_and(|mode| mode.is_privileged());
        if !privileged {
            mask &= Psr::FLAGS.bits();
        }
        mask &= !Psr::T.bits();

        let cpsr = self.regs.cpsr().bits();
        self.regs
            .set_cpsr(Psr::from_bits_retain((cpsr & !mask) | (value & mask)));
        Ok(())
    }
}
