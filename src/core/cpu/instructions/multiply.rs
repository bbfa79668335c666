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

use super::super::registers::Psr;
use super::super::CPU;
use crate::core::error::Result;

impl CPU {
    // === Multiply Instructions ===

    /// MUL/MLA: 32-bit multiply (and accumulate)
    ///
    /// Format: | cond | 000000 | A | S | Rd | Rn | Rs | 1001 | Rm |
    /// Operation: Rd = Rm * Rs (+ Rn)
    ///
    /// With S set, N and Z follow the result; C and V are left unchanged.
    pub(in crate::core::cpu) fn arm_multiply(&mut self, instruction: u32) -> Result<()> {
        let accumulate = instruction & (1 << 21) != 0;
        let set_flags = instruction & (1 << 20) != 0;
        let rd = ((instruction >> 16) & 0xF) as usize;
        let rn = ((instruction >> 12) & 0xF) as usize;
        let rs = ((instruction >> 8) & 0xF) as usize;
        let rm = (instruction & 0xF) as usize;

        let mut result = self.regs.reg(rm).wrapping_mul(self.regs.reg(rs));
        if accumulate {
            result = result.wrapping_add(self.regs.reg(rn));
        }

        self.regs.set_reg(rd, result);
        if set_flags {
            self.regs.set_nz(result);
        }
        Ok(())
    }

    /// UMULL/UMLAL/SMULL/SMLAL: 64-bit multiply (and accumulate)
    ///
    /// Format: | cond | 00001 | U | A | S | RdHi | RdLo | Rs | 1001 | Rm |
    /// Operation: RdHi:RdLo = Rm * Rs (+ RdHi:RdLo)
    pub(in crate::core::cpu) fn arm_multiply_long(&mut self, instruction: u32) -> Result<()> {
        let signed = instruction & (1 << 22) != 0;
        let accumulate = instruction & (1 << 21) != 0;
        let set_flags = instruction & (1 << 20) != 0;
        let rd_hi = ((instruction >> 16) & 0xF) as usize;
        let rd_lo = ((instruction >> 12) & 0xF) as usize;
        let rs = ((instruction >> 8) & 0xF) as usize;
        let rm = (instruction & 0xF) as usize;

        let a = self.regs.reg(rm);
        let b = self.regs.reg(rs);

        let mut result = if signed {
            (i64::from(a as i32) * i64::from(b as i32)) as u64
        } else {
            u64::from(a) * u64::from(b)
        };

        if accumulate {
            let acc = (u64::from(self.regs.reg(rd_hi)) << 32) | u64::from(self.regs.reg(rd_lo));
            result = result.wrapping_add(acc);
        }

        self.regs.set_reg(rd_lo, result as u32);
        self.regs.set_reg(rd_hi, (result >> 32) as u32);

        if set_flags {
            self.regs.set_flag(Psr::N, result >> 63 != 0);
            self.regs.set_flag(Psr::Z, result == 0);
        }
        Ok(())
    }
}
