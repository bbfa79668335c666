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

//! Single register loads and stores
//!
//! The bus rejects misaligned halfword and word accesses, so every helper
//! here aligns the address first and applies the ARM7TDMI's own treatment
//! of the low address bits: misaligned word loads rotate the word,
//! misaligned halfword loads rotate the halfword and misaligned signed
//! halfword loads read a sign-extended byte.

use super::super::decode::ArmInstruction;
use super::super::registers::{Psr, Registers};
use super::super::CPU;
use super::alu::{shift_by_immediate, Shift};
use crate::core::error::Result;
use crate::core::memory::Bus;

/// LDR semantics: aligned read, rotated by the misalignment
pub(super) fn load_word(bus: &mut Bus, address: u32) -> Result<u32> {
    let value = bus.read32(address & !3)?;
    Ok(value.rotate_right((address & 3) * 8))
}

/// LDRH semantics
pub(super) fn load_halfword(bus: &mut Bus, address: u32) -> Result<u32> {
    let value = u32::from(bus.read16(address & !1)?);
    Ok(value.rotate_right((address & 1) * 8))
}

/// LDRSH semantics
pub(super) fn load_signed_halfword(bus: &mut Bus, address: u32) -> Result<u32> {
    if address & 1 != 0 {
        return load_signed_byte(bus, address);
    }
    Ok(bus.read16(address)? as i16 as i32 as u32)
}

/// LDRSB semantics
pub(super) fn load_signed_byte(bus: &mut Bus, address: u32) -> Result<u32> {
    Ok(bus.read8(address)? as i8 as i32 as u32)
}

pub(super) fn store_word(bus: &mut Bus, address: u32, value: u32) -> Result<()> {
    bus.write32(address & !3, value)
}

pub(super) fn store_halfword(bus: &mut Bus, address: u32, value: u32) -> Result<()> {
    bus.write16(address & !1, value as u16)
}

impl CPU {
    // === ARM Load/Store ===

    /// LDR/STR/LDRB/STRB
    ///
    /// Format: | cond | 01 | I | P | U | B | W | L | Rn | Rd | offset12 |
    ///
    /// The offset is a 12-bit immediate (I = 0) or Rm shifted by an
    /// immediate amount (I = 1). P selects pre- or post-indexing, U adds or
    /// subtracts the offset, and W requests base write-back (post-indexed
    /// transfers always write back).
    pub(in crate::core::cpu) fn arm_single_transfer(
        &mut self,
        instruction: u32,
        bus: &mut Bus,
    ) -> Result<()> {
        let register_offset = instruction & (1 << 25) != 0;
        let byte = instruction & (1 << 22) != 0;
        let load = instruction & (1 << 20) != 0;
        let rd = ((instruction >> 12) & 0xF) as usize;

        let offset = if register_offset {
            let rm = (instruction & 0xF) as usize;
            let amount = (instruction >> 7) & 0x1F;
            let shift = Shift::from_bits(instruction >> 5);
            shift_by_immediate(shift, self.regs.operand(rm), amount, self.regs.flag(Psr::C)).0
        } else {
            instruction & 0xFFF
        };

        let (address, write_back) = self.indexed_address(instruction, offset);

        if load {
            let value = if byte {
                u32::from(bus.read8(address)?)
            } else {
                load_word(bus, address)?
            };
            self.write_back(instruction, write_back);
            self.load_result(rd, value);
        } else {
            let value = self.regs.operand(rd);
            if byte {
                bus.write8(address, value as u8)?;
            } else {
                store_word(bus, address, value)?;
            }
            self.write_back(instruction, write_back);
        }
        Ok(())
    }

    /// LDRH/STRH/LDRSB/LDRSH
    ///
    /// Format: | cond | 000 | P | U | I | W | L | Rn | Rd | offsetH | 1SH1 | offsetL/Rm |
    pub(in crate::core::cpu) fn arm_halfword_transfer(
        &mut self,
        op: ArmInstruction,
        instruction: u32,
        bus: &mut Bus,
    ) -> Result<()> {
        let load = instruction & (1 << 20) != 0;
        let rd = ((instruction >> 12) & 0xF) as usize;
        let kind = (instruction >> 5) & 0x3;

        let offset = if op == ArmInstruction::HalfwordTransferImmediate {
            ((instruction >> 4) & 0xF0) | (instruction & 0xF)
        } else {
            self.regs.operand((instruction & 0xF) as usize)
        };

        let (address, write_back) = self.indexed_address(instruction, offset);

        if load {
            let value = match kind {
                1 => load_halfword(bus, address)?,
                2 => load_signed_byte(bus, address)?,
                _ => load_signed_halfword(bus, address)?,
            };
            self.write_back(instruction, write_back);
            self.load_result(rd, value);
        } else {
            store_halfword(bus, address, self.regs.operand(rd))?;
            self.write_back(instruction, write_back);
        }
        Ok(())
    }

    /// SWP/SWPB: atomic load and store
    ///
    /// Format: | cond | 00010 | B | 00 | Rn | Rd | 0000 | 1001 | Rm |
    /// Operation: tmp = [Rn]; [Rn] = Rm; Rd = tmp
    pub(in crate::core::cpu) fn arm_swap(&mut self, instruction: u32, bus: &mut Bus) -> Result<()> {
        let byte = instruction & (1 << 22) != 0;
        let rn = ((instruction >> 16) & 0xF) as usize;
        let rd = ((instruction >> 12) & 0xF) as usize;
        let rm = (instruction & 0xF) as usize;

        let address = self.regs.reg(rn);
        let source = self.regs.reg(rm);

        let value = if byte {
            let value = u32::from(bus.read8(address)?);
            bus.write8(address, source as u8)?;
            value
        } else {
            let value = load_word(bus, address)?;
            store_word(bus, address, source)?;
            value
        };

        self.regs.set_reg(rd, value);
        Ok(())
    }

    /// Compute the transfer address and the written-back base
    ///
    /// Returns (address, Some(new_base)) when the base register is updated.
    fn indexed_address(&self, instruction: u32, offset: u32) -> (u32, Option<u32>) {
        let pre_index = instruction & (1 << 24) != 0;
        let up = instruction & (1 << 23) != 0;
        let write_back = instruction & (1 << 21) != 0;
        let rn = ((instruction >> 16) & 0xF) as usize;

        let base = self.regs.operand(rn);
        let offset_base = if up {
            base.wrapping_add(offset)
        } else {
            base.wrapping_sub(offset)
        };

        match (pre_index, write_back) {
            (true, false) => (offset_base, None),
            (true, true) => (offset_base, Some(offset_base)),
            (false, _) => (base, Some(offset_base)),
        }
    }

    fn write_back(&mut self, instruction: u32, new_base: Option<u32>) {
        let rn = ((instruction >> 16) & 0xF) as usize;
        if let Some(value) = new_base {
            if rn != Registers::PC {
                self.regs.set_reg(rn, value);
            }
        }
    }

    /// Write a loaded value to Rd, branching if Rd is R15
    fn load_result(&mut self, rd: usize, value: u32) {
        if rd == Registers::PC {
            self.regs.branch_to(value);
        } else {
            self.regs.set_reg(rd, value);
        }
    }

    // === Thumb Load/Store ===

    /// Format 6: LDR Rd, [PC, #word8]
    pub(in crate::core::cpu) fn thumb_pc_relative_load(
        &mut self,
        instruction: u16,
        bus: &mut Bus,
    ) -> Result<()> {
        let instruction = u32::from(instruction);
        let rd = ((instruction >> 8) & 0x7) as usize;
        let address = (self.regs.operand(Registers::PC) & !3).wrapping_add((instruction & 0xFF) << 2);

        let value = bus.read32(address)?;
        self.regs.set_reg(rd, value);
        Ok(())
    }

    /// Format 7: LDR/STR/LDRB/STRB Rd, [Rb, Ro]
    pub(in crate::core::cpu) fn thumb_load_store_register(
        &mut self,
        instruction: u16,
        bus: &mut Bus,
    ) -> Result<()> {
        let instruction = u32::from(instruction);
        let load = instruction & (1 << 11) != 0;
        let byte = instruction & (1 << 10) != 0;
        let (address, rd) = self.thumb_register_address(instruction);

        match (load, byte) {
            (false, false) => store_word(bus, address, self.regs.reg(rd))?,
            (false, true) => bus.write8(address, self.regs.reg(rd) as u8)?,
            (true, false) => {
                let value = load_word(bus, address)?;
                self.regs.set_reg(rd, value);
            }
            (true, true) => {
                let value = u32::from(bus.read8(address)?);
                self.regs.set_reg(rd, value);
            }
        }
        Ok(())
    }

    /// Format 8: STRH/LDSB/LDRH/LDSH Rd, [Rb, Ro]
    pub(in crate::core::cpu) fn thumb_load_store_sign_extended(
        &mut self,
        instruction: u16,
        bus: &mut Bus,
    ) -> Result<()> {
        let instruction = u32::from(instruction);
        let halfword = instruction & (1 << 11) != 0;
        let signed = instruction & (1 << 10) != 0;
        let (address, rd) = self.thumb_register_address(instruction);

        let value = match (signed, halfword) {
            (false, false) => return store_halfword(bus, address, self.regs.reg(rd)),
            (false, true) => load_halfword(bus, address)?,
            (true, false) => load_signed_byte(bus, address)?,
            (true, true) => load_signed_halfword(bus, address)?,
        };

        self.regs.set_reg(rd, value);
        Ok(())
    }

    /// Format 9: LDR/STR/LDRB/STRB Rd, [Rb, #offset5]
    ///
    /// Word transfers scale the offset by 4.
    pub(in crate::core::cpu) fn thumb_load_store_immediate(
        &mut self,
        instruction: u16,
        bus: &mut Bus,
    ) -> Result<()> {
        let instruction = u32::from(instruction);
        let byte = instruction & (1 << 12) != 0;
        let load = instruction & (1 << 11) != 0;
        let offset = (instruction >> 6) & 0x1F;
        let rb = ((instruction >> 3) & 0x7) as usize;
        let rd = (instruction & 0x7) as usize;

        let base = self.regs.reg(rb);
        if byte {
            let address = base.wrapping_add(offset);
            if load {
                let value = u32::from(bus.read8(address)?);
                self.regs.set_reg(rd, value);
            } else {
                bus.write8(address, self.regs.reg(rd) as u8)?;
            }
        } else {
            let address = base.wrapping_add(offset << 2);
            if load {
                let value = load_word(bus, address)?;
                self.regs.set_reg(rd, value);
            } else {
                store_word(bus, address, self.regs.reg(rd))?;
            }
        }
        Ok(())
    }

    /// Format 10: LDRH/STRH Rd, [Rb, #offset5 * 2]
    pub(in crate::core::cpu) fn thumb_load_store_halfword(
        &mut self,
        instruction: u16,
        bus: &mut Bus,
    ) -> Result<()> {
        let instruction = u32::from(instruction);
        let load = instruction & (1 << 11) != 0;
        let offset = ((instruction >> 6) & 0x1F) << 1;
        let rb = ((instruction >> 3) & 0x7) as usize;
        let rd = (instruction & 0x7) as usize;

        let address = self.regs.reg(rb).wrapping_add(offset);
        if load {
            let value = load_halfword(bus, address)?;
            self.regs.set_reg(rd, value);
        } else {
            store_halfword(bus, address, self.regs.reg(rd))?;
        }
        Ok(())
    }

    /// Format 11: LDR/STR Rd, [SP, #word8]
    pub(in crate::core::cpu) fn thumb_sp_relative(
        &mut self,
        instruction: u16,
        bus: &mut Bus,
    ) -> Result<()> {
        let instruction = u32::from(instruction);
        let load = instruction & (1 << 11) != 0;
        let rd = ((instruction >> 8) & 0x7) as usize;
        let address = self
            .regs
            .reg(Registers::SP)
            .wrapping_add((instruction & 0xFF) << 2);

        if load {
            let value = load_word(bus, address)?;
            self.regs.set_reg(rd, value);
        } else {
            store_word(bus, address, self.regs.reg(rd))?;
        }
        Ok(())
    }

    /// Address and Rd of the register-offset formats 7 and 8
    fn thumb_register_address(&self, instruction: u32) -> (u32, usize) {
        let ro = ((instruction >> 6) & 0x7) as usize;
        let rb = ((instruction >> 3) & 0x7) as usize;
        let rd = (instruction & 0x7) as usize;
        (self.regs.reg(rb).wrapping_add(self.regs.reg(ro)), rd)
    }
}
