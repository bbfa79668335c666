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

//! Block data transfers (LDM/STM, PUSH/POP, LDMIA/STMIA)
//!
//! Registers are always transferred lowest-numbered first to the lowest
//! address. An empty register list transfers R15 only but still moves the
//! base by 0x40, as the ARM7TDMI does.

use super::super::registers::Registers;
use super::super::CPU;
use crate::core::error::Result;
use crate::core::memory::Bus;

/// Base adjustment for an empty register list
const EMPTY_LIST_SIZE: u32 = 0x40;

/// Register list to transfer and the number of bytes it covers
fn effective_list(list: u16) -> (u16, u32) {
    if list == 0 {
        (1 << Registers::PC, EMPTY_LIST_SIZE)
    } else {
        (list, list.count_ones() * 4)
    }
}

impl CPU {
    // === ARM Block Transfer ===

    /// LDM/STM
    ///
    /// Format: | cond | 100 | P | U | S | W | L | Rn | register list |
    ///
    /// P and U select the addressing mode (IA, IB, DA, DB). With S set and
    /// R15 in an LDM list the CPSR is restored from the SPSR; otherwise S
    /// transfers the User-bank registers.
    pub(in crate::core::cpu) fn arm_block_transfer(
        &mut self,
        instruction: u32,
        bus: &mut Bus,
    ) -> Result<()> {
        let pre_index = instruction & (1 << 24) != 0;
        let up = instruction & (1 << 23) != 0;
        let s_bit = instruction & (1 << 22) != 0;
        let write_back = instruction & (1 << 21) != 0;
        let load = instruction & (1 << 20) != 0;
        let rn = ((instruction >> 16) & 0xF) as usize;

        let base = self.regs.reg(rn);
        let (list, size) = effective_list(instruction as u16);

        let (start, new_base) = match (pre_index, up) {
            (false, true) => (base, base.wrapping_add(size)),
            (true, true) => (base.wrapping_add(4), base.wrapping_add(size)),
            (false, false) => (
                base.wrapping_sub(size).wrapping_add(4),
                base.wrapping_sub(size),
            ),
            (true, false) => (base.wrapping_sub(size), base.wrapping_sub(size)),
        };

        let pc_in_list = list & (1 << Registers::PC) != 0;
        let restore_cpsr = s_bit && load && pc_in_list;
        let user_bank = s_bit && !restore_cpsr;

        if load {
            if write_back {
                self.regs.set_reg(rn, new_base);
            }
            if let Some(pc) = self.load_registers(bus, start, list, user_bank)? {
                if restore_cpsr {
                    let spsr = self.regs.spsr();
                    self.regs.set_cpsr(spsr);
                }
                self.regs.branch_to(pc);
            }
        } else {
            let written_base = write_back.then_some((rn, new_base));
            self.store_registers(bus, start, list, user_bank, written_base)?;
            if write_back {
                self.regs.set_reg(rn, new_base);
            }
        }
        Ok(())
    }

    // === Thumb Block Transfer ===

    /// Format 14: PUSH {Rlist, LR} / POP {Rlist, PC}
    ///
    /// POP into PC stays in Thumb state.
    pub(in crate::core::cpu) fn thumb_push_pop(&mut self, instruction: u16, bus: &mut Bus) -> Result<()> {
        let load = instruction & (1 << 11) != 0;
        let extra = instruction & (1 << 8) != 0;
        let mut list = instruction & 0xFF;
        let sp = self.regs.reg(Registers::SP);

        if load {
            if extra {
                list |= 1 << Registers::PC;
            }
            let (list, size) = effective_list(list);
            let pc = self.load_registers(bus, sp, list, false)?;
            self.regs.set_reg(Registers::SP, sp.wrapping_add(size));
            if let Some(pc) = pc {
                self.regs.branch_to(pc);
            }
        } else {
            if extra {
                list |= 1 << Registers::LR;
            }
            let (list, size) = effective_list(list);
            let start = sp.wrapping_sub(size);
            self.store_registers(bus, start, list, false, None)?;
            self.regs.set_reg(Registers::SP, start);
        }
        Ok(())
    }

    /// Format 15: LDMIA/STMIA Rb!, {Rlist}
    pub(in crate::core::cpu) fn thumb_multiple(&mut self, instruction: u16, bus: &mut Bus) -> Result<()> {
        let load = instruction & (1 << 11) != 0;
        let rb = usize::from((instruction >> 8) & 0x7);
        let (list, size) = effective_list(instruction & 0xFF);

        let base = self.regs.reg(rb);
        let new_base = base.wrapping_add(size);

        if load {
            self.regs.set_reg(rb, new_base);
            if let Some(pc) = self.load_registers(bus, base, list, false)? {
                self.regs.branch_to(pc);
            }
        } else {
            self.store_registers(bus, base, list, false, Some((rb, new_base)))?;
            self.regs.set_reg(rb, new_base);
        }
        Ok(())
    }

    // === Shared helpers ===

    /// Store every register in `list` to consecutive words from `start`
    ///
    /// `written_base` names the base register and its written-back value.
    /// A base register that is not the first in the list is stored with
    /// its new value.
    fn store_registers(
        &mut self,
        bus: &mut Bus,
        start: u32,
        list: u16,
        user_bank: bool,
        written_base: Option<(usize, u32)>,
    ) -> Result<()> {
        let first = list.trailing_zeros() as usize;
        let mut address = start;

        for reg in (0..16).filter(|&reg| list & (1 << reg) != 0) {
            let value = match written_base {
                Some((rn, new_base)) if rn == reg && reg != first => new_base,
                _ if user_bank => self.regs.user_reg(reg),
                _ => self.regs.operand(reg),
            };
            bus.write32(address & !3, value)?;
            address = address.wrapping_add(4);
        }
        Ok(())
    }

    /// Load every register in `list` from consecutive words at `start`
    ///
    /// R15 is not written; its loaded value is returned so the caller can
    /// branch after any mode change.
    fn load_registers(
        &mut self,
        bus: &mut Bus,
        start: u32,
        list: u16,
        user_bank: bool,
    ) -> Result<Option<u32>> {
        let mut address = start;
        let mut pc = None;

        for reg in (0..16).filter(|&reg| list & (1 << reg) != 0) {
            let value = bus.read32(address & !3)?;
            if reg == Registers::PC {
                pc = Some(value);
            } else if user_bank {
                self.regs.set_user_reg(reg, value);
            } else {
                self.regs.set_reg(reg, value);
            }
            address = address.wrapping_add(4);
        }
        Ok(pc)
    }
}
