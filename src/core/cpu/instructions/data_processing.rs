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
use super::super::registers::{Psr, Registers};
use super::super::CPU;
use super::alu::{
    add_with_carry, rotated_immediate, shift_by_immediate, shift_by_register, subtract, Shift,
};
use crate::core::error::Result;

/// Outcome of one ALU operation
struct AluResult {
    value: u32,
    carry: bool,
    overflow: bool,
    /// False for TST/TEQ/CMP/CMN, which only set flags
    writes_result: bool,
}

impl CPU {
    // === ARM Data Processing ===

    /// AND, EOR, SUB, RSB, ADD, ADC, SBC, RSC, TST, TEQ, CMP, CMN, ORR, MOV, BIC, MVN
    ///
    /// Format: | cond | 00 | I | opcode | S | Rn | Rd | operand2 |
    ///
    /// Operand 2 is a rotated 8-bit immediate, or Rm passed through the
    /// barrel shifter by an immediate or a register amount. With S set the
    /// condition flags are updated; with S set and Rd = R15 the CPSR is
    /// restored from the current mode's SPSR instead.
    ///
    /// # Arguments
    ///
    /// * `op` - Operand 2 encoding selected by the decode table
    /// * `instruction` - The full 32-bit instruction
    pub(in crate::core::cpu) fn arm_data_processing(
        &mut self,
        op: ArmInstruction,
        instruction: u32,
    ) -> Result<()> {
        let opcode = (instruction >> 21) & 0xF;
        let set_flags = instruction & (1 << 20) != 0;
        let rn = ((instruction >> 16) & 0xF) as usize;
        let rd = ((instruction >> 12) & 0xF) as usize;

        let (operand2, shifter_carry) = self.arm_operand2(op, instruction);
        let operand1 = self.regs.operand(rn);

        let result = self.alu(opcode, operand1, operand2, shifter_carry);

        if result.writes_result && rd == Registers::PC {
            if set_flags {
                let spsr = self.regs.spsr();
                self.regs.set_cpsr(spsr);
            }
            self.regs.branch_to(result.value);
            return Ok(());
        }

        if result.writes_result {
            self.regs.set_reg(rd, result.value);
        }

        if set_flags {
            self.regs
                .set_nzcv(result.value, result.carry, result.overflow);
        }

        Ok(())
    }

    /// Evaluate operand 2 and the shifter carry-out
    fn arm_operand2(&self, op: ArmInstruction, instruction: u32) -> (u32, bool) {
        let carry = self.regs.flag(Psr::C);

        match op {
            ArmInstruction::DataProcessingImmediate => rotated_immediate(instruction, carry),
            ArmInstruction::DataProcessingRegisterShift => {
                let rm = (instruction & 0xF) as usize;
                let rs = ((instruction >> 8) & 0xF) as usize;
                let shift = Shift::from_bits(instruction >> 5);
                shift_by_register(shift, self.regs.operand(rm), self.regs.operand(rs), carry)
            }
            _ => {
                let rm = (instruction & 0xF) as usize;
                let amount = (instruction >> 7) & 0x1F;
                let shift = Shift::from_bits(instruction >> 5);
                shift_by_immediate(shift, self.regs.operand(rm), amount, carry)
            }
        }
    }

    /// Run one of the sixteen ALU opcodes
    ///
    /// Logical operations report the shifter carry and leave V unchanged.
    fn alu(&self, opcode: u32, a: u32, b: u32, shifter_carry: bool) -> AluResult {
        let carry_in = self.regs.flag(Psr::C);
        let overflow_in = self.regs.flag(Psr::V);

        let logical = |value: u32, writes_result: bool| AluResult {
            value,
            carry: shifter_carry,
            overflow: overflow_in,
            writes_result,
        };
        let arithmetic = |(value, carry, overflow): (u32, bool, bool), writes_result: bool| {
            AluResult {
                value,
                carry,
                overflow,
                writes_result,
            }
        };

        match opcode {
            0x0 => logical(a & b, true),                                // AND
            0x1 => logical(a ^ b, true),                                // EOR
            0x2 => arithmetic(subtract(a, b), true),                    // SUB
            0x3 => arithmetic(subtract(b, a), true),                    // RSB
            0x4 => arithmetic(add_with_carry(a, b, false), true),       // ADD
            0x5 => arithmetic(add_with_carry(a, b, carry_in), true),    // ADC
            0x6 => arithmetic(add_with_carry(a, !b, carry_in), true),   // SBC
            0x7 => arithmetic(add_with_carry(b, !a, carry_in), true),   // RSC
            0x8 => logical(a & b, false),                               // TST
            0x9 => logical(a ^ b, false),                               // TEQ
            0xA => arithmetic(subtract(a, b), false),                   // CMP
            0xB => arithmetic(add_with_carry(a, b, false), false),      // CMN
            0xC => logical(a | b, true),                                // ORR
            0xD => logical(b, true),                                    // MOV
            0xE => logical(a & !b, true),                               // BIC
            _ => logical(!b, true),                                     // MVN
        }
    }

    // === Thumb ALU formats ===

    /// Format 1: LSL/LSR/ASR Rd, Rs, #offset5
    pub(in crate::core::cpu) fn thumb_move_shifted(&mut self, instruction: u16) -> Result<()> {
        let instruction = u32::from(instruction);
        let shift = Shift::from_bits(instruction >> 11);
        let amount = (instruction >> 6) & 0x1F;
        let rs = ((instruction >> 3) & 0x7) as usize;
        let rd = (instruction & 0x7) as usize;

        let (value, carry) =
            shift_by_immediate(shift, self.regs.reg(rs), amount, self.regs.flag(Psr::C));

        self.regs.set_reg(rd, value);
        self.regs.set_nz(value);
        self.regs.set_flag(Psr::C, carry);
        Ok(())
    }

    /// Format 2: ADD/SUB Rd, Rs, Rn or #offset3
    pub(in crate::core::cpu) fn thumb_add_subtract(&mut self, instruction: u16) -> Result<()> {
        let instruction = u32::from(instruction);
        let immediate = instruction & (1 << 10) != 0;
        let sub = instruction & (1 << 9) != 0;
        let field = (instruction >> 6) & 0x7;
        let rs = ((instruction >> 3) & 0x7) as usize;
        let rd = (instruction & 0x7) as usize;

        let a = self.regs.reg(rs);
        let b = if immediate {
            field
        } else {
            self.regs.reg(field as usize)
        };

        let (value, carry, overflow) = if sub {
            subtract(a, b)
        } else {
            add_with_carry(a, b, false)
        };

        self.regs.set_reg(rd, value);
        self.regs.set_nzcv(value, carry, overflow);
        Ok(())
    }

    /// Format 3: MOV/CMP/ADD/SUB Rd, #offset8
    pub(in crate::core::cpu) fn thumb_immediate(&mut self, instruction: u16) -> Result<()> {
        let instruction = u32::from(instruction);
        let opcode = (instruction >> 11) & 0x3;
        let rd = ((instruction >> 8) & 0x7) as usize;
        let imm = instruction & 0xFF;
        let a = self.regs.reg(rd);

        match opcode {
            0 => {
                self.regs.set_reg(rd, imm);
                self.regs.set_nz(imm);
            }
            1 => {
                let (value, carry, overflow) = subtract(a, imm);
                self.regs.set_nzcv(value, carry, overflow);
            }
            2 => {
                let (value, carry, overflow) = add_with_carry(a, imm, false);
                self.regs.set_reg(rd, value);
                self.regs.set_nzcv(value, carry, overflow);
            }
            _ => {
                let (value, carry, overflow) = subtract(a, imm);
                self.regs.set_reg(rd, value);
                self.regs.set_nzcv(value, carry, overflow);
            }
        }
        Ok(())
    }

    /// Format 4: register-to-register ALU operations on r0-r7
    pub(in crate::core::cpu) fn thumb_alu(&mut self, instruction: u16) -> Result<()> {
        let instruction = u32::from(instruction);
        let opcode = (instruction >> 6) & 0xF;
        let rs = ((instruction >> 3) & 0x7) as usize;
        let rd = (instruction & 0x7) as usize;

        let a = self.regs.reg(rd);
        let b = self.regs.reg(rs);
        let carry_in = self.regs.flag(Psr::C);

        match opcode {
            // LSL, LSR, ASR, ROR
            0x2 | 0x3 | 0x4 | 0x7 => {
                let shift = match opcode {
                    0x2 => Shift::Lsl,
                    0x3 => Shift::Lsr,
                    0x4 => Shift::Asr,
                    _ => Shift::Ror,
                };
                let (value, carry) = shift_by_register(shift, a, b, carry_in);
                self.regs.set_reg(rd, value);
                self.regs.set_nz(value);
                self.regs.set_flag(Psr::C, carry);
            }
            // NEG
            0x9 => {
                let (value, carry, overflow) = subtract(0, b);
                self.regs.set_reg(rd, value);
                self.regs.set_nzcv(value, carry, overflow);
            }
            // MUL
            0xD => {
                let value = a.wrapping_mul(b);
                self.regs.set_reg(rd, value);
                self.regs.set_nz(value);
            }
            // Remaining opcodes map onto the ARM ALU
            _ => {
                let arm_opcode = match opcode {
                    0x0 => 0x0, // AND
                    0x1 => 0x1, // EOR
                    0x5 => 0x5, // ADC
                    0x6 => 0x6, // SBC
                    0x8 => 0x8, // TST
                    0xA => 0xA, // CMP
                    0xB => 0xB, // CMN
                    0xC => 0xC, // ORR
                    0xE => 0xE, // BIC
                    _ => 0xF,   // MVN
                };
                let result = self.alu(arm_opcode, a, b, carry_in);
                if result.writes_result {
                    self.regs.set_reg(rd, result.value);
                }
                self.regs
                    .set_nzcv(result.value, result.carry, result.overflow);
            }
        }
        Ok(())
    }

    /// Format 5: ADD/CMP/MOV with high registers, and BX
    ///
    /// ADD and MOV leave the flags alone; writing R15 branches.
    pub(in crate::core::cpu) fn thumb_hi_register(&mut self, instruction: u16) -> Result<()> {
        let instruction = u32::from(instruction);
        let opcode = (instruction >> 8) & 0x3;
        let rs = (((instruction >> 3) & 0x7) | ((instruction >> 3) & 0x8)) as usize;
        let rd = ((instruction & 0x7) | ((instruction >> 4) & 0x8)) as usize;

        let a = self.regs.operand(rd);
        let b = self.regs.operand(rs);

        match opcode {
            0 => self.write_hi_register(rd, a.wrapping_add(b)),
            1 => {
                let (value, carry, overflow) = subtract(a, b);
                self.regs.set_nzcv(value, carry, overflow);
            }
            2 => self.write_hi_register(rd, b),
            _ => self.exchange(b),
        }
        Ok(())
    }

    fn write_hi_register(&mut self, rd: usize, value: u32) {
        if rd == Registers::PC {
            self.regs.branch_to(value);
        } else {
            self.regs.set_reg(rd, value);
        }
    }

    /// Format 12: ADD Rd, PC/SP, #word8
    ///
    /// The PC-relative form uses the word-aligned PC value.
    pub(in crate::core::cpu) fn thumb_load_address(&mut self, instruction: u16) -> Result<()> {
        let instruction = u32::from(instruction);
        let from_sp = instruction & (1 << 11) != 0;
        let rd = ((instruction >> 8) & 0x7) as usize;
        let offset = (instruction & 0xFF) << 2;

        let base = if from_sp {
            self.regs.reg(Registers::SP)
        } else {
            self.regs.operand(Registers::PC) & !3
        };

        self.regs.set_reg(rd, base.wrapping_add(offset));
        Ok(())
    }

    /// Format 13: ADD SP, #+/-imm7 (scaled by 4)
    pub(in crate::core::cpu) fn thumb_add_sp(&mut self, instruction: u16) -> Result<()> {
        let instruction = u32::from(instruction);
        let offset = (instruction & 0x7F) << 2;
        let sp = self.regs.reg(Registers::SP);

        let value = if instruction & (1 << 7) != 0 {
            sp.wrapping_sub(offset)
        } else {
            sp.wrapping_add(offset)
        };

        self.regs.set_reg(Registers::SP, value);
        Ok(())
    }
}
