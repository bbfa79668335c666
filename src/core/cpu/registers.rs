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

//! ARM7TDMI register file
//!
//! Sixteen visible general-purpose registers, the current program status
//! register (CPSR), one saved status register (SPSR) per exception mode and
//! the banked copies of R8-R14 that the processor mode selects between.

use bitflags::bitflags;

bitflags! {
    /// Program status register (CPSR/SPSR)
    ///
    /// | Bits  | Meaning |
    /// |-------|---------|
    /// | 31    | N - negative |
    /// | 30    | Z - zero |
    /// | 29    | C - carry |
    /// | 28    | V - overflow |
    /// | 7     | I - IRQ disable |
    /// | 6     | F - FIQ disable |
    /// | 5     | T - Thumb state |
    /// | 4-0   | Processor mode |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Psr: u32 {
        const N = 1 << 31;
        const Z = 1 << 30;
        const C = 1 << 29;
        const V = 1 << 28;
        const I = 1 << 7;
        const F = 1 << 6;
        const T = 1 << 5;
        const MODE = 0x1F;

        const FLAGS = Self::N.bits() | Self::Z.bits() | Self::C.bits() | Self::V.bits();
    }
}

impl Psr {
    /// Processor mode encoded in bits 4-0, if it is a valid mode
    pub fn mode(self) -> Option<Mode> {
        Mode::from_bits(self.bits() & Self::MODE.bits())
    }

    /// Same status word with the mode bits replaced
    pub fn with_mode(self, mode: Mode) -> Self {
        Self::from_bits_retain((self.bits() & !Self::MODE.bits()) | mode as u32)
    }

    /// Register bank selected by the mode bits
    ///
    /// Reserved mode encodings fall back to the User bank.
    fn bank(self) -> Bank {
        self.mode().map_or(Bank::User, Mode::bank)
    }
}

/// ARM7TDMI processor modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Mode {
    User = 0x10,
    Fiq = 0x11,
    Irq = 0x12,
    Supervisor = 0x13,
    Abort = 0x17,
    Undefined = 0x1B,
    System = 0x1F,
}

impl Mode {
    /// Decode the 5-bit mode field
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits & 0x1F {
            0x10 => Some(Mode::User),
            0x11 => Some(Mode::Fiq),
            0x12 => Some(Mode::Irq),
            0x13 => Some(Mode::Supervisor),
            0x17 => Some(Mode::Abort),
            0x1B => Some(Mode::Undefined),
            0x1F => Some(Mode::System),
            _ => None,
        }
    }

    /// True for every mode except User
    pub fn is_privileged(self) -> bool {
        self != Mode::User
    }

    fn bank(self) -> Bank {
        match self {
            Mode::User | Mode::System => Bank::User,
            Mode::Fiq => Bank::Fiq,
            Mode::Irq => Bank::Irq,
            Mode::Supervisor => Bank::Supervisor,
            Mode::Abort => Bank::Abort,
            Mode::Undefined => Bank::Undefined,
        }
    }
}

/// Physical register banks, User and System share one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bank {
    User = 0,
    Fiq = 1,
    Irq = 2,
    Supervisor = 3,
    Abort = 4,
    Undefined = 5,
}

const BANK_COUNT: usize = 6;

/// Register file
///
/// # Example
/// ```
/// use gbarx::core::cpu::{Mode, Psr, Registers};
///
/// let mut regs = Registers::new();
/// assert_eq!(regs.cpsr().mode(), Some(Mode::Supervisor));
///
/// regs.set_reg(13, 0x0300_7FE0);
/// regs.switch_mode(Mode::Irq);
/// regs.set_reg(13, 0x0300_7FA0);
/// regs.switch_mode(Mode::Supervisor);
/// assert_eq!(regs.reg(13), 0x0300_7FE0);
/// ```
#[derive(Debug, Clone)]
pub struct Registers {
    /// Visible registers r0-r15 for the current mode
    regs: [u32; 16],

    /// Current program status register
    cpsr: Psr,

    /// Saved program status registers, indexed by bank (User slot unused)
    spsr: [Psr; BANK_COUNT],

    /// Inactive R13/R14 copies, indexed by bank
    banked_sp_lr: [[u32; 2]; BANK_COUNT],

    /// R8-R12 of the FIQ bank while another mode is active
    fiq_r8_r12: [u32; 5],

    /// R8-R12 of every other mode while FIQ is active
    user_r8_r12: [u32; 5],

    /// Most recently fetched instruction
    instruction: u32,
}

impl Registers {
    /// Stack pointer index
    pub const SP: usize = 13;
    /// Link register index
    pub const LR: usize = 14;
    /// Program counter index
    pub const PC: usize = 15;

    /// Power-on status: Supervisor mode, IRQ and FIQ disabled, ARM state
    pub const RESET_CPSR: u32 = 0x0000_00D3;

    /// Create a register file in the power-on state
    pub fn new() -> Self {
        Self {
            regs: [0u32; 16],
            cpsr: Psr::from_bits_retain(Self::RESET_CPSR),
            spsr: [Psr::empty(); BANK_COUNT],
            banked_sp_lr: [[0u32; 2]; BANK_COUNT],
            fiq_r8_r12: [0u32; 5],
            user_r8_r12: [0u32; 5],
            instruction: 0,
        }
    }

    /// Return to the power-on state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Read a visible register
    #[inline(always)]
    pub fn reg(&self, index: usize) -> u32 {
        self.regs[index]
    }

    /// Write a visible register
    ///
    /// Writing r15 stores the value unchanged; callers that branch use
    /// [`Registers::branch_to`] to get state-dependent alignment.
    #[inline(always)]
    pub fn set_reg(&mut self, index: usize, value: u32) {
        self.regs[index] = value;
    }

    /// Read a register as an instruction operand
    ///
    /// r15 reads as the address of the current instruction plus two
    /// instruction widths (8 in ARM state, 4 in Thumb state). The program
    /// counter has already been advanced past the current instruction, so
    /// one more instruction width is added here.
    #[inline(always)]
    pub fn operand(&self, index: usize) -> u32 {
        if index == Self::PC {
            self.regs[Self::PC].wrapping_add(self.instruction_size())
        } else {
            self.regs[index]
        }
    }

    #[inline(always)]
    pub fn pc(&self) -> u32 {
        self.regs[Self::PC]
    }

    #[inline(always)]
    pub fn set_pc(&mut self, value: u32) {
        self.regs[Self::PC] = value;
    }

    /// Jump to `target`, aligned for the current instruction set
    pub fn branch_to(&mut self, target: u32) {
        let mask = if self.is_thumb() { !1 } else { !3 };
        self.regs[Self::PC] = target & mask;
    }

    /// Width of one instruction in the current state (2 or 4 bytes)
    #[inline(always)]
    pub fn instruction_size(&self) -> u32 {
        if self.is_thumb() {
            2
        } else {
            4
        }
    }

    pub fn instruction(&self) -> u32 {
        self.instruction
    }

    pub fn set_instruction(&mut self, instruction: u32) {
        self.instruction = instruction;
    }

    pub fn cpsr(&self) -> Psr {
        self.cpsr
    }

    /// Replace the CPSR, switching register banks if the mode changes
    pub fn set_cpsr(&mut self, value: Psr) {
        if value.mode().is_none() {
            log::warn!("CPSR written with reserved mode bits 0x{:02X}", value.bits() & 0x1F);
        }
        self.swap_bank(value.bank());
        self.cpsr = value;
    }

    /// SPSR of the current mode
    ///
    /// User and System mode have no SPSR; the CPSR is returned instead.
    pub fn spsr(&self) -> Psr {
        match self.cpsr.bank() {
            Bank::User => self.cpsr,
            bank => self.spsr[bank as usize],
        }
    }

    /// Write the SPSR of the current mode (ignored in User and System mode)
    pub fn set_spsr(&mut self, value: Psr) {
        match self.cpsr.bank() {
            Bank::User => log::debug!("Ignoring SPSR write in {:?} mode", self.cpsr.mode()),
            bank => self.spsr[bank as usize] = value,
        }
    }

    /// Current processor mode, if the mode bits are valid
    pub fn mode(&self) -> Option<Mode> {
        self.cpsr.mode()
    }

    /// Enter `mode`, swapping the banked registers
    pub fn switch_mode(&mut self, mode: Mode) {
        self.swap_bank(mode.bank());
        self.cpsr = self.cpsr.with_mode(mode);
    }

    fn swap_bank(&mut self, new: Bank) {
        let old = self.cpsr.bank();
        if old == new {
            return;
        }

        self.banked_sp_lr[old as usize] = [self.regs[Self::SP], self.regs[Self::LR]];
        [self.regs[Self::SP], self.regs[Self::LR]] = self.banked_sp_lr[new as usize];

        if old == Bank::Fiq {
            self.fiq_r8_r12.copy_from_slice(&self.regs[8..13]);
            self.regs[8..13].copy_from_slice(&self.user_r8_r12);
        } else if new == Bank::Fiq {
            self.user_r8_r12.copy_from_slice(&self.regs[8..13]);
            self.regs[8..13].copy_from_slice(&self.fiq_r8_r12);
        }
    }

    /// Read a register from the User bank regardless of the current mode
    ///
    /// Used by block transfers with the S bit set.
    pub fn user_reg(&self, index: usize) -> u32 {
        let bank = self.cpsr.bank();
        match index {
            8..=12 if bank == Bank::Fiq => self.user_r8_r12[index - 8],
            13 | 14 if bank != Bank::User => self.banked_sp_lr[Bank::User as usize][index - 13],
            _ => self.regs[index],
        }
    }

    /// Write a register in the User bank regardless of the current mode
    pub fn set_user_reg(&mut self, index: usize, value: u32) {
        let bank = self.cpsr.bank();
        match index {
            8..=12 if bank == Bank::Fiq => self.user_r8_r12[index - 8] = value,
            13 | 14 if bank != Bank::User => {
                self.banked_sp_lr[Bank::User as usize][index - 13] = value
            }
            _ => self.regs[index] = value,
        }
    }

    #[inline(always)]
    pub fn flag(&self, flag: Psr) -> bool {
        self.cpsr.contains(flag)
    }

    #[inline(always)]
    pub fn set_flag(&mut self, flag: Psr, value: bool) {
        self.cpsr.set(flag, value);
    }

    /// Set N and Z from a result
    #[inline(always)]
    pub fn set_nz(&mut self, result: u32) {
        self.cpsr.set(Psr::N, result & 0x8000_0000 != 0);
        self.cpsr.set(Psr::Z, result == 0);
    }

    /// Set N, Z, C and V in one go
    pub fn set_nzcv(&mut self, result: u32, carry: bool, overflow: bool) {
        self.set_nz(result);
        self.cpsr.set(Psr::C, carry);
        self.cpsr.set(Psr::V, overflow);
    }

    #[inline(always)]
    pub fn is_thumb(&self) -> bool {
        self.cpsr.contains(Psr::T)
    }

    pub fn set_thumb(&mut self, thumb: bool) {
        self.cpsr.set(Psr::T, thumb);
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
