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

//! Instruction decode tables
//!
//! Instructions are classified once, up front, into two lookup tables:
//!
//! - ARM: 4096 entries indexed by bits 27-20 and 7-4 of the instruction
//! - Thumb: 1024 entries indexed by bits 15-6 of the instruction
//!
//! Each entry names the handler class. The CPU executes an instruction by
//! looking up its class and matching on it.

use std::fmt;

/// Number of entries in the ARM decode table
pub const ARM_TABLE_SIZE: usize = 4096;

/// Number of entries in the Thumb decode table
pub const THUMB_TABLE_SIZE: usize = 1024;

/// ARM (32-bit) instruction classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmInstruction {
    BranchExchange,
    Multiply,
    MultiplyLong,
    SingleDataSwap,
    HalfwordTransferRegister,
    HalfwordTransferImmediate,
    Mrs,
    MsrRegister,
    MsrImmediate,
    DataProcessingImmediate,
    DataProcessingImmediateShift,
    DataProcessingRegisterShift,
    SingleDataTransfer,
    BlockDataTransfer,
    Branch,
    BranchLink,
    CoprocessorDataTransfer,
    CoprocessorDataOperation,
    CoprocessorRegisterTransfer,
    SoftwareInterrupt,
    Undefined,
}

/// Thumb (16-bit) instruction formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThumbInstruction {
    /// Format 1: LSL/LSR/ASR by immediate
    MoveShiftedRegister,
    /// Format 2: ADD/SUB register or 3-bit immediate
    AddSubtract,
    /// Format 3: MOV/CMP/ADD/SUB with 8-bit immediate
    MoveCompareAddSubtractImmediate,
    /// Format 4
    AluOperation,
    /// Format 5: ADD/CMP/MOV on high registers and BX
    HiRegisterOperation,
    /// Format 6
    PcRelativeLoad,
    /// Format 7
    LoadStoreRegisterOffset,
    /// Format 8
    LoadStoreSignExtended,
    /// Format 9
    LoadStoreImmediateOffset,
    /// Format 10
    LoadStoreHalfword,
    /// Format 11
    SpRelativeLoadStore,
    /// Format 12
    LoadAddress,
    /// Format 13
    AddOffsetToSp,
    /// Format 14
    PushPop,
    /// Format 15
    MultipleLoadStore,
    /// Format 16
    ConditionalBranch,
    /// Format 17
    SoftwareInterrupt,
    /// Format 18
    UnconditionalBranch,
    /// Format 19: both halves of BL
    LongBranchLink,
    Undefined,
}

/// Classify one ARM table key
///
/// `key` holds instruction bits 27-20 in bits 11-4 and bits 7-4 in bits 3-0.
pub fn classify_arm(key: u16) -> ArmInstruction {
    let hi = (key >> 4) & 0xFF;
    let lo = key & 0xF;

    if hi == 0x12 && lo == 0x1 {
        return ArmInstruction::BranchExchange;
    }

    // Multiplies, swaps and halfword transfers live in the
    // data-processing space, marked by bit 7 and bit 4 both set.
    if hi & 0xE0 == 0x00 && lo & 0x9 == 0x9 {
        if lo == 0x9 {
            return match hi {
                _ if hi & 0xFC == 0x00 => ArmInstruction::Multiply,
                _ if hi & 0xF8 == 0x08 => ArmInstruction::MultiplyLong,
                _ if hi & 0xFB == 0x10 => ArmInstruction::SingleDataSwap,
                _ => ArmInstruction::Undefined,
            };
        }

        // Stores only exist for the unsigned halfword form
        let load = hi & 0x01 != 0;
        if !load && lo != 0xB {
            return ArmInstruction::Undefined;
        }

        return if hi & 0x04 != 0 {
            ArmInstruction::HalfwordTransferImmediate
        } else {
            ArmInstruction::HalfwordTransferRegister
        };
    }

    if hi & 0xFB == 0x10 && lo == 0x0 {
        return ArmInstruction::Mrs;
    }
    if hi & 0xFB == 0x12 && lo == 0x0 {
        return ArmInstruction::MsrRegister;
    }
    if hi & 0xFB == 0x32 {
        return ArmInstruction::MsrImmediate;
    }

    // TST/TEQ/CMP/CMN without S are not data processing
    if hi & 0xD9 == 0x10 {
        return ArmInstruction::Undefined;
    }

    match hi {
        _ if hi & 0xC0 == 0x00 => {
            if hi & 0x20 != 0 {
                ArmInstruction::DataProcessingImmediate
            } else if lo & 0x1 != 0 {
                ArmInstruction::DataProcessingRegisterShift
            } else {
                ArmInstruction::DataProcessingImmediateShift
            }
        }
        _ if hi & 0xE0 == 0x60 && lo & 0x1 != 0 => ArmInstruction::Undefined,
        _ if hi & 0xC0 == 0x40 => ArmInstruction::SingleDataTransfer,
        _ if hi & 0xE0 == 0x80 => ArmInstruction::BlockDataTransfer,
        _ if hi & 0xE0 == 0xA0 => {
            if hi & 0x10 != 0 {
                ArmInstruction::BranchLink
            } else {
                ArmInstruction::Branch
            }
        }
        _ if hi & 0xE0 == 0xC0 => ArmInstruction::CoprocessorDataTransfer,
        _ if hi & 0xF0 == 0xE0 => {
            if lo & 0x1 != 0 {
                ArmInstruction::CoprocessorRegisterTransfer
            } else {
                ArmInstruction::CoprocessorDataOperation
            }
        }
        _ => ArmInstruction::SoftwareInterrupt,
    }
}

/// Classify one Thumb table key (instruction bits 15-6)
pub fn classify_thumb(key: u16) -> ThumbInstruction {
    let key = key & 0x3FF;

    match key >> 6 {
        0b0000 | 0b0001 => {
            if (key >> 5) & 0x3 == 0x3 {
                ThumbInstruction::AddSubtract
            } else {
                ThumbInstruction::MoveShiftedRegister
            }
        }
        0b0010 | 0b0011 => ThumbInstruction::MoveCompareAddSubtractImmediate,
        0b0100 => match key >> 4 {
            0b01_0000 => ThumbInstruction::AluOperation,
            0b01_0001 => ThumbInstruction::HiRegisterOperation,
            _ => ThumbInstruction::PcRelativeLoad,
        },
        0b0101 => {
            if key & (1 << 3) != 0 {
                ThumbInstruction::LoadStoreSignExtended
            } else {
                ThumbInstruction::LoadStoreRegisterOffset
            }
        }
        0b0110 | 0b0111 => ThumbInstruction::LoadStoreImmediateOffset,
        0b1000 => ThumbInstruction::LoadStoreHalfword,
        0b1001 => ThumbInstruction::SpRelativeLoadStore,
        0b1010 => ThumbInstruction::LoadAddress,
        0b1011 => {
            if key >> 2 == 0b1011_0000 {
                ThumbInstruction::AddOffsetToSp
            } else if (key >> 3) & 0x3 == 0b10 {
                ThumbInstruction::PushPop
            } else {
                ThumbInstruction::Undefined
            }
        }
        0b1100 => ThumbInstruction::MultipleLoadStore,
        0b1101 => match (key >> 2) & 0xF {
            0xF => ThumbInstruction::SoftwareInterrupt,
            0xE => ThumbInstruction::Undefined,
            _ => ThumbInstruction::ConditionalBranch,
        },
        0b1110 => {
            if key & (1 << 5) == 0 {
                ThumbInstruction::UnconditionalBranch
            } else {
                ThumbInstruction::Undefined
            }
        }
        _ => ThumbInstruction::LongBranchLink,
    }
}

/// Prebuilt ARM and Thumb dispatch tables
///
/// Construction is deterministic: two builds always compare equal, so a
/// single instance can be shared between machines behind an `Arc`.
///
/// # Example
/// ```
/// use gbarx::core::cpu::{ArmInstruction, DecodeTables};
///
/// let tables = DecodeTables::build();
/// // B #0 (0xEA000000)
/// let key = DecodeTables::arm_key(0xEA00_0000);
/// assert_eq!(tables.arm(key), ArmInstruction::Branch);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct DecodeTables {
    arm: Box<[ArmInstruction; ARM_TABLE_SIZE]>,
    thumb: Box<[ThumbInstruction; THUMB_TABLE_SIZE]>,
}

impl DecodeTables {
    /// Classify every key of both tables
    pub fn build() -> Self {
        let mut arm = Box::new([ArmInstruction::Undefined; ARM_TABLE_SIZE]);
        for (key, entry) in arm.iter_mut().enumerate() {
            *entry = classify_arm(key as u16);
        }

        let mut thumb = Box::new([ThumbInstruction::Undefined; THUMB_TABLE_SIZE]);
        for (key, entry) in thumb.iter_mut().enumerate() {
            *entry = classify_thumb(key as u16);
        }

        log::debug!(
            "Built decode tables ({} ARM entries, {} Thumb entries)",
            ARM_TABLE_SIZE,
            THUMB_TABLE_SIZE
        );

        Self { arm, thumb }
    }

    /// Table key for an ARM instruction: bits 27-20 and 7-4
    #[inline(always)]
    pub fn arm_key(instruction: u32) -> usize {
        (((instruction >> 16) & 0xFF0) | ((instruction >> 4) & 0xF)) as usize
    }

    /// Table key for a Thumb instruction: bits 15-6
    #[inline(always)]
    pub fn thumb_key(instruction: u16) -> usize {
        (instruction >> 6) as usize
    }

    #[inline(always)]
    pub fn arm(&self, key: usize) -> ArmInstruction {
        self.arm[key & (ARM_TABLE_SIZE - 1)]
    }

    #[inline(always)]
    pub fn thumb(&self, key: usize) -> ThumbInstruction {
        self.thumb[key & (THUMB_TABLE_SIZE - 1)]
    }
}

impl Default for DecodeTables {
    fn default() -> Self {
        Self::build()
    }
}

impl fmt::Debug for DecodeTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let undefined_arm = self
            .arm
            .iter()
            .filter(|&&op| op == ArmInstruction::Undefined)
            .count();
        let undefined_thumb = self
            .thumb
            .iter()
            .filter(|&&op| op == ThumbInstruction::Undefined)
            .count();

        f.debug_struct("DecodeTables")
            .field("arm_entries", &ARM_TABLE_SIZE)
            .field("arm_undefined", &undefined_arm)
            .field("thumb_entries", &THUMB_TABLE_SIZE)
            .field("thumb_undefined", &undefined_thumb)
            .finish()
    }
}
