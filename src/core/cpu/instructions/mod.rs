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

//! CPU instruction implementations
//!
//! This module contains the ARMv4T instruction handlers for both the ARM
//! and Thumb instruction sets, organized by instruction type.

use super::decode::{ArmInstruction, ThumbInstruction};
use super::CPU;
use crate::core::error::Result;
use crate::core::memory::Bus;

// Instruction modules organized by type
mod alu;
mod block_transfer;
mod branch;
mod data_processing;
mod exception;
mod load_store;
mod multiply;
mod psr_transfer;

impl CPU {
    /// Execute an ARM instruction whose condition has already passed
    ///
    /// # Arguments
    ///
    /// * `op` - Instruction class from the ARM decode table
    /// * `instruction` - The full 32-bit instruction
    /// * `bus` - Memory bus for memory operations
    pub(super) fn execute_arm(
        &mut self,
        op: ArmInstruction,
        instruction: u32,
        bus: &mut Bus,
    ) -> Result<()> {
        match op {
            ArmInstruction::BranchExchange => self.arm_branch_exchange(instruction),
            ArmInstruction::Branch | ArmInstruction::BranchLink => self.arm_branch(instruction),
            ArmInstruction::DataProcessingImmediate
            | ArmInstruction::DataProcessingImmediateShift
            | ArmInstruction::DataProcessingRegisterShift => {
                self.arm_data_processing(op, instruction)
            }
            ArmInstruction::Mrs => self.arm_mrs(instruction),
            ArmInstruction::MsrRegister | ArmInstruction::MsrImmediate => {
                self.arm_msr(op, instruction)
            }
            ArmInstruction::Multiply => self.arm_multiply(instruction),
            ArmInstruction::MultiplyLong => self.arm_multiply_long(instruction),
            ArmInstruction::SingleDataSwap => self.arm_swap(instruction, bus),
            ArmInstruction::SingleDataTransfer => self.arm_single_transfer(instruction, bus),
            ArmInstruction::HalfwordTransferRegister | ArmInstruction::HalfwordTransferImmediate => {
                self.arm_halfword_transfer(op, instruction, bus)
            }
            ArmInstruction::BlockDataTransfer => self.arm_block_transfer(instruction, bus),
            ArmInstruction::SoftwareInterrupt => self.software_interrupt(),
            ArmInstruction::CoprocessorDataTransfer
            | ArmInstruction::CoprocessorDataOperation
            | ArmInstruction::CoprocessorRegisterTransfer
            | ArmInstruction::Undefined => self.undefined_instruction(instruction),
        }
    }

    /// Execute a Thumb instruction
    ///
    /// # Arguments
    ///
    /// * `op` - Instruction format from the Thumb decode table
    /// * `instruction` - The 16-bit instruction
    /// * `bus` - Memory bus for memory operations
    pub(super) fn execute_thumb(
        &mut self,
        op: ThumbInstruction,
        instruction: u16,
        bus: &mut Bus,
    ) -> Result<()> {
        match op {
            ThumbInstruction::MoveShiftedRegister => self.thumb_move_shifted(instruction),
            ThumbInstruction::AddSubtract => self.thumb_add_subtract(instruction),
            ThumbInstruction::MoveCompareAddSubtractImmediate => {
                self.thumb_immediate(instruction)
            }
            ThumbInstruction::AluOperation => self.thumb_alu(instruction),
            ThumbInstruction::HiRegisterOperation => self.thumb_hi_register(instruction),
            ThumbInstruction::PcRelativeLoad => self.thumb_pc_relative_load(instruction, bus),
            ThumbInstruction::LoadStoreRegisterOffset => {
                self.thumb_load_store_register(instruction, bus)
            }
            ThumbInstruction::LoadStoreSignExtended => {
                self.thumb_load_store_sign_extended(instruction, bus)
            }
            ThumbInstruction::LoadStoreImmediateOffset => {
                self.thumb_load_store_immediate(instruction, bus)
            }
            ThumbInstruction::LoadStoreHalfword => self.thumb_load_store_halfword(instruction, bus),
            ThumbInstruction::SpRelativeLoadStore => self.thumb_sp_relative(instruction, bus),
            ThumbInstruction::LoadAddress => self.thumb_load_address(instruction),
            ThumbInstruction::AddOffsetToSp => self.thumb_add_sp(instruction),
            ThumbInstruction::PushPop => self.thumb_push_pop(instruction, bus),
            ThumbInstruction::MultipleLoadStore => self.thumb_multiple(instruction, bus),
            ThumbInstruction::ConditionalBranch => self.thumb_conditional_branch(instruction),
            ThumbInstruction::SoftwareInterrupt => self.software_interrupt(),
            ThumbInstruction::UnconditionalBranch => self.thumb_branch(instruction),
            ThumbInstruction::LongBranchLink => self.thumb_long_branch_link(instruction),
            ThumbInstruction::Undefined => self.undefined_instruction(u32::from(instruction)),
        }
    }
}
