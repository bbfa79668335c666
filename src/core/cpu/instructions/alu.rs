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

//! Barrel shifter and adder shared by the ARM and Thumb handlers
//!
//! Every function returns the result together with the carry it produces,
//! so callers decide whether the flags are written.

/// Barrel shifter operation, bits 6-5 of a shifted register operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Shift {
    Lsl,
    Lsr,
    Asr,
    Ror,
}

impl Shift {
    #[inline(always)]
    pub(super) fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            0 => Shift::Lsl,
            1 => Shift::Lsr,
            2 => Shift::Asr,
            _ => Shift::Ror,
        }
    }
}

/// Shift by a 5-bit immediate amount
///
/// The encoding reuses amount 0: LSR #0 and ASR #0 mean a shift by 32,
/// ROR #0 means RRX (rotate right by one through carry).
pub(super) fn shift_by_immediate(shift: Shift, value: u32, amount: u32, carry: bool) -> (u32, bool) {
    let amount = amount & 0x1F;
    match shift {
        Shift::Lsl => lsl(value, amount, carry),
        Shift::Lsr => lsr(value, if amount == 0 { 32 } else { amount }, carry),
        Shift::Asr => asr(value, if amount == 0 { 32 } else { amount }, carry),
        Shift::Ror if amount == 0 => rrx(value, carry),
        Shift::Ror => ror(value, amount, carry),
    }
}

/// Shift by the bottom byte of a register
///
/// An amount of zero leaves both the value and the carry untouched.
pub(super) fn shift_by_register(shift: Shift, value: u32, amount: u32, carry: bool) -> (u32, bool) {
    let amount = amount & 0xFF;
    match shift {
        Shift::Lsl => lsl(value, amount, carry),
        Shift::Lsr => lsr(value, amount, carry),
        Shift::Asr => asr(value, amount, carry),
        Shift::Ror => ror(value, amount, carry),
    }
}

fn lsl(value: u32, amount: u32, carry: bool) -> (u32, bool) {
    match amount {
        0 => (value, carry),
        1..=31 => (value << amount, (value >> (32 - amount)) & 1 != 0),
        32 => (0, value & 1 != 0),
        _ => (0, false),
    }
}

fn lsr(value: u32, amount: u32, carry: bool) -> (u32, bool) {
    match amount {
        0 => (value, carry),
        1..=31 => (value >> amount, (value >> (amount - 1)) & 1 != 0),
        32 => (0, value >> 31 != 0),
        _ => (0, false),
    }
}

fn asr(value: u32, amount: u32, carry: bool) -> (u32, bool) {
    match amount {
        0 => (value, carry),
        1..=31 => (
            ((value as i32) >> amount) as u32,
            (value >> (amount - 1)) & 1 != 0,
        ),
        _ => (((value as i32) >> 31) as u32, value >> 31 != 0),
    }
}

fn ror(value: u32, amount: u32, carry: bool) -> (u32, bool) {
    if amount == 0 {
        return (value, carry);
    }
    let result = value.rotate_right(amount & 0x1F);
    (result, result >> 31 != 0)
}

fn rrx(value: u32, carry: bool) -> (u32, bool) {
    ((value >> 1) | (u32::from(carry) << 31), value & 1 != 0)
}

/// Rotated 8-bit immediate of data-processing and MSR instructions
///
/// A rotation of zero keeps the incoming carry.
pub(super) fn rotated_immediate(instruction: u32, carry: bool) -> (u32, bool) {
    let imm = instruction & 0xFF;
    let rotate = ((instruction >> 8) & 0xF) * 2;
    if rotate == 0 {
        (imm, carry)
    } else {
        let value = imm.rotate_right(rotate);
        (value, value >> 31 != 0)
    }
}

/// `a + b + carry`, returning (result, carry out, signed overflow)
pub(super) fn add_with_carry(a: u32, b: u32, carry: bool) -> (u32, bool, bool) {
    let wide = u64::from(a) + u64::from(b) + u64::from(carry);
    let result = wide as u32;
    let overflow = (!(a ^ b) & (a ^ result)) >> 31 != 0;
    (result, wide >> 32 != 0, overflow)
}

/// `a - b`, with carry meaning "no borrow"
#[inline(always)]
pub(super) fn subtract(a: u32, b: u32) -> (u32, bool, bool) {
    add_with_carry(a, !b, true)
}
