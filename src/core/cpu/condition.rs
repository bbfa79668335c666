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

//! Condition field evaluation
//!
//! Every ARM instruction and the Thumb conditional branch carry a 4-bit
//! condition that is tested against the N, Z, C and V flags before the
//! instruction takes effect.

use super::registers::Psr;

/// Instruction condition codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Condition {
    /// Equal (Z set)
    EQ = 0x0,
    /// Not equal (Z clear)
    NE = 0x1,
    /// Carry set / unsigned higher or same
    CS = 0x2,
    /// Carry clear / unsigned lower
    CC = 0x3,
    /// Negative
    MI = 0x4,
    /// Positive or zero
    PL = 0x5,
    /// Overflow
    VS = 0x6,
    /// No overflow
    VC = 0x7,
    /// Unsigned higher (C set and Z clear)
    HI = 0x8,
    /// Unsigned lower or same (C clear or Z set)
    LS = 0x9,
    /// Signed greater or equal (N == V)
    GE = 0xA,
    /// Signed less than (N != V)
    LT = 0xB,
    /// Signed greater than (Z clear and N == V)
    GT = 0xC,
    /// Signed less or equal (Z set or N != V)
    LE = 0xD,
    /// Always
    AL = 0xE,
    /// Never
    NV = 0xF,
}

impl Condition {
    /// Decode the low 4 bits of `bits`
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0xF {
            0x0 => Condition::EQ,
            0x1 => Condition::NE,
            0x2 => Condition::CS,
            0x3 => Condition::CC,
            0x4 => Condition::MI,
            0x5 => Condition::PL,
            0x6 => Condition::VS,
            0x7 => Condition::VC,
            0x8 => Condition::HI,
            0x9 => Condition::LS,
            0xA => Condition::GE,
            0xB => Condition::LT,
            0xC => Condition::GT,
            0xD => Condition::LE,
            0xE => Condition::AL,
            _ => Condition::NV,
        }
    }

    /// Condition field of an ARM instruction (bits 31-28)
    #[inline(always)]
    pub fn of_arm(instruction: u32) -> Self {
        Self::from_bits(instruction >> 28)
    }

    /// Test the condition against the flags in `psr`
    ///
    /// # Example
    /// ```
    /// use gbarx::core::cpu::{Condition, Psr};
    ///
    /// assert!(Condition::EQ.passes(Psr::Z));
    /// assert!(!Condition::NE.passes(Psr::Z));
    /// assert!(!Condition::NV.passes(Psr::all()));
    /// ```
    pub fn passes(self, psr: Psr) -> bool {
        let n = psr.contains(Psr::N);
        let z = psr.contains(Psr::Z);
        let c = psr.contains(Psr::C);
        let v = psr.contains(Psr::V);

        match self {
            Condition::EQ => z,
            Condition::NE => !z,
            Condition::CS => c,
            Condition::CC => !c,
            Condition::MI => n,
            Condition::PL => !n,
            Condition::VS => v,
            Condition::VC => !v,
            Condition::HI => c && !z,
            Condition::LS => !c || z,
            Condition::GE => n == v,
            Condition::LT => n != v,
            Condition::GT => !z && n == v,
            Condition::LE => z || n != v,
            Condition::AL => true,
            Condition::NV => false,
        }
    }
}
