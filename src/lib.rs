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

//! Game Boy Advance emulator core library
//!
//! This library provides the instruction-execution engine (ARM7TDMI with the
//! ARM and Thumb instruction sets) and the physical memory bus that the rest
//! of a Game Boy Advance emulator is built on.
//!
//! # Example
//!
//! ```
//! use gbarx::core::cpu::CPU;
//! use gbarx::core::memory::Bus;
//!
//! let mut cpu = CPU::new();
//! let mut bus = Bus::new();
//!
//! // MOV r0, #1 placed in external work RAM
//! bus.write32(0x0200_0000, 0xE3A0_0001).unwrap();
//! cpu.regs_mut().set_pc(0x0200_0000);
//!
//! cpu.step(&mut bus).unwrap();
//! assert_eq!(cpu.regs().reg(0), 1);
//! ```

pub mod core;
