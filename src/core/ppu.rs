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

//! PPU register block and video memories
//!
//! Only the register contract of the picture-processing unit lives here:
//! the LCD I/O registers at 0x04000000-0x04000058 and the three video
//! memories (palette RAM, VRAM, OAM). The pixel pipeline is driven from
//! outside through [`PPU::set_vcount`] and the status flag setters.
//!
//! # Register Map
//!
//! | Offset | Register  | Access |
//! |--------|-----------|--------|
//! | 0x00   | DISPCNT   | R/W    |
//! | 0x02   | GREENSWAP | R/W    |
//! | 0x04   | DISPSTAT  | R/W (bits 0-2 read-only) |
//! | 0x06   | VCOUNT    | R only |
//! | 0x08   | BG0CNT-BG3CNT | R/W |
//! | 0x10   | BG scroll, affine | W |
//! | 0x40   | WIN0H-WINOUT | R/W |
//! | 0x4C   | MOSAIC    | W      |
//! | 0x50   | BLDCNT, BLDALPHA, BLDY | R/W |

use crate::core::error::Result;
use crate::core::memory::IoDevice;

/// Picture-processing unit register state
pub struct PPU {
    /// Raw register bytes, indexed by offset from 0x04000000
    registers: [u8; Self::REGISTER_BLOCK_SIZE],

    /// Palette RAM (1KB)
    pram: Vec<u8>,

    /// Video RAM (96KB)
    vram: Vec<u8>,

    /// Object attribute memory (1KB)
    oam: Vec<u8>,
}

impl PPU {
    /// Palette RAM size (1KB)
    pub const PRAM_SIZE: usize = 1024;

    /// VRAM size (96KB)
    pub const VRAM_SIZE: usize = 96 * 1024;

    /// OAM size (1KB)
    pub const OAM_SIZE: usize = 1024;

    /// Register block base address
    pub const BASE: u32 = 0x0400_0000;

    /// Last address of the register window
    pub const END: u32 = 0x0400_0058;

    /// Register storage, rounded up so a word access at the last
    /// offset stays inside the block
    const REGISTER_BLOCK_SIZE: usize = 0x60;

    pub const DISPCNT: u32 = 0x00;
    pub const GREENSWAP: u32 = 0x02;
    pub const DISPSTAT: u32 = 0x04;
    pub const VCOUNT: u32 = 0x06;
    pub const BG0CNT: u32 = 0x08;
    pub const BLDY: u32 = 0x54;

    /// DISPSTAT bits owned by the display timing logic
    const DISPSTAT_READ_ONLY: u8 = 0b0000_0111;

    const VBLANK_FLAG: u8 = 1 << 0;
    const HBLANK_FLAG: u8 = 1 << 1;
    const VCOUNT_FLAG: u8 = 1 << 2;

    /// Create a new PPU with cleared registers and video memories
    pub fn new() -> Self {
        Self {
            registers: [0u8; Self::REGISTER_BLOCK_SIZE],
            pram: vec![0u8; Self::PRAM_SIZE],
            vram: vec![0u8; Self::VRAM_SIZE],
            oam: vec![0u8; Self::OAM_SIZE],
        }
    }

    /// Reset registers and video memories to zero
    pub fn reset(&mut self) {
        self.registers.fill(0);
        self.pram.fill(0);
        self.vram.fill(0);
        self.oam.fill(0);
    }

    pub fn pram(&self) -> &[u8] {
        &self.pram
    }

    pub fn pram_mut(&mut self) -> &mut [u8] {
        &mut self.pram
    }

    pub fn vram(&self) -> &[u8] {
        &self.vram
    }

    pub fn vram_mut(&mut self) -> &mut [u8] {
        &mut self.vram
    }

    pub fn oam(&self) -> &[u8] {
        &self.oam
    }

    pub fn oam_mut(&mut self) -> &mut [u8] {
        &mut self.oam
    }

    /// Current scanline as reported through VCOUNT
    pub fn vcount(&self) -> u8 {
        self.registers[Self::VCOUNT as usize]
    }

    /// Update VCOUNT and the V-counter match flag in DISPSTAT
    ///
    /// The match target is the high byte of DISPSTAT (LYC).
    pub fn set_vcount(&mut self, line: u8) {
        self.registers[Self::VCOUNT as usize] = line;
        let target = self.registers[Self::DISPSTAT as usize + 1];
        self.set_status_flag(Self::VCOUNT_FLAG, line == target);
    }

    pub fn set_vblank(&mut self, active: bool) {
        self.set_status_flag(Self::VBLANK_FLAG, active);
    }

    pub fn set_hblank(&mut self, active: bool) {
        self.set_status_flag(Self::HBLANK_FLAG, active);
    }

    fn set_status_flag(&mut self, flag: u8, active: bool) {
        let stat = &mut self.registers[Self::DISPSTAT as usize];
        if active {
            *stat |= flag;
        } else {
            *stat &= !flag;
        }
    }
}

impl Default for PPU {
    fn default() -> Self {
        Self::new()
    }
}

impl IoDevice for PPU {
    fn address_range(&self) -> (u32, u32) {
        (Self::BASE, Self::END)
    }

    fn read_register8(&self, offset: u32) -> Result<u8> {
        let value = self
            .registers
            .get(offset as usize)
            .copied()
            .unwrap_or(0);
        log::trace!("PPU read8 at offset 0x{:02X} -> 0x{:02X}", offset, value);
        Ok(value)
    }

    fn write_register8(&mut self, offset: u32, value: u8) -> Result<()> {
        log::trace!("PPU write8 at offset 0x{:02X} <- 0x{:02X}", offset, value);
        match offset {
            // VCOUNT is driven by the display timing logic
            o if o == Self::VCOUNT || o == Self::VCOUNT + 1 => {
                log::debug!("Ignoring write to read-only VCOUNT (0x{:02X})", value);
            }
            o if o == Self::DISPSTAT => {
                let stat = &mut self.registers[Self::DISPSTAT as usize];
                *stat = (*stat & Self::DISPSTAT_READ_ONLY) | (value & !Self::DISPSTAT_READ_ONLY);
            }
            o => match self.registers.get_mut(o as usize) {
                Some(byte) => *byte = value,
                None => log::warn!("PPU write8 outside register block (offset 0x{:02X})", o),
            },
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "PPU"
    }
}
