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

//! Memory bus implementation for the Game Boy Advance
//!
//! The Bus is the central component for all memory operations in the emulator.
//! It decodes addresses, applies mirroring, and routes read/write operations
//! to the appropriate memory region or device.
//!
//! # Memory Map
//!
//! | Address Range           | Region        | Size     | Access |
//! |-------------------------|---------------|----------|--------|
//! | 0x00000000-0x00003FFF   | BIOS ROM      | 16KB     | R only |
//! | 0x00004000-0x01FFFFFF   | Open bus      | -        | -      |
//! | 0x02000000-0x0203FFFF   | External WRAM | 256KB    | R/W    |
//! | 0x03000000-0x03FFFFFF   | Internal WRAM | 32KB     | R/W    |
//! | 0x04000000-0x04000058   | PPU I/O       | -        | R/W    |
//! | 0x04000208              | IME           | 1 byte   | R/W    |
//! | 0x05000000-0x050003FF   | Palette RAM   | 1KB      | R/W    |
//! | 0x06000000-0x06017FFF   | VRAM          | 96KB     | R/W    |
//! | 0x07000000-0x070003FF   | OAM           | 1KB      | R/W    |
//! | 0x08000000-0x0DFFFFFF   | Cartridge ROM | variable | R only |
//!
//! # Mirroring
//!
//! Every backing buffer has a power-of-two size, and the offset inside a
//! region is `address & (size - 1)`. Small banks therefore repeat across
//! their whole window, and no access can leave its buffer.
//!
//! # Example
//!
//! ```
//! use gbarx::core::memory::Bus;
//!
//! let mut bus = Bus::new();
//!
//! bus.write32(0x03000000, 0x12345678).unwrap();
//!
//! // Internal WRAM repeats every 32KB
//! assert_eq!(bus.read32(0x03008000).unwrap(), 0x12345678);
//!
//! // The gap after the BIOS reads as all ones
//! assert_eq!(bus.read32(0x00004000).unwrap(), 0xFFFFFFFF);
//! ```

mod io_device;
mod region;
#[cfg(test)]
mod tests;

pub use io_device::IoDevice;
pub use region::{lookup, AddressRange, MemoryRegion, ADDRESS_MAP};

use crate::core::error::{Access, EmulatorError, Result};
use crate::core::loader;
use crate::core::ppu::PPU;

/// Memory bus managing all memory accesses
///
/// The Bus owns the BIOS, both work RAM banks, the cartridge ROM and the
/// interrupt master enable byte. The PPU register block and video memories
/// are owned by the embedded [`PPU`].
pub struct Bus {
    /// BIOS ROM (16KB)
    ///
    /// Address: 0x00000000-0x00003FFF
    bios: Vec<u8>,

    /// External work RAM (256KB)
    ///
    /// Address: 0x02000000-0x0203FFFF
    ewram: Vec<u8>,

    /// Internal work RAM (32KB)
    ///
    /// Address: 0x03000000-0x03FFFFFF (mirrored every 32KB)
    iwram: Vec<u8>,

    /// Cartridge ROM, length is always a power of two (or zero when no
    /// cartridge is inserted)
    ///
    /// Address: 0x08000000-0x0DFFFFFF
    rom: Vec<u8>,

    /// Interrupt master enable
    ///
    /// Address: 0x04000208. Stored only; no interrupt is ever delivered.
    ime: u8,

    /// PPU register block and video memories
    ppu: PPU,
}

impl Bus {
    /// BIOS size (16KB)
    pub const BIOS_SIZE: usize = 16 * 1024;

    /// External WRAM size (256KB)
    pub const EWRAM_SIZE: usize = 256 * 1024;

    /// Internal WRAM size (32KB)
    pub const IWRAM_SIZE: usize = 32 * 1024;

    pub const BIOS_START: u32 = 0x0000_0000;
    pub const BIOS_END: u32 = 0x0000_3FFF;

    pub const OPEN_BUS_START: u32 = 0x0000_4000;
    pub const OPEN_BUS_END: u32 = 0x01FF_FFFF;

    pub const EWRAM_START: u32 = 0x0200_0000;
    pub const EWRAM_END: u32 = 0x0203_FFFF;

    pub const IWRAM_START: u32 = 0x0300_0000;
    pub const IWRAM_END: u32 = 0x03FF_FFFF;

    pub const IO_START: u32 = PPU::BASE;
    pub const IO_END: u32 = PPU::END;

    pub const IME_ADDR: u32 = 0x0400_0208;

    pub const PRAM_START: u32 = 0x0500_0000;
    pub const PRAM_END: u32 = 0x0500_03FF;

    pub const VRAM_START: u32 = 0x0600_0000;
    pub const VRAM_END: u32 = 0x0601_7FFF;

    pub const OAM_START: u32 = 0x0700_0000;
    pub const OAM_END: u32 = 0x0700_03FF;

    pub const ROM_START: u32 = 0x0800_0000;
    pub const ROM_END: u32 = 0x0DFF_FFFF;

    /// VRAM is addressed through a 128KB mask; the top 32KB of that
    /// span folds back onto the last 32KB bank.
    const VRAM_MIRROR_SIZE: usize = 128 * 1024;
    const VRAM_FOLD: usize = 32 * 1024;

    /// Create a new Bus instance
    ///
    /// Initializes all memory regions with zeros and leaves the cartridge
    /// slot empty.
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::memory::Bus;
    ///
    /// let bus = Bus::new();
    /// assert_eq!(bus.rom_size(), 0);
    /// ```
    pub fn new() -> Self {
        Self {
            bios: vec![0u8; Self::BIOS_SIZE],
            ewram: vec![0u8; Self::EWRAM_SIZE],
            iwram: vec![0u8; Self::IWRAM_SIZE],
            rom: Vec::new(),
            ime: 0,
            ppu: PPU::new(),
        }
    }

    /// Reset the bus to initial state
    ///
    /// Clears work RAM, the PPU and IME, simulating a power-cycle.
    /// BIOS and cartridge contents are preserved as they are read-only.
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write32(0x02000000, 0x12345678).unwrap();
    /// bus.reset();
    /// assert_eq!(bus.read32(0x02000000).unwrap(), 0x00000000);
    /// ```
    pub fn reset(&mut self) {
        self.ewram.fill(0);
        self.iwram.fill(0);
        self.ime = 0;
        self.ppu.reset();
    }

    /// Load BIOS from file
    ///
    /// # Errors
    ///
    /// - `EmulatorError::BiosNotFound` if the file cannot be opened
    /// - `EmulatorError::InvalidBiosSize` if the image is larger than 16KB
    pub fn load_bios(&mut self, path: &str) -> Result<()> {
        let data = std::fs::read(path).map_err(|_| EmulatorError::BiosNotFound(path.to_string()))?;
        self.load_bios_bytes(&data)
    }

    /// Install a BIOS image from memory
    ///
    /// Images shorter than 16KB are zero-padded.
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.load_bios_bytes(&[0xAA, 0xBB]).unwrap();
    /// assert_eq!(bus.read16(0x00000000).unwrap(), 0xBBAA);
    /// assert!(bus.load_bios_bytes(&vec![0; 32 * 1024]).is_err());
    /// ```
    pub fn load_bios_bytes(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > Self::BIOS_SIZE {
            return Err(EmulatorError::InvalidBiosSize {
                max: Self::BIOS_SIZE,
                got: data.len(),
            });
        }

        self.bios.fill(0);
        self.bios[..data.len()].copy_from_slice(data);
        log::info!("BIOS loaded ({} bytes)", data.len());
        Ok(())
    }

    /// Load cartridge ROM from file
    ///
    /// The image is rounded up to the next power of two, see
    /// [`loader::load_rom`].
    pub fn load_rom(&mut self, path: &str) -> Result<()> {
        self.rom = loader::load_rom(path)?;
        Ok(())
    }

    /// Install a cartridge ROM image from memory
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.load_rom_bytes(&[1, 2, 3]);
    /// assert_eq!(bus.rom_size(), 4);
    ///
    /// // The 4-byte image repeats across the cartridge window
    /// assert_eq!(bus.read8(0x08000004).unwrap(), 1);
    /// ```
    pub fn load_rom_bytes(&mut self, data: &[u8]) {
        self.rom = loader::pad_rom(data.to_vec());
    }

    /// Size of the cartridge ROM buffer in bytes (zero when empty)
    pub fn rom_size(&self) -> usize {
        self.rom.len()
    }

    /// Interrupt master enable byte
    pub fn ime(&self) -> u8 {
        self.ime
    }

    pub fn ppu(&self) -> &PPU {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut PPU {
        &mut self.ppu
    }

    /// Read 8-bit value from memory
    ///
    /// 8-bit reads do not require alignment.
    ///
    /// # Returns
    ///
    /// - `Ok(u8)` containing the byte value
    /// - `Err(EmulatorError::UnhandledAddress)` if the address is unmapped
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write8(0x02000001, 0x42).unwrap();
    /// assert_eq!(bus.read8(0x02000001).unwrap(), 0x42);
    /// ```
    pub fn read8(&self, addr: u32) -> Result<u8> {
        match self.identify_region(addr) {
            MemoryRegion::OpenBus => {
                log::warn!("Open bus read8 at 0x{:08X} -> 0xFF", addr);
                Ok(0xFF)
            }
            MemoryRegion::IO => {
                let value = self.ppu.read_register8(addr - Self::IO_START)?;
                log::debug!("Read8 (0x{:02X}) from IO (0x{:08X})", value, addr);
                Ok(value)
            }
            MemoryRegion::IME => {
                log::debug!("Read8 (0x{:02X}) from IME (stub)", self.ime);
                Ok(self.ime)
            }
            MemoryRegion::ROM if self.rom.is_empty() => {
                log::warn!("Read8 from empty cartridge slot at 0x{:08X}", addr);
                Ok(0xFF)
            }
            MemoryRegion::Unmapped => Err(Self::unhandled(addr, 1, Access::Read)),
            region => {
                let value = self.load_byte(region, addr);
                log::debug!("Read8 (0x{:02X}) from {:?} (0x{:08X})", value, region, addr);
                Ok(value)
            }
        }
    }

    /// Read 16-bit value from memory
    ///
    /// Reads a 16-bit value (little-endian). The address must be 2-byte
    /// aligned (address & 0x1 == 0).
    ///
    /// # Returns
    ///
    /// - `Ok(u16)` containing the value
    /// - `Err(EmulatorError::UnalignedAccess)` if address is not 2-byte aligned
    /// - `Err(EmulatorError::UnhandledAddress)` if the address is unmapped
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write16(0x02000000, 0x1234).unwrap();
    /// assert_eq!(bus.read16(0x02000000).unwrap(), 0x1234);
    ///
    /// // Unaligned access fails
    /// assert!(bus.read16(0x02000001).is_err());
    /// ```
    pub fn read16(&self, addr: u32) -> Result<u16> {
        Self::check_alignment(addr, 2)?;

        match self.identify_region(addr) {
            MemoryRegion::OpenBus => {
                log::warn!("Open bus read16 at 0x{:08X} -> 0xFFFF", addr);
                Ok(0xFFFF)
            }
            MemoryRegion::IO => {
                let value = self.ppu.read_register16(addr - Self::IO_START)?;
                log::debug!("Read16 (0x{:04X}) from IO (0x{:08X})", value, addr);
                Ok(value)
            }
            MemoryRegion::IME => {
                log::debug!("Read16 (0x{:02X}) from IME (stub)", self.ime);
                Ok(self.ime as u16)
            }
            MemoryRegion::ROM if self.rom.is_empty() => {
                log::warn!("Read16 from empty cartridge slot at 0x{:08X}", addr);
                Ok(0xFFFF)
            }
            MemoryRegion::Unmapped => Err(Self::unhandled(addr, 2, Access::Read)),
            region => {
                let value = u16::from_le_bytes(self.load_bytes(region, addr));
                log::debug!("Read16 (0x{:04X}) from {:?} (0x{:08X})", value, region, addr);
                Ok(value)
            }
        }
    }

    /// Read 32-bit value from memory
    ///
    /// Reads a 32-bit value (little-endian). The address must be 4-byte
    /// aligned (address & 0x3 == 0).
    ///
    /// # Returns
    ///
    /// - `Ok(u32)` containing the value
    /// - `Err(EmulatorError::UnalignedAccess)` if address is not 4-byte aligned
    /// - `Err(EmulatorError::UnhandledAddress)` if the address is unmapped
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write32(0x02000000, 0x12345678).unwrap();
    /// assert_eq!(bus.read32(0x02000000).unwrap(), 0x12345678);
    ///
    /// // Unaligned access fails
    /// assert!(bus.read32(0x02000002).is_err());
    /// ```
    pub fn read32(&self, addr: u32) -> Result<u32> {
        Self::check_alignment(addr, 4)?;

        match self.identify_region(addr) {
            MemoryRegion::OpenBus => {
                log::warn!("Open bus read32 at 0x{:08X} -> 0xFFFFFFFF", addr);
                Ok(0xFFFF_FFFF)
            }
            MemoryRegion::IO => {
                let value = self.ppu.read_register32(addr - Self::IO_START)?;
                log::debug!("Read32 (0x{:08X}) from IO (0x{:08X})", value, addr);
                Ok(value)
            }
            MemoryRegion::IME => {
                log::debug!("Read32 (0x{:02X}) from IME (stub)", self.ime);
                Ok(self.ime as u32)
            }
            MemoryRegion::ROM if self.rom.is_empty() => {
                log::warn!("Read32 from empty cartridge slot at 0x{:08X}", addr);
                Ok(0xFFFF_FFFF)
            }
            MemoryRegion::Unmapped => Err(Self::unhandled(addr, 4, Access::Read)),
            region => {
                let value = u32::from_le_bytes(self.load_bytes(region, addr));
                log::debug!("Read32 (0x{:08X}) from {:?} (0x{:08X})", value, region, addr);
                Ok(value)
            }
        }
    }

    /// Write 8-bit value to memory
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write8(0x05000000, 0x1F).unwrap();
    /// assert_eq!(bus.read8(0x05000000).unwrap(), 0x1F);
    /// ```
    pub fn write8(&mut self, addr: u32, value: u8) -> Result<()> {
        match self.identify_region(addr) {
            MemoryRegion::OpenBus => {
                log::warn!("Open bus write8 at 0x{:08X} (0x{:02X}) discarded", addr, value);
                Ok(())
            }
            MemoryRegion::IO => {
                log::debug!("Write8 (0x{:02X}) to IO (0x{:08X})", value, addr);
                self.ppu.write_register8(addr - Self::IO_START, value)
            }
            MemoryRegion::IME => {
                log::debug!("Write8 (0x{:02X}) to IME (stub)", value);
                self.ime = value;
                Ok(())
            }
            MemoryRegion::BIOS | MemoryRegion::ROM => {
                log::debug!("Ignoring write8 to read-only memory at 0x{:08X}", addr);
                Ok(())
            }
            MemoryRegion::Unmapped => Err(Self::unhandled(addr, 1, Access::Write)),
            region => {
                log::debug!("Write8 (0x{:02X}) to {:?} (0x{:08X})", value, region, addr);
                self.store_bytes(region, addr, &[value]);
                Ok(())
            }
        }
    }

    /// Write 16-bit value to memory
    ///
    /// The address must be 2-byte aligned.
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write16(0x06000000, 0x7FFF).unwrap();
    /// assert_eq!(bus.read16(0x06000000).unwrap(), 0x7FFF);
    /// ```
    pub fn write16(&mut self, addr: u32, value: u16) -> Result<()> {
        Self::check_alignment(addr, 2)?;

        match self.identify_region(addr) {
            MemoryRegion::OpenBus => {
                log::warn!("Open bus write16 at 0x{:08X} (0x{:04X}) discarded", addr, value);
                Ok(())
            }
            MemoryRegion::IO => {
                log::debug!("Write16 (0x{:04X}) to IO (0x{:08X})", value, addr);
                self.ppu.write_register16(addr - Self::IO_START, value)
            }
            MemoryRegion::IME => {
                log::debug!("Write16 (0x{:04X}) to IME (stub)", value);
                self.ime = value as u8;
                Ok(())
            }
            MemoryRegion::BIOS | MemoryRegion::ROM => {
                log::debug!("Ignoring write16 to read-only memory at 0x{:08X}", addr);
                Ok(())
            }
            MemoryRegion::Unmapped => Err(Self::unhandled(addr, 2, Access::Write)),
            region => {
                log::debug!("Write16 (0x{:04X}) to {:?} (0x{:08X})", value, region, addr);
                self.store_bytes(region, addr, &value.to_le_bytes());
                Ok(())
            }
        }
    }

    /// Write 32-bit value to memory
    ///
    /// The address must be 4-byte aligned.
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.write32(0x07000000, 0xDEADBEEF).unwrap();
    /// assert_eq!(bus.read32(0x07000000).unwrap(), 0xDEADBEEF);
    /// ```
    pub fn write32(&mut self, addr: u32, value: u32) -> Result<()> {
        Self::check_alignment(addr, 4)?;

        match self.identify_region(addr) {
            MemoryRegion::OpenBus => {
                log::warn!("Open bus write32 at 0x{:08X} (0x{:08X}) discarded", addr, value);
                Ok(())
            }
            MemoryRegion::IO => {
                log::debug!("Write32 (0x{:08X}) to IO (0x{:08X})", value, addr);
                self.ppu.write_register32(addr - Self::IO_START, value)
            }
            MemoryRegion::IME => {
                log::debug!("Write32 (0x{:08X}) to IME (stub)", value);
                self.ime = value as u8;
                Ok(())
            }
            MemoryRegion::BIOS | MemoryRegion::ROM => {
                log::debug!("Ignoring write32 to read-only memory at 0x{:08X}", addr);
                Ok(())
            }
            MemoryRegion::Unmapped => Err(Self::unhandled(addr, 4, Access::Write)),
            region => {
                log::debug!("Write32 (0x{:08X}) to {:?} (0x{:08X})", value, region, addr);
                self.store_bytes(region, addr, &value.to_le_bytes());
                Ok(())
            }
        }
    }

    fn check_alignment(addr: u32, size: u8) -> Result<()> {
        if addr & (size as u32 - 1) != 0 {
            return Err(EmulatorError::UnalignedAccess {
                address: addr,
                size,
            });
        }
        Ok(())
    }

    fn unhandled(addr: u32, size: u8, access: Access) -> EmulatorError {
        log::error!("Unhandled {}-byte {} at 0x{:08X}", size, access, addr);
        EmulatorError::UnhandledAddress {
            address: addr,
            size,
            access,
        }
    }

    /// Mirror an address into a power-of-two sized buffer
    #[inline(always)]
    fn mirror(addr: u32, size: usize) -> usize {
        debug_assert!(size.is_power_of_two());
        addr as usize & (size - 1)
    }

    /// Offset into VRAM for an address inside the VRAM window
    #[inline(always)]
    fn vram_offset(addr: u32) -> usize {
        let offset = Self::mirror(addr, Self::VRAM_MIRROR_SIZE);
        if offset >= PPU::VRAM_SIZE {
            offset - Self::VRAM_FOLD
        } else {
            offset
        }
    }

    /// Backing buffer and in-buffer offset for a memory-backed region
    fn locate(&self, region: MemoryRegion, addr: u32) -> Option<(&[u8], usize)> {
        match region {
            MemoryRegion::BIOS => Some((&self.bios[..], Self::mirror(addr, Self::BIOS_SIZE))),
            MemoryRegion::EWRAM => Some((&self.ewram[..], Self::mirror(addr, Self::EWRAM_SIZE))),
            MemoryRegion::IWRAM => Some((&self.iwram[..], Self::mirror(addr, Self::IWRAM_SIZE))),
            MemoryRegion::PRAM => Some((self.ppu.pram(), Self::mirror(addr, PPU::PRAM_SIZE))),
            MemoryRegion::VRAM => Some((self.ppu.vram(), Self::vram_offset(addr))),
            MemoryRegion::OAM => Some((self.ppu.oam(), Self::mirror(addr, PPU::OAM_SIZE))),
            MemoryRegion::ROM if !self.rom.is_empty() => {
                Some((&self.rom[..], Self::mirror(addr, self.rom.len())))
            }
            _ => None,
        }
    }

    fn load_byte(&self, region: MemoryRegion, addr: u32) -> u8 {
        self.locate(region, addr)
            .map_or(0xFF, |(buffer, offset)| buffer[offset])
    }

    /// Load `N` consecutive bytes, low address first
    ///
    /// Each byte is mirrored on its own, so a wide access into a buffer
    /// smaller than the access still stays in bounds.
    fn load_bytes<const N: usize>(&self, region: MemoryRegion, addr: u32) -> [u8; N] {
        std::array::from_fn(|i| self.load_byte(region, addr.wrapping_add(i as u32)))
    }

    fn store_bytes(&mut self, region: MemoryRegion, addr: u32, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            let addr = addr.wrapping_add(i as u32);
            let (buffer, offset) = match region {
                MemoryRegion::EWRAM => (&mut self.ewram[..], Self::mirror(addr, Self::EWRAM_SIZE)),
                MemoryRegion::IWRAM => (&mut self.iwram[..], Self::mirror(addr, Self::IWRAM_SIZE)),
                MemoryRegion::PRAM => (self.ppu.pram_mut(), Self::mirror(addr, PPU::PRAM_SIZE)),
                MemoryRegion::VRAM => (self.ppu.vram_mut(), Self::vram_offset(addr)),
                MemoryRegion::OAM => (self.ppu.oam_mut(), Self::mirror(addr, PPU::OAM_SIZE)),
                _ => return,
            };
            buffer[offset] = byte;
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
