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

//! Memory region identification
//!
//! The Game Boy Advance address space is a fixed sequence of disjoint windows.
//! The windows are kept in a single ordered table shared by the read and write
//! paths, and looked up with a binary search.

use super::Bus;

/// Memory region identification
///
/// Used to identify which memory region an address belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRegion {
    /// Boot ROM (16KB, read-only)
    BIOS,
    /// Unused gap after the boot ROM; reads return all ones
    OpenBus,
    /// External work RAM (256KB)
    EWRAM,
    /// Internal work RAM (32KB)
    IWRAM,
    /// PPU I/O registers
    IO,
    /// Interrupt master enable byte
    IME,
    /// Palette RAM (1KB)
    PRAM,
    /// Video RAM (96KB)
    VRAM,
    /// Object attribute memory (1KB)
    OAM,
    /// Cartridge ROM
    ROM,
    /// Unmapped region
    Unmapped,
}

/// One inclusive window of the address map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    pub start: u32,
    pub end: u32,
    pub region: MemoryRegion,
}

impl AddressRange {
    const fn new(start: u32, end: u32, region: MemoryRegion) -> Self {
        Self { start, end, region }
    }

    /// Check if this window contains the given address
    #[inline]
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && addr <= self.end
    }
}

/// The address map, sorted by start address with no overlaps
pub const ADDRESS_MAP: [AddressRange; 10] = [
    AddressRange::new(Bus::BIOS_START, Bus::BIOS_END, MemoryRegion::BIOS),
    AddressRange::new(Bus::OPEN_BUS_START, Bus::OPEN_BUS_END, MemoryRegion::OpenBus),
    AddressRange::new(Bus::EWRAM_START, Bus::EWRAM_END, MemoryRegion::EWRAM),
    AddressRange::new(Bus::IWRAM_START, Bus::IWRAM_END, MemoryRegion::IWRAM),
    AddressRange::new(Bus::IO_START, Bus::IO_END, MemoryRegion::IO),
    AddressRange::new(Bus::IME_ADDR, Bus::IME_ADDR, MemoryRegion::IME),
    AddressRange::new(Bus::PRAM_START, Bus::PRAM_END, MemoryRegion::PRAM),
    AddressRange::new(Bus::VRAM_START, Bus::VRAM_END, MemoryRegion::VRAM),
    AddressRange::new(Bus::OAM_START, Bus::OAM_END, MemoryRegion::OAM),
    AddressRange::new(Bus::ROM_START, Bus::ROM_END, MemoryRegion::ROM),
];

/// Resolve an address against [`ADDRESS_MAP`]
///
/// Returns [`MemoryRegion::Unmapped`] for addresses that fall between or
/// after the declared windows.
pub fn lookup(addr: u32) -> MemoryRegion {
    let index = ADDRESS_MAP.partition_point(|range| range.end < addr);
    match ADDRESS_MAP.get(index) {
        Some(range) if range.contains(addr) => range.region,
        _ => MemoryRegion::Unmapped,
    }
}

impl Bus {
    /// Identify memory region for an address
    ///
    /// # Arguments
    ///
    /// * `addr` - Physical address
    ///
    /// # Returns
    ///
    /// The memory region that contains this address
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::memory::{Bus, MemoryRegion};
    ///
    /// let bus = Bus::new();
    ///
    /// assert_eq!(bus.identify_region(0x00000000), MemoryRegion::BIOS);
    /// assert_eq!(bus.identify_region(0x00004000), MemoryRegion::OpenBus);
    /// assert_eq!(bus.identify_region(0x02000000), MemoryRegion::EWRAM);
    /// assert_eq!(bus.identify_region(0x04000208), MemoryRegion::IME);
    /// assert_eq!(bus.identify_region(0x08000000), MemoryRegion::ROM);
    /// assert_eq!(bus.identify_region(0x0E000000), MemoryRegion::Unmapped);
    /// ```
    pub fn identify_region(&self, addr: u32) -> MemoryRegion {
        lookup(addr)
    }
}
