// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! I/O Device Trait
//!
//! This module defines the register interface the memory bus uses to reach
//! memory-mapped peripherals. The bus only knows a device's address window;
//! everything inside the window is passed through verbatim.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Memory Bus                     │
//! ├─────────────────────────────────────────────┤
//! │  read16(addr) {                             │
//! │    if IO window contains addr {             │
//! │      return ppu.read_register16(offset)     │
//! │    }                                        │
//! │  }                                          │
//! └─────────────────────────────────────────────┘
//!                     ▲
//!                     │
//!              ┌──────┴──────┐
//!              │    PPU      │
//!              │ (IoDevice)  │
//!              └─────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use gbarx::core::memory::IoDevice;
//! use gbarx::core::error::Result;
//!
//! struct Latch {
//!     base_addr: u32,
//!     bytes: [u8; 4],
//! }
//!
//! impl IoDevice for Latch {
//!     fn address_range(&self) -> (u32, u32) {
//!         (self.base_addr, self.base_addr + 3)
//!     }
//!
//!     fn read_register8(&self, offset: u32) -> Result<u8> {
//!         Ok(self.bytes[(offset & 3) as usize])
//!     }
//!
//!     fn write_register8(&mut self, offset: u32, value: u8) -> Result<()> {
//!         self.bytes[(offset & 3) as usize] = value;
//!         Ok(())
//!     }
//! }
//!
//! let mut latch = Latch { base_addr: 0x0400_0000, bytes: [0; 4] };
//! latch.write_register32(0, 0x1234_5678).unwrap();
//! assert_eq!(latch.read_register8(0).unwrap(), 0x78);
//! ```

use crate::core::error::Result;

/// Trait for memory-mapped I/O devices
///
/// Each device declares its address window and implements byte-wide
/// register access. Offsets passed to the device are relative to the start
/// of the window.
///
/// # Register Access
///
/// Devices must implement the 8-bit methods; the 16-bit and 32-bit methods
/// default to little-endian composition of consecutive byte accesses, low
/// byte first. Devices with side effects on wide writes can override them.
pub trait IoDevice {
    /// Get the address range this device responds to
    ///
    /// Returns a tuple of (start_address, end_address) inclusive.
    fn address_range(&self) -> (u32, u32);

    /// Check if this device contains the given address
    fn contains(&self, addr: u32) -> bool {
        let (start, end) = self.address_range();
        addr >= start && addr <= end
    }

    /// Read an 8-bit value from a device register
    fn read_register8(&self, offset: u32) -> Result<u8>;

    /// Write an 8-bit value to a device register
    fn write_register8(&mut self, offset: u32, value: u8) -> Result<()>;

    /// Read a 16-bit value from a device register
    ///
    /// Default implementation composes two byte reads, low byte first.
    fn read_register16(&self, offset: u32) -> Result<u16> {
        let lo = self.read_register8(offset)?;
        let hi = self.read_register8(offset + 1)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Write a 16-bit value to a device register
    ///
    /// Default implementation splits the value into two byte writes, low
    /// byte first.
    fn write_register16(&mut self, offset: u32, value: u16) -> Result<()> {
        let [lo, hi] = value.to_le_bytes();
        self.write_register8(offset, lo)?;
        self.write_register8(offset + 1, hi)
    }

    /// Read a 32-bit value from a device register
    ///
    /// Default implementation composes two halfword reads, low half first.
    fn read_register32(&self, offset: u32) -> Result<u32> {
        let lo = self.read_register16(offset)? as u32;
        let hi = self.read_register16(offset + 2)? as u32;
        Ok(lo | (hi << 16))
    }

    /// Write a 32-bit value to a device register
    ///
    /// Default implementation splits the value into two halfword writes,
    /// low half first.
    fn write_register32(&mut self, offset: u32, value: u32) -> Result<()> {
        self.write_register16(offset, value as u16)?;
        self.write_register16(offset + 2, (value >> 16) as u16)
    }

    /// Optional: Device name for debugging
    fn name(&self) -> &str {
        "Unknown Device"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{Access, EmulatorError};

    /// Mock device backed by a flat byte array
    struct MockDevice {
        base: u32,
        bytes: Vec<u8>,
    }

    impl MockDevice {
        fn new(base: u32, size: usize) -> Self {
            Self {
                base,
                bytes: vec![0; size],
            }
        }
    }

    impl IoDevice for MockDevice {
        fn address_range(&self) -> (u32, u32) {
            (self.base, self.base + self.bytes.len() as u32 - 1)
        }

        fn read_register8(&self, offset: u32) -> Result<u8> {
            self.bytes
                .get(offset as usize)
                .copied()
                .ok_or(EmulatorError::UnhandledAddress {
                    address: self.base + offset,
                    size: 1,
                    access: Access::Read,
                })
        }

        fn write_register8(&mut self, offset: u32, value: u8) -> Result<()> {
            match self.bytes.get_mut(offset as usize) {
                Some(byte) => {
                    *byte = value;
                    Ok(())
                }
                None => Err(EmulatorError::UnhandledAddress {
                    address: self.base + offset,
                    size: 1,
                    access: Access::Write,
                }),
            }
        }

        fn name(&self) -> &str {
            "MockDevice"
        }
    }

    #[test]
    fn test_address_range() {
        let device = MockDevice::new(0x04000000, 16);
        assert_eq!(device.address_range(), (0x04000000, 0x0400000F));
    }

    #[test]
    fn test_contains() {
        let device = MockDevice::new(0x04000000, 16);

        assert!(device.contains(0x04000000));
        assert!(device.contains(0x04000008));
        assert!(device.contains(0x0400000F));

        assert!(!device.contains(0x03FFFFFF));
        assert!(!device.contains(0x04000010));
    }

    #[test]
    fn test_wide_writes_are_little_endian() {
        let mut device = MockDevice::new(0x04000000, 16);

        device.write_register32(0x04, 0x12345678).unwrap();
        assert_eq!(device.bytes[4..8], [0x78, 0x56, 0x34, 0x12]);

        device.write_register16(0x00, 0xBEEF).unwrap();
        assert_eq!(device.bytes[0..2], [0xEF, 0xBE]);
    }

    #[test]
    fn test_wide_reads_compose_bytes() {
        let mut device = MockDevice::new(0x04000000, 16);
        device.bytes[8..12].copy_from_slice(&[0x01, 0x02, 0x03, 0x04]);

        assert_eq!(device.read_register32(0x08).unwrap(), 0x04030201);
        assert_eq!(device.read_register16(0x0A).unwrap(), 0x0403);
        assert_eq!(device.read_register8(0x09).unwrap(), 0x02);
    }

    #[test]
    fn test_out_of_range() {
        let mut device = MockDevice::new(0x04000000, 4);

        assert!(device.read_register8(0x04).is_err());
        assert!(device.write_register16(0x03, 0).is_err());
    }

    #[test]
    fn test_device_name() {
        let device = MockDevice::new(0x04000000, 4);
        assert_eq!(device.name(), "MockDevice");
    }
}
