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

//! System integration module
//!
//! This module ties the CPU and the memory bus (with its PPU register block)
//! together and provides the main emulation loop.

use super::config::Config;
use super::cpu::{Mode, Psr, StepOutcome, CPU};
use super::error::Result;
use super::memory::Bus;

#[cfg(test)]
mod tests;

/// Game Boy Advance system
///
/// Owns every piece of machine state; there are no globals.
///
/// # Example
/// ```
/// use gbarx::core::system::System;
///
/// let mut system = System::new();
/// system.load_rom_bytes(&[0xFE, 0xE7]); // Thumb: B .
/// system.skip_bios();
/// system.cpu_mut().regs_mut().set_thumb(true);
/// system.run(10).unwrap();
/// assert_eq!(system.pc(), 0x0800_0000);
/// assert_eq!(system.steps(), 10);
/// ```
pub struct System {
    /// CPU instance
    cpu: CPU,

    /// Memory bus
    bus: Bus,

    /// Instructions fetched since reset (executed or skipped)
    steps: u64,
}

impl System {
    /// Cartridge entry point used when the boot ROM is skipped
    pub const ROM_ENTRY: u32 = 0x0800_0000;

    /// System/User stack pointer left by the boot ROM
    pub const SP_SYSTEM: u32 = 0x0300_7F00;

    /// IRQ stack pointer left by the boot ROM
    pub const SP_IRQ: u32 = 0x0300_7FA0;

    /// Supervisor stack pointer left by the boot ROM
    pub const SP_SUPERVISOR: u32 = 0x0300_7FE0;

    /// Create a new System instance in the power-on state
    ///
    /// No boot ROM or cartridge is loaded.
    pub fn new() -> Self {
        Self {
            cpu: CPU::new(),
            bus: Bus::new(),
            steps: 0,
        }
    }

    /// Create a System from a configuration
    ///
    /// Loads the configured boot ROM and cartridge and, if `skip_bios` is
    /// set, prepares the registers for a direct cartridge boot.
    ///
    /// # Errors
    ///
    /// Returns the loader error of the first image that fails to load.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut system = Self::new();

        if let Some(bios) = &config.bios {
            system.load_bios(bios)?;
        }
        if let Some(rom) = &config.rom {
            system.load_rom(rom)?;
        }
        if config.skip_bios {
            system.skip_bios();
        }

        Ok(system)
    }

    /// Load a boot ROM image from a file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gbarx::core::system::System;
    ///
    /// let mut system = System::new();
    /// system.load_bios("gba_bios.bin").unwrap();
    /// ```
    pub fn load_bios(&mut self, path: &str) -> Result<()> {
        self.bus.load_bios(path)
    }

    /// Load a cartridge ROM image from a file
    pub fn load_rom(&mut self, path: &str) -> Result<()> {
        self.bus.load_rom(path)
    }

    /// Install a cartridge ROM image from memory
    pub fn load_rom_bytes(&mut self, data: &[u8]) {
        self.bus.load_rom_bytes(data);
    }

    /// Reset the system to its power-on state
    ///
    /// Clears work RAM, video memory and registers but keeps the loaded
    /// boot ROM and cartridge.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.reset();
        self.steps = 0;
    }

    /// Prepare the registers the way the boot ROM leaves them
    ///
    /// Sets up the IRQ, Supervisor and System stack pointers, enters System
    /// mode in ARM state and jumps to the cartridge entry point.
    pub fn skip_bios(&mut self) {
        let regs = self.cpu.regs_mut();

        regs.switch_mode(Mode::Irq);
        regs.set_reg(13, Self::SP_IRQ);
        regs.switch_mode(Mode::Supervisor);
        regs.set_reg(13, Self::SP_SUPERVISOR);
        regs.switch_mode(Mode::System);
        regs.set_reg(13, Self::SP_SYSTEM);

        regs.set_cpsr(Psr::from_bits_retain(Mode::System as u32));
        regs.set_pc(Self::ROM_ENTRY);

        log::info!("Skipping boot ROM, starting at 0x{:08X}", Self::ROM_ENTRY);
    }

    /// Execute one CPU instruction
    ///
    /// # Returns
    /// Whether the instruction executed or was skipped by its condition
    ///
    /// # Errors
    /// Returns error if a bus access fails
    pub fn step(&mut self) -> Result<StepOutcome> {
        let outcome = self.cpu.step(&mut self.bus)?;
        self.steps += 1;
        Ok(outcome)
    }

    /// Execute `n` instructions
    ///
    /// Stops at the first error.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gbarx::core::system::System;
    ///
    /// let mut system = System::new();
    /// system.run(100).unwrap(); // Execute 100 instructions
    /// ```
    pub fn run(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    /// Get current PC value
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::system::System;
    ///
    /// let system = System::new();
    /// assert_eq!(system.pc(), 0x0000_0000);
    /// ```
    pub fn pc(&self) -> u32 {
        self.cpu.regs().pc()
    }

    /// Get the number of instructions stepped since reset
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn cpu(&self) -> &CPU {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut CPU {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}
