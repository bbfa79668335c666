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

//! Cartridge ROM loading
//!
//! The memory bus mirrors the cartridge by masking addresses with
//! `size - 1`, so every ROM image is stored in a buffer whose length is the
//! smallest power of two that holds the file. The tail between the end of
//! the file and the rounded size is zero-filled.
//!
//! # Example
//!
//! ```
//! use gbarx::core::loader::pad_rom;
//!
//! let rom = pad_rom(vec![0xAA; 5]);
//! assert_eq!(rom.len(), 8);
//! assert_eq!(&rom[5..], &[0, 0, 0]);
//! ```

use super::error::{EmulatorError, Result};
use std::fs::File;
use std::io::Read;

/// Load a cartridge ROM image from disk
///
/// # Arguments
///
/// * `path` - Path to the ROM file
///
/// # Returns
///
/// The ROM contents, zero-padded to the next power of two
///
/// # Errors
///
/// - `EmulatorError::RomNotFound` if the file cannot be opened
/// - `EmulatorError::RomTruncated` if fewer bytes than the file's reported
///   length could be read
///
/// # Example
///
/// ```no_run
/// use gbarx::core::loader::load_rom;
///
/// let rom = load_rom("game.gba").unwrap();
/// assert!(rom.len().is_power_of_two());
/// ```
pub fn load_rom(path: &str) -> Result<Vec<u8>> {
    log::debug!("Loading ROM: {}", path);

    let file = File::open(path).map_err(|_| EmulatorError::RomNotFound(path.to_string()))?;
    let expected = file.metadata()?.len() as usize;

    let mut data = Vec::with_capacity(expected.next_power_of_two());
    file.take(expected as u64).read_to_end(&mut data)?;

    if data.len() != expected {
        return Err(EmulatorError::RomTruncated {
            expected,
            got: data.len(),
        });
    }

    let rom = pad_rom(data);
    log::info!("ROM size: {} bytes (rounded to {})", expected, rom.len());
    Ok(rom)
}

/// Zero-pad a ROM image up to the next power of two
///
/// An empty image becomes a single zero byte, so the result is never empty.
pub fn pad_rom(mut data: Vec<u8>) -> Vec<u8> {
    let rounded = data.len().next_power_of_two();
    data.resize(rounded, 0);
    data
}
