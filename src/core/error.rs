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

/// Emulator error types
use std::fmt;
use thiserror::Error;

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Direction of a bus access, carried by [`EmulatorError::UnhandledAddress`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => f.write_str("read"),
            Access::Write => f.write_str("write"),
        }
    }
}

/// Main error type for the emulator
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("ROM file not found: {0}")]
    RomNotFound(String),

    #[error("ROM file truncated: read {got} of {expected} bytes")]
    RomTruncated { expected: usize, got: usize },

    #[error("BIOS file not found: {0}")]
    BiosNotFound(String),

    #[error("Invalid BIOS size: {got} bytes (at most {max})")]
    InvalidBiosSize { max: usize, got: usize },

    #[error("Unhandled {size}-byte {access} at 0x{address:08X}")]
    UnhandledAddress {
        address: u32,
        size: u8,
        access: Access,
    },

    #[error("Unaligned memory access: {size}-byte access at 0x{address:08X}")]
    UnalignedAccess { address: u32, size: u8 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
