// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Memory Bus Tests
//!
//! - `basic`: Region identification, reset and image loading
//! - `bus`: Read/write operations with various data sizes
//! - `regions`: Mirroring, open bus, read-only and device windows
//! - `helpers`: Common test utilities

use super::*;

mod helpers;
