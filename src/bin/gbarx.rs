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

use clap::Parser;
use log::{error, info};
use gbarx::core::config::Config;
use gbarx::core::error::{EmulatorError, Result};
use gbarx::core::system::System;

/// Game Boy Advance (ARM7TDMI) emulator core
#[derive(Parser)]
#[command(name = "gbarx")]
#[command(about = "Game Boy Advance CPU and memory bus emulator", long_about = None)]
struct Args {
    /// Path to cartridge ROM image (.gba)
    rom: Option<String>,

    /// Path to boot ROM image (gba_bios.bin)
    #[arg(short = 'b', long)]
    bios: Option<String>,

    /// Path to TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Number of instructions to execute
    #[arg(short = 'n', long)]
    instructions: Option<usize>,

    /// Start at the cartridge entry point instead of the boot ROM
    #[arg(long)]
    skip_bios: bool,
}

/// Merge the configuration file, environment and command line
fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    config.apply_env();

    if let Some(rom) = &args.rom {
        config.rom = Some(rom.clone());
    }
    if let Some(bios) = &args.bios {
        config.bios = Some(bios.clone());
    }
    if let Some(instructions) = args.instructions {
        config.instructions = instructions;
    }
    if args.skip_bios {
        config.skip_bios = true;
    }

    Ok(config)
}

fn main() -> Result<()> {
    // Load .env file if present (for development configuration)
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Parse command line arguments
    let args = Args::parse();
    let config = resolve_config(&args);

    // Initialize logger; RUST_LOG wins over the configured level
    let default_level = config
        .as_ref()
        .ok()
        .and_then(|c| c.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    info!("gbarx v{}", env!("CARGO_PKG_VERSION"));

    let config = config.inspect_err(|e| error!("Invalid configuration: {}", e))?;

    if config.rom.is_none() && config.bios.is_none() {
        let e = EmulatorError::Config("no ROM or BIOS given".to_string());
        error!("{}", e);
        return Err(e);
    }

    if let Some(bios) = &config.bios {
        info!("Loading BIOS from: {}", bios);
    }
    if let Some(rom) = &config.rom {
        info!("Loading ROM from: {}", rom);
    }

    // Create the machine and load images
    let mut system = System::from_config(&config).inspect_err(|e| error!("Failed to load: {}", e))?;

    if config.bios.is_none() && !config.skip_bios {
        info!("No BIOS given, booting the cartridge directly");
        system.skip_bios();
    }

    info!("Starting emulation at PC=0x{:08X}...", system.pc());

    // Run for specified number of instructions
    let total_instructions = config.instructions;
    let log_interval = (total_instructions / 10).max(1); // Log ~10 times during execution

    for i in 0..total_instructions {
        // Log progress periodically
        if i % log_interval == 0 && i > 0 {
            info!(
                "Progress: {}/{} instructions | PC: 0x{:08X}",
                i,
                total_instructions,
                system.pc()
            );
        }

        // Execute one instruction
        if let Err(e) = system.step() {
            error!("Error at PC=0x{:08X}: {}", system.pc(), e);
            error!("Instruction count: {}", i);
            system.cpu().dump_registers();
            return Err(e);
        }
    }

    // Final status
    info!("Emulation completed successfully!");
    info!("Total instructions: {}", system.steps());
    info!("Final PC: 0x{:08X}", system.pc());
    system.cpu().dump_registers();

    Ok(())
}
