use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

/// Largest boot ROM image the emulator accepts
const BIOS_MAX_SIZE: u64 = 16 * 1024;

/// Library modules that can be tested on their own
const MODULES: [(&str, &str); 4] = [
    ("cpu", "core::cpu"),
    ("memory", "core::memory"),
    ("system", "core::system"),
    ("config", "core::config"),
];

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for gbarx")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build, test)
    Ci {
        #[arg(long)]
        verbose: bool,
    },
    /// Quick checks before commit (fmt, clippy)
    Check {
        #[arg(long)]
        verbose: bool,
    },
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Build the project
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        /// Run doc tests only
        #[arg(long)]
        doc: bool,
        /// Run ignored tests (boot ROM tests)
        #[arg(long)]
        ignored: bool,
        /// Run the property tests only
        #[arg(long)]
        props: bool,
        /// Restrict to library modules (cpu, memory, system, config)
        #[arg(long = "module", short = 'm')]
        modules: Vec<String>,
    },
    /// Run benchmarks
    Bench {
        /// Only run benchmarks whose name contains this filter
        filter: Option<String>,
    },
    /// Run a cartridge ROM directly, skipping the boot ROM
    Run {
        /// Path to cartridge ROM
        rom: String,
        /// Number of instructions to execute
        #[arg(short = 'n', long, default_value = "100000")]
        instructions: u64,
        #[arg(long)]
        release: bool,
    },
    /// Run the emulator on a boot ROM
    BiosBoot {
        /// Path to boot ROM file
        #[arg(default_value = "gba_bios.bin")]
        bios_path: String,
        /// Number of instructions to execute
        #[arg(short = 'n', long, default_value = "100000")]
        instructions: u64,
        #[arg(long)]
        release: bool,
    },
    /// Pre-commit hook (fmt, clippy, test)
    PreCommit,
    /// Install git hooks
    InstallHooks,
}

/// A named step of a check pipeline
type Task = (&'static str, fn() -> Result<()>);

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { verbose } => run_pipeline(
            "CI Pipeline",
            &[
                ("Format Check", fmt_check),
                ("Clippy", clippy_deny_warnings),
                ("Build", build_debug),
                ("Test", run_all_tests),
            ],
            verbose,
        ),
        Commands::Check { verbose } => run_pipeline(
            "Quick Checks",
            &[
                ("Format Check", fmt_check),
                ("Clippy", clippy_deny_warnings),
            ],
            verbose,
        ),
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy { fix } => run_clippy(fix),
        Commands::Build { release } => run_build(release),
        Commands::Test {
            doc,
            ignored,
            props,
            modules,
        } => run_test(doc, ignored, props, &modules),
        Commands::Bench { filter } => run_bench(filter.as_deref()),
        Commands::Run {
            rom,
            instructions,
            release,
        } => run_emulator(
            "Cartridge Run",
            &[rom.as_str(), "--skip-bios"],
            instructions,
            release,
        ),
        Commands::BiosBoot {
            bios_path,
            instructions,
            release,
        } => {
            check_bios_file(&bios_path)?;
            run_emulator(
                "Boot ROM Run",
                &["--bios", bios_path.as_str()],
                instructions,
                release,
            )
        }
        Commands::PreCommit => run_pipeline(
            "Pre-commit Checks",
            &[
                ("Format Check", fmt_check),
                ("Clippy", clippy_deny_warnings),
                ("Test", run_all_tests),
            ],
            false,
        ),
        Commands::InstallHooks => install_hooks(),
    }
}

fn run_pipeline(title: &str, tasks: &[Task], verbose: bool) -> Result<()> {
    println!("{}", format!("=== {} ===", title).bold().blue());

    let start = Instant::now();
    for (name, task) in tasks {
        run_task(name, *task, verbose)?;
    }

    println!(
        "\n{} {}",
        format!("✓ {} passed in", title).green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );
    Ok(())
}

fn run_task(name: &str, task: fn() -> Result<()>, verbose: bool) -> Result<()> {
    print!("{} {} ... ", "→".blue(), name);

    let start = Instant::now();
    match task() {
        Ok(()) => {
            let timing = if verbose {
                format!("({:.2}s)", start.elapsed().as_secs_f64())
            } else {
                String::new()
            };
            println!("{} {}", "✓".green().bold(), timing);
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗".red().bold());
            Err(e)
        }
    }
}

fn cargo<I, S>(args: I) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let mut cmd = Command::new("cargo");
    cmd.args(args);
    cmd
}

fn run_fmt(check: bool) -> Result<()> {
    let mut cmd = cargo(["fmt", "--all"]);
    if check {
        cmd.args(["--", "--check"]);
    }
    execute_command(&mut cmd)
}

fn run_clippy(fix: bool) -> Result<()> {
    let mut cmd = cargo(["clippy", "--all-targets", "--all-features"]);
    if fix {
        cmd.arg("--fix");
    } else {
        cmd.args(["--", "-D", "warnings"]);
    }
    execute_command(&mut cmd)
}

fn run_build(release: bool) -> Result<()> {
    let mut cmd = cargo(["build"]);
    if release {
        cmd.arg("--release");
    }
    execute_command(&mut cmd)
}

fn fmt_check() -> Result<()> {
    run_fmt(true)
}

fn clippy_deny_warnings() -> Result<()> {
    run_clippy(false)
}

fn build_debug() -> Result<()> {
    run_build(false)
}

fn run_all_tests() -> Result<()> {
    run_test(false, false, false, &[])
}

fn run_test(doc: bool, ignored: bool, props: bool, modules: &[String]) -> Result<()> {
    let mut cmd = cargo(["test", "--all-features"]);

    if doc {
        cmd.arg("--doc");
    } else if props {
        cmd.args(["--test", "properties"]);
    } else if !modules.is_empty() {
        return run_module_tests(modules, ignored);
    }

    if ignored {
        cmd.args(["--", "--ignored"]);
    }
    execute_command(&mut cmd)
}

fn run_module_tests(modules: &[String], ignored: bool) -> Result<()> {
    let mut failed = Vec::new();

    for name in modules {
        let Some((_, path)) = MODULES.iter().find(|(key, _)| *key == name.as_str()) else {
            let known: Vec<_> = MODULES.iter().map(|(key, _)| *key).collect();
            bail!("Unknown module '{}' (expected one of: {})", name, known.join(", "));
        };

        println!("{} Running {} tests...", "→".blue(), name.bold());

        let mut cmd = cargo(["test", "--all-features", "--lib", *path]);
        if ignored {
            cmd.args(["--", "--ignored"]);
        }

        if execute_command(&mut cmd).is_ok() {
            println!("{} {} tests passed\n", "✓".green(), name);
        } else {
            println!("{} {} tests failed\n", "✗".red(), name);
            failed.push(name.as_str());
        }
    }

    if !failed.is_empty() {
        bail!("Module tests failed: {}", failed.join(", "));
    }
    Ok(())
}

fn run_bench(filter: Option<&str>) -> Result<()> {
    let mut cmd = cargo(["bench"]);
    if let Some(filter) = filter {
        cmd.args(["--", filter]);
    }
    execute_command(&mut cmd)
}

fn check_bios_file(bios_path: &str) -> Result<()> {
    let path = Path::new(bios_path);
    if !path.exists() {
        println!(
            "{} Boot ROM file not found: {}",
            "✗".red().bold(),
            bios_path.yellow()
        );
        println!(
            "\n{} Place a boot ROM image (e.g., gba_bios.bin) in the project root.",
            "ℹ".blue()
        );
        bail!("Boot ROM file not found");
    }

    let size = std::fs::metadata(path)?.len();
    if size > BIOS_MAX_SIZE {
        println!(
            "{} Invalid boot ROM size: {} bytes (at most {} bytes)",
            "✗".red().bold(),
            size,
            BIOS_MAX_SIZE
        );
        bail!("Invalid boot ROM file size");
    }

    println!("{} Boot ROM: {}", "✓".green(), bios_path.cyan());
    Ok(())
}

fn run_emulator(title: &str, image_args: &[&str], instructions: u64, release: bool) -> Result<()> {
    println!("{}", format!("=== {} ===", title).bold().blue());
    println!(
        "{} Instructions: {}",
        "→".blue(),
        instructions.to_string().bold()
    );
    println!(
        "{} Build mode: {}\n",
        "→".blue(),
        if release {
            "release".green().bold()
        } else {
            "debug".yellow().bold()
        }
    );

    let start = Instant::now();

    let mut cmd = cargo(["run", "--bin", "gbarx"]);
    if release {
        cmd.arg("--release");
    }
    cmd.arg("--")
        .args(image_args)
        .args(["-n", &instructions.to_string()]);

    if let Err(e) = execute_command(&mut cmd) {
        println!("\n{} {} failed", "✗".red().bold(), title);
        return Err(e);
    }

    println!(
        "\n{} {} completed in {}",
        "✓".green().bold(),
        title,
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );
    Ok(())
}

fn install_hooks() -> Result<()> {
    println!("{}", "Installing git hooks...".bold());

    let hook_content = r#"#!/bin/sh
# Auto-generated by cargo x install-hooks
set -e

echo "Running pre-commit checks..."
cargo x pre-commit
"#;

    let hook_path = ".git/hooks/pre-commit";
    std::fs::write(hook_path, hook_content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = std::fs::metadata(hook_path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(hook_path, perms)?;
    }

    println!("{}", "✓ Git hooks installed".green());
    println!("  Pre-commit hook will run: fmt, clippy, test");
    Ok(())
}

fn execute_command(cmd: &mut Command) -> Result<()> {
    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        bail!("Command failed with exit code: {}", status);
    }
    Ok(())
}
