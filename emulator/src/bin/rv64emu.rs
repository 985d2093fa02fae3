use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use rv64_core::rv64i_table;
use rv64emu::{load_image, Emu, EmuOptions, RunOutcome, DEFAULT_BASE, DEFAULT_REGION_SIZE};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Runs a flat RV64I binary image and dumps the final register state.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the flat binary program image
    program: PathBuf,

    /// Base address the image is mapped at (also the entry pc)
    #[clap(long, default_value_t = DEFAULT_BASE)]
    base: u64,

    /// Total region size; the stack pointer starts at base + region-size
    #[clap(long, default_value_t = DEFAULT_REGION_SIZE)]
    region_size: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let options = EmuOptions { base_address: cli.base, region_size: cli.region_size };

    let image = load_image(&cli.program, options.base_address)?;
    info!(
        program = %cli.program.display(),
        base = format_args!("{:#x}", options.base_address),
        loaded = image.loaded_len(),
        "image loaded"
    );

    let dispatch = rv64i_table();
    let mut emu = Emu::new(&dispatch, image, &options);
    let outcome = emu.run();

    println!("{}", emu.registers());

    match outcome {
        RunOutcome::Halted => Ok(()),
        RunOutcome::Faulted(info) => {
            bail!(
                "faulted at pc {:#x} (instruction {:#010x}): {}",
                info.pc,
                info.raw,
                info.cause
            )
        }
    }
}
