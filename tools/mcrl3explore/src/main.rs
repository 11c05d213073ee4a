use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;

use mcrl3explore::run;
use mcrl3explore::Cli;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static ALLOC: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> Result<ExitCode, anyhow::Error> {
    env_logger::init();

    let cli = Cli::parse();
    run(&cli, Arc::new(AtomicBool::new(false)))
}
