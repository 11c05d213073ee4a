use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::process::ExitCode;

use anyhow::anyhow;
use clap::Parser;
use clap::ValueEnum;
use log::info;

use mcrl2::typecheck::TypeCheckOptions;
use mcrl2rust_io::io_lps::write_lps;
use mcrl2rust_process::linearize;
use mcrl2rust_process::parse_process_specification;
use mcrl2rust_process::LinearizeOptions;
use mcrl2rust_sabre::RewriteStrategy;
use mcrl2rust_utilities::Timing;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static ALLOC: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Rewriter {
    Jitty,
    JittyCompiling,
}

#[derive(clap::Parser, Debug)]
#[command(name = "mcrl3linearize", about = "Translates a process specification into a linear process")]
struct Cli {
    filename: String,

    output: String,

    /// Replaces parameters of a structured sort with a single constructor by its fields.
    #[arg(short, long)]
    expand_structured_sorts: bool,

    /// Substitutes processes that are used at most this number of times.
    #[arg(short, long, default_value_t = 1)]
    max_usage: usize,

    #[arg(long, value_enum, default_value_t = Rewriter::Jitty)]
    rewriter: Rewriter,

    #[arg(long)]
    timings: bool,
}

fn main() -> Result<ExitCode, anyhow::Error> {
    env_logger::init();

    let cli = Cli::parse();
    let mut timing = Timing::new();

    let mut parse_time = timing.start("parse");
    let text = fs::read_to_string(&cli.filename)?;
    let spec = parse_process_specification(&text, &TypeCheckOptions::default())?;
    parse_time.finish();

    let mut linearize_time = timing.start("linearize");
    let options = LinearizeOptions {
        expand_structured_sorts: cli.expand_structured_sorts,
        max_usage: cli.max_usage,
        rewrite_strategy: match cli.rewriter {
            Rewriter::Jitty => RewriteStrategy::Jitty,
            Rewriter::JittyCompiling => RewriteStrategy::JittyCompiling,
        },
    };
    let lps = linearize(&spec, &options)?;
    linearize_time.finish();

    info!(
        "The linear process has {} parameters and {} summands",
        lps.parameters.len(),
        lps.summands.len()
    );

    let mut write_time = timing.start("write");
    let mut writer = BufWriter::new(File::create(&cli.output)?);
    write_lps(&mut writer, &lps).map_err(|error| anyhow!("Cannot write {}: {error}", cli.output))?;
    writer.flush()?;
    write_time.finish();

    if cli.timings {
        timing.print();
    }

    Ok(ExitCode::SUCCESS)
}
