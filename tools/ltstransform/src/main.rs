use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use anyhow::anyhow;
use clap::Parser;
use clap::ValueEnum;
use log::info;

use mcrl2rust_io::io_aut::read_aut;
use mcrl2rust_io::io_aut::write_aut;
use mcrl2rust_io::io_lts::read_lts;
use mcrl2rust_io::io_lts::write_lts;
use mcrl2rust_lts::remove_tau_actions;
use mcrl2rust_lts::remove_unreachable_states;
use mcrl2rust_lts::LabelledTransitionSystem;
use mcrl2rust_utilities::Timing;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static ALLOC: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Command {
    /// Replaces every state by the visible transitions of its tau closure.
    RemoveTau,

    /// Removes the states that cannot be reached from the initial state.
    RemoveUnreachable,
}

#[derive(clap::Parser, Debug)]
#[command(name = "ltstransform", about = "Applies a transformation to a labelled transition system")]
struct Cli {
    #[arg(long, value_enum)]
    command: Command,

    filename: String,

    output: String,

    /// Action labels that are hidden before the transformation.
    #[arg(long, value_delimiter = ',')]
    tau: Vec<String>,

    #[arg(long)]
    timings: bool,
}

/// Returns true iff the file has the extension of the binary LTS format.
fn is_binary(filename: &str) -> bool {
    Path::new(filename).extension().is_some_and(|extension| extension == "lts")
}

fn main() -> Result<ExitCode, anyhow::Error> {
    env_logger::init();

    let cli = Cli::parse();
    let mut timing = Timing::new();

    let mut read_time = timing.start("read");
    let reader = BufReader::new(File::open(&cli.filename)?);
    let lts = if is_binary(&cli.filename) {
        read_lts(reader, cli.tau.clone())
    } else {
        read_aut(reader, cli.tau.clone())
    }
    .map_err(|error| anyhow!("Cannot read {}: {error}", cli.filename))?;
    read_time.finish();

    let mut transform_time = timing.start("transform");
    let result: LabelledTransitionSystem = match cli.command {
        Command::RemoveTau => remove_tau_actions(&lts),
        Command::RemoveUnreachable => remove_unreachable_states(&lts),
    };
    transform_time.finish();

    info!(
        "Transformed {} states and {} transitions into {} states and {} transitions",
        lts.num_of_states(),
        lts.num_of_transitions(),
        result.num_of_states(),
        result.num_of_transitions()
    );

    let mut write_time = timing.start("write");
    let mut writer = BufWriter::new(File::create(&cli.output)?);
    if is_binary(&cli.output) {
        write_lts(&mut writer, &result, None)
    } else {
        write_aut(&mut writer, &result)
    }
    .map_err(|error| anyhow!("Cannot write {}: {error}", cli.output))?;
    writer.flush()?;
    write_time.finish();

    if cli.timings {
        timing.print();
    }

    Ok(ExitCode::SUCCESS)
}
