use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::anyhow;
use anyhow::bail;
use clap::Parser;
use clap::ValueEnum;
use log::info;

use mcrl2::lps::LinearProcessSpecification;
use mcrl2::typecheck::TypeCheckOptions;
use mcrl2rust_explore::ExploreError;
use mcrl2rust_explore::ExploreOptions;
use mcrl2rust_explore::ExploreResult;
use mcrl2rust_explore::ExploreStatus;
use mcrl2rust_explore::Explorer;
use mcrl2rust_io::io_aut::write_aut;
use mcrl2rust_io::io_dot::write_dot;
use mcrl2rust_io::io_fsm::write_fsm;
use mcrl2rust_io::io_lps::read_lps;
use mcrl2rust_io::io_lts::write_lts;
use mcrl2rust_process::linearize;
use mcrl2rust_process::parse_process_specification;
use mcrl2rust_process::LinearizeOptions;
use mcrl2rust_sabre::RewriteStrategy;
use mcrl2rust_utilities::Timing;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Rewriter {
    Jitty,
    JittyCompiling,
}

impl From<Rewriter> for RewriteStrategy {
    fn from(rewriter: Rewriter) -> Self {
        match rewriter {
            Rewriter::Jitty => RewriteStrategy::Jitty,
            Rewriter::JittyCompiling => RewriteStrategy::JittyCompiling,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Aut,
    Fsm,
    Dot,
    Lts,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum YesNo {
    Yes,
    No,
}

#[derive(clap::Parser, Debug)]
#[command(name = "mcrl3explore", about = "Generates the state space of a linear process")]
pub struct Cli {
    /// A linear process written by mcrl3linearize, or a .mcrl2 specification.
    pub filename: String,

    /// The file to which the state space is written.
    pub output: Option<String>,

    /// Caches the enumeration of summand conditions.
    #[arg(long)]
    pub cached: bool,

    /// Reports the states without outgoing transitions.
    #[arg(long)]
    pub deadlock: bool,

    /// Reports the states with two transitions with the same label to different states.
    #[arg(long)]
    pub nondeterminism: bool,

    /// The maximal number of states that are generated.
    #[arg(long)]
    pub max: Option<usize>,

    /// The maximal number of states that wait to be explored.
    #[arg(long)]
    pub todo_max: Option<usize>,

    #[arg(long, value_enum, default_value_t = Rewriter::Jitty)]
    pub rewriter: Rewriter,

    /// The output format, derived from the extension of the output file when omitted.
    #[arg(long, value_enum)]
    pub out: Option<OutputFormat>,

    /// Replaces global variables by representative values.
    #[arg(long, value_enum, default_value_t = YesNo::Yes)]
    pub dummy: YesNo,

    /// Keeps the equations that are not used by the linear process.
    #[arg(long)]
    pub unused_data: bool,

    /// Does not write the parameter values of states.
    #[arg(long)]
    pub no_info: bool,

    #[arg(long)]
    pub timings: bool,
}

impl Cli {
    pub fn explore_options(&self) -> ExploreOptions {
        ExploreOptions {
            max_states: self.max.unwrap_or(usize::MAX),
            todo_max: self.todo_max.unwrap_or(usize::MAX),
            detect_deadlock: self.deadlock,
            detect_nondeterminism: self.nondeterminism,
            cached: self.cached,
            rewrite_strategy: self.rewriter.into(),
            dummy: self.dummy == YesNo::Yes,
            unused_data: self.unused_data,
            store_state_values: !self.no_info,
        }
    }

    /// Returns the format of the output file, if there is one.
    pub fn output_format(&self) -> Result<Option<OutputFormat>, anyhow::Error> {
        let Some(output) = &self.output else {
            return Ok(None);
        };

        if let Some(format) = self.out {
            return Ok(Some(format));
        }

        let extension = Path::new(output)
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or_default();
        match OutputFormat::from_str(extension, true) {
            Ok(format) => Ok(Some(format)),
            Err(_) => bail!("Cannot determine the output format of {output}, use --out"),
        }
    }
}

/// Explores the input and writes the state space, which is partial when the
/// exploration stopped early. The exploration stops when the abort flag is set.
pub fn run(cli: &Cli, abort: Arc<AtomicBool>) -> Result<ExitCode, anyhow::Error> {
    let mut timing = Timing::new();
    let format = cli.output_format()?;

    let lps = load_lps(cli, &mut timing)?;

    let mut explorer = Explorer::new(&lps, cli.explore_options())?.with_abort_handle(abort);

    let mut explore_time = timing.start("explore");
    let (result, error) = match explorer.explore() {
        Ok(result) => (result, None),
        Err(ExploreError { error, partial }) => (*partial, Some(error)),
    };
    explore_time.finish();

    print_summary(&result);

    if let (Some(output), Some(format)) = (&cli.output, format) {
        let mut write_time = timing.start("write");
        let mut writer = BufWriter::new(File::create(output)?);
        write_result(&mut writer, &result, format).map_err(|error| anyhow!("Cannot write {output}: {error}"))?;
        writer.flush()?;
        write_time.finish();

        info!("Wrote the state space to {output}");
    }

    if cli.timings {
        timing.print();
    }

    if let Some(error) = error {
        return Err(error.into());
    }

    match result.status {
        ExploreStatus::Aborted => Ok(ExitCode::FAILURE),
        ExploreStatus::Completed | ExploreStatus::MaxStatesReached => Ok(ExitCode::SUCCESS),
    }
}

/// Reads a linear process, or linearizes the input when it is a textual specification.
fn load_lps(cli: &Cli, timing: &mut Timing) -> Result<LinearProcessSpecification, anyhow::Error> {
    let mut read_time = timing.start("read");

    if Path::new(&cli.filename).extension().is_some_and(|extension| extension == "mcrl2") {
        let text = fs::read_to_string(&cli.filename)?;
        let spec = parse_process_specification(&text, &TypeCheckOptions::default())?;
        read_time.finish();

        let mut linearize_time = timing.start("linearize");
        let lps = linearize(
            &spec,
            &LinearizeOptions {
                rewrite_strategy: cli.rewriter.into(),
                ..Default::default()
            },
        )?;
        linearize_time.finish();
        Ok(lps)
    } else {
        let file = File::open(&cli.filename)?;
        let lps = read_lps(BufReader::new(file)).map_err(|error| anyhow!("Cannot read {}: {error}", cli.filename))?;
        read_time.finish();
        Ok(lps)
    }
}

fn write_result(
    writer: &mut impl Write,
    result: &ExploreResult,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let states = result.states.as_deref();

    match format {
        OutputFormat::Aut => write_aut(writer, &result.lts),
        OutputFormat::Fsm => write_fsm(writer, &result.lts, &result.parameters, states),
        OutputFormat::Dot => write_dot(writer, &result.lts, states),
        OutputFormat::Lts => write_lts(writer, &result.lts, states),
    }
}

fn print_summary(result: &ExploreResult) {
    info!(
        "Generated {} states and {} transitions ({})",
        result.lts.num_of_states(),
        result.lts.num_of_transitions(),
        result.status
    );

    for state in &result.deadlocks {
        eprintln!("deadlock-detect: deadlock found in state {state}");
    }

    for state in &result.nondeterministic_states {
        eprintln!("nondeterminism-detect: nondeterministic state found: {state}");
    }
}
