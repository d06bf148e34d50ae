mod logic;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use convertrail_game::{ElementCatalog, GameConfig, Rules};
use logic::{GameRun, Strategy, play_game, summarize};
use util::{parse_seeds, parse_strategies};

#[derive(Debug, Parser)]
#[command(name = "convertrail-tester", version)]
#[command(about = "Automated play-testing for Convertrail: invariant checks and strategy balance")]
struct Args {
    /// Strategies to play (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    strategies: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Games per strategy and seed; game `n` uses `seed + n`
    #[arg(long, default_value_t = 1)]
    games: u64,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// JSON element catalog to play with instead of the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Log every action taken
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    let is_console = args.report == "console";
    if is_console {
        announce_banner();
    }

    let start_time = Instant::now();
    let rules = load_rules(args.catalog.as_deref())?;
    let strategies = parse_strategies(&args.strategies)?;
    let seeds = parse_seeds(&args.seeds)?;

    let runs = run_games(&args, &rules, &strategies, &seeds);
    write_reports(&args, &runs, start_time)?;

    if runs.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available strategies:")?;
    for strategy in Strategy::ALL {
        writeln!(
            output_target.writer(),
            "  {:10} - {}",
            strategy.key(),
            strategy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎮 Convertrail Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn load_rules(catalog: Option<&Path>) -> Result<Rules> {
    let Some(path) = catalog else {
        return Ok(Rules::standard());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let catalog = ElementCatalog::from_json(&json)
        .with_context(|| format!("invalid catalog {}", path.display()))?;
    Ok(Rules::new(GameConfig::default(), catalog)?)
}

fn run_games(args: &Args, rules: &Rules, strategies: &[Strategy], seeds: &[u64]) -> Vec<GameRun> {
    let mut runs = Vec::new();
    for &strategy in strategies {
        for &seed in seeds {
            for game in 0..args.games.max(1) {
                let seed = seed.wrapping_add(game);
                let run = play_game(rules, strategy, seed, args.verbose);
                if run.passed {
                    log::info!("{strategy} seed {seed}: revenue ${}", run.metrics.total_revenue);
                } else {
                    log::warn!("{strategy} seed {seed}: {} failure(s)", run.failures.len());
                }
                runs.push(run);
            }
        }
    }
    runs
}

fn write_reports(args: &Args, runs: &[GameRun], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let summaries = summarize(runs);

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, runs, &summaries)?,
        "markdown" => {
            logic::reports::generate_markdown_report(&mut output_target, runs, &summaries)?;
        }
        _ => {
            let duration = start_time.elapsed();
            logic::reports::generate_console_report(
                &mut output_target,
                runs,
                &summaries,
                duration,
            )?;
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
