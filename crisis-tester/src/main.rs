mod logic;
mod util;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use crisis_game::{ContentBundle, ContentLoader, DirectoryContent, StaticContent};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use logic::{GameplayStrategy, LogicTester, RunReport, StrategyResult, resolve_seed_inputs};
use util::split_csv;

#[derive(Debug, Parser)]
#[command(name = "crisis-tester", version = "0.1.0")]
#[command(about = "Automated playthroughs of the crisis decision game with scripted strategies")]
struct Args {
    /// Strategies to run (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    strategies: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Seeds to run (comma-separated numbers, CR- run codes, or `all`)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of games per strategy and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory holding scenarios.json and config.json; embedded content otherwise
    #[arg(long)]
    content_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    if args.report == "console" || args.output.is_some() {
        announce_banner();
    }

    let start_time = Instant::now();
    let strategies = expand_strategies(&args.strategies)?;
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let content = load_content(args.content_dir.as_deref())?;
    log::info!(
        "content {} with {} scenarios",
        content.fingerprint_hex(),
        content.scenarios.len()
    );

    let tester = LogicTester::new(Arc::clone(&content), args.verbose);
    let results: Vec<StrategyResult> = strategies
        .iter()
        .flat_map(|strategy| tester.run_strategy(*strategy, &seed_infos, args.iterations))
        .collect();
    let report = RunReport::new(tester.content(), results);

    write_reports(&args, &report, start_time)?;

    if !report.passed() {
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
    for strategy in GameplayStrategy::ALL {
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
    println!("{}", "🎮 Crisis Automated Tester".bright_cyan().bold());
    println!("{}", "==========================".cyan());
}

fn expand_strategies(arg: &str) -> Result<Vec<GameplayStrategy>> {
    let mut strategies = Vec::new();
    for name in split_csv(arg) {
        if name.eq_ignore_ascii_case("all") {
            strategies.extend(GameplayStrategy::ALL);
            continue;
        }
        let Ok(strategy) = name.parse::<GameplayStrategy>() else {
            bail!("Unknown strategy: {name}");
        };
        strategies.push(strategy);
    }
    strategies.sort();
    strategies.dedup();
    if strategies.is_empty() {
        bail!("No strategies selected");
    }
    Ok(strategies)
}

fn load_content(dir: Option<&Path>) -> Result<Arc<ContentBundle>> {
    let bundle = match dir {
        Some(dir) => DirectoryContent::new(dir)
            .load_bundle()
            .with_context(|| format!("failed to load content from {}", dir.display()))?,
        None => StaticContent
            .load_bundle()
            .context("embedded content is invalid")?,
    };
    Ok(Arc::new(bundle))
}

fn write_reports(args: &Args, report: &RunReport, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, report)?,
        "markdown" => logic::reports::generate_markdown_report(&mut output_target, report)?,
        _ => {
            if report.results.is_empty() {
                writeln!(&mut output_target, "No strategies executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    report,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
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
