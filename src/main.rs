use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use libdafsa::cli::{BuilderKind, Cli, InputFormat, OutputFormat};
use libdafsa::dafsa::{build_dafsa, build_trie, Automaton, Compressor};
use libdafsa::report::{CompressionReport, StatsSummary};
use libdafsa::stats::AutomatonStats;
use libdafsa::{io as dafsa_io, Config};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; warnings always, everything with --debug
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn io::BufRead>> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    })
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn load_automaton(args: &Cli) -> Result<Automaton<char>> {
    let reader = open_input(args.input.as_deref())?;
    match args.input_format {
        InputFormat::Triples => {
            dafsa_io::read_triples(reader).context("failed to load triple list")
        }
        InputFormat::Dot => dafsa_io::read_dot(reader).context("failed to load DOT graph"),
        InputFormat::Words => {
            let mut words = dafsa_io::read_word_list(reader).context("failed to read word list")?;
            // The builders need sorted, duplicate-free input.
            words.sort_unstable();
            words.dedup();
            let automaton: Result<Automaton<char>, _> = match args.builder {
                BuilderKind::Trie => build_trie(&words),
                BuilderKind::Dafsa => build_dafsa(&words),
            };
            automaton.context("failed to build automaton from word list")
        }
    }
}

fn write_report<R: Display + Serialize>(args: &Cli, report: &R) -> Result<()> {
    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(create_output(path)?),
        None => Box::new(io::stdout().lock()),
    };
    match args.format {
        OutputFormat::Text => write!(out, "{report}")?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, report)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn run(args: &Cli, config: &Config) -> Result<()> {
    let automaton = load_automaton(args)?;
    info!(
        vertices = automaton.vertex_count(),
        edges = automaton.edge_count(),
        "loaded automaton"
    );

    if args.no_compress {
        let stats = AutomatonStats::collect(&automaton);
        let mut summary = StatsSummary::new(&stats);
        if args.storage {
            summary = summary.with_storage(stats.storage(&config.storage, config.occurrence_cutoff));
        }
        return write_report(args, &summary);
    }

    let (compressed, summary) = Compressor::new(config.compress)
        .compress_with_summary(&automaton)
        .context("compression failed")?;

    let before = AutomatonStats::collect(&automaton);
    let after = AutomatonStats::collect(&compressed);
    let mut report = CompressionReport::new(&before, &after).with_summary(summary);
    if args.storage {
        report = report.with_storage(
            before.storage(&config.storage, config.occurrence_cutoff),
            after.storage(&config.storage, config.occurrence_cutoff),
        );
    }

    if let Some(path) = &args.write_compressed {
        let mut out = create_output(path)?;
        dafsa_io::write_triples(&mut out, &compressed)
            .with_context(|| format!("cannot write {}", path.display()))?;
        out.flush()?;
    }
    if let Some(path) = &args.dot {
        let mut out = create_output(path)?;
        dafsa_io::write_dot(&mut out, &compressed)
            .with_context(|| format!("cannot write {}", path.display()))?;
        out.flush()?;
    }

    write_report(args, &report)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = args.config()?;
    run(&args, &config)
}
