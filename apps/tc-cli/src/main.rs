use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tc_app::{
    AppError, AppResult, Engine, EngineConfig, JsonRecordStore, MemoryCache, load_config,
    load_query,
};
use tc_phase::Span;

#[derive(Parser)]
#[command(name = "tc-cli")]
#[command(about = "ThermoCalc CLI - multi-phase thermodynamic tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Common {
    /// JSON file with an array of database records
    #[arg(short, long)]
    records: PathBuf,
    /// Engine configuration YAML (filter policy, search limit, default step)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Tabulate ΔH, ΔS, ΔG and ln K of a reaction
    Reaction {
        #[command(flatten)]
        common: Common,
        /// Reaction query YAML (equation, compounds with roles, optional window and step)
        query: PathBuf,
        /// Override the tabulation step [K]
        #[arg(long)]
        step: Option<f64>,
    },
    /// Tabulate Cp, H, S and G of one compound
    Compound {
        #[command(flatten)]
        common: Common,
        /// Chemical formula as stored in the records file
        formula: String,
        /// Tabulation step [K]
        #[arg(long)]
        step: Option<f64>,
        /// Requested window LO HI [K] (reported, not used to cut the table)
        #[arg(long, num_args = 2, value_names = ["LO", "HI"])]
        window: Option<Vec<f64>>,
    },
    /// Resolve the common calculation range of several compounds
    Range {
        #[command(flatten)]
        common: Common,
        /// Chemical formulas
        #[arg(required = true)]
        formulas: Vec<String>,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Reaction {
            common,
            query,
            step,
        } => cmd_reaction(&common, &query, step),
        Commands::Compound {
            common,
            formula,
            step,
            window,
        } => cmd_compound(&common, &formula, step, window.as_deref()),
        Commands::Range { common, formulas } => cmd_range(&common, &formulas),
    }
}

fn build_engine(common: &Common) -> AppResult<Engine> {
    let config = match &common.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    let store = JsonRecordStore::open(&common.records)?;
    eprintln!(
        "Loaded {} records ({} compounds) from {}",
        store.len(),
        store.formulas().len(),
        common.records.display()
    );
    Ok(Engine::new(Arc::new(store), config).with_cache(Arc::new(MemoryCache::new())))
}

fn cmd_reaction(common: &Common, query_path: &Path, step: Option<f64>) -> AppResult<()> {
    let engine = build_engine(common)?;
    let mut query = load_query(query_path)?;
    if step.is_some() {
        query.step_k = step;
    }
    eprintln!("Calculating: {}", query.equation);

    let report = engine.run_reaction(&query)?;
    eprintln!(
        "✓ {} rows over [{}, {}] K",
        report.rows.len(),
        report.range.resolved.lo_k,
        report.range.resolved.hi_k
    );
    for formula in report.low_confidence() {
        eprintln!("  ! {} uses low-confidence fallback records", formula);
    }
    let incomplete = report.rows.iter().filter(|r| !r.is_complete()).count();
    if incomplete > 0 {
        eprintln!(
            "  ! {} rows lack values (data gaps or unanchored placeholder references)",
            incomplete
        );
    }

    write_report(common, &report)
}

fn cmd_compound(
    common: &Common,
    formula: &str,
    step: Option<f64>,
    window: Option<&[f64]>,
) -> AppResult<()> {
    let engine = build_engine(common)?;
    let requested = match window {
        Some([lo, hi]) => Some(
            Span::new(*lo, *hi)
                .map_err(|e| AppError::InvalidQuery(format!("--window: {}", e)))?,
        ),
        Some(_) => {
            return Err(AppError::InvalidQuery(
                "--window takes exactly two values".to_string(),
            ));
        }
        None => None,
    };

    let report = engine.run_compound(formula, requested, step)?;
    eprintln!(
        "✓ {}: {} rows, {} segments, {} transitions",
        report.summary.formula,
        report.rows.len(),
        report.summary.segments.len(),
        report.summary.transitions.len()
    );
    write_report(common, &report)
}

fn cmd_range(common: &Common, formulas: &[String]) -> AppResult<()> {
    let engine = build_engine(common)?;
    let report = engine.resolve_range(formulas, None)?;
    eprintln!(
        "✓ Range [{}, {}] K ({:?})",
        report.range.resolved.lo_k, report.range.resolved.hi_k, report.range.anchor
    );
    for (formula, covered) in &report.range.coverage {
        if !covered {
            eprintln!("  ! {} has gaps inside the range", formula);
        }
    }
    write_report(common, &report)
}

fn write_report<T: Serialize>(common: &Common, report: &T) -> AppResult<()> {
    let json = if common.pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
    .map_err(|e| AppError::Report(e.to_string()))?;

    match &common.output {
        Some(path) => {
            std::fs::write(path, json)?;
            eprintln!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
