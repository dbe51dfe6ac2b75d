//! Alea CLI - run probability scenarios from JSON files
//!
//! Usage:
//!   alea <file>                        # Run a scenario and print a summary
//!   alea <file> -o json                # Print the full report as JSON
//!   alea <file> --check                # Validate without running
//!   alea <file> --tolerance 1e-6       # Override the independence tolerance

use std::fs;
use std::process;

use alea_core::engine::bayes::BayesAnalysis;
use alea_core::scenario::{QueryAnswer, Scenario, ScenarioReport};
use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "alea")]
#[command(version)]
#[command(about = "Alea - discrete probability and Bayesian update workbench")]
#[command(long_about = "Evaluate event algebra, Bayes updates and probability trees described in a scenario file")]
struct Cli {
    /// Scenario file (JSON)
    #[arg(value_name = "FILE")]
    file: String,

    /// Output format: summary, json, or debug
    #[arg(short, long, default_value = "summary", value_name = "FORMAT")]
    output: String,

    /// Absolute tolerance for independence checks
    #[arg(short, long, value_name = "TOL")]
    tolerance: Option<f64>,

    /// Validate the scenario without running it
    #[arg(short, long)]
    check: bool,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "alea=info,alea_core=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_logging();
    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let source = fs::read_to_string(&cli.file)
        .with_context(|| format!("reading scenario '{}'", cli.file))?;
    let mut scenario: Scenario = serde_json::from_str(&source)
        .with_context(|| format!("parsing scenario '{}'", cli.file))?;

    if let Some(tolerance) = cli.tolerance {
        scenario.config.algebra.independence_tolerance = tolerance;
    }

    if cli.check {
        scenario.validate().context("scenario validation failed")?;
        println!("✓ Scenario '{}' is valid", cli.file);
        return Ok(());
    }

    let report = scenario.run().context("scenario run failed")?;
    tracing::debug!(
        queries = report.queries.len(),
        evidence = report.evidence.len(),
        "scenario finished"
    );

    match cli.output.as_str() {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing report")?
        ),
        "debug" => println!("{:#?}", report),
        "summary" => print_summary(&report),
        other => bail!("unknown output format '{}'", other),
    }
    Ok(())
}

fn print_summary(report: &ScenarioReport) {
    if let Some(name) = &report.name {
        println!("Scenario: {}\n", name);
    }

    if let Some(summary) = &report.summary {
        println!("Sample space: {} outcomes", summary.cardinality);
        for event in &summary.events {
            println!(
                "  {:<16} |A| = {:<4} P = {:<8} ({}, {:.2}%)",
                event.event,
                event.cardinality,
                event.result.fraction.to_string(),
                event.result.probability,
                event.result.percentage
            );
        }
    }

    if !report.queries.is_empty() {
        println!("\nQueries ({}):", report.queries.len());
        for outcome in &report.queries {
            match (&outcome.answer, &outcome.error) {
                (Some(answer), _) => println!("  {}", describe(answer)),
                (None, Some(err)) => println!("  error: {}", err),
                (None, None) => {}
            }
        }
    }

    if !report.evidence.is_empty() {
        println!("\nBayes updates ({}):", report.evidence.len());
        for outcome in &report.evidence {
            match (&outcome.analysis, &outcome.error) {
                (Some(analysis), _) => print_analysis(analysis),
                (None, Some(err)) => println!("  {}: error: {}", outcome.evidence, err),
                (None, None) => {}
            }
        }
    }

    if let Some(tree) = &report.tree {
        println!("\nProbability tree ({} levels):", tree.levels.len());
        for path in &tree.paths {
            println!("  {:<24} {:.6}", path.to_string(), path.probability);
        }
        for (k, p) in tree.successes.iter().enumerate() {
            println!("  P({} successes) = {:.6}", k, p);
        }
    }
}

fn describe(answer: &QueryAnswer) -> String {
    match answer {
        QueryAnswer::Probability(p) => {
            format!("P({}) = {} ≈ {}", p.event, p.result.fraction, p.result.probability)
        }
        QueryAnswer::Union(u) => format!(
            "{} = {} ≈ {} (mutually exclusive: {})",
            u.union.formula, u.union.fraction, u.union.probability, u.mutually_exclusive
        ),
        QueryAnswer::Intersection { outcomes } => {
            format!("A ∩ B = {{{}}}", outcomes.join(", "))
        }
        QueryAnswer::MutuallyExclusive { exclusive } => {
            format!("mutually exclusive: {}", exclusive)
        }
        QueryAnswer::Complement(c) => format!(
            "{} = {} ≈ {}",
            c.complement.formula, c.complement.fraction, c.complement.probability
        ),
        QueryAnswer::Conditional(c) => format!(
            "{} = {} ≈ {}",
            c.conditional.formula, c.conditional.fraction, c.conditional.probability
        ),
        QueryAnswer::Independence(i) => format!(
            "independent: {} (P(A ∩ B) = {}, P(A)·P(B) = {:.6}, diff = {:.3e})",
            i.independent, i.intersection.fraction, i.product, i.difference
        ),
        QueryAnswer::AssumeIndependent(j) => format!(
            "assuming independence: P(A ∩ B) = {}, P(A ∪ B) = {} (supported: {})",
            j.intersection.fraction, j.union.fraction, j.independent
        ),
        QueryAnswer::Summary(s) => format!("summary: {} events", s.events.len()),
    }
}

fn print_analysis(analysis: &BayesAnalysis) {
    println!(
        "  evidence '{}': P(E) = {:.6}",
        analysis.evidence, analysis.evidence_probability
    );
    for (record, change) in analysis
        .posterior
        .records
        .iter()
        .zip(&analysis.comparisons)
    {
        let change = match (change.percent_change, change.band) {
            (Some(pct), Some(band)) => format!("{:+.1}%, {}", pct, band),
            _ => "undefined".to_string(),
        };
        println!(
            "    {:<16} {:.4} → {:.4} ({:.2}%) [{}]",
            record.hypothesis,
            record.prior,
            record.posterior,
            record.posterior_percentage,
            change
        );
    }
    println!("    most probable: {}", analysis.most_probable.hypothesis);
}
