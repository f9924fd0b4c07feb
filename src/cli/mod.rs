//! # CLI Module
//!
//! Command-line interface for the duplicate and burst detection engine.
//!
//! Input is a JSON array of photo records. Settings come from the config
//! file first; flags given on the command line override them.
//!
//! ## Usage
//! ```bash
//! # Group exact duplicates and find bursts
//! photo-groups detect records.json
//!
//! # Near duplicates, linked transitively
//! photo-groups detect records.json --mode threshold --threshold 8 --linkage transitive
//!
//! # Suppressed ids only, one per line
//! photo-groups detect records.json --output minimal
//!
//! # Pick keepers scoring 80 or more
//! photo-groups select records.json --min-score 80
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_dedup_engine::core::burst::BurstConfig;
use photo_dedup_engine::core::comparator::{GroupingStrategy, Linkage, ThresholdPolicy};
use photo_dedup_engine::core::pipeline::{DetectionConfig, DetectionPipeline, DetectionReport};
use photo_dedup_engine::core::record::{load_records, Exclusion, PhotoRecord};
use photo_dedup_engine::error::{ReportError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// photo-groups - Find duplicate photos and burst sequences
#[derive(Parser, Debug)]
#[command(name = "photo-groups")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Group duplicates and find burst sequences
    Detect {
        /// JSON file holding an array of photo records
        input: PathBuf,

        #[command(flatten)]
        grouping: GroupingArgs,

        #[command(flatten)]
        burst: BurstArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Pick the best photos, one per duplicate group
    Select {
        /// JSON file holding an array of photo records
        input: PathBuf,

        #[command(flatten)]
        grouping: GroupingArgs,

        /// Minimum quality score to select (0-100)
        #[arg(long)]
        min_score: Option<f64>,

        /// Consider photos flagged as rejects
        #[arg(long)]
        keep_rejects: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Args, Debug)]
struct GroupingArgs {
    /// Grouping mode
    #[arg(long)]
    mode: Option<Mode>,

    /// Hamming threshold for threshold mode (lower = stricter)
    #[arg(short, long)]
    threshold: Option<u32>,

    /// Match when either hash is within the threshold
    #[arg(long)]
    either_hash: bool,

    /// How threshold matches are linked into groups
    #[arg(long)]
    linkage: Option<LinkageArg>,
}

impl GroupingArgs {
    /// Layer the flags over a configured strategy
    fn apply(&self, configured: GroupingStrategy) -> GroupingStrategy {
        let wants_threshold = matches!(self.mode, Some(Mode::Threshold))
            || (self.mode.is_none()
                && (self.threshold.is_some() || self.either_hash || self.linkage.is_some()));

        if matches!(self.mode, Some(Mode::Exact)) {
            return GroupingStrategy::ExactMatch;
        }
        if !wants_threshold {
            return configured;
        }

        let (threshold, require_both_hashes, linkage) = match configured {
            GroupingStrategy::Threshold {
                threshold,
                require_both_hashes,
                linkage,
            } => (threshold, require_both_hashes, linkage),
            GroupingStrategy::ExactMatch => {
                (ThresholdPolicy::DEFAULT_THRESHOLD, true, Linkage::default())
            }
        };

        GroupingStrategy::Threshold {
            threshold: self.threshold.unwrap_or(threshold),
            require_both_hashes: require_both_hashes && !self.either_hash,
            linkage: self.linkage.map(Linkage::from).unwrap_or(linkage),
        }
    }
}

#[derive(Args, Debug)]
struct BurstArgs {
    /// Maximum seconds between consecutive burst frames
    #[arg(long)]
    time_window: Option<f64>,

    /// Maximum primary-hash distance between consecutive burst frames
    #[arg(long)]
    burst_threshold: Option<u32>,

    /// Skip burst detection
    #[arg(long)]
    no_bursts: bool,
}

impl BurstArgs {
    fn apply(&self, configured: BurstConfig) -> BurstConfig {
        BurstConfig::new(
            self.time_window.unwrap_or(configured.time_window_seconds),
            self.burst_threshold
                .unwrap_or(configured.visual_distance_threshold),
        )
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Bit-identical fingerprints only (default)
    Exact,
    /// Fingerprints within a Hamming threshold
    Threshold,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LinkageArg {
    /// Every member matches the group's first photo (default)
    Anchor,
    /// Any chain of matches joins a group
    Transitive,
}

impl From<LinkageArg> for Linkage {
    fn from(arg: LinkageArg) -> Self {
        match arg {
            LinkageArg::Anchor => Linkage::Anchor,
            LinkageArg::Transitive => Linkage::Transitive,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (ids only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    photo_dedup_engine::init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => DetectionConfig::load_from(path)?,
        None => DetectionConfig::load()?,
    };

    match cli.command {
        Commands::Detect {
            input,
            grouping,
            burst,
            output,
        } => {
            config.grouping = grouping.apply(config.grouping);
            config.burst = burst.apply(config.burst);
            config.detect_bursts = config.detect_bursts && !burst.no_bursts;
            run_detect(&input, config, output, cli.verbose)
        }
        Commands::Select {
            input,
            grouping,
            min_score,
            keep_rejects,
            output,
        } => {
            config.grouping = grouping.apply(config.grouping);
            config.detect_bursts = false;
            if let Some(min_score) = min_score {
                config.selection.min_score = min_score;
            }
            if keep_rejects {
                config.selection.skip_rejects = false;
            }
            run_select(&input, config, output)
        }
    }
}

fn run_pass(
    input: &Path,
    config: DetectionConfig,
    output: OutputFormat,
) -> Result<(Vec<PhotoRecord>, DetectionReport)> {
    let pipeline = DetectionPipeline::builder().config(config).build()?;
    let records = load_records(input)?;

    let spinner = matches!(output, OutputFormat::Pretty).then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Comparing {} photos", records.len()));
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    });

    let report = pipeline.run(&records);

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    Ok((records, report?))
}

fn run_detect(
    input: &Path,
    config: DetectionConfig,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let (records, report) = run_pass(input, config, output)?;

    match output {
        OutputFormat::Pretty => print_pretty_report(&Term::stdout(), &records, &report, verbose),
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Minimal => print_minimal_report(&report),
    }

    Ok(())
}

fn run_select(input: &Path, config: DetectionConfig, output: OutputFormat) -> Result<()> {
    let min_score = config.selection.min_score;
    let (records, report) = run_pass(input, config, output)?;

    match output {
        OutputFormat::Pretty => {
            print_pretty_selection(&Term::stdout(), &records, &report, min_score)
        }
        OutputFormat::Json => print_json(&report.selection)?,
        OutputFormat::Minimal => {
            for id in &report.selection.selected {
                println!("{}", id);
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ReportError::GenerationFailed(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn print_minimal_report(report: &DetectionReport) {
    for group in &report.groups {
        for id in group.suppressed_ids() {
            println!("{}", id);
        }
    }
}

fn print_pretty_report(
    term: &Term,
    records: &[PhotoRecord],
    report: &DetectionReport,
    verbose: bool,
) {
    let by_id: HashMap<&str, &PhotoRecord> =
        records.iter().map(|r| (r.id.as_str(), r)).collect();

    term.write_line(&format!("{} Detection Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    // Summary
    term.write_line(&format!(
        "  {} photos checked in {:.1}s ({} eligible for grouping)",
        style(report.total_records).cyan(),
        report.duration_ms as f64 / 1000.0,
        report.eligible_records
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicate groups, {} photos suppressed",
        style(report.groups.len()).cyan(),
        style(report.duplicate_count()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} burst sequences",
        style(report.bursts.len()).cyan()
    ))
    .ok();
    term.write_line("").ok();

    if report.groups.is_empty() {
        term.write_line(&format!("  {}", style("No duplicates found").green()))
            .ok();
    } else {
        term.write_line(&format!("{}", style("Duplicate Groups:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        for (i, group) in report.groups.iter().enumerate() {
            term.write_line(&format!(
                "  {} {} ({} photos, distance {})",
                style(format!("Group {}:", i + 1)).bold(),
                style(group.match_type).yellow(),
                group.member_ids.len(),
                group.max_distance
            ))
            .ok();

            for id in &group.member_ids {
                let marker = if *id == group.representative_id {
                    style("★").green().to_string()
                } else {
                    style("○").dim().to_string()
                };
                term.write_line(&format!("    {} {}", marker, describe(&by_id, id)))
                    .ok();
            }
            term.write_line("").ok();
        }
    }

    if !report.bursts.is_empty() {
        term.write_line(&format!("{}", style("Burst Sequences:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        for (i, burst) in report.bursts.iter().enumerate() {
            term.write_line(&format!(
                "  {} {} frames over {:.1}s, starting {}",
                style(format!("Burst {}:", i + 1)).bold(),
                burst.len(),
                burst.span_seconds(),
                burst.started_at.format("%Y-%m-%d %H:%M:%S")
            ))
            .ok();
            for id in &burst.member_ids {
                term.write_line(&format!("    {} {}", style("·").dim(), describe(&by_id, id)))
                    .ok();
            }
            term.write_line("").ok();
        }
    }

    if verbose {
        print_exclusions(term, "Not grouped", &report.excluded_from_grouping);
        print_exclusions(term, "Not checked for bursts", &report.excluded_from_bursts);
    }
}

fn print_pretty_selection(
    term: &Term,
    records: &[PhotoRecord],
    report: &DetectionReport,
    min_score: f64,
) {
    let by_id: HashMap<&str, &PhotoRecord> =
        records.iter().map(|r| (r.id.as_str(), r)).collect();
    let selection = &report.selection;

    term.write_line(&format!("{} Selection Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();
    term.write_line(&format!(
        "  {} selected at score {} or above",
        style(selection.selected.len()).cyan(),
        min_score
    ))
    .ok();
    term.write_line(&format!(
        "  {} below threshold, {} rejects, {} duplicates across {} groups",
        selection.below_threshold.len(),
        selection.rejected.len(),
        selection.suppressed.len(),
        selection.duplicate_groups_processed
    ))
    .ok();
    term.write_line("").ok();

    for id in &selection.selected {
        term.write_line(&format!("  {} {}", style("★").green(), describe(&by_id, id)))
            .ok();
    }
}

fn print_exclusions(term: &Term, heading: &str, excluded: &[Exclusion]) {
    if excluded.is_empty() {
        return;
    }
    term.write_line(&format!("{}", style(format!("{}:", heading)).dim()))
        .ok();
    for exclusion in excluded {
        term.write_line(&format!(
            "    {} ({})",
            exclusion.record_id,
            style(&exclusion.reason).dim()
        ))
        .ok();
    }
    term.write_line("").ok();
}

fn describe(by_id: &HashMap<&str, &PhotoRecord>, id: &str) -> String {
    match by_id.get(id) {
        Some(record) => match record.score() {
            Some(score) => format!("{} [{}] score {:.0}", record.filename, id, score),
            None => format!("{} [{}] unscored", record.filename, id),
        },
        None => id.to_string(),
    }
}
