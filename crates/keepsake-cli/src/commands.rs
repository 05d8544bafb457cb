use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use keepsake_revive::{census, LegacyTable, TagCensus, TagReport, TagStatus};
use keepsake_store::{FileSaveStore, SaveStore, StoreConfig};
use serde_json::{json, Value};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Inspect(args) => cmd_inspect(args, cli.format),
        Command::Check(args) => cmd_check(args, cli.format),
        Command::Pretty(args) => cmd_pretty(args),
        Command::Slots(args) => cmd_slots(args, cli.format),
    }
}

fn read_save(path: &Path) -> anyhow::Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value = serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    debug!(path = %path.display(), bytes = text.len(), "save parsed");
    Ok(value)
}

fn classify(census: &TagCensus, known: &[String]) -> Vec<TagReport> {
    census.classify_with(|tag| known.iter().any(|k| k == tag), &LegacyTable::default())
}

fn print_reports(reports: &[TagReport]) {
    for report in reports {
        let count = format!("{:>6}", report.count);
        match &report.status {
            TagStatus::Live => println!("  {}  {}", count, report.tag.green()),
            TagStatus::Container => println!("  {}  {} {}", count, report.tag.cyan(), "(container)".dimmed()),
            TagStatus::Legacy { retired_in, note } => {
                println!("  {}  {} {}", count, report.tag.yellow(), format!("(retired in {retired_in})").dimmed());
                if !note.is_empty() {
                    println!("          {}", note.dimmed());
                }
            }
            TagStatus::Unknown => println!("  {}  {} {}", count, report.tag.red().bold(), "(unknown)".dimmed()),
        }
    }
}

fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let value = read_save(&args.file)?;
    let census = census(&value);
    let reports = classify(&census, &args.known);

    if format == OutputFormat::Json {
        let out = json!({
            "file": args.file.display().to_string(),
            "nodes": census.nodes,
            "envelopes": census.envelopes(),
            "tags": reports,
            "malformed": census.malformed,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{} {}", "Save".bold(), args.file.display());
    println!("  {} nodes, {} envelopes, {} distinct tags", census.nodes, census.envelopes(), reports.len());
    if !reports.is_empty() {
        println!("\n{}", "Tags".bold());
        print_reports(&reports);
    }
    if !census.malformed.is_empty() {
        println!("\n{}", "Malformed envelopes".bold());
        for malformed in &census.malformed {
            println!("  {} {}", malformed.path.yellow(), malformed.reason);
        }
    }
    Ok(())
}

fn cmd_check(args: CheckArgs, format: OutputFormat) -> anyhow::Result<()> {
    let value = read_save(&args.file)?;
    let census = census(&value);
    let reports = classify(&census, &args.known);
    let unknown: Vec<&TagReport> = reports
        .iter()
        .filter(|report| report.status == TagStatus::Unknown)
        .collect();
    let legacy = reports
        .iter()
        .filter(|report| matches!(report.status, TagStatus::Legacy { .. }))
        .count();

    if format == OutputFormat::Json {
        let out = json!({
            "ok": unknown.is_empty() && census.malformed.is_empty(),
            "unknown": unknown,
            "legacy": legacy,
            "malformed": census.malformed,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for report in &unknown {
            println!("{} unknown tag {} ({} occurrences)", "✗".red().bold(), report.tag.bold(), report.count);
        }
        for malformed in &census.malformed {
            println!("{} malformed envelope at {}: {}", "✗".red().bold(), malformed.path, malformed.reason);
        }
        if legacy > 0 {
            println!("{} {} legacy tag(s) will load as fallbacks", "!".yellow().bold(), legacy);
        }
    }

    if !unknown.is_empty() || !census.malformed.is_empty() {
        bail!(
            "{} would not load: {} unknown tag(s), {} malformed envelope(s)",
            args.file.display(),
            unknown.len(),
            census.malformed.len()
        );
    }
    if format == OutputFormat::Text {
        println!("{} {} loads", "✓".green().bold(), args.file.display());
    }
    Ok(())
}

fn cmd_pretty(args: PrettyArgs) -> anyhow::Result<()> {
    let value = read_save(&args.file)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn cmd_slots(args: SlotsArgs, format: OutputFormat) -> anyhow::Result<()> {
    if !args.dir.is_dir() {
        bail!("{} is not a directory", args.dir.display());
    }
    let config = StoreConfig {
        extension: args.extension,
        ..StoreConfig::at(&args.dir)
    };
    let store = FileSaveStore::open(config)?;
    let slots = store.list()?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&slots)?);
        return Ok(());
    }
    if slots.is_empty() {
        println!("No save slots in {}.", args.dir.display());
    }
    for slot in &slots {
        let modified = slot
            .modified
            .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".into());
        println!("  {:<24} {:>10} B  {}", slot.name.as_str().bold(), slot.bytes, modified.dimmed());
    }
    Ok(())
}
