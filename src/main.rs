use anyhow::{bail, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

use folkets_yomitan::package::{self, Staging, DEFAULT_BANK_SIZE};
use folkets_yomitan::parallel::{write_term_banks, ParallelConfig};
use folkets_yomitan::yomitan::{today_revision, DEFAULT_TITLE};
use folkets_yomitan::{resolve, xml, Converter, DictionaryIndex, Entry, EntryGraph, PosTable};

#[derive(Parser)]
#[command(name = "folkets-yomitan")]
#[command(about = "Convert the Folkets Lexikon XML export into a Yomitan dictionary")]
struct Args {
    /// Input XML file (.xml or .xml.bz2)
    #[arg(default_value = "folkets_sv_en_public.xml")]
    input: PathBuf,

    /// Output dictionary archive
    #[arg(default_value = "Folkets_Lexikon.zip")]
    output: PathBuf,

    /// Path to POS schema YAML file (default: built-in schema/pos.yaml)
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Maximum number of terms per term bank file
    #[arg(long, default_value_t = DEFAULT_BANK_SIZE, value_parser = parse_positive)]
    bank_size: usize,

    /// Maximum number of concurrent term bank writers
    #[arg(short, long, default_value_t = 8)]
    threads: usize,

    /// Dictionary title shown in the reader
    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,

    /// Dictionary revision (default: today's date as YYYY.MM.DD)
    #[arg(long)]
    revision: Option<String>,

    /// Keep the unzipped dictionary files in this directory
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Also write the resolved entries as JSONL (for debugging)
    #[arg(long)]
    dump_json: Option<PathBuf>,

    /// Quiet mode - minimal output
    #[arg(short, long)]
    quiet: bool,
}

fn parse_positive(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[derive(Debug, Default)]
struct Stats {
    words: usize,
    entries: usize,
    missing_headword: usize,
    headwords: usize,
    nodes: usize,
    generated: usize,
    linked: usize,
    terms: usize,
    skipped: usize,
    tags: Vec<String>,
    unmapped: usize,
    banks_written: usize,
    banks_failed: usize,
    files_archived: usize,
    elapsed: Duration,
}

/// One line of the `--dump-json` output.
#[derive(Serialize)]
struct DumpedNode<'a> {
    #[serde(flatten)]
    entry: &'a Entry,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_form: Option<&'a str>,
}

fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn spinner(quiet: bool, message: String) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn progress_bar(quiet: bool, len: usize, message: &'static str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("=> "),
    );
    pb.set_message(message);
    pb
}

fn dump_graph(graph: &EntryGraph, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for id in graph.nodes_in_order() {
        let node = DumpedNode {
            entry: graph.entry(id),
            base_form: graph.base_form(id).map(|base| base.entry().headword.as_str()),
        };
        serde_json::to_writer(&mut writer, &node)?;
        writeln!(writer)?;
    }
    writer.flush()?;
    info!("wrote {} resolved entries to {}", graph.len(), path.display());
    Ok(())
}

fn print_stats(stats: &Stats, output: &Path) {
    println!();
    println!("============================================================");
    println!("Dictionary: {}", output.display());
    println!("Words read: {}", stats.words);
    println!("Entries kept: {}", stats.entries);
    println!("Missing headword: {}", stats.missing_headword);
    println!("------------------------------------------------------------");
    println!("Headwords: {}", stats.headwords);
    println!("Resolved entries: {}", stats.nodes);
    println!("  generated inflections: {}", stats.generated);
    println!("  linked to base form: {}", stats.linked);
    println!("------------------------------------------------------------");
    println!("Terms written: {}", stats.terms);
    println!("Skipped (no content): {}", stats.skipped);
    println!("POS tags: {}", stats.tags.join(", "));
    println!("Unmapped word classes: {}", stats.unmapped);
    println!("Term banks: {} written, {} failed", stats.banks_written, stats.banks_failed);
    println!("Files archived: {}", stats.files_archived);
    println!("Time: {}m {}s", stats.elapsed.as_secs() / 60, stats.elapsed.as_secs() % 60);
    println!("Rate: {:.0} entries/sec", stats.nodes as f64 / stats.elapsed.as_secs_f64().max(0.001));
    println!("============================================================");
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.quiet);

    let start_time = Instant::now();
    let mut stats = Stats::default();

    // POS table: built-in unless a schema file is given
    let custom_table;
    let pos: &PosTable = match &args.schema {
        Some(path) => {
            custom_table = PosTable::load(path)
                .with_context(|| format!("error loading POS schema {}", path.display()))?;
            &custom_table
        }
        None => PosTable::builtin().context("error loading built-in POS schema")?,
    };

    // Stage 1: parse
    let pb = spinner(args.quiet, format!("Parsing {}", args.input.display()));
    let parsed = xml::parse_file(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    pb.finish_and_clear();
    stats.words = parsed.stats.words;
    stats.entries = parsed.stats.entries;
    stats.missing_headword = parsed.stats.missing_headword;

    // Stage 2: resolve inflections
    let graph = resolve(parsed.entries);
    let resolved = graph.stats();
    stats.headwords = resolved.headwords;
    stats.nodes = resolved.total_entries;
    stats.generated = resolved.generated;
    stats.linked = resolved.linked;

    if let Some(path) = &args.dump_json {
        dump_graph(&graph, path)?;
    }

    // Stage 3: render
    let converter = Converter::new(pos);
    let pb = progress_bar(args.quiet, graph.len(), "Converting");
    let conversion = converter.convert_with(&graph, || pb.inc(1));
    pb.finish_and_clear();
    conversion.unmapped.report();
    stats.terms = conversion.terms.len();
    stats.skipped = conversion.skipped;
    stats.tags = conversion.tags.iter().cloned().collect();
    stats.unmapped = conversion.unmapped.len();

    // Stage 4: write and zip
    let staging = Staging::new(args.staging_dir.as_deref())?;
    let dir = staging.path();

    let banks = package::banks(&conversion.terms, args.bank_size);
    let pb = progress_bar(args.quiet, banks.len(), "Writing term banks");
    let config = ParallelConfig {
        max_writers: args.threads,
    };
    let report = write_term_banks(dir, banks, &config, |_| pb.inc(1));
    pb.finish_and_clear();
    stats.banks_written = report.written.len();
    stats.banks_failed = report.failed.len();

    package::write_tag_bank(dir, &converter.tag_bank(&conversion.tags))?;
    let revision = args.revision.clone().unwrap_or_else(today_revision);
    package::write_index(dir, &DictionaryIndex::new(args.title.as_str(), revision))?;

    let pb = spinner(args.quiet, format!("Creating {}", args.output.display()));
    stats.files_archived = package::create_archive(dir, &args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    pb.finish_and_clear();
    drop(staging);

    stats.elapsed = start_time.elapsed();
    if !args.quiet {
        print_stats(&stats, &args.output);
    }

    if !report.is_complete() {
        let numbers: Vec<String> = report.failed.iter().map(|(n, _)| n.to_string()).collect();
        bail!(
            "{} term banks failed to write ({}); the archive is incomplete",
            numbers.len(),
            numbers.join(", ")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────
    // Arguments
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn defaults_parse() {
        let args = Args::try_parse_from(["folkets-yomitan"]).unwrap();
        assert_eq!(args.input, PathBuf::from("folkets_sv_en_public.xml"));
        assert_eq!(args.output, PathBuf::from("Folkets_Lexikon.zip"));
        assert_eq!(args.bank_size, DEFAULT_BANK_SIZE);
        assert_eq!(args.threads, 8);
        assert_eq!(args.title, DEFAULT_TITLE);
    }

    #[test]
    fn zero_bank_size_is_rejected() {
        assert!(Args::try_parse_from(["folkets-yomitan", "--bank-size", "0"]).is_err());
        assert!(Args::try_parse_from(["folkets-yomitan", "--bank-size", "-3"]).is_err());

        let args = Args::try_parse_from(["folkets-yomitan", "--bank-size", "250"]).unwrap();
        assert_eq!(args.bank_size, 250);
    }
}
