use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use snp_forge::detect::{BranchingMode, TraversalKind};
use snp_forge::utils::sequence_io::{read_sequences, FastaSink};
use snp_forge::{Detector, KmerGraph, ToolConfiguration};

#[derive(Parser)]
#[command(name = "snp-forge")]
#[command(about = "Detect SNP bubbles in a de Bruijn graph built from sequencing reads")]
#[command(version)]
struct Cli {
    /// Input FASTA/FASTQ file(s), optionally gzip-compressed
    #[arg(short, long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Output FASTA bank for bubble sequences (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// K-mer size, 3..=32; odd values recommended (overrides config)
    #[arg(short, long)]
    kmer_size: Option<usize>,

    /// Minimum k-mer abundance kept in the graph (overrides config)
    #[arg(short = 'c', long)]
    min_coverage: Option<u32>,

    /// Branching tolerance during path expansion
    #[arg(short, long, value_enum)]
    branching: Option<BranchingMode>,

    /// Flank extension flavor
    #[arg(short, long, value_enum)]
    extension: Option<TraversalKind>,

    /// Low-complexity score threshold
    #[arg(long)]
    threshold: Option<f64>,

    /// Keep bubbles whose score reaches the threshold
    #[arg(long)]
    keep_low: bool,

    /// Number of worker threads, 0 = all logical CPUs (overrides config)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let mut configuration = ToolConfiguration::load(cli.config.as_deref())?;
    if let Some(output) = cli.output {
        configuration.general.output_path = output;
    }
    if let Some(kmer_size) = cli.kmer_size {
        configuration.graph.kmer_size = kmer_size;
    }
    if let Some(min_coverage) = cli.min_coverage {
        configuration.graph.min_coverage = min_coverage;
    }
    if let Some(branching) = cli.branching {
        configuration.detection.branching = branching;
    }
    if let Some(extension) = cli.extension {
        configuration.detection.extension = extension;
    }
    if let Some(threshold) = cli.threshold {
        configuration.detection.complexity_threshold = threshold;
    }
    if cli.keep_low {
        configuration.detection.keep_low_complexity = true;
    }
    if let Some(threads) = cli.threads {
        configuration.general.threads = threads;
    }
    configuration.validate()?;

    println!("🧬 SNP-Forge - Bubble Detection");
    println!("===============================");
    println!("Input files: {}", cli.input.len());
    println!("K-mer size: {}", configuration.graph.kmer_size);
    println!("Branching: {:?}", configuration.detection.branching);
    println!("Extension: {:?}\n", configuration.detection.extension);

    let mut reads = Vec::new();
    for path in &cli.input {
        reads.extend(read_sequences(path)?);
    }

    let graph = KmerGraph::from_reads(
        &reads,
        configuration.graph.kmer_size,
        configuration.graph.min_coverage,
    )?;

    let detector = Detector::new(
        &graph,
        configuration.detection_options(),
        configuration.effective_threads(),
    );
    let sink = FastaSink::create(&configuration.general.output_path)?;
    let summary = detector.run(Box::new(sink))?;

    println!("\n📊 Results Summary:");
    println!("   Graph nodes: {}", summary.nodes_visited);
    println!("   Bubbles found: {}", summary.nb_bubbles);
    println!("   High complexity: {}", summary.nb_bubbles_high);
    println!("   Low complexity: {}", summary.nb_bubbles_low);
    println!(
        "   Extended (none/left/right/both): {}/{}/{}/{}",
        summary.nb_where_to_extend[0],
        summary.nb_where_to_extend[1],
        summary.nb_where_to_extend[2],
        summary.nb_where_to_extend[3]
    );
    println!(
        "   Output: {} ({} records)",
        configuration.general.output_path.display(),
        summary.nb_bubbles * 2
    );
    println!("   Processing time: {:.2} seconds", summary.elapsed_seconds);

    Ok(())
}
