use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use wikigraph::graph::GraphBuilder;
use wikigraph::output;
use wikigraph::parser::DumpReader;
use wikigraph::stats::human_duration;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "wikigraph")]
#[command(about = "Convert a Wikipedia XML dump into a link-graph edge list and node-title map")]
struct Cli {
    /// Path to the Wikipedia dump file (.xml or .xml.bz2)
    input: String,

    /// Output path for the edge-list file
    edges_output: String,

    /// Output path for the node-title file
    titles_output: String,

    /// Limit number of pages to process (for testing)
    #[arg(long)]
    limit: Option<u64>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: Cli) -> Result<()> {
    println!("Reading: {}", cli.input);
    let reader = DumpReader::open(&cli.input)?;

    let start_streaming = Instant::now();
    let mut builder = GraphBuilder::new();
    builder.ingest(reader, cli.limit)?;
    let streaming_duration = start_streaming.elapsed();
    info!(
        duration_secs = streaming_duration.as_secs_f64(),
        "Streaming pass complete"
    );

    let start_finalize = Instant::now();
    let graph = builder.finish();
    let finalize_duration = start_finalize.elapsed();
    info!(
        duration_secs = finalize_duration.as_secs_f64(),
        "Finalization complete"
    );

    let start_writing = Instant::now();
    let edges = output::write_edges(&graph, &cli.edges_output)?;
    let nodes = output::write_node_titles(&graph, &cli.titles_output)?;
    let writing_duration = start_writing.elapsed();
    info!(
        duration_secs = writing_duration.as_secs_f64(),
        "Outputs written"
    );

    let total = streaming_duration + finalize_duration + writing_duration;

    println!();
    println!("=== Summary ===");
    println!(
        "Streaming time:     {:.2}s ({})",
        streaming_duration.as_secs_f64(),
        human_duration(streaming_duration)
    );
    println!(
        "Finalization time:  {:.2}s",
        finalize_duration.as_secs_f64()
    );
    println!("Write time:         {:.2}s", writing_duration.as_secs_f64());
    println!(
        "Total time:         {:.2}s ({})",
        total.as_secs_f64(),
        human_duration(total)
    );
    println!();
    println!("Pages processed:    {}", graph.stats.pages);
    println!("Articles:           {}", graph.stats.articles);
    println!("Redirects:          {}", graph.stats.redirects);
    println!("Deferred redirects: {}", graph.stats.deferred_redirects);
    println!("Links extracted:    {}", graph.stats.links);
    println!("Edges written:      {}", edges);
    println!("Nodes written:      {}", nodes);

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    match run(cli) {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
