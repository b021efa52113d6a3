//! graph-roots: command-line interface for root resolution and label reports
//!
//! Reads a node/edge CSV export (optionally gzip-compressed) and either writes the
//! full report set or prints one of its intermediate products.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use graph_roots::report::Cell;
use graph_roots::{OutputFormat as ReportFormat, Pipeline, PipelineConfig};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "graph-roots", version, about = "Graph root resolution and label reports")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "GRAPH_ROOTS_CONFIG")]
    config: Option<PathBuf>,

    /// Node records CSV (.csv or .csv.gz)
    #[arg(long, global = true, env = "GRAPH_ROOTS_NODES")]
    nodes: Option<PathBuf>,

    /// Edge records CSV (.csv or .csv.gz)
    #[arg(long, global = true, env = "GRAPH_ROOTS_EDGES")]
    edges: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Clone, clap::ValueEnum)]
enum WriteFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write both workbooks
    Run {
        /// Output directory
        #[arg(long, env = "GRAPH_ROOTS_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Report file format
        #[arg(long)]
        output_format: Option<WriteFormat>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the node-to-root mapping
    Roots {
        #[arg(long, default_value = "table")]
        format: OutputFormat,

        /// Include nodes that are their own root
        #[arg(long)]
        all: bool,
    },
    /// Print row counts per label
    Labels {
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_yaml_file(path)
            .with_context(|| format!("loading configuration from {:?}", path))?,
        None => PipelineConfig::default(),
    };
    if cli.nodes.is_some() {
        config.nodes_path = cli.nodes.clone();
    }
    if cli.edges.is_some() {
        config.edges_path = cli.edges.clone();
    }

    match cli.command {
        Commands::Run {
            output_dir,
            output_format,
            json,
        } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(format) = output_format {
                config.output_format = match format {
                    WriteFormat::Csv => ReportFormat::Csv,
                    WriteFormat::Json => ReportFormat::Json,
                };
            }
            run_pipeline(config, json)
        }
        Commands::Roots { format, all } => run_roots(config, &format, all),
        Commands::Labels { format } => run_labels(config, &format),
    }
}

fn run_pipeline(config: PipelineConfig, json: bool) -> Result<()> {
    let pipeline = Pipeline::new(config)?;
    let source = pipeline.csv_source()?;
    let mut sink = pipeline.sink();
    let summary = pipeline.run(&source, sink.as_mut())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Output:          {:?}", pipeline.config().output_dir);
    println!("Nodes:           {}", summary.ingest.nodes);
    println!("Edges:           {}", summary.ingest.edges);
    println!("Dangling edges:  {}", summary.ingest.dangling_edges);
    println!("Degraded blobs:  {}", summary.ingest.degraded_properties);
    println!("Label rows:      {}", summary.expanded_rows);
    println!("Label tables:    {}", summary.label_tables);
    println!("Roots:           {}", summary.roots.root_count);
    println!("Unresolved:      {}", summary.roots.unresolved);
    println!("Mapping rows:    {}", summary.mapping_rows);
    Ok(())
}

fn run_roots(config: PipelineConfig, format: &OutputFormat, all: bool) -> Result<()> {
    let pipeline = Pipeline::new(config)?;
    let source = pipeline.csv_source()?;
    let output = pipeline.process(&source)?;

    let columns = vec!["node_id".to_string(), "root_id".to_string()];
    let rows: Vec<Vec<Cell>> = output
        .roots
        .iter()
        .filter(|(node, root)| all || node != root)
        .map(|(node, root)| vec![Cell::from(node), Cell::from(root)])
        .collect();

    print_rows(&columns, &rows, format)
}

fn run_labels(config: PipelineConfig, format: &OutputFormat) -> Result<()> {
    let pipeline = Pipeline::new(config)?;
    let source = pipeline.csv_source()?;
    let (store, _) = pipeline.load(&source)?;
    let separator = &pipeline.config().report.label_separator;

    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for row in graph_roots::expand_nodes(&store, separator) {
        *counts.entry(row.primary_label.to_string()).or_insert(0) += 1;
    }

    let columns = vec!["label".to_string(), "rows".to_string()];
    let rows: Vec<Vec<Cell>> = counts
        .into_iter()
        .map(|(label, count)| vec![Cell::from(label), Cell::from(count)])
        .collect();

    print_rows(&columns, &rows, format)
}

fn print_rows(columns: &[String], rows: &[Vec<Cell>], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let mut objects = Vec::with_capacity(rows.len());
            for row in rows {
                let mut object = serde_json::Map::new();
                for (column, cell) in columns.iter().zip(row) {
                    object.insert(column.clone(), serde_json::to_value(cell)?);
                }
                objects.push(serde_json::Value::Object(object));
            }
            println!("{}", serde_json::to_string_pretty(&objects)?);
        }
        OutputFormat::Csv => {
            println!("{}", columns.join(","));
            for row in rows {
                let cells: Vec<String> = row.iter().map(format_csv_value).collect();
                println!("{}", cells.join(","));
            }
        }
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("(no results)");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(columns.to_vec());
            for row in rows {
                let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                table.add_row(cells);
            }

            println!("{}", table);
            println!("{} row(s)", rows.len());
        }
    }

    Ok(())
}

fn format_csv_value(v: &Cell) -> String {
    let s = v.to_string();
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s
    }
}
