//! CLI for the HNSW mmap index.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use hnsw_mmap_index::config::GraphParams;
use hnsw_mmap_index::persistence::{read_from_mmap, write_to_mmap};
use hnsw_mmap_index::vector::Vector;

#[derive(Parser)]
#[command(name = "hnsw-mmap")]
#[command(about = "A memory-mapped HNSW approximate-nearest-neighbor index", long_about = None)]
struct Cli {
    /// Directory holding the persisted index file.
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Initial level ceiling for a freshly-created graph.
    #[arg(long, default_value_t = GraphParams::default().max_level)]
    max_level: usize,

    /// Candidate-list width used during insertion.
    #[arg(long, default_value_t = GraphParams::default().ef)]
    ef: usize,

    /// Level-generation scale factor.
    #[arg(long, default_value_t = GraphParams::default().m_l)]
    m_l: f64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert a vector under an integer id.
    Insert {
        /// Vector id.
        id: i32,
        /// Vector data as comma-separated values (e.g. "1.0,2.0,3.0").
        #[arg(short, long)]
        vector: String,
    },
    /// Search for the k nearest neighbors of a query vector.
    Search {
        /// Query vector as comma-separated values.
        query: String,
        /// Number of results to return.
        #[arg(short, long, default_value = "5")]
        k: usize,
    },
    /// Print the effective graph construction parameters as JSON.
    PrintConfig,
}

fn parse_vector(s: &str) -> Result<Vector> {
    let data = s
        .split(',')
        .map(|part| part.trim().parse::<f32>().context("invalid vector component"))
        .collect::<Result<Vec<f32>>>()?;
    Ok(Vector::new(data))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let params = GraphParams::new(cli.max_level, cli.ef, cli.m_l);

    if matches!(cli.command, Commands::PrintConfig) {
        let json = serde_json::to_string_pretty(&params).context("failed to serialize config")?;
        println!("{json}");
        return Ok(());
    }

    let mut graph = read_from_mmap(&cli.data_dir, params, hnsw_mmap_index::config::DEFAULT_SEED)
        .context("failed to load persisted index")?;

    match cli.command {
        Commands::Insert { id, vector } => {
            let v = parse_vector(&vector)?;
            graph.insert(id, v).context("insert failed")?;
            write_to_mmap(&graph, &cli.data_dir).context("failed to persist index")?;
            println!("inserted id {id}");
        }
        Commands::Search { query, k } => {
            let q = parse_vector(&query)?;
            let results = graph.knn_search(&q, k).context("search failed")?;

            if results.is_empty() {
                println!("no results (index is empty)");
            } else {
                for (rank, (id, distance)) in results.iter().enumerate() {
                    println!("{}. id={id} distance={distance:.4}", rank + 1);
                }
            }
        }
        Commands::PrintConfig => unreachable!("handled above before loading the index"),
    }

    Ok(())
}
