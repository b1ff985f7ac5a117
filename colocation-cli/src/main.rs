//! `mine-coloc`: a small demo binary wiring CSV ingestion, the
//! synthetic generator, and the mining façade together.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colocation_core::generator::GeneratorParams;
use colocation_core::{generate, io, mine, CoLocationError};
use log::error;

#[derive(Parser)]
#[command(name = "mine-coloc", about = "Mine prevalent spatial co-location patterns")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the mining pipeline over a CSV instance table.
    Mine {
        /// Path to a `feature,idx,x,y` CSV file.
        #[arg(long)]
        input: PathBuf,
        /// Neighborhood distance threshold.
        #[arg(long = "min-dist")]
        min_dist: f64,
        /// Participation-index prevalence threshold, in `[0,1]`.
        #[arg(long = "min-prev")]
        min_prev: f64,
        /// Clique enumeration scheme: `ids` or `nds`.
        #[arg(long, default_value = "nds")]
        scheme: String,
        /// How many top prevalent patterns to print, ranked by PI.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Generate a synthetic instance table and write it to a CSV file.
    Generate {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 5)]
        cores: usize,
        #[arg(long = "instances-per-core", default_value_t = 20)]
        instances_per_core: usize,
        #[arg(long, default_value_t = 100.0)]
        side: f64,
        #[arg(long, default_value_t = 10)]
        features: usize,
        #[arg(long = "mean-core-size", default_value_t = 3.0)]
        mean_core_size: f64,
        #[arg(long, default_value_t = 500)]
        total: usize,
        #[arg(long = "min-dist", default_value_t = 2.0)]
        min_dist: f64,
        #[arg(long, default_value_t = 1)]
        clumpy: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn run(cli: Cli) -> Result<(), CoLocationError> {
    match cli.command {
        Command::Mine {
            input,
            min_dist,
            min_prev,
            scheme,
            top,
        } => {
            let dataset = io::read_instances_csv(&input)?;
            let output = mine(&dataset, min_dist, min_prev, &scheme)?;

            println!("instances:  {}", dataset.len());
            println!("cliques:    {}", output.cliques.len());
            println!("prevalent:  {}", output.prevalent.len());

            let mut ranked: Vec<(&colocation_core::FeatureSet, &f64)> = output.prevalent.iter().collect();
            ranked.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));

            println!("\ntop {} prevalent types by PI:", top.min(ranked.len()));
            for (key, pi) in ranked.into_iter().take(top) {
                let labels: Vec<&str> = key
                    .ids()
                    .map(|id| dataset.feature_names()[id].as_ref())
                    .collect();
                println!("  {{{}}}: {:.3}", labels.join(","), pi);
            }

            Ok(())
        }
        Command::Generate {
            out,
            cores,
            instances_per_core,
            side,
            features,
            mean_core_size,
            total,
            min_dist,
            clumpy,
            seed,
        } => {
            let params = GeneratorParams {
                num_cores: cores,
                instances_per_core,
                side,
                num_features: features,
                mean_core_size,
                target_total: total,
                min_dist,
                clumpy,
                seed,
            };
            let dataset = generate(&params)?;
            io::write_instances_csv(&dataset, &out)?;
            println!("wrote {} instances to {}", dataset.len(), out.display());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
