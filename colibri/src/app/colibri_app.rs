use std::path::Path;

use clap::{Parser, Subcommand};
use colibri_core::model::cell::cell_ops::{resolution_from_u8, DEFAULT_RESOLUTION};
use serde::{Deserialize, Serialize};

use crate::pipeline::config::PipelineConfig;
use crate::pipeline::enrich::DEFAULT_CHUNK_SIZE;
use crate::pipeline::PipelineError;

/// Command line tool for estimating cost of living from mobility traces and
/// property listings
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct ColibriApp {
    #[command(subcommand)]
    pub op: ColibriOperation,
}

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum ColibriOperation {
    /// append an H3 cell column to a raw mobility trace file
    Enrich {
        /// mobility trace parquet file with lat and lon columns
        #[arg(short, long)]
        input_file: String,

        /// location on disk to write the enriched parquet file
        #[arg(short, long)]
        output_file: String,

        /// cell grid resolution, in [0, 15]. defaults to 8
        #[arg(short, long)]
        resolution: Option<u8>,

        /// rows processed per chunk. defaults to 1000000
        #[arg(short, long)]
        chunk_size: Option<usize>,
    },
    /// build per-location feature vectors from the input datasets
    Features {
        /// configuration file naming the input files and pipeline parameters
        #[arg(short, long)]
        configuration_file: String,

        /// location on disk to write output files. if not provided,
        /// use the current working directory.
        #[arg(short, long)]
        output_directory: Option<String>,
    },
    /// fit the regression model and report mean absolute error on a held-out split
    Evaluate {
        /// configuration file naming the input files and pipeline parameters
        #[arg(short, long)]
        configuration_file: String,

        /// location on disk to write output files. if not provided,
        /// use the current working directory.
        #[arg(short, long)]
        output_directory: Option<String>,
    },
}

impl ColibriOperation {
    pub fn run(&self) -> Result<(), PipelineError> {
        match self {
            ColibriOperation::Enrich {
                input_file,
                output_file,
                resolution,
                chunk_size,
            } => {
                let resolution = match resolution {
                    None => DEFAULT_RESOLUTION,
                    Some(value) => resolution_from_u8(*value)?,
                };
                let chunk_size = chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
                crate::app::enrich::run(input_file, output_file, resolution, chunk_size)
            }
            ColibriOperation::Features {
                configuration_file,
                output_directory,
            } => {
                let config = PipelineConfig::from_file(configuration_file)?;
                let outdir = match output_directory {
                    Some(out) => Path::new(out),
                    None => Path::new(""),
                };
                crate::app::features::run(&config, outdir)
            }
            ColibriOperation::Evaluate {
                configuration_file,
                output_directory,
            } => {
                let config = PipelineConfig::from_file(configuration_file)?;
                let outdir = match output_directory {
                    Some(out) => Path::new(out),
                    None => Path::new(""),
                };
                crate::app::evaluate::run(&config, outdir)
            }
        }
    }
}
