pub mod audit;
pub mod classifier;
pub mod clean;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fields;
pub mod frame;
pub mod impute;
pub mod io_utils;
pub mod loader;
pub mod merge;
pub mod pipeline;
pub mod reconcile;
pub mod table;
pub mod value;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("toyset_pipeline", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => pipeline::execute(&args),
        Commands::Audit(args) => audit::execute(&args),
    }
}
