#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod config;
mod dispatcher;
mod flow;
mod host;
mod prelude;
mod registry;
mod tables;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use clap::{Parser, crate_version};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{SolarApi, fronius},
    cli::{Args, Command},
    config::FlowConfig,
    flow::Flow,
    host::{ConsoleHost, Host},
    prelude::*,
    tables::build_controls_table,
};

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .compact()
        .init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let config = FlowConfig::read(&args.config)?;
    let api: Arc<dyn SolarApi> = Arc::new(fronius::Api::new(config.timeout)?);
    let host: Arc<dyn Host> = Arc::new(ConsoleHost);
    let flow = Flow::new(&config, &api, &host)?;

    match args.command {
        Command::Trigger(args) => args.run(&flow).await?,
        Command::Poll(args) => args.run(&flow).await?,
        Command::List => println!("{}", build_controls_table(&config, &flow)?),
    }

    info!("done!");
    Ok(())
}
