use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::{
    signal,
    time::{MissedTickBehavior, interval},
};

use crate::{flow::Flow, host::Message, prelude::*};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    /// Flow file with the inverters and the controls.
    #[clap(long = "config", env = "FLOW_CONFIG", default_value = "flow.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deliver a single message to a control and print what it forwards.
    #[clap(name = "trigger")]
    Trigger(TriggerArgs),

    /// Trigger the controls periodically until interrupted.
    #[clap(name = "poll")]
    Poll(PollArgs),

    /// List the configured controls.
    #[clap(name = "list")]
    List,
}

#[derive(Parser)]
pub struct TriggerArgs {
    #[clap(long, env = "CONTROL")]
    control: String,

    /// Incoming message as a JSON object, its `payload` gets replaced.
    #[clap(long, default_value = "{}")]
    message: Message,
}

impl TriggerArgs {
    #[instrument(skip_all, fields(control = %self.control))]
    pub async fn run(self, flow: &Flow) -> Result {
        flow.dispatcher(&self.control)?
            .trigger(self.message)
            .await
            .context("the trigger task has failed")
    }
}

#[derive(Parser)]
pub struct PollArgs {
    #[clap(
        long = "control",
        env = "CONTROLS",
        value_delimiter = ',',
        num_args = 1..,
        required = true,
    )]
    controls: Vec<String>,

    #[clap(long, env = "POLL_INTERVAL", default_value = "10s")]
    interval: humantime::Duration,
}

impl PollArgs {
    /// Each tick fires independent triggers, a failed query is simply reported and left alone.
    #[instrument(skip_all, fields(interval = %self.interval))]
    pub async fn run(self, flow: &Flow) -> Result {
        let dispatchers = self
            .controls
            .iter()
            .map(|id| flow.dispatcher(id).cloned())
            .collect::<Result<Vec<_>>>()?;

        let mut interval = interval(self.interval.into());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    debug!(n_controls = dispatchers.len(), "tick");
                    for dispatcher in &dispatchers {
                        drop(dispatcher.trigger(Message::default()));
                    }
                }
                result = signal::ctrl_c() => {
                    result.context("failed to listen for Ctrl-C")?;
                    info!("interrupted");
                    return Ok(());
                }
            }
        }
    }
}
