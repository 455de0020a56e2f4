use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;

/// Environment variables consulted when the flags are absent, read once at
/// startup.
const ENV_MAP_TASKS: &str = "numberMapTasks";
const ENV_REDUCE_TASKS: &str = "numberReduceTasks";

const DEFAULT_MAP_TASKS: u32 = 3;
const DEFAULT_REDUCE_TASKS: u32 = 2;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// [OPT] Port for the driver to listen on
    #[clap(long, default_value = None, short = 'P')]
    pub port: Option<u16>,
    /// [OPT] Number of map tasks (falls back to $numberMapTasks, then 3)
    #[clap(long)]
    pub n_map: Option<u32>,
    /// [OPT] Number of reduce tasks (falls back to $numberReduceTasks, then 2)
    #[clap(long)]
    pub n_reduce: Option<u32>,
    /// [OPT] Shared working directory holding inputs/, intermediate/, out/
    #[clap(short, long)]
    pub dir: Option<PathBuf>,
}

/// Resolve the configured task counts: flag first, then environment, then
/// default. Non-positive or unparseable values are fatal before serving.
pub fn task_counts(args: &Args) -> Result<(u32, u32)> {
    let n_map = match args.n_map {
        Some(n) => n,
        None => from_env(ENV_MAP_TASKS, DEFAULT_MAP_TASKS)?,
    };
    let n_reduce = match args.n_reduce {
        Some(n) => n,
        None => from_env(ENV_REDUCE_TASKS, DEFAULT_REDUCE_TASKS)?,
    };
    ensure!(n_map > 0, "number of map tasks must be positive");
    ensure!(n_reduce > 0, "number of reduce tasks must be positive");
    Ok((n_map, n_reduce))
}

fn from_env(var: &str, default: u32) -> Result<u32> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .with_context(|| format!("${var} must be a positive integer, got `{raw}`")),
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading ${var}")),
    }
}
