use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Connect to a driver at the given address and port
    #[clap(short, long, default_value = "localhost:50051")]
    pub join: String,
    /// [OPT] Shared working directory holding inputs/, intermediate/, out/
    #[clap(short, long)]
    pub dir: Option<PathBuf>,
}
