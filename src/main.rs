// Dance Skeleton 🕺 AGPL-3.0 License

use clap::Parser;

use dance_skeleton::cli::args::{Cli, Commands};
use dance_skeleton::cli::process::run_processing;

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => run_processing(&args),
    }
}
