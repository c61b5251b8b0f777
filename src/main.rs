use clap::Parser;
use menu_ascii::cli::{self, Args};
use tracing_subscriber::filter::LevelFilter;

fn main() {
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();

    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
