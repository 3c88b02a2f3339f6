use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::error;

use rusbit_infohash::{engine, Config};

/// Print the BitTorrent info-hash of a .torrent file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
	/// Path to a bencoded .torrent file
	torrent: PathBuf,
}

fn run(cli: &Cli) -> anyhow::Result<String> {
	let config = Config::load().context("failed to load configuration")?;
	let hash = engine::hash_file(&cli.torrent, &config)
		.with_context(|| format!("failed to hash {}", cli.torrent.display()))?;
	Ok(hash)
}

fn main() -> ExitCode {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

	let cli = Cli::parse();
	match run(&cli) {
		Ok(hash) => {
			println!("{}", hash);
			ExitCode::SUCCESS
		}
		Err(err) => {
			error!("{:#}", err);
			eprintln!("Error: {:#}", err);
			ExitCode::FAILURE
		}
	}
}
