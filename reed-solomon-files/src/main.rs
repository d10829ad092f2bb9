//! `rs-shards` splits a file into Reed-Solomon shard files and restores it.
//!
//! ```text
//! rs-shards encode movie.mkv              # movie.mkv.0 .. movie.mkv.5
//! rs-shards -k 10 -m 4 encode movie.mkv   # movie.mkv.0 .. movie.mkv.13
//! rs-shards decode movie.mkv              # movie.mkv.decoded
//! rs-shards verify movie.mkv
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use reed_solomon_gf256::{CodeParams, CodingLoopKind};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rs-shards", version, about = "Reed-Solomon shard files")]
struct Cli {
	/// Number of data shards.
	#[arg(short = 'k', long, global = true, env = "RS_DATA_SHARDS", default_value_t = 4)]
	data_shards: usize,

	/// Number of parity shards, the number of shard files that may be lost.
	#[arg(short = 'm', long, global = true, env = "RS_PARITY_SHARDS", default_value_t = 2)]
	parity_shards: usize,

	/// Loop order used for the matrix multiplications.
	#[arg(long, global = true, env = "RS_CODING_LOOP", default_value_t = CodingLoopKind::default())]
	coding_loop: CodingLoopKind,

	/// Log filter, overridden by `RUST_LOG`.
	#[arg(long, global = true, env = "RS_LOG", default_value = "info")]
	log: String,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Write the shard files of FILE next to it.
	Encode { file: PathBuf },

	/// Restore FILE to FILE.decoded, rewriting lost shard files.
	Decode { file: PathBuf },

	/// Check the shard files of FILE are consistent.
	Verify { file: PathBuf },
}

fn setup_tracing(level: &str) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
	color_eyre::install()?;
	let cli = Cli::parse();
	setup_tracing(&cli.log);

	let params = CodeParams::new(cli.data_shards, cli.parity_shards)?;

	match cli.command {
		Commands::Encode { file } => {
			let written = reed_solomon_files::encode_file(&file, params, cli.coding_loop)
				.wrap_err_with(|| format!("Failed to encode {}", file.display()))?;
			for path in written {
				println!("{}", path.display());
			}
		}
		Commands::Decode { file } => {
			let decoded = reed_solomon_files::decode_file(&file, params, cli.coding_loop)
				.wrap_err_with(|| format!("Failed to decode {}", file.display()))?;
			println!("{}", decoded.display());
		}
		Commands::Verify { file } => {
			let correct = reed_solomon_files::verify_files(&file, params)
				.wrap_err_with(|| format!("Failed to verify {}", file.display()))?;
			if !correct {
				bail!("Parity of {} does not match its data shards", file.display());
			}
			println!("ok");
		}
	}

	Ok(())
}
