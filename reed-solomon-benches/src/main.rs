use std::time::Instant;

use color_eyre::Result;
use rand::{rngs::SmallRng, SeedableRng};
use reed_solomon_gf256::{CodingLoopKind, ReedSolomon};

use reed_solomon_benches::{gf256, BYTES, N_DATA_SHARDS, N_PARITY_SHARDS, SMALL_RNG_SEED, TEST_DATA_CHUNK_SIZE};

const SHARD_LEN: usize = 200_000;
const PASSES: usize = 10;

fn main() -> Result<()> {
	color_eyre::install()?;

	for &kind in CodingLoopKind::ALL {
		reed_solomon_tester::roundtrip(
			|payload, k, m| gf256::encode_with(kind, payload, k, m),
			|received, k, m| gf256::reconstruct_with(kind, received, k, m),
			&BYTES[..TEST_DATA_CHUNK_SIZE],
			N_DATA_SHARDS,
			N_PARITY_SHARDS,
		)?;
	}

	let mut rng = SmallRng::from_seed(SMALL_RNG_SEED);
	let mut shards = reed_solomon_tester::random_shards(&mut rng, N_DATA_SHARDS + N_PARITY_SHARDS, SHARD_LEN);
	let mut temp_buffer = Vec::with_capacity(SHARD_LEN);
	let megabytes = (PASSES * N_DATA_SHARDS * SHARD_LEN) as f64 / 1_000_000.;

	println!("{:<26} {:>12} {:>12}", "coding loop", "encode MB/s", "check MB/s");
	for &kind in CodingLoopKind::ALL {
		let rs = ReedSolomon::with_coding_loop(N_DATA_SHARDS, N_PARITY_SHARDS, kind)?;

		let start = Instant::now();
		for _ in 0..PASSES {
			rs.encode_parity(&mut shards, 0, SHARD_LEN)?;
		}
		let encode = megabytes / start.elapsed().as_secs_f64();

		let start = Instant::now();
		for _ in 0..PASSES {
			color_eyre::eyre::ensure!(
				rs.is_parity_correct_with_buffer(&shards, 0, SHARD_LEN, &mut temp_buffer)?,
				"{} produced parity that does not check out",
				kind
			);
		}
		let check = megabytes / start.elapsed().as_secs_f64();

		println!("{:<26} {:>12.1} {:>12.1}", kind.name(), encode, check);
	}

	Ok(())
}
