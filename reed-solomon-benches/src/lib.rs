pub use reed_solomon_tester::{BYTES, N_DATA_SHARDS, N_PARITY_SHARDS, SMALL_RNG_SEED, TEST_DATA_CHUNK_SIZE};

pub mod gf256 {
	use reed_solomon_gf256::{CodingLoopKind, ReedSolomon, Result};
	use reed_solomon_tester::shards_from_payload;

	/// Spread `payload` over `k` data shards and compute `m` parity shards.
	pub fn encode_with(kind: CodingLoopKind, payload: &[u8], k: usize, m: usize) -> Result<Vec<Vec<u8>>> {
		let rs = ReedSolomon::with_coding_loop(k, m, kind)?;
		let mut shards = shards_from_payload(payload, k, m);
		let shard_len = shards[0].len();
		rs.encode_parity(&mut shards, 0, shard_len)?;
		Ok(shards)
	}

	/// Restore all `k + m` shards from the received ones.
	pub fn reconstruct_with(
		kind: CodingLoopKind,
		received: Vec<Option<Vec<u8>>>,
		k: usize,
		m: usize,
	) -> Result<Vec<Vec<u8>>> {
		let rs = ReedSolomon::with_coding_loop(k, m, kind)?;
		let shard_len = received.iter().flatten().next().map(Vec::len).unwrap_or_default();
		let present = received.iter().map(Option::is_some).collect::<Vec<bool>>();
		let mut shards = received.into_iter().map(|shard| shard.unwrap_or_else(|| vec![0u8; shard_len])).collect::<Vec<_>>();
		rs.decode_missing(&mut shards, &present, 0, shard_len)?;
		Ok(shards)
	}

	pub fn encode(payload: &[u8], k: usize, m: usize) -> Result<Vec<Vec<u8>>> {
		encode_with(CodingLoopKind::default(), payload, k, m)
	}

	pub fn reconstruct(received: Vec<Option<Vec<u8>>>, k: usize, m: usize) -> Result<Vec<Vec<u8>>> {
		reconstruct_with(CodingLoopKind::default(), received, k, m)
	}
}

#[cfg(test)]
mod test {
	use super::gf256::*;
	use super::*;
	use reed_solomon_gf256::CodingLoopKind;
	use reed_solomon_tester::roundtrip;

	#[test]
	fn every_coding_loop_roundtrips() {
		for &kind in CodingLoopKind::ALL {
			roundtrip(
				|payload, k, m| encode_with(kind, payload, k, m),
				|received, k, m| reconstruct_with(kind, received, k, m),
				&BYTES[..TEST_DATA_CHUNK_SIZE],
				N_DATA_SHARDS,
				N_PARITY_SHARDS,
			)
			.unwrap();
		}
	}

	#[test]
	fn default_roundtrip() {
		roundtrip(encode, reconstruct, &BYTES[..TEST_DATA_CHUNK_SIZE], 4, 2).unwrap();
	}
}
