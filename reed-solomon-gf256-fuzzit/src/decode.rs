use honggfuzz::fuzz;

use arbitrary::*;

use rand::prelude::*;

use gf256::ReedSolomon;

#[derive(Debug, Clone)]
struct DecodeFeed {
	data_shards: usize,
	parity_shards: usize,
	shards: Vec<Vec<u8>>,
	present: Vec<bool>,
	offset: usize,
	byte_count: usize,
}

impl<'a> Arbitrary<'a> for DecodeFeed {
	fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
		// out of range on purpose, rejected configurations must not panic either
		let data_shards = u.int_in_range(0_usize..=260)?;
		let parity_shards = u.int_in_range(0_usize..=260)?;
		let shard_count = u.int_in_range(0_usize..=(data_shards + parity_shards + 1).min(300))?;
		let missing = u.int_in_range(0_usize..=shard_count)?;

		let bytes_per_shard = if shard_count > 0 { (u.len() / shard_count).min(64) } else { 0 };

		let mut rng = rand_chacha::ChaCha8Rng::from_seed([0u8; 32]);
		let iv = rand::seq::index::sample(&mut rng, shard_count, missing).into_vec();
		let present = (0..shard_count).map(|idx| !iv.contains(&idx)).collect::<Vec<bool>>();

		let mut shards = Vec::with_capacity(shard_count);
		for _ in 0..shard_count {
			let mut shard = vec![0u8; bytes_per_shard];
			u.fill_buffer(&mut shard)?;
			shards.push(shard);
		}
		// occasionally a ragged shard
		if bool::arbitrary(u)? {
			if let Some(last) = shards.last_mut() {
				last.push(0xFF);
			}
		}

		let offset = u.int_in_range(0_usize..=bytes_per_shard + 1)?;
		let byte_count = u.int_in_range(0_usize..=bytes_per_shard + 1)?;

		Ok(Self { data_shards, parity_shards, shards, present, offset, byte_count })
	}
}

fn main() {
	loop {
		fuzz!(|feed: DecodeFeed| {
			let DecodeFeed { data_shards, parity_shards, mut shards, present, offset, byte_count } = feed;
			if let Ok(rs) = ReedSolomon::new(data_shards, parity_shards) {
				let _ = rs.decode_missing(&mut shards, &present, offset, byte_count);
				let _ = rs.is_parity_correct(&shards, offset, byte_count);
			}
		});
	}
}
