use honggfuzz::fuzz;

use arbitrary::*;

use gf256::{CodingLoopKind, ReedSolomon};

#[derive(Debug, Clone, Copy)]
struct RoundtripFeed<'a> {
	data_shards: usize,
	parity_shards: usize,
	kind: CodingLoopKind,
	data: &'a [u8],
}

impl<'a> Arbitrary<'a> for RoundtripFeed<'a> {
	fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
		let data_shards = u.int_in_range(1..=128)?;
		let parity_shards = u.int_in_range(1..=(256 - data_shards).min(64))?;
		let kind = *u.choose(CodingLoopKind::ALL)?;
		Ok(Self { data_shards, parity_shards, kind, data: u.bytes(u.len())? })
	}
}

fn encode(kind: CodingLoopKind, payload: &[u8], k: usize, m: usize) -> gf256::Result<Vec<Vec<u8>>> {
	let rs = ReedSolomon::with_coding_loop(k, m, kind)?;
	let mut shards = rstester::shards_from_payload(payload, k, m);
	let shard_len = shards[0].len();
	rs.encode_parity(&mut shards, 0, shard_len)?;
	Ok(shards)
}

fn reconstruct(kind: CodingLoopKind, received: Vec<Option<Vec<u8>>>, k: usize, m: usize) -> gf256::Result<Vec<Vec<u8>>> {
	let rs = ReedSolomon::with_coding_loop(k, m, kind)?;
	let shard_len = received.iter().flatten().next().map(Vec::len).unwrap_or_default();
	let present = received.iter().map(Option::is_some).collect::<Vec<bool>>();
	let mut shards = received.into_iter().map(|shard| shard.unwrap_or_else(|| vec![0u8; shard_len])).collect::<Vec<_>>();
	rs.decode_missing(&mut shards, &present, 0, shard_len)?;
	Ok(shards)
}

fn main() {
	// You have full control over the loop but
	// you're supposed to call `fuzz` ad vitam aeternam
	loop {
		fuzz!(|feed: RoundtripFeed| {
			rstester::roundtrip(
				|payload, k, m| encode(feed.kind, payload, k, m),
				|received, k, m| reconstruct(feed.kind, received, k, m),
				feed.data,
				feed.data_shards,
				feed.parity_shards,
			)
			.expect("Any k of k + m shards restore the rest. qed");
		});
	}
}
