use itertools::Itertools;
use rand::prelude::*;
use rand::seq::index::IndexVec;
use std::error;
use std::fmt;
use std::result;

pub static SMALL_RNG_SEED: [u8; 32] = [
	0, 6, 0xFA, 0, 0x37, 3, 19, 89, 32, 032, 0x37, 0x77, 77, 0b11, 112, 52, 12, 40, 82, 34, 0, 0, 0, 1, 4, 4, 1, 4, 99,
	127, 121, 107,
];

/// Demo test data, generated via `build.rs`.
pub const BYTES: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/rand_data.bin"));

/// Shared number of data shards for simple, quirk turnaround tests:
pub const N_DATA_SHARDS: usize = 17;
/// Shared number of parity shards for simple, quirk turnaround tests:
pub const N_PARITY_SHARDS: usize = 3;
/// Shared target number of payload size for simple, quirk turnaround tests:
pub const TEST_DATA_CHUNK_SIZE: usize = 1337;

/// `count` shards of `shard_len` random bytes each.
pub fn random_shards(rng: &mut impl Rng, count: usize, shard_len: usize) -> Vec<Vec<u8>> {
	(0..count)
		.map(|_| {
			let mut shard = vec![0u8; shard_len];
			rng.fill_bytes(&mut shard);
			shard
		})
		.collect()
}

/// Spread `payload` over `data_shards` equally sized, zero padded shards,
/// followed by `parity_shards` zeroed shards.
pub fn shards_from_payload(payload: &[u8], data_shards: usize, parity_shards: usize) -> Vec<Vec<u8>> {
	assert!(data_shards > 0);
	let shard_len = ((payload.len() + data_shards - 1) / data_shards).max(1);
	let mut shards = vec![vec![0u8; shard_len]; data_shards + parity_shards];
	for (shard, chunk) in shards.iter_mut().zip(payload.chunks(shard_len)) {
		shard[..chunk.len()].copy_from_slice(chunk);
	}
	shards
}

/// Every way of erasing between one and `max_erasures` of `n` shards.
pub fn erasure_patterns(n: usize, max_erasures: usize) -> impl Iterator<Item = Vec<usize>> {
	(1..=max_erasures.min(n)).flat_map(move |count| (0..n).combinations(count))
}

/// Assert the shards at the dropped indices are recovered properly, and
/// nothing else changed.
pub fn assert_recovery<S>(original: &[S], recovered: &[S], dropped_indices: IndexVec)
where
	S: AsRef<[u8]> + fmt::Debug,
{
	assert_eq!(original.len(), recovered.len());

	dropped_indices.into_iter().for_each(|dropped_idx| {
		assert_eq!(
			original[dropped_idx].as_ref(),
			recovered[dropped_idx].as_ref(),
			"Shard #{} must be restored",
			dropped_idx
		);
	});
	for (idx, (original, recovered)) in original.iter().zip(recovered).enumerate() {
		assert_eq!(original.as_ref(), recovered.as_ref(), "Shard #{} must match", idx);
	}
}

/// Drop half the tolerated shards at the beginning, and the rest at the end.
pub fn deterministic_drop_shards<T: Sized, G: rand::SeedableRng + rand::Rng>(
	codewords: &mut [Option<T>],
	n: usize,
	k: usize,
	_rng: &mut G,
) -> IndexVec {
	let l = codewords.len();
	let tolerated = n - k;
	let mut v = Vec::with_capacity(tolerated);
	let half = tolerated >> 1;
	for i in 0..half {
		codewords[i] = None;
		v.push(i);
	}
	// shards beyond `l` were already dropped implicitly
	for i in n - (tolerated - half)..n {
		if i < l {
			codewords[i] = None;
			v.push(i);
		}
	}
	IndexVec::from(v)
}

pub fn deterministic_drop_shards_clone<T: Sized + Clone>(
	codewords: &[T],
	n: usize,
	k: usize,
) -> (Vec<Option<T>>, IndexVec) {
	let mut rng = SmallRng::from_seed(SMALL_RNG_SEED);
	let mut codewords = codewords.iter().map(|x| Some(x.clone())).collect::<Vec<Option<T>>>();
	let idx = deterministic_drop_shards::<T, SmallRng>(&mut codewords, n, k, &mut rng);
	assert!(idx.len() <= n - k);
	(codewords, idx)
}

/// Drop exactly `n - k` randomly chosen shards.
pub fn drop_random_max<T: Sized>(shards: &mut [Option<T>], n: usize, k: usize, rng: &mut impl rand::Rng) -> IndexVec {
	let l = shards.len();
	let already_dropped = n.saturating_sub(l);
	let iv = rand::seq::index::sample(rng, l, n - k - already_dropped);
	iv.iter().for_each(|idx| {
		shards[idx] = None;
	});
	let kept_count = shards.iter().filter(|shard| shard.is_some()).count();
	assert_eq!(kept_count, k);
	iv
}

/// Encode `payload` into `k + m` shards, drop `m` of them at random and
/// assert `reconstruct` restores every shard.
pub fn roundtrip<Enc, Recon, S, E>(
	encode: Enc,
	reconstruct: Recon,
	payload: &[u8],
	data_shards: usize,
	parity_shards: usize,
) -> result::Result<(), E>
where
	Enc: Fn(&[u8], usize, usize) -> result::Result<Vec<S>, E>,
	Recon: Fn(Vec<Option<S>>, usize, usize) -> result::Result<Vec<S>, E>,
	E: error::Error + Send + Sync + 'static,
	S: Clone + AsRef<[u8]> + fmt::Debug,
{
	roundtrip_w_drop_closure::<Enc, Recon, _, SmallRng, S, E>(
		encode,
		reconstruct,
		payload,
		data_shards,
		parity_shards,
		drop_random_max,
	)
}

pub fn roundtrip_w_drop_closure<Enc, Recon, DropFun, RandGen, S, E>(
	encode: Enc,
	reconstruct: Recon,
	payload: &[u8],
	data_shards: usize,
	parity_shards: usize,
	mut drop_rand: DropFun,
) -> result::Result<(), E>
where
	E: error::Error + Send + Sync + 'static,
	S: Clone + AsRef<[u8]> + fmt::Debug,
	Enc: Fn(&[u8], usize, usize) -> result::Result<Vec<S>, E>,
	Recon: Fn(Vec<Option<S>>, usize, usize) -> result::Result<Vec<S>, E>,
	DropFun: for<'z> FnMut(&'z mut [Option<S>], usize, usize, &mut RandGen) -> IndexVec,
	RandGen: rand::Rng + rand::SeedableRng<Seed = [u8; 32]>,
{
	let mut rng = <RandGen as rand::SeedableRng>::from_seed(SMALL_RNG_SEED);
	let n = data_shards + parity_shards;

	// Construct the shards
	let shards = encode(payload, data_shards, parity_shards)?;
	assert_eq!(shards.len(), n);

	let mut received_shards = shards.iter().cloned().map(Some).collect::<Vec<Option<S>>>();
	let dropped_indices = drop_rand(received_shards.as_mut_slice(), n, data_shards, &mut rng);

	let recovered = reconstruct(received_shards, data_shards, parity_shards)?;

	assert_recovery(&shards, &recovered, dropped_indices);

	// The payload is laid out across the data shards in order.
	let restored = recovered.iter().take(data_shards).flat_map(|shard| shard.as_ref().iter().copied()).collect::<Vec<u8>>();
	assert_eq!(&restored[..payload.len()], payload);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn payload_spreads_in_order() {
		let shards = shards_from_payload(&[1, 2, 3, 4, 5], 2, 1);
		assert_eq!(shards, vec![vec![1, 2, 3], vec![4, 5, 0], vec![0, 0, 0]]);
		assert_eq!(shards_from_payload(&[], 3, 2), vec![vec![0u8]; 5]);
	}

	#[test]
	fn deterministic_drop_splits_front_and_back() {
		let (codewords, idx) = deterministic_drop_shards_clone(&[0u8, 1, 2, 3, 4, 5, 6], 7, 4);
		assert_eq!(idx.into_vec(), vec![0, 5, 6]);
		assert_eq!(codewords, vec![None, Some(1), Some(2), Some(3), Some(4), None, None]);
	}

	#[test]
	fn random_drop_keeps_exactly_k() {
		let mut rng = SmallRng::from_seed(SMALL_RNG_SEED);
		let mut shards = (0..20).map(Some).collect::<Vec<_>>();
		let idx = drop_random_max(&mut shards, 20, 17, &mut rng);
		assert_eq!(idx.len(), 3);
		assert!(idx.iter().all(|i| shards[i].is_none()));
	}

	#[test]
	fn erasure_pattern_count() {
		// 6 + 15
		assert_eq!(erasure_patterns(6, 2).count(), 21);
		assert!(erasure_patterns(6, 2).all(|p| !p.is_empty() && p.len() <= 2));
	}
}
