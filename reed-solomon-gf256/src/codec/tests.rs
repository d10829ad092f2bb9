use super::*;

use assert_matches::assert_matches;
use itertools::Itertools;
use rand::prelude::*;
use rand::rngs::SmallRng;
use reed_solomon_tester::*;

fn encode(payload: &[u8], data_shards: usize, parity_shards: usize) -> Result<Vec<Vec<u8>>> {
	let rs = ReedSolomon::new(data_shards, parity_shards)?;
	let mut shards = shards_from_payload(payload, data_shards, parity_shards);
	let shard_len = shards[0].len();
	rs.encode_parity(&mut shards, 0, shard_len)?;
	Ok(shards)
}

fn reconstruct(received: Vec<Option<Vec<u8>>>, data_shards: usize, parity_shards: usize) -> Result<Vec<Vec<u8>>> {
	let rs = ReedSolomon::new(data_shards, parity_shards)?;
	let shard_len = received.iter().flatten().next().map(Vec::len).unwrap_or_default();
	let present = received.iter().map(Option::is_some).collect::<Vec<bool>>();
	let mut shards = received.into_iter().map(|shard| shard.unwrap_or_else(|| vec![0u8; shard_len])).collect::<Vec<_>>();
	rs.decode_missing(&mut shards, &present, 0, shard_len)?;
	Ok(shards)
}

/// Overwrite the `erased` shards with garbage, restore them and compare.
fn assert_restores(rs: &ReedSolomon, encoded: &[Vec<u8>], erased: &[usize]) {
	let shard_len = encoded[0].len();
	let mut shards = encoded.to_vec();
	let mut present = vec![true; encoded.len()];
	for &idx in erased {
		shards[idx].iter_mut().for_each(|b| *b = 0xEE);
		present[idx] = false;
	}
	rs.decode_missing(&mut shards, &present, 0, shard_len).unwrap();
	assert_eq!(shards, encoded, "{:?} failed to restore erased {:?}", rs, erased);
}

fn encoded_random(rs: &ReedSolomon, rng: &mut impl Rng, shard_len: usize) -> Vec<Vec<u8>> {
	let mut shards = random_shards(rng, rs.total_shard_count(), shard_len);
	rs.encode_parity(&mut shards, 0, shard_len).unwrap();
	shards
}

#[test]
fn known_parity_5_plus_5() {
	let rs = ReedSolomon::new(5, 5).unwrap();
	let mut shards = vec![vec![0u8, 1], vec![4, 5], vec![2, 3], vec![6, 7], vec![8, 9]];
	shards.extend(std::iter::repeat(vec![0u8; 2]).take(5));
	rs.encode_parity(&mut shards, 0, 2).unwrap();
	assert_eq!(shards[5..], [vec![12u8, 13], vec![10, 11], vec![14, 15], vec![90, 91], vec![94, 95]]);
}

#[test]
fn known_parity_4_plus_2() {
	let rs = ReedSolomon::new(4, 2).unwrap();
	let matrix = rs.encoding_matrix();
	assert_eq!(matrix.submatrix(0, 0, 4, 4).unwrap(), Matrix::identity(4));
	assert_eq!(matrix.row_bytes(4), vec![27, 28, 18, 20]);
	assert_eq!(matrix.row_bytes(5), vec![28, 27, 20, 18]);

	let mut shards = (0u8..4).map(|i| (4 * i..4 * i + 4).collect::<Vec<u8>>()).collect::<Vec<_>>();
	shards.extend([vec![0u8; 4], vec![0u8; 4]]);
	rs.encode_parity(&mut shards, 0, 4).unwrap();
	assert_eq!(shards[4], vec![16, 17, 18, 19]);
	assert_eq!(shards[5], vec![20, 21, 22, 23]);
	assert!(rs.is_parity_correct(&shards, 0, 4).unwrap());
}

#[test]
fn single_data_shard_mirrors() {
	let rs = ReedSolomon::new(1, 1).unwrap();
	assert_eq!(rs.encoding_matrix().to_string(), "[[1], [1]]");

	let mut shards = vec![vec![7u8, 0, 255], vec![0u8; 3]];
	rs.encode_parity(&mut shards, 0, 3).unwrap();
	assert_eq!(shards[1], shards[0]);

	let rs = ReedSolomon::new(2, 1).unwrap();
	assert_eq!(rs.encoding_matrix().row_bytes(2), vec![3, 2]);
	let mut shards = vec![vec![1u8, 0], vec![0, 1], vec![0, 0]];
	rs.encode_parity(&mut shards, 0, 2).unwrap();
	assert_eq!(shards[2], vec![3, 2]);
}

#[test]
fn recover_every_pair_4_plus_2() {
	let rs = ReedSolomon::new(4, 2).unwrap();
	let mut encoded = shards_from_payload(&(0u8..16).collect::<Vec<_>>(), 4, 2);
	rs.encode_parity(&mut encoded, 0, 4).unwrap();
	assert_eq!(encoded[4], vec![16, 17, 18, 19]);

	for erased in (0..6).combinations(2) {
		assert_restores(&rs, &encoded, &erased);
	}
}

#[test]
fn every_k_rows_of_the_encoding_matrix_invert() {
	for (k, m) in [(2, 2), (3, 3), (4, 2), (5, 5), (6, 3)] {
		let rs = ReedSolomon::new(k, m).unwrap();
		for rows in (0..k + m).combinations(k) {
			let selected = rs.encoding_matrix().select_rows(&rows).unwrap();
			let inverse = selected.invert().unwrap_or_else(|e| panic!("rows {:?} of {:?}: {}", rows, rs, e));
			assert_eq!(selected.times(&inverse).unwrap(), Matrix::identity(k));
		}
	}
}

#[test]
fn data_shards_are_left_untouched() {
	let mut rng = SmallRng::from_seed(SMALL_RNG_SEED);
	for (k, m) in [(1, 1), (3, 2), (10, 4), (N_DATA_SHARDS, N_PARITY_SHARDS)] {
		let rs = ReedSolomon::new(k, m).unwrap();
		assert_eq!(rs.encoding_matrix().submatrix(0, 0, k, k).unwrap(), Matrix::identity(k));

		let original = random_shards(&mut rng, k + m, 50);
		let mut shards = original.clone();
		rs.encode_parity(&mut shards, 0, 50).unwrap();
		assert_eq!(shards[..k], original[..k]);
	}
}

#[test]
fn any_k_shards_suffice_small_codes() {
	let mut rng = SmallRng::from_seed(SMALL_RNG_SEED);
	for (k, m) in [(1, 1), (1, 3), (2, 1), (2, 2), (3, 2), (3, 3), (4, 4), (5, 3)] {
		let rs = ReedSolomon::new(k, m).unwrap();
		let encoded = encoded_random(&rs, &mut rng, 11);
		for erased in erasure_patterns(k + m, m) {
			assert_restores(&rs, &encoded, &erased);
		}
	}
}

#[test]
fn any_k_shards_suffice_large_codes() {
	let mut rng = SmallRng::from_seed(SMALL_RNG_SEED);
	for (k, m) in [(N_DATA_SHARDS, N_PARITY_SHARDS), (50, 30), (128, 128), (200, 56)] {
		let rs = ReedSolomon::new(k, m).unwrap();
		let encoded = encoded_random(&rs, &mut rng, 8);
		for _ in 0..4 {
			let erased = rand::seq::index::sample(&mut rng, k + m, m).into_vec();
			assert_restores(&rs, &encoded, &erased);
		}
	}
}

#[test]
fn boundary_shard_counts() {
	let mut rng = SmallRng::from_seed(SMALL_RNG_SEED);
	for (k, m) in [(255, 1), (1, 255)] {
		let rs = ReedSolomon::new(k, m).unwrap();
		assert_eq!(rs.total_shard_count(), 256);
		let encoded = encoded_random(&rs, &mut rng, 4);
		assert!(rs.is_parity_correct(&encoded, 0, 4).unwrap());

		let erased = rand::seq::index::sample(&mut rng, k + m, m).into_vec();
		assert_restores(&rs, &encoded, &erased);
	}
}

#[test]
fn invalid_configurations() {
	for (k, m) in [(0, 2), (4, 0), (0, 0), (200, 57), (256, 1), (1, 256)] {
		assert_matches!(
			ReedSolomon::new(k, m),
			Err(Error::InvalidConfiguration { data_shards, parity_shards }) if data_shards == k && parity_shards == m
		);
	}
	assert_eq!(CodeParams::new(200, 56).unwrap().total_shards(), 256);
}

#[test]
fn too_few_shards_present() {
	let rs = ReedSolomon::new(4, 2).unwrap();
	let mut shards = vec![vec![0u8; 8]; 6];
	assert_matches!(
		rs.decode_missing(&mut shards, &[true, false, true, false, false, true], 0, 8),
		Err(Error::InsufficientShards { have: 3, min: 4, all: 6 })
	);
}

#[test]
fn shape_mismatches() {
	let rs = ReedSolomon::new(4, 2).unwrap();

	let mut shards = vec![vec![0u8; 8]; 5];
	assert_matches!(
		rs.encode_parity(&mut shards, 0, 8),
		Err(Error::DimensionMismatch(Mismatch::ShardCount { have: 5, want: 6 }))
	);

	let mut shards = vec![vec![0u8; 8]; 6];
	shards[3] = vec![0u8; 7];
	assert_matches!(
		rs.encode_parity(&mut shards, 0, 7),
		Err(Error::DimensionMismatch(Mismatch::ShardLength { index: 3, have: 7, want: 8 }))
	);

	let mut shards = vec![vec![0u8; 8]; 6];
	assert_matches!(
		rs.encode_parity(&mut shards, 4, 5),
		Err(Error::DimensionMismatch(Mismatch::ByteWindow { offset: 4, byte_count: 5, shard_len: 8 }))
	);
	assert_matches!(
		rs.is_parity_correct(&shards, usize::MAX, 2),
		Err(Error::DimensionMismatch(Mismatch::ByteWindow { .. }))
	);
	assert_matches!(
		rs.decode_missing(&mut shards, &[true; 5], 0, 8),
		Err(Error::DimensionMismatch(Mismatch::ErasurePattern { have: 5, want: 6 }))
	);
}

#[test]
fn detects_every_single_byte_corruption() {
	let rs = ReedSolomon::new(4, 2).unwrap();
	let mut rng = SmallRng::from_seed(SMALL_RNG_SEED);
	let encoded = encoded_random(&rs, &mut rng, 16);
	let mut temp_buffer = Vec::new();
	assert!(rs.is_parity_correct_with_buffer(&encoded, 0, 16, &mut temp_buffer).unwrap());

	for idx in 0..6 {
		for p in 0..16 {
			let mut shards = encoded.clone();
			shards[idx][p] ^= 0x5A;
			assert!(!rs.is_parity_correct_with_buffer(&shards, 0, 16, &mut temp_buffer).unwrap(), "shard {} byte {}", idx, p);
			// corruption outside the checked window goes unnoticed
			let (offset, byte_count) = if p < 8 { (8, 8) } else { (0, 8) };
			assert!(rs.is_parity_correct_with_buffer(&shards, offset, byte_count, &mut temp_buffer).unwrap());
		}
	}
}

#[test]
fn all_coding_loops_agree() {
	let mut rng = SmallRng::from_seed(SMALL_RNG_SEED);
	let reference = ReedSolomon::new(N_DATA_SHARDS, N_PARITY_SHARDS).unwrap();
	let expected = encoded_random(&reference, &mut rng, 123);

	for &kind in CodingLoopKind::ALL {
		let rs = ReedSolomon::with_coding_loop(N_DATA_SHARDS, N_PARITY_SHARDS, kind).unwrap();
		assert_eq!(rs.coding_loop(), kind);

		let mut shards = expected.clone();
		shards[N_DATA_SHARDS..].iter_mut().for_each(|shard| shard.fill(0));
		rs.encode_parity(&mut shards, 0, 123).unwrap();
		assert_eq!(shards, expected, "{} encodes differently", kind);
		assert!(rs.is_parity_correct(&shards, 0, 123).unwrap());

		assert_restores(&rs, &expected, &[0, 9, N_DATA_SHARDS + 1]);
		assert_restores(&rs, &expected, &[N_DATA_SHARDS, N_DATA_SHARDS + 1, N_DATA_SHARDS + 2]);
	}
}

#[test]
fn windows_leave_other_bytes_alone() {
	let rs = ReedSolomon::new(5, 3).unwrap();
	let mut rng = SmallRng::from_seed(SMALL_RNG_SEED);
	let full = encoded_random(&rs, &mut rng, 64);

	let mut shards = full.clone();
	shards[5..].iter_mut().for_each(|shard| shard.fill(0));
	rs.encode_parity(&mut shards, 10, 20).unwrap();
	for parity in 5..8 {
		assert_eq!(shards[parity][10..30], full[parity][10..30]);
		assert!(shards[parity][..10].iter().chain(&shards[parity][30..]).all(|&b| b == 0));
	}
	assert!(rs.is_parity_correct(&shards, 10, 20).unwrap());
	assert!(rs.is_parity_correct(&shards, 12, 0).unwrap());

	let mut shards = full.clone();
	let mut present = vec![true; 8];
	for idx in [1, 3, 6] {
		shards[idx].fill(0);
		present[idx] = false;
	}
	rs.decode_missing(&mut shards, &present, 40, 24).unwrap();
	for idx in [1, 3, 6] {
		assert_eq!(shards[idx][40..], full[idx][40..]);
		assert!(shards[idx][..40].iter().all(|&b| b == 0));
	}
}

#[test]
fn decode_with_everything_present_is_a_no_op() {
	let rs = ReedSolomon::new(3, 2).unwrap();
	let mut shards = vec![vec![1u8; 4], vec![2; 4], vec![3; 4], vec![0xAB; 4], vec![0xCD; 4]];
	let before = shards.clone();
	rs.decode_missing(&mut shards, &[true; 5], 0, 4).unwrap();
	assert_eq!(shards, before);
}

#[test]
fn concurrent_disjoint_windows() {
	let rs = ReedSolomon::new(N_DATA_SHARDS, N_PARITY_SHARDS).unwrap();
	let mut rng = SmallRng::from_seed(SMALL_RNG_SEED);
	let expected = encoded_random(&rs, &mut rng, 1000);

	let mut shards = expected.clone();
	shards[N_DATA_SHARDS..].iter_mut().for_each(|shard| shard.fill(0));
	let (mut front, mut back): (Vec<&mut [u8]>, Vec<&mut [u8]>) =
		shards.iter_mut().map(|shard| shard.split_at_mut(500)).unzip();

	std::thread::scope(|s| {
		let rs = &rs;
		s.spawn(move || rs.encode_parity(&mut front, 0, 500).unwrap());
		s.spawn(move || rs.encode_parity(&mut back, 0, 500).unwrap());
	});
	assert_eq!(shards, expected);
}

#[test]
fn codec_is_shareable() {
	fn assert_send_sync<T: Send + Sync>() {}
	assert_send_sync::<ReedSolomon>();
}

#[test]
fn roundtrip_payloads() {
	roundtrip(encode, reconstruct, &BYTES[..TEST_DATA_CHUNK_SIZE], N_DATA_SHARDS, N_PARITY_SHARDS).unwrap();
	roundtrip(encode, reconstruct, &BYTES[..1], 4, 2).unwrap();
	roundtrip(encode, reconstruct, &BYTES[..100_000], 10, 4).unwrap();
	roundtrip_w_drop_closure::<_, _, _, SmallRng, _, _>(
		encode,
		reconstruct,
		&BYTES[..TEST_DATA_CHUNK_SIZE],
		6,
		3,
		deterministic_drop_shards::<Vec<u8>, SmallRng>,
	)
	.unwrap();
}

#[test]
fn error_messages() {
	assert_eq!(
		ReedSolomon::new(200, 57).unwrap_err().to_string(),
		"Invalid configuration: 200 data and 57 parity shards (both at least 1, at most 256 in total)"
	);
	assert_eq!(
		Error::from(Mismatch::ShardCount { have: 5, want: 6 }).to_string(),
		"Dimension mismatch: Expected 6 shards, but got 5"
	);
}
