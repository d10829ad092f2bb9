use honggfuzz::fuzz;

use arbitrary::*;

use gf256::CodingLoopKind;

#[derive(Debug, Clone)]
struct CodingLoopFeed {
	matrix_rows: Vec<Vec<u8>>,
	inputs: Vec<Vec<u8>>,
	offset: usize,
	byte_count: usize,
}

impl<'a> Arbitrary<'a> for CodingLoopFeed {
	fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
		let input_count = u.int_in_range(1_usize..=12)?;
		let output_count = u.int_in_range(1_usize..=6)?;
		let shard_len = u.int_in_range(0_usize..=300)?;
		let offset = u.int_in_range(0..=shard_len)?;
		let byte_count = u.int_in_range(0..=(shard_len - offset))?;

		let matrix_rows = (0..output_count)
			.map(|_| u.bytes(input_count).map(<[u8]>::to_vec))
			.collect::<Result<Vec<_>>>()?;
		let inputs = (0..input_count)
			.map(|_| {
				let mut shard = vec![0u8; shard_len];
				u.fill_buffer(&mut shard)?;
				Ok(shard)
			})
			.collect::<Result<Vec<_>>>()?;

		Ok(Self { matrix_rows, inputs, offset, byte_count })
	}
}

fn code(kind: CodingLoopKind, feed: &CodingLoopFeed) -> Vec<Vec<u8>> {
	let shard_len = feed.inputs[0].len();
	let inputs = feed.inputs.iter().map(Vec::as_slice).collect::<Vec<_>>();
	let mut outputs = vec![vec![0u8; shard_len]; feed.matrix_rows.len()];
	let mut output_refs = outputs.iter_mut().map(Vec::as_mut_slice).collect::<Vec<_>>();
	kind.coding_loop().code_some_shards(&feed.matrix_rows, &inputs, &mut output_refs, feed.offset, feed.byte_count);
	outputs
}

fn main() {
	loop {
		fuzz!(|feed: CodingLoopFeed| {
			let expected = code(CodingLoopKind::default(), &feed);
			let inputs = feed.inputs.iter().map(Vec::as_slice).collect::<Vec<_>>();
			let mut temp_buffer = Vec::new();
			for &kind in CodingLoopKind::ALL {
				assert_eq!(code(kind, &feed), expected, "{} disagrees", kind);

				let to_check = expected.iter().map(Vec::as_slice).collect::<Vec<_>>();
				assert!(kind.coding_loop().check_some_shards(
					&feed.matrix_rows,
					&inputs,
					&to_check,
					feed.offset,
					feed.byte_count,
					&mut temp_buffer
				));
			}
		});
	}
}
