use std::fmt;

use tracing::{debug, error, trace};

use crate::coding_loop::{CodingLoop, CodingLoopKind};
use crate::errors::*;
use crate::galois::{Elt, FIELD_SIZE};
use crate::matrix::Matrix;
use crate::Shard;

#[cfg(test)]
mod tests;

/// Validated shard counts of a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeParams {
	/// Number of data shards, `k`.
	pub data_shards: usize,
	/// Number of parity shards, `m`.
	pub parity_shards: usize,
}

impl CodeParams {
	/// Requires at least one shard of each kind and at most 256 in total,
	/// since every shard index must be a distinct field element.
	pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self> {
		if data_shards == 0 || parity_shards == 0 || data_shards + parity_shards > FIELD_SIZE {
			return Err(Error::InvalidConfiguration { data_shards, parity_shards });
		}
		Ok(Self { data_shards, parity_shards })
	}

	pub fn total_shards(&self) -> usize {
		self.data_shards + self.parity_shards
	}

	pub fn make_encoder(&self) -> Result<ReedSolomon> {
		self.make_encoder_with(CodingLoopKind::default())
	}

	pub fn make_encoder_with(&self, kind: CodingLoopKind) -> Result<ReedSolomon> {
		ReedSolomon::from_params(*self, kind)
	}
}

/// Systematic Reed-Solomon code with `k` data and `m` parity shards.
///
/// Any `k` of the `k + m` shards suffice to restore the others.
#[derive(Clone)]
pub struct ReedSolomon {
	params: CodeParams,
	matrix: Matrix,
	/// Rows `k..k+m` of `matrix`, in the form the coding loops consume.
	parity_rows: Vec<Vec<Elt>>,
	kind: CodingLoopKind,
	coding_loop: &'static dyn CodingLoop,
}

impl ReedSolomon {
	/// Code with the default coding loop.
	pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self> {
		CodeParams::new(data_shards, parity_shards)?.make_encoder()
	}

	pub fn with_coding_loop(data_shards: usize, parity_shards: usize, kind: CodingLoopKind) -> Result<Self> {
		CodeParams::new(data_shards, parity_shards)?.make_encoder_with(kind)
	}

	fn from_params(params: CodeParams, kind: CodingLoopKind) -> Result<Self> {
		let matrix = build_matrix(params.data_shards, params.total_shards())?;
		let parity_rows = (params.data_shards..params.total_shards()).map(|r| matrix.row_bytes(r)).collect();
		debug!(
			data_shards = params.data_shards,
			parity_shards = params.parity_shards,
			coding_loop = %kind,
			"created reed-solomon code"
		);
		Ok(Self { params, matrix, parity_rows, kind, coding_loop: kind.coding_loop() })
	}

	pub fn params(&self) -> CodeParams {
		self.params
	}

	pub fn data_shard_count(&self) -> usize {
		self.params.data_shards
	}

	pub fn parity_shard_count(&self) -> usize {
		self.params.parity_shards
	}

	pub fn total_shard_count(&self) -> usize {
		self.params.total_shards()
	}

	/// The `(k + m) x k` encoding matrix, identity on top.
	pub fn encoding_matrix(&self) -> &Matrix {
		&self.matrix
	}

	pub fn coding_loop(&self) -> CodingLoopKind {
		self.kind
	}

	/// Compute the parity shards from the data shards, for the bytes in
	/// `offset..offset + byte_count`.
	///
	/// `shards` holds all `k + m` shards, data first. The parity shards'
	/// previous content in the window is overwritten.
	pub fn encode_parity<S: Shard>(&self, shards: &mut [S], offset: usize, byte_count: usize) -> Result<()> {
		self.check_buffers_and_sizes(shards, offset, byte_count)?;
		trace!(offset, byte_count, "encoding parity");

		let (data, parity) = shards.split_at_mut(self.data_shard_count());
		let inputs = data.iter().map(|shard| shard.as_ref()).collect::<Vec<&[u8]>>();
		let mut outputs = parity.iter_mut().map(|shard| shard.as_mut()).collect::<Vec<&mut [u8]>>();
		self.coding_loop.code_some_shards(&self.parity_rows, &inputs, &mut outputs, offset, byte_count);
		Ok(())
	}

	/// Whether the parity shards match the data shards in the window.
	pub fn is_parity_correct<S: AsRef<[u8]>>(&self, shards: &[S], offset: usize, byte_count: usize) -> Result<bool> {
		let mut temp_buffer = Vec::new();
		self.is_parity_correct_with_buffer(shards, offset, byte_count, &mut temp_buffer)
	}

	/// As [`ReedSolomon::is_parity_correct`], reusing `temp_buffer` as scratch
	/// space across calls.
	pub fn is_parity_correct_with_buffer<S: AsRef<[u8]>>(
		&self,
		shards: &[S],
		offset: usize,
		byte_count: usize,
		temp_buffer: &mut Vec<u8>,
	) -> Result<bool> {
		self.check_buffers_and_sizes(shards, offset, byte_count)?;

		let (data, parity) = shards.split_at(self.data_shard_count());
		let inputs = data.iter().map(|shard| shard.as_ref()).collect::<Vec<&[u8]>>();
		let to_check = parity.iter().map(|shard| shard.as_ref()).collect::<Vec<&[u8]>>();
		Ok(self.coding_loop.check_some_shards(&self.parity_rows, &inputs, &to_check, offset, byte_count, temp_buffer))
	}

	/// Restore the shards flagged absent in `present`, for the bytes in
	/// `offset..offset + byte_count`.
	///
	/// Absent shards must still be allocated at full length, their content is
	/// ignored. Nothing is done if every shard is present.
	pub fn decode_missing<S: Shard>(
		&self,
		shards: &mut [S],
		present: &[bool],
		offset: usize,
		byte_count: usize,
	) -> Result<()> {
		self.check_buffers_and_sizes(shards, offset, byte_count)?;
		let k = self.data_shard_count();
		let total = self.total_shard_count();
		if present.len() != total {
			return Err(Mismatch::ErasurePattern { have: present.len(), want: total }.into());
		}

		let present_count = present.iter().filter(|&&p| p).count();
		if present_count == total {
			return Ok(());
		}
		if present_count < k {
			return Err(Error::InsufficientShards { have: present_count, min: k, all: total });
		}

		// The first `k` present shards determine everything. Their rows of the
		// encoding matrix map the data to them, the inverse maps them back.
		let valid_indices = (0..total).filter(|&idx| present[idx]).take(k).collect::<Vec<usize>>();
		let decode_matrix = self.matrix.select_rows(&valid_indices)?.invert().map_err(|e| {
			if e.is_internal() {
				error!(?valid_indices, data_shards = k, parity_shards = self.parity_shard_count(), "decode submatrix is singular");
			}
			e
		})?;

		let missing_data = (0..k).filter(|&idx| !present[idx]).collect::<Vec<usize>>();
		let missing_parity = (k..total).filter(|&idx| !present[idx]).collect::<Vec<usize>>();
		debug!(?missing_data, ?missing_parity, offset, byte_count, "decoding missing shards");

		if !missing_data.is_empty() {
			let matrix_rows = missing_data.iter().map(|&idx| decode_matrix.row_bytes(idx)).collect::<Vec<_>>();
			let mut inputs = Vec::with_capacity(k);
			let mut outputs = Vec::with_capacity(missing_data.len());
			for (idx, shard) in shards.iter_mut().enumerate() {
				if idx < k && !present[idx] {
					outputs.push(shard.as_mut());
				} else if inputs.len() < k && present[idx] {
					let shard: &S = shard;
					inputs.push(shard.as_ref());
				}
			}
			self.coding_loop.code_some_shards(&matrix_rows, &inputs, &mut outputs, offset, byte_count);
		}

		if !missing_parity.is_empty() {
			let matrix_rows = missing_parity.iter().map(|&idx| self.matrix.row_bytes(idx)).collect::<Vec<_>>();
			let (data, parity) = shards.split_at_mut(k);
			let inputs = data.iter().map(|shard| shard.as_ref()).collect::<Vec<&[u8]>>();
			let mut outputs = parity
				.iter_mut()
				.zip(&present[k..])
				.filter(|(_, is_present)| !**is_present)
				.map(|(shard, _)| shard.as_mut())
				.collect::<Vec<&mut [u8]>>();
			self.coding_loop.code_some_shards(&matrix_rows, &inputs, &mut outputs, offset, byte_count);
		}

		Ok(())
	}

	/// Shard count, equal shard lengths and the byte window.
	fn check_buffers_and_sizes<S: AsRef<[u8]>>(&self, shards: &[S], offset: usize, byte_count: usize) -> Result<()> {
		let total = self.total_shard_count();
		if shards.len() != total {
			return Err(Mismatch::ShardCount { have: shards.len(), want: total }.into());
		}

		let shard_len = shards[0].as_ref().len();
		if let Some((index, shard)) = shards.iter().enumerate().find(|(_, shard)| shard.as_ref().len() != shard_len) {
			return Err(Mismatch::ShardLength { index, have: shard.as_ref().len(), want: shard_len }.into());
		}

		match offset.checked_add(byte_count) {
			Some(end) if end <= shard_len => Ok(()),
			_ => Err(Mismatch::ByteWindow { offset, byte_count, shard_len }.into()),
		}
	}
}

impl fmt::Debug for ReedSolomon {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ReedSolomon")
			.field("data_shards", &self.params.data_shards)
			.field("parity_shards", &self.params.parity_shards)
			.field("coding_loop", &self.kind)
			.finish_non_exhaustive()
	}
}

/// `V * inverse(top k rows of V)` for the `total x k` vandermonde matrix `V`.
///
/// Any `k` rows of `V` are linearly independent, and right multiplication by
/// an invertible matrix keeps them so, while turning the top into the identity.
fn build_matrix(data_shards: usize, total_shards: usize) -> Result<Matrix> {
	let vandermonde = Matrix::vandermonde(total_shards, data_shards)?;
	let top = vandermonde.submatrix(0, 0, data_shards, data_shards)?;
	vandermonde.times(&top.invert()?)
}
