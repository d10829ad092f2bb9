/// Shape disagreements between shards, windows and matrices.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Mismatch {
	#[error("Expected {want} shards, but got {have}")]
	ShardCount { have: usize, want: usize },

	#[error("Shard #{index} is {have} bytes long, but shard #0 is {want}")]
	ShardLength { index: usize, have: usize, want: usize },

	#[error("Byte window {offset}..+{byte_count} exceeds the shard length of {shard_len}")]
	ByteWindow { offset: usize, byte_count: usize, shard_len: usize },

	#[error("Erasure pattern covers {have} shards, but there are {want}")]
	ErasurePattern { have: usize, want: usize },

	#[error("Can not multiply a {left_rows}x{left_cols} matrix with a {right_rows}x{right_cols} matrix")]
	MatrixShape { left_rows: usize, left_cols: usize, right_rows: usize, right_cols: usize },

	#[error("Matrix with {left} rows can not be augmented by a matrix with {right} rows")]
	AugmentRows { left: usize, right: usize },

	#[error("Matrix is {rows}x{cols}, but must be square")]
	NotSquare { rows: usize, cols: usize },

	#[error("Selected {selected} rows, but the matrix has {cols} columns")]
	RowSelection { selected: usize, cols: usize },

	#[error("Row {index} is out of range for a matrix with {rows} rows")]
	RowIndex { index: usize, rows: usize },

	#[error("Row {index} has {have} columns, but row #0 has {want}")]
	RaggedRows { index: usize, have: usize, want: usize },

	#[error("A matrix needs at least one row and one column")]
	Empty,

	#[error("Requested {rows} evaluation points, but only {max} distinct ones exist")]
	EvaluationPoints { rows: usize, max: usize },

	#[error("Rows {rmin}..{rmax} and columns {cmin}..{cmax} are out of range for a {rows}x{cols} matrix")]
	SubmatrixBounds { rmin: usize, cmin: usize, rmax: usize, cmax: usize, rows: usize, cols: usize },
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("Invalid configuration: {data_shards} data and {parity_shards} parity shards (both at least 1, at most 256 in total)")]
	InvalidConfiguration { data_shards: usize, parity_shards: usize },

	#[error("Dimension mismatch: {0}")]
	DimensionMismatch(#[from] Mismatch),

	#[error("Needs at least {min} shards of {all} to recover, have {have}")]
	InsufficientShards { have: usize, min: usize, all: usize },

	#[error("Division by the zero element")]
	DivideByZero,

	#[error("Matrix is singular, the encoding matrix is broken")]
	Singular,

	#[error("Unknown coding loop {0:?}")]
	UnknownCodingLoop(String),
}

impl Error {
	/// `true` for conditions that can only be caused by a defect in this crate,
	/// never by caller input.
	pub fn is_internal(&self) -> bool {
		matches!(self, Error::Singular)
	}
}

pub type Result<T> = std::result::Result<T, Error>;
