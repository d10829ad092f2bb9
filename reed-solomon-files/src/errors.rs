use std::path::PathBuf;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Codec(#[from] reed_solomon_gf256::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error("Payload of {len} bytes does not fit the 4 byte length header")]
	PayloadTooLarge { len: usize },

	#[error("Data shards hold {len} bytes, too few for the length header")]
	TruncatedHeader { len: usize },

	#[error("Length header claims {stored} bytes, but the data shards only hold {available}")]
	CorruptHeader { stored: usize, available: usize },

	#[error("No shard files of {0:?} found")]
	NoShards(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
