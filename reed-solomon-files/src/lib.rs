//! Files as Reed-Solomon shard files.
//!
//! A file is stored as its length, a 4 byte big-endian header, followed by its
//! bytes and zero padding, cut into `k` equal data shards. The `m` parity
//! shards follow. Shard `i` of `path` lives next to it as `path.i`.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use fs_err as fs;
use reed_solomon_gf256::{CodeParams, CodingLoopKind};
use tracing::{debug, info, warn};

mod errors;
pub use errors::*;

/// Size of the big-endian payload length prefix.
pub const HEADER_LEN: usize = 4;

/// Lay out `payload` over `data_shards` equal data shards, followed by
/// `parity_shards` zeroed parity shards.
pub fn split(payload: &[u8], data_shards: usize, parity_shards: usize) -> Result<Vec<Vec<u8>>> {
	let params = CodeParams::new(data_shards, parity_shards)?;
	let len = u32::try_from(payload.len()).map_err(|_| Error::PayloadTooLarge { len: payload.len() })?;

	let stored_len = HEADER_LEN + payload.len();
	let shard_len = (stored_len + data_shards - 1) / data_shards;

	let mut stored = Vec::with_capacity(shard_len * data_shards);
	stored.extend_from_slice(&len.to_be_bytes());
	stored.extend_from_slice(payload);
	stored.resize(shard_len * data_shards, 0);

	let mut shards = stored.chunks(shard_len).map(<[u8]>::to_vec).collect::<Vec<_>>();
	shards.resize(params.total_shards(), vec![0u8; shard_len]);
	Ok(shards)
}

/// Inverse of [`split`], the payload from the first `data_shards` shards.
pub fn join<S: AsRef<[u8]>>(shards: &[S], data_shards: usize) -> Result<Vec<u8>> {
	let mut stored = shards.iter().take(data_shards).flat_map(|shard| shard.as_ref().iter().copied()).collect::<Vec<u8>>();

	let header = stored.get(..HEADER_LEN).ok_or(Error::TruncatedHeader { len: stored.len() })?;
	let mut len = [0u8; HEADER_LEN];
	len.copy_from_slice(header);
	let stored_len = u32::from_be_bytes(len) as usize;

	let available = stored.len() - HEADER_LEN;
	if stored_len > available {
		return Err(Error::CorruptHeader { stored: stored_len, available });
	}
	stored.truncate(HEADER_LEN + stored_len);
	stored.drain(..HEADER_LEN);
	Ok(stored)
}

/// `base` with `.suffix` appended to its file name.
fn with_suffix(base: &Path, suffix: impl std::fmt::Display) -> PathBuf {
	let mut name = OsString::from(base.as_os_str());
	name.push(format!(".{}", suffix));
	PathBuf::from(name)
}

/// Where shard `idx` of `base` is stored.
pub fn shard_path(base: impl AsRef<Path>, idx: usize) -> PathBuf {
	with_suffix(base.as_ref(), idx)
}

/// Where [`decode_file`] writes the restored file.
pub fn decoded_path(base: impl AsRef<Path>) -> PathBuf {
	with_suffix(base.as_ref(), "decoded")
}

/// Split the file at `path` into shard files, returns their paths.
pub fn encode_file(path: impl AsRef<Path>, params: CodeParams, kind: CodingLoopKind) -> Result<Vec<PathBuf>> {
	let path = path.as_ref();
	let rs = params.make_encoder_with(kind)?;

	let payload = fs::read(path)?;
	let mut shards = split(&payload, params.data_shards, params.parity_shards)?;
	let shard_len = shards[0].len();
	rs.encode_parity(&mut shards, 0, shard_len)?;

	let mut written = Vec::with_capacity(shards.len());
	for (idx, shard) in shards.iter().enumerate() {
		let shard_path = shard_path(path, idx);
		fs::write(&shard_path, shard)?;
		written.push(shard_path);
	}
	info!(path = %path.display(), bytes = payload.len(), shard_len, shards = written.len(), "encoded file");
	Ok(written)
}

/// Read whichever shard files of `path` exist.
fn read_shards(path: &Path, total: usize) -> Result<Vec<Option<Vec<u8>>>> {
	(0..total)
		.map(|idx| match fs::read(shard_path(path, idx)) {
			Ok(shard) => Ok(Some(shard)),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				debug!(idx, "shard file missing");
				Ok(None)
			}
			Err(e) => Err(e.into()),
		})
		.collect()
}

/// The length most shard files agree on.
fn common_length(shards: &[Option<Vec<u8>>]) -> Option<usize> {
	let mut counts = BTreeMap::<usize, usize>::new();
	for shard in shards.iter().flatten() {
		*counts.entry(shard.len()).or_default() += 1;
	}
	counts.into_iter().max_by_key(|&(_, count)| count).map(|(len, _)| len)
}

/// Restore the file at `path` from its shard files, rewriting any that are
/// missing or have the wrong length. Returns the path of the restored file.
pub fn decode_file(path: impl AsRef<Path>, params: CodeParams, kind: CodingLoopKind) -> Result<PathBuf> {
	let path = path.as_ref();
	let rs = params.make_encoder_with(kind)?;

	let received = read_shards(path, params.total_shards())?;
	let shard_len = common_length(&received).ok_or_else(|| Error::NoShards(path.to_owned()))?;

	let mut present = Vec::with_capacity(received.len());
	let mut shards = Vec::with_capacity(received.len());
	for (idx, shard) in received.into_iter().enumerate() {
		match shard {
			Some(shard) if shard.len() == shard_len => {
				present.push(true);
				shards.push(shard);
			}
			other => {
				if let Some(shard) = other {
					warn!(idx, have = shard.len(), want = shard_len, "shard file has the wrong length, treating it as erased");
				}
				present.push(false);
				shards.push(vec![0u8; shard_len]);
			}
		}
	}

	rs.decode_missing(&mut shards, &present, 0, shard_len)?;

	for (idx, shard) in shards.iter().enumerate().filter(|(idx, _)| !present[*idx]) {
		fs::write(shard_path(path, idx), shard)?;
	}
	let restored = present.iter().filter(|&&p| !p).count();

	let payload = join(&shards, params.data_shards)?;
	let decoded = decoded_path(path);
	fs::write(&decoded, &payload)?;
	info!(path = %decoded.display(), bytes = payload.len(), restored, "decoded file");
	Ok(decoded)
}

/// Whether the shard files of `path` are all there and consistent.
pub fn verify_files(path: impl AsRef<Path>, params: CodeParams) -> Result<bool> {
	let path = path.as_ref();
	let rs = params.make_encoder()?;

	let shards = (0..params.total_shards()).map(|idx| fs::read(shard_path(path, idx))).collect::<io::Result<Vec<_>>>()?;
	let shard_len = shards[0].len();
	let correct = rs.is_parity_correct(&shards, 0, shard_len)?;
	debug!(path = %path.display(), correct, "verified shard files");
	Ok(correct)
}
