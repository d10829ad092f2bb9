//! Systematic Reed-Solomon erasure coding over GF(2^8).
//!
//! `k` equal length data shards are extended by `m` parity shards, such that
//! any `k` of the `k + m` shards restore all of them.
//!
//! ```
//! use reed_solomon_gf256::ReedSolomon;
//!
//! let rs = ReedSolomon::new(4, 2)?;
//! let mut shards = vec![vec![0u8, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9, 10, 11], vec![12, 13, 14, 15], vec![0; 4], vec![0; 4]];
//! rs.encode_parity(&mut shards, 0, 4)?;
//!
//! shards[1] = vec![0; 4];
//! shards[4] = vec![0; 4];
//! rs.decode_missing(&mut shards, &[true, false, true, true, false, true], 0, 4)?;
//! assert_eq!(shards[1], vec![4, 5, 6, 7]);
//! assert!(rs.is_parity_correct(&shards, 0, 4)?);
//! # Ok::<(), reed_solomon_gf256::Error>(())
//! ```

pub mod errors;
pub use errors::*;

pub mod galois;
pub use galois::Element;

pub mod matrix;
pub use matrix::Matrix;

pub mod coding_loop;
pub use coding_loop::{CodingLoop, CodingLoopKind};

mod codec;
pub use codec::*;

/// A shard buffer, anything that can be viewed as bytes.
pub trait Shard: AsRef<[u8]> + AsMut<[u8]> {}

impl<T> Shard for T where T: AsRef<[u8]> + AsMut<[u8]> {}
