//! Ways of looping over inputs and outputs to apply coding matrix rows.
//!
//! The three nested loops are named
//!
//! * `byte`   - index of the byte within the shard,
//! * `input`  - which input shard is being read,
//! * `output` - which output shard is being computed,
//!
//! and every nesting order exists twice, once per multiplication method:
//!
//! * `Table` - one row of the 64 KiB multiplication table per coefficient,
//! * `Exp`   - the 256 byte log/exponent tables.
//!
//! All twelve produce identical bytes. Which one is fastest depends on the
//! processor's caches and branch prediction, so the choice is left to the
//! caller via [`CodingLoopKind`]. This is the inner loop, keep it lean.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;
use std::str::FromStr;

use crate::errors::*;
use crate::galois::{fold_log, mul_table_row, Elt, Wide, EXP_TABLE, FIELD_SIZE, LOG_TABLE};

mod loops;
use self::loops::*;


/// Multiplies a subset of coding matrix rows with a set of input shards.
pub trait CodingLoop: Send + Sync {
	/// For every output `o` and byte `p` in `offset..offset + byte_count`:
	/// `outputs[o][p] = sum over i of matrix_rows[o][i] * inputs[i][p]`.
	///
	/// The number of rows used is `outputs.len()`. Inputs beyond the width of
	/// the rows are ignored, with no inputs at all the window is zeroed.
	/// Bytes outside the window are not touched.
	fn code_some_shards(
		&self,
		matrix_rows: &[Vec<Elt>],
		inputs: &[&[u8]],
		outputs: &mut [&mut [u8]],
		offset: usize,
		byte_count: usize,
	);

	/// Same computation as [`CodingLoop::code_some_shards`], but compares each
	/// row against `to_check` instead of storing it. `temp_buffer` is grown as
	/// needed and can be reused across calls.
	///
	/// One row is used per `to_check` buffer. With fewer rows than buffers the
	/// check fails.
	fn check_some_shards(
		&self,
		matrix_rows: &[Vec<Elt>],
		inputs: &[&[u8]],
		to_check: &[&[u8]],
		offset: usize,
		byte_count: usize,
		temp_buffer: &mut Vec<u8>,
	) -> bool {
		if matrix_rows.len() < to_check.len() {
			return false;
		}
		if temp_buffer.len() < byte_count {
			temp_buffer.resize(byte_count, 0);
		}
		let window = offset..(offset + byte_count);
		let inputs = inputs.iter().map(|input| &input[window.clone()]).collect::<Vec<_>>();

		for (row, expected) in matrix_rows.iter().zip(to_check) {
			let mut outputs = [&mut temp_buffer[..byte_count]];
			self.code_some_shards(std::slice::from_ref(row), &inputs, &mut outputs, 0, byte_count);
			if outputs[0][..] != expected[window.clone()] {
				return false;
			}
		}
		true
	}
}

/// How a single coefficient is multiplied with a data byte.
pub trait MulMethod: Send + Sync + 'static {
	/// The coefficient, prepared once per call.
	type Factor: Copy;

	fn factor(coefficient: Elt) -> Self::Factor;

	fn mul(factor: Self::Factor, x: Elt) -> Elt;
}

/// Multiplication table lookups.
pub enum Table {}

impl MulMethod for Table {
	type Factor = &'static [Elt; FIELD_SIZE];

	#[inline(always)]
	fn factor(coefficient: Elt) -> Self::Factor {
		mul_table_row(coefficient)
	}

	#[inline(always)]
	fn mul(factor: Self::Factor, x: Elt) -> Elt {
		factor[x as usize]
	}
}

/// Log/exponent table lookups, the coefficient kept in log form.
pub enum Exp {}

impl MulMethod for Exp {
	type Factor = Option<Wide>;

	#[inline(always)]
	fn factor(coefficient: Elt) -> Self::Factor {
		(coefficient != 0).then(|| LOG_TABLE[coefficient as usize] as Wide)
	}

	#[inline(always)]
	fn mul(factor: Self::Factor, x: Elt) -> Elt {
		match factor {
			Some(log) if x != 0 => EXP_TABLE[fold_log(LOG_TABLE[x as usize] as Wide + log)],
			_ => 0,
		}
	}
}

/// `factors[o][i]` for the rows and inputs in use.
fn prepare<M: MulMethod>(matrix_rows: &[Vec<Elt>], input_count: usize) -> Vec<Vec<M::Factor>> {
	matrix_rows.iter().map(|row| row[..input_count].iter().map(|&c| M::factor(c)).collect()).collect()
}

/// Narrow the call down to the rows, inputs and outputs that take part, then
/// hand it to `order`.
fn dispatch<M: MulMethod>(
	order: fn(&[Vec<M::Factor>], &[&[u8]], &mut [&mut [u8]], Range<usize>),
	matrix_rows: &[Vec<Elt>],
	inputs: &[&[u8]],
	outputs: &mut [&mut [u8]],
	offset: usize,
	byte_count: usize,
) {
	let output_count = outputs.len().min(matrix_rows.len());
	if output_count == 0 || byte_count == 0 {
		return;
	}
	let window = offset..(offset + byte_count);
	let (matrix_rows, outputs) = (&matrix_rows[..output_count], &mut outputs[..output_count]);

	let row_width = matrix_rows.iter().map(Vec::len).min().unwrap_or_default();
	let input_count = row_width.min(inputs.len());
	if input_count == 0 {
		for output in outputs.iter_mut() {
			output[window.clone()].fill(0);
		}
		return;
	}

	let factors = prepare::<M>(matrix_rows, input_count);
	order(&factors, &inputs[..input_count], outputs, window);
}

macro_rules! decl_loop_order {
	($order:ident, $func:ident) => {
		pub struct $order<M>(PhantomData<fn() -> M>);

		impl<M> $order<M> {
			pub const fn new() -> Self {
				Self(PhantomData)
			}
		}

		impl<M: MulMethod> CodingLoop for $order<M> {
			fn code_some_shards(
				&self,
				matrix_rows: &[Vec<Elt>],
				inputs: &[&[u8]],
				outputs: &mut [&mut [u8]],
				offset: usize,
				byte_count: usize,
			) {
				dispatch::<M>($func::<M>, matrix_rows, inputs, outputs, offset, byte_count);
			}
		}
	};
}

decl_loop_order!(ByteInputOutput, byte_input_output);
decl_loop_order!(ByteOutputInput, byte_output_input);
decl_loop_order!(InputByteOutput, input_byte_output);
decl_loop_order!(InputOutputByte, input_output_byte);
decl_loop_order!(OutputByteInput, output_byte_input);
decl_loop_order!(OutputInputByte, output_input_byte);

macro_rules! decl_coding_loops {
	($($kind:ident => $order:ident<$method:ident>, $name:literal;)*) => {
		/// All of the available coding loops, selectable by name.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub enum CodingLoopKind {
			$($kind,)*
		}

		$(pub type $kind = $order<$method>;)*

		impl CodingLoopKind {
			pub const ALL: &'static [CodingLoopKind] = &[$(CodingLoopKind::$kind,)*];

			pub fn name(self) -> &'static str {
				match self {
					$(CodingLoopKind::$kind => $name,)*
				}
			}

			/// The shared instance implementing this loop.
			pub fn coding_loop(self) -> &'static dyn CodingLoop {
				match self {
					$(CodingLoopKind::$kind => {
						static LOOP: $kind = $order::new();
						&LOOP
					})*
				}
			}
		}
	};
}

decl_coding_loops! {
	ByteInputOutputExp => ByteInputOutput<Exp>, "byte-input-output-exp";
	ByteInputOutputTable => ByteInputOutput<Table>, "byte-input-output-table";
	ByteOutputInputExp => ByteOutputInput<Exp>, "byte-output-input-exp";
	ByteOutputInputTable => ByteOutputInput<Table>, "byte-output-input-table";
	InputByteOutputExp => InputByteOutput<Exp>, "input-byte-output-exp";
	InputByteOutputTable => InputByteOutput<Table>, "input-byte-output-table";
	InputOutputByteExp => InputOutputByte<Exp>, "input-output-byte-exp";
	InputOutputByteTable => InputOutputByte<Table>, "input-output-byte-table";
	OutputByteInputExp => OutputByteInput<Exp>, "output-byte-input-exp";
	OutputByteInputTable => OutputByteInput<Table>, "output-byte-input-table";
	OutputInputByteExp => OutputInputByte<Exp>, "output-input-byte-exp";
	OutputInputByteTable => OutputInputByte<Table>, "output-input-byte-table";
}

impl Default for CodingLoopKind {
	fn default() -> Self {
		CodingLoopKind::InputOutputByteTable
	}
}

impl fmt::Display for CodingLoopKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for CodingLoopKind {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		CodingLoopKind::ALL
			.iter()
			.copied()
			.find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| Error::UnknownCodingLoop(s.to_owned()))
	}
}
