//! The six loop nestings. `factors[o][i]` is the prepared coefficient for
//! output `o` and input `i`; the first input assigns, later ones accumulate.

use std::ops::Range;

use super::MulMethod;

pub(super) fn byte_input_output<M: MulMethod>(
	factors: &[Vec<M::Factor>],
	inputs: &[&[u8]],
	outputs: &mut [&mut [u8]],
	window: Range<usize>,
) {
	let Some((first, rest)) = inputs.split_first() else { return };
	for p in window {
		let x = first[p];
		for (output, row) in outputs.iter_mut().zip(factors) {
			output[p] = M::mul(row[0], x);
		}
		for (i, input) in rest.iter().enumerate() {
			let x = input[p];
			for (output, row) in outputs.iter_mut().zip(factors) {
				output[p] ^= M::mul(row[i + 1], x);
			}
		}
	}
}

pub(super) fn byte_output_input<M: MulMethod>(
	factors: &[Vec<M::Factor>],
	inputs: &[&[u8]],
	outputs: &mut [&mut [u8]],
	window: Range<usize>,
) {
	for p in window {
		for (output, row) in outputs.iter_mut().zip(factors) {
			output[p] = inputs.iter().zip(row).fold(0, |acc, (input, &f)| acc ^ M::mul(f, input[p]));
		}
	}
}

pub(super) fn input_byte_output<M: MulMethod>(
	factors: &[Vec<M::Factor>],
	inputs: &[&[u8]],
	outputs: &mut [&mut [u8]],
	window: Range<usize>,
) {
	let Some((first, rest)) = inputs.split_first() else { return };
	for p in window.clone() {
		let x = first[p];
		for (output, row) in outputs.iter_mut().zip(factors) {
			output[p] = M::mul(row[0], x);
		}
	}
	for (i, input) in rest.iter().enumerate() {
		for p in window.clone() {
			let x = input[p];
			for (output, row) in outputs.iter_mut().zip(factors) {
				output[p] ^= M::mul(row[i + 1], x);
			}
		}
	}
}

pub(super) fn input_output_byte<M: MulMethod>(
	factors: &[Vec<M::Factor>],
	inputs: &[&[u8]],
	outputs: &mut [&mut [u8]],
	window: Range<usize>,
) {
	let Some((first, rest)) = inputs.split_first() else { return };
	for (output, row) in outputs.iter_mut().zip(factors) {
		let f = row[0];
		for (o, &x) in output[window.clone()].iter_mut().zip(&first[window.clone()]) {
			*o = M::mul(f, x);
		}
	}
	for (i, input) in rest.iter().enumerate() {
		let input = &input[window.clone()];
		for (output, row) in outputs.iter_mut().zip(factors) {
			let f = row[i + 1];
			for (o, &x) in output[window.clone()].iter_mut().zip(input) {
				*o ^= M::mul(f, x);
			}
		}
	}
}

pub(super) fn output_byte_input<M: MulMethod>(
	factors: &[Vec<M::Factor>],
	inputs: &[&[u8]],
	outputs: &mut [&mut [u8]],
	window: Range<usize>,
) {
	for (output, row) in outputs.iter_mut().zip(factors) {
		for p in window.clone() {
			output[p] = inputs.iter().zip(row).fold(0, |acc, (input, &f)| acc ^ M::mul(f, input[p]));
		}
	}
}

pub(super) fn output_input_byte<M: MulMethod>(
	factors: &[Vec<M::Factor>],
	inputs: &[&[u8]],
	outputs: &mut [&mut [u8]],
	window: Range<usize>,
) {
	let Some((first, rest)) = inputs.split_first() else { return };
	for (output, row) in outputs.iter_mut().zip(factors) {
		let output = &mut output[window.clone()];
		let (&f, rest_factors) = match row.split_first() {
			Some(split) => split,
			None => continue,
		};
		for (o, &x) in output.iter_mut().zip(&first[window.clone()]) {
			*o = M::mul(f, x);
		}
		for (input, &f) in rest.iter().zip(rest_factors) {
			for (o, &x) in output.iter_mut().zip(&input[window.clone()]) {
				*o ^= M::mul(f, x);
			}
		}
	}
}
