//! Arithmetic in GF(2^8).
//!
//! Elements are plain bytes. Addition and subtraction are both XOR.
//! Multiplication is available through two equivalent routes: the full
//! 256x256 product table (`MUL_TABLE`) and the discrete log/exponent tables
//! (`LOG_TABLE`, `EXP_TABLE`). The log/exp tables are generated at compile
//! time, the product table once at program start.

use derive_more::{BitXor, BitXorAssign};
use static_init::dynamic;

use crate::errors::*;

pub type Elt = u8;
pub type Wide = u16;

pub const FIELD_BITS: usize = 8;
pub const FIELD_SIZE: usize = 1_usize << FIELD_BITS;

/// Order of the multiplicative group, all bits set.
pub const ONEMASK: Elt = (FIELD_SIZE - 1) as Elt;

/// Quotient ideal generator given by tail of irreducible polynomial
/// `x^8 + x^4 + x^3 + x^2 + 1`.
pub const GENERATOR: Elt = 0x1D;

const fn generate_exp_table() -> [Elt; FIELD_SIZE] {
	let mut table = [0 as Elt; FIELD_SIZE];
	let mut b: Wide = 1;
	let mut i = 0;
	while i < ONEMASK as usize {
		table[i] = b as Elt;
		b <<= 1;
		if b & (FIELD_SIZE as Wide) != 0 {
			b ^= (FIELD_SIZE as Wide) | (GENERATOR as Wide);
		}
		i += 1;
	}
	// x^255 == x^0, lets the folded log sum index without another branch
	table[ONEMASK as usize] = table[0];
	table
}

const fn generate_log_table(exp: &[Elt; FIELD_SIZE]) -> [Elt; FIELD_SIZE] {
	let mut table = [0 as Elt; FIELD_SIZE];
	let mut i = 0;
	while i < ONEMASK as usize {
		table[exp[i] as usize] = i as Elt;
		i += 1;
	}
	table
}

const EXP: [Elt; FIELD_SIZE] = generate_exp_table();

/// `EXP_TABLE[i] == 2^i`, with `EXP_TABLE[255] == EXP_TABLE[0] == 1`.
pub static EXP_TABLE: [Elt; FIELD_SIZE] = EXP;

/// Inverse of `EXP_TABLE` on the nonzero elements. `LOG_TABLE[0]` is meaningless.
pub static LOG_TABLE: [Elt; FIELD_SIZE] = generate_log_table(&EXP);

/// `MUL_TABLE[a][b] == a * b`.
#[dynamic(0)]
pub static MUL_TABLE: Box<[[Elt; FIELD_SIZE]]> = generate_mul_table();

fn generate_mul_table() -> Box<[[Elt; FIELD_SIZE]]> {
	let mut table = vec![[0 as Elt; FIELD_SIZE]; FIELD_SIZE].into_boxed_slice();
	for (a, row) in table.iter_mut().enumerate() {
		for (b, product) in row.iter_mut().enumerate() {
			*product = mul_log(a as Elt, b as Elt);
		}
	}
	table
}

/// All products of `factor`, indexed by the other operand.
#[inline(always)]
pub fn mul_table_row(factor: Elt) -> &'static [Elt; FIELD_SIZE] {
	// initialized before `main`, never written afterwards
	let table: &'static [[Elt; FIELD_SIZE]] = unsafe { &MUL_TABLE };
	&table[factor as usize]
}

/// Reduce a sum of two logs modulo `ONEMASK`, leaving `ONEMASK` itself in place.
#[inline(always)]
pub fn fold_log(log: Wide) -> usize {
	((log & ONEMASK as Wide) + (log >> FIELD_BITS)) as usize
}

#[inline(always)]
pub fn add(a: Elt, b: Elt) -> Elt {
	a ^ b
}

#[inline(always)]
pub fn sub(a: Elt, b: Elt) -> Elt {
	a ^ b
}

/// Product via the multiplication table.
#[inline(always)]
pub fn mul(a: Elt, b: Elt) -> Elt {
	mul_table_row(a)[b as usize]
}

/// Product via the log and exponent tables.
#[inline(always)]
pub fn mul_log(a: Elt, b: Elt) -> Elt {
	if a == 0 || b == 0 {
		return 0;
	}
	let log = LOG_TABLE[a as usize] as Wide + LOG_TABLE[b as usize] as Wide;
	EXP_TABLE[fold_log(log)]
}

pub fn div(a: Elt, b: Elt) -> Result<Elt> {
	if b == 0 {
		return Err(Error::DivideByZero);
	}
	if a == 0 {
		return Ok(0);
	}
	let log = LOG_TABLE[a as usize] as Wide + ONEMASK as Wide - LOG_TABLE[b as usize] as Wide;
	Ok(EXP_TABLE[fold_log(log)])
}

pub fn inv(a: Elt) -> Result<Elt> {
	div(1, a)
}

/// `a^n`, where `0^0` is one.
pub fn exp(a: Elt, n: usize) -> Elt {
	if n == 0 {
		return 1;
	}
	if a == 0 {
		return 0;
	}
	let log = (LOG_TABLE[a as usize] as usize * (n % ONEMASK as usize)) % ONEMASK as usize;
	EXP_TABLE[log]
}

/// A field element with the field's operators attached.
///
/// `+`, `-` and `^` are all XOR, `*` is the field product. Division is
/// fallible and therefore only exposed as [`Element::div`].
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, BitXor, BitXorAssign)]
pub struct Element(pub Elt);

impl Element {
	pub const ZERO: Element = Element(0);
	pub const ONE: Element = Element(1);

	pub fn div(self, other: Element) -> Result<Element> {
		div(self.0, other.0).map(Element)
	}

	pub fn inverse(self) -> Result<Element> {
		inv(self.0).map(Element)
	}

	pub fn pow(self, n: usize) -> Element {
		Element(exp(self.0, n))
	}
}

impl From<Elt> for Element {
	fn from(x: Elt) -> Self {
		Element(x)
	}
}

impl From<Element> for Elt {
	fn from(x: Element) -> Self {
		x.0
	}
}

impl std::ops::Add for Element {
	type Output = Element;
	fn add(self, rhs: Element) -> Element {
		self ^ rhs
	}
}

impl std::ops::AddAssign for Element {
	fn add_assign(&mut self, rhs: Element) {
		*self ^= rhs;
	}
}

impl std::ops::Sub for Element {
	type Output = Element;
	fn sub(self, rhs: Element) -> Element {
		self ^ rhs
	}
}

impl std::ops::SubAssign for Element {
	fn sub_assign(&mut self, rhs: Element) {
		*self ^= rhs;
	}
}

impl std::ops::Mul for Element {
	type Output = Element;
	fn mul(self, rhs: Element) -> Element {
		Element(mul(self.0, rhs.0))
	}
}

impl std::ops::MulAssign for Element {
	fn mul_assign(&mut self, rhs: Element) {
		*self = *self * rhs;
	}
}

impl std::fmt::Display for Element {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::fmt::Debug for Element {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}
