use std::ops;

use crate::numerics::lanes::{Element, Register};

/// A binary operation that can be applied lane-by-lane on any register tier.
pub trait BinaryOp {
    const SYMBOL: &'static str;

    fn apply<R>(lhs: R, rhs: R) -> R
    where
        R: ops::Add<Output = R> + ops::Mul<Output = R>;
}

/// Pointwise addition.
pub struct Add;

/// Pointwise multiplication.
pub struct Mul;

impl BinaryOp for Add {
    const SYMBOL: &'static str = "+";

    #[inline(always)]
    fn apply<R>(lhs: R, rhs: R) -> R
    where
        R: ops::Add<Output = R> + ops::Mul<Output = R>,
    {
        lhs + rhs
    }
}

impl BinaryOp for Mul {
    const SYMBOL: &'static str = "*";

    #[inline(always)]
    fn apply<R>(lhs: R, rhs: R) -> R
    where
        R: ops::Add<Output = R> + ops::Mul<Output = R>,
    {
        lhs * rhs
    }
}

/// Runs one tier of the sweep starting at `start`, stepping `R::LANES` at a
/// time until fewer than `R::LANES` elements remain. Returns the first index
/// left for the next (narrower) tier.
///
/// With `lhs == None` the left operand is read from `out` itself, which is
/// the in-place form.
#[inline(always)]
fn sweep_tier<T, R, O>(out: &mut [T], lhs: Option<&[T]>, rhs: &[T], start: usize) -> usize
where
    T: Element,
    R: Register<T>,
    O: BinaryOp,
{
    let len = out.len();
    let mut i = start;
    while len - i >= R::LANES {
        let left = match lhs {
            Some(a) => R::load(&a[i..]),
            None => R::load(&out[i..]),
        };
        let right = R::load(&rhs[i..]);
        O::apply(left, right).store(&mut out[i..]);
        i += R::LANES;
    }
    i
}

/// Wide tier, then narrow tier, then the scalar tail.
#[inline(always)]
fn sweep<T: Element, O: BinaryOp>(out: &mut [T], lhs: Option<&[T]>, rhs: &[T]) {
    let i = sweep_tier::<T, T::Wide, O>(out, lhs, rhs, 0);
    let i = sweep_tier::<T, T::Narrow, O>(out, lhs, rhs, i);
    let i = sweep_tier::<T, T, O>(out, lhs, rhs, i);
    debug_assert_eq!(i, out.len());
}

/// Computes `out[i] = a[i] <op> b[i]` for every `i in 0..out.len()`.
///
/// The bulk of the array goes through the wide tier, what is left through the
/// narrow tier, and the last few elements through the scalar tier. Every lane
/// performs exactly the scalar operation, so the result is bit-identical to a
/// plain loop.
///
/// # Panics
///
/// Panics if `a` or `b` is shorter than `out`.
#[inline]
pub fn apply<T: Element, O: BinaryOp>(out: &mut [T], a: &[T], b: &[T]) {
    let len = out.len();
    sweep::<T, O>(out, Some(&a[..len]), &b[..len]);
}

/// In-place form of [`apply`]: `acc[i] = acc[i] <op> rhs[i]`.
///
/// This is the aliased `out == a` call pattern; the result equals computing
/// into a temporary and copying it back.
///
/// # Panics
///
/// Panics if `rhs` is shorter than `acc`.
#[inline]
pub fn apply_in_place<T: Element, O: BinaryOp>(acc: &mut [T], rhs: &[T]) {
    let len = acc.len();
    sweep::<T, O>(acc, None, &rhs[..len]);
}

/// `out[i] = a[i] + b[i]`
pub fn add<T: Element>(out: &mut [T], a: &[T], b: &[T]) {
    apply::<T, Add>(out, a, b)
}

/// `out[i] = a[i] * b[i]`
pub fn mul<T: Element>(out: &mut [T], a: &[T], b: &[T]) {
    apply::<T, Mul>(out, a, b)
}

/// `acc[i] += b[i]`
pub fn add_assign<T: Element>(acc: &mut [T], b: &[T]) {
    apply_in_place::<T, Add>(acc, b)
}

/// `acc[i] *= b[i]`
pub fn mul_assign<T: Element>(acc: &mut [T], b: &[T]) {
    apply_in_place::<T, Mul>(acc, b)
}
