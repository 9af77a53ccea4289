use crate::numerics::lanes::{Element, Register};

/// Folds one vector tier of `a` into `total`, starting at `start`.
///
/// The tier accumulator is only reset once per tier. After the tier is
/// exhausted its lanes are reduced horizontally and added to the running
/// scalar total.
#[inline(always)]
fn accumulate_tier<T, R>(a: &[T], start: usize, total: &mut T) -> usize
where
    T: Element,
    R: Register<T>,
{
    let len = a.len();
    let mut i = start;
    let mut acc = R::zero();
    while len - i >= R::LANES {
        acc += R::load(&a[i..]);
        i += R::LANES;
    }
    *total = *total + acc.reduce_sum();
    i
}

/// Sum of every element of `a`.
///
/// Wide and narrow tiers each accumulate lane-wise and are reduced once; the
/// tail is added element by element. The summation order therefore differs
/// from a left-to-right loop and the results may differ by ordinary rounding
/// error. An empty slice sums to `0`.
#[inline]
pub fn sum<T: Element>(a: &[T]) -> T {
    let mut total = <T as Register<T>>::zero();

    let i = accumulate_tier::<T, T::Wide>(a, 0, &mut total);
    let i = accumulate_tier::<T, T::Narrow>(a, i, &mut total);
    for &x in &a[i..] {
        total = total + x;
    }

    total
}
