use crate::numerics::{
    elementwise::{self, Add, Mul},
    lanes::Element,
    reduction,
};

/// Method-call access to the kernels on plain slices. The trait only has one
/// implementation, and exists because inherent impl blocks cannot be added
/// to `[T]` from outside the standard library.
///
/// # Contract
///
/// - Operations involving two slices require `other` to be at least as long
///   as `self`; extra elements of `other` are ignored.
pub trait VectorLike<T: Element> {
    /// Sum of all elements, see [`reduction::sum`].
    fn lane_sum(&self) -> T;

    /// `self[i] += other[i]`
    fn add_from(&mut self, other: &[T]);

    /// `self[i] *= other[i]`
    fn mul_from(&mut self, other: &[T]);
}

impl<T: Element> VectorLike<T> for [T] {
    #[inline]
    fn lane_sum(&self) -> T {
        reduction::sum(self)
    }

    /// # Panics
    ///
    /// Panics if `other` is shorter than `self`.
    #[inline]
    fn add_from(&mut self, other: &[T]) {
        elementwise::apply_in_place::<T, Add>(self, other)
    }

    /// # Panics
    ///
    /// Panics if `other` is shorter than `self`.
    #[inline]
    fn mul_from(&mut self, other: &[T]) {
        elementwise::apply_in_place::<T, Mul>(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_match_free_functions() {
        let a: Vec<f32> = (0..19).map(|i| i as f32 * 0.5).collect();
        let b: Vec<f32> = (0..19).map(|i| 3.0 - i as f32).collect();

        let mut via_method = a.clone();
        via_method.add_from(&b);
        let mut via_fn = vec![0.0; 19];
        elementwise::add(&mut via_fn, &a, &b);
        assert_eq!(via_method, via_fn);

        via_method.copy_from_slice(&a);
        via_method.mul_from(&b);
        elementwise::mul(&mut via_fn, &a, &b);
        assert_eq!(via_method, via_fn);

        assert_eq!(a.lane_sum(), reduction::sum(&a));
    }

    #[test]
    fn works_on_subslices() {
        let mut acc = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
        acc[1..4].add_from(&[10.0, 10.0, 10.0]);
        assert_eq!(acc, [1.0, 12.0, 13.0, 14.0, 5.0, 6.0]);
        assert_eq!(acc[..2].lane_sum(), 13.0);
    }
}
