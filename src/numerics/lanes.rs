use std::{
    fmt::Debug,
    ops::{Add, AddAssign, Mul},
    simd::{Simd, SimdElement, num::SimdFloat},
};

/// One vector lane width: a register holding `LANES` elements of type `T`.
///
/// Every tier of the sweep (wide vector, narrow vector, single scalar) is a
/// `Register`, so the elementwise and reduction loops are written once and
/// instantiated per tier. Loads and stores are unaligned: they read/write
/// the first `LANES` elements of the slice they are handed.
///
/// # Panics
///
/// `load` and `store` panic if the slice holds fewer than `LANES` elements.
pub trait Register<T>: Copy + Add<Output = Self> + Mul<Output = Self> + AddAssign {
    const LANES: usize;

    fn zero() -> Self;
    fn load(src: &[T]) -> Self;
    fn store(self, dst: &mut [T]);

    /// Horizontal reduction of all lanes into one scalar.
    fn reduce_sum(self) -> T;
}

macro_rules! simd_register {
    ($elem:ty, $lanes:literal) => {
        impl Register<$elem> for Simd<$elem, $lanes> {
            const LANES: usize = $lanes;

            #[inline(always)]
            fn zero() -> Self {
                Simd::splat(0.0)
            }

            #[inline(always)]
            fn load(src: &[$elem]) -> Self {
                Simd::from_slice(src)
            }

            #[inline(always)]
            fn store(self, dst: &mut [$elem]) {
                self.copy_to_slice(dst)
            }

            #[inline(always)]
            fn reduce_sum(self) -> $elem {
                SimdFloat::reduce_sum(self)
            }
        }
    };
}

macro_rules! scalar_register {
    ($elem:ty) => {
        impl Register<$elem> for $elem {
            const LANES: usize = 1;

            #[inline(always)]
            fn zero() -> Self {
                0.0
            }

            #[inline(always)]
            fn load(src: &[$elem]) -> Self {
                src[0]
            }

            #[inline(always)]
            fn store(self, dst: &mut [$elem]) {
                dst[0] = self
            }

            #[inline(always)]
            fn reduce_sum(self) -> $elem {
                self
            }
        }
    };
}

// 256-bit and 128-bit registers for both precisions.
simd_register!(f32, 8);
simd_register!(f32, 4);
simd_register!(f64, 4);
simd_register!(f64, 2);

scalar_register!(f32);
scalar_register!(f64);

/// A floating-point precision the kernels operate on.
///
/// The element type is its own scalar tier; `Wide` and `Narrow` name the
/// vector registers used for the first two tiers of the sweep. The set of
/// tiers is fixed when the crate is built, there is no runtime dispatch.
pub trait Element: SimdElement + Register<Self> + Debug + PartialEq + PartialOrd + 'static {
    type Wide: Register<Self>;
    type Narrow: Register<Self>;

    const NAME: &'static str;
    const EPSILON: Self;

    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
}

impl Element for f32 {
    type Wide = Simd<f32, 8>;
    type Narrow = Simd<f32, 4>;

    const NAME: &'static str = "f32";
    const EPSILON: Self = f32::EPSILON;

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Element for f64 {
    type Wide = Simd<f64, 4>;
    type Narrow = Simd<f64, 2>;

    const NAME: &'static str = "f64";
    const EPSILON: Self = f64::EPSILON;

    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

/// Lane counts of every tier for `T`, widest first: `[W1, W2, 1]`.
pub fn tier_widths<T: Element>() -> [usize; 3] {
    [
        <T::Wide as Register<T>>::LANES,
        <T::Narrow as Register<T>>::LANES,
        <T as Register<T>>::LANES,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_256_then_128_bits() {
        assert_eq!(tier_widths::<f32>(), [8, 4, 1]);
        assert_eq!(tier_widths::<f64>(), [4, 2, 1]);

        let [w1, w2, _] = tier_widths::<f32>();
        assert_eq!(w1 * size_of::<f32>() * 8, 256);
        assert_eq!(w2 * size_of::<f32>() * 8, 128);
    }

    #[test]
    fn tiers_are_strictly_descending() {
        for widths in [tier_widths::<f32>(), tier_widths::<f64>()] {
            assert!(widths.windows(2).all(|w| w[0] > w[1]));
            assert_eq!(widths[2], 1);
        }
    }

    #[test]
    fn load_reads_only_the_leading_lanes() {
        let src = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let reg = <Simd<f32, 4> as Register<f32>>::load(&src);
        assert_eq!(reg.to_array(), [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn store_leaves_trailing_elements_untouched() {
        let mut dst = [0.0f64; 3];
        Register::<f64>::store(Simd::<f64, 2>::from_array([7.0, 8.0]), &mut dst);
        assert_eq!(dst, [7.0, 8.0, 0.0]);
    }

    #[test]
    fn horizontal_reduction_adds_every_lane() {
        let reg = Simd::<f32, 8>::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(Register::<f32>::reduce_sum(reg), 36.0);

        let reg = Simd::<f64, 2>::from_array([0.5, 0.25]);
        assert_eq!(Register::<f64>::reduce_sum(reg), 0.75);
    }

    #[test]
    fn scalar_tier_is_the_element_itself() {
        let mut dst = [0.0f32; 2];
        let v = <f32 as Register<f32>>::load(&[3.5, 9.0]);
        v.store(&mut dst[1..]);
        assert_eq!(dst, [0.0, 3.5]);
        assert_eq!(Register::<f32>::reduce_sum(v), 3.5);
        assert_eq!(<f32 as Register<f32>>::zero(), 0.0);
    }

    #[test]
    #[should_panic]
    fn load_panics_on_short_slice() {
        let _ = <Simd<f64, 4> as Register<f64>>::load(&[1.0, 2.0, 3.0]);
    }

    #[test]
    fn conversions_round_trip_through_f64() {
        assert_eq!(f32::from_f64(1.5).to_f64(), 1.5);
        assert_eq!(f64::from_f64(-2.25), -2.25);
        assert_eq!(<f32 as Element>::NAME, "f32");
        assert_eq!(<f64 as Element>::EPSILON, f64::EPSILON);
    }
}
