/* ************************************************************************ **
** This file is part of rsp2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
**                                                                          **
** Be aware that not all of rsp2 is provided under this permissive license, **
** and that the project as a whole is licensed under the GPL 3.0.           **
** ************************************************************************ */

use std::ops::{Add, Sub, AddAssign, Neg};
use std::ops::{Mul, Div};
use std::ops::{Deref, DerefMut};
use std::fmt;

/// A 3-dimensional vector with operations for linear algebra.
#[derive(Copy, Clone, PartialEq, PartialOrd, Default)]
pub struct V3<X = f64>(pub [X; 3]);

// Behaves generally like its backing array type.
impl<X> Deref for V3<X> {
    type Target = [X; 3];

    #[inline(always)]
    fn deref(&self) -> &Self::Target
    { &self.0 }
}

impl<X> DerefMut for V3<X> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target
    { &mut self.0 }
}

impl<'a, X> IntoIterator for &'a V3<X> {
    type Item = &'a X;
    type IntoIter = std::slice::Iter<'a, X>;

    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter
    { self.0.iter() }
}

// forward the debug impl without a surrounding "V3(...)", so that debug output
// of coordinate lists is valid JSON
impl<X: fmt::Debug> fmt::Debug for V3<X> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    { fmt::Debug::fmt(&self.0, f) }
}

impl<X> V3<X> {
    /// Construct a vector from a function of the index.
    #[inline(always)]
    pub fn from_fn(mut f: impl FnMut(usize) -> X) -> Self
    { V3([f(0), f(1), f(2)]) }

    /// Apply a function to each element.
    #[inline(always)]
    pub fn map<B>(self, mut f: impl FnMut(X) -> B) -> V3<B> {
        let V3([a, b, c]) = self;
        V3([f(a), f(b), f(c)])
    }
}

impl V3 {
    #[inline(always)]
    pub fn zero() -> Self
    { V3([0.0; 3]) }

    #[inline(always)]
    pub fn dot(&self, other: &V3) -> f64
    { self[0] * other[0] + self[1] * other[1] + self[2] * other[2] }

    #[inline(always)]
    pub fn sqnorm(&self) -> f64
    { self.dot(self) }

    #[inline(always)]
    pub fn norm(&self) -> f64
    { self.sqnorm().sqrt() }

    /// Normalize to a unit vector.  The zero vector produces NaNs.
    #[inline]
    pub fn unit(&self) -> V3
    { *self / self.norm() }

    /// True when no element is infinite or NaN.
    #[inline]
    pub fn is_finite(&self) -> bool
    { self.iter().all(|x| x.is_finite()) }
}

/// Free-function form of `V3::dot`.
#[inline(always)]
pub fn dot(a: &V3, b: &V3) -> f64
{ a.dot(b) }

// ---------------------------------------------------------------------------
// operators

macro_rules! impl_binops {
    ($([$($lt_a:lifetime)?, $($ref_a:tt)*] [$($lt_b:lifetime)?, $($ref_b:tt)*])*) => {$(
        impl<$($lt_a,)? $($lt_b)?> Add<$($ref_b)* V3> for $($ref_a)* V3 {
            type Output = V3;

            #[inline(always)]
            fn add(self, other: $($ref_b)* V3) -> V3
            { V3::from_fn(|k| self.0[k] + other.0[k]) }
        }

        impl<$($lt_a,)? $($lt_b)?> Sub<$($ref_b)* V3> for $($ref_a)* V3 {
            type Output = V3;

            #[inline(always)]
            fn sub(self, other: $($ref_b)* V3) -> V3
            { V3::from_fn(|k| self.0[k] - other.0[k]) }
        }
    )*};
}

impl_binops!{
    [, ] [, ]
    [, ] ['b, &'b]
    ['a, &'a] [, ]
    ['a, &'a] ['b, &'b]
}

macro_rules! impl_scalar_ops {
    ($([$($lt:lifetime)?, $($r:tt)*])*) => {$(
        impl<$($lt)?> Mul<f64> for $($r)* V3 {
            type Output = V3;

            #[inline(always)]
            fn mul(self, scale: f64) -> V3
            { V3::from_fn(|k| self.0[k] * scale) }
        }

        impl<$($lt)?> Mul<$($r)* V3> for f64 {
            type Output = V3;

            #[inline(always)]
            fn mul(self, vec: $($r)* V3) -> V3
            { V3::from_fn(|k| self * vec.0[k]) }
        }

        impl<$($lt)?> Div<f64> for $($r)* V3 {
            type Output = V3;

            #[inline(always)]
            fn div(self, scale: f64) -> V3
            { V3::from_fn(|k| self.0[k] / scale) }
        }

        impl<$($lt)?> Neg for $($r)* V3 {
            type Output = V3;

            #[inline(always)]
            fn neg(self) -> V3
            { V3::from_fn(|k| -self.0[k]) }
        }
    )*};
}

impl_scalar_ops!{
    [, ]
    ['a, &'a]
}

impl<'a> AddAssign<&'a V3> for V3 {
    #[inline(always)]
    fn add_assign(&mut self, other: &'a V3) {
        for k in 0..3 {
            self.0[k] += other.0[k];
        }
    }
}

impl AddAssign for V3 {
    #[inline(always)]
    fn add_assign(&mut self, other: V3)
    { *self += &other; }
}

impl std::iter::Sum for V3 {
    fn sum<I: Iterator<Item=V3>>(iter: I) -> V3
    { iter.fold(V3::zero(), |a, b| a + b) }
}

impl<'a> std::iter::Sum<&'a V3> for V3 {
    fn sum<I: Iterator<Item=&'a V3>>(iter: I) -> V3
    { iter.fold(V3::zero(), |a, b| a + b) }
}

// slice-of-array integration, so that flat coordinate buffers can be viewed
// with `coords.nest::<V3>()` and force buffers flattened with `forces.flat()`.
unsafe impl<X> slice_of_array::IsSliceomorphic for V3<X> {
    type Element = X;
    const LEN: usize = 3;
}

#[cfg(test)]
mod tests {
    use super::*;
    use slice_of_array::prelude::*;

    #[test]
    fn arithmetic() {
        let a = V3([1.0, 2.0, 3.0]);
        let b = V3([0.5, -1.0, 4.0]);
        assert_eq!(a + b, V3([1.5, 1.0, 7.0]));
        assert_eq!(&a - &b, V3([0.5, 3.0, -1.0]));
        assert_eq!(2.0 * a, a * 2.0);
        assert_eq!(-a / 2.0, V3([-0.5, -1.0, -1.5]));
        assert_eq!(a.dot(&b), 0.5 - 2.0 + 12.0);

        let mut c = a;
        c += b;
        c += &a;
        assert_eq!(c, V3([2.5, 3.0, 10.0]));
    }

    #[test]
    fn norms() {
        let v = V3([3.0, 0.0, 4.0]);
        assert_eq!(v.sqnorm(), 25.0);
        assert_eq!(v.norm(), 5.0);
        assert_close!(abs=1e-15, v.unit().0, [0.6, 0.0, 0.8]);
        assert!(!V3([0.0, std::f64::NAN, 0.0]).is_finite());
    }

    #[test]
    fn sum_and_nest() {
        let flat = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let vs: &[V3] = flat.nest();
        assert_eq!(vs.iter().sum::<V3>(), V3([5.0, 7.0, 9.0]));
        assert_eq!(vs.flat(), &flat[..]);
    }
}
