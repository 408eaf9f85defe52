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

pub(crate) mod switch {
    /// Switches from 0 to 1 as x goes from `interval.0` to `interval.1`.
    ///
    /// Returns the value and its derivative with respect to `x`.
    #[inline(always)] // elide direction check hopefully since intervals should be constant
    pub(crate) fn poly5(interval: (f64, f64), x: f64) -> (f64, f64) {
        match IntervalSide::classify(interval, x) {
            IntervalSide::Left => (0.0, 0.0),
            IntervalSide::Inside => raw_poly5(interval, x),
            IntervalSide::Right => (1.0, 0.0),
        }
    }

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum IntervalSide { Left, Inside, Right }
    impl IntervalSide {
        /// Determine if a value is before the beginning or after the end of a directed interval
        /// (directed as in, `interval.1 < interval.0` is ok and flips the classifications of ±∞)
        ///
        /// Neither endpoint is considered to lie in the interval.
        #[inline(always)]
        fn classify(interval: (f64, f64), x: f64) -> Self {
            if interval.0 < interval.1 {
                match x {
                    x if x <= interval.0 => IntervalSide::Left,
                    x if interval.1 <= x => IntervalSide::Right,
                    _ => IntervalSide::Inside,
                }
            } else {
                match x {
                    x if interval.0 <= x => IntervalSide::Left,
                    x if x <= interval.1 => IntervalSide::Right,
                    _ => IntervalSide::Inside,
                }
            }
        }
    }

    // Solution to:  y[x0] = 0;  y'[x0] = 0;  y''[x0] = 0;
    //               y[x1] = 1;  y'[x1] = 0;  y''[x1] = 0;
    fn raw_poly5((x_lo, x_hi): (f64, f64), x: f64) -> (f64, f64) {
        let alpha_d_x = (x_hi - x_lo).recip();
        let alpha = (x - x_lo) * alpha_d_x;

        let alpha2 = alpha * alpha;
        let alpha3 = alpha2 * alpha;
        let alpha4 = alpha2 * alpha2;
        let alpha5 = alpha2 * alpha3;
        let value = 10.0 * alpha3 - 15.0 * alpha4 + 6.0 * alpha5;
        let d_alpha = 30.0 * alpha2 - 60.0 * alpha3 + 30.0 * alpha4;

        (value, d_alpha * alpha_d_x)
    }

}

#[cfg(test)]
pub(crate) fn uniform(a: f64, b: f64) -> f64 { rand::random::<f64>() * (b - a) + a }

/// Utilities for numeric differentiation, for checking analytic derivatives in tests.
#[cfg(test)]
pub(crate) mod numerical {
    use rsp2_array_types::V3;

    /// n-point stencil. `n` must be odd. Only implemented for `n = 3, 5, 7`.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub(crate) struct Stencil(pub u32);

    impl Default for Stencil {
        fn default() -> Stencil { Stencil(5) }
    }

    /// Compute a numerical derivative using finite differences.
    pub(crate) fn slope(
        step: f64,
        kind: Option<Stencil>,
        point: f64,
        mut value_fn: impl FnMut(f64) -> f64,
    ) -> f64 {
        // http://www.holoborodko.com/pavel/numerical-methods/numerical-derivative/central-differences/
        let (terms, denom): (&[(f64, f64)], f64) = match kind.unwrap_or_default() {
            Stencil(3) => (&[(-1.0, -1.0), (1.0, 1.0)], 2.0),
            Stencil(5) => (&[(-2.0, 1.0), (-1.0, -8.0), (1.0, 8.0), (2.0, -1.0)], 12.0),
            Stencil(7) => (&[
                (-3.0, -1.0), (-2.0, 9.0), (-1.0, -45.0),
                (1.0, 45.0), (2.0, -9.0), (3.0, 1.0),
            ], 60.0),
            Stencil(n) => panic!("{}-point stencil is not implemented", n),
        };
        let numer: f64 = terms.iter().map(|&(offset, coeff)| coeff * value_fn(point + offset * step)).sum();
        numer / (denom * step)
    }

    /// Numerical gradient of a function of one position.
    pub(crate) fn num_grad_v3(
        step: f64,
        point: V3,
        mut value_fn: impl FnMut(V3) -> f64,
    ) -> V3 {
        V3::from_fn(|k| slope(step, None, point[k], |x| {
            let mut moved = point;
            moved[k] = x;
            value_fn(moved)
        }))
    }

    #[cfg(test)]
    #[deny(unused)]
    mod tests {
        use super::*;

        #[test]
        fn polynomial() {
            // a 5-point stencil is exact for quartics, up to rounding
            let f = |x: f64| 3.0 * x.powi(4) - x.powi(2) + 2.0;
            let df = |x: f64| 12.0 * x.powi(3) - 2.0 * x;
            for &x in &[-1.5, 0.0, 0.3, 2.0] {
                assert_close!(rel=1e-9, abs=1e-9, slope(1e-3, None, x, f), df(x));
                assert_close!(rel=1e-5, abs=1e-6, slope(1e-3, Some(Stencil(3)), x, f), df(x));
            }
        }

        #[test]
        fn gradient() {
            let point = V3([1.0, -2.0, 0.5]);
            let grad = num_grad_v3(1e-3, point, |v| v[0] * v[1] + v[2] * v[2]);
            assert_close!(rel=1e-9, abs=1e-9, grad.0, [-2.0, 1.0, 1.0]);
        }
    }
}
