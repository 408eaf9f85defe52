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

use crate::V3;

/// Conversions from sequences of arrays into sequences of `V3`.
pub trait Envee {
    fn envee(self) -> Vec<V3>;
}

/// Conversions from sequences of `V3` into sequences of arrays.
///
/// Mostly useful for handing vectors to `assert_close!` or to serde.
pub trait Unvee {
    fn unvee(self) -> Vec<[f64; 3]>;
}

impl Envee for Vec<[f64; 3]> {
    fn envee(self) -> Vec<V3>
    { self.into_iter().map(V3).collect() }
}

impl<'a> Envee for &'a [[f64; 3]] {
    fn envee(self) -> Vec<V3>
    { self.iter().cloned().map(V3).collect() }
}

impl Unvee for Vec<V3> {
    fn unvee(self) -> Vec<[f64; 3]>
    { self.into_iter().map(|v| v.0).collect() }
}

impl<'a> Unvee for &'a [V3] {
    fn unvee(self) -> Vec<[f64; 3]>
    { self.iter().map(|v| v.0).collect() }
}
