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

//! A small fixed-size vector type for cartesian coordinates.
//!
//! Only what the descriptor crates need lives here: a 3-vector of `f64` with
//! the arithmetic operators, plus zero-cost conversions to and from `[f64; 3]`.

#[cfg(test)]
#[macro_use]
extern crate rsp2_assert_close;

mod vector;
mod conv;

pub use crate::vector::{V3, dot};
pub use crate::conv::{Envee, Unvee};
