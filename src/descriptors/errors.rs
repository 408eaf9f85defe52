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

//! Every error in this crate is a violation of the input contract; nothing is
//! retryable. Functions return `FailResult`, and callers who care about the kind
//! of failure can `downcast_ref` to one of these.

/// The type quota or type table disagrees with the declared number of types.
#[derive(Debug, Fail)]
#[fail(display = "configuration error: {}", message)]
pub struct ConfigurationError {
    pub message: String,
}

impl ConfigurationError {
    pub(crate) fn new(message: impl Into<String>) -> Self
    { ConfigurationError { message: message.into() } }
}

/// Two real atoms sit on top of each other, or a coordinate is not finite.
#[derive(Debug, Fail)]
pub enum DegenerateGeometryError {
    #[fail(
        display = "atoms {} and {} are {:e} apart (minimum allowed distance: {:e})",
        center, neighbor, distance, min_distance
    )]
    Coincident {
        center: usize,
        neighbor: usize,
        distance: f64,
        min_distance: f64,
    },

    #[fail(display = "atom {} has a non-finite coordinate: {:?}", atom, coord)]
    NonFinite {
        atom: usize,
        coord: [f64; 3],
    },
}

/// An array handed in by the caller does not have the length this engine expects.
///
/// When this comes from the backward pass, the caller and the engine have fallen
/// out of sync; the frame's computation is abandoned.
#[derive(Debug, Fail)]
#[fail(display = "shape mismatch in {}: expected {} elements, got {}", what, expected, actual)]
pub struct ShapeMismatchError {
    pub what: &'static str,
    pub expected: usize,
    pub actual: usize,
}

impl ShapeMismatchError {
    pub(crate) fn check(what: &'static str, expected: usize, actual: usize) -> Result<(), Self> {
        match expected == actual {
            true => Ok(()),
            false => Err(ShapeMismatchError { what, expected, actual }),
        }
    }
}

/// The mask and the atom types tell different stories about which atoms are real.
#[derive(Debug, Fail)]
pub enum MaskInconsistencyError {
    #[fail(display = "atom {} is marked real but has the virtual type", atom)]
    RealWithoutType { atom: usize },

    #[fail(display = "atom {} is marked virtual but has type {}", atom, atom_type)]
    VirtualWithType { atom: usize, atom_type: i32 },

    #[fail(display = "natoms vector claims {} {}, but the mask has {}", expected, what, actual)]
    CountMismatch { what: String, expected: usize, actual: usize },
}
