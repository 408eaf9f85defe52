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

//! Environment matrices for the masked, non-periodic flavor of the smooth-edition
//! ("se_a") descriptor, along with the force reduction that consumes them.
//!
//! A forward pass goes
//!
//! ```text
//! Frame ──neighbor::build──▶ NeighborList ──env_mat::encode──▶ Environment
//! ```
//!
//! and hands `Environment::to_flat()` to an embedding network living elsewhere.
//! The network's gradient with respect to that same flat array comes back into
//! `prod_force::compute`, which turns it into forces.
//!
//! Frames have a fixed number of atom slots. Slots whose mask bit is zero are
//! "virtual" atoms that exist only as padding; they never appear as neighbors,
//! have all-zero environment rows, and never receive force.
//!
//! # Conventions
//!
//! As elsewhere in rsp2, the derivative of `foo` with respect to `bar` is named
//! `foo_d_bar`, and `delta` is always `pos_neighbor - pos_center`.

#[cfg(test)]
#[macro_use] extern crate rsp2_assert_close;

#[macro_use] extern crate failure;
#[macro_use] extern crate log;

// Return early with anything convertible into a failure::Error.
macro_rules! throw {
    ($e:expr) => {
        return Err(::std::convert::Into::into($e))
    }
}

mod errors;
mod frame;
mod types;
mod descriptor;
pub mod neighbor;
pub mod env_mat;
pub mod prod_force;
pub(crate) mod util;

pub use crate::errors::{
    ConfigurationError,
    DegenerateGeometryError,
    ShapeMismatchError,
    MaskInconsistencyError,
};
pub use crate::frame::{Frame, NatomsVec, VIRTUAL_TYPE};
pub use crate::types::{TypeQuota, ExcludedTypes, TypePair, TypePairTable};
pub use crate::neighbor::NeighborList;
pub use crate::env_mat::{Encoder, Environment, Switch};
pub use crate::prod_force::ForceOutput;
pub use crate::descriptor::{SeMask, Params, Precision};

pub type FailResult<T> = Result<T, failure::Error>;
