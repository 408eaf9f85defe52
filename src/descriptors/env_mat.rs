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

//! The environment matrix and its Jacobian.
//!
//! For a filled slot with `delta = pos_neighbor - pos_center`, `r = |delta|`, the row is
//!
//! ```text
//! (s(r), s(r) delta_x / r, s(r) delta_y / r, s(r) delta_z / r)
//! ```
//!
//! The derivative of each row with respect to `delta` is computed in closed form
//! and stored. Since the row depends on the two positions only through `delta`,
//! the derivative with respect to the center's position is just its negation.

use crate::FailResult;
use crate::errors::{ConfigurationError, DegenerateGeometryError};
use crate::descriptor::Precision;
use crate::frame::Frame;
use crate::neighbor::NeighborList;
use crate::types::ExcludedTypes;
use crate::util::switch;

use rsp2_array_types::V3;
use rayon_cond::CondIterator;
use slice_of_array::prelude::*;

/// Radial weight applied to each environment row.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Switch {
    /// `s(r) = 1/r` everywhere.
    Inverse,
    /// `1/r` inside `rcut_smth`, tapering smoothly to zero at `rcut`.
    ///
    /// This does not affect which neighbors get slots.
    Smooth { rcut_smth: f64, rcut: f64 },
}

impl Default for Switch {
    fn default() -> Self { Switch::Inverse }
}

impl Switch {
    pub fn smooth(rcut_smth: f64, rcut: f64) -> FailResult<Switch> {
        if !(rcut_smth.is_finite() && rcut.is_finite() && 0.0 <= rcut_smth && rcut_smth < rcut) {
            throw!(ConfigurationError::new(format!(
                "smooth switch needs 0 <= rcut_smth < rcut (got rcut_smth = {}, rcut = {})",
                rcut_smth, rcut,
            )));
        }
        Ok(Switch::Smooth { rcut_smth, rcut })
    }

    /// The distance beyond which rows vanish, if there is one.
    pub fn rcut(&self) -> Option<f64> {
        match *self {
            Switch::Inverse => None,
            Switch::Smooth { rcut, .. } => Some(rcut),
        }
    }

    /// `(s, s_d_r)`
    #[inline]
    pub fn compute(&self, r: f64) -> (f64, f64) {
        let inv_r = r.recip();
        match *self {
            Switch::Inverse => (inv_r, -inv_r * inv_r),
            Switch::Smooth { rcut_smth, rcut } => {
                let (weight, weight_d_r) = switch::poly5((rcut, rcut_smth), r);
                let value = weight * inv_r;
                let value_d_r = weight_d_r * inv_r - weight * inv_r * inv_r;
                (value, value_d_r)
            },
        }
    }
}

//------------------------------------------------------------------

/// Everything needed to turn a neighbor list into an environment matrix.
#[derive(Debug, Clone)]
pub struct Encoder {
    pub switch: Switch,
    pub excluded: ExcludedTypes,
    /// Filled slots closer than this are an error.
    pub min_distance: f64,
    pub precision: Precision,
}

impl Encoder {
    pub fn encode(
        &self,
        frame: &Frame,
        nlist: NeighborList,
        parallel: bool,
    ) -> FailResult<Environment> {
        let nnei = nlist.nnei();
        let coords = frame.coords();

        let per_atom = CondIterator::new(0..nlist.num_atoms(), parallel).map(|center| -> FailResult<_> {
            let mut rows = vec![[0.0; 4]; nnei];
            let mut rows_d_delta = vec![[V3::zero(); 4]; nnei];
            let mut deltas = vec![V3::zero(); nnei];

            let center_type = match frame.atom_type(center) {
                Some(ty) => ty,
                None => return Ok((rows, rows_d_delta, deltas)),
            };
            for (slot, neighbor) in nlist.filled(center) {
                let neighbor_type = match frame.atom_type(neighbor) {
                    Some(ty) => ty,
                    None => continue,
                };

                let delta = coords[neighbor] - coords[center];
                let distance = delta.norm();
                if !(distance >= self.min_distance && distance > 0.0) {
                    throw!(DegenerateGeometryError::Coincident {
                        center, neighbor, distance,
                        min_distance: self.min_distance,
                    });
                }
                deltas[slot] = self.precision.round_v3(delta);

                if self.excluded.contains(center_type, neighbor_type) {
                    continue;
                }

                let env_row::Output { row, row_d_delta } = env_row::Input {
                    switch: &self.switch,
                    delta,
                }.compute();
                rows[slot] = row.map(|x| self.precision.round(x));
                rows_d_delta[slot] = row_d_delta.map(|v| self.precision.round_v3(v));
            }
            Ok((rows, rows_d_delta, deltas))
        }).collect::<FailResult<Vec<_>>>()?;

        let num_atoms = nlist.num_atoms();
        let mut rows = Vec::with_capacity(num_atoms * nnei);
        let mut rows_d_delta = Vec::with_capacity(num_atoms * nnei);
        let mut deltas = Vec::with_capacity(num_atoms * nnei);
        for (atom_rows, atom_rows_d_delta, atom_deltas) in per_atom {
            rows.extend(atom_rows);
            rows_d_delta.extend(atom_rows_d_delta);
            deltas.extend(atom_deltas);
        }

        debug!("environment matrix: {} x {} x 4", num_atoms, nnei);
        Ok(Environment { nlist, rows, rows_d_delta, deltas })
    }
}

mod env_row {
    use super::*;

    pub(super) struct Input<'a> {
        pub switch: &'a Switch,
        pub delta: V3,
    }

    pub(super) struct Output {
        pub row: [f64; 4],
        pub row_d_delta: [V3; 4],
    }

    impl<'a> Input<'a> {
        pub(super) fn compute(self) -> Output { compute(self) }
    }

    // free function for smaller indent
    fn compute(input: Input<'_>) -> Output {
        let Input { switch, delta } = input;

        let r = delta.norm();
        let inv_r = r.recip();
        let unit = delta * inv_r;
        let (s, s_d_r) = switch.compute(r);

        // d(r)/d(delta_b) = unit_b
        // d(unit_a)/d(delta_b) = (δ_ab - unit_a unit_b) / r
        let mut row = [s, 0.0, 0.0, 0.0];
        let mut row_d_delta = [unit * s_d_r, V3::zero(), V3::zero(), V3::zero()];
        for a in 0..3 {
            row[a + 1] = s * unit[a];
            row_d_delta[a + 1] = V3::from_fn(|b| {
                let kronecker = if a == b { 1.0 } else { 0.0 };
                s_d_r * unit[a] * unit[b] + s * (kronecker - unit[a] * unit[b]) * inv_r
            });
        }
        Output { row, row_d_delta }
    }
}

//------------------------------------------------------------------

/// The environment matrix of a frame, along with what the backward pass needs.
///
/// Indexed by `(center, slot)` where the slot indexes the center's neighbor list.
/// Rows are exactly zero for unfilled slots, virtual atoms, and excluded type pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    nlist: NeighborList,
    rows: Vec<[f64; 4]>,
    rows_d_delta: Vec<[V3; 4]>,
    deltas: Vec<V3>,
}

impl Environment {
    pub fn nlist(&self) -> &NeighborList { &self.nlist }
    pub fn nnei(&self) -> usize { self.nlist.nnei() }
    pub fn num_atoms(&self) -> usize { self.nlist.num_atoms() }

    #[inline]
    fn index(&self, center: usize, slot: usize) -> usize {
        assert!(slot < self.nnei());
        center * self.nnei() + slot
    }

    pub fn row(&self, center: usize, slot: usize) -> [f64; 4] {
        self.rows[self.index(center, slot)]
    }

    /// Derivative of each component of a row with respect to the neighbor's position.
    pub fn row_d_neighbor(&self, center: usize, slot: usize) -> [V3; 4] {
        self.rows_d_delta[self.index(center, slot)]
    }

    /// Derivative of each component of a row with respect to the center's position.
    pub fn row_d_center(&self, center: usize, slot: usize) -> [V3; 4] {
        self.row_d_neighbor(center, slot).map(|v| -v)
    }

    /// `pos_neighbor - pos_center`, or zero for unfilled slots.
    pub fn delta(&self, center: usize, slot: usize) -> V3 {
        self.deltas[self.index(center, slot)]
    }

    /// `[num_atoms, nnei * 4]`, the layout handed to the embedding network.
    pub fn to_flat(&self) -> Vec<f64> { self.rows.flat().to_vec() }

    /// `[num_atoms, nnei * 4 * 3]`, derivatives with respect to the neighbor position.
    pub fn jacobian_flat(&self) -> Vec<f64> {
        self.rows_d_delta.flat().flat().to_vec()
    }

    /// `[num_atoms, nnei * 3]`
    pub fn deltas_flat(&self) -> Vec<f64> { self.deltas.flat().to_vec() }
}

//------------------------------------------------------------------
