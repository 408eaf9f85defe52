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

//! Force reduction: turns the gradient of an energy with respect to the
//! environment matrix into forces on atoms.

use crate::FailResult;
use crate::errors::ShapeMismatchError;
use crate::env_mat::Environment;
use crate::frame::Frame;

use rsp2_array_types::V3;
use rayon_cond::CondIterator;
use slice_of_array::prelude::*;

/// Forces and virials of one frame.
///
/// The virials are always zero here; they exist so that the output has the same
/// shape as that of periodic descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceOutput {
    pub force: Vec<V3>,
    pub virial: [f64; 9],
    pub atom_virial: Vec<[f64; 9]>,
}

impl ForceOutput {
    /// `[num_atoms * 3]`
    pub fn force_flat(&self) -> Vec<f64> { self.force.flat().to_vec() }

    /// `[num_atoms * 9]`
    pub fn atom_virial_flat(&self) -> Vec<f64> { self.atom_virial.flat().to_vec() }
}

/// Compute forces from `net_deriv`, the gradient of the energy with respect to
/// `env.to_flat()`.
///
/// The sum is carried out in a fixed order (center atoms ascending, then slots
/// ascending), so the output does not depend on `parallel`.
pub fn compute(
    frame: &Frame,
    env: &Environment,
    net_deriv: &[f64],
    parallel: bool,
) -> FailResult<ForceOutput> {
    let num_atoms = env.num_atoms();
    let nnei = env.nnei();
    ShapeMismatchError::check("frame (atom slots)", num_atoms, frame.num_slots())?;
    ShapeMismatchError::check("net_deriv", num_atoms * nnei * 4, net_deriv.len())?;
    let net_deriv: &[[f64; 4]] = net_deriv.nest();

    // Each center produces the force on itself, plus terms for its neighbors which
    // can't be written from parallel code. Those get added in a short serial
    // segment at the end.
    let per_center = CondIterator::new(0..num_atoms, parallel).map(|center| {
        let mut center_force = V3::zero();
        let mut neighbor_forces = vec![];
        if !frame.is_real(center) {
            return (center_force, neighbor_forces);
        }

        for (slot, neighbor) in env.nlist().filled(center) {
            if !frame.is_real(neighbor) {
                continue;
            }
            let g = &net_deriv[center * nnei + slot];
            let row_d_delta = env.row_d_neighbor(center, slot);

            let mut energy_d_delta = V3::zero();
            for c in 0..4 {
                energy_d_delta += row_d_delta[c] * g[c];
            }

            // delta = pos_neighbor - pos_center
            center_force += energy_d_delta;
            neighbor_forces.push((neighbor, -energy_d_delta));
        }
        (center_force, neighbor_forces)
    }).collect::<Vec<_>>();

    // put it all together in serial code
    let mut force = vec![V3::zero(); num_atoms];
    for (center, (center_force, neighbor_forces)) in per_center.into_iter().enumerate() {
        force[center] += center_force;
        for (neighbor, neighbor_force) in neighbor_forces {
            force[neighbor] += neighbor_force;
        }
    }

    debug_assert!(
        (0..num_atoms).all(|atom| frame.is_real(atom) || force[atom] == V3::zero()),
        "virtual atom received a force",
    );
    if log_enabled!(log::Level::Debug) {
        let max_force = force.iter().map(|f| f.norm()).fold(0.0, f64::max);
        debug!("forces: {} atoms, max |F| = {:e}", num_atoms, max_force);
    }

    Ok(ForceOutput {
        force,
        virial: [0.0; 9],
        atom_virial: vec![[0.0; 9]; num_atoms],
    })
}

//------------------------------------------------------------------
