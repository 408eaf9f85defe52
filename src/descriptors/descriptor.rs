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

use crate::FailResult;
use crate::errors::{ConfigurationError, ShapeMismatchError};
use crate::env_mat::{Encoder, Environment, Switch};
use crate::frame::{Frame, NatomsVec};
use crate::neighbor::NeighborList;
use crate::prod_force::{self, ForceOutput};
use crate::types::{ExcludedTypes, TypePair, TypePairTable, TypeQuota};

use rsp2_array_types::V3;
use rayon_cond::CondIterator;

/// Floating point precision of the outputs.
///
/// Everything is computed in `f64`; `Float32` rounds the results.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Precision {
    /// Same as `Float64`.
    Default,
    Float32,
    Float64,
}

impl Default for Precision {
    fn default() -> Self { Precision::Default }
}

impl Precision {
    #[inline(always)]
    pub fn round(self, x: f64) -> f64 {
        match self {
            Precision::Float32 => x as f32 as f64,
            Precision::Default |
            Precision::Float64 => x,
        }
    }

    #[inline(always)]
    pub fn round_v3(self, v: V3) -> V3 { v.map(|x| self.round(x)) }
}

/// Construction parameters for `SeMask`.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// Neighbor quota per type.
    pub sel: Vec<usize>,
    /// Type pairs whose rows are zeroed. Order within a pair does not matter.
    pub exclude_types: Vec<[usize; 2]>,
    pub switch: Switch,
    pub min_distance: f64,
    pub precision: Precision,
    /// Widths of the embedding network layers.
    pub neuron: Vec<usize>,
    pub axis_neuron: usize,
    /// Share embedding networks between center types.
    pub type_one_side: bool,
}

impl Params {
    pub const DEFAULT_MIN_DISTANCE: f64 = 1e-10;

    pub fn new(sel: Vec<usize>) -> Params {
        Params {
            sel,
            exclude_types: vec![],
            switch: Switch::Inverse,
            min_distance: Params::DEFAULT_MIN_DISTANCE,
            precision: Precision::Default,
            neuron: vec![24, 48, 96],
            axis_neuron: 8,
            type_one_side: false,
        }
    }
}

/// The masked, non-periodic se_a descriptor.
///
/// Holds nothing that varies between frames; all per-frame state lives in the
/// returned `Environment`.
#[derive(Debug, Clone)]
pub struct SeMask {
    quota: TypeQuota,
    encoder: Encoder,
    neuron: Vec<usize>,
    axis_neuron: usize,
    type_one_side: bool,
    parallel: bool,
}

impl SeMask {
    pub fn new(params: Params) -> FailResult<SeMask> {
        let Params {
            sel, exclude_types, switch, min_distance, precision,
            neuron, axis_neuron, type_one_side,
        } = params;

        let quota = TypeQuota::new(sel)?;
        let excluded = ExcludedTypes::new(quota.ntypes(), &exclude_types)?;
        // a zero floor would let coincident atoms through as infinite rows
        if !(min_distance.is_finite() && min_distance > 0.0) {
            throw!(ConfigurationError::new(format!("bad min_distance: {}", min_distance)));
        }
        if let Switch::Smooth { rcut_smth, rcut } = switch {
            // re-validate in case it was built by hand
            Switch::smooth(rcut_smth, rcut)?;
        }
        match neuron.last() {
            None => throw!(ConfigurationError::new("neuron must have at least one layer")),
            Some(&0) => throw!(ConfigurationError::new("the last neuron layer must be nonempty")),
            Some(_) => {},
        }
        if axis_neuron == 0 {
            throw!(ConfigurationError::new("axis_neuron must be positive"));
        }

        info!(
            "se_a_mask descriptor: {} types, sel = {:?}, {} descriptor columns per atom",
            quota.ntypes(), quota.sel(), 4 * quota.nnei(),
        );
        Ok(SeMask {
            quota,
            encoder: Encoder { switch, excluded, min_distance, precision },
            neuron,
            axis_neuron,
            type_one_side,
            parallel: true,
        })
    }

    /// Enable or disable rayon. (default: enabled)
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn ntypes(&self) -> usize { self.quota.ntypes() }
    pub fn nnei(&self) -> usize { self.quota.nnei() }
    pub fn sel(&self) -> &[usize] { self.quota.sel() }
    pub fn quota(&self) -> &TypeQuota { &self.quota }

    /// Width of one atom's row in the flat environment matrix.
    pub fn ndescrpt(&self) -> usize { 4 * self.nnei() }

    /// Width of the descriptor produced by the embedding network.
    pub fn dim_out(&self) -> usize {
        // never empty; checked at construction
        self.neuron.last().map_or(0, |&last| last * self.axis_neuron)
    }

    /// The cutoff radius of the switching function.
    ///
    /// This descriptor chooses neighbors without a cutoff, so under the default
    /// switching function there is nothing to report.
    pub fn rcut(&self) -> Option<f64> {
        let rcut = self.encoder.switch.rcut();
        if rcut.is_none() {
            warn!("se_a_mask has no cutoff radius; rcut() is meaningless for this descriptor");
        }
        rcut
    }

    pub fn switch(&self) -> Switch { self.encoder.switch }
    pub fn precision(&self) -> Precision { self.encoder.precision }

    /// The neighbor type of every slot.
    pub fn slot_types(&self) -> Vec<usize> { self.quota.slot_types() }

    /// A table with one entry per embedding network.
    pub fn embedding_table<T>(&self, f: impl FnMut(TypePair) -> T) -> TypePairTable<T> {
        TypePairTable::from_fn(self.ntypes(), self.type_one_side, f)
    }

    //--------------------------------------------------------------

    pub fn frame_from_raw(&self, coords: &[f64], atom_types: &[i32], aparam: &[f64]) -> FailResult<Frame> {
        Frame::from_raw(coords, atom_types, aparam, self.ntypes())
    }

    /// Split flat arrays holding `nframes` frames of equal size.
    pub fn frames_from_raw(
        &self,
        nframes: usize,
        coords: &[f64],
        atom_types: &[i32],
        aparam: &[f64],
    ) -> FailResult<Vec<Frame>> {
        if nframes == 0 {
            ShapeMismatchError::check("atom types", 0, atom_types.len())?;
            ShapeMismatchError::check("coords", 0, coords.len())?;
            ShapeMismatchError::check("aparam", 0, aparam.len())?;
            return Ok(vec![]);
        }
        let natoms = atom_types.len() / nframes;
        ShapeMismatchError::check("atom types", nframes * natoms, atom_types.len())?;
        ShapeMismatchError::check("coords", nframes * natoms * 3, coords.len())?;
        ShapeMismatchError::check("aparam", nframes * natoms, aparam.len())?;

        (0..nframes).map(|frame| {
            let atoms = frame * natoms..(frame + 1) * natoms;
            self.frame_from_raw(
                &coords[3 * atoms.start..3 * atoms.end],
                &atom_types[atoms.clone()],
                &aparam[atoms],
            )
        }).collect()
    }

    /// Validate a raw `natoms` vector against a frame.
    pub fn check_natoms(&self, frame: &Frame, natoms: &[i32]) -> FailResult<()> {
        NatomsVec::from_raw(natoms, self.ntypes())?.check_frame(frame)
    }

    /// Build the neighbor list and environment matrix of a frame.
    pub fn forward(&self, frame: &Frame) -> FailResult<Environment> {
        let nlist = NeighborList::build(frame, &self.quota, self.parallel)?;
        self.encoder.encode(frame, nlist, self.parallel)
    }

    /// Compute forces from the gradient of the energy with respect to `env.to_flat()`.
    pub fn backward(&self, frame: &Frame, env: &Environment, net_deriv: &[f64]) -> FailResult<ForceOutput> {
        ShapeMismatchError::check("environment (neighbor slots)", self.nnei(), env.nnei())?;
        prod_force::compute(frame, env, net_deriv, self.parallel)
    }

    pub fn forward_batch(&self, frames: &[Frame]) -> FailResult<Vec<Environment>> {
        info!("se_a_mask forward: {} frames", frames.len());
        CondIterator::new(frames, self.parallel)
            .map(|frame| self.forward(frame))
            .collect()
    }

    /// `net_deriv` holds the gradients for all frames, concatenated.
    pub fn backward_batch(
        &self,
        frames: &[Frame],
        envs: &[Environment],
        net_deriv: &[f64],
    ) -> FailResult<Vec<ForceOutput>> {
        ShapeMismatchError::check("environments", frames.len(), envs.len())?;

        let mut offsets = vec![0];
        for env in envs {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + env.num_atoms() * self.ndescrpt());
        }
        ShapeMismatchError::check("net_deriv", offsets[envs.len()], net_deriv.len())?;

        info!("se_a_mask backward: {} frames", frames.len());
        CondIterator::new(0..frames.len(), self.parallel)
            .map(|i| self.backward(&frames[i], &envs[i], &net_deriv[offsets[i]..offsets[i + 1]]))
            .collect()
    }
}

//------------------------------------------------------------------
