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

//! The masked se_a descriptor, set up from a config file.
//!
//! This is the glue between `rsp2_descriptors_config` (which knows about serde)
//! and `rsp2_descriptors` (which doesn't), plus a raw-array interface for
//! drivers that speak in flat buffers.

#[macro_use] extern crate log;

pub use rsp2_descriptors as descriptors;
pub use rsp2_descriptors_config as config;

use rsp2_descriptors::{
    Environment, ForceOutput, Frame, Params, Precision, SeMask, Switch, TypePairTable,
};
use rsp2_descriptors_config::{self as cfg, ValidatedSettings, YamlRead};

use std::io::Read;

pub type FailResult<T> = Result<T, failure::Error>;

/// A configured descriptor.
#[derive(Debug, Clone)]
pub struct Model {
    settings: ValidatedSettings,
    descriptor: SeMask,
}

/// What the forward pass of one frame leaves behind for the backward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Forward {
    pub frame: Frame,
    pub env: Environment,
}

impl Forward {
    /// `[natoms, ndescrpt]`
    pub fn descrpt(&self) -> Vec<f64> { self.env.to_flat() }

    /// `[natoms, nnei]`, `-1` in unfilled slots.
    pub fn nlist(&self) -> Vec<i32> { self.env.nlist().to_raw() }

    /// `[natoms, nnei * 3]`
    pub fn rij(&self) -> Vec<f64> { self.env.deltas_flat() }

    /// `[natoms, ndescrpt * 3]`
    pub fn descrpt_deriv(&self) -> Vec<f64> { self.env.jacobian_flat() }
}

impl Model {
    pub fn from_settings(settings: ValidatedSettings) -> FailResult<Model> {
        let descriptor = SeMask::new(params_from_settings(&settings))?
            .parallel(settings.threading.is_parallel());
        Ok(Model { settings, descriptor })
    }

    /// Read YAML settings.
    pub fn from_reader(r: impl Read) -> FailResult<Model> {
        Model::from_settings(ValidatedSettings::from_reader(r)?)
    }

    pub fn settings(&self) -> &cfg::Settings { &self.settings }
    pub fn descriptor(&self) -> &SeMask { &self.descriptor }

    /// Names of the embedding networks, one per type pair.
    pub fn embedding_net_names(&self) -> TypePairTable<String> {
        self.descriptor.embedding_table(|pair| format!("filter_type_{}{}", pair.center, pair.neighbor))
    }

    /// Forward pass on raw arrays.
    ///
    /// `natoms` is checked against the frame but otherwise unused.
    pub fn forward(
        &self,
        coords: &[f64],
        atom_types: &[i32],
        aparam: &[f64],
        natoms: &[i32],
    ) -> FailResult<Forward> {
        let frame = self.descriptor.frame_from_raw(coords, atom_types, aparam)?;
        self.descriptor.check_natoms(&frame, natoms)?;
        let env = self.descriptor.forward(&frame)?;
        Ok(Forward { frame, env })
    }

    /// Backward pass; `net_deriv` is the gradient of the energy with respect to `forward.descrpt()`.
    pub fn backward(&self, forward: &Forward, net_deriv: &[f64]) -> FailResult<ForceOutput> {
        self.descriptor.backward(&forward.frame, &forward.env, net_deriv)
    }

    /// Forward pass on `nframes` frames in flat layout.
    pub fn forward_batch(
        &self,
        nframes: usize,
        coords: &[f64],
        atom_types: &[i32],
        aparam: &[f64],
    ) -> FailResult<Vec<Forward>> {
        let frames = self.descriptor.frames_from_raw(nframes, coords, atom_types, aparam)?;
        let envs = self.descriptor.forward_batch(&frames)?;
        Ok(frames.into_iter().zip(envs).map(|(frame, env)| Forward { frame, env }).collect())
    }

    /// `net_deriv` holds the gradients of all frames, concatenated.
    pub fn backward_batch(&self, forwards: &[Forward], net_deriv: &[f64]) -> FailResult<Vec<ForceOutput>> {
        let frames = forwards.iter().map(|f| f.frame.clone()).collect::<Vec<_>>();
        let envs = forwards.iter().map(|f| f.env.clone()).collect::<Vec<_>>();
        self.descriptor.backward_batch(&frames, &envs, net_deriv)
    }
}

fn params_from_settings(settings: &cfg::Settings) -> Params {
    let cfg::Settings {
        ref sel, ref exclude_types, ref switch, min_distance, precision,
        threading: _, ref neuron, axis_neuron, type_one_side,
    } = *settings;

    let switch = match *switch {
        cfg::Switch::Inverse => Switch::Inverse,
        cfg::Switch::Smooth(cfg::SmoothSwitch { rcut_smth, rcut }) => {
            debug!("using a smooth switch from {} to {}", rcut_smth, rcut);
            Switch::Smooth { rcut_smth, rcut }
        },
    };
    let precision = match precision {
        cfg::Precision::Default => Precision::Default,
        cfg::Precision::Float32 => Precision::Float32,
        cfg::Precision::Float64 => Precision::Float64,
    };

    Params {
        sel: sel.clone(),
        exclude_types: exclude_types.clone(),
        switch,
        min_distance,
        precision,
        neuron: neuron.clone(),
        axis_neuron,
        type_one_side,
    }
}
