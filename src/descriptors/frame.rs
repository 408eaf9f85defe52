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
use crate::errors::{
    ConfigurationError,
    DegenerateGeometryError,
    MaskInconsistencyError,
    ShapeMismatchError,
};

use rsp2_array_types::V3;
use itertools::Itertools;
use slice_of_array::prelude::*;

/// Atom type carried by virtual (padding) atoms.
pub const VIRTUAL_TYPE: i32 = -1;

/// One snapshot with a fixed number of atom slots, some of which may be virtual.
///
/// The mask is not stored separately; a slot is real exactly when it has a type.
/// Nothing about a `Frame` can change after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    coords: Vec<V3>,
    types: Vec<Option<usize>>,
}

impl Frame {
    /// Validates the input and builds a frame.
    ///
    /// `atom_types` must hold `VIRTUAL_TYPE` exactly where `mask` is false.
    /// Coordinates of virtual atoms are never read and may be anything.
    pub fn new(
        coords: Vec<V3>,
        atom_types: &[i32],
        mask: &[bool],
        ntypes: usize,
    ) -> FailResult<Frame> {
        ShapeMismatchError::check("atom types", coords.len(), atom_types.len())?;
        ShapeMismatchError::check("mask", coords.len(), mask.len())?;
        if coords.len() > i32::max_value() as usize {
            throw!(ConfigurationError::new(format!("too many atom slots: {}", coords.len())));
        }

        let mut types = Vec::with_capacity(coords.len());
        for (atom, (&ty, &real)) in atom_types.iter().zip_eq(mask).enumerate() {
            types.push(match (real, ty) {
                (true, VIRTUAL_TYPE) => throw!(MaskInconsistencyError::RealWithoutType { atom }),
                (true, ty) if ty < 0 || ty as usize >= ntypes => {
                    throw!(ConfigurationError::new(format!(
                        "atom {} has type {}, but there are only {} types", atom, ty, ntypes,
                    )))
                },
                (true, ty) => Some(ty as usize),
                (false, VIRTUAL_TYPE) => None,
                (false, atom_type) => throw!(MaskInconsistencyError::VirtualWithType { atom, atom_type }),
            });
        }

        for (atom, (coord, ty)) in coords.iter().zip_eq(&types).enumerate() {
            if ty.is_some() && !coord.is_finite() {
                throw!(DegenerateGeometryError::NonFinite { atom, coord: coord.0 });
            }
        }
        Ok(Frame { coords, types })
    }

    /// Build a frame from the flat arrays used at the model boundary.
    ///
    /// `aparam` is truncated to an integer; anything nonzero marks a real atom.
    pub fn from_raw(
        coords: &[f64],
        atom_types: &[i32],
        aparam: &[f64],
        ntypes: usize,
    ) -> FailResult<Frame> {
        ShapeMismatchError::check("coords", 3 * atom_types.len(), coords.len())?;
        ShapeMismatchError::check("aparam", atom_types.len(), aparam.len())?;

        let mask = aparam.iter().map(|&x| x as i32 != 0).collect::<Vec<_>>();
        Frame::new(coords.nest::<V3>().to_vec(), atom_types, &mask, ntypes)
    }

    /// Number of atom slots, real and virtual.
    pub fn num_slots(&self) -> usize { self.coords.len() }

    pub fn num_real(&self) -> usize { self.types.iter().filter(|t| t.is_some()).count() }

    pub fn coords(&self) -> &[V3] { &self.coords }

    /// `None` for virtual atoms.
    #[inline(always)]
    pub fn atom_type(&self, atom: usize) -> Option<usize> { self.types[atom] }

    #[inline(always)]
    pub fn is_real(&self, atom: usize) -> bool { self.types[atom].is_some() }

    pub fn mask(&self) -> Vec<bool> { self.types.iter().map(|t| t.is_some()).collect() }

    /// Atom types in the raw encoding, with `VIRTUAL_TYPE` for virtual atoms.
    pub fn raw_types(&self) -> Vec<i32> {
        self.types.iter().map(|t| t.map_or(VIRTUAL_TYPE, |t| t as i32)).collect()
    }

    /// Number of real atoms of type `ty`.
    pub fn count_of_type(&self, ty: usize) -> usize {
        self.types.iter().filter(|&&t| t == Some(ty)).count()
    }
}

//------------------------------------------------------------------

/// The `natoms` vector: `[real atoms, atom slots, real atoms of type 0, type 1, ...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NatomsVec {
    pub num_real: usize,
    pub num_slots: usize,
    pub per_type: Vec<usize>,
}

impl NatomsVec {
    pub fn from_raw(raw: &[i32], ntypes: usize) -> FailResult<Self> {
        ShapeMismatchError::check("natoms", ntypes + 2, raw.len())?;
        if let Some(&bad) = raw.iter().find(|&&x| x < 0) {
            throw!(ConfigurationError::new(format!("negative count in natoms: {}", bad)));
        }
        Ok(NatomsVec {
            num_real: raw[0] as usize,
            num_slots: raw[1] as usize,
            per_type: raw[2..].iter().map(|&x| x as usize).collect(),
        })
    }

    pub fn for_frame(frame: &Frame, ntypes: usize) -> Self {
        NatomsVec {
            num_real: frame.num_real(),
            num_slots: frame.num_slots(),
            per_type: (0..ntypes).map(|ty| frame.count_of_type(ty)).collect(),
        }
    }

    pub fn to_raw(&self) -> Vec<i32> {
        let mut out = vec![self.num_real as i32, self.num_slots as i32];
        out.extend(self.per_type.iter().map(|&x| x as i32));
        out
    }

    /// Verify that this vector describes `frame`.
    pub fn check_frame(&self, frame: &Frame) -> FailResult<()> {
        ShapeMismatchError::check("natoms[1] (atom slots)", self.num_slots, frame.num_slots())?;

        let count_error = |what: String, expected: usize, actual: usize| {
            MaskInconsistencyError::CountMismatch { what, expected, actual }
        };
        if self.num_real != frame.num_real() {
            throw!(count_error("real atoms".into(), self.num_real, frame.num_real()));
        }
        for (ty, &expected) in self.per_type.iter().enumerate() {
            let actual = frame.count_of_type(ty);
            if expected != actual {
                throw!(count_error(format!("real atoms of type {}", ty), expected, actual));
            }
        }
        Ok(())
    }
}

//------------------------------------------------------------------
