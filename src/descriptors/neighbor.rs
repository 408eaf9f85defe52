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

//! Masked, cutoff-free nearest-neighbor search.
//!
//! Every real atom gets up to `sel[t]` neighbors of each type `t`, chosen purely
//! by proximity. There is no cutoff radius and no periodicity; the search is a
//! brute force scan over all pairs of real atoms.

use crate::FailResult;
use crate::errors::{ConfigurationError, DegenerateGeometryError};
use crate::frame::Frame;
use crate::types::TypeQuota;

use ordered_float::NotNan;
use rayon_cond::CondIterator;

/// Neighbor slots for every atom slot in a frame.
///
/// The slots of an atom are grouped by neighbor type in `TypeQuota` order.  Within
/// a group, neighbors are sorted by distance, ties going to the lower index.
/// Unfilled slots are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborList {
    num_atoms: usize,
    nnei: usize,
    // [atom][slot], flattened
    slots: Vec<Option<usize>>,
}

impl NeighborList {
    pub fn build(frame: &Frame, quota: &TypeQuota, parallel: bool) -> FailResult<NeighborList> {
        let num_slots = frame.num_slots();
        for atom in 0..num_slots {
            if let Some(ty) = frame.atom_type(atom) {
                if ty >= quota.ntypes() {
                    throw!(ConfigurationError::new(format!(
                        "atom {} has type {}, but sel only covers {} types", atom, ty, quota.ntypes(),
                    )));
                }
            }
        }

        let per_atom = {
            CondIterator::new(0..num_slots, parallel)
                .map(|center| center_neighbors(frame, quota, center))
                .collect::<FailResult<Vec<_>>>()?
        };

        let nnei = quota.nnei();
        let mut slots = Vec::with_capacity(num_slots * nnei);
        for atom_slots in per_atom {
            slots.extend(atom_slots);
        }

        let list = NeighborList { num_atoms: num_slots, nnei, slots };
        debug!(
            "neighbor list: {} atom slots, {} neighbor slots each, {} filled",
            num_slots, nnei, list.num_filled(),
        );
        Ok(list)
    }

    /// Neighbor slots per atom.
    pub fn nnei(&self) -> usize { self.nnei }

    pub fn num_atoms(&self) -> usize { self.num_atoms }

    /// All slots of one atom.
    pub fn neighbors(&self, center: usize) -> &[Option<usize>] {
        &self.slots[center * self.nnei..(center + 1) * self.nnei]
    }

    /// `(slot, neighbor)` for the filled slots of one atom.
    pub fn filled(&self, center: usize) -> impl Iterator<Item=(usize, usize)> + '_ {
        self.neighbors(center).iter().enumerate()
            .filter_map(|(slot, &neighbor)| neighbor.map(|neighbor| (slot, neighbor)))
    }

    pub fn num_filled(&self) -> usize { self.slots.iter().filter(|x| x.is_some()).count() }

    /// `[atom, nnei]` with `-1` in unfilled slots.
    pub fn to_raw(&self) -> Vec<i32> {
        self.slots.iter().map(|x| x.map_or(-1, |j| j as i32)).collect()
    }
}

fn center_neighbors(
    frame: &Frame,
    quota: &TypeQuota,
    center: usize,
) -> FailResult<Vec<Option<usize>>> {
    let mut out = vec![None; quota.nnei()];
    if !frame.is_real(center) {
        return Ok(out);
    }

    let coords = frame.coords();
    let center_pos = coords[center];

    let mut candidates = vec![vec![]; quota.ntypes()];
    for neighbor in 0..frame.num_slots() {
        if neighbor == center {
            continue;
        }
        let ty = match frame.atom_type(neighbor) {
            Some(ty) => ty,
            None => continue,
        };
        if quota.sel()[ty] == 0 {
            continue;
        }

        let distsq = (coords[neighbor] - center_pos).sqnorm();
        let distsq = match NotNan::new(distsq) {
            Ok(x) => x,
            Err(_) => throw!(DegenerateGeometryError::NonFinite {
                atom: neighbor,
                coord: coords[neighbor].0,
            }),
        };
        candidates[ty].push((distsq, neighbor));
    }

    for (ty, mut candidates) in candidates.into_iter().enumerate() {
        // indices are unique so there are no equal keys
        candidates.sort_unstable();

        let range = quota.type_range(ty);
        let count = candidates.len().min(range.len());
        for (slot, &(_, neighbor)) in out[range].iter_mut().zip(&candidates[..count]) {
            *slot = Some(neighbor);
        }
    }

    trace!("atom {}: {} neighbors", center, out.iter().filter(|x| x.is_some()).count());
    Ok(out)
}

//------------------------------------------------------------------

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::util::uniform;
    use rsp2_array_types::{V3, Envee};
    use pretty_assertions::assert_eq;

    fn frame(coords: Vec<[f64; 3]>, types: &[i32], ntypes: usize) -> Frame {
        let mask = types.iter().map(|&t| t >= 0).collect::<Vec<_>>();
        Frame::new(coords.envee(), types, &mask, ntypes).unwrap()
    }

    fn random_frame(num_slots: usize, ntypes: usize) -> Frame {
        let coords = (0..num_slots).map(|_| V3::from_fn(|_| uniform(-3.0, 3.0))).collect();
        let types = (0..num_slots).map(|_| match rand::random::<usize>() % (ntypes + 1) {
            t if t == ntypes => -1,
            t => t as i32,
        }).collect::<Vec<_>>();
        let mask = types.iter().map(|&t| t >= 0).collect::<Vec<_>>();
        Frame::new(coords, &types, &mask, ntypes).unwrap()
    }

    #[test]
    fn three_atoms() {
        let frame = frame(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], &[0, 0, 0], 1);
        let quota = TypeQuota::new(vec![2]).unwrap();
        let nlist = NeighborList::build(&frame, &quota, false).unwrap();

        assert_eq!(nlist.num_atoms(), 3);
        assert_eq!(nlist.neighbors(0), &[Some(1), Some(2)]);
        // 0 is at distance 1, 2 is at distance sqrt(2)
        assert_eq!(nlist.neighbors(1), &[Some(0), Some(2)]);
        assert_eq!(nlist.neighbors(2), &[Some(0), Some(1)]);
        assert_eq!(nlist.to_raw(), vec![1, 2, 0, 2, 0, 1]);
    }

    #[test]
    fn virtual_atoms_are_invisible() {
        let frame = frame(vec![[0.0; 3], [0.5, 0.0, 0.0]], &[0, -1], 1);
        let quota = TypeQuota::new(vec![1]).unwrap();
        let nlist = NeighborList::build(&frame, &quota, false).unwrap();

        assert_eq!(nlist.neighbors(0), &[None]);
        assert_eq!(nlist.neighbors(1), &[None]);
        assert_eq!(nlist.to_raw(), vec![-1, -1]);
        assert_eq!(nlist.num_filled(), 0);
    }

    #[test]
    fn type_blocks_and_quota() {
        // types 1, 0, 1, 1, 0 along a line
        let coords = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [-0.5, 0.0, 0.0], [3.0, 0.0, 0.0]];
        let frame = frame(coords, &[1, 0, 1, 1, 0], 2);
        let quota = TypeQuota::new(vec![3, 1]).unwrap();
        let nlist = NeighborList::build(&frame, &quota, false).unwrap();

        assert_eq!(nlist.neighbors(0), &[Some(1), Some(4), None, Some(3)]);
        assert_eq!(nlist.neighbors(1), &[Some(4), None, None, Some(0)]);
        assert_eq!(nlist.filled(1).collect::<Vec<_>>(), vec![(0, 4), (3, 0)]);
    }

    #[test]
    fn zero_quota_and_empty_frame() {
        let quota = TypeQuota::new(vec![0]).unwrap();
        let two = frame(vec![[0.0; 3], [1.0, 0.0, 0.0]], &[0, 0], 1);
        let nlist = NeighborList::build(&two, &quota, false).unwrap();
        assert_eq!(nlist.nnei(), 0);
        assert_eq!(nlist.num_atoms(), 2);
        assert_eq!(nlist.to_raw(), Vec::<i32>::new());

        let empty = frame(vec![], &[], 1);
        let nlist = NeighborList::build(&empty, &TypeQuota::new(vec![4]).unwrap(), false).unwrap();
        assert_eq!(nlist.num_atoms(), 0);
    }

    #[test]
    fn type_outside_quota() {
        let frame = frame(vec![[0.0; 3], [1.0, 0.0, 0.0]], &[0, 1], 2);
        let quota = TypeQuota::new(vec![1]).unwrap();
        let err = NeighborList::build(&frame, &quota, false).unwrap_err();
        assert!(err.downcast_ref::<ConfigurationError>().is_some());
    }

    #[test]
    fn random_properties() {
        for _ in 0..5 {
            let frame = random_frame(30, 3);
            let quota = TypeQuota::new(vec![4, 2, 5]).unwrap();
            let nlist = NeighborList::build(&frame, &quota, true).unwrap();

            for center in 0..frame.num_slots() {
                if !frame.is_real(center) {
                    assert!(nlist.neighbors(center).iter().all(|x| x.is_none()));
                    continue;
                }
                for ty in 0..3 {
                    let block = &nlist.neighbors(center)[quota.type_range(ty)];
                    let found = block.iter().filter_map(|&x| x).collect::<Vec<_>>();

                    let available = (0..frame.num_slots())
                        .filter(|&j| j != center && frame.atom_type(j) == Some(ty))
                        .count();
                    assert_eq!(found.len(), available.min(quota.sel()[ty]));
                    // filled slots come first
                    assert!(block[..found.len()].iter().all(|x| x.is_some()));

                    let key = |j: usize| ((frame.coords()[j] - frame.coords()[center]).sqnorm(), j);
                    for pair in found.windows(2) {
                        assert!(key(pair[0]) < key(pair[1]));
                    }
                    for &j in &found {
                        assert!(frame.is_real(j));
                        assert_eq!(frame.atom_type(j), Some(ty));
                    }
                }
            }
        }
    }

    #[test]
    fn parallel_matches_serial() {
        let frame = random_frame(40, 2);
        let quota = TypeQuota::new(vec![6, 6]).unwrap();
        let serial = NeighborList::build(&frame, &quota, false).unwrap();
        let parallel = NeighborList::build(&frame, &quota, true).unwrap();
        assert_eq!(serial, parallel);
        assert_eq!(serial, NeighborList::build(&frame, &quota, false).unwrap());
    }
}
