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
use crate::errors::ConfigurationError;

use std::ops::Range;

/// Per-type neighbor quota, a.k.a. `sel`.
///
/// The neighbor slots of every atom are laid out as `sel[0]` slots for type 0,
/// followed by `sel[1]` slots for type 1, and so on.  Downstream code (the
/// embedding network in particular) relies on this layout to share weights
/// between neighbors of the same type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeQuota {
    sel: Vec<usize>,
    /// CSR-style divider indices; `offsets[t]..offsets[t + 1]` are the slots of type `t`.
    offsets: Vec<usize>,
}

impl TypeQuota {
    pub fn new(sel: Vec<usize>) -> FailResult<Self> {
        if sel.is_empty() {
            throw!(ConfigurationError::new("sel must name at least one atom type"));
        }

        let mut offsets = Vec::with_capacity(sel.len() + 1);
        offsets.push(0);
        let mut nnei = 0usize;
        for &count in &sel {
            nnei = match nnei.checked_add(count) {
                Some(x) => x,
                None => throw!(ConfigurationError::new("sum of sel overflows")),
            };
            offsets.push(nnei);
        }

        // Both neighbor indices and flat descriptor columns must fit in an i32 for
        // the external encodings.
        let max_nnei = i32::max_value() as usize / 4;
        if nnei > max_nnei {
            throw!(ConfigurationError::new(format!(
                "sum of sel ({}) exceeds the representable maximum ({})", nnei, max_nnei,
            )));
        }
        Ok(TypeQuota { sel, offsets })
    }

    /// Accepts the raw `sel: int[ntypes]` form.
    pub fn from_raw(sel: &[i32]) -> FailResult<Self> {
        let mut out = Vec::with_capacity(sel.len());
        for (ty, &count) in sel.iter().enumerate() {
            if count < 0 {
                throw!(ConfigurationError::new(format!("negative sel for type {}: {}", ty, count)));
            }
            out.push(count as usize);
        }
        TypeQuota::new(out)
    }

    pub fn ntypes(&self) -> usize { self.sel.len() }

    /// Total number of neighbor slots per atom.
    pub fn nnei(&self) -> usize { self.offsets[self.sel.len()] }

    pub fn sel(&self) -> &[usize] { &self.sel }

    /// The slots that hold neighbors of type `ty`.
    pub fn type_range(&self, ty: usize) -> Range<usize> {
        self.offsets[ty]..self.offsets[ty + 1]
    }

    /// The neighbor type of every slot, in slot order.
    pub fn slot_types(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.nnei());
        for (ty, &count) in self.sel.iter().enumerate() {
            out.extend(std::iter::repeat(ty).take(count));
        }
        out
    }
}

//------------------------------------------------------------------

/// Identifies an interaction by the type of the central atom and the type of its neighbor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypePair {
    pub center: usize,
    pub neighbor: usize,
}

/// Dense lookup table keyed by `TypePair`.
///
/// This is the layout used for the per-type-pair embedding networks.  When
/// `type_one_side` is set, the table only distinguishes neighbor types and every
/// center type maps onto the same row.
#[derive(Debug, Clone, PartialEq)]
pub struct TypePairTable<T> {
    ntypes: usize,
    type_one_side: bool,
    data: Vec<T>,
}

impl<T> TypePairTable<T> {
    pub fn from_fn(
        ntypes: usize,
        type_one_side: bool,
        mut f: impl FnMut(TypePair) -> T,
    ) -> Self {
        let num_rows = match type_one_side {
            true => 1,
            false => ntypes,
        };
        let mut data = Vec::with_capacity(num_rows * ntypes);
        for center in 0..num_rows {
            for neighbor in 0..ntypes {
                data.push(f(TypePair { center, neighbor }));
            }
        }
        TypePairTable { ntypes, type_one_side, data }
    }

    pub fn ntypes(&self) -> usize { self.ntypes }
    pub fn type_one_side(&self) -> bool { self.type_one_side }

    /// Number of distinct entries.  (`ntypes` or `ntypes²`)
    pub fn len(&self) -> usize { self.data.len() }

    pub fn get(&self, pair: TypePair) -> &T {
        &self.data[self.flat_index(pair)]
    }

    /// All entries with the pair they are stored under, row by row.
    pub fn iter(&self) -> impl Iterator<Item=(TypePair, &T)> + '_ {
        let ntypes = self.ntypes;
        self.data.iter().enumerate().map(move |(index, value)| {
            (TypePair { center: index / ntypes, neighbor: index % ntypes }, value)
        })
    }

    fn flat_index(&self, pair: TypePair) -> usize {
        assert!(pair.center < self.ntypes && pair.neighbor < self.ntypes, "bad type pair: {:?}", pair);
        let row = match self.type_one_side {
            true => 0,
            false => pair.center,
        };
        row * self.ntypes + pair.neighbor
    }
}

//------------------------------------------------------------------

/// Type pairs that do not interact.  Exclusion is symmetric.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedTypes {
    table: TypePairTable<bool>,
    any: bool,
}

impl ExcludedTypes {
    pub fn none(ntypes: usize) -> Self {
        ExcludedTypes {
            table: TypePairTable::from_fn(ntypes, false, |_| false),
            any: false,
        }
    }

    pub fn new(ntypes: usize, pairs: &[[usize; 2]]) -> FailResult<Self> {
        for &[a, b] in pairs {
            if a >= ntypes || b >= ntypes {
                throw!(ConfigurationError::new(format!(
                    "exclude_types names pair ({}, {}), but there are only {} types", a, b, ntypes,
                )));
            }
        }
        let table = TypePairTable::from_fn(ntypes, false, |TypePair { center, neighbor }| {
            pairs.iter().any(|&[a, b]| (a, b) == (center, neighbor) || (b, a) == (center, neighbor))
        });
        Ok(ExcludedTypes { table, any: !pairs.is_empty() })
    }

    #[inline]
    pub fn contains(&self, center: usize, neighbor: usize) -> bool {
        self.any && *self.table.get(TypePair { center, neighbor })
    }
}

//------------------------------------------------------------------

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn quota_layout() {
        let quota = TypeQuota::new(vec![2, 0, 3]).unwrap();
        assert_eq!(quota.ntypes(), 3);
        assert_eq!(quota.nnei(), 5);
        assert_eq!(quota.type_range(0), 0..2);
        assert_eq!(quota.type_range(1), 2..2);
        assert_eq!(quota.type_range(2), 2..5);
        assert_eq!(quota.slot_types(), vec![0, 0, 2, 2, 2]);
    }

    #[test]
    fn quota_errors() {
        let is_config_error = |r: FailResult<TypeQuota>| {
            r.unwrap_err().downcast_ref::<ConfigurationError>().is_some()
        };
        assert!(is_config_error(TypeQuota::new(vec![])));
        assert!(is_config_error(TypeQuota::new(vec![usize::max_value(), 1])));
        assert!(is_config_error(TypeQuota::new(vec![i32::max_value() as usize])));
        assert!(is_config_error(TypeQuota::from_raw(&[3, -1])));
        assert_eq!(TypeQuota::from_raw(&[3, 1]).unwrap().sel(), &[3, 1]);
    }

    #[test]
    fn pair_table() {
        let table = TypePairTable::from_fn(3, false, |pair| (pair.center, pair.neighbor));
        assert_eq!(table.len(), 9);
        assert_eq!(*table.get(TypePair { center: 2, neighbor: 1 }), (2, 1));

        let one_side = TypePairTable::from_fn(3, true, |pair| pair.neighbor);
        assert_eq!(one_side.len(), 3);
        assert_eq!(*one_side.get(TypePair { center: 2, neighbor: 1 }), 1);
        assert_eq!(*one_side.get(TypePair { center: 0, neighbor: 1 }), 1);

        let pairs: Vec<_> = one_side.iter().map(|(pair, _)| pair).collect();
        assert_eq!(pairs[2], TypePair { center: 0, neighbor: 2 });
    }

    #[test]
    fn exclusion_is_symmetric() {
        let excluded = ExcludedTypes::new(3, &[[0, 2]]).unwrap();
        assert!(excluded.contains(0, 2));
        assert!(excluded.contains(2, 0));
        assert!(!excluded.contains(0, 0));
        assert!(!excluded.contains(1, 2));
        assert!(!ExcludedTypes::none(3).contains(0, 2));

        let err = ExcludedTypes::new(2, &[[0, 2]]).unwrap_err();
        assert!(err.downcast_ref::<ConfigurationError>().is_some());
    }
}
