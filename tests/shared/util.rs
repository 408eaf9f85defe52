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

use rsp2_se_mask::Model;
use std::fs::File;

pub const RESOURCE_DIR: &'static str = "tests/resources";

pub fn init_logger() {
    let _ = env_logger::Builder::from_default_env().is_test(true).try_init();
}

pub fn load_model(name: &str) -> Model {
    let path = format!("{}/{}", RESOURCE_DIR, name);
    let file = File::open(&path).unwrap_or_else(|e| panic!("{}: {}", path, e));
    Model::from_reader(file).unwrap()
}

pub fn uniform(a: f64, b: f64) -> f64 { rand::random::<f64>() * (b - a) + a }

/// A random non-periodic frame in flat layout, with atoms kept at least
/// roughly `spacing / 3` apart.
pub struct RawFrame {
    pub coords: Vec<f64>,
    pub atom_types: Vec<i32>,
    pub aparam: Vec<f64>,
}

impl RawFrame {
    /// Every `virtual_every`th atom slot is virtual.
    pub fn random(num_slots: usize, ntypes: usize, virtual_every: usize, spacing: f64) -> RawFrame {
        let side = (num_slots as f64).cbrt().ceil() as usize;
        let mut coords = vec![];
        for i in 0..num_slots {
            let grid = [i % side, (i / side) % side, i / (side * side)];
            for &g in &grid {
                coords.push(g as f64 * spacing + uniform(-spacing / 3.0, spacing / 3.0));
            }
        }
        let atom_types = (0..num_slots).map(|i| match (i + 1) % virtual_every {
            0 => -1,
            _ => (i % ntypes) as i32,
        }).collect::<Vec<_>>();
        let aparam = atom_types.iter().map(|&t| if t < 0 { 0.0 } else { 1.0 }).collect();
        RawFrame { coords, atom_types, aparam }
    }

    pub fn natoms(&self, ntypes: usize) -> Vec<i32> {
        let real = self.atom_types.iter().filter(|&&t| t >= 0).count() as i32;
        let mut out = vec![real, self.atom_types.len() as i32];
        for ty in 0..ntypes as i32 {
            out.push(self.atom_types.iter().filter(|&&t| t == ty).count() as i32);
        }
        out
    }
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(a, b)| a * b).sum()
}

/// 5-point stencil.
///
/// Same as the one in rsp2-descriptors, which is not exported.
pub fn slope(step: f64, point: f64, mut f: impl FnMut(f64) -> f64) -> f64 {
    let terms = [(-2.0, 1.0), (-1.0, -8.0), (1.0, 8.0), (2.0, -1.0)];
    let numer: f64 = terms.iter().map(|&(offset, coeff)| coeff * f(point + offset * step)).sum();
    numer / (12.0 * step)
}
