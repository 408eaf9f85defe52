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

use serde_derive::Deserialize;
use std::fs::File;
use std::path::Path;
use failure::Error;

/// Inputs and expected outputs of a single frame, in the raw flat layout.
#[derive(Debug, Clone, PartialEq)]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FrameCase {
    pub coords: Vec<f64>,
    pub atom_types: Vec<i32>,
    pub aparam: Vec<f64>,
    pub natoms: Vec<i32>,
    pub nlist: Vec<i32>,
    pub descrpt: Vec<f64>,
    pub net_deriv: Vec<f64>,
    pub force: Vec<f64>,
}

impl FrameCase {
    pub fn load(path: impl AsRef<Path>) -> Result<FrameCase, Error> {
        Ok(serde_json::from_reader(File::open(path)?)?)
    }
}
