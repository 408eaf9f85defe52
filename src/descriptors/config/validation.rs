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

//! Checks that are easier to write by hand than to encode in the types.

use crate::config::*;
use failure::Error;

impl Settings {
    pub fn validate(self) -> Result<ValidatedSettings, Error> {
        if self.sel.is_empty() {
            bail!("`sel` must list at least one atom type");
        }

        let ntypes = self.sel.len();
        for &[a, b] in &self.exclude_types {
            if a >= ntypes || b >= ntypes {
                bail!("`exclude-types` names [{}, {}], but `sel` only has {} types", a, b, ntypes);
            }
        }

        if let Switch::Smooth(SmoothSwitch { rcut_smth, rcut }) = self.switch {
            if !(0.0 <= rcut_smth && rcut_smth < rcut && rcut.is_finite()) {
                bail!("`switch.smooth` needs 0 <= rcut-smth < rcut (got {} and {})", rcut_smth, rcut);
            }
        }

        if !(self.min_distance.is_finite() && self.min_distance > 0.0) {
            bail!("`min-distance` must be a positive number (got {})", self.min_distance);
        }

        match self.neuron.last() {
            None => { bail!("`neuron` must have at least one layer"); },
            Some(&0) => { bail!("the last layer in `neuron` must be nonempty"); },
            Some(_) => {},
        }
        if self.axis_neuron == 0 {
            bail!("`axis-neuron` must be positive");
        }
        if self.axis_neuron > self.neuron[self.neuron.len() - 1] {
            warn!(
                "`axis-neuron` ({}) is larger than the last embedding layer ({})",
                self.axis_neuron, self.neuron[self.neuron.len() - 1],
            );
        }

        Ok(ValidatedSettings(self))
    }
}
