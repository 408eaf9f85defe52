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

// NOTE: Please make sure to use the YamlRead trait when deserializing these types!

use serde::de;

/// Root settings object.
///
/// This is what you should deserialize.
#[derive(Serialize)]
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSettings(pub Settings);

/// Raw deserialized form of settings.
///
/// You shouldn't deserialize this type directly; deserialize `ValidatedSettings` instead,
/// so that additional validation can be performed.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Maximum number of neighbors of each type.
    ///
    /// The length of this list decides the number of atom types.
    pub sel: Vec<usize>,

    /// Pairs of atom types that do not see each other.
    ///
    /// `[a, b]` also excludes `[b, a]`.
    ///
    /// ```yaml
    /// exclude-types: [[0, 1]]
    /// ```
    #[serde(default)]
    pub exclude_types: Vec<[usize; 2]>,

    /// See the type for documentation.
    #[serde(default)]
    pub switch: Switch,

    /// Two atoms closer than this are treated as an error in the input.
    #[serde(default = "_settings__min_distance")]
    pub min_distance: f64,

    #[serde(default)]
    pub precision: Precision,

    #[serde(default)]
    pub threading: Threading,

    /// Widths of the layers of each embedding network.
    ///
    /// These are not used by the descriptor itself, except to report the size
    /// of its output.
    #[serde(default = "_settings__neuron")]
    pub neuron: Vec<usize>,

    /// Number of embedding columns used for the axis matrix.
    #[serde(default = "_settings__axis_neuron")]
    pub axis_neuron: usize,

    /// Use one embedding network per neighbor type, rather than per type pair.
    #[serde(default)]
    pub type_one_side: bool,
}
fn _settings__min_distance() -> f64 { 1e-10 }
fn _settings__neuron() -> Vec<usize> { vec![24, 48, 96] }
fn _settings__axis_neuron() -> usize { 8 }

derive_yaml_read!{ValidatedSettings}

impl<'de> de::Deserialize<'de> for ValidatedSettings {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let cereal: Settings = de::Deserialize::deserialize(deserializer)?;
        cereal.validate().map_err(de::Error::custom)
    }
}

impl std::ops::Deref for ValidatedSettings {
    type Target = Settings;
    fn deref(&self) -> &Settings { &self.0 }
}

/// Radial weight of each environment row.
///
/// ```yaml
/// switch: inverse      # 1/r everywhere (the default)
///
/// switch:
///   smooth:            # 1/r, tapering to zero between rcut-smth and rcut
///     rcut-smth: 0.5
///     rcut: 6.0
/// ```
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum Switch {
    Inverse,
    Smooth(SmoothSwitch),
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SmoothSwitch {
    pub rcut_smth: f64,
    pub rcut: f64,
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Precision {
    Default,
    Float32,
    Float64,
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Threading {
    Rayon,
    Serial,
}

impl Threading {
    pub fn is_parallel(self) -> bool { self == Threading::Rayon }
}

// --------------------------------------------------------

impl Default for Switch {
    fn default() -> Self { Switch::Inverse }
}

impl Default for Precision {
    fn default() -> Self { Precision::Default }
}

impl Default for Threading {
    fn default() -> Self { Threading::Rayon }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::YamlRead;

    #[test]
    fn minimal() {
        let settings = ValidatedSettings::from_reader("sel: [4, 6]".as_bytes()).unwrap();
        assert_eq!(settings.0, Settings {
            sel: vec![4, 6],
            exclude_types: vec![],
            switch: Switch::Inverse,
            min_distance: 1e-10,
            precision: Precision::Default,
            threading: Threading::Rayon,
            neuron: vec![24, 48, 96],
            axis_neuron: 8,
            type_one_side: false,
        });
    }

    #[test]
    fn everything() {
        let yaml = "
sel: [2, 3]
exclude-types: [[0, 1]]
switch:
  smooth:
    rcut-smth: 0.5
    rcut: 6.0
min-distance: 0.01
precision: float32
threading: serial
neuron: [8, 16]
axis-neuron: 4
type-one-side: true
";
        let settings = ValidatedSettings::from_reader(yaml.as_bytes()).unwrap();
        assert_eq!(settings.exclude_types, vec![[0, 1]]);
        assert_eq!(settings.switch, Switch::Smooth(SmoothSwitch { rcut_smth: 0.5, rcut: 6.0 }));
        assert_eq!(settings.min_distance, 0.01);
        assert_eq!(settings.precision, Precision::Float32);
        assert!(!settings.threading.is_parallel());
        assert_eq!(settings.neuron, vec![8, 16]);
        assert_eq!(settings.axis_neuron, 4);
        assert!(settings.type_one_side);
    }

    #[test]
    fn unknown_keys_are_not_fatal() {
        let settings = ValidatedSettings::from_reader("{sel: [1], axis-neuorn: 3}".as_bytes()).unwrap();
        assert_eq!(settings.axis_neuron, 8);
    }

    #[test]
    fn json() {
        let settings: ValidatedSettings = crate::from_json_str(r#"{
            "sel": [3],
            "switch": {"smooth": {"rcut-smth": 1.0, "rcut": 2.0}}
        }"#).unwrap();
        assert_eq!(settings.switch, Switch::Smooth(SmoothSwitch { rcut_smth: 1.0, rcut: 2.0 }));

        assert!(crate::from_json_str::<ValidatedSettings>(r#"{"sel": []}"#).is_err());
    }

    #[test]
    fn round_trip_through_serialize() {
        let settings = ValidatedSettings::from_reader("{sel: [1, 2], switch: inverse}".as_bytes()).unwrap();
        let yaml = serde_yaml::to_string(&settings).unwrap();
        let again = ValidatedSettings::from_reader(yaml.as_bytes()).unwrap();
        assert_eq!(settings, again);
    }
}
