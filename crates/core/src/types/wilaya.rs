//! Algerian provinces (wilayas) accepted as delivery destinations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The 58 wilaya names, lowercase, in official numbering order.
pub const WILAYAS: [&str; 58] = [
    "adrar",
    "chlef",
    "laghouat",
    "oum el bouaghi",
    "batna",
    "béjaïa",
    "biskra",
    "béchar",
    "blida",
    "bouira",
    "tamanrasset",
    "tébessa",
    "tlemcen",
    "tiaret",
    "tizi ouzou",
    "alger",
    "djelfa",
    "jijel",
    "sétif",
    "saïda",
    "skikda",
    "sidi bel abbès",
    "annaba",
    "guelma",
    "constantine",
    "médéa",
    "mostaganem",
    "m'sila",
    "mascara",
    "ouargla",
    "oran",
    "el bayadh",
    "illizi",
    "bordj bou arréridj",
    "boumerdès",
    "el tarf",
    "tindouf",
    "tissemsilt",
    "el oued",
    "khenchela",
    "souk ahras",
    "tipaza",
    "mila",
    "aïn defla",
    "naâma",
    "aïn témouchent",
    "ghardaïa",
    "relizane",
    "timimoun",
    "bordj badji mokhtar",
    "ouled djellal",
    "béni abbès",
    "in salah",
    "in guezzam",
    "touggourt",
    "djanet",
    "el m'ghair",
    "el meniaa",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid wilaya")]
pub struct WilayaError;

/// A wilaya name, normalized to lowercase and known to be in [`WILAYAS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Wilaya(&'static str);

impl Wilaya {
    /// Normalize (trim + lowercase) and look up a wilaya name.
    ///
    /// # Errors
    ///
    /// Returns [`WilayaError`] if the name is not one of the 58 provinces.
    pub fn parse(s: &str) -> Result<Self, WilayaError> {
        let normalized = s.trim().to_lowercase();
        WILAYAS
            .iter()
            .find(|name| **name == normalized)
            .copied()
            .map(Self)
            .ok_or(WilayaError)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Official wilaya number (1-based).
    #[must_use]
    pub fn code(&self) -> usize {
        WILAYAS
            .iter()
            .position(|name| *name == self.0)
            .map_or(0, |idx| idx + 1)
    }
}

impl std::fmt::Display for Wilaya {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl<'de> Deserialize<'de> for Wilaya {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
