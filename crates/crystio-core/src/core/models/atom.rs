use nalgebra::Vector3;
use serde::{Deserialize, Deserializer, Serialize};
use std::f64::consts::PI;

/// Conversion factor between isotropic B and U displacement values, `B = 8π²U`.
pub const B_TO_U: f64 = 1.0 / (8.0 * PI * PI);

/// Thermal displacement of one atomic site.
///
/// Exactly one representation is authoritative for an atom at any time; switching
/// between them replaces the previous values rather than keeping both around.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Displacement {
    /// Isotropic displacement expressed as a Debye-Waller B factor in Å².
    Isotropic { b_iso: f64 },
    /// Anisotropic displacement tensor components `[U11, U22, U33, U12, U13, U23]` in Å².
    Anisotropic { u: [f64; 6] },
}

impl Default for Displacement {
    fn default() -> Self {
        Displacement::Isotropic { b_iso: 0.0 }
    }
}

/// Represents one structural site: element, fractional position and displacement.
///
/// The position is interpreted relative to the lattice of the structure that owns
/// the atom. An atom does not keep a reference to that lattice; cartesian
/// coordinates are obtained through [`crate::core::models::structure::Structure::cartesian`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Element symbol with normalized casing (e.g. "Na", "O").
    #[serde(deserialize_with = "deserialize_element")]
    element: String,
    /// Position in fractional coordinates.
    pub xyz: Vector3<f64>,
    /// Active displacement representation.
    pub displacement: Displacement,
}

impl Atom {
    /// Creates a new `Atom` with a zero isotropic displacement.
    ///
    /// # Arguments
    ///
    /// * `element` - The element symbol in any letter case; it is normalized.
    /// * `xyz` - The fractional coordinates of the site.
    pub fn new(element: &str, xyz: Vector3<f64>) -> Self {
        Self {
            element: normalize_element(element),
            xyz,
            displacement: Displacement::default(),
        }
    }

    /// Builder-style setter for an isotropic B value.
    pub fn with_b_iso(mut self, b_iso: f64) -> Self {
        self.set_b_iso(b_iso);
        self
    }

    /// Builder-style setter for an anisotropic U tensor.
    pub fn with_u_tensor(mut self, u: [f64; 6]) -> Self {
        self.set_u_tensor(u);
        self
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    /// Replaces the element symbol, normalizing its casing.
    pub fn set_element(&mut self, element: &str) {
        self.element = normalize_element(element);
    }

    /// Returns `true` when the anisotropic tensor is the active representation.
    pub fn anisotropy(&self) -> bool {
        matches!(self.displacement, Displacement::Anisotropic { .. })
    }

    /// Makes the atom isotropic with the given B value.
    pub fn set_b_iso(&mut self, b_iso: f64) {
        self.displacement = Displacement::Isotropic { b_iso };
    }

    /// Makes the atom anisotropic with the given U tensor components.
    pub fn set_u_tensor(&mut self, u: [f64; 6]) {
        self.displacement = Displacement::Anisotropic { u };
    }

    /// Returns the U tensor if the atom is anisotropic.
    pub fn u_tensor(&self) -> Option<&[f64; 6]> {
        match &self.displacement {
            Displacement::Anisotropic { u } => Some(u),
            Displacement::Isotropic { .. } => None,
        }
    }

    /// Equivalent isotropic U value.
    ///
    /// For anisotropic atoms this is the mean of the diagonal tensor components.
    pub fn u_iso_equiv(&self) -> f64 {
        match self.displacement {
            Displacement::Isotropic { b_iso } => b_iso * B_TO_U,
            Displacement::Anisotropic { u } => (u[0] + u[1] + u[2]) / 3.0,
        }
    }

    /// Equivalent isotropic B value, `8π²·U_iso`.
    pub fn b_iso_equiv(&self) -> f64 {
        match self.displacement {
            Displacement::Isotropic { b_iso } => b_iso,
            Displacement::Anisotropic { .. } => self.u_iso_equiv() / B_TO_U,
        }
    }
}

/// Normalizes an element symbol to a leading uppercase letter followed by lowercase.
///
/// Surrounding whitespace is removed. An empty symbol stays empty.
pub fn normalize_element(symbol: &str) -> String {
    let mut chars = symbol.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn deserialize_element<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|symbol| normalize_element(&symbol))
}
