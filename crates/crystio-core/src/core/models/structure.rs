use super::atom::Atom;
use super::lattice::Lattice;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Finite-size envelope applied to a PDFFit model.
///
/// A value of exactly zero means the envelope is not specified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeEnvelope {
    /// Spherical particle of the given diameter.
    Sphere { diameter: f64 },
    /// Step function cutting the PDF off at the given distance.
    Stepcut { cutoff: f64 },
}

impl ShapeEnvelope {
    pub fn value(&self) -> f64 {
        match *self {
            ShapeEnvelope::Sphere { diameter } => diameter,
            ShapeEnvelope::Stepcut { cutoff } => cutoff,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.value() == 0.0
    }
}

/// Metadata carried by the DISCUS/PDFFit format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdffitExtension {
    /// Space group symbol, stored verbatim and never interpreted.
    pub spcgr: String,
    /// Supercell multipliers and atoms per cell, `[n1, n2, n3, ncatoms]`.
    pub ncell: [usize; 4],
    /// Optional shape envelope.
    pub shape: Option<ShapeEnvelope>,
    /// Unrecognized header lines, right-trimmed, in the order they were read.
    pub ignored_lines: Vec<String>,
}

impl Default for PdffitExtension {
    fn default() -> Self {
        Self {
            spcgr: "P1".to_string(),
            ncell: [1, 1, 1, 0],
            shape: None,
            ignored_lines: Vec::new(),
        }
    }
}

impl PdffitExtension {
    /// Spherical envelope diameter, or 0 when no sphere envelope is set.
    pub fn sp_diameter(&self) -> f64 {
        match self.shape {
            Some(ShapeEnvelope::Sphere { diameter }) => diameter,
            _ => 0.0,
        }
    }

    /// Step-cut distance, or 0 when no step-cut envelope is set.
    pub fn stepcut(&self) -> f64 {
        match self.shape {
            Some(ShapeEnvelope::Stepcut { cutoff }) => cutoff,
            _ => 0.0,
        }
    }

    /// Sets a spherical envelope; a diameter of 0 clears the envelope.
    pub fn set_sp_diameter(&mut self, diameter: f64) {
        self.shape = envelope(ShapeEnvelope::Sphere { diameter });
    }

    /// Sets a step-cut envelope; a cutoff of 0 clears the envelope.
    pub fn set_stepcut(&mut self, cutoff: f64) {
        self.shape = envelope(ShapeEnvelope::Stepcut { cutoff });
    }

    /// Returns the envelope only when it carries a nonzero value.
    pub fn active_shape(&self) -> Option<ShapeEnvelope> {
        self.shape.filter(|s| !s.is_absent())
    }
}

fn envelope(shape: ShapeEnvelope) -> Option<ShapeEnvelope> {
    (!shape.is_absent()).then_some(shape)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructureEditError {
    #[error("Formula has {formula} atoms while structure has {structure}")]
    ElementCountMismatch { formula: usize, structure: usize },
}

/// An ordered collection of atoms together with their lattice and title.
///
/// The position of an atom in the sequence is its index and is significant: it is
/// matched against atom counts declared in file headers and against element lists
/// supplied for formula substitution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Free-form structure title.
    pub title: String,
    /// Unit cell the fractional atom positions refer to.
    pub lattice: Lattice,
    atoms: Vec<Atom>,
    /// Extension record filled by the DISCUS/PDFFit format.
    pub pdffit: Option<PdffitExtension>,
}

impl Structure {
    /// Creates an empty structure in the default unit cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty structure with the given title and lattice.
    pub fn with_lattice(title: impl Into<String>, lattice: Lattice) -> Self {
        Self {
            title: title.into(),
            lattice,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Appends an atom; its index is the previous length.
    pub fn push(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    pub fn get(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Atom> {
        self.atoms.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Atom> {
        self.atoms.iter()
    }

    /// Cartesian position of an atom in this structure's lattice.
    pub fn cartesian(&self, atom: &Atom) -> Vector3<f64> {
        self.lattice.to_cartesian(&atom.xyz)
    }

    pub fn cartesian_positions(&self) -> Vec<Vector3<f64>> {
        self.atoms.iter().map(|a| self.cartesian(a)).collect()
    }

    pub fn pdffit(&self) -> Option<&PdffitExtension> {
        self.pdffit.as_ref()
    }

    /// Returns the PDFFit extension record, creating a default one if needed.
    pub fn pdffit_mut(&mut self) -> &mut PdffitExtension {
        self.pdffit.get_or_insert_with(PdffitExtension::default)
    }

    /// Moves the structure into a new lattice while keeping cartesian positions.
    ///
    /// Fractional coordinates of every atom are re-expressed in `lattice`.
    pub fn place_in_lattice(&mut self, lattice: Lattice) {
        for atom in &mut self.atoms {
            let cartesian = self.lattice.to_cartesian(&atom.xyz);
            atom.xyz = lattice.to_fractional(&cartesian);
        }
        self.lattice = lattice;
    }

    /// Replaces atom elements in order with the given symbols.
    ///
    /// # Errors
    ///
    /// Returns [`StructureEditError::ElementCountMismatch`] when the number of symbols
    /// differs from the number of atoms; the structure is left unchanged.
    pub fn assign_elements<S: AsRef<str>>(&mut self, elements: &[S]) -> Result<(), StructureEditError> {
        if elements.len() != self.atoms.len() {
            return Err(StructureEditError::ElementCountMismatch {
                formula: elements.len(),
                structure: self.atoms.len(),
            });
        }
        for (atom, element) in self.atoms.iter_mut().zip(elements) {
            atom.set_element(element.as_ref());
        }
        Ok(())
    }

    /// Element symbols paired with their counts, in order of first appearance.
    pub fn composition(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for atom in &self.atoms {
            match counts.iter_mut().find(|(el, _)| el == atom.element()) {
                Some((_, n)) => *n += 1,
                None => counts.push((atom.element().to_string(), 1)),
            }
        }
        counts
    }
}

impl<'a> IntoIterator for &'a Structure {
    type Item = &'a Atom;
    type IntoIter = std::slice::Iter<'a, Atom>;

    fn into_iter(self) -> Self::IntoIter {
        self.atoms.iter()
    }
}

impl std::ops::Index<usize> for Structure {
    type Output = Atom;

    fn index(&self, index: usize) -> &Self::Output {
        &self.atoms[index]
    }
}
