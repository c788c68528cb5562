//! DISCUS structure format, as used by PDFFit.
//!
//! A file consists of a header of keyword records in any order followed by the
//! `atoms` record and one line per atom:
//!
//! ```text
//! title   structure Ni  FCC
//! spcgr   Fm-3m
//! cell    3.520000,   3.520000,   3.520000,  90.000000,  90.000000,  90.000000
//! ncell          1,         1,         1,         4
//! atoms
//! NI          0.00000000        0.00000000        0.00000000       0.1000
//! ```
//!
//! Header lines that are not recognized are kept verbatim in
//! [`PdffitExtension::ignored_lines`] and written back on output. Once the atom
//! section has started every line must be a valid atom record.

use super::error::FormatError;
use super::lines::{Line, LineKind, ensure_element_token, ensure_single_line};
use super::traits::StructureParser;
use crate::core::models::atom::{Atom, Displacement};
use crate::core::models::lattice::Lattice;
use crate::core::models::structure::{PdffitExtension, ShapeEnvelope, Structure};
use nalgebra::Vector3;
use phf::{Map, phf_map};
use tracing::{debug, trace};

/// Numeric columns after the element for isotropic rows: x, y, z, Biso.
const ISOTROPIC_COLUMNS: usize = 4;
/// Numeric columns after the element for anisotropic rows: x, y, z, U11..U23.
const ANISOTROPIC_COLUMNS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderRecord {
    Title,
    Cell,
    Spcgr,
    Ncell,
    Shape,
    Atoms,
    Unsupported,
}

static HEADER_RECORDS: Map<&'static str, HeaderRecord> = phf_map! {
    "title" => HeaderRecord::Title,
    "cell" => HeaderRecord::Cell,
    "spcgr" => HeaderRecord::Spcgr,
    "ncell" => HeaderRecord::Ncell,
    "shape" => HeaderRecord::Shape,
    "atoms" => HeaderRecord::Atoms,
    "generator" => HeaderRecord::Unsupported,
    "symmetry" => HeaderRecord::Unsupported,
    "molecule" => HeaderRecord::Unsupported,
};

pub struct DiscusParser;

/// Everything accumulated during one parse call.
#[derive(Default)]
struct DiscusReader {
    stru: Structure,
    pdffit: PdffitExtension,
    cell_read: bool,
    /// Product of the ncell record, once one has been read.
    expected_atoms: Option<usize>,
    atom_columns: Option<usize>,
}

impl DiscusReader {
    fn parse_cell(&mut self, line: &Line<'_>) -> Result<(), FormatError> {
        let tokens = line.comma_tokens();
        if tokens.len() != 7 {
            return Err(line.error("invalid cell record, expected 6 parameters"));
        }
        let p = tokens[1..]
            .iter()
            .map(|t| line.parse::<f64>(t))
            .collect::<Result<Vec<_>, _>>()?;
        self.stru.lattice = Lattice::new(p[0], p[1], p[2], p[3], p[4], p[5]);
        self.cell_read = true;
        Ok(())
    }

    fn parse_ncell(&mut self, line: &Line<'_>) -> Result<(), FormatError> {
        let tokens = line.comma_tokens();
        if tokens.len() != 5 {
            return Err(line.error("invalid ncell record, expected 4 integers"));
        }
        for (slot, token) in self.pdffit.ncell.iter_mut().zip(&tokens[1..]) {
            *slot = line.parse(token)?;
        }
        let expected = self
            .pdffit
            .ncell
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or_else(|| line.error("invalid ncell record, supercell too large"))?;
        self.expected_atoms = Some(expected);
        Ok(())
    }

    fn parse_shape(&mut self, line: &Line<'_>) -> Result<(), FormatError> {
        let tokens = line.comma_tokens();
        let kind = tokens
            .get(1)
            .ok_or_else(|| line.error("invalid shape record"))?;
        let value = |line: &Line<'_>| -> Result<f64, FormatError> {
            let token = tokens
                .get(2)
                .ok_or_else(|| line.error("invalid shape record, missing value"))?;
            line.parse(token)
        };
        match *kind {
            "sphere" => self.pdffit.set_sp_diameter(value(line)?),
            "stepcut" => self.pdffit.set_stepcut(value(line)?),
            other => return Err(line.error(format!("unknown shape kind '{}'", other))),
        }
        Ok(())
    }

    fn parse_atom(&mut self, line: &Line<'_>) -> Result<(), FormatError> {
        let tokens = line.comma_tokens();
        let Some((element, numbers)) = tokens.split_first() else {
            return Err(line.error("invalid atom record"));
        };
        let columns = numbers.len();
        match self.atom_columns {
            None if columns != ISOTROPIC_COLUMNS && columns != ANISOTROPIC_COLUMNS => {
                return Err(line.error(format!(
                    "invalid atom record, expected {} or {} numeric columns",
                    ISOTROPIC_COLUMNS, ANISOTROPIC_COLUMNS
                )));
            }
            None => self.atom_columns = Some(columns),
            Some(expected) if expected != columns => {
                return Err(line.error("all atom records must have the same number of columns"));
            }
            Some(_) => {}
        }

        let values = numbers
            .iter()
            .map(|t| line.parse::<f64>(t))
            .collect::<Result<Vec<_>, _>>()?;
        let atom = Atom::new(element, Vector3::new(values[0], values[1], values[2]));
        let atom = if columns == ISOTROPIC_COLUMNS {
            atom.with_b_iso(values[3])
        } else {
            atom.with_u_tensor([
                values[3], values[4], values[5], values[6], values[7], values[8],
            ])
        };
        self.stru.push(atom);
        Ok(())
    }

    /// Checks the declared atom count and folds a supercell into the lattice.
    fn finish(mut self) -> Result<Structure, FormatError> {
        let natoms = self.stru.len();
        let ncell = self.pdffit.ncell;
        if let Some(expected) = self.expected_atoms.filter(|&n| n != natoms) {
            return Err(FormatError::new(format!(
                "expected {} atoms, read {}",
                expected, natoms
            )));
        }
        if ncell[..3] != [1, 1, 1] {
            let (a, b, c, alpha, beta, gamma) = self.stru.lattice.abc_abg();
            let superlattice = Lattice::new(
                a * ncell[0] as f64,
                b * ncell[1] as f64,
                c * ncell[2] as f64,
                alpha,
                beta,
                gamma,
            );
            debug!(?ncell, "Folding DISCUS supercell into the lattice.");
            self.stru.place_in_lattice(superlattice);
        }
        self.pdffit.ncell = [1, 1, 1, natoms];
        self.stru.pdffit = Some(self.pdffit);
        Ok(self.stru)
    }
}

impl StructureParser for DiscusParser {
    fn parse_lines(&self, lines: &[Line<'_>]) -> Result<Structure, FormatError> {
        let mut reader = DiscusReader::default();
        let mut remaining = lines.iter();
        let mut atoms_line = None;

        for line in remaining.by_ref() {
            if line.kind() != LineKind::Record {
                continue;
            }
            let keyword = line.tokens[0];
            trace!(line = line.number, keyword, "DISCUS header record");
            match HEADER_RECORDS.get(keyword).copied() {
                Some(HeaderRecord::Atoms) => {
                    atoms_line = Some(line.number);
                    break;
                }
                Some(HeaderRecord::Title) => {
                    reader.stru.title = line.rest_after_keyword().to_string();
                }
                Some(HeaderRecord::Cell) => reader.parse_cell(line)?,
                Some(HeaderRecord::Spcgr) => {
                    reader.pdffit.spcgr = line.rest_after_keyword().to_string();
                }
                Some(HeaderRecord::Ncell) => reader.parse_ncell(line)?,
                Some(HeaderRecord::Shape) => reader.parse_shape(line)?,
                Some(HeaderRecord::Unsupported) => {
                    return Err(line.error(format!("'{}' record is not supported", keyword)));
                }
                None => reader
                    .pdffit
                    .ignored_lines
                    .push(line.text.trim_end().to_string()),
            }
        }

        if !reader.cell_read {
            let at = atoms_line
                .or_else(|| lines.last().map(|l| l.number))
                .unwrap_or(1);
            return Err(FormatError::at(at, "cell not defined"));
        }

        for line in remaining {
            if line.kind() == LineKind::Record {
                reader.parse_atom(line)?;
            }
        }

        reader.finish()
    }

    fn to_lines(&self, structure: &Structure) -> Result<Vec<String>, FormatError> {
        let anisotropic = structure.get(0).is_some_and(Atom::anisotropy);
        if structure.iter().any(|a| a.anisotropy() != anisotropic) {
            return Err(FormatError::new(
                "mixed isotropic and anisotropic displacement parameters cannot be written in DISCUS format",
            ));
        }

        let default_pdffit = PdffitExtension::default();
        let pdffit = structure.pdffit().unwrap_or(&default_pdffit);
        ensure_single_line("title", &structure.title)?;
        ensure_single_line("spcgr", &pdffit.spcgr)?;
        for ignored in &pdffit.ignored_lines {
            ensure_single_line("ignored header line", ignored)?;
        }
        for (idx, atom) in structure.iter().enumerate() {
            ensure_element_token(idx, atom.element())?;
        }

        let mut lines = Vec::with_capacity(structure.len() + pdffit.ignored_lines.len() + 6);
        lines.push(format!("title   {}", structure.title.trim()));
        let (a, b, c, alpha, beta, gamma) = structure.lattice.abc_abg();
        lines.push(format!(
            "cell   {:9.6}, {:9.6}, {:9.6}, {:9.6}, {:9.6}, {:9.6}",
            a, b, c, alpha, beta, gamma
        ));
        lines.push(format!("spcgr   {}", pdffit.spcgr));
        lines.push(format!(
            "ncell  {:9}, {:9}, {:9}, {:9}",
            1,
            1,
            1,
            structure.len()
        ));
        match pdffit.active_shape() {
            Some(ShapeEnvelope::Sphere { diameter }) => {
                lines.push(format!("shape   sphere, {}", diameter));
            }
            Some(ShapeEnvelope::Stepcut { cutoff }) => {
                lines.push(format!("shape   stepcut, {}", cutoff));
            }
            None => {}
        }
        lines.extend(pdffit.ignored_lines.iter().cloned());
        lines.push("atoms".to_string());

        for atom in structure {
            let xyz = atom.xyz.map(unsigned_zero);
            let mut line = format!(
                "{:<4} {:17.8} {:17.8} {:17.8}",
                atom.element().to_uppercase(),
                xyz.x,
                xyz.y,
                xyz.z
            );
            match atom.displacement {
                Displacement::Isotropic { b_iso } => {
                    line.push_str(&format!(" {:12.4}", unsigned_zero(b_iso)));
                }
                Displacement::Anisotropic { u } => {
                    for uij in u {
                        line.push_str(&format!(" {:12.6}", unsigned_zero(uij)));
                    }
                }
            }
            lines.push(line);
        }
        Ok(lines)
    }
}

// Avoids writing "-0.00000000" for coordinates that are negative zero.
fn unsigned_zero(x: f64) -> f64 {
    x + 0.0
}
