//! Plain XYZ format.
//!
//! The first line holds the number of atoms, the second an optional title and every
//! following line one `element x y z` record. XYZ has no unit cell, so positions are
//! read into the default lattice and written in cartesian coordinates.

use super::error::FormatError;
use super::lines::{Line, ensure_element_token, ensure_single_line};
use super::traits::StructureParser;
use crate::core::models::atom::Atom;
use crate::core::models::structure::Structure;
use nalgebra::Vector3;

const RECORD_COLUMNS: usize = 4;

pub struct XyzParser;

impl XyzParser {
    fn is_leading_skip(line: &Line<'_>) -> bool {
        line.tokens.first().is_none_or(|t| *t == "#")
    }

    fn declared_count(line: &Line<'_>) -> Option<usize> {
        match line.tokens.as_slice() {
            [token] => token
                .parse::<usize>()
                .ok()
                .filter(|n| n.to_string() == *token),
            _ => None,
        }
    }
}

impl StructureParser for XyzParser {
    fn parse_lines(&self, lines: &[Line<'_>]) -> Result<Structure, FormatError> {
        let mut stru = Structure::new();

        let start = lines
            .iter()
            .position(|l| !Self::is_leading_skip(l))
            .unwrap_or(lines.len());
        let missing_count =
            || FormatError::at(start + 1, "invalid XYZ format, missing number of atoms");

        let declared = lines
            .get(start)
            .and_then(Self::declared_count)
            .ok_or_else(missing_count)?;
        let title_line = lines.get(start + 1).ok_or_else(missing_count)?;
        stru.title = title_line.text.trim().to_string();

        let first_record = start + 2;
        let mut stop = lines.len();
        while stop > first_record && lines[stop - 1].is_blank() {
            stop -= 1;
        }
        if declared == 0 || first_record >= stop {
            return Ok(stru);
        }
        let records = &lines[first_record..stop];

        let columns = records
            .iter()
            .find(|l| !l.is_blank())
            .map_or(0, |l| l.tokens.len());
        if columns != RECORD_COLUMNS {
            return Err(records[0].error("invalid XYZ format, expected 4 columns"));
        }

        for line in records {
            if line.is_blank() {
                continue;
            }
            if line.tokens.len() != columns {
                return Err(line.error("all lines must have the same number of columns"));
            }
            let xyz = Vector3::new(
                line.parse(line.tokens[1])?,
                line.parse(line.tokens[2])?,
                line.parse(line.tokens[3])?,
            );
            stru.push(Atom::new(line.tokens[0], xyz));
        }

        if stru.len() != declared {
            return Err(FormatError::new(format!(
                "expected {} atoms, read {}",
                declared,
                stru.len()
            )));
        }
        Ok(stru)
    }

    fn to_lines(&self, structure: &Structure) -> Result<Vec<String>, FormatError> {
        ensure_single_line("title", &structure.title)?;
        for (idx, atom) in structure.iter().enumerate() {
            ensure_element_token(idx, atom.element())?;
        }

        let mut lines = Vec::with_capacity(structure.len() + 2);
        lines.push(structure.len().to_string());
        lines.push(structure.title.clone());
        for atom in structure {
            let rc = structure.cartesian(atom);
            lines.push(format!(
                "{:<3} {} {} {}",
                atom.element(),
                rc.x,
                rc.y,
                rc.z
            ));
        }
        Ok(lines)
    }
}
