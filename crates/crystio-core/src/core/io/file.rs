use super::error::StructureFileError;
use super::registry;
use crate::core::models::structure::Structure;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Reads a structure file with the default registry.
///
/// # Arguments
///
/// * `path` - File to read.
/// * `format` - A registered format name or `"auto"`.
///
/// # Return
///
/// Returns the structure together with the name of the format that parsed it.
///
/// # Errors
///
/// Returns [`StructureFileError::Io`] if the file cannot be read and
/// [`StructureFileError::Format`] if its content is rejected.
pub fn read_from_path(
    path: impl AsRef<Path>,
    format: &str,
) -> Result<(Structure, String), StructureFileError> {
    let path = path.as_ref();
    debug!(path = %path.display(), format, "Reading structure file.");
    let text = fs::read_to_string(path).map_err(|e| StructureFileError::io(path, e))?;
    registry::read(&text, format).map_err(|e| StructureFileError::format(path, e))
}

/// Writes a structure file with the default registry.
///
/// The text is fully serialized before the file is created, so a structure the
/// format cannot express leaves no partial file behind.
pub fn write_to_path(
    structure: &Structure,
    path: impl AsRef<Path>,
    format: &str,
) -> Result<(), StructureFileError> {
    let path = path.as_ref();
    let text = registry::write(structure, format).map_err(|e| StructureFileError::format(path, e))?;

    info!(path = %path.display(), format, atoms = structure.len(), "Writing structure file.");
    let file = fs::File::create(path).map_err(|e| StructureFileError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(text.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| StructureFileError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::lattice::Lattice;
    use nalgebra::Vector3;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    fn sample_structure() -> Structure {
        let mut stru = Structure::with_lattice("rock salt", Lattice::new(5.64, 5.64, 5.64, 90.0, 90.0, 90.0));
        stru.push(Atom::new("Na", Vector3::new(0.0, 0.0, 0.0)).with_b_iso(0.5));
        stru.push(Atom::new("Cl", Vector3::new(0.5, 0.5, 0.5)).with_b_iso(0.7));
        stru
    }

    #[test]
    fn read_from_path_detects_format() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "1\nhydrogen\nH 0 0 0.74\n").unwrap();

        let (stru, format) = read_from_path(file.path(), "auto").unwrap();
        assert_eq!(format, "xyz");
        assert_eq!(stru.len(), 1);
        assert_eq!(stru[0].element(), "H");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let err = read_from_path(dir.path().join("absent.stru"), "auto").unwrap_err();
        assert!(matches!(err, StructureFileError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_a_format_error_with_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "2\nt\nC 0 0 0\n").unwrap();

        let err = read_from_path(file.path(), "xyz").unwrap_err();
        let source = err.format_error().unwrap();
        assert_eq!(source.message, "expected 2 atoms, read 1");
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn written_file_reads_back_with_same_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nacl.stru");
        let stru = sample_structure();

        write_to_path(&stru, &path, "discus").unwrap();
        let (again, format) = read_from_path(&path, "auto").unwrap();

        assert_eq!(format, "discus");
        assert_eq!(again.title, "rock salt");
        assert_eq!(again.len(), 2);
        assert_eq!(again[1].element(), "Cl");
        assert!((again[1].xyz - Vector3::new(0.5, 0.5, 0.5)).norm() < 1e-8);
        assert!((again.lattice.parameters().a - 5.64).abs() < 1e-6);
    }

    #[test]
    fn rejected_write_leaves_no_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.any");
        let err = write_to_path(&sample_structure(), &path, "auto").unwrap_err();
        assert!(matches!(err, StructureFileError::Format { .. }));
        assert!(!path.exists());
    }
}
