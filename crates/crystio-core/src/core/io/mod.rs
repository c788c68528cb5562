//! Reading and writing crystal structure files.
//!
//! Every format is a [`traits::StructureParser`] working on numbered lines from
//! [`lines`]. The [`registry`] holds the formats in auto-detection order and exposes
//! text-level `read`/`write`, while [`file`] adds the path-based helpers.
//!
//! Built-in formats:
//!
//! - [`discus`] - DISCUS structure files as used by PDFFit, with fractional
//!   coordinates, space group, supercell and shape metadata.
//! - [`xyz`] - plain XYZ files with cartesian coordinates.

pub mod discus;
pub mod error;
pub mod file;
pub mod lines;
pub mod registry;
pub mod traits;
pub mod xyz;

pub use error::{FormatError, StructureFileError};
pub use file::{read_from_path, write_to_path};
pub use registry::{FormatRegistry, StructureFormat, input_formats, output_formats, read, write};
