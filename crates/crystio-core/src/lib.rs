//! # crystio
//!
//! Crystal structure model and file format conversion.
//!
//! A [`Structure`](core::models::structure::Structure) is an ordered list of atoms
//! with fractional coordinates in a [`Lattice`](core::models::lattice::Lattice).
//! Structures are read from and written to text formats through a registry that can
//! detect the format of an unknown file:
//!
//! ```no_run
//! use crystio::core::io;
//!
//! let (structure, format) = io::read_from_path("ni.stru", "auto")?;
//! println!("read {} atoms as {}", structure.len(), format);
//! io::write_to_path(&structure, "ni.xyz", "xyz")?;
//! # Ok::<(), crystio::core::io::StructureFileError>(())
//! ```

pub mod core;
