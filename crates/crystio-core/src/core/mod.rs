//! Data model and file formats.
//!
//! - [`models`] - lattices, atoms and structures.
//! - [`io`] - the line protocol, format handlers and the format registry.

pub mod io;
pub mod models;
