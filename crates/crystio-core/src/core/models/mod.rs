//! # Core Models Module
//!
//! The canonical in-memory representation of an atomic structure, shared by every
//! file format handler.
//!
//! ## Key Components
//!
//! - [`lattice`] - Unit-cell parameters and the fractional/cartesian transform
//! - [`atom`] - One structural site with element, fractional position and displacement
//! - [`structure`] - Ordered atom list with its lattice, title and format metadata
//!
//! ## Usage
//!
//! ```ignore
//! use crystio::core::models::{atom::Atom, lattice::Lattice, structure::Structure};
//! use nalgebra::Vector3;
//!
//! let mut stru = Structure::with_lattice("Ni", Lattice::new(3.52, 3.52, 3.52, 90.0, 90.0, 90.0));
//! stru.push(Atom::new("NI", Vector3::new(0.5, 0.5, 0.0)).with_b_iso(0.1));
//! let cartesian = stru.cartesian(&stru[0]);
//! ```

pub mod atom;
pub mod lattice;
pub mod structure;
