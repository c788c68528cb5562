use super::discus::DiscusParser;
use super::error::FormatError;
use super::lines::split_lines;
use super::traits::StructureParser;
use super::xyz::XyzParser;
use crate::core::models::structure::Structure;
use phf::{OrderedMap, phf_ordered_map};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info};

/// Format name that requests auto-detection on read.
pub const AUTO: &str = "auto";

/// The structure formats built into the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureFormat {
    /// DISCUS structure files as written by PDFFit.
    Discus,
    /// Plain XYZ files.
    Xyz,
}

/// Built-in formats in auto-detection priority order.
///
/// Grammars with specific header records come before permissive ones, so a strict
/// parser gets the chance to reject a foreign file before a lenient one accepts it.
pub static BUILTIN_FORMATS: OrderedMap<&'static str, StructureFormat> = phf_ordered_map! {
    "discus" => StructureFormat::Discus,
    "xyz" => StructureFormat::Xyz,
};

impl StructureFormat {
    pub fn name(self) -> &'static str {
        match self {
            StructureFormat::Discus => "discus",
            StructureFormat::Xyz => "xyz",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        BUILTIN_FORMATS.get(name).copied()
    }
}

impl fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StructureFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| unknown_format(s))
    }
}

impl StructureParser for StructureFormat {
    fn parse_lines(&self, lines: &[super::lines::Line<'_>]) -> Result<Structure, FormatError> {
        match self {
            StructureFormat::Discus => DiscusParser.parse_lines(lines),
            StructureFormat::Xyz => XyzParser.parse_lines(lines),
        }
    }

    fn to_lines(&self, structure: &Structure) -> Result<Vec<String>, FormatError> {
        match self {
            StructureFormat::Discus => DiscusParser.to_lines(structure),
            StructureFormat::Xyz => XyzParser.to_lines(structure),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("'{0}' is reserved for format auto-detection")]
    ReservedName(String),
    #[error("Format '{0}' is already registered")]
    Duplicate(String),
}

/// An ordered table of named structure parsers.
///
/// The order is the auto-detection priority. Entries can be appended but never
/// removed or reordered.
pub struct FormatRegistry {
    handlers: Vec<(String, Box<dyn StructureParser>)>,
}

impl FormatRegistry {
    /// Creates a registry without any format.
    pub fn empty() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Creates a registry holding the built-in formats in priority order.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (name, format) in BUILTIN_FORMATS.entries() {
            let handler: Box<dyn StructureParser> = Box::new(*format);
            registry.handlers.push((name.to_string(), handler));
        }
        registry
    }

    /// Appends a parser; it is tried after every previously registered one.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] if `name` is `"auto"` or already taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: impl StructureParser + 'static,
    ) -> Result<(), RegistrationError> {
        let name = name.into();
        if name == AUTO {
            return Err(RegistrationError::ReservedName(name));
        }
        if self.get(&name).is_some() {
            return Err(RegistrationError::Duplicate(name));
        }
        debug!(format = %name, "Registering structure format.");
        let handler: Box<dyn StructureParser> = Box::new(handler);
        self.handlers.push((name, handler));
        Ok(())
    }

    /// Registered format names in priority order.
    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn StructureParser> {
        self.handlers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, handler)| handler.as_ref())
    }

    /// Parses `text` in the given format, or detects the format when it is `"auto"`.
    ///
    /// # Return
    ///
    /// Returns the structure and the name of the format that accepted the text.
    ///
    /// # Errors
    ///
    /// A named format's error is returned unchanged. In auto mode a failure of every
    /// format yields one "no format matched" error, since the rejection reason of
    /// whichever parser ran first says nothing about the real format.
    pub fn read(&self, text: &str, format: &str) -> Result<(Structure, String), FormatError> {
        let lines = split_lines(text);
        if format != AUTO {
            let handler = self.get(format).ok_or_else(|| unknown_format(format))?;
            let stru = handler.parse_lines(&lines)?;
            return Ok((stru, format.to_string()));
        }

        for (name, handler) in &self.handlers {
            match handler.parse_lines(&lines) {
                Ok(stru) => {
                    info!(format = %name, atoms = stru.len(), "Detected structure format.");
                    return Ok((stru, name.clone()));
                }
                Err(e) => debug!(format = %name, error = %e, "Format rejected input."),
            }
        }
        Err(FormatError::new(format!(
            "no format matched, tried {}",
            self.names().join(", ")
        )))
    }

    /// Serializes a structure in the named format.
    ///
    /// # Errors
    ///
    /// Fails for unknown names, for `"auto"`, and when the structure cannot be
    /// expressed in the format.
    pub fn write(&self, structure: &Structure, format: &str) -> Result<String, FormatError> {
        let handler = self.get(format).ok_or_else(|| unknown_format(format))?;
        handler.serialize(structure)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn unknown_format(name: &str) -> FormatError {
    FormatError::new(format!("unknown structure format '{}'", name))
}

static DEFAULT_REGISTRY: LazyLock<FormatRegistry> = LazyLock::new(FormatRegistry::builtin);

/// The process-wide registry of built-in formats.
pub fn default_registry() -> &'static FormatRegistry {
    &DEFAULT_REGISTRY
}

/// Parses text with the default registry, see [`FormatRegistry::read`].
pub fn read(text: &str, format: &str) -> Result<(Structure, String), FormatError> {
    default_registry().read(text, format)
}

/// Serializes with the default registry, see [`FormatRegistry::write`].
pub fn write(structure: &Structure, format: &str) -> Result<String, FormatError> {
    default_registry().write(structure, format)
}

/// Formats accepted on input, starting with `"auto"`.
pub fn input_formats() -> Vec<&'static str> {
    std::iter::once(AUTO)
        .chain(default_registry().names())
        .collect()
}

/// Formats accepted on output.
pub fn output_formats() -> Vec<&'static str> {
    default_registry().names()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::lines::Line;
    use crate::core::models::atom::Atom;
    use nalgebra::Vector3;

    const NI_DISCUS: &str = "\
title   structure Ni  FCC
spcgr   Fm-3m
cell    3.520000,   3.520000,   3.520000,  90.000000,  90.000000,  90.000000
ncell          1,         1,         1,         4
atoms
NI          0.00000000        0.00000000        0.00000000       0.1000
NI          0.00000000        0.50000000        0.50000000       0.1000
NI          0.50000000        0.00000000        0.50000000       0.1000
NI          0.50000000        0.50000000        0.00000000       0.1000
";

    /// Accepts a single line reading `marker` and produces an empty structure.
    struct MarkerParser;

    impl StructureParser for MarkerParser {
        fn parse_lines(&self, lines: &[Line<'_>]) -> Result<Structure, FormatError> {
            match lines {
                [line] if line.text == "marker" => Ok(Structure::new()),
                _ => Err(FormatError::at(1, "not a marker file")),
            }
        }

        fn to_lines(&self, _structure: &Structure) -> Result<Vec<String>, FormatError> {
            Ok(vec!["marker".to_string()])
        }
    }

    #[test]
    fn builtin_formats_are_in_priority_order() {
        assert_eq!(FormatRegistry::builtin().names(), ["discus", "xyz"]);
        assert_eq!(input_formats(), ["auto", "discus", "xyz"]);
        assert_eq!(output_formats(), ["discus", "xyz"]);
    }

    #[test]
    fn format_names_round_trip() {
        for (name, format) in BUILTIN_FORMATS.entries() {
            assert_eq!(format.name(), *name);
            assert_eq!(name.parse::<StructureFormat>().unwrap(), *format);
            assert_eq!(format.to_string(), *name);
        }
        assert!("cif".parse::<StructureFormat>().is_err());
    }

    #[test]
    fn auto_detects_discus() {
        let (stru, format) = read(NI_DISCUS, AUTO).unwrap();
        assert_eq!(format, "discus");
        assert_eq!(stru.len(), 4);
    }

    #[test]
    fn auto_detects_xyz() {
        let (stru, format) = read("2\nTitle\nC 0 0 0\nO 1 1 1\n", AUTO).unwrap();
        assert_eq!(format, "xyz");
        assert_eq!(stru.title, "Title");
    }

    #[test]
    fn auto_reports_aggregate_error_when_nothing_matches() {
        let err = read("this is not\na structure file\n", AUTO).unwrap_err();
        assert!(err.message.contains("no format matched"));
        assert!(err.message.contains("discus, xyz"));
        assert_eq!(err.line, None);
    }

    #[test]
    fn named_format_error_propagates_unchanged() {
        let err = read("3\nshort\nC 0 0 0\n", "xyz").unwrap_err();
        assert_eq!(err, FormatError::new("expected 3 atoms, read 1"));
    }

    #[test]
    fn named_format_does_not_fall_back() {
        assert!(read(NI_DISCUS, "xyz").is_err());
    }

    #[test]
    fn unknown_format_name_is_rejected() {
        let err = read(NI_DISCUS, "cif").unwrap_err();
        assert_eq!(err.message, "unknown structure format 'cif'");
    }

    #[test]
    fn write_with_auto_is_rejected() {
        let stru = Structure::new();
        assert!(write(&stru, AUTO).is_err());
    }

    #[test]
    fn converting_discus_to_xyz_writes_cartesian_positions() {
        let (stru, _) = read(NI_DISCUS, AUTO).unwrap();
        let text = write(&stru, "xyz").unwrap();
        let (xyz, format) = read(&text, AUTO).unwrap();
        assert_eq!(format, "xyz");
        assert_eq!(xyz.len(), 4);
        assert_eq!(xyz.title, "structure Ni  FCC");
        assert!((xyz[1].xyz - Vector3::new(0.0, 1.76, 1.76)).norm() < 1e-12);
    }

    #[test]
    fn registered_formats_are_tried_after_builtins() {
        let mut registry = FormatRegistry::builtin();
        registry.register("marker", MarkerParser).unwrap();
        assert_eq!(registry.names(), ["discus", "xyz", "marker"]);

        let (_, format) = registry.read("marker\n", AUTO).unwrap();
        assert_eq!(format, "marker");
        assert_eq!(registry.write(&Structure::new(), "marker").unwrap(), "marker\n");
    }

    #[test]
    fn registration_rejects_reserved_and_duplicate_names() {
        let mut registry = FormatRegistry::builtin();
        assert_eq!(
            registry.register(AUTO, MarkerParser),
            Err(RegistrationError::ReservedName("auto".to_string()))
        );
        assert_eq!(
            registry.register("xyz", MarkerParser),
            Err(RegistrationError::Duplicate("xyz".to_string()))
        );
    }

    #[test]
    fn empty_registry_matches_nothing() {
        let err = FormatRegistry::empty().read(NI_DISCUS, AUTO).unwrap_err();
        assert!(err.message.contains("no format matched"));
    }

    #[test]
    fn concurrent_reads_share_the_default_registry() {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    let mut stru = Structure::new();
                    stru.push(Atom::new("C", Vector3::new(i as f64, 0.0, 0.0)));
                    let text = write(&stru, "xyz").unwrap();
                    read(&text, AUTO).unwrap().0.len()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    }
}
