use super::error::FormatError;
use super::lines::{Line, split_lines};
use crate::core::models::structure::Structure;

/// Defines the interface for reading and writing one structure file format.
///
/// Implementors translate between numbered input lines and a [`Structure`].
/// Parsing must be free of side effects: a handler builds a fresh structure and
/// returns it only when the whole input has been accepted, so a failed attempt can
/// simply be discarded during format auto-detection.
pub trait StructureParser: Send + Sync {
    /// Parses numbered lines into a structure.
    ///
    /// # Arguments
    ///
    /// * `lines` - The input split by [`split_lines`].
    ///
    /// # Return
    ///
    /// Returns a fully populated structure.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] describing the first malformation found.
    fn parse_lines(&self, lines: &[Line<'_>]) -> Result<Structure, FormatError>;

    /// Converts a structure into output lines without terminators.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] if the structure cannot be expressed in this format.
    fn to_lines(&self, structure: &Structure) -> Result<Vec<String>, FormatError>;

    /// Parses a complete text.
    fn parse(&self, text: &str) -> Result<Structure, FormatError> {
        self.parse_lines(&split_lines(text))
    }

    /// Serializes a structure into text, each line terminated by a newline.
    fn serialize(&self, structure: &Structure) -> Result<String, FormatError> {
        let mut text = String::new();
        for line in self.to_lines(structure)? {
            text.push_str(&line);
            text.push('\n');
        }
        Ok(text)
    }
}
