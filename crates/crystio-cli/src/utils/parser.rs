use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid formula '{0}'. It must start with an element symbol (e.g., 'Na4Cl4').")]
    InvalidFormula(String),

    #[error("Invalid formula, '{count}' is not a valid count for '{element}'.")]
    InvalidCount { element: String, count: String },
}

/// Expands a chemical formula into one element symbol per atom.
///
/// Whitespace is ignored and a missing count means one atom, so `"Na4 Cl4"` and
/// `"NaCl"` are both accepted. Symbols are an uppercase letter optionally followed by
/// one lowercase letter.
pub fn parse_formula(formula: &str) -> Result<Vec<String>, ParseError> {
    let compact: String = formula.chars().filter(|c| !c.is_whitespace()).collect();
    if !compact.starts_with(|c: char| c.is_ascii_uppercase()) {
        return Err(ParseError::InvalidFormula(formula.to_string()));
    }

    let mut elements = Vec::new();
    let mut chars = compact.chars().peekable();
    while let Some(first) = chars.next() {
        let mut element = first.to_string();
        if let Some(second) = chars.next_if(|c| c.is_ascii_lowercase()) {
            element.push(second);
        }

        let mut count = String::new();
        while let Some(c) = chars.next_if(|c| !c.is_ascii_uppercase()) {
            count.push(c);
        }
        let n = if count.is_empty() {
            1
        } else {
            count.parse::<usize>().map_err(|_| ParseError::InvalidCount {
                element: element.clone(),
                count: count.clone(),
            })?
        };
        elements.extend(std::iter::repeat_n(element, n));
    }
    Ok(elements)
}
