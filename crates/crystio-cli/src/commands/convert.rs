use crate::cli::ConvertArgs;
use crate::config::FormatConfig;
use crate::error::Result;
use crate::utils::parser::parse_formula;
use crystio::core::io;
use std::path::Path;
use tracing::info;

#[derive(Debug, PartialEq, Eq)]
pub struct ConversionSummary {
    pub input_format: String,
    pub output_format: String,
    pub atoms: usize,
}

pub fn run(args: &ConvertArgs, config_path: Option<&Path>) -> Result<()> {
    let summary = convert(args, config_path)?;
    println!(
        "Converted {} atoms from '{}' ({}) to '{}' ({}).",
        summary.atoms,
        args.input.display(),
        summary.input_format,
        args.output.display(),
        summary.output_format
    );
    Ok(())
}

pub fn convert(args: &ConvertArgs, config_path: Option<&Path>) -> Result<ConversionSummary> {
    let config = FormatConfig::load(config_path, args.from.as_deref(), args.to.as_deref())?;

    let (mut structure, input_format) = io::read_from_path(&args.input, &config.read_format)?;
    info!(
        "Read {} atoms from {:?} as {}.",
        structure.len(),
        args.input,
        input_format
    );

    if let Some(formula) = &args.formula {
        let elements = parse_formula(formula)?;
        structure.assign_elements(&elements)?;
        info!("Applied formula '{}' to {} atoms.", formula, elements.len());
    }

    let output_format = config.write_format.unwrap_or_else(|| input_format.clone());
    io::write_to_path(&structure, &args.output, &output_format)?;

    Ok(ConversionSummary {
        input_format,
        output_format,
        atoms: structure.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    const NACL_XYZ: &str = "2\nrock salt pair\nX 0 0 0\nX 2.82 0 0\n";

    fn setup(input: &str) -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.xyz");
        fs::write(&path, input).unwrap();
        (dir, path)
    }

    fn args(input: PathBuf, output: PathBuf) -> ConvertArgs {
        ConvertArgs {
            input,
            output,
            from: None,
            to: None,
            formula: None,
        }
    }

    #[test]
    fn output_defaults_to_detected_format() {
        let (dir, input) = setup(NACL_XYZ);
        let output = dir.path().join("copy.out");

        let summary = convert(&args(input, output.clone()), None).unwrap();
        assert_eq!(summary.input_format, "xyz");
        assert_eq!(summary.output_format, "xyz");
        assert_eq!(summary.atoms, 2);
        assert!(fs::read_to_string(output).unwrap().starts_with("2\nrock salt pair\n"));
    }

    #[test]
    fn formula_replaces_elements_in_order() {
        let (dir, input) = setup(NACL_XYZ);
        let output = dir.path().join("nacl.stru");
        let mut args = args(input, output.clone());
        args.to = Some("discus".to_string());
        args.formula = Some("NaCl".to_string());

        convert(&args, None).unwrap();
        let (structure, format) = io::read_from_path(&output, "auto").unwrap();
        assert_eq!(format, "discus");
        assert_eq!(structure[0].element(), "Na");
        assert_eq!(structure[1].element(), "Cl");
    }

    #[test]
    fn formula_with_wrong_atom_count_fails_without_output() {
        let (dir, input) = setup(NACL_XYZ);
        let output = dir.path().join("never.xyz");
        let mut args = args(input, output.clone());
        args.formula = Some("Na2Cl2".to_string());

        let err = convert(&args, None).unwrap_err();
        assert!(matches!(err, CliError::Edit(_)));
        assert_eq!(err.to_string(), "Formula has 4 atoms while structure has 2");
        assert!(!output.exists());
    }

    #[test]
    fn config_file_sets_output_format() {
        let (dir, input) = setup(NACL_XYZ);
        let config = dir.path().join("crystio.toml");
        fs::write(&config, "[write]\nformat = \"discus\"\n").unwrap();
        let output = dir.path().join("out.stru");

        let summary = convert(&args(input, output), Some(&config)).unwrap();
        assert_eq!(summary.output_format, "discus");
    }

    #[test]
    fn malformed_input_reports_structure_error() {
        let (dir, input) = setup("3\nshort\nC 0 0 0\n");
        let err = convert(&args(input, dir.path().join("out.xyz")), None).unwrap_err();
        assert!(matches!(err, CliError::Structure(_)));
        assert!(err.to_string().contains("no format matched"));
    }
}
