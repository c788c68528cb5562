use crate::cli::InfoArgs;
use crate::config::FormatConfig;
use crate::error::Result;
use crystio::core::io;
use crystio::core::models::structure::{ShapeEnvelope, Structure};
use std::path::Path;

pub fn run(args: &InfoArgs, config_path: Option<&Path>) -> Result<()> {
    let config = FormatConfig::load(config_path, args.from.as_deref(), None)?;
    let (structure, format) = io::read_from_path(&args.input, &config.read_format)?;
    print!("{}", render_summary(&structure, &format));
    Ok(())
}

/// Formats a human-readable description of a structure.
pub fn render_summary(structure: &Structure, format: &str) -> String {
    let p = structure.lattice.parameters();
    let composition: Vec<String> = structure
        .composition()
        .into_iter()
        .map(|(element, count)| format!("{}{}", element, count))
        .collect();

    let mut lines = vec![
        format!("Format:      {}", format),
        format!("Title:       {}", structure.title),
        format!(
            "Lattice:     a={:.6} b={:.6} c={:.6} alpha={:.4} beta={:.4} gamma={:.4}",
            p.a, p.b, p.c, p.alpha, p.beta, p.gamma
        ),
        format!("Volume:      {:.6}", structure.lattice.volume()),
        format!("Atoms:       {}", structure.len()),
        format!("Composition: {}", composition.join(" ")),
    ];

    let anisotropic = structure.iter().filter(|a| a.anisotropy()).count();
    if anisotropic > 0 {
        lines.push(format!("Anisotropic: {}", anisotropic));
    }

    if let Some(pdffit) = structure.pdffit() {
        let [n1, n2, n3, ncatoms] = pdffit.ncell;
        lines.push(format!("Space group: {}", pdffit.spcgr));
        lines.push(format!("Cell count:  {},{},{},{}", n1, n2, n3, ncatoms));
        match pdffit.active_shape() {
            Some(ShapeEnvelope::Sphere { diameter }) => {
                lines.push(format!("Shape:       sphere, diameter {}", diameter));
            }
            Some(ShapeEnvelope::Stepcut { cutoff }) => {
                lines.push(format!("Shape:       stepcut, cutoff {}", cutoff));
            }
            None => {}
        }
        if !pdffit.ignored_lines.is_empty() {
            lines.push(format!(
                "Ignored:     {} header line(s)",
                pdffit.ignored_lines.len()
            ));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
