use crate::error::Result;
use crystio::core::io::{output_formats, registry::AUTO};

pub fn run() -> Result<()> {
    print!("{}", render_format_list());
    Ok(())
}

/// One line per registered format, in auto-detection order.
pub fn render_format_list() -> String {
    let mut out = String::from("Structure formats (auto-detection order):\n");
    for (idx, name) in output_formats().iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", idx + 1, name));
    }
    out.push_str(&format!(
        "Pass '{}' as the input format to detect it from the file content.\n",
        AUTO
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_builtin_formats_in_priority_order() {
        let list = render_format_list();
        let discus = list.find("1. discus").unwrap();
        let xyz = list.find("2. xyz").unwrap();
        assert!(discus < xyz);
        assert!(list.contains("'auto'"));
    }
}
