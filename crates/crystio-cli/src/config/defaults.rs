/// Built-in values used when neither the command line nor the config file sets one.
pub struct DefaultsConfig {
    pub read_format: String,
    /// `None` writes in whatever format the input was read as.
    pub write_format: Option<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            read_format: "auto".to_string(),
            write_format: None,
        }
    }
}
