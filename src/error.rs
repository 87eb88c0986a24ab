/// Conditions the host should report when generating a diagram.
///
/// Parsing itself never fails; these only describe results a user would want
/// to be told about.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagramError {
    #[error("Please enter schema code")]
    EmptySource,
    #[error("No tables found in schema")]
    NoTables,
}

/// A configuration that could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error("invalid viewport config: {0}")]
    Viewport(&'static str),
}
