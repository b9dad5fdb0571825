use thiserror::Error;

/// Errors surfaced by the selector parser, the style engine and the CSS compiler.
///
/// None of these are recovered locally; they reach the caller through `?`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The selector text could not be parsed.
    #[error("invalid selector at byte {position}: {message}")]
    Selector { message: String, position: usize },

    /// The CSS compiler rejected the rebuilt template source.
    #[error("css compile error: {0}")]
    Compile(String),

    /// A template call whose fragments don't surround its interpolations.
    #[error("template has {fragments} fragments but {interpolations} interpolations")]
    TemplateArity {
        fragments: usize,
        interpolations: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
