use thiserror::Error;

use mcrl2_syntax::ParseError;

/// The errors of the toolset core, every variant carries a single line
/// diagnostic that names the offending construct.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Mcrl2Error {
    #[error("syntax error {0}")]
    SyntaxError(String),

    #[error("sort declaration error: {0}")]
    SortDecl(String),

    #[error("type error: {0}")]
    TypeMismatch(String),

    #[error("ambiguous expression: {0}")]
    Ambiguous(String),

    #[error("scope error: {0}")]
    ScopeError(String),

    #[error("data specification is not well typed: {0}")]
    WellTypedness(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("condition does not rewrite to true or false: {0}")]
    NonBooleanCondition(String),

    #[error("enumeration diverges: {0}")]
    EnumerationDiverges(String),

    #[error("exploration was aborted")]
    Aborted,

    #[error("the maximum number of {0} states was reached")]
    MaxStatesReached(usize),
}

impl From<ParseError> for Mcrl2Error {
    fn from(error: ParseError) -> Self {
        let (line, column) = match error.line_col {
            pest::error::LineColLocation::Pos(position) => position,
            pest::error::LineColLocation::Span(start, _) => start,
        };

        Mcrl2Error::SyntaxError(format!(
            "at line {}, column {}: {}",
            line,
            column,
            error.variant.message()
        ))
    }
}
