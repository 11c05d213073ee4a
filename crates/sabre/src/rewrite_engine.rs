use std::fmt;
use std::str::FromStr;

use log::info;

use mcrl2::data::DataExpression;
use mcrl2::data::DataSpecification;
use mcrl2::data::DataSubstitution;
use mcrl2::Mcrl2Error;

use crate::JittyCompilingRewriter;
use crate::JittyRewriter;
use crate::RewriteSpecification;
use crate::UsedEquationSelector;

/// Counts the work performed by a rewriter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewritingStatistics {
    /// The number of rules that have been applied.
    pub rewrite_steps: usize,

    /// The number of times a rule has been tried.
    pub symbol_comparisons: usize,
}

impl fmt::Display for RewritingStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rewrite steps, {} rule attempts",
            self.rewrite_steps, self.symbol_comparisons
        )
    }
}

/// A rewriter computes the normal form of a data expression with respect to
/// the equations of a data specification.
pub trait RewriteEngine {
    /// Rewrites the given term to normal form.
    fn rewrite(&mut self, term: &DataExpression) -> DataExpression {
        self.rewrite_with(term, &DataSubstitution::default())
    }

    /// Rewrites the term in which the free variables are replaced by the
    /// substitution. The values of the substitution must be in normal form.
    fn rewrite_with(&mut self, term: &DataExpression, sigma: &DataSubstitution) -> DataExpression;

    /// The data specification whose equations are used.
    fn data_specification(&self) -> &DataSpecification;

    fn statistics(&self) -> &RewritingStatistics;
}

/// The available rewrite strategies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RewriteStrategy {
    #[default]
    Jitty,
    JittyCompiling,
}

impl FromStr for RewriteStrategy {
    type Err = Mcrl2Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jitty" => Ok(RewriteStrategy::Jitty),
            "jitty-compiling" | "jittyc" => Ok(RewriteStrategy::JittyCompiling),
            _ => Err(Mcrl2Error::Unsupported(format!("unknown rewrite strategy {s}"))),
        }
    }
}

impl fmt::Display for RewriteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteStrategy::Jitty => write!(f, "jitty"),
            RewriteStrategy::JittyCompiling => write!(f, "jitty-compiling"),
        }
    }
}

/// Creates a rewriter for the equations of the data specification that are
/// kept by the selector.
pub fn create_rewriter(
    spec: &DataSpecification,
    strategy: RewriteStrategy,
    selector: &UsedEquationSelector,
) -> Box<dyn RewriteEngine> {
    let rewrite_spec = RewriteSpecification::with_selector(spec, selector);
    info!(
        "Using the {strategy} rewriter with {} rewrite rules",
        rewrite_spec.rewrite_rules.len()
    );

    match strategy {
        RewriteStrategy::Jitty => Box::new(JittyRewriter::new(spec, &rewrite_spec)),
        RewriteStrategy::JittyCompiling => Box::new(JittyCompilingRewriter::new(spec, &rewrite_spec)),
    }
}
