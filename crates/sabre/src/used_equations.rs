use log::debug;
use rustc_hash::FxHashSet;

use mcrl2::data::collect_function_symbols;
use mcrl2::data::standard::and;
use mcrl2::data::standard::false_;
use mcrl2::data::standard::not;
use mcrl2::data::standard::or;
use mcrl2::data::standard::true_;
use mcrl2::data::DataEquation;
use mcrl2::data::DataFunctionSymbol;
use mcrl2::data::DataSpecification;

/// Selects the equations that can be used to rewrite terms over a given set
/// of function symbols, these are the equations whose left-hand side has a
/// head symbol that is reachable from the given symbols.
///
/// The system defined sorts come with many equations that are not needed by a
/// specific model, pruning them keeps the rewriter small.
#[derive(Clone, Debug, Default)]
pub struct UsedEquationSelector {
    /// None when all equations are used.
    symbols: Option<FxHashSet<DataFunctionSymbol>>,
}

impl UsedEquationSelector {
    /// Uses every equation.
    pub fn all() -> UsedEquationSelector {
        UsedEquationSelector { symbols: None }
    }

    /// Keeps the equations that are reachable from the given symbols.
    pub fn new(spec: &DataSpecification, symbols: impl IntoIterator<Item = DataFunctionSymbol>) -> UsedEquationSelector {
        let mut used: FxHashSet<DataFunctionSymbol> = symbols.into_iter().collect();

        // The boolean operators are used by the rewriter itself.
        let x = true_();
        for expression in [true_(), false_(), not(&x), and(&x, &x), or(&x, &x)] {
            collect_function_symbols(&expression, &mut used);
        }

        // Compute the fixpoint of the symbols occurring in the used equations.
        let mut remaining: Vec<&DataEquation> = spec.equations().iter().collect();
        loop {
            let (selected, rest): (Vec<&DataEquation>, Vec<&DataEquation>) = remaining
                .into_iter()
                .partition(|equation| equation.lhs.head_symbol().is_some_and(|symbol| used.contains(&symbol)));

            remaining = rest;
            if selected.is_empty() {
                break;
            }

            for equation in selected {
                collect_function_symbols(&equation.lhs, &mut used);
                collect_function_symbols(&equation.rhs, &mut used);
                collect_function_symbols(&equation.condition, &mut used);
            }
        }

        debug!(
            "Selected {} of {} equations",
            spec.equations().len() - remaining.len(),
            spec.equations().len()
        );
        UsedEquationSelector { symbols: Some(used) }
    }

    /// Returns true iff the equation is selected.
    pub fn is_used(&self, equation: &DataEquation) -> bool {
        match &self.symbols {
            None => true,
            Some(symbols) => equation
                .lhs
                .head_symbol()
                .is_some_and(|symbol| symbols.contains(&symbol)),
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use mcrl2::data::standard::nat_sort;
    use mcrl2::data::DataFunctionSymbol;
    use mcrl2::data::SortExpression;
    use mcrl2::typecheck::typecheck_data_specification;
    use mcrl2::typecheck::TypeCheckOptions;
    use mcrl2_syntax::parse_specification;
    use test_log::test;

    use super::*;

    #[test]
    fn test_prunes_unreachable_equations() {
        let spec = typecheck_data_specification(
            &parse_specification(indoc! {"
                map f, g: Nat -> Nat;
                var n: Nat;
                eqn f(n) = n;
                    g(n) = f(n);
            "})
            .unwrap()
            .data_specification,
            &TypeCheckOptions::default(),
        )
        .unwrap();

        let sort = SortExpression::function(vec![nat_sort()], nat_sort());
        let f = DataFunctionSymbol::new("f", sort.clone());
        let g = DataFunctionSymbol::new("g", sort);

        let selector = UsedEquationSelector::new(&spec, [f.clone()]);
        let used: Vec<&DataEquation> = spec.equations().iter().filter(|eq| selector.is_used(eq)).collect();
        assert!(used.iter().any(|eq| eq.lhs.head_symbol() == Some(f.clone())));
        assert!(!used.iter().any(|eq| eq.lhs.head_symbol() == Some(g.clone())));
        assert!(used.len() < spec.equations().len());

        let selector = UsedEquationSelector::new(&spec, [g.clone()]);
        assert!(spec
            .equations()
            .iter()
            .filter(|eq| eq.lhs.head_symbol() == Some(f.clone()))
            .all(|eq| selector.is_used(eq)));
    }
}
