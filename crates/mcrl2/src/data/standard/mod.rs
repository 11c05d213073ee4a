//!
//! The system defined sorts and their function symbols and equations.
//!
//! Every system sort provides the constructors, mappings and equations that
//! define it, parameterised by the element sort for containers. The builder
//! functions construct applications of the system functions with the correct
//! sorts.
//!

mod bags;
mod booleans;
mod function_update;
mod generic;
mod lists;
mod numbers;
mod sets;
mod structured_sorts;

pub use bags::*;
pub use booleans::*;
pub use function_update::*;
pub use generic::*;
pub use lists::*;
pub use numbers::*;
pub use sets::*;
pub use structured_sorts::*;

use crate::data::free_variables;
use crate::data::ContainerKind;
use crate::data::DataEquation;
use crate::data::DataExpression;
use crate::data::DataFunctionSymbol;
use crate::data::DataVariable;
use crate::data::SortExpression;

/// The constructors, mappings and equations that define one or more sorts.
#[derive(Clone, Debug, Default)]
pub struct SortDefinitions {
    pub constructors: Vec<DataFunctionSymbol>,
    pub mappings: Vec<DataFunctionSymbol>,
    pub equations: Vec<DataEquation>,
}

impl SortDefinitions {
    /// Adds all definitions of other to self.
    pub fn extend(&mut self, other: SortDefinitions) {
        self.constructors.extend(other.constructors);
        self.mappings.extend(other.mappings);
        self.equations.extend(other.equations);
    }
}

/// Returns the names of the sorts that are always part of a data specification.
pub fn standard_sort_names() -> [&'static str; 5] {
    ["Bool", "Pos", "Nat", "Int", "Real"]
}

/// Returns true iff the given sort is Bool, Pos, Nat, Int or Real.
pub fn is_standard_sort(sort: &SortExpression) -> bool {
    sort.is_basic_sort() && standard_sort_names().contains(&sort.name())
}

/// The definitions of Bool, Pos, Nat, Int and Real, which are always imported.
pub fn standard_definitions() -> SortDefinitions {
    let mut result = booleans::boolean_definitions();
    result.extend(numbers::number_definitions());

    for name in standard_sort_names() {
        result.extend(generic::generic_definitions(&SortExpression::basic(name)));
    }

    result
}

/// The definitions for a sort that is not one of the standard sorts, i.e.,
/// a container sort, a function sort or a basic sort declared by the user.
/// Structured sorts are handled by [structured_sort_definitions].
pub fn sort_definitions(sort: &SortExpression) -> SortDefinitions {
    let mut result = SortDefinitions::default();

    if sort.is_container_sort() {
        let element = sort.element_sort();
        match sort.container_kind() {
            ContainerKind::List => result.extend(lists::list_definitions(&element)),
            ContainerKind::FSet => result.extend(sets::fset_definitions(&element)),
            ContainerKind::Set => result.extend(sets::set_definitions(&element)),
            ContainerKind::FBag => result.extend(bags::fbag_definitions(&element)),
            ContainerKind::Bag => result.extend(bags::bag_definitions(&element)),
        }
    } else if sort.is_function_sort() {
        result.extend(function_update::function_update_definitions(sort));
    }

    result.extend(generic::generic_definitions(sort));
    result
}

/// Returns the sorts that the definitions of the given sort depend on, for
/// example `FSet(S)` for `Set(S)`.
pub fn dependent_sorts(sort: &SortExpression) -> Vec<SortExpression> {
    if sort.is_container_sort() {
        let element = sort.element_sort();
        match sort.container_kind() {
            ContainerKind::List | ContainerKind::FSet => vec![element],
            ContainerKind::FBag => vec![element],
            ContainerKind::Set => vec![
                element.clone(),
                fset_sort(&element),
                SortExpression::function(vec![element.clone()], bool_sort()),
            ],
            ContainerKind::Bag => vec![
                element.clone(),
                fbag_sort(&element),
                SortExpression::function(vec![element.clone()], nat_sort()),
            ],
        }
    } else if sort.is_function_sort() {
        let mut result: Vec<SortExpression> = sort.domain().iter().collect();
        result.push(sort.codomain());
        result
    } else {
        Vec::new()
    }
}

/// Creates the function symbol `name: domain -> codomain`.
pub(crate) fn function_symbol(name: &str, domain: &[&SortExpression], codomain: &SortExpression) -> DataFunctionSymbol {
    DataFunctionSymbol::new(
        name,
        SortExpression::function(domain.iter().map(|sort| (*sort).clone()).collect(), codomain.clone()),
    )
}

/// Applies the function symbol with the given name, whose domain is given by
/// the sorts of the arguments, to the arguments.
pub(crate) fn apply(name: &str, arguments: &[&DataExpression], codomain: &SortExpression) -> DataExpression {
    let domain: Vec<SortExpression> = arguments.iter().map(|argument| argument.sort()).collect();
    let symbol = DataFunctionSymbol::new(name, SortExpression::function(domain, codomain.clone()));
    let arguments: Vec<DataExpression> = arguments.iter().map(|argument| (*argument).clone()).collect();
    DataExpression::application(&symbol.into(), &arguments)
}

/// Applies an arbitrary function expression to the arguments.
pub(crate) fn apply_expression(head: &DataExpression, arguments: &[&DataExpression]) -> DataExpression {
    let arguments: Vec<DataExpression> = arguments.iter().map(|argument| (*argument).clone()).collect();
    DataExpression::application(head, &arguments)
}

/// Creates the constant `name: sort`.
pub(crate) fn constant(name: &str, sort: &SortExpression) -> DataExpression {
    DataFunctionSymbol::new(name, sort.clone()).into()
}

pub(crate) fn variable(name: &str, sort: &SortExpression) -> DataExpression {
    DataVariable::new(name, sort.clone()).into()
}

/// Creates the equation `lhs = rhs` over the variables occurring in the left
/// hand side.
pub(crate) fn equation(lhs: DataExpression, rhs: DataExpression) -> DataEquation {
    DataEquation::new(free_variables(&lhs), lhs, rhs)
}

pub(crate) fn conditional_equation(condition: DataExpression, lhs: DataExpression, rhs: DataExpression) -> DataEquation {
    DataEquation::with_condition(free_variables(&lhs), condition, lhs, rhs)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_equations_are_well_sorted() {
        let mut definitions = standard_definitions();
        let element = SortExpression::basic("D");
        for sort in [
            list_sort(&element),
            set_sort(&element),
            bag_sort(&element),
            SortExpression::function(vec![element.clone()], nat_sort()),
        ] {
            definitions.extend(sort_definitions(&sort));
        }

        for equation in &definitions.equations {
            assert_eq!(equation.lhs.sort(), equation.rhs.sort(), "equation {equation} is not well sorted");
            assert_eq!(equation.condition.sort(), bool_sort(), "equation {equation} is not well sorted");

            let variables = free_variables(&equation.rhs);
            for variable in variables {
                assert!(
                    equation.variables.contains(&variable),
                    "variable {variable} of {equation} does not occur in the left hand side"
                );
            }
        }
    }

    #[test]
    fn test_dependent_sorts() {
        let element = SortExpression::basic("D");
        let sorts = dependent_sorts(&set_sort(&element));
        assert!(sorts.contains(&fset_sort(&element)));
    }
}
