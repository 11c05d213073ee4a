use rustc_hash::FxHashMap;

use crate::data::standard::sort_definitions;
use crate::data::standard::standard_definitions;
use crate::data::standard::structured_sort_definitions;
use crate::data::visit_sorts;
use crate::data::ContainerKind;
use crate::data::DataFunctionSymbol;
use crate::data::DataSpecification;
use crate::data::SortExpression;
use crate::typecheck::sort_matching::placeholder;

/// The operations that are defined for every sort, which are declared once
/// with a placeholder sort.
const GENERIC_OPERATIONS: [&str; 7] = ["==", "!=", "if", "<", "<=", ">", ">="];

/// Where a function symbol was declared, user declarations take priority
/// over system declarations with the same name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Origin {
    User,
    System,
}

/// The function symbols that an identifier can refer to, grouped by name.
pub(crate) struct Signatures {
    symbols: FxHashMap<String, Vec<(Origin, DataFunctionSymbol)>>,
}

impl Signatures {
    pub fn new(spec: &DataSpecification) -> Signatures {
        let mut signatures = Signatures {
            symbols: FxHashMap::default(),
        };

        for symbol in spec.user_constructors().iter().chain(spec.user_mappings()) {
            signatures.add(Origin::User, symbol.clone());
        }

        // Structured sorts that are named by an alias.
        for (name, definition) in spec.sort_specification().structured_sorts() {
            let definitions = structured_sort_definitions(&name, &definition);
            for symbol in definitions.constructors.into_iter().chain(definitions.mappings) {
                signatures.add(Origin::User, symbol);
            }
        }

        // Structured sorts that occur without a name in declarations.
        let mut anonymous = Vec::new();
        for symbol in spec.user_constructors().iter().chain(spec.user_mappings()) {
            visit_sorts(&symbol.sort(), &mut |sort| {
                if sort.is_structured_sort() && !anonymous.contains(sort) {
                    anonymous.push(sort.clone());
                }
            });
        }
        for sort in anonymous {
            let definitions = structured_sort_definitions(&sort, &sort);
            for symbol in definitions.constructors.into_iter().chain(definitions.mappings) {
                signatures.add(Origin::User, symbol);
            }
        }

        let s = placeholder("S");
        let mut system = standard_definitions();
        for kind in [
            ContainerKind::List,
            ContainerKind::Set,
            ContainerKind::FSet,
            ContainerKind::Bag,
            ContainerKind::FBag,
        ] {
            system.extend(sort_definitions(&SortExpression::container(kind, s.clone())));
        }

        for symbol in system.constructors.into_iter().chain(system.mappings) {
            if !symbol.name().starts_with('@') && !GENERIC_OPERATIONS.contains(&symbol.name()) {
                signatures.add(Origin::System, symbol);
            }
        }

        for symbol in sort_definitions(&s).mappings {
            signatures.add(Origin::System, symbol);
        }

        signatures
    }

    fn add(&mut self, origin: Origin, symbol: DataFunctionSymbol) {
        let entry = self.symbols.entry(symbol.name().to_string()).or_default();
        if !entry.iter().any(|(_, existing)| *existing == symbol) {
            entry.push((origin, symbol));
        }
    }

    /// Returns all function symbols with the given name.
    pub fn symbols(&self, name: &str) -> &[(Origin, DataFunctionSymbol)] {
        self.symbols.get(name).map_or(&[], |symbols| symbols.as_slice())
    }

    /// Returns the function symbols with the given name that take the given
    /// number of arguments.
    pub fn functions(&self, name: &str, arity: usize) -> Vec<(Origin, DataFunctionSymbol)> {
        self.symbols(name)
            .iter()
            .filter(|(_, symbol)| {
                let sort = symbol.sort();
                sort.is_function_sort() && sort.domain().len() == arity
            })
            .cloned()
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_system_signatures() {
        let spec = DataSpecification::new();
        let signatures = Signatures::new(&spec);

        // One polymorphic equality for all sorts.
        assert_eq!(signatures.functions("==", 2).len(), 1);
        assert!(signatures.functions("head", 1)[0].1.sort().to_string().contains("List(@S)"));
        assert!(signatures.functions("+", 2).len() > 4);
        assert!(!signatures.contains("@cNat"));
    }
}
