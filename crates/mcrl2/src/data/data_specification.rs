use std::cell::OnceCell;
use std::collections::VecDeque;
use std::fmt;

use log::debug;
use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;

use crate::aterm::create_term;
use crate::aterm::ATerm;
use crate::aterm::ATermList;
use crate::aterm::ATermTrait;
use crate::aterm::SymbolTrait;
use crate::data::replace_equation_sorts;
use crate::data::replace_expression_sorts;
use crate::data::standard::dependent_sorts;
use crate::data::standard::is_bool_sort;
use crate::data::standard::is_standard_sort;
use crate::data::standard::sort_definitions;
use crate::data::standard::standard_definitions;
use crate::data::standard::structured_sort_definitions;
use crate::data::standard::SortDefinitions;
use crate::data::visit_expression_sorts;
use crate::data::visit_sorts;
use crate::data::ContainerKind;
use crate::data::DataEquation;
use crate::data::DataExpression;
use crate::data::DataFunctionSymbol;
use crate::data::SortAlias;
use crate::data::SortExpression;
use crate::data::SortSpecification;
use crate::Mcrl2Error;

/// A data specification consisting of the declared sorts, aliases,
/// constructors, mappings and equations.
///
/// Next to the declarations given by the user the specification offers a
/// normalised view in which every sort is in normal form under the aliases
/// and that contains the definitions of all system defined sorts that are
/// reachable from the declarations, for example the equations of `List(D)`
/// when `List(D)` occurs in a mapping. The normalised view is computed on
/// first use and discarded whenever the specification changes.
#[derive(Clone, Default)]
pub struct DataSpecification {
    sort_specification: SortSpecification,
    constructors: Vec<DataFunctionSymbol>,
    mappings: Vec<DataFunctionSymbol>,
    equations: Vec<DataEquation>,

    normalised: OnceCell<NormalisedView>,
}

#[derive(Clone, Default)]
struct NormalisedView {
    sorts: Vec<SortExpression>,
    constructors: Vec<DataFunctionSymbol>,
    mappings: Vec<DataFunctionSymbol>,
    equations: Vec<DataEquation>,
    constructors_by_sort: FxHashMap<SortExpression, Vec<DataFunctionSymbol>>,
}

impl DataSpecification {
    pub fn new() -> DataSpecification {
        DataSpecification::default()
    }

    pub fn add_sort(&mut self, sort: SortExpression) {
        self.sort_specification.add_sort(sort);
        self.invalidate();
    }

    /// Adds the alias `name = reference`, see [SortSpecification::add_alias].
    pub fn add_alias(&mut self, name: SortExpression, reference: SortExpression) -> Result<(), Mcrl2Error> {
        self.sort_specification.add_alias(name, reference)?;
        self.invalidate();
        Ok(())
    }

    /// Ensures that the system definitions of the sort are part of the
    /// normalised view.
    pub fn add_context_sort(&mut self, sort: SortExpression) {
        if !self.sort_specification.context_sorts().contains(&sort) {
            self.sort_specification.add_context_sort(sort);
            self.invalidate();
        }
    }

    pub fn add_constructor(&mut self, constructor: DataFunctionSymbol) {
        if !self.constructors.contains(&constructor) {
            self.constructors.push(constructor);
            self.invalidate();
        }
    }

    pub fn add_mapping(&mut self, mapping: DataFunctionSymbol) {
        if !self.mappings.contains(&mapping) {
            self.mappings.push(mapping);
            self.invalidate();
        }
    }

    pub fn add_equation(&mut self, equation: DataEquation) {
        self.equations.push(equation);
        self.invalidate();
    }

    /// The declared sorts and aliases.
    pub fn sort_specification(&self) -> &SortSpecification {
        &self.sort_specification
    }

    pub fn user_sorts(&self) -> &[SortExpression] {
        self.sort_specification.sorts()
    }

    pub fn aliases(&self) -> &[SortAlias] {
        self.sort_specification.aliases()
    }

    pub fn user_constructors(&self) -> &[DataFunctionSymbol] {
        &self.constructors
    }

    pub fn user_mappings(&self) -> &[DataFunctionSymbol] {
        &self.mappings
    }

    pub fn user_equations(&self) -> &[DataEquation] {
        &self.equations
    }

    /// All sorts of the normalised view, including the system sorts.
    pub fn sorts(&self) -> &[SortExpression] {
        &self.view().sorts
    }

    /// All constructors of the normalised view.
    pub fn constructors(&self) -> &[DataFunctionSymbol] {
        &self.view().constructors
    }

    /// All mappings of the normalised view.
    pub fn mappings(&self) -> &[DataFunctionSymbol] {
        &self.view().mappings
    }

    /// All equations of the normalised view.
    pub fn equations(&self) -> &[DataEquation] {
        &self.view().equations
    }

    /// Returns the constructors whose target sort is the given sort, which is
    /// normalised first.
    pub fn constructors_of(&self, sort: &SortExpression) -> &[DataFunctionSymbol] {
        let sort = self.normalise_sorts(sort);
        self.view()
            .constructors_by_sort
            .get(&sort)
            .map_or(&[], |constructors| constructors.as_slice())
    }

    /// Returns true iff the sort has constructors.
    pub fn is_constructor_sort(&self, sort: &SortExpression) -> bool {
        !self.constructors_of(sort).is_empty()
    }

    /// Returns the normal form of the sort under the aliases.
    pub fn normalise_sorts(&self, sort: &SortExpression) -> SortExpression {
        self.sort_specification.normalise(sort)
    }

    /// Replaces every sort in the expression by its normal form.
    pub fn normalise_expression_sorts(&self, expression: &DataExpression) -> DataExpression {
        replace_expression_sorts(expression, &mut |sort| self.sort_specification.normalise(sort))
    }

    /// Replaces every sort in the equation by its normal form.
    pub fn normalise_equation_sorts(&self, equation: &DataEquation) -> DataEquation {
        replace_equation_sorts(equation, &mut |sort| self.sort_specification.normalise(sort))
    }

    /// Returns true if the sort is known to have finitely many elements. A
    /// sort is certainly finite when it is Bool, a function sort or finite set
    /// over finite sorts, or a sort whose constructors are not recursive and
    /// only take arguments of finite sorts.
    pub fn is_certainly_finite(&self, sort: &SortExpression) -> bool {
        let sort = self.normalise_sorts(sort);
        self.is_finite(&sort, &mut Vec::new())
    }

    /// Checks that the sorts used by constructors and mappings are declared,
    /// that system sorts have no user defined constructors and that every
    /// sort with constructors can be inhabited.
    pub fn check_well_typed(&self) -> Result<(), Mcrl2Error> {
        for symbol in self.constructors.iter().chain(self.mappings.iter()) {
            let mut undeclared = None;
            visit_sorts(&symbol.sort(), &mut |sort| {
                if undeclared.is_none() && sort.is_basic_sort() && !self.sort_specification.is_declared(sort) {
                    undeclared = Some(sort.clone());
                }
            });

            if let Some(sort) = undeclared {
                return Err(Mcrl2Error::WellTypedness(format!(
                    "the sort {sort} of function symbol {}: {} is not declared",
                    symbol.name(),
                    symbol.sort()
                )));
            }
        }

        for alias in self.sort_specification.aliases() {
            if let Err(Mcrl2Error::SortDecl(message)) = self.sort_specification.check_declared(&alias.reference) {
                return Err(Mcrl2Error::WellTypedness(format!("in the alias {alias}: {message}")));
            }
        }

        for constructor in &self.constructors {
            let target = self.normalise_sorts(&constructor.sort().target_sort());
            if is_standard_sort(&target) || target.is_function_sort() {
                return Err(Mcrl2Error::WellTypedness(format!(
                    "the constructor {}: {} constructs elements of the system sort {target}",
                    constructor.name(),
                    constructor.sort()
                )));
            }
        }

        if let Some(sort) = self.find_empty_sort() {
            return Err(Mcrl2Error::WellTypedness(format!(
                "the sort {sort} is empty, every constructor requires an element of an empty sort"
            )));
        }

        Ok(())
    }

    /// Returns the first sort with constructors such that no constructor
    /// can be applied to inhabited sorts.
    fn find_empty_sort(&self) -> Option<SortExpression> {
        let view = self.view();
        let mut inhabited: FxHashSet<SortExpression> = FxHashSet::default();

        let is_inhabited = |sort: &SortExpression, inhabited: &FxHashSet<SortExpression>| {
            !view.constructors_by_sort.contains_key(sort) || inhabited.contains(sort)
        };

        loop {
            let mut changed = false;
            for (sort, constructors) in &view.constructors_by_sort {
                if inhabited.contains(sort) {
                    continue;
                }

                let applicable = constructors.iter().any(|constructor| {
                    let sort = constructor.sort();
                    !sort.is_function_sort()
                        || sort
                            .domain()
                            .iter()
                            .all(|argument| is_inhabited(&argument.target_sort(), &inhabited))
                });

                if applicable {
                    inhabited.insert(sort.clone());
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        view.sorts
            .iter()
            .find(|sort| view.constructors_by_sort.contains_key(*sort) && !inhabited.contains(*sort))
            .cloned()
    }

    fn is_finite(&self, sort: &SortExpression, visiting: &mut Vec<SortExpression>) -> bool {
        if is_bool_sort(sort) {
            return true;
        }

        if visiting.contains(sort) {
            return false;
        }

        if sort.is_function_sort() {
            return sort.domain().iter().all(|domain| self.is_finite(&domain, visiting))
                && self.is_finite(&sort.codomain(), visiting);
        }

        if sort.is_container_sort() {
            return match sort.container_kind() {
                ContainerKind::Set | ContainerKind::FSet => self.is_finite(&sort.element_sort(), visiting),
                ContainerKind::List | ContainerKind::Bag | ContainerKind::FBag => false,
            };
        }

        let constructors = self.view().constructors_by_sort.get(sort);
        let Some(constructors) = constructors else {
            return false;
        };

        visiting.push(sort.clone());
        let result = constructors.iter().all(|constructor| {
            let sort = constructor.sort();
            !sort.is_function_sort() || sort.domain().iter().all(|argument| self.is_finite(&argument, visiting))
        });
        visiting.pop();

        result
    }

    fn invalidate(&mut self) {
        self.normalised = OnceCell::new();
    }

    fn view(&self) -> &NormalisedView {
        self.normalised.get_or_init(|| self.compute_view())
    }

    /// Computes the sorts that are reachable from the declarations and imports
    /// the definitions of all of them.
    fn compute_view(&self) -> NormalisedView {
        let structured: FxHashMap<SortExpression, SortExpression> =
            self.sort_specification.structured_sorts().into_iter().collect();

        // The seeds of the closure, in a deterministic order.
        let mut seeds: Vec<SortExpression> = self.sort_specification.normalised_basic_sorts();
        seeds.extend(
            self.sort_specification
                .aliases()
                .iter()
                .map(|alias| self.normalise_sorts(&alias.reference)),
        );
        for symbol in self.constructors.iter().chain(self.mappings.iter()) {
            seeds.push(self.normalise_sorts(&symbol.sort()));
        }
        for equation in &self.equations {
            let equation = self.normalise_equation_sorts(equation);
            for expression in [&equation.condition, &equation.lhs, &equation.rhs] {
                visit_expression_sorts(expression, &mut |sort| seeds.push(sort.clone()));
            }
        }
        seeds.extend(
            self.sort_specification
                .context_sorts()
                .iter()
                .map(|sort| self.normalise_sorts(sort)),
        );

        let mut sorts: Vec<SortExpression> = Vec::new();
        let mut seen: FxHashSet<SortExpression> = FxHashSet::default();
        let mut queue: VecDeque<SortExpression> = seeds.into_iter().collect();

        while let Some(sort) = queue.pop_front() {
            if sort.is_untyped() || sort.is_possible_sorts() || !seen.insert(sort.clone()) {
                continue;
            }

            let mut reachable = Vec::new();
            visit_sorts(&sort, &mut |subsort| {
                if *subsort != sort {
                    reachable.push(subsort.clone());
                }
            });
            reachable.extend(dependent_sorts(&sort));
            if let Some(definition) = structured.get(&sort) {
                for constructor in definition.constructors().iter() {
                    for argument in constructor.arguments().iter() {
                        reachable.push(argument.sort());
                    }
                }
            }

            queue.extend(reachable);
            sorts.push(sort);
        }

        let mut definitions = standard_definitions();
        for sort in &sorts {
            if is_standard_sort(sort) {
                continue;
            }

            if let Some(definition) = structured.get(sort) {
                definitions.extend(structured_sort_definitions(sort, definition));
            } else if sort.is_structured_sort() {
                definitions.extend(structured_sort_definitions(sort, sort));
            }
            definitions.extend(sort_definitions(sort));
        }

        definitions.constructors.extend(self.constructors.iter().map(|constructor| {
            DataFunctionSymbol::new(constructor.name(), self.normalise_sorts(&constructor.sort()))
        }));
        definitions.mappings.extend(
            self.mappings
                .iter()
                .map(|mapping| DataFunctionSymbol::new(mapping.name(), self.normalise_sorts(&mapping.sort()))),
        );
        definitions
            .equations
            .extend(self.equations.iter().map(|equation| self.normalise_equation_sorts(equation)));

        let SortDefinitions {
            constructors,
            mappings,
            equations,
        } = definitions;

        let constructors = deduplicate(constructors);
        let mut constructors_by_sort: FxHashMap<SortExpression, Vec<DataFunctionSymbol>> = FxHashMap::default();
        for constructor in &constructors {
            constructors_by_sort
                .entry(constructor.sort().target_sort())
                .or_default()
                .push(constructor.clone());
        }

        let view = NormalisedView {
            sorts,
            constructors,
            mappings: deduplicate(mappings),
            equations: deduplicate(equations),
            constructors_by_sort,
        };

        debug!(
            "Normalised data specification has {} sorts, {} constructors, {} mappings and {} equations",
            view.sorts.len(),
            view.constructors.len(),
            view.mappings.len(),
            view.equations.len()
        );
        view
    }
}

/// Removes duplicates while preserving the order of first occurrence.
fn deduplicate<T: Clone + Eq + std::hash::Hash>(elements: Vec<T>) -> Vec<T> {
    let mut seen = FxHashSet::default();
    elements.into_iter().filter(|element| seen.insert(element.clone())).collect()
}

impl From<&DataSpecification> for ATerm {
    fn from(spec: &DataSpecification) -> Self {
        let sorts: ATermList<SortExpression> = ATermList::new(spec.user_sorts().to_vec());
        let aliases: Vec<ATerm> = spec
            .aliases()
            .iter()
            .map(|alias| create_term("SortRef", &[alias.name.clone().into(), alias.reference.clone().into()]))
            .collect();
        let constructors: ATermList<DataFunctionSymbol> = ATermList::new(spec.constructors.clone());
        let mappings: ATermList<DataFunctionSymbol> = ATermList::new(spec.mappings.clone());
        let equations: Vec<ATerm> = spec.equations.iter().map(ATerm::from).collect();
        let context: ATermList<SortExpression> =
            ATermList::new(spec.sort_specification.context_sorts().to_vec());

        create_term(
            "DataSpec",
            &[
                sorts.into(),
                ATermList::<ATerm>::new(aliases).into(),
                constructors.into(),
                mappings.into(),
                ATermList::<ATerm>::new(equations).into(),
                context.into(),
            ],
        )
    }
}

impl TryFrom<ATerm> for DataSpecification {
    type Error = Mcrl2Error;

    fn try_from(term: ATerm) -> Result<Self, Self::Error> {
        if term.get_head_symbol().name() != "DataSpec" || term.get_head_symbol().arity() != 6 {
            return Err(Mcrl2Error::SyntaxError(format!("{term} is not a data specification")));
        }

        let mut spec = DataSpecification::new();
        let sorts: ATermList<SortExpression> = term.arg(0).into();
        for sort in sorts.iter() {
            spec.add_sort(sort);
        }

        let aliases: ATermList<ATerm> = term.arg(1).into();
        for alias in aliases.iter() {
            spec.add_alias(alias.arg(0).protect().into(), alias.arg(1).protect().into())?;
        }

        let constructors: ATermList<DataFunctionSymbol> = term.arg(2).into();
        for constructor in constructors.iter() {
            spec.add_constructor(constructor);
        }

        let mappings: ATermList<DataFunctionSymbol> = term.arg(3).into();
        for mapping in mappings.iter() {
            spec.add_mapping(mapping);
        }

        let equations: ATermList<ATerm> = term.arg(4).into();
        for equation in equations.iter() {
            spec.add_equation(equation.into());
        }

        let context: ATermList<SortExpression> = term.arg(5).into();
        for sort in context.iter() {
            spec.add_context_sort(sort);
        }

        Ok(spec)
    }
}

impl fmt::Display for DataSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.user_sorts().is_empty() || !self.aliases().is_empty() {
            write!(f, "sort ")?;
            let mut first = true;
            for sort in self.user_sorts() {
                if !first {
                    write!(f, "     ")?;
                }
                writeln!(f, "{sort};")?;
                first = false;
            }
            for alias in self.aliases() {
                if !first {
                    write!(f, "     ")?;
                }
                writeln!(f, "{alias};")?;
                first = false;
            }
            writeln!(f)?;
        }

        for (keyword, symbols) in [("cons", &self.constructors), ("map", &self.mappings)] {
            if symbols.is_empty() {
                continue;
            }

            for (index, symbol) in symbols.iter().enumerate() {
                let prefix = if index == 0 { keyword } else { "" };
                writeln!(f, "{prefix:<5}{}: {};", symbol.name(), symbol.sort())?;
            }
            writeln!(f)?;
        }

        for equation in &self.equations {
            if !equation.variables.is_empty() {
                write!(f, "var  ")?;
                for (index, variable) in equation.variables.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", variable.name(), variable.sort())?;
                }
                writeln!(f, ";")?;
            }
            writeln!(f, "eqn  {equation};")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::data::standard::bool_sort;
    use crate::data::standard::list_sort;
    use crate::data::standard::nat_sort;
    use crate::data::standard::set_sort;
    use crate::data::StructuredSortArgument;
    use crate::data::StructuredSortConstructor;

    fn enumeration(names: &[&str]) -> SortExpression {
        SortExpression::structured(names.iter().map(|name| StructuredSortConstructor::new(name, vec![], None)).collect())
    }

    #[test]
    fn test_system_sorts_are_imported() {
        let mut spec = DataSpecification::new();
        let d = SortExpression::basic("D");
        spec.add_alias(d.clone(), enumeration(&["d1", "d2"])).unwrap();
        spec.add_mapping(DataFunctionSymbol::new(
            "f",
            SortExpression::function(vec![list_sort(&d)], bool_sort()),
        ));

        assert!(spec.sorts().contains(&list_sort(&d)));
        assert_eq!(spec.constructors_of(&d).len(), 2);
        assert_eq!(spec.constructors_of(&list_sort(&d)).len(), 2);
        assert!(spec.mappings().iter().any(|mapping| mapping.name() == "#"));
        assert!(spec.check_well_typed().is_ok());
    }

    #[test]
    fn test_view_is_recomputed() {
        let mut spec = DataSpecification::new();
        assert!(!spec.sorts().contains(&set_sort(&nat_sort())));

        spec.add_context_sort(set_sort(&nat_sort()));
        assert!(spec.sorts().contains(&set_sort(&nat_sort())));
        assert!(spec.is_constructor_sort(&set_sort(&nat_sort())));
    }

    #[test]
    fn test_is_certainly_finite() {
        let mut spec = DataSpecification::new();
        let d = SortExpression::basic("D");
        let t = SortExpression::basic("T");
        spec.add_alias(d.clone(), enumeration(&["d1", "d2"])).unwrap();
        spec.add_alias(
            t.clone(),
            SortExpression::structured(vec![
                StructuredSortConstructor::new("leaf", vec![], None),
                StructuredSortConstructor::new("node", vec![StructuredSortArgument::new(None, t.clone())], None),
            ]),
        )
        .unwrap();

        assert!(spec.is_certainly_finite(&bool_sort()));
        assert!(spec.is_certainly_finite(&d));
        assert!(spec.is_certainly_finite(&SortExpression::function(vec![d.clone()], bool_sort())));
        assert!(spec.is_certainly_finite(&set_sort(&d)));
        assert!(!spec.is_certainly_finite(&t));
        assert!(!spec.is_certainly_finite(&nat_sort()));
        assert!(!spec.is_certainly_finite(&list_sort(&d)));
    }

    #[test]
    fn test_undeclared_sort() {
        let mut spec = DataSpecification::new();
        spec.add_mapping(DataFunctionSymbol::new("f", SortExpression::basic("E")));
        assert!(matches!(spec.check_well_typed(), Err(Mcrl2Error::WellTypedness(_))));
    }

    #[test]
    fn test_empty_sort() {
        let mut spec = DataSpecification::new();
        let d = SortExpression::basic("D");
        spec.add_sort(d.clone());
        spec.add_constructor(DataFunctionSymbol::new("c", SortExpression::function(vec![d.clone()], d)));
        assert!(matches!(spec.check_well_typed(), Err(Mcrl2Error::WellTypedness(_))));
    }

    #[test]
    fn test_constant_constructors() {
        let mut spec = DataSpecification::new();
        let d = SortExpression::basic("D");
        let e = SortExpression::basic("E");
        spec.add_sort(d.clone());
        spec.add_sort(e.clone());
        spec.add_constructor(DataFunctionSymbol::new("red", d.clone()));
        spec.add_constructor(DataFunctionSymbol::new("green", d.clone()));
        spec.add_constructor(DataFunctionSymbol::new("zero", e.clone()));
        spec.add_constructor(DataFunctionSymbol::new("succ", SortExpression::function(vec![e.clone()], e.clone())));

        assert!(spec.check_well_typed().is_ok());
        assert!(spec.is_certainly_finite(&d));
        assert!(!spec.is_certainly_finite(&e));
    }

    #[test]
    fn test_term_conversion() {
        let mut spec = DataSpecification::new();
        spec.add_sort(SortExpression::basic("E"));
        spec.add_alias(SortExpression::basic("D"), enumeration(&["d1", "d2"])).unwrap();

        let term: ATerm = (&spec).into();
        let converted = DataSpecification::try_from(term).unwrap();
        assert_eq!(converted.aliases(), spec.aliases());
        assert_eq!(converted.user_sorts(), spec.user_sorts());
    }
}
