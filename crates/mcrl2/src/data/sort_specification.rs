use std::cell::OnceCell;
use std::fmt;

use log::trace;
use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;

use crate::data::replace_sorts;
use crate::data::standard::is_standard_sort;
use crate::data::standard::standard_sort_names;
use crate::data::visit_sorts;
use crate::data::SortExpression;
use crate::data::StructuredSortArgument;
use crate::data::StructuredSortConstructor;
use crate::Mcrl2Error;

/// The alias `name = reference` of a sort declaration `sort name = reference;`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SortAlias {
    pub name: SortExpression,
    pub reference: SortExpression,
}

impl fmt::Display for SortAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.reference)
    }
}

/// The declared sorts and aliases of a data specification.
///
/// Aliases are turned into a confluent and terminating rewrite system on sort
/// expressions that maps every sort onto its unique normal form. An alias
/// `A = struct ...` is oriented from the structured sort to its name, all
/// other aliases from the name to the reference. Whenever two rules have the
/// same left hand side the right hand sides are identified, oriented from the
/// larger to the smaller printed form.
#[derive(Clone, Default)]
pub struct SortSpecification {
    sorts: Vec<SortExpression>,
    aliases: Vec<SortAlias>,
    context_sorts: Vec<SortExpression>,

    /// The completed alias rules, computed lazily.
    normaliser: OnceCell<FxHashMap<SortExpression, SortExpression>>,
}

impl SortSpecification {
    pub fn new() -> SortSpecification {
        SortSpecification::default()
    }

    /// Declares a basic sort, declaring it twice has no effect.
    pub fn add_sort(&mut self, sort: SortExpression) {
        debug_assert!(sort.is_basic_sort(), "Only basic sorts can be declared, got {sort}");
        if !self.sorts.contains(&sort) {
            self.sorts.push(sort);
            self.normaliser = OnceCell::new();
        }
    }

    /// Adds the alias `name = reference`.
    ///
    /// Fails with [Mcrl2Error::SortDecl] when the name is declared twice or when
    /// the alias is cyclic without passing through a structured sort.
    pub fn add_alias(&mut self, name: SortExpression, reference: SortExpression) -> Result<(), Mcrl2Error> {
        if !name.is_basic_sort() {
            return Err(Mcrl2Error::SortDecl(format!("the alias {name} is not a basic sort")));
        }

        if is_standard_sort(&name) {
            return Err(Mcrl2Error::SortDecl(format!("the standard sort {name} cannot be redefined")));
        }

        if self.aliases.iter().any(|alias| alias.name == name) {
            return Err(Mcrl2Error::SortDecl(format!("the sort {name} is defined twice")));
        }

        self.aliases.push(SortAlias { name, reference });
        if let Some(alias) = self.find_cycle().cloned() {
            self.aliases.pop();
            return Err(Mcrl2Error::SortDecl(format!("the sort alias {alias} is cyclic")));
        }

        self.normaliser = OnceCell::new();
        Ok(())
    }

    /// Adds a sort that is used in the context of the specification, for
    /// example in a process parameter, so that its system definitions are
    /// imported.
    pub fn add_context_sort(&mut self, sort: SortExpression) {
        if !self.context_sorts.contains(&sort) {
            self.context_sorts.push(sort);
        }
    }

    pub fn sorts(&self) -> &[SortExpression] {
        &self.sorts
    }

    pub fn aliases(&self) -> &[SortAlias] {
        &self.aliases
    }

    pub fn context_sorts(&self) -> &[SortExpression] {
        &self.context_sorts
    }

    /// Returns true iff the basic sort is a standard sort, a declared sort or
    /// the name of an alias.
    pub fn is_declared(&self, sort: &SortExpression) -> bool {
        is_standard_sort(sort) || self.sorts.contains(sort) || self.aliases.iter().any(|alias| alias.name == *sort)
    }

    /// Returns the alias with the given name.
    pub fn alias(&self, name: &SortExpression) -> Option<&SortAlias> {
        self.aliases.iter().find(|alias| alias.name == *name)
    }

    /// Checks that every basic sort occurring in the sort is declared.
    pub fn check_declared(&self, sort: &SortExpression) -> Result<(), Mcrl2Error> {
        let mut undeclared = None;
        visit_sorts(sort, &mut |sort| {
            if undeclared.is_none() && sort.is_basic_sort() && !self.is_declared(sort) {
                undeclared = Some(sort.clone());
            }
        });

        match undeclared {
            Some(sort) => Err(Mcrl2Error::SortDecl(format!("the sort {sort} is not declared"))),
            None => Ok(()),
        }
    }

    /// Returns the unique normal form of the sort under the aliases, such that
    /// two sorts are equal iff their normal forms are syntactically equal.
    pub fn normalise(&self, sort: &SortExpression) -> SortExpression {
        normalise_with(self.rules(), sort)
    }

    /// Returns the normalised structured sorts that are named by a basic sort,
    /// together with that sort.
    pub fn structured_sorts(&self) -> Vec<(SortExpression, SortExpression)> {
        let mut result: Vec<(SortExpression, SortExpression)> = self
            .rules()
            .iter()
            .filter(|(lhs, rhs)| lhs.is_structured_sort() && rhs.is_basic_sort())
            .map(|(lhs, rhs)| (rhs.clone(), lhs.clone()))
            .collect();

        result.sort_by_key(|(name, _)| name.to_string());
        result
    }

    /// Returns the basic sorts whose normal form is themselves, in order of
    /// declaration. These are the declared sorts and the names of structured
    /// sorts.
    pub fn normalised_basic_sorts(&self) -> Vec<SortExpression> {
        let mut result = Vec::new();
        let mut seen = FxHashSet::default();

        for name in standard_sort_names() {
            let sort = SortExpression::basic(name);
            if seen.insert(sort.clone()) {
                result.push(sort);
            }
        }

        for sort in self.sorts.iter().chain(self.aliases.iter().map(|alias| &alias.name)) {
            let normal_form = self.normalise(sort);
            if normal_form.is_basic_sort() && seen.insert(normal_form.clone()) {
                result.push(normal_form);
            }
        }

        result
    }

    /// The completed rewrite rules, computed on first use.
    fn rules(&self) -> &FxHashMap<SortExpression, SortExpression> {
        self.normaliser.get_or_init(|| complete(&self.aliases))
    }

    /// Returns an alias that can reach itself without passing through a
    /// structured sort.
    fn find_cycle(&self) -> Option<&SortAlias> {
        let references: FxHashMap<&SortExpression, &SortExpression> =
            self.aliases.iter().map(|alias| (&alias.name, &alias.reference)).collect();

        self.aliases.iter().find(|alias| {
            let mut visited = FxHashSet::default();
            let mut stack = vec![alias.reference.clone()];
            while let Some(sort) = stack.pop() {
                for name in unstructured_basic_sorts(&sort) {
                    if name == alias.name {
                        return true;
                    }

                    if visited.insert(name.clone()) {
                        if let Some(reference) = references.get(&name) {
                            stack.push((*reference).clone());
                        }
                    }
                }
            }
            false
        })
    }
}

/// Returns the basic sorts in the sort that do not occur inside a structured sort.
fn unstructured_basic_sorts(sort: &SortExpression) -> Vec<SortExpression> {
    if sort.is_basic_sort() {
        vec![sort.clone()]
    } else if sort.is_function_sort() {
        let mut result: Vec<SortExpression> = sort.domain().iter().flat_map(|s| unstructured_basic_sorts(&s)).collect();
        result.extend(unstructured_basic_sorts(&sort.codomain()));
        result
    } else if sort.is_container_sort() {
        unstructured_basic_sorts(&sort.element_sort())
    } else {
        Vec::new()
    }
}

/// Rewrites the sort to normal form bottom up.
fn normalise_with(rules: &FxHashMap<SortExpression, SortExpression>, sort: &SortExpression) -> SortExpression {
    replace_sorts(sort, &mut |sort| {
        let mut result = sort.clone();
        while let Some(rhs) = rules.get(&result) {
            result = rhs.clone();
        }
        result
    })
}

/// Normalises the strict subsorts of the sort, but not the sort itself.
fn normalise_arguments(rules: &FxHashMap<SortExpression, SortExpression>, sort: &SortExpression) -> SortExpression {
    if sort.is_structured_sort() {
        let constructors = sort
            .constructors()
            .iter()
            .map(|constructor| {
                let arguments = constructor
                    .arguments()
                    .iter()
                    .map(|argument| StructuredSortArgument::new(argument.name(), normalise_with(rules, &argument.sort())))
                    .collect();
                StructuredSortConstructor::new(constructor.name(), arguments, constructor.recogniser())
            })
            .collect();
        SortExpression::structured(constructors)
    } else if sort.is_function_sort() {
        SortExpression::function(
            sort.domain().iter().map(|domain| normalise_with(rules, &domain)).collect(),
            normalise_with(rules, &sort.codomain()),
        )
    } else if sort.is_container_sort() {
        SortExpression::container(sort.container_kind(), normalise_with(rules, &sort.element_sort()))
    } else {
        sort.clone()
    }
}

/// Knuth-Bendix completion of the rules derived from the aliases.
fn complete(aliases: &[SortAlias]) -> FxHashMap<SortExpression, SortExpression> {
    let mut rules: Vec<(SortExpression, SortExpression)> = aliases
        .iter()
        .map(|alias| {
            if alias.reference.is_structured_sort() {
                (alias.reference.clone(), alias.name.clone())
            } else {
                (alias.name.clone(), alias.reference.clone())
            }
        })
        .collect();

    loop {
        let mut changed = false;

        // Identify the right hand sides of rules with the same left hand side.
        let mut oriented: Vec<(SortExpression, SortExpression)> = Vec::new();
        let mut critical: Vec<(SortExpression, SortExpression)> = Vec::new();
        for (lhs, rhs) in rules {
            if lhs == rhs {
                changed = true;
                continue;
            }

            if let Some((_, existing)) = oriented.iter_mut().find(|(other, _)| *other == lhs) {
                if *existing != rhs {
                    let (larger, smaller) = if existing.to_string() > rhs.to_string() {
                        (existing.clone(), rhs)
                    } else {
                        (rhs, existing.clone())
                    };
                    trace!("Identified {larger} with {smaller}");
                    *existing = smaller.clone();
                    critical.push((larger, smaller));
                }
                changed = true;
            } else {
                oriented.push((lhs, rhs));
            }
        }
        oriented.extend(critical);

        // Normalise the rules with respect to each other.
        let mut result = Vec::with_capacity(oriented.len());
        for index in 0..oriented.len() {
            let others: FxHashMap<SortExpression, SortExpression> = oriented
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .map(|(_, rule)| rule.clone())
                .collect();

            let (lhs, rhs) = &oriented[index];
            let new_lhs = normalise_arguments(&others, lhs);
            let new_rhs = normalise_with(&others, rhs);
            if new_lhs != *lhs || new_rhs != *rhs {
                changed = true;
            }
            result.push((new_lhs, new_rhs));
        }
        rules = result;

        if !changed {
            break;
        }
    }

    for (lhs, rhs) in &rules {
        trace!("Sort rule {lhs} -> {rhs}");
    }
    rules.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::data::standard::list_sort;
    use crate::data::standard::nat_sort;
    use crate::data::ContainerKind;

    fn enumeration(names: &[&str]) -> SortExpression {
        SortExpression::structured(names.iter().map(|name| StructuredSortConstructor::new(name, vec![], None)).collect())
    }

    #[test]
    fn test_alias_to_reference() {
        let mut spec = SortSpecification::new();
        spec.add_alias(SortExpression::basic("L"), list_sort(&nat_sort())).unwrap();
        spec.add_alias(SortExpression::basic("M"), SortExpression::basic("L")).unwrap();

        assert_eq!(spec.normalise(&SortExpression::basic("M")), list_sort(&nat_sort()));
        assert_eq!(
            spec.normalise(&SortExpression::container(ContainerKind::Set, SortExpression::basic("M"))),
            SortExpression::container(ContainerKind::Set, list_sort(&nat_sort()))
        );
    }

    #[test]
    fn test_structured_alias() {
        let mut spec = SortSpecification::new();
        spec.add_alias(SortExpression::basic("D"), enumeration(&["d1", "d2"])).unwrap();

        let d = SortExpression::basic("D");
        assert_eq!(spec.normalise(&enumeration(&["d1", "d2"])), d);
        assert_eq!(spec.normalise(&d), d);
        assert_eq!(spec.structured_sorts(), vec![(d, enumeration(&["d1", "d2"]))]);
    }

    #[test]
    fn test_identical_structured_sorts() {
        let mut spec = SortSpecification::new();
        spec.add_alias(SortExpression::basic("B"), enumeration(&["c"])).unwrap();
        spec.add_alias(SortExpression::basic("A"), enumeration(&["c"])).unwrap();

        let a = SortExpression::basic("A");
        assert_eq!(spec.normalise(&SortExpression::basic("B")), a);
        assert_eq!(spec.normalise(&a), a);
        assert_eq!(spec.normalise(&enumeration(&["c"])), a);
    }

    #[test]
    fn test_normalise_independent_of_alias_order() {
        let aliases = [
            (SortExpression::basic("M"), SortExpression::basic("L")),
            (SortExpression::basic("L"), list_sort(&nat_sort())),
            (SortExpression::basic("B"), enumeration(&["c"])),
            (SortExpression::basic("A"), enumeration(&["c"])),
            (
                SortExpression::basic("S"),
                SortExpression::container(ContainerKind::Set, SortExpression::basic("M")),
            ),
        ];

        let mut forward = SortSpecification::new();
        for (name, reference) in aliases.iter() {
            forward.add_alias(name.clone(), reference.clone()).unwrap();
        }

        let mut backward = SortSpecification::new();
        for (name, reference) in aliases.iter().rev() {
            backward.add_alias(name.clone(), reference.clone()).unwrap();
        }

        let mut sorts: Vec<SortExpression> = aliases.iter().map(|(name, _)| name.clone()).collect();
        sorts.push(enumeration(&["c"]));
        sorts.push(list_sort(&SortExpression::basic("M")));
        for sort in &sorts {
            assert_eq!(forward.normalise(sort), backward.normalise(sort), "the normal forms of {sort} differ");
        }
        assert_eq!(forward.normalise(&SortExpression::basic("B")), SortExpression::basic("A"));
    }

    #[test]
    fn test_recursive_structured_sort() {
        let mut spec = SortSpecification::new();
        let tree = SortExpression::structured(vec![
            StructuredSortConstructor::new("leaf", vec![], None),
            StructuredSortConstructor::new(
                "node",
                vec![
                    StructuredSortArgument::new(None, SortExpression::basic("T")),
                    StructuredSortArgument::new(None, SortExpression::basic("U")),
                ],
                None,
            ),
        ]);
        spec.add_alias(SortExpression::basic("U"), SortExpression::basic("T")).unwrap();
        spec.add_alias(SortExpression::basic("T"), tree).unwrap();

        let t = SortExpression::basic("T");
        assert_eq!(spec.normalise(&SortExpression::basic("U")), t);

        let (name, definition) = &spec.structured_sorts()[0];
        assert_eq!(*name, t);
        assert_eq!(definition.to_string(), "struct leaf | node(T, T)");
    }

    #[test]
    fn test_cyclic_alias() {
        let mut spec = SortSpecification::new();
        spec.add_alias(SortExpression::basic("A"), SortExpression::basic("B")).unwrap();
        assert!(matches!(
            spec.add_alias(SortExpression::basic("B"), list_sort(&SortExpression::basic("A"))),
            Err(Mcrl2Error::SortDecl(_))
        ));
        assert_eq!(spec.aliases().len(), 1);
    }

    #[test]
    fn test_normalise_is_idempotent() {
        let mut spec = SortSpecification::new();
        spec.add_alias(SortExpression::basic("D"), enumeration(&["d1", "d2"])).unwrap();
        spec.add_alias(SortExpression::basic("E"), list_sort(&SortExpression::basic("D"))).unwrap();
        spec.add_alias(SortExpression::basic("F"), SortExpression::basic("E")).unwrap();

        for sort in [
            SortExpression::basic("F"),
            SortExpression::function(vec![SortExpression::basic("E")], SortExpression::basic("F")),
            list_sort(&enumeration(&["d1", "d2"])),
        ] {
            let normal_form = spec.normalise(&sort);
            assert_eq!(spec.normalise(&normal_form), normal_form);
        }
    }

    #[test]
    fn test_undeclared_sort() {
        let mut spec = SortSpecification::new();
        spec.add_sort(SortExpression::basic("D"));
        assert!(spec.check_declared(&list_sort(&SortExpression::basic("D"))).is_ok());
        assert!(matches!(
            spec.check_declared(&list_sort(&SortExpression::basic("E"))),
            Err(Mcrl2Error::SortDecl(_))
        ));
    }
}
