use rustc_hash::FxHashMap;

use crate::data::BinderKind;
use crate::data::DataAbstraction;
use crate::data::DataExpression;
use crate::data::DataFunctionSymbol;
use crate::data::DataSpecification;
use crate::data::DataVariable;
use crate::data::SortExpression;

/// The maximal nesting of constructor applications in a representative.
const MAX_DEPTH: usize = 4;

/// Computes a closed term of a given sort, for example as the default value
/// of a parameter that is not used in a summand.
///
/// Constants are preferred over constructor applications, and constructors
/// over mappings. Function sorts are represented by a lambda expression with
/// a constant body.
pub struct RepresentativeGenerator<'a> {
    spec: &'a DataSpecification,
    cache: FxHashMap<SortExpression, Option<DataExpression>>,
}

impl<'a> RepresentativeGenerator<'a> {
    pub fn new(spec: &'a DataSpecification) -> RepresentativeGenerator<'a> {
        RepresentativeGenerator {
            spec,
            cache: FxHashMap::default(),
        }
    }

    /// Returns a closed term of the sort, or None when no such term exists
    /// within a small nesting depth.
    pub fn representative(&mut self, sort: &SortExpression) -> Option<DataExpression> {
        let sort = self.spec.normalise_sorts(sort);
        self.find(&sort, MAX_DEPTH)
    }

    fn find(&mut self, sort: &SortExpression, depth: usize) -> Option<DataExpression> {
        if let Some(result) = self.cache.get(sort) {
            return result.clone();
        }

        let result = self.compute(sort, depth);
        if result.is_some() || depth == MAX_DEPTH {
            self.cache.insert(sort.clone(), result.clone());
        }
        result
    }

    fn compute(&mut self, sort: &SortExpression, depth: usize) -> Option<DataExpression> {
        if sort.is_function_sort() {
            let body = self.find(&sort.codomain(), depth)?;
            let variables: Vec<DataVariable> = sort
                .domain()
                .iter()
                .enumerate()
                .map(|(index, domain)| DataVariable::new(&format!("x{index}"), domain))
                .collect();
            return Some(DataAbstraction::new(BinderKind::Lambda, variables, body).into());
        }

        let constructors: Vec<DataFunctionSymbol> = self.spec.constructors_of(sort).to_vec();
        if let Some(constant) = constructors.iter().find(|constructor| constructor.sort() == *sort) {
            return Some(constant.clone().into());
        }

        if let Some(constant) = self.spec.mappings().iter().find(|mapping| mapping.sort() == *sort) {
            return Some(constant.clone().into());
        }

        if depth == 0 {
            return None;
        }

        let mut candidates: Vec<&DataFunctionSymbol> = constructors
            .iter()
            .filter(|constructor| constructor.sort().is_function_sort())
            .collect();
        candidates.sort_by_key(|constructor| constructor.sort().domain().len());

        'candidates: for constructor in candidates {
            let mut arguments = Vec::new();
            for domain in constructor.sort().domain().iter() {
                match self.find(&domain, depth - 1) {
                    Some(argument) => arguments.push(argument),
                    None => continue 'candidates,
                }
            }

            let head: DataExpression = constructor.clone().into();
            return Some(DataExpression::application(&head, &arguments));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::data::standard::bool_sort;
    use crate::data::standard::int_sort;
    use crate::data::standard::list_sort;
    use crate::data::standard::nat_sort;
    use crate::data::standard::real_sort;
    use crate::data::StructuredSortArgument;
    use crate::data::StructuredSortConstructor;

    #[test]
    fn test_standard_representatives() {
        let spec = DataSpecification::new();
        let mut generator = RepresentativeGenerator::new(&spec);

        assert_eq!(generator.representative(&bool_sort()).unwrap().to_string(), "true");
        assert_eq!(generator.representative(&nat_sort()).unwrap().to_string(), "0");
        assert_eq!(generator.representative(&int_sort()).unwrap().to_string(), "0");
        assert!(generator.representative(&real_sort()).is_some());
    }

    #[test]
    fn test_structured_representative() {
        let mut spec = DataSpecification::new();
        let s = SortExpression::basic("S");
        spec.add_alias(
            s.clone(),
            SortExpression::structured(vec![StructuredSortConstructor::new(
                "c",
                vec![
                    StructuredSortArgument::new(Some("i"), nat_sort()),
                    StructuredSortArgument::new(Some("b"), bool_sort()),
                ],
                None,
            )]),
        )
        .unwrap();
        spec.add_context_sort(list_sort(&s));

        let mut generator = RepresentativeGenerator::new(&spec);
        assert_eq!(generator.representative(&s).unwrap().to_string(), "c(0, true)");
        assert_eq!(generator.representative(&list_sort(&s)).unwrap().to_string(), "[]");
    }

    #[test]
    fn test_uninhabited_sort() {
        let mut spec = DataSpecification::new();
        spec.add_sort(SortExpression::basic("D"));

        let mut generator = RepresentativeGenerator::new(&spec);
        assert!(generator.representative(&SortExpression::basic("D")).is_none());
    }
}
