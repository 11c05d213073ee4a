use rustc_hash::FxHashMap;

use crate::data::replace_sorts;
use crate::data::standard::numeric_rank;
use crate::data::visit_sorts;
use crate::data::SortExpression;

/// Placeholder sorts occur in the signatures of the polymorphic system
/// functions, for example `head: List(@S) -> @S`.
pub(crate) fn placeholder(name: &str) -> SortExpression {
    SortExpression::basic(&format!("@{name}"))
}

pub(crate) fn is_placeholder(sort: &SortExpression) -> bool {
    sort.is_basic_sort() && sort.name().starts_with('@')
}

pub(crate) fn has_placeholder(sort: &SortExpression) -> bool {
    let mut found = false;
    visit_sorts(sort, &mut |sort| found |= is_placeholder(sort));
    found
}

/// Returns the least sort that both sorts can be converted to implicitly.
pub(crate) fn join(left: &SortExpression, right: &SortExpression) -> Option<SortExpression> {
    if left == right {
        return Some(left.clone());
    }

    if let (Some(l), Some(r)) = (numeric_rank(left), numeric_rank(right)) {
        return Some(if l >= r { left.clone() } else { right.clone() });
    }

    if left.is_container_sort() && right.is_container_sort() && left.container_kind() == right.container_kind() {
        let element = join(&left.element_sort(), &right.element_sort())?;
        return Some(SortExpression::container(left.container_kind(), element));
    }

    None
}

/// Returns the cost of using a value of sort `from` where a value of sort `to`
/// is expected, or None when it is impossible. Every step in the chain
/// `Pos < Nat < Int < Real` counts once.
///
/// Containers are compared elementwise, which only succeeds in the end for
/// enumerations whose elements can be converted.
pub(crate) fn conversion_cost(from: &SortExpression, to: &SortExpression) -> Option<usize> {
    if from == to {
        return Some(0);
    }

    if let (Some(f), Some(t)) = (numeric_rank(from), numeric_rank(to)) {
        return if f <= t { Some(t - f) } else { None };
    }

    if from.is_container_sort() && to.is_container_sort() && from.container_kind() == to.container_kind() {
        return conversion_cost(&from.element_sort(), &to.element_sort());
    }

    None
}

/// Replaces the placeholders in the sort by their bindings.
pub(crate) fn instantiate(sort: &SortExpression, bindings: &FxHashMap<SortExpression, SortExpression>) -> SortExpression {
    replace_sorts(sort, &mut |sort| bindings.get(sort).cloned().unwrap_or_else(|| sort.clone()))
}

/// Binds the placeholders in the pattern such that it becomes equal to the
/// given sort, returns false when that is impossible.
pub(crate) fn bind_exact(
    pattern: &SortExpression,
    sort: &SortExpression,
    bindings: &mut FxHashMap<SortExpression, SortExpression>,
) -> bool {
    if is_placeholder(pattern) {
        return match bindings.get(pattern) {
            Some(bound) => bound == sort,
            None => {
                bindings.insert(pattern.clone(), sort.clone());
                true
            }
        };
    }

    if !has_placeholder(pattern) {
        return pattern == sort;
    }

    if pattern.is_container_sort() && sort.is_container_sort() && pattern.container_kind() == sort.container_kind() {
        return bind_exact(&pattern.element_sort(), &sort.element_sort(), bindings);
    }

    if pattern.is_function_sort() && sort.is_function_sort() && pattern.domain().len() == sort.domain().len() {
        for (p, s) in pattern.domain().iter().zip(sort.domain().iter()) {
            if !bind_exact(&p, &s, bindings) {
                return false;
            }
        }
        return bind_exact(&pattern.codomain(), &sort.codomain(), bindings);
    }

    false
}

/// Matches the domain of a possibly polymorphic signature against the sorts
/// of the arguments. Every placeholder is bound to the join of the sorts of
/// the arguments it is matched with, and the number of implicit conversions
/// is counted.
#[derive(Default)]
pub(crate) struct SortMatcher {
    constraints: Vec<(SortExpression, Vec<SortExpression>)>,
    cost: usize,
}

impl SortMatcher {
    /// Records that an argument of the given sort is passed for the pattern,
    /// returns false when this can never match.
    pub fn argument(&mut self, pattern: &SortExpression, sort: &SortExpression) -> bool {
        if is_placeholder(pattern) {
            match self.constraints.iter_mut().find(|(placeholder, _)| placeholder == pattern) {
                Some((_, sorts)) => sorts.push(sort.clone()),
                None => self.constraints.push((pattern.clone(), vec![sort.clone()])),
            }
            return true;
        }

        if !has_placeholder(pattern) {
            return match conversion_cost(sort, pattern) {
                Some(cost) => {
                    self.cost += cost;
                    true
                }
                None => false,
            };
        }

        if pattern.is_container_sort() && sort.is_container_sort() && pattern.container_kind() == sort.container_kind() {
            return self.argument(&pattern.element_sort(), &sort.element_sort());
        }

        if pattern.is_function_sort() && sort.is_function_sort() && pattern.domain().len() == sort.domain().len() {
            let mut bindings = FxHashMap::default();
            if !bind_exact(pattern, sort, &mut bindings) {
                return false;
            }
            for (placeholder, bound) in bindings {
                self.argument(&placeholder, &bound);
            }
            return true;
        }

        false
    }

    /// Returns the bindings of the placeholders and the total number of
    /// conversions, or None when the constraints have no solution.
    pub fn resolve(self) -> Option<(FxHashMap<SortExpression, SortExpression>, usize)> {
        let mut bindings = FxHashMap::default();
        let mut cost = self.cost;

        for (placeholder, sorts) in self.constraints {
            let mut bound = sorts[0].clone();
            for sort in &sorts[1..] {
                bound = join(&bound, sort)?;
            }

            for sort in &sorts {
                cost += conversion_cost(sort, &bound)?;
            }
            bindings.insert(placeholder, bound);
        }

        Some((bindings, cost))
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
    use crate::data::standard::pos_sort;

    #[test]
    fn test_join() {
        assert_eq!(join(&pos_sort(), &int_sort()), Some(int_sort()));
        assert_eq!(join(&list_sort(&pos_sort()), &list_sort(&nat_sort())), Some(list_sort(&nat_sort())));
        assert_eq!(join(&bool_sort(), &nat_sort()), None);
    }

    #[test]
    fn test_matcher_joins_arguments() {
        let s = placeholder("S");

        let mut matcher = SortMatcher::default();
        assert!(matcher.argument(&s, &pos_sort()));
        assert!(matcher.argument(&list_sort(&s), &list_sort(&nat_sort())));
        let (bindings, cost) = matcher.resolve().unwrap();
        assert_eq!(bindings[&s], nat_sort());
        assert_eq!(cost, 1);

        let mut matcher = SortMatcher::default();
        assert!(!matcher.argument(&pos_sort(), &int_sort()));
    }

    #[test]
    fn test_instantiate() {
        let s = placeholder("S");
        let mut bindings = FxHashMap::default();
        assert!(bind_exact(&list_sort(&s), &list_sort(&bool_sort()), &mut bindings));
        assert_eq!(instantiate(&SortExpression::function(vec![list_sort(&s)], s.clone()), &bindings).to_string(), "List(Bool) -> Bool");
        assert!(!has_placeholder(&instantiate(&s, &bindings)));
    }
}
