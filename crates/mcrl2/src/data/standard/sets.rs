use crate::data::ContainerKind;
use crate::data::DataExpression;
use crate::data::SortExpression;

use super::and;
use super::apply;
use super::apply_expression;
use super::bool_sort;
use super::c0;
use super::cnat;
use super::conditional_equation;
use super::constant;
use super::equal_to;
use super::equation;
use super::false_;
use super::function_symbol;
use super::less;
use super::less_equal;
use super::nat_sort;
use super::not;
use super::not_equal_to;
use super::or;
use super::succ;
use super::true_;
use super::variable;
use super::SortDefinitions;

pub fn fset_sort(element: &SortExpression) -> SortExpression {
    SortExpression::container(ContainerKind::FSet, element.clone())
}

pub fn set_sort(element: &SortExpression) -> SortExpression {
    SortExpression::container(ContainerKind::Set, element.clone())
}

pub fn empty_fset(element: &SortExpression) -> DataExpression {
    constant("{}", &fset_sort(element))
}

pub fn empty_set(element: &SortExpression) -> DataExpression {
    constant("{}", &set_sort(element))
}

/// Inserts the element into a finite set, keeping the set sorted.
pub fn fset_insert(element: &DataExpression, set: &DataExpression) -> DataExpression {
    apply("@fset_insert", &[element, set], &set.sort())
}

/// The finite set with the given elements.
pub fn fset_enumeration(element: &SortExpression, elements: &[DataExpression]) -> DataExpression {
    elements
        .iter()
        .rev()
        .fold(empty_fset(element), |set, head| fset_insert(head, &set))
}

/// The set with the given elements.
pub fn set_enumeration(element: &SortExpression, elements: &[DataExpression]) -> DataExpression {
    let set = fset_enumeration(element, elements);
    apply("@setfset", &[&set], &set_sort(element))
}

/// The set `{ x: S | body }` given the characteristic function.
pub fn set_comprehension(function: &DataExpression) -> DataExpression {
    let element = function.sort().domain().head();
    apply("@setcomp", &[function], &set_sort(&element))
}

fn predicate_sort(element: &SortExpression) -> SortExpression {
    SortExpression::function(vec![element.clone()], bool_sort())
}

pub(super) fn fset_definitions(element: &SortExpression) -> SortDefinitions {
    let boolean = bool_sort();
    let fset = fset_sort(element);
    let predicate = predicate_sort(element);

    let d = variable("d", element);
    let e = variable("e", element);
    let s = variable("s", &fset);
    let t = variable("t", &fset);
    let f = variable("f", &predicate);
    let g = variable("g", &predicate);
    let empty = empty_fset(element);

    let constructors = vec![
        function_symbol("{}", &[], &fset),
        function_symbol("@fset_cons", &[element, &fset], &fset),
    ];

    let mappings = vec![
        function_symbol("@fset_insert", &[element, &fset], &fset),
        function_symbol("@cons_if", &[&boolean, element, &fset], &fset),
        function_symbol("in", &[element, &fset], &boolean),
        function_symbol("+", &[&fset, &fset], &fset),
        function_symbol("*", &[&fset, &fset], &fset),
        function_symbol("-", &[&fset, &fset], &fset),
        function_symbol("#", &[&fset], &nat_sort()),
        function_symbol("@fset_union", &[&predicate, &predicate, &fset, &fset], &fset),
        function_symbol("@fset_inter", &[&predicate, &predicate, &fset, &fset], &fset),
    ];

    let cons = |element: &DataExpression, set: &DataExpression| apply("@fset_cons", &[element, set], &fset);
    let cons_if = |condition: &DataExpression, element: &DataExpression, set: &DataExpression| {
        apply("@cons_if", &[condition, element, set], &fset)
    };
    let is_in = |element: &DataExpression, set: &DataExpression| apply("in", &[element, set], &boolean);
    let binary = |name: &str, left: &DataExpression, right: &DataExpression| apply(name, &[left, right], &fset);
    let combine = |name: &str, f: &DataExpression, g: &DataExpression, s: &DataExpression, t: &DataExpression| {
        apply(name, &[f, g, s, t], &fset)
    };
    let call = |function: &DataExpression, argument: &DataExpression| apply_expression(function, &[argument]);

    let ds = cons(&d, &s);
    let et = cons(&e, &t);

    let mut equations = vec![
        equation(equal_to(&empty, &ds), false_()),
        equation(equal_to(&ds, &empty), false_()),
        equation(equal_to(&ds, &et), and(&equal_to(&d, &e), &equal_to(&s, &t))),
        equation(less_equal(&empty, &s), true_()),
        equation(less_equal(&ds, &t), and(&is_in(&d, &t), &less_equal(&s, &t))),
        equation(less(&s, &t), and(&less_equal(&s, &t), &not_equal_to(&s, &t))),
        equation(fset_insert(&d, &empty), cons(&d, &empty)),
        conditional_equation(equal_to(&d, &e), fset_insert(&d, &et), et.clone()),
        conditional_equation(less(&d, &e), fset_insert(&d, &et), cons(&d, &et)),
        conditional_equation(less(&e, &d), fset_insert(&d, &et), cons(&e, &fset_insert(&d, &t))),
        equation(cons_if(&true_(), &d, &s), ds.clone()),
        equation(cons_if(&false_(), &d, &s), s.clone()),
        equation(is_in(&d, &empty), false_()),
        equation(is_in(&d, &et), or(&equal_to(&d, &e), &is_in(&d, &t))),
        equation(binary("+", &empty, &s), s.clone()),
        equation(binary("+", &ds, &t), fset_insert(&d, &binary("+", &s, &t))),
        equation(binary("*", &empty, &s), empty.clone()),
        conditional_equation(
            is_in(&d, &t),
            binary("*", &ds, &t),
            fset_insert(&d, &binary("*", &s, &t)),
        ),
        conditional_equation(not(&is_in(&d, &t)), binary("*", &ds, &t), binary("*", &s, &t)),
        equation(binary("-", &empty, &s), empty.clone()),
        conditional_equation(is_in(&d, &t), binary("-", &ds, &t), binary("-", &s, &t)),
        conditional_equation(
            not(&is_in(&d, &t)),
            binary("-", &ds, &t),
            fset_insert(&d, &binary("-", &s, &t)),
        ),
        equation(apply("#", &[&empty], &nat_sort()), c0()),
        equation(
            apply("#", &[&ds], &nat_sort()),
            cnat(&succ(&apply("#", &[&s], &nat_sort()))),
        ),
    ];

    // The union and intersection of the finite parts of two sets with
    // characteristic functions f and g respectively. An element of the finite
    // part flips the membership given by the characteristic function.
    for (name, keep_left, keep_right) in [
        ("@fset_union", not(&call(&g, &d)), not(&call(&f, &e))),
        ("@fset_inter", call(&g, &d), call(&f, &e)),
    ] {
        equations.extend([
            equation(combine(name, &f, &g, &empty, &empty), empty.clone()),
            equation(
                combine(name, &f, &g, &ds, &empty),
                cons_if(&keep_left, &d, &combine(name, &f, &g, &s, &empty)),
            ),
            equation(
                combine(name, &f, &g, &empty, &et),
                cons_if(&keep_right, &e, &combine(name, &f, &g, &empty, &t)),
            ),
            conditional_equation(
                equal_to(&d, &e),
                combine(name, &f, &g, &ds, &et),
                cons_if(
                    &equal_to(&call(&f, &d), &call(&g, &d)),
                    &d,
                    &combine(name, &f, &g, &s, &t),
                ),
            ),
            conditional_equation(
                less(&d, &e),
                combine(name, &f, &g, &ds, &et),
                cons_if(&keep_left, &d, &combine(name, &f, &g, &s, &et)),
            ),
            conditional_equation(
                less(&e, &d),
                combine(name, &f, &g, &ds, &et),
                cons_if(&keep_right, &e, &combine(name, &f, &g, &ds, &t)),
            ),
        ]);
    }

    SortDefinitions {
        constructors,
        mappings,
        equations,
    }
}

pub(super) fn set_definitions(element: &SortExpression) -> SortDefinitions {
    let boolean = bool_sort();
    let fset = fset_sort(element);
    let set = set_sort(element);
    let predicate = predicate_sort(element);

    let d = variable("d", element);
    let s = variable("s", &fset);
    let t = variable("t", &fset);
    let f = variable("f", &predicate);
    let g = variable("g", &predicate);
    let x = variable("x", &set);
    let y = variable("y", &set);

    let false_function = constant("@false_", &predicate);
    let true_function = constant("@true_", &predicate);
    let empty = empty_fset(element);

    let constructors = vec![function_symbol("@set", &[&predicate, &fset], &set)];

    let mappings = vec![
        function_symbol("{}", &[], &set),
        function_symbol("@setfset", &[&fset], &set),
        function_symbol("@setcomp", &[&predicate], &set),
        function_symbol("in", &[element, &set], &boolean),
        function_symbol("!", &[&set], &set),
        function_symbol("+", &[&set, &set], &set),
        function_symbol("*", &[&set, &set], &set),
        function_symbol("-", &[&set, &set], &set),
        function_symbol("@false_", &[], &predicate),
        function_symbol("@true_", &[], &predicate),
        function_symbol("@not_", &[&predicate], &predicate),
        function_symbol("@and_", &[&predicate, &predicate], &predicate),
        function_symbol("@or_", &[&predicate, &predicate], &predicate),
    ];

    let make_set = |function: &DataExpression, finite: &DataExpression| apply("@set", &[function, finite], &set);
    let binary = |name: &str, left: &DataExpression, right: &DataExpression| apply(name, &[left, right], &set);
    let not_function = |function: &DataExpression| apply("@not_", &[function], &predicate);
    let and_function =
        |left: &DataExpression, right: &DataExpression| apply("@and_", &[left, right], &predicate);
    let or_function = |left: &DataExpression, right: &DataExpression| apply("@or_", &[left, right], &predicate);
    let call = |function: &DataExpression, argument: &DataExpression| apply_expression(function, &[argument]);

    let fs = make_set(&f, &s);
    let gt = make_set(&g, &t);

    let equations = vec![
        equation(empty_set(element), make_set(&false_function, &empty)),
        equation(apply("@setfset", &[&s], &set), make_set(&false_function, &s)),
        equation(apply("@setcomp", &[&f], &set), make_set(&f, &empty)),
        equation(
            apply("in", &[&d, &fs], &boolean),
            not_equal_to(&call(&f, &d), &apply("in", &[&d, &s], &boolean)),
        ),
        equation(equal_to(&fs, &make_set(&f, &t)), equal_to(&s, &t)),
        equation(apply("!", &[&fs], &set), make_set(&not_function(&f), &s)),
        equation(
            binary("+", &fs, &gt),
            make_set(
                &or_function(&f, &g),
                &apply("@fset_union", &[&f, &g, &s, &t], &fset),
            ),
        ),
        equation(
            binary("*", &fs, &gt),
            make_set(
                &and_function(&f, &g),
                &apply("@fset_inter", &[&f, &g, &s, &t], &fset),
            ),
        ),
        equation(binary("-", &x, &y), binary("*", &x, &apply("!", &[&y], &set))),
        equation(
            less_equal(&make_set(&false_function, &s), &make_set(&false_function, &t)),
            less_equal(&s, &t),
        ),
        equation(
            less(&make_set(&false_function, &s), &make_set(&false_function, &t)),
            less(&s, &t),
        ),
        // The characteristic functions.
        equation(call(&false_function, &d), false_()),
        equation(call(&true_function, &d), true_()),
        equation(call(&not_function(&f), &d), not(&call(&f, &d))),
        equation(call(&and_function(&f, &g), &d), and(&call(&f, &d), &call(&g, &d))),
        equation(call(&or_function(&f, &g), &d), or(&call(&f, &d), &call(&g, &d))),
        equation(not_function(&false_function), true_function.clone()),
        equation(not_function(&true_function), false_function.clone()),
        equation(and_function(&false_function, &f), false_function.clone()),
        equation(and_function(&f, &false_function), false_function.clone()),
        equation(and_function(&true_function, &f), f.clone()),
        equation(and_function(&f, &true_function), f.clone()),
        equation(or_function(&false_function, &f), f.clone()),
        equation(or_function(&f, &false_function), f.clone()),
        equation(or_function(&true_function, &f), true_function.clone()),
        equation(or_function(&f, &true_function), true_function.clone()),
    ];

    SortDefinitions {
        constructors,
        mappings,
        equations,
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_set_enumeration_sort() {
        let set = set_enumeration(&bool_sort(), &[true_()]);
        assert_eq!(set.sort(), set_sort(&bool_sort()));

        let fset = fset_enumeration(&bool_sort(), &[]);
        assert_eq!(fset, empty_fset(&bool_sort()));
    }
}
