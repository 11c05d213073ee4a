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
use super::min;
use super::nat_sort;
use super::not_equal_to;
use super::plus;
use super::pos_sort;
use super::variable;
use super::SortDefinitions;

pub fn fbag_sort(element: &SortExpression) -> SortExpression {
    SortExpression::container(ContainerKind::FBag, element.clone())
}

pub fn bag_sort(element: &SortExpression) -> SortExpression {
    SortExpression::container(ContainerKind::Bag, element.clone())
}

pub fn empty_fbag(element: &SortExpression) -> DataExpression {
    constant("{:}", &fbag_sort(element))
}

pub fn empty_bag(element: &SortExpression) -> DataExpression {
    constant("{:}", &bag_sort(element))
}

/// Adds the given natural number of occurrences of the element to a finite bag.
pub fn fbag_cinsert(element: &DataExpression, count: &DataExpression, bag: &DataExpression) -> DataExpression {
    apply("@fbag_cinsert", &[element, count, bag], &bag.sort())
}

/// The finite bag with the given elements and their multiplicities, which are
/// expressions of sort Nat.
pub fn fbag_enumeration(element: &SortExpression, elements: &[(DataExpression, DataExpression)]) -> DataExpression {
    elements
        .iter()
        .rev()
        .fold(empty_fbag(element), |bag, (head, count)| fbag_cinsert(head, count, &bag))
}

/// The bag with the given elements and their multiplicities.
pub fn bag_enumeration(element: &SortExpression, elements: &[(DataExpression, DataExpression)]) -> DataExpression {
    let bag = fbag_enumeration(element, elements);
    apply("@bagfbag", &[&bag], &bag_sort(element))
}

/// The bag `{ x: S | body }` given the multiplicity function.
pub fn bag_comprehension(function: &DataExpression) -> DataExpression {
    let element = function.sort().domain().head();
    apply("@bagcomp", &[function], &bag_sort(&element))
}

pub(super) fn fbag_definitions(element: &SortExpression) -> SortDefinitions {
    let boolean = bool_sort();
    let nat = nat_sort();
    let pos = pos_sort();
    let fbag = fbag_sort(element);

    let d = variable("d", element);
    let e = variable("e", element);
    let p = variable("p", &pos);
    let q = variable("q", &pos);
    let b = variable("b", &fbag);
    let c = variable("c", &fbag);
    let empty = empty_fbag(element);

    let constructors = vec![
        function_symbol("{:}", &[], &fbag),
        function_symbol("@fbag_cons", &[element, &pos, &fbag], &fbag),
    ];

    let mappings = vec![
        function_symbol("@fbag_insert", &[element, &pos, &fbag], &fbag),
        function_symbol("@fbag_cinsert", &[element, &nat, &fbag], &fbag),
        function_symbol("count", &[element, &fbag], &nat),
        function_symbol("in", &[element, &fbag], &boolean),
        function_symbol("+", &[&fbag, &fbag], &fbag),
        function_symbol("*", &[&fbag, &fbag], &fbag),
        function_symbol("-", &[&fbag, &fbag], &fbag),
        function_symbol("#", &[&fbag], &nat),
    ];

    let cons = |element: &DataExpression, count: &DataExpression, bag: &DataExpression| {
        apply("@fbag_cons", &[element, count, bag], &fbag)
    };
    let insert = |element: &DataExpression, count: &DataExpression, bag: &DataExpression| {
        apply("@fbag_insert", &[element, count, bag], &fbag)
    };
    let count = |element: &DataExpression, bag: &DataExpression| apply("count", &[element, bag], &nat);
    let binary = |name: &str, left: &DataExpression, right: &DataExpression| apply(name, &[left, right], &fbag);

    let dpb = cons(&d, &p, &b);
    let eqc = cons(&e, &q, &c);

    let equations = vec![
        equation(equal_to(&empty, &dpb), false_()),
        equation(equal_to(&dpb, &empty), false_()),
        equation(
            equal_to(&dpb, &eqc),
            and(&equal_to(&d, &e), &and(&equal_to(&p, &q), &equal_to(&b, &c))),
        ),
        equation(insert(&d, &p, &empty), cons(&d, &p, &empty)),
        conditional_equation(equal_to(&d, &e), insert(&d, &p, &eqc), cons(&d, &plus(&p, &q), &c)),
        conditional_equation(less(&d, &e), insert(&d, &p, &eqc), cons(&d, &p, &eqc)),
        conditional_equation(less(&e, &d), insert(&d, &p, &eqc), cons(&e, &q, &insert(&d, &p, &c))),
        equation(fbag_cinsert(&d, &c0(), &b), b.clone()),
        equation(fbag_cinsert(&d, &cnat(&p), &b), insert(&d, &p, &b)),
        equation(count(&d, &empty), c0()),
        conditional_equation(equal_to(&d, &e), count(&d, &eqc), cnat(&q)),
        conditional_equation(not_equal_to(&d, &e), count(&d, &eqc), count(&d, &c)),
        equation(apply("in", &[&d, &b], &boolean), less(&c0(), &count(&d, &b))),
        equation(binary("+", &empty, &c), c.clone()),
        equation(binary("+", &dpb, &c), insert(&d, &p, &binary("+", &b, &c))),
        equation(binary("*", &empty, &c), empty.clone()),
        equation(
            binary("*", &dpb, &c),
            fbag_cinsert(&d, &min(&cnat(&p), &count(&d, &c)), &binary("*", &b, &c)),
        ),
        equation(binary("-", &empty, &c), empty.clone()),
        equation(
            binary("-", &dpb, &c),
            fbag_cinsert(
                &d,
                &apply("@monus", &[&cnat(&p), &count(&d, &c)], &nat),
                &binary("-", &b, &c),
            ),
        ),
        equation(apply("#", &[&empty], &nat), c0()),
        equation(apply("#", &[&dpb], &nat), plus(&cnat(&p), &apply("#", &[&b], &nat))),
    ];

    SortDefinitions {
        constructors,
        mappings,
        equations,
    }
}

pub(super) fn bag_definitions(element: &SortExpression) -> SortDefinitions {
    let boolean = bool_sort();
    let nat = nat_sort();
    let fbag = fbag_sort(element);
    let bag = bag_sort(element);
    let multiplicity = SortExpression::function(vec![element.clone()], nat.clone());

    let d = variable("d", element);
    let b = variable("b", &fbag);
    let c = variable("c", &fbag);
    let f = variable("f", &multiplicity);
    let g = variable("g", &multiplicity);
    let x = variable("x", &bag);

    let zero_function = constant("@zero_", &multiplicity);
    let empty = empty_fbag(element);

    let constructors = vec![function_symbol("@bag", &[&multiplicity, &fbag], &bag)];

    let mappings = vec![
        function_symbol("{:}", &[], &bag),
        function_symbol("@bagfbag", &[&fbag], &bag),
        function_symbol("@bagcomp", &[&multiplicity], &bag),
        function_symbol("count", &[element, &bag], &nat),
        function_symbol("in", &[element, &bag], &boolean),
        function_symbol("+", &[&bag, &bag], &bag),
        function_symbol("*", &[&bag, &bag], &bag),
        function_symbol("-", &[&bag, &bag], &bag),
        function_symbol("@zero_", &[], &multiplicity),
        function_symbol("@add_", &[&multiplicity, &multiplicity], &multiplicity),
    ];

    let make_bag = |function: &DataExpression, finite: &DataExpression| apply("@bag", &[function, finite], &bag);
    let binary = |name: &str, left: &DataExpression, right: &DataExpression| apply(name, &[left, right], &bag);
    let fbag_binary =
        |name: &str, left: &DataExpression, right: &DataExpression| apply(name, &[left, right], &fbag);
    let add_function =
        |left: &DataExpression, right: &DataExpression| apply("@add_", &[left, right], &multiplicity);
    let call = |function: &DataExpression, argument: &DataExpression| apply_expression(function, &[argument]);

    let fb = make_bag(&f, &b);

    let equations = vec![
        equation(empty_bag(element), make_bag(&zero_function, &empty)),
        equation(apply("@bagfbag", &[&b], &bag), make_bag(&zero_function, &b)),
        equation(apply("@bagcomp", &[&f], &bag), make_bag(&f, &empty)),
        equation(
            apply("count", &[&d, &fb], &nat),
            plus(&call(&f, &d), &apply("count", &[&d, &b], &nat)),
        ),
        equation(
            apply("in", &[&d, &x], &boolean),
            less(&c0(), &apply("count", &[&d, &x], &nat)),
        ),
        equation(equal_to(&fb, &make_bag(&f, &c)), equal_to(&b, &c)),
        equation(
            binary("+", &fb, &make_bag(&g, &c)),
            make_bag(&add_function(&f, &g), &fbag_binary("+", &b, &c)),
        ),
        equation(
            binary("*", &make_bag(&zero_function, &b), &make_bag(&zero_function, &c)),
            make_bag(&zero_function, &fbag_binary("*", &b, &c)),
        ),
        equation(
            binary("-", &make_bag(&zero_function, &b), &make_bag(&zero_function, &c)),
            make_bag(&zero_function, &fbag_binary("-", &b, &c)),
        ),
        // The multiplicity functions.
        equation(call(&zero_function, &d), c0()),
        equation(call(&add_function(&f, &g), &d), plus(&call(&f, &d), &call(&g, &d))),
        equation(add_function(&zero_function, &f), f.clone()),
        equation(add_function(&f, &zero_function), f.clone()),
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
    use crate::data::standard::nat;
    use crate::data::standard::true_;

    #[test]
    fn test_bag_enumeration_sort() {
        let element = bool_sort();
        let bag = bag_enumeration(&element, &[(true_(), nat(2))]);
        assert_eq!(bag.sort(), bag_sort(&element));
    }
}
