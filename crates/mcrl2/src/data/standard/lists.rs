use crate::data::ContainerKind;
use crate::data::DataExpression;
use crate::data::SortExpression;

use super::and;
use super::apply;
use super::bool_sort;
use super::c0;
use super::cnat;
use super::constant;
use super::equal_to;
use super::equation;
use super::false_;
use super::function_symbol;
use super::less;
use super::less_equal;
use super::nat_sort;
use super::or;
use super::pos_sort;
use super::pred;
use super::succ;
use super::true_;
use super::variable;
use super::SortDefinitions;

pub fn list_sort(element: &SortExpression) -> SortExpression {
    SortExpression::container(ContainerKind::List, element.clone())
}

pub fn empty_list(element: &SortExpression) -> DataExpression {
    constant("[]", &list_sort(element))
}

/// The list `head |> tail`.
pub fn cons_list(head: &DataExpression, tail: &DataExpression) -> DataExpression {
    apply("|>", &[head, tail], &tail.sort())
}

/// The list `[elements]` with elements of the given sort.
pub fn list_enumeration(element: &SortExpression, elements: &[DataExpression]) -> DataExpression {
    elements
        .iter()
        .rev()
        .fold(empty_list(element), |tail, head| cons_list(head, &tail))
}

/// Returns the elements of a list of the form `[elements]`, None if the list
/// is not closed.
pub fn list_elements(list: &DataExpression) -> Option<Vec<DataExpression>> {
    let mut result = Vec::new();
    let mut current = list.clone();

    loop {
        if current.is_symbol("[]") {
            return Some(result);
        } else if current.is_application_of("|>", 2) {
            result.push(current.argument(0));
            current = current.argument(1);
        } else {
            return None;
        }
    }
}

pub(super) fn list_definitions(element: &SortExpression) -> SortDefinitions {
    let boolean = bool_sort();
    let nat = nat_sort();
    let list = list_sort(element);

    let d = variable("d", element);
    let e = variable("e", element);
    let s = variable("s", &list);
    let t = variable("t", &list);
    let p = variable("p", &pos_sort());
    let empty = empty_list(element);

    let constructors = vec![
        function_symbol("[]", &[], &list),
        function_symbol("|>", &[element, &list], &list),
    ];

    let mappings = vec![
        function_symbol("in", &[element, &list], &boolean),
        function_symbol("#", &[&list], &nat),
        function_symbol("<|", &[&list, element], &list),
        function_symbol("++", &[&list, &list], &list),
        function_symbol(".", &[&list, &nat], element),
        function_symbol("head", &[&list], element),
        function_symbol("tail", &[&list], &list),
        function_symbol("rhead", &[&list], element),
        function_symbol("rtail", &[&list], &list),
    ];

    let snoc = |list: &DataExpression, element: &DataExpression| apply("<|", &[list, element], &list.sort());
    let concat = |left: &DataExpression, right: &DataExpression| apply("++", &[left, right], &left.sort());
    let element_at = |list: &DataExpression, index: &DataExpression| apply(".", &[list, index], element);
    let size = |list: &DataExpression| apply("#", &[list], &nat);
    let is_in = |element: &DataExpression, list: &DataExpression| apply("in", &[element, list], &boolean);
    let rhead = |list: &DataExpression| apply("rhead", &[list], element);
    let rtail = |list: &DataExpression| apply("rtail", &[list], &list.sort());

    let ds = cons_list(&d, &s);
    let et = cons_list(&e, &t);

    let equations = vec![
        equation(equal_to(&empty, &ds), false_()),
        equation(equal_to(&ds, &empty), false_()),
        equation(equal_to(&ds, &et), and(&equal_to(&d, &e), &equal_to(&s, &t))),
        // Lexicographical ordering.
        equation(less(&empty, &ds), true_()),
        equation(less(&s, &empty), false_()),
        equation(
            less(&ds, &et),
            or(&less(&d, &e), &and(&equal_to(&d, &e), &less(&s, &t))),
        ),
        equation(less_equal(&empty, &s), true_()),
        equation(less_equal(&ds, &empty), false_()),
        equation(
            less_equal(&ds, &et),
            or(&less(&d, &e), &and(&equal_to(&d, &e), &less_equal(&s, &t))),
        ),
        equation(is_in(&d, &empty), false_()),
        equation(is_in(&d, &et), or(&equal_to(&d, &e), &is_in(&d, &t))),
        equation(size(&empty), c0()),
        equation(size(&ds), cnat(&succ(&size(&s)))),
        equation(snoc(&empty, &d), cons_list(&d, &empty)),
        equation(snoc(&et, &d), cons_list(&e, &snoc(&t, &d))),
        equation(concat(&empty, &s), s.clone()),
        equation(concat(&ds, &t), cons_list(&d, &concat(&s, &t))),
        equation(concat(&s, &empty), s.clone()),
        equation(element_at(&ds, &c0()), d.clone()),
        equation(element_at(&ds, &cnat(&p)), element_at(&s, &pred(&p))),
        equation(apply("head", &[&ds], element), d.clone()),
        equation(apply("tail", &[&ds], &list), s.clone()),
        equation(rhead(&cons_list(&d, &empty)), d.clone()),
        equation(rhead(&cons_list(&d, &et)), rhead(&et)),
        equation(rtail(&cons_list(&d, &empty)), empty.clone()),
        equation(rtail(&cons_list(&d, &et)), cons_list(&d, &rtail(&et))),
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
    fn test_list_elements() {
        let list = list_enumeration(&bool_sort(), &[true_(), false_()]);
        assert_eq!(list_elements(&list), Some(vec![true_(), false_()]));
        assert_eq!(list.sort(), list_sort(&bool_sort()));

        let open = cons_list(&true_(), &variable("l", &list_sort(&bool_sort())));
        assert_eq!(list_elements(&open), None);
    }
}
