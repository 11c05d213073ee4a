//! The numeric sorts `Pos`, `Nat`, `Int` and `Real` with a binary representation.
//!
//! Positive numbers are built from `@c1` and `@cDub(b, p)`, which denotes `2p + b`.
//! Natural numbers are `@c0` or `@cNat(p)`, integers `@cInt(n)` or `@cNeg(p)`
//! and reals are fractions `@cReal(x, p)` that are kept in reduced form.

use crate::data::DataExpression;
use crate::data::SortExpression;

use super::and;
use super::apply;
use super::bool_sort;
use super::conditional_equation;
use super::constant;
use super::equal_to;
use super::equation;
use super::false_;
use super::function_symbol;
use super::if_;
use super::implies;
use super::less;
use super::less_equal;
use super::not;
use super::true_;
use super::variable;
use super::SortDefinitions;

pub fn pos_sort() -> SortExpression {
    SortExpression::basic("Pos")
}

pub fn nat_sort() -> SortExpression {
    SortExpression::basic("Nat")
}

pub fn int_sort() -> SortExpression {
    SortExpression::basic("Int")
}

pub fn real_sort() -> SortExpression {
    SortExpression::basic("Real")
}

/// Returns true iff the sort is one of the numeric sorts.
pub fn is_numeric_sort(sort: &SortExpression) -> bool {
    sort.is_basic_sort() && matches!(sort.name(), "Pos" | "Nat" | "Int" | "Real")
}

/// The position of a numeric sort in the chain Pos, Nat, Int, Real of implicit
/// conversions.
pub fn numeric_rank(sort: &SortExpression) -> Option<usize> {
    if !sort.is_basic_sort() {
        return None;
    }

    match sort.name() {
        "Pos" => Some(0),
        "Nat" => Some(1),
        "Int" => Some(2),
        "Real" => Some(3),
        _ => None,
    }
}

pub fn c1() -> DataExpression {
    constant("@c1", &pos_sort())
}

pub fn cdub(bit: &DataExpression, positive: &DataExpression) -> DataExpression {
    apply("@cDub", &[bit, positive], &pos_sort())
}

pub fn c0() -> DataExpression {
    constant("@c0", &nat_sort())
}

pub fn cnat(positive: &DataExpression) -> DataExpression {
    apply("@cNat", &[positive], &nat_sort())
}

pub fn cint(natural: &DataExpression) -> DataExpression {
    apply("@cInt", &[natural], &int_sort())
}

pub fn cneg(positive: &DataExpression) -> DataExpression {
    apply("@cNeg", &[positive], &int_sort())
}

pub fn creal(numerator: &DataExpression, denominator: &DataExpression) -> DataExpression {
    apply("@cReal", &[numerator, denominator], &real_sort())
}

/// Converts a sequence of bits, least significant first and ending in a one,
/// to a positive number.
fn pos_from_bits(bits: &[bool]) -> DataExpression {
    debug_assert!(bits.last() == Some(&true), "The most significant bit must be set");

    let mut result = c1();
    for bit in bits[..bits.len() - 1].iter().rev() {
        let bit = if *bit { true_() } else { false_() };
        result = cdub(&bit, &result);
    }
    result
}

/// Returns the binary representation, least significant bit first, of a
/// number in decimal notation of arbitrary length.
fn decimal_to_bits(digits: &str) -> Vec<bool> {
    let mut digits: Vec<u8> = digits.bytes().map(|digit| digit - b'0').collect();
    let mut bits = Vec::new();

    while digits.iter().any(|digit| *digit != 0) {
        let mut remainder = 0;
        for digit in digits.iter_mut() {
            let value = remainder * 10 + *digit;
            *digit = value / 2;
            remainder = value % 2;
        }
        bits.push(remainder == 1);
    }

    bits
}

fn u64_to_bits(mut value: u64) -> Vec<bool> {
    let mut bits = Vec::new();
    while value != 0 {
        bits.push(value % 2 == 1);
        value /= 2;
    }
    bits
}

/// The positive number with the given value, which must be at least one.
pub fn pos(value: u64) -> DataExpression {
    debug_assert!(value > 0, "Positive numbers start at one");
    pos_from_bits(&u64_to_bits(value))
}

pub fn nat(value: u64) -> DataExpression {
    if value == 0 {
        c0()
    } else {
        cnat(&pos(value))
    }
}

pub fn int(value: i64) -> DataExpression {
    if value < 0 {
        cneg(&pos(value.unsigned_abs()))
    } else {
        cint(&nat(value.unsigned_abs()))
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let remainder = a % b;
        a = b;
        b = remainder;
    }
    a
}

/// The fraction numerator / denominator in reduced form.
pub fn real(numerator: i64, denominator: u64) -> DataExpression {
    debug_assert!(denominator > 0, "The denominator must be positive");

    let divisor = gcd(numerator.unsigned_abs(), denominator).max(1);
    let value = numerator.unsigned_abs() / divisor;
    let numerator = if numerator < 0 {
        cneg(&pos(value))
    } else {
        cint(&nat(value))
    };
    creal(&numerator, &pos(denominator / divisor))
}

/// Returns the literal for the given decimal digits in the given numeric sort.
/// Returns None when the sort is not numeric, or when zero is requested as
/// a positive number.
pub fn number(digits: &str, sort: &SortExpression) -> Option<DataExpression> {
    debug_assert!(digits.bytes().all(|digit| digit.is_ascii_digit()), "{digits} is not a number");

    let bits = decimal_to_bits(digits);
    let natural = if bits.is_empty() { c0() } else { cnat(&pos_from_bits(&bits)) };

    match numeric_rank(sort)? {
        0 => {
            if bits.is_empty() {
                None
            } else {
                Some(pos_from_bits(&bits))
            }
        }
        1 => Some(natural),
        2 => Some(cint(&natural)),
        _ => Some(creal(&cint(&natural), &c1())),
    }
}

/// Returns the smallest numeric sort that contains the literal with the given digits.
pub fn number_sort(digits: &str) -> SortExpression {
    if digits.bytes().all(|digit| digit == b'0') {
        nat_sort()
    } else {
        pos_sort()
    }
}

/// Applies the conversion from a numeric sort to a larger numeric sort, returns
/// None when no such conversion exists.
pub fn convert(expression: &DataExpression, target: &SortExpression) -> Option<DataExpression> {
    let source = expression.sort();
    if source == *target {
        return Some(expression.clone());
    }

    let name = match (numeric_rank(&source)?, numeric_rank(target)?) {
        (0, 1) => "Pos2Nat",
        (0, 2) => "Pos2Int",
        (0, 3) => "Pos2Real",
        (1, 2) => "Nat2Int",
        (1, 3) => "Nat2Real",
        (2, 3) => "Int2Real",
        _ => return None,
    };

    Some(apply(name, &[expression], target))
}

/// The sort of `left + right`.
fn plus_sort(left: &SortExpression, right: &SortExpression) -> SortExpression {
    if numeric_rank(left) == Some(0) || numeric_rank(right) == Some(0) {
        pos_sort()
    } else {
        left.clone()
    }
}

/// The sort of an operation that yields at least an integer.
fn at_least_int(sort: &SortExpression) -> SortExpression {
    match numeric_rank(sort) {
        Some(0) | Some(1) => int_sort(),
        _ => sort.clone(),
    }
}

pub fn plus(left: &DataExpression, right: &DataExpression) -> DataExpression {
    apply("+", &[left, right], &plus_sort(&left.sort(), &right.sort()))
}

pub fn minus(left: &DataExpression, right: &DataExpression) -> DataExpression {
    apply("-", &[left, right], &at_least_int(&left.sort()))
}

pub fn times(left: &DataExpression, right: &DataExpression) -> DataExpression {
    apply("*", &[left, right], &left.sort())
}

pub fn negate(expression: &DataExpression) -> DataExpression {
    apply("-", &[expression], &at_least_int(&expression.sort()))
}

pub fn succ(expression: &DataExpression) -> DataExpression {
    let sort = expression.sort();
    let codomain = if numeric_rank(&sort) == Some(1) { pos_sort() } else { sort };
    apply("succ", &[expression], &codomain)
}

pub fn pred(expression: &DataExpression) -> DataExpression {
    let sort = expression.sort();
    let codomain = match numeric_rank(&sort) {
        Some(0) => nat_sort(),
        Some(1) => int_sort(),
        _ => sort,
    };
    apply("pred", &[expression], &codomain)
}

pub fn max(left: &DataExpression, right: &DataExpression) -> DataExpression {
    apply("max", &[left, right], &left.sort())
}

pub fn min(left: &DataExpression, right: &DataExpression) -> DataExpression {
    apply("min", &[left, right], &left.sort())
}

pub(super) fn number_definitions() -> SortDefinitions {
    let boolean = bool_sort();
    let pos = pos_sort();
    let nat = nat_sort();
    let int = int_sort();
    let real = real_sort();

    let constructors = vec![
        function_symbol("@c1", &[], &pos),
        function_symbol("@cDub", &[&boolean, &pos], &pos),
        function_symbol("@c0", &[], &nat),
        function_symbol("@cNat", &[&pos], &nat),
        function_symbol("@cInt", &[&nat], &int),
        function_symbol("@cNeg", &[&pos], &int),
        function_symbol("@cReal", &[&int, &pos], &real),
    ];

    let mut mappings = Vec::new();
    for sort in [&pos, &nat, &int, &real] {
        mappings.push(function_symbol("max", &[sort, sort], sort));
        mappings.push(function_symbol("min", &[sort, sort], sort));
    }

    for (name, domain, codomain) in [
        // Pos
        ("succ", vec![&pos], &pos),
        ("pred", vec![&pos], &nat),
        ("@addc", vec![&boolean, &pos, &pos], &pos),
        ("+", vec![&pos, &pos], &pos),
        ("+", vec![&pos, &nat], &pos),
        ("+", vec![&nat, &pos], &pos),
        ("*", vec![&pos, &pos], &pos),
        ("-", vec![&pos], &int),
        ("-", vec![&pos, &pos], &int),
        ("div", vec![&pos, &pos], &nat),
        ("mod", vec![&pos, &pos], &nat),
        ("exp", vec![&pos, &nat], &pos),
        ("Pos2Nat", vec![&pos], &nat),
        ("Pos2Int", vec![&pos], &int),
        ("Pos2Real", vec![&pos], &real),
        ("@pdiv", vec![&pos, &pos], &nat),
        ("@pmod", vec![&pos, &pos], &nat),
        ("@pmonus", vec![&pos, &pos], &nat),
        ("@gcd", vec![&pos, &pos], &pos),
        ("@gcdn", vec![&pos, &nat], &pos),
        // Nat
        ("succ", vec![&nat], &pos),
        ("pred", vec![&nat], &int),
        ("@dub", vec![&boolean, &nat], &nat),
        ("+", vec![&nat, &nat], &nat),
        ("*", vec![&nat, &nat], &nat),
        ("-", vec![&nat], &int),
        ("-", vec![&nat, &nat], &int),
        ("div", vec![&nat, &pos], &nat),
        ("mod", vec![&nat, &pos], &nat),
        ("exp", vec![&nat, &nat], &nat),
        ("@monus", vec![&nat, &nat], &nat),
        ("@minus", vec![&nat, &nat], &int),
        ("@pmodstep", vec![&nat, &pos], &nat),
        ("Nat2Pos", vec![&nat], &pos),
        ("Nat2Int", vec![&nat], &int),
        ("Nat2Real", vec![&nat], &real),
        // Int
        ("abs", vec![&int], &nat),
        ("-", vec![&int], &int),
        ("succ", vec![&int], &int),
        ("pred", vec![&int], &int),
        ("+", vec![&int, &int], &int),
        ("-", vec![&int, &int], &int),
        ("*", vec![&int, &int], &int),
        ("div", vec![&int, &pos], &int),
        ("mod", vec![&int, &pos], &nat),
        ("exp", vec![&int, &nat], &int),
        ("Int2Pos", vec![&int], &pos),
        ("Int2Nat", vec![&int], &nat),
        ("Int2Real", vec![&int], &real),
        // Real
        ("abs", vec![&real], &real),
        ("-", vec![&real], &real),
        ("succ", vec![&real], &real),
        ("pred", vec![&real], &real),
        ("+", vec![&real, &real], &real),
        ("-", vec![&real, &real], &real),
        ("*", vec![&real, &real], &real),
        ("/", vec![&real, &real], &real),
        ("/", vec![&int, &int], &real),
        ("floor", vec![&real], &int),
        ("ceil", vec![&real], &int),
        ("round", vec![&real], &int),
        ("Real2Pos", vec![&real], &pos),
        ("Real2Nat", vec![&real], &nat),
        ("Real2Int", vec![&real], &int),
        ("@redfrac", vec![&int, &pos], &real),
        ("@redfracg", vec![&int, &pos, &pos], &real),
        ("@divide", vec![&int, &int], &real),
    ] {
        mappings.push(function_symbol(name, &domain, codomain));
    }

    let mut equations = Vec::new();
    equations.extend(pos_equations());
    equations.extend(nat_equations());
    equations.extend(int_equations());
    equations.extend(real_equations());

    for sort in [&pos, &nat, &int, &real] {
        let u = variable("u", sort);
        let v = variable("v", sort);
        equations.push(equation(max(&u, &v), if_(&less_equal(&u, &v), &v, &u)));
        equations.push(equation(min(&u, &v), if_(&less_equal(&u, &v), &u, &v)));
    }

    SortDefinitions {
        constructors,
        mappings,
        equations,
    }
}

fn pos_equations() -> Vec<crate::data::DataEquation> {
    let boolean = bool_sort();
    let pos = pos_sort();
    let nat = nat_sort();
    let int = int_sort();
    let real = real_sort();

    let b = variable("b", &boolean);
    let c = variable("c", &boolean);
    let p = variable("p", &pos);
    let q = variable("q", &pos);
    let n = variable("n", &nat);
    let one = c1();
    let t = true_();
    let f = false_();

    let addc = |carry: &DataExpression, left: &DataExpression, right: &DataExpression| {
        apply("@addc", &[carry, left, right], &pos)
    };
    let pdiv = |left: &DataExpression, right: &DataExpression| apply("@pdiv", &[left, right], &nat);
    let pmod = |left: &DataExpression, right: &DataExpression| apply("@pmod", &[left, right], &nat);
    let pmonus = |left: &DataExpression, right: &DataExpression| apply("@pmonus", &[left, right], &nat);
    let dub = |bit: &DataExpression, natural: &DataExpression| apply("@dub", &[bit, natural], &nat);
    let pmodstep = |natural: &DataExpression, positive: &DataExpression| apply("@pmodstep", &[natural, positive], &nat);

    let d = variable("d", &boolean);
    vec![
        equation(equal_to(&one, &cdub(&b, &p)), f.clone()),
        equation(equal_to(&cdub(&b, &p), &one), f.clone()),
        equation(
            equal_to(&cdub(&b, &p), &cdub(&c, &q)),
            and(&equal_to(&b, &c), &equal_to(&p, &q)),
        ),
        equation(less_equal(&one, &p), t.clone()),
        equation(less_equal(&cdub(&b, &p), &one), f.clone()),
        equation(
            less_equal(&cdub(&b, &p), &cdub(&c, &q)),
            if_(&implies(&b, &c), &less_equal(&p, &q), &less(&p, &q)),
        ),
        equation(less(&p, &one), f.clone()),
        equation(less(&one, &cdub(&b, &p)), t.clone()),
        equation(
            less(&cdub(&b, &p), &cdub(&c, &q)),
            if_(&implies(&c, &b), &less(&p, &q), &less_equal(&p, &q)),
        ),
        // Successor and predecessor.
        equation(succ(&one), cdub(&f, &one)),
        equation(succ(&cdub(&f, &p)), cdub(&t, &p)),
        equation(succ(&cdub(&t, &p)), cdub(&f, &succ(&p))),
        equation(pred(&one), c0()),
        equation(pred(&cdub(&t, &p)), cnat(&cdub(&f, &p))),
        equation(pred(&cdub(&f, &p)), dub(&t, &pred(&p))),
        // Addition with carry.
        equation(addc(&f, &one, &p), succ(&p)),
        equation(addc(&t, &one, &p), succ(&succ(&p))),
        equation(addc(&f, &p, &one), succ(&p)),
        equation(addc(&t, &p, &one), succ(&succ(&p))),
        equation(
            addc(&b, &cdub(&c, &p), &cdub(&d, &q)),
            cdub(
                &equal_to(&b, &equal_to(&c, &d)),
                &addc(&if_(&b, &super::or(&c, &d), &and(&c, &d)), &p, &q),
            ),
        ),
        equation(plus(&p, &q), addc(&f, &p, &q)),
        equation(plus(&p, &c0()), p.clone()),
        equation(plus(&p, &cnat(&q)), addc(&f, &p, &q)),
        equation(plus(&c0(), &p), p.clone()),
        equation(plus(&cnat(&p), &q), addc(&f, &p, &q)),
        // Multiplication.
        equation(times(&one, &p), p.clone()),
        equation(times(&p, &one), p.clone()),
        equation(times(&cdub(&f, &p), &q), cdub(&f, &times(&p, &q))),
        equation(times(&p, &cdub(&f, &q)), cdub(&f, &times(&p, &q))),
        equation(
            times(&cdub(&t, &p), &cdub(&t, &q)),
            cdub(&t, &addc(&f, &p, &addc(&f, &q, &cdub(&f, &times(&p, &q))))),
        ),
        // Conversions and negation.
        equation(apply("Pos2Nat", &[&p], &nat), cnat(&p)),
        equation(apply("Pos2Int", &[&p], &int), cint(&cnat(&p))),
        equation(apply("Pos2Real", &[&p], &real), creal(&cint(&cnat(&p)), &one)),
        equation(negate(&p), cneg(&p)),
        equation(minus(&p, &q), apply("@minus", &[&cnat(&p), &cnat(&q)], &int)),
        // Subtraction that is zero when the result would be negative.
        conditional_equation(less_equal(&p, &q), pmonus(&p, &q), c0()),
        equation(pmonus(&p, &one), pred(&p)),
        conditional_equation(
            less(&cdub(&c, &q), &cdub(&b, &p)),
            pmonus(&cdub(&b, &p), &cdub(&c, &q)),
            if_(
                &implies(&c, &b),
                &dub(&and(&b, &not(&c)), &pmonus(&p, &q)),
                &dub(&t, &pmonus(&p, &succ(&q))),
            ),
        ),
        // Division by long division.
        equation(apply("div", &[&p, &q], &nat), pdiv(&p, &q)),
        equation(apply("mod", &[&p, &q], &nat), pmod(&p, &q)),
        equation(pdiv(&one, &one), cnat(&one)),
        equation(pdiv(&one, &cdub(&b, &q)), c0()),
        equation(
            pdiv(&cdub(&b, &p), &q),
            dub(&less_equal(&cnat(&q), &dub(&b, &pmod(&p, &q))), &pdiv(&p, &q)),
        ),
        equation(pmod(&one, &one), c0()),
        equation(pmod(&one, &cdub(&b, &q)), cnat(&one)),
        equation(pmod(&cdub(&b, &p), &q), pmodstep(&dub(&b, &pmod(&p, &q)), &q)),
        conditional_equation(
            less_equal(&cnat(&q), &n),
            pmodstep(&n, &q),
            apply("@monus", &[&n, &cnat(&q)], &nat),
        ),
        conditional_equation(less(&n, &cnat(&q)), pmodstep(&n, &q), n.clone()),
        // Greatest common divisor.
        equation(
            apply("@gcd", &[&p, &q], &pos),
            apply("@gcdn", &[&p, &cnat(&q)], &pos),
        ),
        equation(apply("@gcdn", &[&p, &c0()], &pos), p.clone()),
        equation(
            apply("@gcdn", &[&p, &cnat(&q)], &pos),
            apply("@gcdn", &[&q, &pmod(&p, &q)], &pos),
        ),
        // Exponentiation.
        equation(apply("exp", &[&p, &c0()], &pos), one.clone()),
        equation(
            apply("exp", &[&p, &cnat(&q)], &pos),
            times(&p, &apply("exp", &[&p, &pred(&q)], &pos)),
        ),
    ]
}

fn nat_equations() -> Vec<crate::data::DataEquation> {
    let boolean = bool_sort();
    let pos = pos_sort();
    let nat = nat_sort();
    let int = int_sort();
    let real = real_sort();

    let b = variable("b", &boolean);
    let p = variable("p", &pos);
    let q = variable("q", &pos);
    let m = variable("m", &nat);
    let n = variable("n", &nat);
    let zero = c0();
    let one = c1();
    let t = true_();
    let f = false_();

    let dub = |bit: &DataExpression, natural: &DataExpression| apply("@dub", &[bit, natural], &nat);
    let monus = |left: &DataExpression, right: &DataExpression| apply("@monus", &[left, right], &nat);
    let minus_nat = |left: &DataExpression, right: &DataExpression| apply("@minus", &[left, right], &int);

    vec![
        equation(equal_to(&zero, &cnat(&p)), f.clone()),
        equation(equal_to(&cnat(&p), &zero), f.clone()),
        equation(equal_to(&cnat(&p), &cnat(&q)), equal_to(&p, &q)),
        equation(less_equal(&zero, &n), t.clone()),
        equation(less_equal(&cnat(&p), &zero), f.clone()),
        equation(less_equal(&cnat(&p), &cnat(&q)), less_equal(&p, &q)),
        equation(less(&n, &zero), f.clone()),
        equation(less(&zero, &cnat(&p)), t.clone()),
        equation(less(&cnat(&p), &cnat(&q)), less(&p, &q)),
        // Conversions.
        equation(apply("Nat2Pos", &[&cnat(&p)], &pos), p.clone()),
        equation(apply("Nat2Int", &[&n], &int), cint(&n)),
        equation(apply("Nat2Real", &[&n], &real), creal(&cint(&n), &one)),
        // Successor and predecessor.
        equation(succ(&zero), one.clone()),
        equation(succ(&cnat(&p)), succ(&p)),
        equation(pred(&zero), cneg(&one)),
        equation(pred(&cnat(&p)), cint(&pred(&p))),
        // Doubling.
        equation(dub(&f, &zero), zero.clone()),
        equation(dub(&t, &zero), cnat(&one)),
        equation(dub(&b, &cnat(&p)), cnat(&cdub(&b, &p))),
        // Addition and multiplication.
        equation(plus(&zero, &n), n.clone()),
        equation(plus(&n, &zero), n.clone()),
        equation(
            plus(&cnat(&p), &cnat(&q)),
            cnat(&apply("@addc", &[&f, &p, &q], &pos)),
        ),
        equation(times(&zero, &n), zero.clone()),
        equation(times(&n, &zero), zero.clone()),
        equation(times(&cnat(&p), &cnat(&q)), cnat(&times(&p, &q))),
        // Negation and subtraction.
        equation(negate(&zero), cint(&zero)),
        equation(negate(&cnat(&p)), cneg(&p)),
        equation(minus(&m, &n), minus_nat(&m, &n)),
        equation(monus(&n, &zero), n.clone()),
        equation(monus(&zero, &cnat(&p)), zero.clone()),
        equation(
            monus(&cnat(&p), &cnat(&q)),
            apply("@pmonus", &[&p, &q], &nat),
        ),
        conditional_equation(less_equal(&n, &m), minus_nat(&m, &n), cint(&monus(&m, &n))),
        conditional_equation(less(&m, &n), minus_nat(&m, &n), negate(&monus(&n, &m))),
        // Division.
        equation(apply("div", &[&zero, &p], &nat), zero.clone()),
        equation(
            apply("div", &[&cnat(&p), &q], &nat),
            apply("@pdiv", &[&p, &q], &nat),
        ),
        equation(apply("mod", &[&zero, &p], &nat), zero.clone()),
        equation(
            apply("mod", &[&cnat(&p), &q], &nat),
            apply("@pmod", &[&p, &q], &nat),
        ),
        // Exponentiation.
        equation(apply("exp", &[&n, &zero], &nat), cnat(&one)),
        equation(
            apply("exp", &[&n, &cnat(&p)], &nat),
            times(&n, &apply("exp", &[&n, &pred(&p)], &nat)),
        ),
    ]
}

fn int_equations() -> Vec<crate::data::DataEquation> {
    let pos = pos_sort();
    let nat = nat_sort();
    let int = int_sort();
    let real = real_sort();

    let p = variable("p", &pos);
    let q = variable("q", &pos);
    let m = variable("m", &nat);
    let n = variable("n", &nat);
    let x = variable("x", &int);
    let y = variable("y", &int);
    let zero = c0();
    let one = c1();
    let t = true_();
    let f = false_();

    let minus_nat = |left: &DataExpression, right: &DataExpression| apply("@minus", &[left, right], &int);

    vec![
        equation(equal_to(&cint(&m), &cint(&n)), equal_to(&m, &n)),
        equation(equal_to(&cint(&n), &cneg(&p)), f.clone()),
        equation(equal_to(&cneg(&p), &cint(&n)), f.clone()),
        equation(equal_to(&cneg(&p), &cneg(&q)), equal_to(&p, &q)),
        equation(less_equal(&cint(&m), &cint(&n)), less_equal(&m, &n)),
        equation(less_equal(&cint(&n), &cneg(&p)), f.clone()),
        equation(less_equal(&cneg(&p), &cint(&n)), t.clone()),
        equation(less_equal(&cneg(&p), &cneg(&q)), less_equal(&q, &p)),
        equation(less(&cint(&m), &cint(&n)), less(&m, &n)),
        equation(less(&cint(&n), &cneg(&p)), f.clone()),
        equation(less(&cneg(&p), &cint(&n)), t.clone()),
        equation(less(&cneg(&p), &cneg(&q)), less(&q, &p)),
        // Conversions.
        equation(apply("Int2Nat", &[&cint(&n)], &nat), n.clone()),
        equation(
            apply("Int2Pos", &[&cint(&n)], &pos),
            apply("Nat2Pos", &[&n], &pos),
        ),
        equation(apply("Int2Real", &[&x], &real), creal(&x, &one)),
        // Negation, absolute value, successor and predecessor.
        equation(negate(&cint(&n)), negate(&n)),
        equation(negate(&cneg(&p)), cint(&cnat(&p))),
        equation(apply("abs", &[&cint(&n)], &nat), n.clone()),
        equation(apply("abs", &[&cneg(&p)], &nat), cnat(&p)),
        equation(succ(&cint(&n)), cint(&cnat(&succ(&n)))),
        equation(succ(&cneg(&p)), negate(&pred(&p))),
        equation(pred(&cint(&n)), pred(&n)),
        equation(pred(&cneg(&p)), cneg(&succ(&p))),
        // Addition, subtraction and multiplication.
        equation(plus(&cint(&m), &cint(&n)), cint(&plus(&m, &n))),
        equation(plus(&cint(&m), &cneg(&p)), minus_nat(&m, &cnat(&p))),
        equation(plus(&cneg(&p), &cint(&m)), minus_nat(&m, &cnat(&p))),
        equation(
            plus(&cneg(&p), &cneg(&q)),
            cneg(&apply("@addc", &[&f, &p, &q], &pos)),
        ),
        equation(minus(&x, &y), plus(&x, &negate(&y))),
        equation(times(&cint(&m), &cint(&n)), cint(&times(&m, &n))),
        equation(times(&cint(&m), &cneg(&p)), negate(&times(&m, &cnat(&p)))),
        equation(times(&cneg(&p), &cint(&m)), negate(&times(&cnat(&p), &m))),
        equation(times(&cneg(&p), &cneg(&q)), cint(&cnat(&times(&p, &q)))),
        // Division rounds towards negative infinity.
        equation(
            apply("div", &[&cint(&n), &p], &int),
            cint(&apply("div", &[&n, &p], &nat)),
        ),
        equation(
            apply("div", &[&cneg(&p), &q], &int),
            cneg(&succ(&apply("div", &[&pred(&p), &q], &nat))),
        ),
        equation(
            apply("mod", &[&cint(&n), &p], &nat),
            apply("mod", &[&n, &p], &nat),
        ),
        equation(
            apply("mod", &[&cneg(&p), &q], &nat),
            apply(
                "@monus",
                &[&cnat(&q), &cnat(&succ(&apply("mod", &[&pred(&p), &q], &nat)))],
                &nat,
            ),
        ),
        // Exponentiation.
        equation(apply("exp", &[&x, &zero], &int), cint(&cnat(&one))),
        equation(
            apply("exp", &[&x, &cnat(&p)], &int),
            times(&x, &apply("exp", &[&x, &pred(&p)], &int)),
        ),
    ]
}

fn real_equations() -> Vec<crate::data::DataEquation> {
    let pos = pos_sort();
    let nat = nat_sort();
    let int = int_sort();
    let real = real_sort();

    let p = variable("p", &pos);
    let q = variable("q", &pos);
    let k = variable("k", &pos);
    let x = variable("x", &int);
    let y = variable("y", &int);
    let r = variable("r", &real);
    let s = variable("s", &real);
    let zero = c0();
    let one = c1();
    let f = false_();

    let as_int = |positive: &DataExpression| cint(&cnat(positive));
    let redfrac = |numerator: &DataExpression, denominator: &DataExpression| {
        apply("@redfrac", &[numerator, denominator], &real)
    };
    let redfracg = |numerator: &DataExpression, denominator: &DataExpression, divisor: &DataExpression| {
        apply("@redfracg", &[numerator, denominator, divisor], &real)
    };
    let divide = |numerator: &DataExpression, denominator: &DataExpression| {
        apply("@divide", &[numerator, denominator], &real)
    };
    let gcd = |left: &DataExpression, right: &DataExpression| apply("@gcd", &[left, right], &pos);
    let floor = |value: &DataExpression| apply("floor", &[value], &int);

    let half = creal(&as_int(&one), &cdub(&f, &one));

    vec![
        equation(
            equal_to(&creal(&x, &p), &creal(&y, &q)),
            and(&equal_to(&x, &y), &equal_to(&p, &q)),
        ),
        equation(
            less_equal(&creal(&x, &p), &creal(&y, &q)),
            less_equal(&times(&x, &as_int(&q)), &times(&y, &as_int(&p))),
        ),
        equation(
            less(&creal(&x, &p), &creal(&y, &q)),
            less(&times(&x, &as_int(&q)), &times(&y, &as_int(&p))),
        ),
        // Conversions.
        equation(apply("Real2Int", &[&creal(&x, &one)], &int), x.clone()),
        equation(
            apply("Real2Nat", &[&creal(&x, &one)], &nat),
            apply("Int2Nat", &[&x], &nat),
        ),
        equation(
            apply("Real2Pos", &[&creal(&x, &one)], &pos),
            apply("Int2Pos", &[&x], &pos),
        ),
        // Arithmetic on fractions.
        equation(negate(&creal(&x, &p)), creal(&negate(&x), &p)),
        equation(
            apply("abs", &[&creal(&x, &p)], &real),
            creal(&cint(&apply("abs", &[&x], &nat)), &p),
        ),
        equation(succ(&r), plus(&r, &creal(&as_int(&one), &one))),
        equation(pred(&r), plus(&r, &creal(&cneg(&one), &one))),
        equation(
            plus(&creal(&x, &p), &creal(&y, &q)),
            redfrac(
                &plus(&times(&x, &as_int(&q)), &times(&y, &as_int(&p))),
                &times(&p, &q),
            ),
        ),
        equation(minus(&r, &s), plus(&r, &negate(&s))),
        equation(
            times(&creal(&x, &p), &creal(&y, &q)),
            redfrac(&times(&x, &y), &times(&p, &q)),
        ),
        equation(
            apply("/", &[&creal(&x, &p), &creal(&y, &q)], &real),
            divide(&times(&x, &as_int(&q)), &times(&y, &as_int(&p))),
        ),
        equation(apply("/", &[&x, &y], &real), divide(&x, &y)),
        // Normalisation of fractions, the division by zero remains stuck.
        equation(divide(&x, &as_int(&p)), redfrac(&x, &p)),
        equation(divide(&x, &cneg(&p)), redfrac(&negate(&x), &p)),
        equation(redfrac(&cint(&zero), &p), creal(&cint(&zero), &one)),
        equation(
            redfrac(&as_int(&q), &p),
            redfracg(&as_int(&q), &p, &gcd(&q, &p)),
        ),
        equation(redfrac(&cneg(&q), &p), redfracg(&cneg(&q), &p, &gcd(&q, &p))),
        equation(
            redfracg(&x, &p, &k),
            creal(
                &apply("div", &[&x, &k], &int),
                &apply("Nat2Pos", &[&apply("div", &[&cnat(&p), &k], &nat)], &pos),
            ),
        ),
        // Rounding.
        equation(floor(&creal(&x, &p)), apply("div", &[&x, &p], &int)),
        equation(apply("ceil", &[&r], &int), negate(&floor(&negate(&r)))),
        equation(apply("round", &[&r], &int), floor(&plus(&r, &half))),
    ]
}

#[cfg(test)]
mod tests {
    use test_case::test_case;
    use test_log::test;

    use super::*;

    #[test_case("0", "Nat", "0" ; "zero")]
    #[test_case("12", "Pos", "12" ; "positive")]
    #[test_case("18446744073709551617", "Int", "18446744073709551617" ; "beyond 64 bits")]
    fn test_number_literals(digits: &str, sort: &str, expected: &str) {
        let literal = number(digits, &SortExpression::basic(sort)).unwrap();
        assert_eq!(literal.to_string(), expected);
    }

    #[test]
    fn test_small_literals() {
        assert_eq!(pos(6).to_string(), "6");
        assert_eq!(int(-3).to_string(), "-3");
        assert_eq!(real(6, 8).to_string(), "3/4");
        assert_eq!(real(0, 5).to_string(), "0");
        assert!(number("0", &pos_sort()).is_none());
    }

    #[test]
    fn test_conversions() {
        let p = variable("p", &pos_sort());
        assert_eq!(convert(&p, &int_sort()).unwrap().sort(), int_sort());
        assert!(convert(&p, &bool_sort()).is_none());
        assert!(convert(&variable("x", &int_sort()), &nat_sort()).is_none());
    }

    #[test]
    fn test_operation_sorts() {
        let p = variable("p", &pos_sort());
        let n = variable("n", &nat_sort());
        assert_eq!(plus(&n, &p).sort(), pos_sort());
        assert_eq!(minus(&n, &n).sort(), int_sort());
        assert_eq!(succ(&n).sort(), pos_sort());
        assert_eq!(pred(&p).sort(), nat_sort());
    }
}
