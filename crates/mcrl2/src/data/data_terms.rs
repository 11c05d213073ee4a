use std::fmt;

use mcrl2_macros::mcrl2_derive_terms;

use crate::aterm::create_constant;
use crate::aterm::create_term;
use crate::aterm::ATerm;
use crate::aterm::ATermArgs;
use crate::aterm::ATermList;
use crate::aterm::ATermRef;
use crate::aterm::ATermTrait;
use crate::aterm::SymbolTrait;
use crate::data::print::write_data_expression;
use crate::data::standard::bool_sort;
use crate::data::ContainerKind;
use crate::data::SortExpression;

const DATA_VARIABLE: &str = "DataVarId";
const DATA_FUNCTION_SYMBOL: &str = "OpId";
const DATA_APPLICATION: &str = "DataAppl";
const DATA_ABSTRACTION: &str = "Binder";
const DATA_WHERE_CLAUSE: &str = "Whr";
const DATA_ASSIGNMENT: &str = "DataVarIdInit";
const UNTYPED_IDENTIFIER: &str = "UntypedIdentifier";

fn has_head(term: &ATermRef<'_>, name: &str, arity: usize) -> bool {
    let symbol = term.get_head_symbol();
    symbol.arity() == arity && symbol.name() == name
}

pub fn is_data_variable(term: &ATermRef<'_>) -> bool {
    has_head(term, DATA_VARIABLE, 2)
}

pub fn is_data_function_symbol(term: &ATermRef<'_>) -> bool {
    has_head(term, DATA_FUNCTION_SYMBOL, 2)
}

pub fn is_data_application(term: &ATermRef<'_>) -> bool {
    let symbol = term.get_head_symbol();
    symbol.arity() >= 2 && symbol.name() == DATA_APPLICATION
}

pub fn is_data_abstraction(term: &ATermRef<'_>) -> bool {
    has_head(term, DATA_ABSTRACTION, 3)
}

pub fn is_data_where_clause(term: &ATermRef<'_>) -> bool {
    has_head(term, DATA_WHERE_CLAUSE, 2)
}

pub fn is_data_assignment(term: &ATermRef<'_>) -> bool {
    has_head(term, DATA_ASSIGNMENT, 2)
}

pub fn is_untyped_identifier(term: &ATermRef<'_>) -> bool {
    has_head(term, UNTYPED_IDENTIFIER, 1)
}

pub fn is_data_expression(term: &ATermRef<'_>) -> bool {
    is_data_variable(term)
        || is_data_function_symbol(term)
        || is_data_application(term)
        || is_data_abstraction(term)
        || is_data_where_clause(term)
        || is_untyped_identifier(term)
}

/// The binders of an abstraction.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum BinderKind {
    Forall,
    Exists,
    Lambda,
    SetComprehension,
    BagComprehension,
    /// A comprehension whose body has not been type checked yet.
    UntypedSetBagComprehension,
}

impl BinderKind {
    fn symbol_name(&self) -> &'static str {
        match self {
            BinderKind::Forall => "Forall",
            BinderKind::Exists => "Exists",
            BinderKind::Lambda => "Lambda",
            BinderKind::SetComprehension => "SetComp",
            BinderKind::BagComprehension => "BagComp",
            BinderKind::UntypedSetBagComprehension => "UntypedSetBagComp",
        }
    }

    fn from_symbol_name(name: &str) -> BinderKind {
        match name {
            "Forall" => BinderKind::Forall,
            "Exists" => BinderKind::Exists,
            "Lambda" => BinderKind::Lambda,
            "SetComp" => BinderKind::SetComprehension,
            "BagComp" => BinderKind::BagComprehension,
            "UntypedSetBagComp" => BinderKind::UntypedSetBagComprehension,
            _ => unreachable!("{name} is not a binder"),
        }
    }
}

/// Computes the sort of a data expression from the sorts stored in the term.
fn data_sort(term: &ATermRef<'_>) -> SortExpression {
    if is_data_variable(term) || is_data_function_symbol(term) {
        term.arg(1).protect().into()
    } else if is_data_application(term) {
        let head_sort = data_sort(&term.arg(0));
        if head_sort.is_function_sort() {
            head_sort.codomain()
        } else {
            SortExpression::untyped()
        }
    } else if is_data_abstraction(term) {
        let variables: ATermList<DataVariable> = term.arg(1).into();
        match BinderKind::from_symbol_name(term.arg(0).get_head_symbol().name_ref()) {
            BinderKind::Forall | BinderKind::Exists => bool_sort(),
            BinderKind::Lambda => SortExpression::function(
                variables.iter().map(|variable| variable.sort()).collect(),
                data_sort(&term.arg(2)),
            ),
            BinderKind::SetComprehension => SortExpression::container(ContainerKind::Set, variables.head().sort()),
            BinderKind::BagComprehension => SortExpression::container(ContainerKind::Bag, variables.head().sort()),
            BinderKind::UntypedSetBagComprehension => SortExpression::untyped(),
        }
    } else if is_data_where_clause(term) {
        data_sort(&term.arg(0))
    } else {
        SortExpression::untyped()
    }
}

// This module is only used internally to run the proc macro.
#[mcrl2_derive_terms]
mod inner {
    use super::*;

    /// A data expression that can be any of the variants of the data
    /// language. The sort of every data expression is stored in its term.
    #[mcrl2_term(is_data_expression)]
    #[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
    pub struct DataExpression {
        pub(crate) term: ATerm,
    }

    impl DataExpression {
        pub fn is_variable(&self) -> bool {
            is_data_variable(&self.term.copy())
        }

        pub fn is_function_symbol(&self) -> bool {
            is_data_function_symbol(&self.term.copy())
        }

        pub fn is_application(&self) -> bool {
            is_data_application(&self.term.copy())
        }

        pub fn is_abstraction(&self) -> bool {
            is_data_abstraction(&self.term.copy())
        }

        pub fn is_where_clause(&self) -> bool {
            is_data_where_clause(&self.term.copy())
        }

        pub fn is_untyped_identifier(&self) -> bool {
            is_untyped_identifier(&self.term.copy())
        }

        /// Returns the sort of this expression.
        pub fn sort(&self) -> SortExpression {
            data_sort(&self.term.copy())
        }

        /// Returns the name of a variable, function symbol or untyped identifier.
        pub fn name(&self) -> &str {
            debug_assert!(
                self.is_variable() || self.is_function_symbol() || self.is_untyped_identifier(),
                "{} has no name",
                self
            );
            self.term.arg(0).get_head_symbol().name_ref()
        }

        /// Returns the head of an application.
        pub fn head(&self) -> DataExpression {
            debug_assert!(self.is_application(), "{} is not an application", self);
            self.term.arg(0).protect().into()
        }

        /// Returns the arguments of an application.
        pub fn arguments(&self) -> ATermArgs<'_> {
            debug_assert!(self.is_application(), "{} is not an application", self);
            let mut arguments = self.term.arguments();
            arguments.next();
            arguments
        }

        /// Returns the indexed argument of an application.
        pub fn argument(&self, index: usize) -> DataExpression {
            debug_assert!(self.is_application(), "{} is not an application", self);
            self.term.arg(index + 1).protect().into()
        }

        /// Returns the number of arguments of an application, and zero otherwise.
        pub fn arity(&self) -> usize {
            if self.is_application() {
                self.term.get_head_symbol().arity() - 1
            } else {
                0
            }
        }

        /// Returns the function symbol at the innermost head position, i.e., `f`
        /// for both `f` and `f(a)(b)`.
        pub fn head_symbol(&self) -> Option<DataFunctionSymbol> {
            let mut term = self.term.copy().protect();
            while is_data_application(&term.copy()) {
                term = term.arg(0).protect();
            }

            if is_data_function_symbol(&term.copy()) {
                Some(term.into())
            } else {
                None
            }
        }

        /// Returns true iff this is the function symbol with the given name.
        pub fn is_symbol(&self, name: &str) -> bool {
            self.is_function_symbol() && self.name() == name
        }

        /// Returns true iff this is an application of the function symbol with
        /// the given name to the given number of arguments.
        pub fn is_application_of(&self, name: &str, arity: usize) -> bool {
            self.is_application() && self.arity() == arity && {
                let head = self.term.arg(0);
                is_data_function_symbol(&head) && head.arg(0).get_head_symbol().name_ref() == name
            }
        }
    }

    impl fmt::Display for DataExpression {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_data_expression(f, &self.term.copy())
        }
    }

    #[mcrl2_ignore]
    impl DataExpression {
        /// Creates the application `head(arguments)`, for no arguments the head itself
        /// is returned.
        pub fn application(head: &DataExpression, arguments: &[DataExpression]) -> DataExpression {
            if arguments.is_empty() {
                head.clone()
            } else {
                DataApplication::new(head, arguments).into()
            }
        }

        /// Creates an identifier whose meaning is resolved by the type checker.
        pub fn untyped_identifier(name: &str) -> DataExpression {
            create_term(UNTYPED_IDENTIFIER, &[create_constant(name)]).into()
        }
    }

    /// A variable `name: sort`.
    #[mcrl2_term(is_data_variable)]
    #[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
    pub struct DataVariable {
        pub(crate) term: ATerm,
    }

    impl DataVariable {
        pub fn name(&self) -> &str {
            self.term.arg(0).get_head_symbol().name_ref()
        }

        pub fn sort(&self) -> SortExpression {
            self.term.arg(1).protect().into()
        }
    }

    impl fmt::Display for DataVariable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.name())
        }
    }

    #[mcrl2_ignore]
    impl DataVariable {
        pub fn new(name: &str, sort: SortExpression) -> DataVariable {
            create_term(DATA_VARIABLE, &[create_constant(name), sort.into()]).into()
        }
    }

    /// A function symbol `name: sort`, function symbols with the same name can
    /// be distinguished by their sorts.
    #[mcrl2_term(is_data_function_symbol)]
    #[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
    pub struct DataFunctionSymbol {
        pub(crate) term: ATerm,
    }

    impl DataFunctionSymbol {
        pub fn name(&self) -> &str {
            self.term.arg(0).get_head_symbol().name_ref()
        }

        pub fn sort(&self) -> SortExpression {
            self.term.arg(1).protect().into()
        }
    }

    impl fmt::Display for DataFunctionSymbol {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_data_expression(f, &self.term.copy())
        }
    }

    #[mcrl2_ignore]
    impl DataFunctionSymbol {
        pub fn new(name: &str, sort: SortExpression) -> DataFunctionSymbol {
            create_term(DATA_FUNCTION_SYMBOL, &[create_constant(name), sort.into()]).into()
        }
    }

    /// The application `head(arguments)` with at least one argument.
    #[mcrl2_term(is_data_application)]
    #[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
    pub struct DataApplication {
        pub(crate) term: ATerm,
    }

    impl DataApplication {
        pub fn head(&self) -> DataExpression {
            self.term.arg(0).protect().into()
        }

        pub fn arguments(&self) -> ATermArgs<'_> {
            let mut arguments = self.term.arguments();
            arguments.next();
            arguments
        }
    }

    impl fmt::Display for DataApplication {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_data_expression(f, &self.term.copy())
        }
    }

    #[mcrl2_ignore]
    impl DataApplication {
        pub fn new(head: &DataExpression, arguments: &[DataExpression]) -> DataApplication {
            debug_assert!(!arguments.is_empty(), "An application has at least one argument");

            let mut terms: Vec<ATerm> = Vec::with_capacity(arguments.len() + 1);
            terms.push(head.term.clone());
            terms.extend(arguments.iter().map(|argument| argument.term.clone()));
            create_term(DATA_APPLICATION, &terms).into()
        }
    }

    /// A binder applied to a list of variables and a body, e.g. `forall x: S. body`.
    #[mcrl2_term(is_data_abstraction)]
    #[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
    pub struct DataAbstraction {
        pub(crate) term: ATerm,
    }

    impl DataAbstraction {
        pub fn binder(&self) -> BinderKind {
            BinderKind::from_symbol_name(self.term.arg(0).get_head_symbol().name_ref())
        }

        pub fn variables(&self) -> ATermList<DataVariable> {
            self.term.arg(1).protect().into()
        }

        pub fn body(&self) -> DataExpression {
            self.term.arg(2).protect().into()
        }
    }

    impl fmt::Display for DataAbstraction {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_data_expression(f, &self.term.copy())
        }
    }

    #[mcrl2_ignore]
    impl DataAbstraction {
        pub fn new(binder: BinderKind, variables: Vec<DataVariable>, body: DataExpression) -> DataAbstraction {
            debug_assert!(!variables.is_empty(), "An abstraction binds at least one variable");

            let variables: ATermList<DataVariable> = ATermList::new(variables);
            create_term(
                DATA_ABSTRACTION,
                &[create_constant(binder.symbol_name()), variables.into(), body.into()],
            )
            .into()
        }
    }

    /// The expression `body whr x = e, ... end`.
    #[mcrl2_term(is_data_where_clause)]
    #[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
    pub struct DataWhereClause {
        pub(crate) term: ATerm,
    }

    impl DataWhereClause {
        pub fn body(&self) -> DataExpression {
            self.term.arg(0).protect().into()
        }

        pub fn assignments(&self) -> ATermList<DataAssignment> {
            self.term.arg(1).protect().into()
        }
    }

    impl fmt::Display for DataWhereClause {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_data_expression(f, &self.term.copy())
        }
    }

    #[mcrl2_ignore]
    impl DataWhereClause {
        pub fn new(body: DataExpression, assignments: Vec<DataAssignment>) -> DataWhereClause {
            let assignments: ATermList<DataAssignment> = ATermList::new(assignments);
            create_term(DATA_WHERE_CLAUSE, &[body.into(), assignments.into()]).into()
        }
    }

    /// The assignment `variable = expression` of a where clause.
    #[mcrl2_term(is_data_assignment)]
    #[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
    pub struct DataAssignment {
        pub(crate) term: ATerm,
    }

    impl DataAssignment {
        pub fn lhs(&self) -> DataVariable {
            self.term.arg(0).protect().into()
        }

        pub fn rhs(&self) -> DataExpression {
            self.term.arg(1).protect().into()
        }
    }

    impl fmt::Display for DataAssignment {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{} = {}", self.lhs(), self.rhs())
        }
    }

    #[mcrl2_ignore]
    impl DataAssignment {
        pub fn new(variable: DataVariable, expression: DataExpression) -> DataAssignment {
            create_term(DATA_ASSIGNMENT, &[variable.into(), expression.into()]).into()
        }
    }
}

pub use inner::*;

macro_rules! data_expression_conversions {
    ($name:ident, $name_ref:ident) => {
        impl From<$name> for DataExpression {
            fn from(value: $name) -> Self {
                value.term.into()
            }
        }

        impl From<DataExpression> for $name {
            fn from(value: DataExpression) -> Self {
                value.term.into()
            }
        }

        impl<'a> From<$name_ref<'a>> for DataExpressionRef<'a> {
            fn from(value: $name_ref<'a>) -> Self {
                value.term.into()
            }
        }

        impl<'a> From<DataExpressionRef<'a>> for $name_ref<'a> {
            fn from(value: DataExpressionRef<'a>) -> Self {
                value.term.into()
            }
        }
    };
}

data_expression_conversions!(DataVariable, DataVariableRef);
data_expression_conversions!(DataFunctionSymbol, DataFunctionSymbolRef);
data_expression_conversions!(DataApplication, DataApplicationRef);
data_expression_conversions!(DataAbstraction, DataAbstractionRef);
data_expression_conversions!(DataWhereClause, DataWhereClauseRef);

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::data::standard::nat_sort;

    use super::*;

    #[test]
    fn test_application_sort() {
        let nat = nat_sort();
        let f = DataFunctionSymbol::new("f", SortExpression::function(vec![nat.clone()], bool_sort()));
        let x = DataVariable::new("x", nat.clone());

        let application = DataExpression::application(&f.clone().into(), &[x.clone().into()]);

        assert!(application.is_application());
        assert_eq!(application.sort(), bool_sort());
        assert_eq!(application.arity(), 1);
        assert_eq!(application.head_symbol(), Some(f.clone()));
        assert!(application.is_application_of("f", 1));
        assert_eq!(application.argument(0), DataExpression::from(x.clone()));
        assert_eq!(application.to_string(), "f(x)");
    }

    #[test]
    fn test_abstraction_sort() {
        let nat = nat_sort();
        let x = DataVariable::new("x", nat.clone());
        let lambda = DataAbstraction::new(BinderKind::Lambda, vec![x.clone()], x.clone().into());

        assert_eq!(
            DataExpression::from(lambda.clone()).sort(),
            SortExpression::function(vec![nat.clone()], nat.clone())
        );
        assert_eq!(lambda.binder(), BinderKind::Lambda);

        let forall = DataAbstraction::new(BinderKind::Forall, vec![x.clone()], DataExpression::untyped_identifier("p"));
        assert_eq!(DataExpression::from(forall).sort(), bool_sort());
    }

    #[test]
    fn test_variables_are_shared() {
        let x = DataVariable::new("x", nat_sort());
        let y = DataVariable::new("x", nat_sort());
        assert_eq!(x, y);
        assert_ne!(x, DataVariable::new("x", bool_sort()));
    }
}
