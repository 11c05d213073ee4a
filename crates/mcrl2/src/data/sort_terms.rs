use std::fmt;

use mcrl2_macros::mcrl2_derive_terms;

use crate::aterm::create_constant;
use crate::aterm::create_term;
use crate::aterm::ATerm;
use crate::aterm::ATermList;
use crate::aterm::ATermRef;
use crate::aterm::ATermTrait;
use crate::aterm::SymbolTrait;
use crate::data::print::write_sort;

const BASIC_SORT: &str = "SortId";
const FUNCTION_SORT: &str = "SortArrow";
const CONTAINER_SORT: &str = "SortCons";
const STRUCTURED_SORT: &str = "SortStruct";
const STRUCTURED_SORT_CONSTRUCTOR: &str = "StructCons";
const STRUCTURED_SORT_ARGUMENT: &str = "StructProj";
const UNTYPED_SORT: &str = "UntypedSortUnknown";
const UNTYPED_POSSIBLE_SORTS: &str = "UntypedSortsPossible";

fn has_head(term: &ATermRef<'_>, name: &str, arity: usize) -> bool {
    let symbol = term.get_head_symbol();
    symbol.arity() == arity && symbol.name() == name
}

pub fn is_basic_sort(term: &ATermRef<'_>) -> bool {
    has_head(term, BASIC_SORT, 1)
}

pub fn is_function_sort(term: &ATermRef<'_>) -> bool {
    has_head(term, FUNCTION_SORT, 2)
}

pub fn is_container_sort(term: &ATermRef<'_>) -> bool {
    has_head(term, CONTAINER_SORT, 2)
}

pub fn is_structured_sort(term: &ATermRef<'_>) -> bool {
    has_head(term, STRUCTURED_SORT, 1)
}

pub fn is_untyped_sort(term: &ATermRef<'_>) -> bool {
    has_head(term, UNTYPED_SORT, 0)
}

pub fn is_untyped_possible_sorts(term: &ATermRef<'_>) -> bool {
    has_head(term, UNTYPED_POSSIBLE_SORTS, 1)
}

pub fn is_sort_expression(term: &ATermRef<'_>) -> bool {
    is_basic_sort(term)
        || is_function_sort(term)
        || is_container_sort(term)
        || is_structured_sort(term)
        || is_untyped_sort(term)
        || is_untyped_possible_sorts(term)
}

pub fn is_structured_sort_constructor(term: &ATermRef<'_>) -> bool {
    has_head(term, STRUCTURED_SORT_CONSTRUCTOR, 3)
}

pub fn is_structured_sort_argument(term: &ATermRef<'_>) -> bool {
    has_head(term, STRUCTURED_SORT_ARGUMENT, 2)
}

/// The kinds of container sorts.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContainerKind {
    List,
    Set,
    Bag,
    FSet,
    FBag,
}

impl ContainerKind {
    /// The name of the container as written in a specification.
    pub fn name(&self) -> &'static str {
        match self {
            ContainerKind::List => "List",
            ContainerKind::Set => "Set",
            ContainerKind::Bag => "Bag",
            ContainerKind::FSet => "FSet",
            ContainerKind::FBag => "FBag",
        }
    }

    fn symbol_name(&self) -> &'static str {
        match self {
            ContainerKind::List => "SortList",
            ContainerKind::Set => "SortSet",
            ContainerKind::Bag => "SortBag",
            ContainerKind::FSet => "SortFSet",
            ContainerKind::FBag => "SortFBag",
        }
    }

    fn from_symbol_name(name: &str) -> ContainerKind {
        match name {
            "SortList" => ContainerKind::List,
            "SortSet" => ContainerKind::Set,
            "SortBag" => ContainerKind::Bag,
            "SortFSet" => ContainerKind::FSet,
            "SortFBag" => ContainerKind::FBag,
            _ => unreachable!("{name} is not a container kind"),
        }
    }
}

// This module is only used internally to run the proc macro.
#[mcrl2_derive_terms]
mod inner {
    use super::*;

    /// A sort expression, see the module documentation of [crate::data] for
    /// the variants.
    #[mcrl2_term(is_sort_expression)]
    #[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
    pub struct SortExpression {
        pub(crate) term: ATerm,
    }

    impl SortExpression {
        /// Returns true iff this is a basic sort.
        pub fn is_basic_sort(&self) -> bool {
            is_basic_sort(&self.term.copy())
        }

        /// Returns true iff this is a function sort.
        pub fn is_function_sort(&self) -> bool {
            is_function_sort(&self.term.copy())
        }

        /// Returns true iff this is a container sort.
        pub fn is_container_sort(&self) -> bool {
            is_container_sort(&self.term.copy())
        }

        /// Returns true iff this is a structured sort.
        pub fn is_structured_sort(&self) -> bool {
            is_structured_sort(&self.term.copy())
        }

        /// Returns true iff this is the untyped placeholder sort.
        pub fn is_untyped(&self) -> bool {
            is_untyped_sort(&self.term.copy())
        }

        /// Returns true iff this is a set of possible sorts.
        pub fn is_possible_sorts(&self) -> bool {
            is_untyped_possible_sorts(&self.term.copy())
        }

        /// Returns the name of a basic sort.
        pub fn name(&self) -> &str {
            debug_assert!(self.is_basic_sort(), "Only basic sorts have a name");
            self.term.arg(0).get_head_symbol().name_ref()
        }

        /// Returns the domain of a function sort.
        pub fn domain(&self) -> ATermList<SortExpression> {
            debug_assert!(self.is_function_sort(), "Only function sorts have a domain");
            self.term.arg(0).protect().into()
        }

        /// Returns the codomain of a function sort.
        pub fn codomain(&self) -> SortExpression {
            debug_assert!(self.is_function_sort(), "Only function sorts have a codomain");
            self.term.arg(1).protect().into()
        }

        /// Returns the codomain of a function sort, and the sort itself otherwise.
        pub fn target_sort(&self) -> SortExpression {
            if self.is_function_sort() {
                self.codomain()
            } else {
                self.term.copy().protect().into()
            }
        }

        /// Returns the kind of a container sort.
        pub fn container_kind(&self) -> ContainerKind {
            debug_assert!(self.is_container_sort(), "Only container sorts have a kind");
            ContainerKind::from_symbol_name(self.term.arg(0).get_head_symbol().name_ref())
        }

        /// Returns the element sort of a container sort.
        pub fn element_sort(&self) -> SortExpression {
            debug_assert!(self.is_container_sort(), "Only container sorts have elements");
            self.term.arg(1).protect().into()
        }

        /// Returns true iff this is a container sort of the given kind.
        pub fn is_container(&self, kind: ContainerKind) -> bool {
            self.is_container_sort() && self.container_kind() == kind
        }

        /// Returns the constructors of a structured sort.
        pub fn constructors(&self) -> ATermList<StructuredSortConstructor> {
            debug_assert!(self.is_structured_sort(), "Only structured sorts have constructors");
            self.term.arg(0).protect().into()
        }

        /// Returns the alternatives of a set of possible sorts.
        pub fn possible_sorts(&self) -> ATermList<SortExpression> {
            debug_assert!(self.is_possible_sorts(), "Only possible sorts have alternatives");
            self.term.arg(0).protect().into()
        }

        /// Returns true iff the untyped sort occurs somewhere in this sort.
        pub fn has_untyped(&self) -> bool {
            self.term
                .iter()
                .any(|term| is_untyped_sort(&term) || is_untyped_possible_sorts(&term))
        }
    }

    impl fmt::Display for SortExpression {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_sort(f, &self.term.copy())
        }
    }

    #[mcrl2_ignore]
    impl SortExpression {
        /// Creates a basic sort with the given name.
        pub fn basic(name: &str) -> SortExpression {
            create_term(BASIC_SORT, &[create_constant(name)]).into()
        }

        /// Creates the function sort `domain -> codomain`, for an empty domain the
        /// codomain itself is returned.
        pub fn function(domain: Vec<SortExpression>, codomain: SortExpression) -> SortExpression {
            if domain.is_empty() {
                return codomain;
            }

            let domain: ATermList<SortExpression> = ATermList::new(domain);
            create_term(FUNCTION_SORT, &[domain.into(), codomain.into()]).into()
        }

        /// Creates the container sort `kind(element)`.
        pub fn container(kind: ContainerKind, element: SortExpression) -> SortExpression {
            create_term(CONTAINER_SORT, &[create_constant(kind.symbol_name()), element.into()]).into()
        }

        /// Creates a structured sort with the given constructors.
        pub fn structured(constructors: Vec<StructuredSortConstructor>) -> SortExpression {
            let constructors: ATermList<StructuredSortConstructor> = ATermList::new(constructors);
            create_term(STRUCTURED_SORT, &[constructors.into()]).into()
        }

        /// The placeholder sort for expressions whose sort is not yet known.
        pub fn untyped() -> SortExpression {
            create_constant(UNTYPED_SORT).into()
        }

        /// The sort that represents one of the given sorts. A single alternative
        /// is returned as is.
        pub fn possible(mut sorts: Vec<SortExpression>) -> SortExpression {
            if sorts.len() == 1 {
                return sorts.remove(0);
            }

            let sorts: ATermList<SortExpression> = ATermList::new(sorts);
            create_term(UNTYPED_POSSIBLE_SORTS, &[sorts.into()]).into()
        }
    }

    /// A constructor `name(arguments)?recogniser` of a structured sort.
    #[mcrl2_term(is_structured_sort_constructor)]
    #[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
    pub struct StructuredSortConstructor {
        pub(crate) term: ATerm,
    }

    impl StructuredSortConstructor {
        /// The name of the constructor.
        pub fn name(&self) -> &str {
            self.term.arg(0).get_head_symbol().name_ref()
        }

        /// The arguments of the constructor.
        pub fn arguments(&self) -> ATermList<StructuredSortArgument> {
            self.term.arg(1).protect().into()
        }

        /// The name of the recogniser, if any.
        pub fn recogniser(&self) -> Option<&str> {
            let name = self.term.arg(2).get_head_symbol().name_ref();
            if name.is_empty() {
                None
            } else {
                Some(name)
            }
        }
    }

    impl fmt::Display for StructuredSortConstructor {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.name())?;

            let arguments = self.arguments();
            if !arguments.is_empty() {
                write!(f, "(")?;
                for (index, argument) in arguments.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                write!(f, ")")?;
            }

            if let Some(recogniser) = self.recogniser() {
                write!(f, "?{}", recogniser)?;
            }

            Ok(())
        }
    }

    #[mcrl2_ignore]
    impl StructuredSortConstructor {
        pub fn new(name: &str, arguments: Vec<StructuredSortArgument>, recogniser: Option<&str>) -> Self {
            let arguments: ATermList<StructuredSortArgument> = ATermList::new(arguments);
            create_term(
                STRUCTURED_SORT_CONSTRUCTOR,
                &[
                    create_constant(name),
                    arguments.into(),
                    create_constant(recogniser.unwrap_or("")),
                ],
            )
            .into()
        }
    }

    /// An argument, with an optional projection name, of a structured sort constructor.
    #[mcrl2_term(is_structured_sort_argument)]
    #[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
    pub struct StructuredSortArgument {
        pub(crate) term: ATerm,
    }

    impl StructuredSortArgument {
        /// The name of the projection function, if any.
        pub fn name(&self) -> Option<&str> {
            let name = self.term.arg(0).get_head_symbol().name_ref();
            if name.is_empty() {
                None
            } else {
                Some(name)
            }
        }

        pub fn sort(&self) -> SortExpression {
            self.term.arg(1).protect().into()
        }
    }

    impl fmt::Display for StructuredSortArgument {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self.name() {
                Some(name) => write!(f, "{}: {}", name, self.sort()),
                None => write!(f, "{}", self.sort()),
            }
        }
    }

    #[mcrl2_ignore]
    impl StructuredSortArgument {
        pub fn new(name: Option<&str>, sort: SortExpression) -> Self {
            create_term(STRUCTURED_SORT_ARGUMENT, &[create_constant(name.unwrap_or("")), sort.into()]).into()
        }
    }
}

pub use inner::*;

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_function_sort() {
        let nat = SortExpression::basic("Nat");
        let bool_sort = SortExpression::basic("Bool");
        let sort = SortExpression::function(vec![nat.clone(), nat.clone()], bool_sort.clone());

        assert!(sort.is_function_sort());
        assert_eq!(sort.domain().len(), 2);
        assert_eq!(sort.codomain(), bool_sort);
        assert_eq!(sort.target_sort(), bool_sort);
        assert_eq!(SortExpression::function(vec![], nat.clone()), nat);
        assert_eq!(sort.to_string(), "Nat # Nat -> Bool");
    }

    #[test]
    fn test_structured_sort() {
        let sort = SortExpression::structured(vec![
            StructuredSortConstructor::new(
                "c",
                vec![
                    StructuredSortArgument::new(Some("i"), SortExpression::basic("Int")),
                    StructuredSortArgument::new(None, SortExpression::basic("Bool")),
                ],
                Some("is_c"),
            ),
            StructuredSortConstructor::new("d", vec![], None),
        ]);

        assert!(sort.is_structured_sort());
        let constructors: Vec<StructuredSortConstructor> = sort.constructors().iter().collect();
        assert_eq!(constructors[0].recogniser(), Some("is_c"));
        assert_eq!(constructors[1].recogniser(), None);
        assert_eq!(sort.to_string(), "struct c(i: Int, Bool)?is_c | d");
    }

    #[test]
    fn test_container_sort() {
        let sort = SortExpression::container(ContainerKind::FSet, SortExpression::basic("D"));

        assert!(sort.is_container(ContainerKind::FSet));
        assert!(!sort.is_container(ContainerKind::Set));
        assert_eq!(sort.element_sort(), SortExpression::basic("D"));
        assert_eq!(sort.copy().to_string(), "FSet(D)");
    }

    #[test]
    fn test_untyped() {
        let sort = SortExpression::container(ContainerKind::List, SortExpression::untyped());
        assert!(sort.has_untyped());
        assert!(!SortExpression::basic("Nat").has_untyped());
    }
}
