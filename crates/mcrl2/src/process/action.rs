use std::fmt;

use crate::aterm::create_constant;
use crate::aterm::create_term;
use crate::aterm::ATerm;
use crate::aterm::ATermList;
use crate::aterm::ATermTrait;
use crate::aterm::SymbolTrait;
use crate::data::DataExpression;
use crate::data::SortExpression;
use crate::Mcrl2Error;

/// An action label `name: S1 # ... # Sn`, labels with the same name but
/// different sorts are different labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ActionLabel {
    pub name: String,
    pub sorts: Vec<SortExpression>,
}

impl ActionLabel {
    pub fn new(name: &str, sorts: Vec<SortExpression>) -> ActionLabel {
        ActionLabel {
            name: name.to_string(),
            sorts,
        }
    }
}

impl fmt::Display for ActionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (index, sort) in self.sorts.iter().enumerate() {
            if index == 0 {
                write!(f, ": ")?;
            } else {
                write!(f, " # ")?;
            }
            write!(f, "{sort}")?;
        }
        Ok(())
    }
}

impl From<&ActionLabel> for ATerm {
    fn from(label: &ActionLabel) -> Self {
        let sorts: ATermList<SortExpression> = ATermList::new(label.sorts.clone());
        create_term("ActId", &[create_constant(&label.name), sorts.into()])
    }
}

impl TryFrom<&ATerm> for ActionLabel {
    type Error = Mcrl2Error;

    fn try_from(term: &ATerm) -> Result<Self, Self::Error> {
        if term.get_head_symbol().name() != "ActId" || term.get_head_symbol().arity() != 2 {
            return Err(Mcrl2Error::SyntaxError(format!("{term} is not an action label")));
        }

        let sorts: ATermList<SortExpression> = term.arg(1).into();
        Ok(ActionLabel {
            name: term.arg(0).get_head_symbol().name().to_string(),
            sorts: sorts.iter().collect(),
        })
    }
}

/// The action `label(arguments)`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Action {
    pub label: ActionLabel,
    pub arguments: Vec<DataExpression>,
}

impl Action {
    pub fn new(label: ActionLabel, arguments: Vec<DataExpression>) -> Action {
        debug_assert_eq!(
            label.sorts.len(),
            arguments.len(),
            "The number of arguments of {} does not match its label",
            label.name
        );
        Action { label, arguments }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label.name)?;
        if !self.arguments.is_empty() {
            write!(f, "(")?;
            for (index, argument) in self.arguments.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{argument}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl From<&Action> for ATerm {
    fn from(action: &Action) -> Self {
        let arguments: ATermList<DataExpression> = ATermList::new(action.arguments.clone());
        create_term("Action", &[(&action.label).into(), arguments.into()])
    }
}

impl TryFrom<&ATerm> for Action {
    type Error = Mcrl2Error;

    fn try_from(term: &ATerm) -> Result<Self, Self::Error> {
        if term.get_head_symbol().name() != "Action" || term.get_head_symbol().arity() != 2 {
            return Err(Mcrl2Error::SyntaxError(format!("{term} is not an action")));
        }

        let arguments: ATermList<DataExpression> = term.arg(1).into();
        Ok(Action {
            label: ActionLabel::try_from(&term.arg(0).protect())?,
            arguments: arguments.iter().collect(),
        })
    }
}

/// A multi-action `a1 | ... | an`, where the empty multi-action is `tau`.
/// The actions are kept sorted so that equal multi-actions are equal values.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct MultiAction {
    actions: Vec<Action>,
}

impl MultiAction {
    pub fn new(mut actions: Vec<Action>) -> MultiAction {
        actions.sort_by_cached_key(|action| action.to_string());
        MultiAction { actions }
    }

    pub fn tau() -> MultiAction {
        MultiAction::default()
    }

    pub fn is_tau(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Applies the function to every argument of every action.
    pub fn map_arguments(&self, mut f: impl FnMut(&DataExpression) -> DataExpression) -> MultiAction {
        MultiAction::new(
            self.actions
                .iter()
                .map(|action| Action::new(action.label.clone(), action.arguments.iter().map(&mut f).collect()))
                .collect(),
        )
    }
}

impl fmt::Display for MultiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.actions.is_empty() {
            return write!(f, "tau");
        }

        for (index, action) in self.actions.iter().enumerate() {
            if index > 0 {
                write!(f, "|")?;
            }
            write!(f, "{action}")?;
        }
        Ok(())
    }
}

impl From<&MultiAction> for ATerm {
    fn from(multi_action: &MultiAction) -> Self {
        let actions: ATermList<ATerm> = ATermList::new(multi_action.actions.iter().map(ATerm::from).collect());
        create_term("MultAct", &[actions.into()])
    }
}

impl TryFrom<&ATerm> for MultiAction {
    type Error = Mcrl2Error;

    fn try_from(term: &ATerm) -> Result<Self, Self::Error> {
        if term.get_head_symbol().name() != "MultAct" || term.get_head_symbol().arity() != 1 {
            return Err(Mcrl2Error::SyntaxError(format!("{term} is not a multi-action")));
        }

        let actions: ATermList<ATerm> = term.arg(0).into();
        let actions = actions
            .iter()
            .map(|action| Action::try_from(&action))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MultiAction::new(actions))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::data::standard::bool_sort;
    use crate::data::standard::false_;
    use crate::data::standard::true_;

    #[test]
    fn test_multi_action_is_sorted() {
        let a = ActionLabel::new("a", vec![bool_sort()]);
        let b = ActionLabel::new("b", vec![]);

        let left = MultiAction::new(vec![Action::new(b.clone(), vec![]), Action::new(a.clone(), vec![true_()])]);
        let right = MultiAction::new(vec![Action::new(a.clone(), vec![true_()]), Action::new(b, vec![])]);
        assert_eq!(left, right);
        assert_eq!(left.to_string(), "a(true)|b");

        let term: ATerm = (&left).into();
        assert_eq!(MultiAction::try_from(&term).unwrap(), left);

        let other = MultiAction::new(vec![Action::new(a, vec![false_()])]);
        assert_ne!(left, other);
        assert_eq!(MultiAction::tau().to_string(), "tau");
    }
}
