use std::fmt;

use crate::syntax_tree::*;

/// Writes the items separated by the given separator.
fn write_separated<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], separator: &str) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            write!(f, "{}", separator)?;
        }
        write!(f, "{}", item)?;
    }

    Ok(())
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Bool => write!(f, "Bool"),
            Sort::Pos => write!(f, "Pos"),
            Sort::Nat => write!(f, "Nat"),
            Sort::Int => write!(f, "Int"),
            Sort::Real => write!(f, "Real"),
        }
    }
}

impl fmt::Display for ComplexSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexSort::List => write!(f, "List"),
            ComplexSort::Set => write!(f, "Set"),
            ComplexSort::Bag => write!(f, "Bag"),
            ComplexSort::FSet => write!(f, "FSet"),
            ComplexSort::FBag => write!(f, "FBag"),
        }
    }
}

impl fmt::Display for SortExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortExpression::Product(sorts) => write_separated(f, sorts, " # "),
            SortExpression::Function { domain, codomain } => {
                write!(f, "(")?;
                write_separated(f, domain, " # ")?;
                write!(f, " -> {})", codomain)
            }
            SortExpression::Struct { inner } => {
                write!(f, "struct ")?;
                write_separated(f, inner, " | ")
            }
            SortExpression::Reference(name) => write!(f, "{}", name),
            SortExpression::Simple(sort) => write!(f, "{}", sort),
            SortExpression::Complex(kind, element) => write!(f, "{}({})", kind, element),
        }
    }
}

impl fmt::Display for ConstructorDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "(")?;
            for (index, (projection, sort)) in self.args.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                if let Some(projection) = projection {
                    write!(f, "{}: ", projection)?;
                }
                write!(f, "{}", sort)?;
            }
            write!(f, ")")?;
        }

        if let Some(recogniser) = &self.recogniser {
            write!(f, "?{}", recogniser)?;
        }

        Ok(())
    }
}

impl fmt::Display for VarDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.identifier, self.sort)
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.identifier, self.expr)
    }
}

impl fmt::Display for BagElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.expr, self.multiplicity)
    }
}

impl fmt::Display for DataExprUnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataExprUnaryOp::Negation => write!(f, "!"),
            DataExprUnaryOp::Minus => write!(f, "-"),
            DataExprUnaryOp::Size => write!(f, "#"),
        }
    }
}

impl fmt::Display for DataExprBinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DataExprBinaryOp::Conj => "&&",
            DataExprBinaryOp::Disj => "||",
            DataExprBinaryOp::Implies => "=>",
            DataExprBinaryOp::Equal => "==",
            DataExprBinaryOp::NotEqual => "!=",
            DataExprBinaryOp::LessThan => "<",
            DataExprBinaryOp::LessEqual => "<=",
            DataExprBinaryOp::GreaterThan => ">",
            DataExprBinaryOp::GreaterEqual => ">=",
            DataExprBinaryOp::Cons => "|>",
            DataExprBinaryOp::Snoc => "<|",
            DataExprBinaryOp::In => "in",
            DataExprBinaryOp::Concat => "++",
            DataExprBinaryOp::Add => "+",
            DataExprBinaryOp::Subtract => "-",
            DataExprBinaryOp::Div => "/",
            DataExprBinaryOp::IntDiv => "div",
            DataExprBinaryOp::Mod => "mod",
            DataExprBinaryOp::Multiply => "*",
            DataExprBinaryOp::At => ".",
        };

        write!(f, "{}", text)
    }
}

impl DataExpr {
    /// Returns true iff the expression is printed without parentheses as operand.
    fn is_atomic(&self) -> bool {
        !matches!(
            self,
            DataExpr::Binary { .. }
                | DataExpr::Unary { .. }
                | DataExpr::Lambda { .. }
                | DataExpr::Quantifier { .. }
                | DataExpr::Whr { .. }
        )
    }
}

/// Prints the operand, surrounded by parentheses when it is not atomic.
struct Operand<'a>(&'a DataExpr);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_atomic() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

impl fmt::Display for DataExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataExpr::Id(name) => write!(f, "{}", name),
            DataExpr::Number(value) => write!(f, "{}", value),
            DataExpr::Bool(value) => write!(f, "{}", value),
            DataExpr::Application { function, arguments } => {
                write!(f, "{}(", Operand(function))?;
                write_separated(f, arguments, ", ")?;
                write!(f, ")")
            }
            DataExpr::EmptyList => write!(f, "[]"),
            DataExpr::List(elements) => {
                write!(f, "[")?;
                write_separated(f, elements, ", ")?;
                write!(f, "]")
            }
            DataExpr::EmptySet => write!(f, "{{}}"),
            DataExpr::Set(elements) => {
                write!(f, "{{")?;
                write_separated(f, elements, ", ")?;
                write!(f, "}}")
            }
            DataExpr::EmptyBag => write!(f, "{{:}}"),
            DataExpr::Bag(elements) => {
                write!(f, "{{")?;
                write_separated(f, elements, ", ")?;
                write!(f, "}}")
            }
            DataExpr::SetBagComp { variable, predicate } => write!(f, "{{ {} | {} }}", variable, predicate),
            DataExpr::Lambda { variables, body } => {
                write!(f, "lambda ")?;
                write_separated(f, variables, ", ")?;
                write!(f, ". {}", body)
            }
            DataExpr::Quantifier { op, variables, body } => {
                match op {
                    Quantifier::Forall => write!(f, "forall ")?,
                    Quantifier::Exists => write!(f, "exists ")?,
                }
                write_separated(f, variables, ", ")?;
                write!(f, ". {}", body)
            }
            DataExpr::Unary { op, expr } => write!(f, "{}{}", op, Operand(expr)),
            DataExpr::Binary { op, lhs, rhs } => write!(f, "{} {} {}", Operand(lhs), op, Operand(rhs)),
            DataExpr::FunctionUpdate { expr, update } => {
                write!(f, "{}[{} -> {}]", Operand(expr), update.expr, update.update)
            }
            DataExpr::Whr { expr, assignments } => {
                write!(f, "{} whr ", Operand(expr))?;
                write_separated(f, assignments, ", ")?;
                write!(f, " end")
            }
        }
    }
}

impl fmt::Display for MultiActionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_separated(f, &self.actions, "|")
    }
}

impl fmt::Display for Rename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

impl fmt::Display for Comm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

impl fmt::Display for ProcExprBinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ProcExprBinaryOp::Sequence => ".",
            ProcExprBinaryOp::Choice => "+",
            ProcExprBinaryOp::Parallel => "||",
            ProcExprBinaryOp::LeftMerge => "||_",
            ProcExprBinaryOp::CommMerge => "|",
            ProcExprBinaryOp::Until => "<<",
        };

        write!(f, "{}", text)
    }
}

impl fmt::Display for ProcessExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessExpr::Id(name, assignments) => {
                write!(f, "{}(", name)?;
                write_separated(f, assignments, ", ")?;
                write!(f, ")")
            }
            ProcessExpr::Action(name, arguments) => {
                write!(f, "{}", name)?;
                if !arguments.is_empty() {
                    write!(f, "(")?;
                    write_separated(f, arguments, ", ")?;
                    write!(f, ")")?;
                }
                Ok(())
            }
            ProcessExpr::Delta => write!(f, "delta"),
            ProcessExpr::Tau => write!(f, "tau"),
            ProcessExpr::Sum { variables, operand } => {
                write!(f, "(sum ")?;
                write_separated(f, variables, ", ")?;
                write!(f, ". {})", operand)
            }
            ProcessExpr::Binary { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            ProcessExpr::Hide { actions, operand } => {
                write!(f, "hide({{")?;
                write_separated(f, actions, ", ")?;
                write!(f, "}}, {})", operand)
            }
            ProcessExpr::Rename { renames, operand } => {
                write!(f, "rename({{")?;
                write_separated(f, renames, ", ")?;
                write!(f, "}}, {})", operand)
            }
            ProcessExpr::Allow { actions, operand } => {
                write!(f, "allow({{")?;
                write_separated(f, actions, ", ")?;
                write!(f, "}}, {})", operand)
            }
            ProcessExpr::Block { actions, operand } => {
                write!(f, "block({{")?;
                write_separated(f, actions, ", ")?;
                write!(f, "}}, {})", operand)
            }
            ProcessExpr::Comm { comm, operand } => {
                write!(f, "comm({{")?;
                write_separated(f, comm, ", ")?;
                write!(f, "}}, {})", operand)
            }
            ProcessExpr::Condition { condition, then, else_ } => match else_ {
                Some(else_) => write!(f, "({} -> {} <> {})", Operand(condition), then, else_),
                None => write!(f, "({} -> {})", Operand(condition), then),
            },
            ProcessExpr::At { expr, operand } => write!(f, "{}@{}", expr, Operand(operand)),
        }
    }
}
