use log::trace;

use mcrl2::data::DataExpression;
use mcrl2::data::DataSpecification;
use mcrl2::data::DataSubstitution;

use crate::jitty::rewrite_term;
use crate::jitty::RewriteState;
use crate::jitty::RuleApplication;
use crate::jitty::RuleTable;
use crate::utilities::create_var_map;
use crate::utilities::MatchProgram;
use crate::utilities::SemiCompressedTermTree;
use crate::RewriteEngine;
use crate::RewriteSpecification;
use crate::RewritingStatistics;
use crate::Rule;

/// A condition where both sides refer to positions of the left-hand side.
struct CompiledCondition {
    lhs: SemiCompressedTermTree,
    rhs: SemiCompressedTermTree,
    equality: bool,
}

/// A rewrite rule that is translated into a match program and term trees.
struct CompiledRule {
    program: MatchProgram,
    rhs: SemiCompressedTermTree,
    conditions: Vec<CompiledCondition>,
}

impl CompiledRule {
    fn new(rule: &Rule) -> CompiledRule {
        let var_map = create_var_map(&rule.lhs);
        let tree = |expression: &DataExpression| SemiCompressedTermTree::from_term(&expression.copy().into(), &var_map);

        CompiledRule {
            program: MatchProgram::new(&rule.lhs),
            rhs: tree(&rule.rhs),
            conditions: rule
                .conditions
                .iter()
                .map(|condition| CompiledCondition {
                    lhs: tree(&condition.lhs),
                    rhs: tree(&condition.rhs),
                    equality: condition.equality,
                })
                .collect(),
        }
    }
}

/// Applies rules using the compiled match programs, the right-hand side is
/// instantiated directly from the positions of the matched term.
struct CompiledRules {
    rules: Vec<CompiledRule>,
}

impl RuleApplication for CompiledRules {
    fn apply_rule(
        &self,
        table: &RuleTable,
        state: &mut RewriteState,
        index: usize,
        term: &DataExpression,
    ) -> Option<DataExpression> {
        let rule = &self.rules[index];
        if !rule.program.matches(term) {
            return None;
        }

        let no_substitution = DataSubstitution::default();
        for condition in &rule.conditions {
            let lhs = condition.lhs.evaluate(term, &mut state.tp);
            let rhs = condition.rhs.evaluate(term, &mut state.tp);

            let lhs = rewrite_term(self, table, state, &lhs, &no_substitution);
            let rhs = rewrite_term(self, table, state, &rhs, &no_substitution);
            if (lhs == rhs) != condition.equality {
                return None;
            }
        }

        trace!("Applying {} to {term}", table.rules[index]);
        state.statistics.rewrite_steps += 1;
        let result = rule.rhs.evaluate(term, &mut state.tp);
        Some(rewrite_term(self, table, state, &result, &no_substitution))
    }
}

/// The just-in-time rewriter where the rules are compiled into match
/// programs and semi compressed term trees.
pub struct JittyCompilingRewriter {
    compiled: CompiledRules,
    table: RuleTable,
    state: RewriteState,
}

impl JittyCompilingRewriter {
    pub fn new(spec: &DataSpecification, rewrite_spec: &RewriteSpecification) -> JittyCompilingRewriter {
        JittyCompilingRewriter {
            compiled: CompiledRules {
                rules: rewrite_spec.rewrite_rules.iter().map(CompiledRule::new).collect(),
            },
            table: RuleTable::new(spec, rewrite_spec),
            state: RewriteState::default(),
        }
    }
}

impl RewriteEngine for JittyCompilingRewriter {
    fn rewrite_with(&mut self, term: &DataExpression, sigma: &DataSubstitution) -> DataExpression {
        rewrite_term(&self.compiled, &self.table, &mut self.state, term, sigma)
    }

    fn data_specification(&self) -> &DataSpecification {
        self.table.data_specification()
    }

    fn statistics(&self) -> &RewritingStatistics {
        &self.state.statistics
    }
}
