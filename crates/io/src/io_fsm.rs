use std::error::Error;
use std::io::Write;

use itertools::Itertools;

use mcrl2::data::DataExpression;
use mcrl2::data::DataVariable;
use mcrl2rust_lts::LabelledTransitionSystem;
use mcrl2rust_lts::StateIndex;
use mcrl2rust_utilities::IndexedSet;

use crate::io_aut::IOError;

/// Writes the labelled transition system in the FSM format, which consists of
/// three sections separated by `---`.
///
///  - One line `name(cardinality) Sort "v0" "v1" ...` per parameter, listing
///    the values of that parameter that occur in the states.
///  - One line per state with, for every parameter, the index of its value.
///    The first state is the initial state.
///  - One line `from to "label"` per transition, where states are numbered
///    from one.
///
/// When no state values are given the parameter section is empty.
pub fn write_fsm(
    writer: &mut impl Write,
    lts: &LabelledTransitionSystem,
    parameters: &[DataVariable],
    states: Option<&[Vec<DataExpression>]>,
) -> Result<(), Box<dyn Error>> {
    if let Some(states) = states {
        if states.len() != lts.num_of_states() {
            return Err(IOError::InvalidStateLabels(format!(
                "{} state vectors were given for {} states",
                states.len(),
                lts.num_of_states()
            ))
            .into());
        }
    }

    // The initial state must be the first state, so it swaps places with state zero.
    let initial = lts.initial_state_index();
    let position = |state: StateIndex| -> StateIndex {
        if state == initial {
            0
        } else if state == 0 {
            initial
        } else {
            state
        }
    };
    let order: Vec<StateIndex> = (0..lts.num_of_states()).map(position).collect();

    match states {
        Some(states) => {
            let mut domains: Vec<IndexedSet<DataExpression>> = parameters.iter().map(|_| IndexedSet::new()).collect();
            let mut vectors: Vec<Vec<usize>> = Vec::with_capacity(states.len());
            for &state in &order {
                vectors.push(
                    states[state]
                        .iter()
                        .zip(domains.iter_mut())
                        .map(|(value, domain)| domain.insert(value.clone()).0)
                        .collect(),
                );
            }

            for (parameter, domain) in parameters.iter().zip(&domains) {
                writeln!(
                    writer,
                    "{}({}) {} {}",
                    parameter.name(),
                    domain.len(),
                    parameter.sort(),
                    domain.iter().format_with(" ", |value, f| f(&format_args!("\"{value}\"")))
                )?;
            }
            writeln!(writer, "---")?;

            for vector in vectors {
                writeln!(writer, "{}", vector.iter().format(" "))?;
            }
        }
        None => {
            writeln!(writer, "---")?;
            for _ in lts.iter_states() {
                writeln!(writer)?;
            }
        }
    }

    writeln!(writer, "---")?;
    for (from, label, to) in lts.iter_transitions() {
        writeln!(
            writer,
            "{} {} \"{}\"",
            position(from) + 1,
            position(to) + 1,
            lts.labels()[label]
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use test_log::test;

    use mcrl2::data::standard::bool_sort;
    use mcrl2::data::standard::false_;
    use mcrl2::data::standard::nat;
    use mcrl2::data::standard::nat_sort;
    use mcrl2::data::standard::true_;
    use mcrl2rust_lts::LtsBuilder;

    use super::*;

    #[test]
    fn test_write_fsm() {
        let mut builder = LtsBuilder::new();
        builder.add_transition(0, "a", 1);
        builder.add_transition(1, "b", 0);
        let lts = builder.finish(0);

        let parameters = vec![
            DataVariable::new("n", nat_sort()),
            DataVariable::new("b", bool_sort()),
        ];
        let states = vec![vec![nat(0), true_()], vec![nat(1), true_()]];

        let mut buffer = Vec::new();
        write_fsm(&mut buffer, &lts, &parameters, Some(states.as_slice())).unwrap();

        assert_eq!(
            String::from_utf8_lossy(&buffer),
            indoc! {r#"
                n(2) Nat "0" "1"
                b(1) Bool "true"
                ---
                0 0
                1 0
                ---
                1 2 "a"
                2 1 "b"
            "#}
        );
    }

    #[test]
    fn test_initial_state_is_first() {
        let mut builder = LtsBuilder::new();
        builder.add_transition(0, "a", 1);
        let lts = builder.finish(1);

        let parameters = vec![DataVariable::new("b", bool_sort())];
        let states = vec![vec![false_()], vec![true_()]];

        let mut buffer = Vec::new();
        write_fsm(&mut buffer, &lts, &parameters, Some(states.as_slice())).unwrap();

        assert_eq!(
            String::from_utf8_lossy(&buffer),
            indoc! {r#"
                b(2) Bool "true" "false"
                ---
                0
                1
                ---
                2 1 "a"
            "#}
        );
    }

    #[test]
    fn test_write_fsm_without_state_values() {
        let mut builder = LtsBuilder::new();
        builder.add_transition(0, "tau", 1);
        let lts = builder.finish(0);

        let mut buffer = Vec::new();
        write_fsm(&mut buffer, &lts, &[], None).unwrap();

        assert_eq!(String::from_utf8_lossy(&buffer), "---\n\n\n---\n1 2 \"tau\"\n");
    }
}
