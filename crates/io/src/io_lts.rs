//! The binary LTS format stores a labelled transition system as a stream of
//! shared terms: a header term `lts(initial, states, transitions, labels)`,
//! one term `trans(from, label, to)` per transition and optionally one term
//! `state([d0, ..., dn])` per state holding the values of the parameters.

use std::error::Error;
use std::io::Read;
use std::io::Write;

use log::debug;

use mcrl2::aterm::create_constant;
use mcrl2::aterm::create_term;
use mcrl2::aterm::ATerm;
use mcrl2::aterm::ATermList;
use mcrl2::aterm::ATermTrait;
use mcrl2::aterm::BinaryATermReader;
use mcrl2::aterm::BinaryATermWriter;
use mcrl2::aterm::SymbolTrait;
use mcrl2::aterm::TermPool;
use mcrl2::data::DataExpression;
use mcrl2rust_lts::LabelledTransitionSystem;
use mcrl2rust_lts::LtsBuilder;

use crate::io_aut::IOError;

/// Writes the labelled transition system, and the state values when given, in
/// the binary LTS format.
pub fn write_lts(
    writer: impl Write,
    lts: &LabelledTransitionSystem,
    states: Option<&[Vec<DataExpression>]>,
) -> Result<(), Box<dyn Error>> {
    let mut tp = TermPool::new();
    let mut stream = BinaryATermWriter::new(writer)?;

    let labels: ATermList<ATerm> = ATermList::new(lts.labels().iter().map(|label| create_constant(label)).collect());
    stream.write(&create_term(
        "lts",
        &[
            tp.create_int(lts.initial_state_index() as u64),
            tp.create_int(lts.num_of_states() as u64),
            tp.create_int(lts.num_of_transitions() as u64),
            labels.into(),
        ],
    ))?;

    for (from, label, to) in lts.iter_transitions() {
        stream.write(&create_term(
            "trans",
            &[
                tp.create_int(from as u64),
                tp.create_int(label as u64),
                tp.create_int(to as u64),
            ],
        ))?;
    }

    if let Some(states) = states {
        for values in states {
            let values: ATermList<DataExpression> = ATermList::new(values.clone());
            stream.write(&create_term("state", &[values.into()]))?;
        }
    }

    stream.finish()?;
    Ok(())
}

/// Reads a labelled transition system in the binary LTS format, where the
/// labels in `hidden_labels` are renamed to tau. The state values are ignored.
pub fn read_lts(reader: impl Read, hidden_labels: Vec<String>) -> Result<LabelledTransitionSystem, Box<dyn Error>> {
    let mut stream = BinaryATermReader::new(reader)?;

    let header = stream.read_term()?;
    if header.get_head_symbol().name() != "lts" || header.get_head_symbol().arity() != 4 {
        return Err(IOError::InvalidBinary(format!("expected an lts header, but found {header}")).into());
    }

    let initial_state = int_value(&header.arg(0).protect())?;
    let num_of_states = int_value(&header.arg(1).protect())?;
    let num_of_transitions = int_value(&header.arg(2).protect())?;

    // The labels are interned in their original order, so that the label indices are kept.
    let mut builder = LtsBuilder::with_hidden_labels(hidden_labels);
    let labels: ATermList<ATerm> = header.arg(3).into();
    let labels: Vec<usize> = labels
        .iter()
        .map(|label| builder.label_index(label.get_head_symbol().name()))
        .collect();

    if num_of_states > 0 {
        builder.require_state(num_of_states - 1);
    }

    for _ in 0..num_of_transitions {
        let transition = stream.read_term()?;
        if transition.get_head_symbol().name() != "trans" || transition.get_head_symbol().arity() != 3 {
            return Err(IOError::InvalidBinary(format!("expected a transition, but found {transition}")).into());
        }

        let from = int_value(&transition.arg(0).protect())?;
        let label = int_value(&transition.arg(1).protect())?;
        let to = int_value(&transition.arg(2).protect())?;

        let label = labels
            .get(label)
            .ok_or_else(|| IOError::InvalidBinary(format!("unknown label index {label}")))?;
        if from >= num_of_states || to >= num_of_states {
            return Err(IOError::InvalidBinary(format!("the transition {transition} refers to an unknown state")).into());
        }

        builder.add_transition_index(from, *label, to);
    }

    let lts = builder.finish(initial_state);
    debug!("Read the labelled transition system\n{lts}");
    Ok(lts)
}

fn int_value(term: &ATerm) -> Result<usize, IOError> {
    if term.is_int() {
        usize::try_from(term.value()).map_err(|_| IOError::InvalidBinary(format!("the number {term} is too large")))
    } else {
        Err(IOError::InvalidBinary(format!("expected a number, but found {term}")))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use mcrl2::data::standard::nat;
    use mcrl2rust_lts::random_lts;

    use super::*;

    #[test]
    fn test_random_binary_lts() {
        for _ in 0..10 {
            let lts = random_lts(20, 4, 3);

            let mut buffer = Vec::new();
            write_lts(&mut buffer, &lts, None).unwrap();

            let result = read_lts(&buffer[..], Vec::new()).unwrap();
            assert_eq!(result, lts);
        }
    }

    #[test]
    fn test_binary_lts_with_states() {
        let mut builder = LtsBuilder::new();
        builder.add_transition(0, "a", 1);
        let lts = builder.finish(0);

        let states = vec![vec![nat(0)], vec![nat(1)]];
        let mut buffer = Vec::new();
        write_lts(&mut buffer, &lts, Some(states.as_slice())).unwrap();

        let result = read_lts(&buffer[..], vec!["a".to_string()]).unwrap();
        assert_eq!(result.num_of_states(), 2);
        assert!(result.is_hidden_label(result.outgoing_transitions(0)[0].label));
    }

    #[test]
    fn test_invalid_binary_lts() {
        assert!(read_lts(&b"des (0, 0, 1)"[..], Vec::new()).is_err());
    }
}
