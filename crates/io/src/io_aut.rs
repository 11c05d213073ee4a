use std::error::Error;
use std::io::Read;
use std::io::Write;

use log::debug;
use log::trace;
use log::warn;
use regex::Regex;
use streaming_iterator::StreamingIterator;
use thiserror::Error;

use mcrl2rust_lts::LabelledTransitionSystem;
use mcrl2rust_lts::LtsBuilder;

use crate::line_iterator::LineIterator;

#[derive(Error, Debug)]
pub enum IOError {
    #[error("Invalid .aut header {0}")]
    InvalidHeader(&'static str),

    #[error("Invalid transition on line {0}: {1}")]
    InvalidTransition(usize, String),

    #[error("Invalid binary stream: {0}")]
    InvalidBinary(String),

    #[error("Invalid state labels: {0}")]
    InvalidStateLabels(String),
}

/// Loads a labelled transition system in the Aldebaran format from the given
/// reader, where the labels in `hidden_labels` are renamed to tau.
///
/// The Aldebaran format consists of a header:
///     `des (<initial>: Nat, <num_of_transitions>: Nat, <num_of_states>: Nat)`
///
/// And one line for every transition:
///     `(<from>: Nat, "<label>": Str, <to>: Nat)`
///     `(<from>: Nat, <label>: Str, <to>: Nat)`
pub fn read_aut(reader: impl Read, hidden_labels: Vec<String>) -> Result<LabelledTransitionSystem, Box<dyn Error>> {
    let mut lines = LineIterator::new(reader);
    lines.advance();
    let header = lines
        .get()
        .ok_or(IOError::InvalidHeader("The first line should be the header"))?;

    // Regex for des (<initial>: Nat, <num_of_transitions>: Nat, <num_of_states>: Nat)
    let header_regex = Regex::new(r#"^\s*des\s*\(\s*([0-9]+)\s*,\s*([0-9]+)\s*,\s*([0-9]+)\s*\)\s*$"#)?;

    // Regex for (<from>: Nat, "<label>": str, <to>: Nat)
    let transition_regex = Regex::new(r#"^\s*\(\s*([0-9]+)\s*,\s*"(.*)"\s*,\s*([0-9]+)\s*\)\s*$"#)?;

    // Regex for (<from>: Nat, label: str, <to>: Nat), used in the VLTS benchmarks
    let unquoted_transition_regex = Regex::new(r#"^\s*\(\s*([0-9]+)\s*,\s*(.*?)\s*,\s*([0-9]+)\s*\)\s*$"#)?;

    let (_, [initial_txt, num_of_transitions_txt, num_of_states_txt]) = header_regex
        .captures(header)
        .ok_or(IOError::InvalidHeader(
            "does not match des (<init>, <num_transitions>, <num_states>)",
        ))?
        .extract();

    let initial_state: usize = initial_txt.parse()?;
    let num_of_transitions: usize = num_of_transitions_txt.parse()?;
    let num_of_states: usize = num_of_states_txt.parse()?;

    if num_of_states > 0 && initial_state >= num_of_states {
        return Err(IOError::InvalidHeader("the initial state is not one of the states").into());
    }

    let mut builder = LtsBuilder::with_hidden_labels(hidden_labels);
    if num_of_states > 0 {
        builder.require_state(num_of_states - 1);
    }

    let mut line_number = 1;
    while let Some(line) = lines.next() {
        line_number += 1;
        trace!("{}", line);
        if line.trim().is_empty() {
            continue;
        }

        // Try either of the transition regexes and otherwise return an error.
        let (_, [from_txt, label_txt, to_txt]) = transition_regex
            .captures(line)
            .or_else(|| unquoted_transition_regex.captures(line))
            .ok_or_else(|| IOError::InvalidTransition(line_number, line.clone()))?
            .extract();

        // Parse the from and to states, with the given label.
        let from: usize = from_txt.parse()?;
        let to: usize = to_txt.parse()?;

        trace!("Read transition {} --[{}]-> {}", from, label_txt, to);
        builder.add_transition(from, label_txt, to);
    }

    if let Some(error) = lines.take_error() {
        return Err(error.into());
    }

    if builder.num_of_transitions() != num_of_transitions || builder.num_of_states() != num_of_states {
        warn!(
            "The header declares {num_of_transitions} transitions and {num_of_states} states, but {} transitions and {} states were read",
            builder.num_of_transitions(),
            builder.num_of_states()
        );
    }

    let lts = builder.finish(initial_state);
    debug!("Read the labelled transition system\n{lts}");
    Ok(lts)
}

/// Writes the labelled transition system in the Aldebaran format.
pub fn write_aut(writer: &mut impl Write, lts: &LabelledTransitionSystem) -> Result<(), Box<dyn Error>> {
    writeln!(
        writer,
        "des ({},{},{})",
        lts.initial_state_index(),
        lts.num_of_transitions(),
        lts.num_of_states()
    )?;

    for (from, label, to) in lts.iter_transitions() {
        writeln!(writer, "({},\"{}\",{})", from, lts.labels()[label], to)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use test_log::test;

    use super::*;

    #[test]
    fn test_reading_aut() {
        let file = indoc! {r#"
            des (0, 4, 3)
            (0, "a(1)", 1)
            (1, tau, 2)
            (1,"b",0)
            (2, c, 0)
        "#};

        let lts = read_aut(file.as_bytes(), Vec::new()).unwrap();

        assert_eq!(lts.initial_state_index(), 0);
        assert_eq!(lts.num_of_states(), 3);
        assert_eq!(lts.num_of_transitions(), 4);
        assert_eq!(lts.labels(), &["tau", "a(1)", "b", "c"]);
    }

    #[test]
    fn test_hidden_labels() {
        let file = indoc! {r#"
            des (0, 2, 2)
            (0, "a", 1)
            (1, "b", 0)
        "#};

        let lts = read_aut(file.as_bytes(), vec!["a".to_string()]).unwrap();

        assert!(lts.is_hidden_label(lts.outgoing_transitions(0)[0].label));
        assert!(!lts.is_hidden_label(lts.outgoing_transitions(1)[0].label));
    }

    #[test]
    fn test_invalid_aut() {
        assert!(read_aut("(0, \"a\", 1)".as_bytes(), Vec::new()).is_err());
        assert!(read_aut("des (0, 1, 2)\n(0, \"a\" 1)".as_bytes(), Vec::new()).is_err());
        assert!(read_aut("des (3, 0, 2)".as_bytes(), Vec::new()).is_err());
    }

    #[test]
    fn test_writing_aut() {
        let file = indoc! {r#"
            des (0,3,3)
            (0,"a",1)
            (1,"tau",2)
            (2,"b",0)
        "#};

        let lts = read_aut(file.as_bytes(), Vec::new()).unwrap();

        let mut buffer = Vec::new();
        write_aut(&mut buffer, &lts).unwrap();
        assert_eq!(String::from_utf8_lossy(&buffer), file);

        let result = read_aut(&buffer[..], Vec::new()).unwrap();
        assert_eq!(result, lts);
    }
}
