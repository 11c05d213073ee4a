use std::error::Error;
use std::io::Write;

use itertools::Itertools;

use mcrl2::data::DataExpression;
use mcrl2rust_lts::LabelledTransitionSystem;

/// Writes the labelled transition system as a `digraph` in the DOT format of
/// GraphViz. The initial state is drawn with a double border, and when state
/// values are given they are used as the node labels.
pub fn write_dot(
    writer: &mut impl Write,
    lts: &LabelledTransitionSystem,
    states: Option<&[Vec<DataExpression>]>,
) -> Result<(), Box<dyn Error>> {
    writeln!(writer, "digraph \"lts\" {{")?;
    writeln!(writer, "  node [ width=0.25, height=0.25, label=\"\" ];")?;

    for state in lts.iter_states() {
        let label = match states.and_then(|states| states.get(state)) {
            Some(values) => format!(
                "({})",
                values
                    .iter()
                    .format_with(",", |value, f| f(&html_escape::encode_double_quoted_attribute(&value.to_string())))
            ),
            None => state.to_string(),
        };

        if state == lts.initial_state_index() {
            writeln!(writer, "  s{state} [ label=\"{label}\", peripheries=2 ];")?;
        } else {
            writeln!(writer, "  s{state} [ label=\"{label}\" ];")?;
        }
    }

    for (from, label, to) in lts.iter_transitions() {
        writeln!(
            writer,
            "  s{from} -> s{to} [ label=\"{}\" ];",
            html_escape::encode_double_quoted_attribute(&lts.labels()[label])
        )?;
    }

    writeln!(writer, "}}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use test_log::test;

    use mcrl2rust_lts::LtsBuilder;

    use super::*;

    #[test]
    fn test_write_dot() {
        let mut builder = LtsBuilder::new();
        builder.add_transition(0, "a(\"x\")", 1);
        builder.add_transition(1, "tau", 0);
        let lts = builder.finish(0);

        let mut buffer = Vec::new();
        write_dot(&mut buffer, &lts, None).unwrap();

        assert_eq!(
            String::from_utf8_lossy(&buffer),
            indoc! {r#"
                digraph "lts" {
                  node [ width=0.25, height=0.25, label="" ];
                  s0 [ label="0", peripheries=2 ];
                  s1 [ label="1" ];
                  s0 -> s1 [ label="a(&quot;x&quot;)" ];
                  s1 -> s0 [ label="tau" ];
                }
            "#}
        );
    }
}
