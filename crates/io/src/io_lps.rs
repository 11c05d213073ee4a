use std::error::Error;
use std::io::Read;
use std::io::Write;

use log::info;

use mcrl2::aterm::ATerm;
use mcrl2::aterm::BinaryATermReader;
use mcrl2::aterm::BinaryATermWriter;
use mcrl2::lps::LinearProcessSpecification;

/// Writes the linear process specification as a single shared term.
pub fn write_lps(writer: impl Write, lps: &LinearProcessSpecification) -> Result<(), Box<dyn Error>> {
    let mut stream = BinaryATermWriter::new(writer)?;
    stream.write(&ATerm::from(lps))?;
    stream.finish()?;

    info!(
        "Wrote a linear process with {} parameters and {} summands",
        lps.parameters.len(),
        lps.summands.len()
    );
    Ok(())
}

/// Reads a linear process specification written by [write_lps].
pub fn read_lps(reader: impl Read) -> Result<LinearProcessSpecification, Box<dyn Error>> {
    let mut stream = BinaryATermReader::new(reader)?;
    let lps = LinearProcessSpecification::try_from(stream.read_term()?)?;

    info!(
        "Read a linear process with {} parameters and {} summands",
        lps.parameters.len(),
        lps.summands.len()
    );
    Ok(lps)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use mcrl2::data::standard::nat;
    use mcrl2::data::standard::nat_sort;
    use mcrl2::data::DataVariable;

    use super::*;

    #[test]
    fn test_binary_lps() {
        let lps = LinearProcessSpecification {
            parameters: vec![DataVariable::new("n", nat_sort())],
            initial_state: vec![nat(3)],
            ..Default::default()
        };

        let mut buffer = Vec::new();
        write_lps(&mut buffer, &lps).unwrap();

        let result = read_lps(&buffer[..]).unwrap();
        assert_eq!(result.parameters, lps.parameters);
        assert_eq!(result.initial_state, lps.initial_state);
        assert!(result.summands.is_empty());
    }

    #[test]
    fn test_not_an_lps() {
        assert!(read_lps(&b"not a binary stream"[..]).is_err());
    }
}
