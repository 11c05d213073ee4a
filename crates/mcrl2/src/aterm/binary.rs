//! A compact binary format for maximally shared terms.
//!
//! The stream consists of packets that start with a three bit packet type.
//! Every function symbol and every unique subterm is written once and later
//! referred to by its index, written with the minimal number of bits needed
//! for the indices assigned so far. A term stream starts with a magic number
//! and a format version, and is terminated by an end packet.

use std::io;
use std::io::Read;
use std::io::Write;

use bitstream_io::BigEndian;
use bitstream_io::BitRead;
use bitstream_io::BitReader;
use bitstream_io::BitWrite;
use bitstream_io::BitWriter;
use log::trace;
use rustc_hash::FxHashMap;

use crate::aterm::ATerm;
use crate::aterm::ATermTrait;
use crate::aterm::Symbol;
use crate::aterm::SymbolTrait;
use crate::aterm::THREAD_TERM_POOL;

const MAGIC: u16 = 0x8CCE;
const VERSION: u16 = 0x0001;

const PACKET_BITS: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Packet {
    Symbol = 0,
    Term = 1,
    Int = 2,
    Output = 3,
    End = 4,
}

impl Packet {
    fn from_bits(value: u8) -> io::Result<Packet> {
        match value {
            0 => Ok(Packet::Symbol),
            1 => Ok(Packet::Term),
            2 => Ok(Packet::Int),
            3 => Ok(Packet::Output),
            4 => Ok(Packet::End),
            _ => Err(invalid_data(format!("unknown packet type {value}"))),
        }
    }
}

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

/// The number of bits needed to write any index smaller than the given bound.
fn index_bits(bound: usize) -> u32 {
    if bound <= 1 {
        0
    } else {
        usize::BITS - (bound - 1).leading_zeros()
    }
}

/// Writes terms to a binary stream, sharing subterms between all written terms.
pub struct BinaryATermWriter<W: Write> {
    stream: BitWriter<W, BigEndian>,
    symbols: FxHashMap<usize, usize>,
    terms: FxHashMap<ATerm, usize>,
}

impl<W: Write> BinaryATermWriter<W> {
    /// Creates a writer and writes the header of the stream.
    pub fn new(writer: W) -> io::Result<BinaryATermWriter<W>> {
        let mut stream = BitWriter::endian(writer, BigEndian);
        stream.write(16, MAGIC)?;
        stream.write(16, VERSION)?;

        Ok(BinaryATermWriter {
            stream,
            symbols: FxHashMap::default(),
            terms: FxHashMap::default(),
        })
    }

    /// Writes the given term, subterms that have been written before are not
    /// written again.
    pub fn write(&mut self, term: &ATerm) -> io::Result<()> {
        // Post order traversal, a term is written after all its arguments.
        let mut stack: Vec<(ATerm, bool)> = vec![(term.clone(), false)];
        while let Some((current, arguments_written)) = stack.pop() {
            if self.terms.contains_key(&current) {
                continue;
            }

            if arguments_written || current.is_int() || current.arguments().len() == 0 {
                self.write_term(&current)?;
            } else {
                stack.push((current.clone(), true));
                for argument in current.arguments().rev() {
                    stack.push((argument.protect(), false));
                }
            }
        }

        self.write_packet(Packet::Output)?;
        let bits = index_bits(self.terms.len());
        let index = self.terms[term];
        self.write_index(bits, index)
    }

    /// Writes the end of stream packet and flushes the underlying writer.
    pub fn finish(mut self) -> io::Result<()> {
        self.write_packet(Packet::End)?;
        self.stream.byte_align()?;
        self.stream.flush()
    }

    fn write_term(&mut self, term: &ATerm) -> io::Result<()> {
        if term.is_int() {
            self.write_packet(Packet::Int)?;
            self.write_varint(term.value())?;
        } else {
            let symbol = term.get_head_symbol();
            let symbol_index = match self.symbols.get(&symbol.index()) {
                Some(index) => *index,
                None => {
                    self.write_packet(Packet::Symbol)?;
                    self.write_string(symbol.name())?;
                    self.write_varint(symbol.arity() as u64)?;

                    let index = self.symbols.len();
                    self.symbols.insert(symbol.index(), index);
                    index
                }
            };

            self.write_packet(Packet::Term)?;
            self.write_index(index_bits(self.symbols.len()), symbol_index)?;

            let bits = index_bits(self.terms.len());
            for argument in term.arguments() {
                let index = self.terms[&argument.protect()];
                self.write_index(bits, index)?;
            }
        }

        let index = self.terms.len();
        self.terms.insert(term.clone(), index);
        Ok(())
    }

    fn write_packet(&mut self, packet: Packet) -> io::Result<()> {
        self.stream.write(PACKET_BITS, packet as u8)
    }

    fn write_index(&mut self, bits: u32, index: usize) -> io::Result<()> {
        if bits > 0 {
            self.stream.write(bits, index as u64)?;
        }
        Ok(())
    }

    /// Writes the value in the LEB128 encoding.
    fn write_varint(&mut self, mut value: u64) -> io::Result<()> {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                return self.stream.write(8, byte);
            }
            self.stream.write(8, byte | 0x80)?;
        }
    }

    fn write_string(&mut self, value: &str) -> io::Result<()> {
        self.write_varint(value.len() as u64)?;
        self.stream.write_bytes(value.as_bytes())
    }
}

/// Reads terms written by a [BinaryATermWriter].
pub struct BinaryATermReader<R: Read> {
    stream: BitReader<R, BigEndian>,
    symbols: Vec<Symbol>,
    terms: Vec<ATerm>,
    finished: bool,
}

impl<R: Read> BinaryATermReader<R> {
    /// Creates a reader and checks the header of the stream.
    pub fn new(reader: R) -> io::Result<BinaryATermReader<R>> {
        let mut stream = BitReader::endian(reader, BigEndian);
        let magic: u16 = stream.read(16)?;
        if magic != MAGIC {
            return Err(invalid_data(format!("the stream does not start with the magic number {MAGIC:#x}")));
        }

        let version: u16 = stream.read(16)?;
        if version != VERSION {
            return Err(invalid_data(format!("unsupported binary term format version {version}")));
        }

        Ok(BinaryATermReader {
            stream,
            symbols: Vec::new(),
            terms: Vec::new(),
            finished: false,
        })
    }

    /// Returns the next written term, or None at the end of the stream.
    pub fn read(&mut self) -> io::Result<Option<ATerm>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            let packet = Packet::from_bits(self.stream.read(PACKET_BITS)?)?;
            match packet {
                Packet::Symbol => {
                    let name = self.read_string()?;
                    let arity = self.read_varint()? as usize;
                    let symbol = THREAD_TERM_POOL.with_borrow_mut(|tp| tp.create_symbol(&name, arity));
                    self.symbols.push(symbol);
                }
                Packet::Term => {
                    let symbol_index = self.read_index(index_bits(self.symbols.len()))?;
                    let symbol = self
                        .symbols
                        .get(symbol_index)
                        .ok_or_else(|| invalid_data(format!("unknown symbol index {symbol_index}")))?
                        .clone();

                    let bits = index_bits(self.terms.len());
                    let mut arguments = Vec::with_capacity(symbol.arity());
                    for _ in 0..symbol.arity() {
                        let index = self.read_index(bits)?;
                        arguments.push(self.term(index)?);
                    }

                    let term = THREAD_TERM_POOL.with_borrow_mut(|tp| tp.create(&symbol, &arguments));
                    self.terms.push(term);
                }
                Packet::Int => {
                    let value = self.read_varint()?;
                    let term = THREAD_TERM_POOL.with_borrow_mut(|tp| tp.create_int(value));
                    self.terms.push(term);
                }
                Packet::Output => {
                    let index = self.read_index(index_bits(self.terms.len()))?;
                    let term = self.term(index)?;
                    trace!("Read term {term}");
                    return Ok(Some(term));
                }
                Packet::End => {
                    self.finished = true;
                    return Ok(None);
                }
            }
        }
    }

    /// Reads the next term and fails when the stream has ended.
    pub fn read_term(&mut self) -> io::Result<ATerm> {
        self.read()?
            .ok_or_else(|| invalid_data("unexpected end of the term stream".to_string()))
    }

    fn term(&self, index: usize) -> io::Result<ATerm> {
        self.terms
            .get(index)
            .cloned()
            .ok_or_else(|| invalid_data(format!("unknown term index {index}")))
    }

    fn read_index(&mut self, bits: u32) -> io::Result<usize> {
        if bits == 0 {
            Ok(0)
        } else {
            Ok(self.stream.read::<u64>(bits)? as usize)
        }
    }

    fn read_varint(&mut self) -> io::Result<u64> {
        let mut result: u64 = 0;
        let mut shift = 0;
        loop {
            let byte: u8 = self.stream.read(8)?;
            if shift >= 64 {
                return Err(invalid_data("variable length integer is too long".to_string()));
            }
            result |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    fn read_string(&mut self) -> io::Result<String> {
        let length = self.read_varint()? as usize;
        let mut buffer = vec![0; length];
        self.stream.read_bytes(&mut buffer)?;
        String::from_utf8(buffer).map_err(|error| invalid_data(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand::Rng;
    use test_log::test;

    use super::*;
    use crate::aterm::random_term;
    use crate::aterm::TermPool;

    #[test]
    fn test_index_bits() {
        assert_eq!(index_bits(0), 0);
        assert_eq!(index_bits(1), 0);
        assert_eq!(index_bits(2), 1);
        assert_eq!(index_bits(5), 3);
        assert_eq!(index_bits(8), 3);
        assert_eq!(index_bits(9), 4);
    }

    #[test]
    fn test_random_terms() {
        let mut tp = TermPool::new();
        let mut rng = StdRng::seed_from_u64(42);

        let terms: Vec<ATerm> = (0..20)
            .map(|_| {
                random_term(
                    &mut tp,
                    &[("f".to_string(), 2), ("g".to_string(), 1)],
                    &["a".to_string(), "b".to_string()],
                    rng.random_range(1..10),
                )
            })
            .collect();

        let mut buffer = Vec::new();
        let mut writer = BinaryATermWriter::new(&mut buffer).unwrap();
        for term in &terms {
            writer.write(term).unwrap();
        }
        writer.finish().unwrap();

        let mut reader = BinaryATermReader::new(&buffer[..]).unwrap();
        for term in &terms {
            assert_eq!(reader.read().unwrap().as_ref(), Some(term));
        }
        assert_eq!(reader.read().unwrap(), None);
    }

    #[test]
    fn test_lists_and_integers() {
        let mut tp = TermPool::new();
        let term = tp.from_string("f([1, 2, a], 18446744073709551615)").unwrap();

        let mut buffer = Vec::new();
        let mut writer = BinaryATermWriter::new(&mut buffer).unwrap();
        writer.write(&term).unwrap();
        writer.finish().unwrap();

        let mut reader = BinaryATermReader::new(&buffer[..]).unwrap();
        assert_eq!(reader.read_term().unwrap(), term);
    }

    #[test]
    fn test_invalid_magic() {
        assert!(BinaryATermReader::new(&[0u8, 1, 2, 3][..]).is_err());
    }
}
