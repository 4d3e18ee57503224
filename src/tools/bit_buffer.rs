//! Bit packing for fixed width codes.
//!
//! Codes are packed least significant bit first: the first code occupies the low
//! bits of the first byte, and whatever does not fit spills into the low bits of
//! the next byte.  A 64 bit accumulator holds the bits that do not yet make a full
//! byte (encoding) or a full code (decoding).

use std::io::{Read,Write,ErrorKind};
use crate::Error;

/// Size of the accumulator in bits
pub const CAPACITY: usize = u64::BITS as usize;

fn mask(width: usize) -> u64 {
    (1 << width) - 1
}

/// The code width has to leave room for one more byte in the accumulator,
/// otherwise a pending code could be pushed out the top.
fn check_width(width: usize) -> Result<(),Error> {
    if width == 0 || width > CAPACITY - 8 {
        return Err(Error::BufferCapacity { width, capacity: CAPACITY });
    }
    Ok(())
}

/// Pending bits, lowest bit is the oldest
pub struct BitBuffer {
    value: u64,
    bits: usize
}

impl BitBuffer {
    pub fn new() -> Self {
        Self {
            value: 0,
            bits: 0
        }
    }
    /// number of pending bits
    pub fn len(&self) -> usize {
        self.bits
    }
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
    /// put `width` bits of `code` above the pending bits
    pub fn push(&mut self,code: u64,width: usize) {
        debug_assert!(self.bits + width <= CAPACITY);
        debug_assert!(code & !mask(width) == 0);
        self.value |= (code & mask(width)) << self.bits;
        self.bits += width;
    }
    /// remove and return the oldest `width` bits, there must be at least that many
    pub fn take(&mut self,width: usize) -> u64 {
        debug_assert!(width <= self.bits);
        let ans = self.value & mask(width);
        self.value >>= width;
        self.bits -= width;
        ans
    }
    /// Remove whatever is pending as a single byte, zero filled at the top.
    /// Returns `None` only if nothing is pending, even if the pending bits are all zero.
    pub fn take_partial(&mut self) -> Option<u8> {
        debug_assert!(self.bits < 8);
        if self.bits == 0 {
            return None;
        }
        let ans = (self.value & 0xff) as u8;
        self.clear();
        Some(ans)
    }
    pub fn clear(&mut self) {
        self.value = 0;
        self.bits = 0;
    }
}

/// Packs codes of a fixed width into a byte sink
pub struct CodeEncoder<W: Write> {
    writer: W,
    buf: BitBuffer,
    width: usize,
    count: u64
}

impl <W: Write> CodeEncoder<W> {
    pub fn new(writer: W,width: usize) -> Result<Self,Error> {
        check_width(width)?;
        Ok(Self {
            writer,
            buf: BitBuffer::new(),
            width,
            count: 0
        })
    }
    /// Number of bytes handed to the sink so far
    pub fn bytes_written(&self) -> u64 {
        self.count
    }
    /// Pack one code, writing out every completed byte.
    /// The code must fit in the code width.
    pub fn write(&mut self,code: usize) -> Result<(),std::io::Error> {
        self.buf.push(code as u64,self.width);
        while self.buf.len() >= 8 {
            let by = self.buf.take(8) as u8;
            self.writer.write_all(&[by])?;
            self.count += 1;
        }
        Ok(())
    }
    /// Write the trailing partial byte, if any, and flush the sink.
    /// Calling this twice does not add another byte.
    pub fn flush(&mut self) -> Result<(),std::io::Error> {
        if let Some(by) = self.buf.take_partial() {
            self.writer.write_all(&[by])?;
            self.count += 1;
        }
        self.writer.flush()
    }
}

/// Unpacks codes of a fixed width from a byte source.
/// Also usable as an iterator over `Result<usize,std::io::Error>`.
pub struct CodeDecoder<R: Read> {
    reader: R,
    buf: BitBuffer,
    width: usize,
    exhausted: bool,
    count: u64
}

impl <R: Read> CodeDecoder<R> {
    pub fn new(reader: R,width: usize) -> Result<Self,Error> {
        check_width(width)?;
        Ok(Self {
            reader,
            buf: BitBuffer::new(),
            width,
            exhausted: false,
            count: 0
        })
    }
    /// Number of bytes taken from the source so far
    pub fn bytes_read(&self) -> u64 {
        self.count
    }
    fn fill(&mut self) -> Result<(),std::io::Error> {
        let mut by: [u8;1] = [0];
        while self.buf.len() < self.width && !self.exhausted {
            match self.reader.read_exact(&mut by) {
                Ok(()) => {
                    self.buf.push(by[0] as u64,8);
                    self.count += 1;
                },
                Err(e) if e.kind()==ErrorKind::UnexpectedEof => {
                    self.exhausted = true;
                },
                Err(e) => return Err(e)
            }
        }
        Ok(())
    }
    /// Get the next code, or `None` at the end of the stream.
    /// Bits left over at the end that cannot make a whole code are padding and are dropped.
    pub fn read(&mut self) -> Result<Option<usize>,std::io::Error> {
        self.fill()?;
        if self.buf.len() < self.width {
            if !self.buf.is_empty() {
                log::trace!("dropping {} bits of padding",self.buf.len());
                self.buf.clear();
            }
            return Ok(None);
        }
        Ok(Some(self.buf.take(self.width) as usize))
    }
}

impl <R: Read> Iterator for CodeDecoder<R> {
    type Item = Result<usize,std::io::Error>;
    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}

#[test]
fn lsb_first_packing() {
    let mut ans: Vec<u8> = Vec::new();
    let mut coder = CodeEncoder::new(&mut ans,12).expect("bad width");
    coder.write(0x061).expect("write err");
    coder.write(0x062).expect("write err");
    coder.flush().expect("flush err");
    assert_eq!(ans,hex::decode("612006").unwrap());
}

#[test]
fn flush_emits_zero_byte() {
    // 5 codes of 9 bits leave 5 pending bits, all of them zero
    let mut ans: Vec<u8> = Vec::new();
    let mut coder = CodeEncoder::new(&mut ans,9).expect("bad width");
    for code in [1,0,0,0,0] {
        coder.write(code).expect("write err");
    }
    coder.flush().expect("flush err");
    assert_eq!(coder.bytes_written(),6);
    coder.flush().expect("flush err");
    assert_eq!(coder.bytes_written(),6);
    assert_eq!(ans,vec![1,0,0,0,0,0]);
}

#[test]
fn flush_when_aligned() {
    let mut ans: Vec<u8> = Vec::new();
    let mut coder = CodeEncoder::new(&mut ans,16).expect("bad width");
    coder.write(0xbeef).expect("write err");
    coder.flush().expect("flush err");
    assert_eq!(ans,vec![0xef,0xbe]);
}

#[test]
fn padding_is_dropped() {
    let packed = hex::decode("01000000000000").unwrap();
    let codes: Vec<usize> = CodeDecoder::new(packed.as_slice(),9).expect("bad width")
        .collect::<Result<Vec<usize>,std::io::Error>>().expect("read err");
    // 56 bits make 6 codes with 2 bits of padding
    assert_eq!(codes,vec![1,0,0,0,0,0]);
}

#[test]
fn end_of_stream_repeats() {
    let packed: [u8;1] = [0xff];
    let mut decoder = CodeDecoder::new(packed.as_slice(),12).expect("bad width");
    assert!(decoder.read().expect("read err").is_none());
    assert!(decoder.read().expect("read err").is_none());
    assert_eq!(decoder.bytes_read(),1);
}

#[test]
fn widest_code() {
    let width = CAPACITY - 8;
    let codes = [mask(width) as usize,0x5a5a5a,1];
    let mut ans: Vec<u8> = Vec::new();
    let mut coder = CodeEncoder::new(&mut ans,width).expect("bad width");
    for c in codes {
        coder.write(c).expect("write err");
    }
    coder.flush().expect("flush err");
    assert_eq!(ans.len(),(codes.len()*width+7)/8);
    let unpacked: Vec<usize> = CodeDecoder::new(ans.as_slice(),width).expect("bad width")
        .map(|c| c.expect("read err")).collect();
    assert_eq!(unpacked,codes.to_vec());
}

#[test]
fn width_limits() {
    assert!(matches!(CodeEncoder::new(Vec::new(),CAPACITY - 7),Err(Error::BufferCapacity{..})));
    assert!(matches!(CodeDecoder::new([0_u8].as_slice(),0),Err(Error::BufferCapacity{..})));
    assert!(CodeEncoder::new(Vec::new(),CAPACITY - 8).is_ok());
}
