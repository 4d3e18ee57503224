//! # ceym
//!
//! Pack and unpack byte streams with LZW using a fixed code width anywhere from 9 to 24 bits.
//! The packed stream is nothing but codes, packed least significant bit first.
//! There is no header, so the code width has to be supplied identically on both sides.
//!
//! ```
//! use ceym::lzw;
//! let opt = lzw::Options::with_code_width(12);
//! let packed = lzw::compress_slice(b"abacabadabacabae",&opt).expect("compression failed");
//! let unpacked = lzw::decompress_slice(&packed,&opt).expect("expansion failed");
//! assert_eq!(unpacked,b"abacabadabacabae");
//! ```

mod tools;
pub mod lzw;

pub use tools::bit_buffer::{CodeEncoder,CodeDecoder};
pub use tools::dictionary::{Dictionary,Word};

/// Errors surfaced by compression and expansion
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("code width {width} is outside the supported range {min}..={max}")]
    InvalidCodeWidth {
        width: usize,
        min: usize,
        max: usize
    },
    #[error("code width {width} does not fit a {capacity} bit buffer")]
    BufferCapacity {
        width: usize,
        capacity: usize
    },
    #[error("corrupt stream: got code {code} when at most {next} was possible")]
    CorruptStream {
        code: usize,
        next: usize
    },
    /// A code was extended that the dictionary does not hold, which is a bug rather than bad input.
    #[error("internal error: prefix code is missing from the dictionary")]
    MissingWord,
    #[error("operation cancelled")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] std::io::Error)
}
