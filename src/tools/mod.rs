//! Building blocks shared by the LZW coder and decoder.

pub mod bit_buffer;
pub mod dictionary;
