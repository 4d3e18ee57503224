//! LZW Compression
//!
//! Fixed code width, no clear or stop codes, no header.  The dictionary grows until
//! every code that fits the code width is taken, after which it is frozen for the rest
//! of the stream.  Compression and expansion have to use the same code width.

use std::io::{Cursor,Read,Write,BufReader,BufWriter};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool,Ordering};
use crate::tools::bit_buffer::{CodeEncoder,CodeDecoder};
use crate::tools::dictionary::{Dictionary,Word,check_code_width};
use crate::Error;

pub use crate::tools::dictionary::{MIN_CODE_WIDTH,MAX_CODE_WIDTH};

pub const DEFAULT_CODE_WIDTH: usize = 12;

/// Options controlling compression
#[derive(Clone)]
pub struct Options {
    /// bits per code, must match between compression and expansion
    pub code_width: usize,
    /// Once this reads `true` the operation stops with `Error::Cancelled` at the next
    /// byte (compression) or code (expansion).  Partial output is left to the caller.
    pub cancel: Option<Arc<AtomicBool>>
}

pub const STD_OPTIONS: Options = Options {
    code_width: DEFAULT_CODE_WIDTH,
    cancel: None
};

impl Options {
    pub fn with_code_width(code_width: usize) -> Self {
        Self {
            code_width,
            cancel: None
        }
    }
    /// Check the code width without starting an operation
    pub fn validate(&self) -> Result<(),Error> {
        check_code_width(self.code_width)
    }
    fn check_cancel(&self) -> Result<(),Error> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(Error::Cancelled),
            _ => Ok(())
        }
    }
}

/// Main compression function.
/// `expanded_in` is any `Read`, e.g. `std::fs::File` or `&[u8]`.
/// `compressed_out` is any `Write`, e.g. `std::fs::File` or `Vec<u8>`.
/// Neither is closed, but `compressed_out` is flushed.
/// Returns (in_size,out_size) or error.
pub fn compress<R,W>(expanded_in: &mut R, compressed_out: &mut W, opt: &Options) -> Result<(u64,u64),Error>
where R: Read, W: Write {
    log::debug!("create LZW dictionary with {} bit codes",opt.code_width);
    let mut dict = Dictionary::create(opt.code_width)?;
    let mut coder = CodeEncoder::new(BufWriter::new(compressed_out),opt.code_width)?;
    let reader = BufReader::new(expanded_in);
    let mut in_size: u64 = 0;
    // code of the longest word matched so far
    let mut curr_code: Option<usize> = None;

    log::debug!("entering loop over matches");
    for maybe_byte in reader.bytes() {
        let byte = maybe_byte?;
        opt.check_cancel()?;
        in_size += 1;
        curr_code = match curr_code {
            None => Some(dict.root(byte)),
            Some(code) => match dict.extend(code,byte) {
                Some(longer) => Some(longer),
                None => {
                    log::trace!("code: {}",code);
                    coder.write(code)?;
                    dict.try_insert(code,byte)?;
                    Some(dict.root(byte))
                }
            }
        };
    }
    if let Some(code) = curr_code {
        log::trace!("code: {}",code);
        coder.write(code)?;
    }
    coder.flush()?;
    log::debug!("compressed {} bytes into {} with {} words",in_size,coder.bytes_written(),dict.len());
    Ok((in_size,coder.bytes_written()))
}

/// Main decompression function.
/// `compressed_in` is any `Read`, e.g. `std::fs::File` or `&[u8]`.
/// `expanded_out` is any `Write`, e.g. `std::fs::File` or `Vec<u8>`.
/// Neither is closed, but `expanded_out` is flushed.
/// Returns (in_size,out_size) or error.
pub fn decompress<R,W>(compressed_in: &mut R, expanded_out: &mut W, opt: &Options) -> Result<(u64,u64),Error>
where R: Read, W: Write {
    log::debug!("create LZW dictionary with {} bit codes",opt.code_width);
    let mut dict = Dictionary::create(opt.code_width)?;
    let mut decoder = CodeDecoder::new(BufReader::new(compressed_in),opt.code_width)?;
    let mut writer = BufWriter::new(expanded_out);
    let mut out_size: u64 = 0;
    let mut prev: Option<(usize,Word)> = None;

    log::debug!("enter main LZW loop");
    while let Some(code) = decoder.read()? {
        opt.check_cancel()?;
        let next_code = dict.next_code();
        let curr_str: Word = match (dict.word_at(code),&prev) {
            (Some(s),_) => s,
            (None,Some((_,prev_str))) if code == next_code => {
                // the code being defined right now, must be prev + first of prev
                let mut s = prev_str.to_vec();
                s.push(prev_str[0]);
                Word::from(s)
            },
            _ => {
                log::error!("Bad LZW code, expected at most {}, got {}",next_code,code);
                return Err(Error::CorruptStream { code, next: next_code });
            }
        };
        if let Some((prev_code,_)) = &prev {
            dict.try_insert(*prev_code,curr_str[0])?;
        }
        writer.write_all(&curr_str)?;
        out_size += curr_str.len() as u64;
        log::trace!("  write {} as {:?}",code,curr_str);
        prev = Some((code,curr_str));
    }
    log::debug!("end of data, closing stream");
    writer.flush()?;
    Ok((decoder.bytes_read(),out_size))
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,Error> {
    let mut src = Cursor::new(slice);
    let mut ans: Vec<u8> = Vec::new();
    compress(&mut src,&mut ans,opt)?;
    Ok(ans)
}

/// Convenience function, calls `decompress` with a slice returning a Vec
pub fn decompress_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,Error> {
    let mut src = Cursor::new(slice);
    let mut ans: Vec<u8> = Vec::new();
    decompress(&mut src,&mut ans,opt)?;
    Ok(ans)
}


// *************** TESTS *****************

#[cfg(test)]
fn unpack_codes(packed: &[u8],code_width: usize) -> Vec<usize> {
    CodeDecoder::new(packed,code_width).expect("bad width")
        .map(|c| c.expect("read err")).collect()
}

#[cfg(test)]
fn pack_codes(codes: &[usize],code_width: usize) -> Vec<u8> {
    let mut ans: Vec<u8> = Vec::new();
    let mut coder = CodeEncoder::new(&mut ans,code_width).expect("bad width");
    for c in codes {
        coder.write(*c).expect("write err");
    }
    coder.flush().expect("flush err");
    ans
}

#[test]
fn compression_works() {
    let test_data = "abacabadabacabae".as_bytes();
    let lzw_str = "61 20 06 61 30 06 00 11 06 64 40 10 03 11 10 65 00";
    let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    assert_eq!(compressed,hex::decode(lzw_str.replace(" ","")).unwrap());
    assert_eq!(unpack_codes(&compressed,12),vec![97,98,97,99,256,97,100,260,259,257,101]);
}

#[test]
fn compression_works_9() {
    // same codes at the minimum width, 11 codes of 9 bits need 13 bytes
    let test_data = "abacabadabacabae".as_bytes();
    let compressed = compress_slice(test_data,&Options::with_code_width(9)).expect("compression failed");
    assert_eq!(compressed.len(),13);
    assert_eq!(unpack_codes(&compressed,9),vec![97,98,97,99,256,97,100,260,259,257,101]);
}

#[test]
fn expansion_works() {
    let lzw_str = "61 20 06 61 30 06 00 11 06 64 40 10 03 11 10 65 00";
    let compressed = hex::decode(lzw_str.replace(" ","")).unwrap();
    let expanded = decompress_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(expanded,"abacabadabacabae".as_bytes().to_vec());
}

#[test]
fn sizes_are_reported() {
    let mut src = "abacabadabacabae".as_bytes();
    let mut packed: Vec<u8> = Vec::new();
    let (in_size,out_size) = compress(&mut src,&mut packed,&STD_OPTIONS).expect("compression failed");
    assert_eq!((in_size,out_size),(16,17));
    let mut unpacked: Vec<u8> = Vec::new();
    let (in_size,out_size) = decompress(&mut packed.as_slice(),&mut unpacked,&STD_OPTIONS).expect("expansion failed");
    assert_eq!((in_size,out_size),(17,16));
}

#[test]
fn repeated_symbol() {
    let compressed = compress_slice(b"aaaa",&STD_OPTIONS).expect("compression failed");
    assert_eq!(unpack_codes(&compressed,12),vec![97,256,97]);
    let expanded = decompress_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(expanded,b"aaaa".to_vec());
    let test_data = vec![b'x';1000];
    let compressed = compress_slice(&test_data,&STD_OPTIONS).expect("compression failed");
    let expanded = decompress_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(expanded,test_data);
}

#[test]
fn long_run() {
    // a run of k(k+1)/2 equal bytes is matched in words of length 1,2,..,k
    let k: usize = 2048;
    let test_data = vec![0_u8;k*(k+1)/2];
    let opt = Options::with_code_width(24);
    let compressed = compress_slice(&test_data,&opt).expect("compression failed");
    let expected: Vec<usize> = std::iter::once(0).chain(256..256+k-1).collect();
    assert_eq!(unpack_codes(&compressed,24),expected);
    let expanded = decompress_slice(&compressed,&opt).expect("expansion failed");
    assert_eq!(expanded,test_data);
}

#[test]
fn empty_and_single() {
    assert!(compress_slice(&[],&STD_OPTIONS).expect("compression failed").is_empty());
    assert!(decompress_slice(&[],&STD_OPTIONS).expect("expansion failed").is_empty());
    let compressed = compress_slice(&[0],&STD_OPTIONS).expect("compression failed");
    assert_eq!(compressed,vec![0,0]);
    let expanded = decompress_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(expanded,vec![0]);
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    for w in [9,10,12,16,24] {
        let opt = Options::with_code_width(w);
        let compressed = compress_slice(test_data,&opt).expect("compression failed");
        let expanded = decompress_slice(&compressed,&opt).expect("expansion failed");
        assert_eq!(test_data.to_vec(),expanded);
    }
}

#[test]
fn invertibility_frozen() {
    // enough variety to fill a 9 bit dictionary many times over
    let mut test_data = Vec::new();
    let mut x: u32 = 12345;
    for _i in 0..20000 {
        x = x.wrapping_mul(1103515245).wrapping_add(12345);
        test_data.push(b'a' + ((x >> 16) % 7) as u8);
    }
    let opt = Options::with_code_width(9);
    let compressed = compress_slice(&test_data,&opt).expect("compression failed");
    assert!(unpack_codes(&compressed,9).iter().all(|c| *c < 512));
    let expanded = decompress_slice(&compressed,&opt).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn corrupt_code() {
    let packed = pack_codes(&[97,300],9);
    match decompress_slice(&packed,&Options::with_code_width(9)) {
        Err(Error::CorruptStream { code, next }) => assert_eq!((code,next),(300,256)),
        _ => panic!("corrupt stream was accepted")
    }
    // nothing to build on for the first code
    let packed = pack_codes(&[256],9);
    assert!(matches!(decompress_slice(&packed,&Options::with_code_width(9)),Err(Error::CorruptStream{..})));
}

#[test]
fn bad_code_width() {
    for w in [0,8,25,64] {
        assert!(matches!(compress_slice(b"abc",&Options::with_code_width(w)),Err(Error::InvalidCodeWidth{..})));
        assert!(matches!(decompress_slice(&[1,2,3],&Options::with_code_width(w)),Err(Error::InvalidCodeWidth{..})));
    }
}

#[test]
fn validation() {
    assert!(STD_OPTIONS.validate().is_ok());
    assert!(Options::with_code_width(MIN_CODE_WIDTH).validate().is_ok());
    assert!(Options::with_code_width(MAX_CODE_WIDTH).validate().is_ok());
    assert!(matches!(Options::with_code_width(MAX_CODE_WIDTH+1).validate(),Err(Error::InvalidCodeWidth{..})));
}

#[test]
fn cancellation() {
    let flag = Arc::new(AtomicBool::new(false));
    let mut opt = STD_OPTIONS;
    opt.cancel = Some(flag.clone());
    let compressed = compress_slice(b"abcabc",&opt).expect("compression failed");
    flag.store(true,Ordering::Relaxed);
    assert!(matches!(compress_slice(b"abcabc",&opt),Err(Error::Cancelled)));
    assert!(matches!(decompress_slice(&compressed,&opt),Err(Error::Cancelled)));
}
