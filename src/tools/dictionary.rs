//! LZW dictionary
//!
//! Maps words (byte strings) to codes and back.  Codes 0 through 255 are the single
//! byte words, new words take the next code in sequence.  Once every code that fits the
//! code width is taken, the dictionary is frozen: insertions are ignored, lookups still work.
//!
//! Every word beyond the roots is some shorter word plus one byte, so the forward
//! direction is keyed on (prefix code, byte).  Extending a match by one byte is then a
//! single hash lookup no matter how long the match has grown.

use std::collections::HashMap;
use std::rc::Rc;
use crate::Error;

/// Number of single byte words that seed the dictionary
pub const ROOT_COUNT: usize = 256;
/// Smallest width that leaves room for at least one word beyond the roots
pub const MIN_CODE_WIDTH: usize = 9;
/// Largest width accepted, the dictionary can hold up to 2^24 words
pub const MAX_CODE_WIDTH: usize = 24;

pub type Word = Rc<[u8]>;

pub fn check_code_width(code_width: usize) -> Result<(),Error> {
    if code_width < MIN_CODE_WIDTH || code_width > MAX_CODE_WIDTH {
        return Err(Error::InvalidCodeWidth { width: code_width, min: MIN_CODE_WIDTH, max: MAX_CODE_WIDTH });
    }
    Ok(())
}

pub struct Dictionary {
    /// (prefix code,byte) maps to the code of prefix + byte
    links: HashMap<(usize,u8),usize>,
    /// code maps to the whole word
    words: Vec<Word>,
    max_code: usize
}

impl Dictionary {
    /// Create the dictionary seeded with every single byte word
    pub fn create(code_width: usize) -> Result<Self,Error> {
        check_code_width(code_width)?;
        let mut dict = Self {
            links: HashMap::new(),
            words: Vec::new(),
            max_code: (1 << code_width) - 1
        };
        for i in 0..ROOT_COUNT {
            dict.words.push(Rc::from([i as u8].as_slice()));
        }
        Ok(dict)
    }
    /// code of the single byte word
    pub fn root(&self,byte: u8) -> usize {
        byte as usize
    }
    /// code of the word `prefix` + `byte`, if it is in the dictionary
    pub fn extend(&self,prefix: usize,byte: u8) -> Option<usize> {
        self.links.get(&(prefix,byte)).copied()
    }
    /// Code of a whole word, walking one link per byte
    pub fn lookup(&self,word: &[u8]) -> Option<usize> {
        let (first,rest) = word.split_first()?;
        let mut code = self.root(*first);
        for byte in rest {
            code = self.extend(code,*byte)?;
        }
        Some(code)
    }
    pub fn word_at(&self,code: usize) -> Option<Word> {
        self.words.get(code).cloned()
    }
    /// the code the next insertion will take
    pub fn next_code(&self) -> usize {
        self.words.len()
    }
    /// number of words, including the roots
    pub fn len(&self) -> usize {
        self.words.len()
    }
    pub fn is_full(&self) -> bool {
        self.words.len() > self.max_code
    }
    /// Assign the next code to the word `prefix` + `byte`, unless the dictionary is full.
    /// Returns whether the word was added.  An unknown prefix is a bug in the caller,
    /// both the coder and the decoder only ever extend codes they already hold.
    pub fn try_insert(&mut self,prefix: usize,byte: u8) -> Result<bool,Error> {
        let base = match self.words.get(prefix) {
            Some(w) => w,
            None => {
                log::error!("prefix code {} is not in the dictionary",prefix);
                return Err(Error::MissingWord);
            }
        };
        if self.is_full() {
            return Ok(false);
        }
        let code = self.words.len();
        let mut word = Vec::with_capacity(base.len() + 1);
        word.extend_from_slice(base);
        word.push(byte);
        // never remap an existing word, a well formed stream never asks for this
        self.links.entry((prefix,byte)).or_insert(code);
        self.words.push(Word::from(word));
        if self.is_full() {
            log::debug!("dictionary frozen at {} words",self.words.len());
        }
        Ok(true)
    }
}

#[test]
fn roots() {
    let dict = Dictionary::create(12).expect("bad width");
    assert_eq!(dict.len(),256);
    assert_eq!(dict.next_code(),256);
    assert_eq!(dict.lookup(b"a"),Some(97));
    assert_eq!(dict.lookup(&[255]),Some(255));
    assert_eq!(dict.word_at(0).as_deref(),Some([0_u8].as_slice()));
    assert!(dict.word_at(256).is_none());
    assert!(dict.lookup(b"ab").is_none());
}

#[test]
fn insert_and_freeze() {
    let mut dict = Dictionary::create(9).expect("bad width");
    for i in 0..256 {
        assert!(dict.try_insert(1,i as u8).expect("missing prefix"));
    }
    assert!(dict.is_full());
    assert_eq!(dict.len(),512);
    assert!(!dict.try_insert(b'x' as usize,b'y').expect("missing prefix"));
    assert_eq!(dict.len(),512);
    assert!(dict.lookup(b"xy").is_none());
    assert_eq!(dict.extend(1,7),Some(263));
    assert_eq!(dict.lookup(&[1,0]),Some(256));
    assert_eq!(dict.lookup(&[1,255]),Some(511));
    assert_eq!(dict.word_at(300).as_deref(),Some([1_u8,44].as_slice()));
}

#[test]
fn no_overwrite() {
    let mut dict = Dictionary::create(10).expect("bad width");
    assert!(dict.try_insert(97,b'b').expect("missing prefix"));
    assert!(dict.try_insert(97,b'b').expect("missing prefix"));
    assert_eq!(dict.lookup(b"ab"),Some(256));
    assert_eq!(dict.next_code(),258);
    assert_eq!(dict.word_at(257).as_deref(),Some(b"ab".as_slice()));
}

#[test]
fn long_words() {
    let mut dict = Dictionary::create(12).expect("bad width");
    let mut code = dict.root(b'a');
    for _i in 0..100 {
        dict.try_insert(code,b'a').expect("missing prefix");
        code = dict.next_code() - 1;
    }
    assert_eq!(dict.word_at(code).map(|w| w.len()),Some(101));
    assert_eq!(dict.lookup(&[b'a';101]),Some(code));
    assert!(dict.lookup(&[b'a';102]).is_none());
    assert!(dict.lookup(&[]).is_none());
}

#[test]
fn unknown_prefix() {
    let mut dict = Dictionary::create(9).expect("bad width");
    assert!(matches!(dict.try_insert(256,b'a'),Err(Error::MissingWord)));
    assert_eq!(dict.next_code(),256);
}

#[test]
fn width_limits() {
    assert!(matches!(Dictionary::create(8),Err(Error::InvalidCodeWidth{width: 8,..})));
    assert!(matches!(Dictionary::create(25),Err(Error::InvalidCodeWidth{width: 25,..})));
    assert!(Dictionary::create(9).is_ok());
    assert!(Dictionary::create(24).is_ok());
}
