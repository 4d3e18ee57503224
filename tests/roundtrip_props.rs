use ceym::lzw::{self,Options};
use ceym::{CodeEncoder,CodeDecoder};
use proptest::prelude::*;

prop_compose! {
    /// Bytes drawn from a small alphabet so that long matches actually occur
    fn arb_text()(
        alphabet in 1u8..8,
        len in 0usize..3000,
    )(
        raw in prop::collection::vec(0u8..alphabet, len),
    ) -> Vec<u8> {
        raw.into_iter().map(|b| b'a' + b).collect()
    }
}

prop_compose! {
    /// A code width and a sequence of codes that fit it
    fn arb_codes()(width in 9usize..=56)(
        width in Just(width),
        codes in prop::collection::vec(0u64..(1u64 << width), 0..200),
    ) -> (usize, Vec<usize>) {
        (width, codes.into_iter().map(|c| c as usize).collect())
    }
}

proptest! {
    /// Property: expansion inverts compression for arbitrary bytes
    #[test]
    fn prop_roundtrip_any(data in prop::collection::vec(any::<u8>(), 0..2000), width in 9usize..=16) {
        let opt = Options::with_code_width(width);
        let packed = lzw::compress_slice(&data, &opt).unwrap();
        prop_assert_eq!(lzw::decompress_slice(&packed, &opt).unwrap(), data);
    }

    /// Property: expansion inverts compression for repetitive text, including a frozen dictionary
    #[test]
    fn prop_roundtrip_text(data in arb_text(), width in 9usize..=12) {
        let opt = Options::with_code_width(width);
        let packed = lzw::compress_slice(&data, &opt).unwrap();
        prop_assert_eq!(lzw::decompress_slice(&packed, &opt).unwrap(), data);
    }

    /// Property: every emitted code fits the dictionary bound
    #[test]
    fn prop_codes_in_bounds(data in arb_text(), width in 9usize..=10) {
        let opt = Options::with_code_width(width);
        let packed = lzw::compress_slice(&data, &opt).unwrap();
        for code in CodeDecoder::new(packed.as_slice(), width).unwrap() {
            prop_assert!(code.unwrap() < (1 << width));
        }
    }

    /// Property: n codes of width w pack into ceil(n*w/8) bytes and unpack unchanged
    #[test]
    fn prop_packing((width, codes) in arb_codes()) {
        let mut packed: Vec<u8> = Vec::new();
        let mut coder = CodeEncoder::new(&mut packed, width).unwrap();
        for c in &codes {
            coder.write(*c).unwrap();
        }
        coder.flush().unwrap();
        prop_assert_eq!(packed.len(), (codes.len() * width + 7) / 8);
        let unpacked: Vec<usize> = CodeDecoder::new(packed.as_slice(), width).unwrap()
            .collect::<Result<Vec<usize>, std::io::Error>>().unwrap();
        prop_assert_eq!(unpacked, codes);
    }
}
