//! # Cmpr Library
//!
//! Compress or expand byte buffers with one of three lossless codecs
//! * `rle` encodes runs of identical bytes as (count,value) pairs
//! * `huffman` builds a per-buffer prefix code and ships the table with the bits
//! * `lzw` grows an adaptive string dictionary and emits its codes
//!
//! The codecs transform buffers, not files.  The `container` module wraps a
//! codec payload in a small self-describing envelope (magic, version, codec
//! name, original extension) so that expansion needs no out-of-band
//! information.  File handling belongs to the caller, see the `cmpr` binary
//! for an example.
//!
//! ## Buffer Example
//!
//! ```rs
//! use cmpr::*;
//! let test_data = "This is the chaunt of the priests.  The chaunt of the priests of Mung.".as_bytes();
//! let container = compress_buffer(test_data,CodecId::Lzw,".txt").expect("compression failed");
//! let (ext,expanded) = decompress_buffer(&container).expect("expansion failed");
//! assert_eq!(expanded,test_data);
//! assert_eq!(ext,".txt");
//! ```

pub mod rle;
pub mod huffman;
pub mod lzw;
pub mod container;

/// Codec and container errors
#[derive(thiserror::Error,Debug,PartialEq,Eq)]
pub enum Error {
    #[error("codec name not recognized")]
    UnknownCodec,
    #[error("bad magic bytes")]
    BadMagic,
    #[error("unsupported container version")]
    UnsupportedVersion,
    #[error("container ended early")]
    TruncatedContainer,
    #[error("malformed payload")]
    MalformedPayload,
    #[error("invalid input")]
    InvalidInput
}

/// The closed set of supported codecs.  The canonical lower-case name of
/// each codec is what goes into the container header.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum CodecId {
    Rle,
    Huffman,
    Lzw
}

impl CodecId {
    /// Look up a codec by name, matching is case-insensitive.
    pub fn resolve(name: &str) -> Result<Self,Error> {
        match name.to_ascii_lowercase().as_str() {
            "rle" => Ok(Self::Rle),
            "huffman" => Ok(Self::Huffman),
            "lzw" => Ok(Self::Lzw),
            _ => Err(Error::UnknownCodec)
        }
    }
    /// Canonical name as stored in the container header
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rle => "rle",
            Self::Huffman => "huffman",
            Self::Lzw => "lzw"
        }
    }
}

/// Encode a buffer with the given codec, returning the codec payload.
/// Every codec accepts every buffer, so this cannot fail.
pub fn encode(codec: CodecId, input: &[u8]) -> Vec<u8> {
    match codec {
        CodecId::Rle => rle::encode(input),
        CodecId::Huffman => huffman::encode(input),
        CodecId::Lzw => lzw::encode(input)
    }
}

/// Decode a codec payload back to the original bytes
pub fn decode(codec: CodecId, payload: &[u8]) -> Result<Vec<u8>,Error> {
    match codec {
        CodecId::Rle => rle::decode(payload),
        CodecId::Huffman => huffman::decode(payload),
        CodecId::Lzw => lzw::decode(payload)
    }
}

/// Encode a buffer and wrap the payload in a container.  The extension is
/// stored verbatim as a hint for naming the expanded file later, it may be
/// empty.
pub fn compress_buffer(input: &[u8], codec: CodecId, extension: &str) -> Result<Vec<u8>,Error> {
    let payload = encode(codec,input);
    log::debug!("{} encoded {} into {} payload bytes",codec.name(),input.len(),payload.len());
    container::wrap(codec.name(),extension,&payload)
}

/// Parse a container, pick the codec named in the header, and decode the
/// payload.  Returns the stored extension hint along with the original
/// bytes.
pub fn decompress_buffer(input: &[u8]) -> Result<(String,Vec<u8>),Error> {
    let (name,ext,payload) = container::parse(input)?;
    let codec = CodecId::resolve(&name)?;
    let expanded = decode(codec,payload)?;
    log::debug!("{} decoded {} payload bytes into {}",codec.name(),payload.len(),expanded.len());
    Ok((ext,expanded))
}


// *************** TESTS *****************

/// deterministic stand-in for random data, xorshift with a fixed seed
#[cfg(test)]
fn random_pattern(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x2545f491;
    let mut ans = Vec::with_capacity(len);
    for _i in 0..len {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        ans.push((state >> 24) as u8);
    }
    ans
}

#[cfg(test)]
fn repeated_pattern(len: usize) -> Vec<u8> {
    b"ABC".iter().cycle().take(len).map(|x| *x).collect()
}

#[cfg(test)]
fn sequential_pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 256) as u8).collect()
}

#[cfg(test)]
const TEST_LENGTHS: [usize;7] = [0,1,2,255,256,1000,65536];

#[test]
fn round_trip_law() {
    for codec in [CodecId::Rle,CodecId::Huffman,CodecId::Lzw] {
        for len in TEST_LENGTHS {
            for data in [random_pattern(len),repeated_pattern(len),sequential_pattern(len)] {
                let payload = encode(codec,&data);
                let expanded = decode(codec,&payload).expect("decoding failed");
                assert_eq!(expanded,data,"{} failed at length {}",codec.name(),len);
            }
        }
    }
}

#[test]
fn end_to_end() {
    for codec in [CodecId::Rle,CodecId::Huffman,CodecId::Lzw] {
        let data = repeated_pattern(1000);
        let container = compress_buffer(&data,codec,".txt").expect("compression failed");
        let (ext,expanded) = decompress_buffer(&container).expect("expansion failed");
        assert_eq!(ext,".txt");
        assert_eq!(expanded,data);
    }
}

#[test]
fn empty_extension_is_allowed() {
    let container = compress_buffer(b"some bytes",CodecId::Rle,"").expect("compression failed");
    let (ext,expanded) = decompress_buffer(&container).expect("expansion failed");
    assert_eq!(ext,"");
    assert_eq!(expanded.as_slice(),b"some bytes");
}

#[test]
fn codec_lookup() {
    assert_eq!(CodecId::resolve("rle"),Ok(CodecId::Rle));
    assert_eq!(CodecId::resolve("Huffman"),Ok(CodecId::Huffman));
    assert_eq!(CodecId::resolve("LZW"),Ok(CodecId::Lzw));
    assert_eq!(CodecId::resolve("lzss"),Err(Error::UnknownCodec));
    assert_eq!(CodecId::resolve(""),Err(Error::UnknownCodec));
}

#[test]
fn unknown_codec_in_container() {
    let container = container::wrap("lzss","",b"payload").expect("wrap failed");
    assert_eq!(decompress_buffer(&container),Err(Error::UnknownCodec));
}
