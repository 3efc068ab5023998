//! Container format
//!
//! A compressed payload travels inside a small self-describing envelope,
//! so expansion can pick the codec and suggest an output name without any
//! out-of-band information.  Byte layout:
//!
//! ```text
//! offset  size   field
//! 0       4      magic 'C','M','P','R'
//! 4       1      version, currently 1
//! 5       1      codec name length N
//! 6       N      codec name, canonical lower-case UTF-8
//! 6+N     1      extension length E
//! 7+N     E      original extension, UTF-8, may be empty
//! 7+N+E   *      payload, opaque to the container
//! ```

use crate::Error;

pub const MAGIC: [u8;4] = *b"CMPR";
pub const VERSION: u8 = 1;

/// Wrap a codec payload.  The codec name and extension must each fit in a
/// one-byte length field.
pub fn wrap(codec_name: &str, extension: &str, payload: &[u8]) -> Result<Vec<u8>,Error> {
    if codec_name.len() > 255 || extension.len() > 255 {
        return Err(Error::InvalidInput);
    }
    let mut ans = Vec::with_capacity(7 + codec_name.len() + extension.len() + payload.len());
    ans.extend(MAGIC);
    ans.push(VERSION);
    ans.push(codec_name.len() as u8);
    ans.extend(codec_name.as_bytes());
    ans.push(extension.len() as u8);
    ans.extend(extension.as_bytes());
    ans.extend(payload);
    Ok(ans)
}

/// Read a one-byte length followed by that many bytes of UTF-8
fn read_field(buf: &[u8], ptr: &mut usize) -> Result<String,Error> {
    if *ptr >= buf.len() {
        return Err(Error::TruncatedContainer);
    }
    let len = buf[*ptr] as usize;
    *ptr += 1;
    if *ptr + len > buf.len() {
        return Err(Error::TruncatedContainer);
    }
    let field = String::from_utf8(buf[*ptr..*ptr+len].to_vec())
        .map_err(|_| Error::MalformedPayload)?;
    *ptr += len;
    Ok(field)
}

/// Parse a container into (codec name, extension, payload).  The name is
/// returned as stored, resolving it to a codec is the caller's business,
/// and the payload is not interpreted here.
pub fn parse(buf: &[u8]) -> Result<(String,String,&[u8]),Error> {
    if buf.len() < 4 {
        return Err(Error::TruncatedContainer);
    }
    if buf[0..4] != MAGIC {
        return Err(Error::BadMagic);
    }
    if buf.len() < 5 {
        return Err(Error::TruncatedContainer);
    }
    if buf[4] != VERSION {
        log::error!("container version {} is not supported",buf[4]);
        return Err(Error::UnsupportedVersion);
    }
    let mut ptr = 5;
    let codec_name = read_field(buf,&mut ptr)?;
    let extension = read_field(buf,&mut ptr)?;
    Ok((codec_name,extension,&buf[ptr..]))
}


// *************** TESTS *****************

#[test]
fn round_trip() {
    let wrapped = wrap("lzw",".txt",b"payload bytes").expect("wrapping failed");
    let (name,ext,payload) = parse(&wrapped).expect("parsing failed");
    assert_eq!(name,"lzw");
    assert_eq!(ext,".txt");
    assert_eq!(payload,b"payload bytes");
}

#[test]
fn layout_is_exact() {
    let wrapped = wrap("rle",".md",b"\x01\x02").expect("wrapping failed");
    assert_eq!(wrapped,hex::decode("434D5052 01 03 726C65 03 2E6D64 0102".replace(" ","")).unwrap());
}

#[test]
fn empty_extension_and_payload() {
    let wrapped = wrap("huffman","",b"").expect("wrapping failed");
    let (name,ext,payload) = parse(&wrapped).expect("parsing failed");
    assert_eq!(name,"huffman");
    assert_eq!(ext,"");
    assert_eq!(payload,b"");
}

#[test]
fn bad_magic() {
    assert_eq!(parse(b"XXXX\x01\x03rle\x00").unwrap_err(),Error::BadMagic);
}

#[test]
fn unsupported_version() {
    assert_eq!(parse(b"CMPR\x02\x03rle\x00").unwrap_err(),Error::UnsupportedVersion);
}

#[test]
fn truncation_everywhere() {
    let wrapped = wrap("lzw",".txt",b"").expect("wrapping failed");
    // any prefix that cuts the header short must be reported, except the
    // full header itself
    for keep in 0..wrapped.len() {
        assert_eq!(parse(&wrapped[0..keep]).unwrap_err(),Error::TruncatedContainer,"prefix {}",keep);
    }
    assert!(parse(&wrapped).is_ok());
}

#[test]
fn oversize_fields_rejected() {
    let long = "x".repeat(256);
    assert_eq!(wrap(&long,"",b"").unwrap_err(),Error::InvalidInput);
    assert_eq!(wrap("rle",&long,b"").unwrap_err(),Error::InvalidInput);
}
