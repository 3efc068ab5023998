//! LZW Compression
//!
//! The dictionary starts with the 256 single-byte strings and grows by one
//! entry per emitted code, without bound, so peak memory tracks the count
//! of distinct substrings in the buffer.  A dictionary string is
//! identified by (code of its prefix, final symbol), lookups never
//! materialize the string itself.
//!
//! Payload layout: code count as u32 little endian, one byte giving the
//! code width in bits (the smallest width holding the largest code, never
//! below 8), then the codes packed MSB-first with the final byte padded
//! with zero bits.

use bit_vec::BitVec;
use std::collections::HashMap;
use crate::Error;

/// marks a root entry when walking a prefix chain
const ROOT: usize = usize::MAX;

/// Pack a code sequence at a fixed width chosen from the largest code
fn serialize(codes: &[usize]) -> Vec<u8> {
    let mut ans = Vec::new();
    ans.extend(u32::to_le_bytes(codes.len() as u32));
    if codes.is_empty() {
        ans.push(0);
        return ans;
    }
    let max_code = *codes.iter().max().unwrap();
    let width = usize::BITS as usize - max_code.leading_zeros() as usize;
    let width = width.max(8);
    ans.push(width as u8);
    let mut bits = BitVec::with_capacity(codes.len()*width);
    for &code in codes {
        for shift in (0..width).rev() {
            bits.push(code & (1 << shift) != 0);
        }
    }
    ans.extend(bits.to_bytes());
    ans
}

/// Unpack a code sequence, checking the width and the stream length
fn deserialize(payload: &[u8]) -> Result<Vec<usize>,Error> {
    if payload.len() < 5 {
        return Err(Error::MalformedPayload);
    }
    let count = u32::from_le_bytes([payload[0],payload[1],payload[2],payload[3]]) as usize;
    if count == 0 {
        return Ok(Vec::new());
    }
    let width = payload[4] as usize;
    if width < 8 || width > usize::BITS as usize {
        return Err(Error::MalformedPayload);
    }
    let bits = BitVec::from_bytes(&payload[5..]);
    if count*width > bits.len() {
        return Err(Error::MalformedPayload);
    }
    let mut codes = Vec::with_capacity(count);
    let mut ptr = 0;
    for _i in 0..count {
        let mut code = 0;
        for _b in 0..width {
            code = (code << 1) | bits.get(ptr).unwrap() as usize;
            ptr += 1;
        }
        codes.push(code);
    }
    Ok(codes)
}

/// Encode a buffer, emitting the packed code sequence.  Empty input emits
/// an empty sequence.
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut codes: Vec<usize> = Vec::new();
    if !input.is_empty() {
        // roots are implicit, the code of a single byte is its value
        let mut dictionary: HashMap<(usize,u8),usize> = HashMap::new();
        let mut next_code = 256;
        let mut curr_match = input[0] as usize;
        for &sym in &input[1..] {
            match dictionary.get(&(curr_match,sym)) {
                Some(&code) => {
                    curr_match = code;
                },
                None => {
                    codes.push(curr_match);
                    dictionary.insert((curr_match,sym),next_code);
                    next_code += 1;
                    curr_match = sym as usize;
                }
            }
        }
        codes.push(curr_match);
        log::debug!("emitted {} codes, dictionary grew to {} entries",codes.len(),next_code);
    }
    serialize(&codes)
}

/// Walk the prefix chain back to a root to recover the string for a code
fn get_string(dictionary: &[(usize,u8)], mut code: usize) -> Vec<u8> {
    let mut rev = Vec::new();
    loop {
        let (prev,sym) = dictionary[code];
        rev.push(sym);
        if prev == ROOT {
            break;
        }
        code = prev;
    }
    rev.iter().rev().map(|x| *x).collect()
}

/// Decode a payload back to the original bytes.  The dictionary is grown
/// exactly as during encoding, so after k codes it has 256+k-1 entries.
pub fn decode(payload: &[u8]) -> Result<Vec<u8>,Error> {
    let codes = deserialize(payload)?;
    if codes.is_empty() {
        return Ok(Vec::new());
    }
    // entry k holds (code of all but the last symbol, last symbol)
    let mut dictionary: Vec<(usize,u8)> = (0..=255).map(|sym| (ROOT,sym)).collect();
    if codes[0] > 255 {
        log::error!("first LZW code {} is not a root",codes[0]);
        return Err(Error::MalformedPayload);
    }
    let mut prev_str = vec![codes[0] as u8];
    let mut prev_code = codes[0];
    let mut ans = prev_str.clone();
    for &code in &codes[1..] {
        let next_code = dictionary.len();
        let entry = if code < next_code {
            get_string(&dictionary,code)
        } else if code == next_code {
            // the code being defined right now, its string is the previous
            // one extended by its own first symbol
            let mut entry = prev_str.clone();
            entry.push(prev_str[0]);
            entry
        } else {
            log::error!("bad LZW code, expected at most {}, got {}",next_code,code);
            return Err(Error::MalformedPayload);
        };
        dictionary.push((prev_code,entry[0]));
        ans.extend(&entry);
        prev_code = code;
        prev_str = entry;
    }
    Ok(ans)
}


// *************** TESTS *****************

#[test]
fn empty_round_trip() {
    let compressed = encode(b"");
    assert_eq!(compressed,hex::decode("0000000000").unwrap());
    assert_eq!(decode(&compressed).expect("decoding failed"),b"");
}

#[test]
fn compression_works() {
    // 16 codes at 9 bits: the literals TOBEORNOT, a repeated T, then
    // TO BE OR TOB EO RN OT
    let test_data = "TOBEORNOTTOBEORTOBEORNOT".as_bytes();
    let lzw_str = "10000000 09 2A 13 C8 44 52 79 48 9C 4F 2A 40 20 50 48 4C 0E 0B 07";
    let compressed = encode(test_data);
    assert_eq!(compressed,hex::decode(lzw_str.replace(" ","")).unwrap());
    assert_eq!(decode(&compressed).expect("decoding failed"),test_data);
}

#[test]
fn code_stream_shorter_than_input() {
    let test_data = "TOBEORNOTTOBEORTOBEORNOT".as_bytes();
    let compressed = encode(test_data);
    let count = u32::from_le_bytes([compressed[0],compressed[1],compressed[2],compressed[3]]);
    assert!((count as usize) < test_data.len());
}

#[test]
fn self_referencing_code() {
    // the run forces the decoder to use a code before its string is stored
    let test_data = "aaaa".as_bytes();
    let compressed = encode(test_data);
    assert_eq!(decode(&compressed).expect("decoding failed"),test_data);
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = encode(test_data);
    let expanded = decode(&compressed).expect("decoding failed");
    assert_eq!(expanded,test_data);
}

#[test]
fn dictionary_growth() {
    // k codes in, the dictionary must hold 256+k-1 entries, so a code of
    // 256+k-1 in position k is the first one out of range
    let good = serialize(&[97,256]);
    assert_eq!(decode(&good).expect("decoding failed"),b"aaa");
    let bad = serialize(&[97,257]);
    assert_eq!(decode(&bad),Err(Error::MalformedPayload));
}

#[test]
fn bad_first_code() {
    let bad = serialize(&[256]);
    assert_eq!(decode(&bad),Err(Error::MalformedPayload));
}

#[test]
fn truncated_code_stream() {
    let mut compressed = encode(b"some reasonable stretch of input");
    compressed.truncate(compressed.len()-2);
    assert_eq!(decode(&compressed),Err(Error::MalformedPayload));
}
