//! Run-Length Encoding
//!
//! Runs of identical bytes are stored as (count,value) pairs, one byte
//! each.  A run longer than 255 spills into further pairs.  Data with no
//! adjacent equal bytes doubles in size, so this codec is only a good pick
//! for long byte runs.

use crate::Error;

/// Encode a buffer as (count,value) pairs.  Empty input gives empty output.
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut ans = Vec::new();
    let mut bytes = input.iter();
    let (mut count, mut current) = match bytes.next() {
        Some(by) => (1u8,*by),
        None => return ans
    };
    for &by in bytes {
        if by == current && count < 255 {
            count += 1;
        } else {
            ans.push(count);
            ans.push(current);
            count = 1;
            current = by;
        }
    }
    ans.push(count);
    ans.push(current);
    ans
}

/// Expand (count,value) pairs.  The payload must have even length, a
/// dangling count byte is an error.
pub fn decode(payload: &[u8]) -> Result<Vec<u8>,Error> {
    if payload.len() % 2 != 0 {
        log::error!("RLE payload of odd length {}",payload.len());
        return Err(Error::MalformedPayload);
    }
    let mut ans = Vec::new();
    for pair in payload.chunks_exact(2) {
        for _i in 0..pair[0] {
            ans.push(pair[1]);
        }
    }
    Ok(ans)
}


// *************** TESTS *****************

#[test]
fn empty_round_trip() {
    assert_eq!(encode(b""),b"");
    assert_eq!(decode(b"").expect("decoding failed"),b"");
}

#[test]
fn compression_works() {
    let test_data = "AAAAABBBC".as_bytes();
    let compressed = encode(test_data);
    assert_eq!(compressed,hex::decode("05 41 03 42 01 43".replace(" ","")).unwrap());
    assert_eq!(decode(&compressed).expect("decoding failed"),test_data);
}

#[test]
fn long_runs_split() {
    let test_data = [b'A';300];
    let compressed = encode(&test_data);
    assert_eq!(compressed,vec![255,b'A',45,b'A']);
    assert_eq!(decode(&compressed).expect("decoding failed"),test_data);
}

#[test]
fn single_byte_runs() {
    for count in [1u8,2,128,255] {
        let test_data = vec![b'x';count as usize];
        assert_eq!(encode(&test_data),vec![count,b'x']);
    }
}

#[test]
fn expansion_bound() {
    // no two adjacent bytes equal, the worst case exactly doubles
    let test_data: Vec<u8> = (0..1000).map(|i| (i % 256) as u8).collect();
    let compressed = encode(&test_data);
    assert_eq!(compressed.len(),2*test_data.len());
    assert_eq!(decode(&compressed).expect("decoding failed"),test_data);
}

#[test]
fn odd_length_payload_rejected() {
    assert_eq!(decode(&[5,b'A',3]),Err(Error::MalformedPayload));
}
