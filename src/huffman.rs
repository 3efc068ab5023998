//! Static Huffman Coding
//!
//! A prefix code is derived from the byte frequencies of each buffer, so
//! the code table travels with the packed bits and the decoder never has
//! to rebuild the tree shape.  Payload layout:
//!
//! * code table: entry count as u16 little endian, then per entry the
//!   symbol, the code length in bits, and the code bits packed MSB-first
//!   into whole bytes
//! * one byte giving the number of zero bits appended to the final byte
//! * the code stream, packed MSB-first
//!
//! Empty input serializes as a zero-entry table and nothing else.

use bit_vec::BitVec;
use std::collections::BinaryHeap;
use std::cmp::Reverse;
use crate::Error;

/// Scratch tree node, the arena index of a child stands in for a pointer
#[derive(Clone,Copy)]
enum Node {
    Leaf(u8),
    Internal(usize,usize)
}

/// Build the code for every symbol that occurs at least once.  Ties in the
/// heap fall back on arena order so the codes come out the same every time
/// for a given census.
fn make_codes(freq: &[usize;256]) -> Vec<Option<BitVec>> {
    let mut codes: Vec<Option<BitVec>> = vec![None;256];
    let mut arena: Vec<Node> = Vec::new();
    let mut heap: BinaryHeap<Reverse<(usize,usize)>> = BinaryHeap::new();
    for sym in 0..=255u8 {
        if freq[sym as usize] > 0 {
            arena.push(Node::Leaf(sym));
            heap.push(Reverse((freq[sym as usize],arena.len()-1)));
        }
    }
    if heap.is_empty() {
        return codes;
    }
    if heap.len() == 1 {
        // a lone symbol gets the one-bit code 0, an empty code could not
        // be carried by a positive-length bit stream
        let Reverse((_,node)) = heap.pop().unwrap();
        if let Node::Leaf(sym) = arena[node] {
            codes[sym as usize] = Some(BitVec::from_elem(1,false));
        }
        return codes;
    }
    while heap.len() > 1 {
        let Reverse((freq1,node1)) = heap.pop().unwrap();
        let Reverse((freq2,node2)) = heap.pop().unwrap();
        arena.push(Node::Internal(node1,node2));
        heap.push(Reverse((freq1+freq2,arena.len()-1)));
    }
    let Reverse((_,root)) = heap.pop().unwrap();
    assign_codes(&arena,root,&BitVec::new(),&mut codes);
    codes
}

/// Walk the tree depth first, left appends 0 and right appends 1
fn assign_codes(arena: &[Node], node: usize, prefix: &BitVec, codes: &mut Vec<Option<BitVec>>) {
    match arena[node] {
        Node::Leaf(sym) => {
            codes[sym as usize] = Some(prefix.clone());
        },
        Node::Internal(left,right) => {
            let mut path = prefix.clone();
            path.push(false);
            assign_codes(arena,left,&path,codes);
            path.set(prefix.len(),true);
            assign_codes(arena,right,&path,codes);
        }
    }
}

/// Encode a buffer, emitting the code table followed by the packed code
/// stream.
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut freq = [0usize;256];
    for &by in input {
        freq[by as usize] += 1;
    }
    let codes = make_codes(&freq);
    let mut ans = Vec::new();
    let count = codes.iter().filter(|code| code.is_some()).count();
    ans.extend(u16::to_le_bytes(count as u16));
    for sym in 0..=255u8 {
        if let Some(code) = &codes[sym as usize] {
            ans.push(sym);
            ans.push(code.len() as u8);
            ans.extend(code.to_bytes());
        }
    }
    if input.is_empty() {
        return ans;
    }
    let stream_bits: usize = input.iter()
        .map(|&by| codes[by as usize].as_ref().unwrap().len())
        .sum();
    let pad = (8 - stream_bits % 8) % 8;
    let mut bits = BitVec::with_capacity(8 + stream_bits + pad);
    for shift in (0..8).rev() {
        bits.push(pad & (1 << shift) != 0);
    }
    for &by in input {
        for bit in codes[by as usize].as_ref().unwrap().iter() {
            bits.push(bit);
        }
    }
    for _i in 0..pad {
        bits.push(false);
    }
    ans.extend(bits.to_bytes());
    ans
}

/// Binary trie rebuilt from a shipped code table.  Nodes are parallel
/// vectors, children are arena indices, index 0 is the root.
struct CodeTree {
    down: Vec<[Option<usize>;2]>,
    leaf: Vec<Option<u8>>
}

impl CodeTree {
    fn new() -> Self {
        Self {
            down: vec![[None,None]],
            leaf: vec![None]
        }
    }
    /// Insert a code, failing if it collides with or extends another code,
    /// i.e. the table must be a prefix code.
    fn insert(&mut self, code: &BitVec, sym: u8) -> Result<(),Error> {
        let mut curs = 0;
        for bit in code.iter() {
            if self.leaf[curs].is_some() {
                log::error!("code table has a code extending another");
                return Err(Error::MalformedPayload);
            }
            let side = bit as usize;
            curs = match self.down[curs][side] {
                Some(next) => next,
                None => {
                    self.down.push([None,None]);
                    self.leaf.push(None);
                    let next = self.down.len() - 1;
                    self.down[curs][side] = Some(next);
                    next
                }
            };
        }
        if self.leaf[curs].is_some() || self.down[curs] != [None,None] {
            log::error!("code table entry is not prefix-free");
            return Err(Error::MalformedPayload);
        }
        self.leaf[curs] = Some(sym);
        Ok(())
    }
}

/// Split a payload into its rebuilt code tree and the packed section
fn parse_payload(payload: &[u8]) -> Result<(CodeTree,&[u8]),Error> {
    if payload.len() < 2 {
        return Err(Error::MalformedPayload);
    }
    let count = u16::from_le_bytes([payload[0],payload[1]]) as usize;
    let mut tree = CodeTree::new();
    let mut ptr = 2;
    for _i in 0..count {
        if ptr + 2 > payload.len() {
            return Err(Error::MalformedPayload);
        }
        let sym = payload[ptr];
        let len = payload[ptr+1] as usize;
        if len == 0 {
            return Err(Error::MalformedPayload);
        }
        let code_bytes = (len + 7) / 8;
        if ptr + 2 + code_bytes > payload.len() {
            return Err(Error::MalformedPayload);
        }
        let mut code = BitVec::from_bytes(&payload[ptr+2..ptr+2+code_bytes]);
        code.truncate(len);
        tree.insert(&code,sym)?;
        ptr += 2 + code_bytes;
    }
    Ok((tree,&payload[ptr..]))
}

/// Decode a payload back to the original bytes
pub fn decode(payload: &[u8]) -> Result<Vec<u8>,Error> {
    let (tree,packed) = parse_payload(payload)?;
    if packed.is_empty() {
        return Ok(Vec::new());
    }
    let pad = packed[0] as usize;
    if pad > 7 {
        return Err(Error::MalformedPayload);
    }
    let bits = BitVec::from_bytes(&packed[1..]);
    if pad > bits.len() {
        return Err(Error::MalformedPayload);
    }
    let stream_bits = bits.len() - pad;
    let mut ans = Vec::new();
    let mut curs = 0;
    for bit in bits.iter().take(stream_bits) {
        curs = match tree.down[curs][bit as usize] {
            Some(next) => next,
            None => {
                log::error!("bit sequence missing from the code table");
                return Err(Error::MalformedPayload);
            }
        };
        if let Some(sym) = tree.leaf[curs] {
            ans.push(sym);
            curs = 0;
        }
    }
    if curs != 0 {
        // trailing bits that stop in the middle of a code
        return Err(Error::MalformedPayload);
    }
    Ok(ans)
}


// *************** TESTS *****************

#[test]
fn empty_round_trip() {
    let compressed = encode(b"");
    assert_eq!(compressed,hex::decode("0000").unwrap());
    assert_eq!(decode(&compressed).expect("decoding failed"),b"");
}

#[test]
fn single_symbol() {
    // one leaf, coded as a single zero bit: table (1 entry, 'A', 1 bit,
    // 0b00000000), pad 4, stream 0b00000000
    let compressed = encode(b"AAAA");
    assert_eq!(compressed,hex::decode("0100 41 01 00 04 00".replace(" ","")).unwrap());
    assert_eq!(decode(&compressed).expect("decoding failed"),b"AAAA");
}

#[test]
fn skewed_frequencies() {
    // 'A' dominates so its code must be a single bit
    let test_data = "AAAAAAAABC".as_bytes();
    let mut freq = [0usize;256];
    for &by in test_data {
        freq[by as usize] += 1;
    }
    let codes = make_codes(&freq);
    assert_eq!(codes[b'A' as usize].as_ref().unwrap().len(),1);
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
fn all_byte_values() {
    let test_data: Vec<u8> = (0..=255).collect();
    let compressed = encode(&test_data);
    assert_eq!(decode(&compressed).expect("decoding failed"),test_data);
}

#[test]
fn prefix_property() {
    let test_data = "the rain in spain stays mainly in the plain\n".as_bytes();
    let mut freq = [0usize;256];
    for &by in test_data {
        freq[by as usize] += 1;
    }
    let codes = make_codes(&freq);
    let present: Vec<&BitVec> = codes.iter().filter_map(|code| code.as_ref()).collect();
    for (i,one) in present.iter().enumerate() {
        for (j,other) in present.iter().enumerate() {
            if i == j {
                continue;
            }
            let is_prefix = one.len() <= other.len()
                && one.iter().zip(other.iter()).all(|(a,b)| a == b);
            assert!(!is_prefix,"code {:?} is a prefix of {:?}",one,other);
        }
    }
}

#[test]
fn corrupt_payloads_rejected() {
    // dangling table entry
    assert_eq!(decode(&[1,0,b'A']),Err(Error::MalformedPayload));
    // pad byte out of range
    assert_eq!(decode(&hex::decode("0100 41 01 00 08 00".replace(" ","")).unwrap()),Err(Error::MalformedPayload));
    // bit sequence not in the table: lone entry is code 0, stream starts with 1
    assert_eq!(decode(&hex::decode("0100 41 01 00 00 80".replace(" ","")).unwrap()),Err(Error::MalformedPayload));
}
