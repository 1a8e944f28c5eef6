//! Content addressing for Lit Action source: maps a string to the CIDv0 an
//! `ipfs add` of the same bytes would produce, without talking to an IPFS
//! node. A single small block is encoded as a UnixFS file node inside a
//! dag-pb wrapper and hashed with sha2-256.

use crate::error::Result;
use cid::Cid;
use multihash_codetable::{Code, MultihashDigest};

// Contents above one chunk would need a balanced dag; Lit Action sources are
// a few hundred bytes so a single block always suffices here.
const MAX_BLOCK_SIZE: usize = 256 * 1024;

/// Derive the canonical CIDv0 (`Qm…`, base58btc) for a string.
pub fn string_to_cid_v0(content: &str) -> Result<String> {
    let data = content.as_bytes();
    if data.len() > MAX_BLOCK_SIZE {
        return Err(crate::error::Error::Other(format!(
            "content too large for single-block CID: {} bytes",
            data.len()
        )));
    }
    let block = unixfs_file_block(data);
    let hash = Code::Sha2_256.digest(&block);
    let cid = Cid::new_v0(hash)?;
    Ok(cid.to_string())
}

/// Encode `data` as a dag-pb node whose Data field is a UnixFS file message.
///
/// UnixFS `Data`: field 1 Type=File(2), field 2 Data bytes, field 3 filesize.
/// dag-pb `PBNode`: field 1 Data bytes (no links for a single block).
pub fn unixfs_file_block(data: &[u8]) -> Vec<u8> {
    let mut inner = Vec::with_capacity(data.len() + 16);
    inner.push(0x08); // Type, varint
    inner.push(0x02); // File
    if !data.is_empty() {
        inner.push(0x12); // Data, length-delimited
        write_varint(&mut inner, data.len() as u64);
        inner.extend_from_slice(data);
    }
    inner.push(0x18); // filesize, varint
    write_varint(&mut inner, data.len() as u64);

    let mut block = Vec::with_capacity(inner.len() + 8);
    block.push(0x0a); // PBNode.Data, length-delimited
    write_varint(&mut block, inner.len() as u64);
    block.extend_from_slice(&inner);
    block
}

fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        }
        buf.push(byte | 0x80);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_single_and_multi_byte() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 3);
        assert_eq!(buf, vec![0x03]);

        buf.clear();
        write_varint(&mut buf, 300);
        assert_eq!(buf, vec![0xac, 0x02]);
    }

    #[test]
    fn unixfs_block_layout_for_tiny_content() {
        // Hand-assembled: PBNode.Data wrapping {Type: File, Data: "abc", filesize: 3}
        let block = unixfs_file_block(b"abc");
        assert_eq!(
            block,
            vec![0x0a, 0x09, 0x08, 0x02, 0x12, 0x03, b'a', b'b', b'c', 0x18, 0x03]
        );
    }

    #[test]
    fn empty_content_omits_data_field() {
        let block = unixfs_file_block(b"");
        assert_eq!(block, vec![0x0a, 0x04, 0x08, 0x02, 0x18, 0x00]);
    }
}
