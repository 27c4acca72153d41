//! Binary Item Codec
//!
//! Stable byte-level encoding of an [`Item`] for storage in the shared
//! slot. The archive is self-describing: a field count followed by keyed,
//! type-tagged values, so decoders tolerate unknown fields and missing
//! optional ones.
//!
//! Decoding is deliberately asymmetric: a missing or non-string `name`
//! field makes the whole archive unusable, while a missing `purchased`
//! field decodes as `false`.

use crate::models::Item;

const TAG_STRING: u8 = 1;
const TAG_BOOL: u8 = 2;

const NAME_KEY: &str = "name";
const PURCHASED_KEY: &str = "purchased";

/// Encode an item into its archive form.
///
/// A `None` name writes no name field at all, which renders the archive
/// undecodable by [`decode_item`].
pub fn encode_item(item: &Item) -> Vec<u8> {
    let mut buf = Vec::with_capacity(32);
    let field_count = if item.name.is_some() { 2u8 } else { 1u8 };
    buf.push(field_count);
    if let Some(name) = &item.name {
        put_key(&mut buf, NAME_KEY);
        buf.push(TAG_STRING);
        put_string(&mut buf, name);
    }
    put_key(&mut buf, PURCHASED_KEY);
    buf.push(TAG_BOOL);
    buf.push(item.purchased as u8);
    buf
}

/// Decode an archive produced by [`encode_item`].
///
/// Returns `None` when the buffer is malformed or the name field is
/// missing or not a string.
pub fn decode_item(data: &[u8]) -> Option<Item> {
    let mut cursor = 0usize;
    let field_count = read_u8(data, &mut cursor)?;
    let mut name: Option<String> = None;
    let mut purchased = false;
    for _ in 0..field_count {
        let key = read_key(data, &mut cursor)?;
        let tag = read_u8(data, &mut cursor)?;
        match tag {
            TAG_STRING => {
                let value = read_string(data, &mut cursor)?;
                if key == NAME_KEY {
                    name = Some(value);
                }
            }
            TAG_BOOL => {
                let value = read_u8(data, &mut cursor)?;
                if key == PURCHASED_KEY {
                    purchased = value != 0;
                }
            }
            _ => return None,
        }
    }
    // A name under a non-string tag never lands in `name`, so the
    // hard-fail covers both the missing and the mistyped case.
    let name = name?;
    Some(Item {
        name: Some(name),
        purchased,
    })
}

fn put_key(buf: &mut Vec<u8>, key: &str) {
    buf.push(key.len() as u8);
    buf.extend_from_slice(key.as_bytes());
}

fn put_string(buf: &mut Vec<u8>, value: &str) {
    buf.extend_from_slice(&(value.len() as u32).to_le_bytes());
    buf.extend_from_slice(value.as_bytes());
}

fn read_u8(data: &[u8], cursor: &mut usize) -> Option<u8> {
    let byte = *data.get(*cursor)?;
    *cursor += 1;
    Some(byte)
}

fn read_key(data: &[u8], cursor: &mut usize) -> Option<String> {
    let len = read_u8(data, cursor)? as usize;
    read_utf8(data, cursor, len)
}

fn read_string(data: &[u8], cursor: &mut usize) -> Option<String> {
    let raw = data.get(*cursor..*cursor + 4)?;
    let len = u32::from_le_bytes(raw.try_into().ok()?) as usize;
    *cursor += 4;
    read_utf8(data, cursor, len)
}

fn read_utf8(data: &[u8], cursor: &mut usize, len: usize) -> Option<String> {
    let raw = data.get(*cursor..*cursor + len)?;
    *cursor += len;
    String::from_utf8(raw.to_vec()).ok()
}
