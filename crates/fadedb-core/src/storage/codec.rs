//! Row codec for encoding/decoding field values to/from bytes.
//!
//! Rows are stored as an ordered field list. Format:
//! - Field count (4 bytes, little-endian)
//! - For each field:
//!   - Field name length (2 bytes, little-endian)
//!   - Field name (UTF-8 bytes)
//!   - Value tag (1 byte)
//!   - Value data (variable length, depends on type)

use crate::error::Error;
use crate::value::Value;

/// Type tag for encoded values.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueTag {
    Null = 0,
    Bool = 1,
    Int32 = 2,
    Int64 = 3,
    Float64 = 4,
    String = 5,
    Bytes = 6,
    Timestamp = 7,
    Uuid = 8,
}

impl TryFrom<u8> for ValueTag {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ValueTag::Null),
            1 => Ok(ValueTag::Bool),
            2 => Ok(ValueTag::Int32),
            3 => Ok(ValueTag::Int64),
            4 => Ok(ValueTag::Float64),
            5 => Ok(ValueTag::String),
            6 => Ok(ValueTag::Bytes),
            7 => Ok(ValueTag::Timestamp),
            8 => Ok(ValueTag::Uuid),
            _ => Err(Error::InvalidData(format!("unknown value tag: {}", value))),
        }
    }
}

/// Encode a list of field name/value pairs to bytes.
pub fn encode_row(fields: &[(String, Value)]) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();

    let count = fields.len() as u32;
    buf.extend_from_slice(&count.to_le_bytes());

    for (name, value) in fields {
        let name_bytes = name.as_bytes();
        if name_bytes.len() > u16::MAX as usize {
            return Err(Error::InvalidData("field name too long".into()));
        }
        buf.extend_from_slice(&(name_bytes.len() as u16).to_le_bytes());
        buf.extend_from_slice(name_bytes);

        encode_value(&mut buf, value)?;
    }

    Ok(buf)
}

/// Decode bytes back to field name/value pairs.
pub fn decode_row(data: &[u8]) -> Result<Vec<(String, Value)>, Error> {
    let mut cursor = 0;

    if data.len() < 4 {
        return Err(Error::InvalidData("data too short for field count".into()));
    }
    let count = u32::from_le_bytes(data[cursor..cursor + 4].try_into().unwrap()) as usize;
    cursor += 4;

    let mut fields = Vec::with_capacity(count);

    for _ in 0..count {
        if cursor + 2 > data.len() {
            return Err(Error::InvalidData("data too short for field name length".into()));
        }
        let name_len = u16::from_le_bytes(data[cursor..cursor + 2].try_into().unwrap()) as usize;
        cursor += 2;

        if cursor + name_len > data.len() {
            return Err(Error::InvalidData("data too short for field name".into()));
        }
        let name = String::from_utf8(data[cursor..cursor + name_len].to_vec())
            .map_err(|_| Error::InvalidData("invalid UTF-8 in field name".into()))?;
        cursor += name_len;

        let (value, bytes_read) = decode_value(&data[cursor..])?;
        cursor += bytes_read;

        fields.push((name, value));
    }

    Ok(fields)
}

/// Encode a single value to the buffer.
fn encode_value(buf: &mut Vec<u8>, value: &Value) -> Result<(), Error> {
    match value {
        Value::Null => {
            buf.push(ValueTag::Null as u8);
        }
        Value::Bool(b) => {
            buf.push(ValueTag::Bool as u8);
            buf.push(if *b { 1 } else { 0 });
        }
        Value::Int32(n) => {
            buf.push(ValueTag::Int32 as u8);
            buf.extend_from_slice(&n.to_le_bytes());
        }
        Value::Int64(n) => {
            buf.push(ValueTag::Int64 as u8);
            buf.extend_from_slice(&n.to_le_bytes());
        }
        Value::Float64(f) => {
            buf.push(ValueTag::Float64 as u8);
            buf.extend_from_slice(&f.to_le_bytes());
        }
        Value::String(s) => {
            buf.push(ValueTag::String as u8);
            let bytes = s.as_bytes();
            if bytes.len() > u32::MAX as usize {
                return Err(Error::InvalidData("string too long".into()));
            }
            buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            buf.extend_from_slice(bytes);
        }
        Value::Bytes(b) => {
            buf.push(ValueTag::Bytes as u8);
            if b.len() > u32::MAX as usize {
                return Err(Error::InvalidData("bytes too long".into()));
            }
            buf.extend_from_slice(&(b.len() as u32).to_le_bytes());
            buf.extend_from_slice(b);
        }
        Value::Timestamp(ts) => {
            buf.push(ValueTag::Timestamp as u8);
            buf.extend_from_slice(&ts.to_le_bytes());
        }
        Value::Uuid(uuid) => {
            buf.push(ValueTag::Uuid as u8);
            buf.extend_from_slice(uuid);
        }
    }
    Ok(())
}

/// Decode a single value from the buffer.
/// Returns the value and the number of bytes consumed.
fn decode_value(data: &[u8]) -> Result<(Value, usize), Error> {
    if data.is_empty() {
        return Err(Error::InvalidData("empty data for value".into()));
    }

    let tag = ValueTag::try_from(data[0])?;
    let mut cursor = 1;

    let value = match tag {
        ValueTag::Null => Value::Null,
        ValueTag::Bool => {
            if cursor >= data.len() {
                return Err(Error::InvalidData("data too short for bool".into()));
            }
            let v = data[cursor] != 0;
            cursor += 1;
            Value::Bool(v)
        }
        ValueTag::Int32 => {
            if cursor + 4 > data.len() {
                return Err(Error::InvalidData("data too short for i32".into()));
            }
            let v = i32::from_le_bytes(data[cursor..cursor + 4].try_into().unwrap());
            cursor += 4;
            Value::Int32(v)
        }
        ValueTag::Int64 => {
            if cursor + 8 > data.len() {
                return Err(Error::InvalidData("data too short for i64".into()));
            }
            let v = i64::from_le_bytes(data[cursor..cursor + 8].try_into().unwrap());
            cursor += 8;
            Value::Int64(v)
        }
        ValueTag::Float64 => {
            if cursor + 8 > data.len() {
                return Err(Error::InvalidData("data too short for f64".into()));
            }
            let v = f64::from_le_bytes(data[cursor..cursor + 8].try_into().unwrap());
            cursor += 8;
            Value::Float64(v)
        }
        ValueTag::String => {
            if cursor + 4 > data.len() {
                return Err(Error::InvalidData("data too short for string length".into()));
            }
            let len = u32::from_le_bytes(data[cursor..cursor + 4].try_into().unwrap()) as usize;
            cursor += 4;
            if cursor + len > data.len() {
                return Err(Error::InvalidData("data too short for string".into()));
            }
            let v = String::from_utf8(data[cursor..cursor + len].to_vec())
                .map_err(|_| Error::InvalidData("invalid UTF-8 in string".into()))?;
            cursor += len;
            Value::String(v)
        }
        ValueTag::Bytes => {
            if cursor + 4 > data.len() {
                return Err(Error::InvalidData("data too short for bytes length".into()));
            }
            let len = u32::from_le_bytes(data[cursor..cursor + 4].try_into().unwrap()) as usize;
            cursor += 4;
            if cursor + len > data.len() {
                return Err(Error::InvalidData("data too short for bytes".into()));
            }
            let v = data[cursor..cursor + len].to_vec();
            cursor += len;
            Value::Bytes(v)
        }
        ValueTag::Timestamp => {
            if cursor + 8 > data.len() {
                return Err(Error::InvalidData("data too short for timestamp".into()));
            }
            let v = i64::from_le_bytes(data[cursor..cursor + 8].try_into().unwrap());
            cursor += 8;
            Value::Timestamp(v)
        }
        ValueTag::Uuid => {
            if cursor + 16 > data.len() {
                return Err(Error::InvalidData("data too short for uuid".into()));
            }
            let mut uuid = [0u8; 16];
            uuid.copy_from_slice(&data[cursor..cursor + 16]);
            cursor += 16;
            Value::Uuid(uuid)
        }
    };

    Ok((value, cursor))
}
