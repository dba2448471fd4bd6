pub mod registry;

use crate::{query::order::EntryComparator, serialize::SerializeError};
use registry::FactoryRegistry;
use std::any::Any;
use thiserror::Error as ThisError;

///
/// Wire codec.
///
/// Pure stream I/O over a byte buffer: fixed-width big-endian scalars,
/// length-prefixed UTF-8 strings, and nested objects tagged by
/// `(factory_id, type_id)`. No retries, no framing; truncated or
/// inconsistent input surfaces as [`CodecError::MalformedStream`].
///

///
/// CodecError
///

#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("malformed stream: {context}")]
    MalformedStream { context: String },

    #[error("unknown wire type: factory {factory_id}, type {type_id}")]
    UnknownType { factory_id: i32, type_id: i32 },

    #[error("field out of wire range: {field}")]
    OutOfRange { field: &'static str },

    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

impl CodecError {
    pub(crate) fn malformed(context: impl Into<String>) -> Self {
        Self::MalformedStream {
            context: context.into(),
        }
    }
}

///
/// WireObject
///
/// A self-serializing wire object. On write, the codec emits the
/// `(factory_id, type_id)` tag pair and delegates to `write_to`; on read, the
/// registry constructs an empty instance for the tag pair and the codec
/// delegates to `read_from` to fill it.
///

pub trait WireObject: std::fmt::Debug {
    fn factory_id(&self) -> i32;

    fn type_id(&self) -> i32;

    fn write_to(&self, writer: &mut WireWriter) -> Result<(), CodecError>;

    fn read_from(&mut self, reader: &mut WireReader<'_>) -> Result<(), CodecError>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

///
/// WireWriter
///

#[derive(Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Write a non-negative count as an i32.
    pub fn write_len(&mut self, len: usize) -> Result<(), CodecError> {
        let len = i32::try_from(len).map_err(|_| CodecError::OutOfRange { field: "length" })?;
        self.write_i32(len);
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write a length-prefixed UTF-8 string.
    pub fn write_utf(&mut self, s: &str) -> Result<(), CodecError> {
        self.write_len(s.len())?;
        self.write_bytes(s.as_bytes());
        Ok(())
    }

    /// Write an optional nested object: presence marker, tag pair, body.
    pub fn write_object(&mut self, obj: Option<&dyn WireObject>) -> Result<(), CodecError> {
        match obj {
            None => {
                self.write_bool(false);
                Ok(())
            }
            Some(obj) => {
                self.write_bool(true);
                self.write_i32(obj.factory_id());
                self.write_i32(obj.type_id());
                obj.write_to(self)
            }
        }
    }
}

///
/// WireReader
///

#[derive(Debug)]
pub struct WireReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    registry: &'a FactoryRegistry,
}

impl<'a> WireReader<'a> {
    #[must_use]
    pub const fn new(bytes: &'a [u8], registry: &'a FactoryRegistry) -> Self {
        Self {
            bytes,
            pos: 0,
            registry,
        }
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Consume exactly `n` bytes or fail with a truncation error.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if n > self.remaining() {
            return Err(CodecError::malformed(format!(
                "unexpected end of stream at byte {}: need {n}, have {}",
                self.pos,
                self.remaining()
            )));
        }

        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::malformed(format!(
                "invalid boolean byte: {other:#04x}"
            ))),
        }
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        let bytes = self.take(4)?;
        let mut fixed = [0u8; 4];
        fixed.copy_from_slice(bytes);
        Ok(i32::from_be_bytes(fixed))
    }

    /// Read a non-negative i32 count.
    pub fn read_len(&mut self) -> Result<usize, CodecError> {
        let len = self.read_i32()?;
        usize::try_from(len)
            .map_err(|_| CodecError::malformed(format!("negative length prefix: {len}")))
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_utf(&mut self) -> Result<String, CodecError> {
        let len = self.read_len()?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| CodecError::malformed("invalid UTF-8 in string"))
    }

    /// Read an optional nested object through the factory registry.
    pub fn read_object(&mut self) -> Result<Option<Box<dyn WireObject>>, CodecError> {
        if !self.read_bool()? {
            return Ok(None);
        }

        let factory_id = self.read_i32()?;
        let type_id = self.read_i32()?;
        let mut obj = self
            .registry
            .create(factory_id, type_id)
            .ok_or(CodecError::UnknownType {
                factory_id,
                type_id,
            })?;
        obj.read_from(self)?;

        Ok(Some(obj))
    }

    /// Read an optional nested object and downcast it to a concrete type.
    pub fn read_object_as<T: WireObject + 'static>(&mut self) -> Result<Option<T>, CodecError> {
        match self.read_object()? {
            None => Ok(None),
            Some(obj) => match obj.into_any().downcast::<T>() {
                Ok(obj) => Ok(Some(*obj)),
                Err(_) => Err(CodecError::malformed(
                    "nested object has unexpected concrete type",
                )),
            },
        }
    }

    /// Read an optional comparator through the registry's comparator table.
    ///
    /// Comparators are trait objects, so they bypass the `Any` downcast used
    /// for concrete nested objects.
    pub fn read_comparator(
        &mut self,
    ) -> Result<Option<Box<dyn EntryComparator>>, CodecError> {
        if !self.read_bool()? {
            return Ok(None);
        }

        let factory_id = self.read_i32()?;
        let type_id = self.read_i32()?;
        let mut comparator = self
            .registry
            .create_comparator(factory_id, type_id)
            .ok_or(CodecError::UnknownType {
                factory_id,
                type_id,
            })?;
        comparator.read_from(self)?;

        Ok(Some(comparator))
    }
}

/// Serialize one object with its tag pair into a fresh byte buffer.
pub fn serialize_object(obj: &dyn WireObject) -> Result<Vec<u8>, CodecError> {
    let mut writer = WireWriter::new();
    writer.write_object(Some(obj))?;
    Ok(writer.into_bytes())
}

/// Deserialize one tagged object from a byte buffer, requiring full
/// consumption of the input.
pub fn deserialize_object(
    bytes: &[u8],
    registry: &FactoryRegistry,
) -> Result<Option<Box<dyn WireObject>>, CodecError> {
    let mut reader = WireReader::new(bytes, registry);
    let obj = reader.read_object()?;

    if reader.remaining() > 0 {
        return Err(CodecError::malformed(format!(
            "{} trailing bytes after object",
            reader.remaining()
        )));
    }

    Ok(obj)
}

///
/// TESTS
///
