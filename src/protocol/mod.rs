//! Record protocol implementation: types, identifiers and codecs.

pub mod buffer;
pub mod codec;
pub mod constants;
pub mod decode;
pub mod identifier;
pub mod types;

pub use buffer::{ReadBuffer, WriteBuffer};
pub use codec::{DelimiterSet, JdbcCodec, TextCodec, WireCodec};
pub use types::{ColumnDescriptor, FieldValue, Record, RecordSchema, TypeCode};
