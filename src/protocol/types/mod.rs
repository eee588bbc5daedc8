//! Schema and value types for compiled records.

mod canonical;
mod column;
mod lob;
mod record;
mod schema;
mod type_code;
mod value;

pub use canonical::{accessor_name, CanonicalType, Direction};
pub use column::ColumnDescriptor;
pub use lob::{BlobRef, ClobRef, ExternalLob};
pub use record::Record;
pub use schema::{RecordSchema, WriteColumn};
pub use type_code::TypeCode;
pub use value::FieldValue;
