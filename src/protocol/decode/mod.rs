//! Textual grammars for record field values.
//!
//! The delimited text codec renders every non-text column through one of
//! these grammars and parses it back with the matching decoder.
//!
//! | Canonical type | Module | Form |
//! |----------------|--------|------|
//! | Date           | `datetime` | `YYYY-MM-DD` |
//! | Time           | `datetime` | `HH:MM:SS[.fffffffff]` |
//! | Timestamp      | `datetime` | `YYYY-MM-DD HH:MM:SS.f` |
//! | Boolean        | `boolean`  | `true` / `false` |
//!
//! Numeric types use the standard Rust grammars and don't require
//! dedicated decoders.

mod boolean;
mod datetime;

pub use boolean::{format_boolean, parse_boolean};
pub use datetime::{format_date, format_time, format_timestamp, parse_date, parse_time, parse_timestamp};
