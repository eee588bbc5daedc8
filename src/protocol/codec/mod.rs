//! Protocol codecs built for a record schema.
//!
//! Each codec is a table with one entry per column, selected by the column's
//! canonical type when the record type is compiled:
//!
//! | Codec | Module | Moves records to and from |
//! |-------|--------|---------------------------|
//! | `JdbcCodec` | `jdbc` | driver result rows and statement parameters |
//! | `WireCodec` | `wire` | the compact binary format |
//! | `TextCodec` | `text` | delimited text lines |

mod delimiters;
mod jdbc;
mod loader;
mod parser;
mod text;
mod wire;

pub use delimiters::DelimiterSet;
pub use jdbc::{JdbcCodec, ParameterSink, RowSource};
pub use loader::{LobLoader, StagingLobLoader};
pub use parser::{tokenize, Token};
pub use text::TextCodec;
pub use wire::WireCodec;
