pub mod conversation;
pub mod envelope;
pub mod response;
pub mod result;
pub mod schema;

pub use conversation::{CONTEXT_WINDOW_TURNS, ConversationHistory, ConversationTurn, Role};
pub use envelope::{ENVELOPE_SCHEMA_VERSION, Envelope, EnvelopeCommandFailure, EnvelopeError};
pub use response::{QueryResponse, response_json_schema};
pub use result::{CellValue, QueryResult, Row};
pub use schema::{ColumnInfo, SchemaInfo, SchemaStats};
