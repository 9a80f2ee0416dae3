//! Core types for conversations, schemas, and generation results

mod generate;
mod message;
mod schema;

pub use generate::{ObjectOutput, TextOutput};
pub use message::{Message, Role};
pub use schema::Schema;
