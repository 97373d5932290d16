//! parley-core
//!
//! Session lifecycle, persona prompt construction and oracle reply decoding
//! for the parley role-play coaching proxy.
//!
//! The crate is transport-agnostic: `parley-server` wraps it in HTTP, but the
//! [`conversation::ConversationService`] can be driven directly.

pub mod conversation;
pub mod error;
pub mod gateway;
pub mod message;
pub mod oracle;
pub mod persona;
pub mod prompt;
pub mod reply;
pub mod session;

pub use conversation::{ConversationService, SessionStart};
pub use error::{ConversationError, DecodeError, GatewayError, OracleError, PersonaError};
pub use gateway::{Completion, CompletionGateway};
pub use message::{Message, Role};
pub use oracle::{CompletionParams, Oracle};
pub use persona::Persona;
pub use reply::DecodedReply;
pub use session::{SessionStore, TranscriptPolicy};
