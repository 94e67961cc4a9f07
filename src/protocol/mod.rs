//! Wire protocol: inbound room and board messages, outbound move requests.

pub mod inbound;
pub mod outbound;

pub use inbound::{ActionKind, CardToken, ServerAction, ServerMessage, Snapshot, UNKNOWN_CARD};
pub use outbound::{MoveKind, MoveRequest};
