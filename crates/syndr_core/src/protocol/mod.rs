//! SyndrDB wire protocol: line framing and reply classification.

pub mod frame;
pub mod parser;

pub use frame::{auth_line, classify_handshake, is_frame_complete, query_line, HandshakeReply};
pub use parser::parse;
