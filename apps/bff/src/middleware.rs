//! # ミドルウェア
//!
//! BFF 用のミドルウェアを提供する。

pub mod request_context;
pub mod request_id;
mod security_headers;

pub use request_context::{detect_embed_mode, extract_token, require_bearer_token};
pub use security_headers::{FrameAncestorsState, frame_ancestors, no_cache};
