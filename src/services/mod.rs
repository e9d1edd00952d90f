pub mod conversation;
pub mod issuer;
pub mod parsing;
pub mod render;
