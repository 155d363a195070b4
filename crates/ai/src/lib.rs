//! Outbound AI integrations: chat-model loot and quest planning, and the
//! image-generation backends.

pub mod config;
pub mod http;
pub mod images;
pub mod loot;
pub mod openrouter;
pub mod parse;
pub mod planner;
