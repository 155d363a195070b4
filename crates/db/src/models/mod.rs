pub mod character;
pub mod project;
pub mod quest;
pub mod status;
pub mod user;
