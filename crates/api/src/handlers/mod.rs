pub mod health;
pub mod images;
pub mod projects;
pub mod quests;
pub mod users;
