pub mod character_repo;
pub mod project_repo;
pub mod quest_repo;
pub mod user_repo;

pub use character_repo::CharacterRepo;
pub use project_repo::ProjectRepo;
pub use quest_repo::QuestRepo;
pub use user_repo::UserRepo;
