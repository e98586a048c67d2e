mod elderly_repository;
mod nurse_repository;
mod walk_repository;

pub use elderly_repository::ElderlyRepository;
pub use nurse_repository::NurseRepository;
pub use walk_repository::{WalkRepository, WalkStatsRow};
