pub mod availability_provider;
pub mod cache_store;
pub mod goal_repository;
pub mod metadata_feed;
pub mod user_repository;

pub use availability_provider::{AvailabilityProvider, ScriptedStep};
pub use cache_store::CacheStore;
pub use goal_repository::{BookRepository, GoalRepository};
pub use metadata_feed::MetadataFeed;
pub use user_repository::UserRepository;
