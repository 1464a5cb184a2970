pub mod goal_repository;
pub mod user_repository;

// パブリックに型を再エクスポート
pub use goal_repository::{
    BookRepository as PostgresBookRepository, GoalRepository as PostgresGoalRepository,
};
pub use user_repository::UserRepository as PostgresUserRepository;
