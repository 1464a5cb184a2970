mod errors;
mod goal_service;

pub use errors::{GoalApplicationError, Result};
pub use goal_service::{
    CreateGoal, GoalDependencies, GoalDetail, GoalSummary, archive_goal, create_goal, get_goal,
    get_or_create_books, list_goals, update_goal_book_status,
};
