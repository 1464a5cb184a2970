pub mod availability;
pub mod book;
pub mod errors;
pub mod goal;
pub mod user;
pub mod value_objects;

pub use availability::{AvailabilityRow, AvailabilityStatus};
pub use book::{Book, BookCandidate};
pub use errors::*;
pub use goal::{Goal, GoalBook, GoalBookEntry, GoalProgress};
pub use user::User;
pub use value_objects::*;
