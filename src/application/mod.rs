pub mod auth;
pub mod availability;
pub mod goal;
pub mod recommendation;
