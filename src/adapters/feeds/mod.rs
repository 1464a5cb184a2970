pub mod cinii;
pub mod ndl;
pub mod syndication;

pub use cinii::CiniiFeed;
pub use ndl::NdlFeed;
pub use syndication::{FeedEntry, FeedError};
