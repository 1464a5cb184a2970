pub mod cache;
pub mod calil;
pub mod directory;
pub mod feeds;
pub mod http;
pub mod mock;
pub mod postgres;
