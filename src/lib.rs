pub mod api;
pub mod auction;
pub mod autobid;
pub mod bidding;
pub mod cache;
pub mod config;
pub mod detail;
pub mod error;
pub mod notification;
pub mod session;
