// src/lib.rs

pub mod db;
pub mod repositories;
pub mod services;
pub mod auth;
pub mod throttle;
pub mod api;
pub mod tasks;

pub use db::{Database, DatabaseSettings};
pub use coupon_common::error::Error;
pub use coupon_common::models;
