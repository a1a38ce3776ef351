// src/lib.rs

pub mod common;
pub mod config;
pub mod db;
pub mod email;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;
