// src/handlers/mod.rs

pub mod brands;
pub mod contacts;
pub mod custom_fields;
pub mod rmas;
pub mod service_centres;
pub mod settings;
