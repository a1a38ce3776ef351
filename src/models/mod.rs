// src/models/mod.rs

pub mod brand;
pub mod contact;
pub mod custom_field;
pub mod rma;
pub mod service_centre;
pub mod settings;
