// src/services/mod.rs

pub mod notification_service;
pub mod pdf_service;
pub mod rma_service;
pub mod status_engine;
