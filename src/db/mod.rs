// src/db/mod.rs

pub mod brand_repo;
pub mod contact_repo;
pub mod custom_field_repo;
pub mod rma_repo;
pub mod service_centre_repo;
pub mod settings_repo;

pub use brand_repo::BrandRepository;
pub use contact_repo::ContactRepository;
pub use custom_field_repo::CustomFieldRepository;
pub use rma_repo::RmaRepository;
pub use service_centre_repo::ServiceCentreRepository;
pub use settings_repo::SettingsRepository;
