pub mod equipment_repository;

pub use equipment_repository::EquipmentRepositoryImpl;
