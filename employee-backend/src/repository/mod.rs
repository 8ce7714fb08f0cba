// src/repository/mod.rs

pub mod employee_repository;
pub mod in_memory;
pub mod sea_orm_store;

pub use employee_repository::{EmployeeRepository, UnitOfWork, UnitOfWorkFactory};
pub use in_memory::InMemoryEmployeeStore;
pub use sea_orm_store::SeaOrmUnitOfWorkFactory;
