// src/service/mod.rs

pub mod authorization;
pub mod employee_directory;

pub use authorization::AuthorizationPolicy;
pub use employee_directory::EmployeeDirectory;
