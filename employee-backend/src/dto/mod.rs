// src/dto/mod.rs

pub mod auth_dto;
pub mod employee_dto;

pub use auth_dto::{LoginRequest, LoginResponse};
pub use employee_dto::{
    ChangePasswordRequest, CreateEmployeeRequest, EmployeeResponse, PhoneRequest, PhoneResponse,
    UpdateEmployeeRequest,
};
