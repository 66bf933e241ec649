//! Request and response DTO types for the REST API.

pub mod sql_dto;

pub use sql_dto::{RowsResponse, SqlRequest};
