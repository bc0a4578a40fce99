#![forbid(unsafe_code)]

pub mod mapping;
pub mod repository;
pub mod sqlite;
