mod dto;
mod entity;
mod error;
mod inventory_repository;
mod inventory_repository_impl;

pub use dto::*;
pub use error::*;
pub use inventory_repository::*;
pub use inventory_repository_impl::*;
