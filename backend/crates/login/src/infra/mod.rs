//! Infrastructure Layer
//!
//! Database implementations.

pub mod memory;
pub mod postgres;

pub use memory::MemoryLoginRepository;
pub use postgres::PgLoginRepository;
