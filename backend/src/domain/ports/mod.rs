//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod identifier_allocator;
mod order_repository;
mod product_repository;
mod repository_error;

#[cfg(test)]
pub use identifier_allocator::MockIdentifierAllocator;
pub use identifier_allocator::{FixtureIdentifierAllocator, IdentifierAllocator};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::OrderRepository;
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::ProductRepository;
pub use repository_error::RepositoryError;
