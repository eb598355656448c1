pub mod order_store;
pub use order_store::{fetch_day_with_timeout, fetch_range_with_timeout, OrderStore};
pub mod memory_store;
pub use memory_store::InMemoryOrderStore;
pub mod synthetic;
pub use synthetic::SyntheticOrderGenerator;
pub mod order_repo;
pub use order_repo::PgOrderRepository;
