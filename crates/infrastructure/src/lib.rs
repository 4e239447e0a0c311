pub mod backend_factory;
pub mod fabric;
pub mod in_memory_queue;
pub mod memory_store;
pub mod redis_backend;

pub use backend_factory::Backends;
pub use fabric::TaskFabric;
pub use in_memory_queue::InMemoryMessageQueue;
pub use memory_store::{InMemoryServiceRegistry, InMemoryTaskStore, InMemoryWatermarkStore};
pub use redis_backend::{RedisMessageQueue, RedisTaskStore, RedisWatermarkStore};
