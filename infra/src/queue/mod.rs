//! Durable task queue on Redis

mod redis_broker;

pub use redis_broker::{RedisTaskBroker, ARCHIVE_CAPACITY};
