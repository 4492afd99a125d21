pub mod buffer_pool_manager;
pub mod lru_replacer;
pub mod replace;
