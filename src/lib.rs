mod buffer;
mod container;
mod storage;

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate slog;
extern crate slog_async;
extern crate slog_term;

pub use self::buffer::buffer_pool_manager::BufferPoolManager;
pub use self::buffer::lru_replacer::LruReplacer;
pub use self::buffer::replace::Replacer;
pub use self::container::extendible_hash::ExtendibleHash;
pub use self::storage::disk::disk_manager::DiskManager;
pub use self::storage::page::Page;

pub mod errors {
    pub use anyhow::Error;
    pub use anyhow::Result;
}

pub fn default_logger() -> slog::Logger {
    use slog::Drain;

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    slog::Logger::root(drain, o!())
}

pub const PAGE_SIZE: usize = 4096;
// capacity of each page table bucket
pub const BUCKET_SIZE: usize = 64;

pub type PageId = u64;
pub type FrameId = usize;
pub type AtomicPageId = std::sync::atomic::AtomicU64;

// page id 0 is never allocated; it marks an unoccupied frame
pub const INVALID_PAGE_ID: PageId = 0;
