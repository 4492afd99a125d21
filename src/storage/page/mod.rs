use crate::{AtomicPageId, PageId, INVALID_PAGE_ID, PAGE_SIZE};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

// One frame of the buffer pool: a page worth of bytes plus the metadata the
// pool uses to decide when the bytes may be replaced. Metadata only changes
// under the pool latch; the data lock is the read/write latch callers hold
// while the page is pinned.
pub struct Page {
    data: RwLock<Box<[u8; PAGE_SIZE]>>,
    page_id: AtomicPageId,
    pin_count: AtomicU32,
    is_dirty: AtomicBool,
}

impl Page {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(Box::new([0; PAGE_SIZE])),
            page_id: AtomicPageId::new(INVALID_PAGE_ID),
            pin_count: AtomicU32::new(0),
            is_dirty: AtomicBool::new(false),
        }
    }

    pub fn get_id(&self) -> PageId {
        self.page_id.load(Ordering::SeqCst)
    }

    pub fn get_pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::SeqCst)
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty.load(Ordering::SeqCst)
    }

    pub fn get_data(&self) -> Vec<u8> {
        self.data.read().to_vec()
    }

    pub fn put_data(&self, data: &[u8]) {
        self.data.write()[..].copy_from_slice(data)
    }

    pub fn read_data(&self) -> RwLockReadGuard<'_, Box<[u8; PAGE_SIZE]>> {
        self.data.read()
    }

    pub fn write_data(&self) -> RwLockWriteGuard<'_, Box<[u8; PAGE_SIZE]>> {
        self.data.write()
    }

    pub(crate) fn set_id(&self, page_id: PageId) {
        self.page_id.store(page_id, Ordering::SeqCst)
    }

    pub(crate) fn set_dirty(&self, dirty: bool) {
        self.is_dirty.store(dirty, Ordering::SeqCst)
    }

    pub(crate) fn set_pin_count(&self, pin_count: u32) {
        self.pin_count.store(pin_count, Ordering::SeqCst)
    }

    pub(crate) fn pin(&self) {
        self.pin_count.fetch_add(1, Ordering::SeqCst);
    }

    // returns the count remaining after this unpin
    pub(crate) fn unpin(&self) -> u32 {
        self.pin_count.fetch_sub(1, Ordering::SeqCst) - 1
    }

    pub(crate) fn reset_memory(&self) {
        self.data.write().fill(0)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}
