use crate::buffer::lru_replacer::LruReplacer;
use crate::buffer::replace::Replacer;
use crate::container::extendible_hash::ExtendibleHash;
use crate::errors::Result;
use crate::storage::disk::disk_manager::DiskManager;
use crate::storage::page::Page;
use crate::{FrameId, PageId, BUCKET_SIZE, INVALID_PAGE_ID};
use parking_lot::Mutex;
use slog::Logger;
use std::collections::VecDeque;
use std::sync::Arc;

// State owned by the pool latch. Holding the guard is what serializes the
// public operations, so disk I/O also happens inside it.
struct PoolState {
    free_list: VecDeque<FrameId>,
}

pub struct BufferPoolManager {
    // every frame, created once; FrameId indexes this vector
    pages: Vec<Arc<Page>>,
    // page table for keeping track of buffer pool pages
    page_table: ExtendibleHash<PageId, FrameId>,
    replacer: LruReplacer<FrameId>,
    disk_manager: Arc<Mutex<DiskManager>>,
    latch: Mutex<PoolState>,
    logger: Logger,
}

impl BufferPoolManager {
    pub fn new(pool_size: usize, disk_manager: Arc<Mutex<DiskManager>>, logger: &Logger) -> Self {
        let pages = (0..pool_size).map(|_| Arc::new(Page::new())).collect();
        let free_list = (0..pool_size).collect();

        Self {
            pages,
            page_table: ExtendibleHash::new(BUCKET_SIZE),
            replacer: LruReplacer::new(pool_size),
            disk_manager,
            latch: Mutex::new(PoolState { free_list }),
            logger: logger.clone(),
        }
    }

    pub fn get_pool_size(&self) -> usize {
        self.pages.len()
    }

    // Pin the frame holding `page_id`, loading it from disk if it is not
    // resident. Returns None when every frame is pinned. A failed read puts
    // the chosen frame back on the free list and surfaces the error.
    pub fn fetch_page(&self, page_id: PageId) -> Result<Option<Arc<Page>>> {
        let mut state = self.latch.lock();

        if let Some(frame_id) = self.page_table.find(&page_id) {
            let page = &self.pages[frame_id];
            page.pin();
            self.replacer.erase(frame_id);
            return Ok(Some(Arc::clone(page)));
        }

        let frame_id = match self.get_victim(&mut state) {
            Some(frame_id) => frame_id,
            None => return Ok(None),
        };
        let page = &self.pages[frame_id];

        if page.is_dirty() {
            if let Err(e) = self
                .disk_manager
                .lock()
                .write_page(page.get_id(), &page.read_data()[..])
            {
                self.replacer.insert(frame_id);
                return Err(e);
            }
        }
        if page.get_id() != INVALID_PAGE_ID {
            self.page_table.remove(&page.get_id());
        }
        self.page_table.insert(page_id, frame_id);

        page.reset_memory();
        let read_result = self
            .disk_manager
            .lock()
            .read_page(page_id, &mut page.write_data()[..]);
        if let Err(e) = read_result {
            self.page_table.remove(&page_id);
            page.set_id(INVALID_PAGE_ID);
            page.set_dirty(false);
            state.free_list.push_back(frame_id);
            return Err(e);
        }

        page.set_id(page_id);
        page.set_pin_count(1);
        page.set_dirty(false);
        debug!(
            self.logger,
            "fetched page_id: {:?} into frame: {:?}", page_id, frame_id
        );

        Ok(Some(Arc::clone(page)))
    }

    // Drop one pin. The dirty flag only ever ORs in; it is cleared by a
    // flush or a replacement, never by an unpin. Returns false for a page
    // that is not resident or not pinned.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        let _state = self.latch.lock();

        let frame_id = match self.page_table.find(&page_id) {
            Some(frame_id) => frame_id,
            None => return false,
        };
        let page = &self.pages[frame_id];
        if is_dirty {
            page.set_dirty(true);
        }
        if page.get_pin_count() == 0 {
            return false;
        }
        if page.unpin() == 0 {
            self.replacer.insert(frame_id);
        }
        true
    }

    // Write the page back if dirty. Pinned pages may be flushed too.
    pub fn flush_page(&self, page_id: PageId) -> Result<bool> {
        let _state = self.latch.lock();

        if page_id == INVALID_PAGE_ID {
            return Ok(false);
        }
        let frame_id = match self.page_table.find(&page_id) {
            Some(frame_id) => frame_id,
            None => return Ok(false),
        };
        let page = &self.pages[frame_id];
        if page.is_dirty() {
            self.disk_manager
                .lock()
                .write_page(page_id, &page.read_data()[..])?;
            page.set_dirty(false);
        }
        Ok(true)
    }

    pub fn flush_all_pages(&self) -> Result<()> {
        let _state = self.latch.lock();

        for page in &self.pages {
            if page.get_id() != INVALID_PAGE_ID && page.is_dirty() {
                self.disk_manager
                    .lock()
                    .write_page(page.get_id(), &page.read_data()[..])?;
                page.set_dirty(false);
            }
        }
        Ok(())
    }

    // Allocate a fresh page on disk and pin a zeroed frame for it. Returns
    // (None, INVALID_PAGE_ID) when every frame is pinned.
    pub fn new_page(&self) -> Result<(Option<Arc<Page>>, PageId)> {
        let mut state = self.latch.lock();

        let frame_id = match self.get_victim(&mut state) {
            Some(frame_id) => frame_id,
            None => return Ok((None, INVALID_PAGE_ID)),
        };
        let page = &self.pages[frame_id];

        if page.is_dirty() {
            if let Err(e) = self
                .disk_manager
                .lock()
                .write_page(page.get_id(), &page.read_data()[..])
            {
                self.replacer.insert(frame_id);
                return Err(e);
            }
        }

        let page_id = self.disk_manager.lock().allocate_page();
        debug!(self.logger, "new page_id: {:?}", page_id);

        if page.get_id() != INVALID_PAGE_ID {
            self.page_table.remove(&page.get_id());
        }
        self.page_table.insert(page_id, frame_id);

        page.reset_memory();
        page.set_id(page_id);
        page.set_dirty(false);
        page.set_pin_count(1);

        Ok((Some(Arc::clone(page)), page_id))
    }

    // Evict `page_id` from the pool and release its identifier on disk.
    // Refuses while the page is pinned.
    pub fn delete_page(&self, page_id: PageId) -> bool {
        let mut state = self.latch.lock();

        if let Some(frame_id) = self.page_table.find(&page_id) {
            let page = &self.pages[frame_id];
            if page.get_pin_count() > 0 {
                return false;
            }
            self.replacer.erase(frame_id);
            self.page_table.remove(&page_id);
            page.set_dirty(false);
            page.reset_memory();
            page.set_id(INVALID_PAGE_ID);
            state.free_list.push_back(frame_id);
        }
        self.disk_manager.lock().deallocate_page(page_id);
        true
    }

    // find in free list first, then replacer
    fn get_victim(&self, state: &mut PoolState) -> Option<FrameId> {
        if let Some(frame_id) = state.free_list.pop_front() {
            debug_assert_eq!(self.pages[frame_id].get_id(), INVALID_PAGE_ID);
            debug_assert_eq!(self.pages[frame_id].get_pin_count(), 0);
            return Some(frame_id);
        }
        // when this is also empty, all the pages in the pool are pinned
        self.replacer.victim()
    }
}
