use crate::errors::Result;
use crate::{AtomicPageId, PageId, PAGE_SIZE};
use slog::Logger;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::atomic::Ordering;

// DiskManager takes care of the allocation and deallocation of pages within a database. It performs the reading and
// writing of pages to and from disk, providing a logical file layer within the context of a database management system.
pub struct DiskManager {
    next_page_id: AtomicPageId,
    num_writes: u32,
    num_reads: u32,
    num_deallocates: u32,
    db_file: File,
    log_file: File,
    logger: Logger,
}

impl DiskManager {
    // Creates a new disk manager that writes to the specified database file.
    pub fn new(filename: &str, logger: &Logger) -> Result<Self> {
        if let Some(n) = filename.rfind('.') {
            let log_name = filename[..n].to_string() + ".log";
            debug!(logger, "log_name: {:?}", log_name);

            let log_file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(log_name)?;

            let db_file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(filename)?;

            Ok(Self {
                next_page_id: AtomicPageId::new(0),
                num_writes: 0,
                num_reads: 0,
                num_deallocates: 0,
                db_file,
                log_file,
                logger: logger.clone(),
            })
        } else {
            bail!("wrong file format")
        }
    }

    // Write the contents of the specified page into disk file
    pub fn write_page(&mut self, page_id: PageId, page_data: &[u8]) -> Result<()> {
        let offset = page_id * PAGE_SIZE as u64;
        self.num_writes += 1;
        debug!(self.logger, "num_writes: {:?}", self.num_writes);
        self.db_file.seek(SeekFrom::Start(offset))?;
        self.db_file.write_all(page_data)?;
        self.db_file.flush()?;
        Ok(())
    }

    // Read the contents of the specified page into the given memory area
    pub fn read_page(&mut self, page_id: PageId, page_data: &mut [u8]) -> Result<()> {
        let offset = page_id * PAGE_SIZE as u64;

        if offset > self.db_file.metadata()?.len() {
            bail!("I/O error reading past end of file")
        } else {
            self.num_reads += 1;
            // set read cursor to offset
            self.db_file.seek(SeekFrom::Start(offset))?;
            let n = self.db_file.read(page_data)?;
            if n < PAGE_SIZE {
                warn!(
                    self.logger,
                    "Read less than a page, n: {}, page_size: {}", n, PAGE_SIZE
                );
            }
        }
        Ok(())
    }

    // Write the contents of the log into disk file
    pub fn write_log(&mut self, log_data: &[u8]) -> Result<()> {
        if log_data.is_empty() {
            return Ok(());
        }

        self.log_file.write_all(log_data)?;
        self.log_file.flush()?;

        Ok(())
    }

    pub fn read_log(&mut self, log_data: &mut [u8], offset: u64) -> Result<bool> {
        if offset >= self.log_file.metadata()?.len() {
            return Ok(false);
        }
        let log_size = log_data.len();
        self.log_file.seek(SeekFrom::Start(offset))?;
        let n = self.log_file.read(log_data)?;
        if n < log_size {
            warn!(
                self.logger,
                "Read less than a page, n: {}, log_size: {}", n, log_size
            );
        }
        Ok(true)
    }

    pub fn allocate_page(&mut self) -> PageId {
        self.next_page_id.fetch_add(1, Ordering::SeqCst);
        self.next_page_id.load(Ordering::SeqCst)
    }

    // Releases a page identifier. The data file is left untouched; only the
    // bookkeeping changes.
    pub fn deallocate_page(&mut self, page_id: PageId) {
        self.num_deallocates += 1;
        debug!(self.logger, "deallocate page_id: {:?}", page_id);
    }

    pub fn get_num_writes(&self) -> u32 {
        self.num_writes
    }

    pub fn get_num_reads(&self) -> u32 {
        self.num_reads
    }

    pub fn get_num_deallocates(&self) -> u32 {
        self.num_deallocates
    }
}
