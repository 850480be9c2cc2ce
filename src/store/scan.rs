//! Lazy key scan
//!
//! Pages through the table by keyset (`WHERE id > last ORDER BY id`), so no
//! statement stays open between calls to `next` and each page is a fresh,
//! bounded query.

use std::vec;

use crate::error::Result;

use super::RecordStore;

/// Iterator over all keys in ascending order
pub struct KeyScan<'a> {
    store: &'a RecordStore,
    page: vec::IntoIter<String>,
    last: Option<String>,
    exhausted: bool,
}

impl<'a> KeyScan<'a> {
    pub(super) fn new(store: &'a RecordStore) -> Self {
        Self {
            store,
            page: Vec::new().into_iter(),
            last: None,
            exhausted: false,
        }
    }
}

impl Iterator for KeyScan<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(id) = self.page.next() {
                return Some(Ok(id));
            }
            if self.exhausted {
                return None;
            }

            match self.store.fetch_page(self.last.as_deref()) {
                Ok(ids) => {
                    self.exhausted = ids.len() < self.store.scan_batch_size();
                    if let Some(last) = ids.last() {
                        self.last = Some(last.clone());
                    }
                    self.page = ids.into_iter();
                }
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
