use crate::core::constants::{ALLOWED_PAGE_SIZES, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::core::errors::LedgerError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// Applies the 0/10 defaults and rejects sizes outside the allow-list.
    pub fn new(page: Option<u32>, size: Option<u32>) -> Result<Self, LedgerError> {
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
        if !ALLOWED_PAGE_SIZES.contains(&size) {
            return Err(LedgerError::InvalidPageSize(size));
        }
        Ok(PageRequest {
            page: page.unwrap_or(DEFAULT_PAGE),
            size,
        })
    }

    fn offset(&self) -> usize {
        self.page as usize * self.size as usize
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl<T: Clone> Page<T> {
    /// Slices an already ordered list.
    pub fn from_sorted(items: &[T], request: PageRequest) -> Self {
        let total_elements = items.len();
        let total_pages = total_elements.div_ceil(request.size as usize);
        let content = items
            .iter()
            .skip(request.offset())
            .take(request.size as usize)
            .cloned()
            .collect();
        Page {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
        }
    }
}
