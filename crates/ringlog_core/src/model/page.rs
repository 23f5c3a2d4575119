//! Pagination and sorting vocabulary.
//!
//! # Invariants
//! - A `PageRequest` always has `size >= 1`.
//! - `Page::total_elements` counts every matching row, not just `content`.

use crate::model::field::DataField;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Sort direction for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn sql_keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One `(field, direction)` entry of a sort specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: DataField,
    pub direction: Direction,
}

impl SortOrder {
    pub fn asc(field: DataField) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: DataField) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }
}

/// Ordered sort specification; earlier orders take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    orders: Vec<SortOrder>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(order: SortOrder) -> Self {
        Self {
            orders: vec![order],
        }
    }

    /// Appends a lower-precedence order.
    ///
    /// A field that is already sorted on keeps its first direction.
    pub fn and(mut self, order: SortOrder) -> Self {
        if !self.contains(order.field) {
            self.orders.push(order);
        }
        self
    }

    pub fn orders(&self) -> &[SortOrder] {
        &self.orders
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn contains(&self, field: DataField) -> bool {
        self.orders.iter().any(|order| order.field == field)
    }
}

impl FromIterator<SortOrder> for Sort {
    fn from_iter<I: IntoIterator<Item = SortOrder>>(iter: I) -> Self {
        iter.into_iter().fold(Sort::unsorted(), Sort::and)
    }
}

/// Invalid paging input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequestError {
    ZeroSize,
}

impl Display for PageRequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroSize => write!(f, "page size must be at least 1"),
        }
    }
}

impl Error for PageRequestError {}

/// Zero-based page index, page size and sort order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Sort,
}

impl PageRequest {
    /// Creates an unsorted request for page `page` of `size` rows.
    pub fn of(page: u32, size: u32) -> Result<Self, PageRequestError> {
        if size == 0 {
            return Err(PageRequestError::ZeroSize);
        }
        Ok(Self {
            page,
            size,
            sort: Sort::unsorted(),
        })
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Request for the following page with the same size and sort.
    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self.clone()
        }
    }
}

/// Bounded slice of results plus total-count metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            page: request.page(),
            size: request.size(),
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(u64::from(self.size.max(1)))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) + 1 < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Converts the content while keeping paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, Page, PageRequest, PageRequestError, Sort, SortOrder};
    use crate::model::field::DataField;

    #[test]
    fn zero_size_is_rejected() {
        assert_eq!(PageRequest::of(0, 0), Err(PageRequestError::ZeroSize));
    }

    #[test]
    fn offset_does_not_overflow_u32() {
        let request = PageRequest::of(u32::MAX, u32::MAX).expect("valid request");
        assert_eq!(request.offset(), u64::from(u32::MAX) * u64::from(u32::MAX));
    }

    #[test]
    fn sort_keeps_first_direction_for_repeated_field() {
        let sort = Sort::by(SortOrder::desc(DataField::Steps))
            .and(SortOrder::asc(DataField::Steps))
            .and(SortOrder::asc(DataField::Date));

        assert_eq!(sort.orders().len(), 2);
        assert_eq!(sort.orders()[0].direction, Direction::Desc);
        assert_eq!(sort.orders()[1].field, DataField::Date);
    }

    #[test]
    fn page_metadata_reflects_totals() {
        let request = PageRequest::of(1, 4).expect("valid request");
        let page = Page::new(vec![5, 6, 7, 8], &request, 10);

        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(page.has_previous());

        let last = Page::new(vec![9, 10], &request.next(), 10).map(|value| value * 2);
        assert_eq!(last.content, vec![18, 20]);
        assert!(!last.has_next());
    }
}
