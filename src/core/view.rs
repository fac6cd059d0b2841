//! Collection view - client-side filtering and pagination
//!
//! A screen keeps the raw collection it fetched plus the user's filter state
//! and page window. The filtered view is never stored: it is derived from the
//! raw collection and the filter state every time it is asked for, so it can
//! not go stale after a refetch or a filter change.

use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use std::collections::BTreeMap;

use crate::core::entity::Record;

/// Date range buckets offered by list screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DateBucket {
    /// Same calendar day (UTC) as now
    Today,
    /// Within the last 7 days
    Week,
    /// Within the last 30 days
    Month,
    #[default]
    All,
}

impl DateBucket {
    /// Whether a timestamp falls into this bucket relative to `now`
    ///
    /// Records without a timestamp only match `All`.
    pub fn contains(&self, timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let ts = match (self, timestamp) {
            (DateBucket::All, _) => return true,
            (_, None) => return false,
            (_, Some(ts)) => ts,
        };

        match self {
            DateBucket::Today => ts.date_naive() == now.date_naive(),
            DateBucket::Week => ts >= now - Duration::days(7),
            DateBucket::Month => ts >= now - Duration::days(30),
            DateBucket::All => true,
        }
    }
}

impl std::fmt::Display for DateBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateBucket::Today => write!(f, "today"),
            DateBucket::Week => write!(f, "week"),
            DateBucket::Month => write!(f, "month"),
            DateBucket::All => write!(f, "all"),
        }
    }
}

/// User-selected filters for one screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Free text, matched case-insensitively against the record's search fields
    pub search: String,
    /// Categorical filters: field name -> required value
    pub categorical: BTreeMap<String, String>,
    pub date: DateBucket,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Add a categorical filter. Empty values and "all" mean "no filter".
    pub fn with_category(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_category(name, value);
        self
    }

    pub fn with_date(mut self, date: DateBucket) -> Self {
        self.date = date;
        self
    }

    pub fn set_category(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            self.categorical.remove(&name);
        } else {
            self.categorical.insert(name, value);
        }
    }

    /// Whether any filter narrows the collection
    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty() || !self.categorical.is_empty() || self.date != DateBucket::All
    }

    /// Search OR-ed across fields, AND-ed with every categorical filter and the date bucket
    pub fn matches<R: Record>(&self, record: &R, now: DateTime<Utc>) -> bool {
        let needle = self.search.trim().to_lowercase();
        let search_ok = needle.is_empty()
            || record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
        if !search_ok {
            return false;
        }

        let categories_ok = self
            .categorical
            .iter()
            .all(|(name, wanted)| record.category(name).as_deref() == Some(wanted.as_str()));
        if !categories_ok {
            return false;
        }

        self.date.contains(record.timestamp(), now)
    }
}

/// Restrict a collection by a filter state, preserving order
pub fn filter_records<'a, R: Record>(
    records: &'a [R],
    filter: &FilterState,
    now: DateTime<Utc>,
) -> Vec<&'a R> {
    records.iter().filter(|r| filter.matches(*r, now)).collect()
}

/// Allowed table page sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PageSize {
    #[default]
    Ten,
    Twenty,
    Thirty,
    Forty,
    Fifty,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 6] = [
        PageSize::Ten,
        PageSize::Twenty,
        PageSize::Thirty,
        PageSize::Forty,
        PageSize::Fifty,
        PageSize::Hundred,
    ];

    pub fn get(&self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Thirty => 30,
            PageSize::Forty => 40,
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
        }
    }
}

impl TryFrom<usize> for PageSize {
    type Error = String;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        PageSize::ALL
            .into_iter()
            .find(|size| size.get() == n)
            .ok_or_else(|| format!("Invalid page size: {}. Use 10, 20, 30, 40, 50 or 100", n))
    }
}

impl std::str::FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("Invalid page size: {}", s))?;
        PageSize::try_from(n)
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Number of pages for `len` items, never less than one
pub fn total_pages(len: usize, page_size: PageSize) -> usize {
    len.div_ceil(page_size.get()).max(1)
}

/// One page of a filtered collection
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually shown (after clamping)
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice a collection into the requested page, clamping out-of-range pages
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: PageSize) -> Page<T> {
    let total = total_pages(items.len(), page_size);
    let page = page.clamp(1, total);
    let start = (page - 1) * page_size.get();
    let end = (start + page_size.get()).min(items.len());
    let slice = if start < items.len() { &items[start..end] } else { &[] };

    Page {
        items: slice.to_vec(),
        page,
        total_pages: total,
        total_items: items.len(),
    }
}

/// Current page and page size of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    current_page: usize,
    page_size: PageSize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: PageSize::default(),
        }
    }
}

impl PageWindow {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            current_page: 1,
            page_size,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Change the page size; always re-anchors to page 1
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.current_page = 1;
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    pub fn next(&mut self, total_pages: usize) {
        self.go_to(self.current_page.saturating_add(1), total_pages);
    }

    pub fn previous(&mut self, total_pages: usize) {
        self.go_to(self.current_page.saturating_sub(1), total_pages);
    }

    pub fn go_to(&mut self, page: usize, total_pages: usize) {
        self.current_page = page.clamp(1, total_pages.max(1));
    }
}

/// Raw collection plus filter state and page window for one screen
#[derive(Debug, Clone)]
pub struct CollectionView<T> {
    raw: Vec<T>,
    filter: FilterState,
    window: PageWindow,
    /// Pinned evaluation time for date buckets (None = wall clock)
    clock: Option<DateTime<Utc>>,
}

impl<T> Default for CollectionView<T> {
    fn default() -> Self {
        Self {
            raw: Vec::new(),
            filter: FilterState::default(),
            window: PageWindow::default(),
            clock: None,
        }
    }
}

impl<T: Record + Clone> CollectionView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate date buckets against a fixed instant instead of the wall clock
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.clock = Some(now);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.unwrap_or_else(Utc::now)
    }

    pub fn raw(&self) -> &[T] {
        &self.raw
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    /// Replace the raw collection wholesale (after a fetch)
    pub fn replace(&mut self, records: Vec<T>) {
        self.raw = records;
        let total = self.total_pages();
        self.window.go_to(self.window.current_page(), total);
    }

    /// Apply an in-place transformation to the raw collection
    pub(crate) fn apply(&mut self, change: impl FnOnce(&mut Vec<T>)) {
        change(&mut self.raw);
        let total = self.total_pages();
        self.window.go_to(self.window.current_page(), total);
    }

    /// Replace the whole filter state; resets to page 1 when it changed
    pub fn set_filter(&mut self, filter: FilterState) {
        if filter != self.filter {
            self.filter = filter;
            self.window.reset();
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let next = self.filter.clone().with_search(search);
        self.set_filter(next);
    }

    pub fn set_category(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let next = self.filter.clone().with_category(name, value);
        self.set_filter(next);
    }

    pub fn set_date(&mut self, date: DateBucket) {
        let next = self.filter.clone().with_date(date);
        self.set_filter(next);
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.window.set_page_size(page_size);
    }

    /// Filtered view, derived on every call
    pub fn filtered(&self) -> Vec<&T> {
        filter_records(&self.raw, &self.filter, self.now())
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered().len(), self.window.page_size())
    }

    pub fn next_page(&mut self) {
        let total = self.total_pages();
        self.window.next(total);
    }

    pub fn previous_page(&mut self) {
        let total = self.total_pages();
        self.window.previous(total);
    }

    pub fn go_to_page(&mut self, page: usize) {
        let total = self.total_pages();
        self.window.go_to(page, total);
    }

    /// The visible page of the filtered view
    pub fn page(&self) -> Page<&T> {
        paginate(&self.filtered(), self.window.current_page(), self.window.page_size())
    }
}
