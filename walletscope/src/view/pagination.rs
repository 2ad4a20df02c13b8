use serde::Deserialize;
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::error::RequestError;
use crate::model::SortOrder;
use crate::model::TransactionQuery;

/// Highest accepted page number. Keeps `(page - 1) * per_page` within `u64` for any `u32` page size.
pub const MAX_PAGE: i64 = u32::MAX as i64;

/// A validated `?sort=&page=` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
  pub sort: SortOrder,
  pub page: u64,
}

impl PageRequest {
  pub fn new(
    sort: SortOrder,
    page: i64,
  ) -> Result<Self, RequestError> {
    if !(1..=MAX_PAGE).contains(&page) {
      return Err(RequestError::InvalidPage(page));
    }
    Ok(Self { sort, page: page as u64 })
  }

  /// Parses optional raw query values; missing values fall back to `time` and page 1.
  pub fn parse(
    sort: Option<&str>,
    page: Option<&str>,
  ) -> Result<Self, RequestError> {
    let sort = match sort {
      Some(raw) => raw.parse()?,
      None => SortOrder::default(),
    };
    let page = match page {
      Some(raw) => raw.trim().parse::<i64>().map_err(|_| RequestError::InvalidPage(0))?,
      None => 1,
    };
    Self::new(sort, page)
  }

  pub fn query(
    &self,
    dashboard: &DashboardConfig,
  ) -> TransactionQuery {
    let per_page = dashboard.transactions_per_page;
    TransactionQuery { sort: self.sort, limit: per_page, offset: (self.page - 1).saturating_mul(per_page as u64) }
  }
}

impl Default for PageRequest {
  fn default() -> Self { Self { sort: SortOrder::Time, page: 1 } }
}

/// Pagination control state: a window of page links around the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
  pub current:      u64,
  pub num_pages:    u64,
  pub pages:        Vec<u64>,
  pub previous:     u64,
  pub next:         u64,
  pub has_previous: bool,
  pub has_next:     bool,
  /// More pages exist past the last link.
  pub ellipsis:     bool,
}

pub fn num_pages(
  total_transactions: u64,
  per_page: u32,
) -> u64 {
  if per_page == 0 { 0 } else { total_transactions.div_ceil(per_page as u64) }
}

impl Pagination {
  pub fn new(
    current: u64,
    num_pages: u64,
    max_visible: u32,
  ) -> Self {
    let current = current.max(1);
    let max_visible = max_visible.max(1) as i64;
    let (current_i, num_i) = (current as i64, num_pages as i64);
    let half = max_visible / 2;

    let start = (current_i - half).min(num_i - max_visible + 1).max(1);
    let end = (current_i + half).max(max_visible).min(num_i);
    let pages = if end >= start { (start as u64..=end as u64).collect() } else { Vec::new() };

    Self {
      current,
      num_pages,
      pages,
      previous: current.saturating_sub(1).max(1),
      next: (current + 1).min(num_pages).max(1),
      has_previous: current > 1,
      has_next: current < num_pages,
      ellipsis: num_i > end,
    }
  }

  /// Whether the control is rendered at all.
  pub fn is_visible(&self) -> bool { self.num_pages > 1 }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  use super::*;

  #[rstest]
  #[case(0, 15, 0)]
  #[case(1, 15, 1)]
  #[case(15, 15, 1)]
  #[case(16, 15, 2)]
  #[case(46, 15, 4)]
  fn page_count_rounds_up(
    #[case] total: u64,
    #[case] per_page: u32,
    #[case] expected: u64,
  ) {
    assert_eq!(num_pages(total, per_page), expected);
  }

  #[rstest]
  #[case(1, 10, vec![1, 2, 3], true)]
  #[case(5, 10, vec![4, 5, 6], true)]
  #[case(10, 10, vec![8, 9, 10], false)]
  #[case(1, 2, vec![1, 2], false)]
  #[case(1, 0, vec![], false)]
  fn window_around_current_page(
    #[case] current: u64,
    #[case] pages: u64,
    #[case] window: Vec<u64>,
    #[case] ellipsis: bool,
  ) {
    let pagination = Pagination::new(current, pages, 3);
    assert_eq!(pagination.pages, window);
    assert_eq!(pagination.ellipsis, ellipsis);
  }

  #[test]
  fn previous_and_next_are_clamped() {
    let first = Pagination::new(1, 4, 3);
    assert_eq!((first.previous, first.next, first.has_previous, first.has_next), (1, 2, false, true));

    let last = Pagination::new(4, 4, 3);
    assert_eq!((last.previous, last.next, last.has_previous, last.has_next), (3, 4, true, false));
  }

  #[test]
  fn page_request_maps_to_offset() {
    let dashboard = DashboardConfig::default();
    let request = PageRequest::new(SortOrder::Amount, 3).unwrap();
    assert_eq!(request.query(&dashboard), TransactionQuery { sort: SortOrder::Amount, limit: 15, offset: 30 });
  }

  #[test]
  fn page_request_rejects_bad_input() {
    assert_eq!(PageRequest::new(SortOrder::Time, 0), Err(RequestError::InvalidPage(0)));
    assert_eq!(PageRequest::parse(Some("size"), None), Err(RequestError::UnknownSortOrder("size".into())));
    assert!(PageRequest::parse(None, Some("abc")).is_err());
    assert_eq!(PageRequest::parse(None, None), Ok(PageRequest::default()));
  }

  #[test]
  fn huge_page_is_rejected_before_any_offset_is_computed() {
    assert_eq!(PageRequest::parse(None, Some("9223372036854775807")), Err(RequestError::InvalidPage(i64::MAX)));
    assert_eq!(PageRequest::new(SortOrder::Time, MAX_PAGE + 1), Err(RequestError::InvalidPage(MAX_PAGE + 1)));

    let dashboard = DashboardConfig { transactions_per_page: u32::MAX, ..DashboardConfig::default() };
    let last = PageRequest::new(SortOrder::Time, MAX_PAGE).unwrap().query(&dashboard);
    assert_eq!(last.offset, (u32::MAX as u64 - 1) * u32::MAX as u64);
  }
}
