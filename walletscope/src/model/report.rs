use std::collections::BTreeMap;
use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

/// Descriptions are cut to this many words.
pub const MAX_DESCRIPTION_WORDS: usize = 100;

/// A third-party finding about an address. Treated as opaque data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletReport {
  #[serde(default)]
  pub category:    String,
  #[serde(default)]
  pub name:        String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub url:         String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
  pub total:      usize,
  pub categories: BTreeMap<String, Vec<WalletReport>>,
}

impl ReportSummary {
  /// Drops duplicate urls (first one wins), groups by category and tidies descriptions.
  pub fn from_reports(reports: Vec<WalletReport>) -> Self {
    let mut seen_urls = HashSet::new();
    let mut categories: BTreeMap<String, Vec<WalletReport>> = BTreeMap::new();
    let mut total = 0;

    for mut report in reports {
      if !seen_urls.insert(report.url.clone()) {
        continue;
      }
      report.description = clean_description(&report.description, &report.url);
      categories.entry(report.category.clone()).or_default().push(report);
      total += 1;
    }

    Self { total, categories }
  }

  pub fn is_clean(&self) -> bool { self.total == 0 }
}

/// Strips a trailing copy of `url` and limits the text to [`MAX_DESCRIPTION_WORDS`].
pub fn clean_description(
  description: &str,
  url: &str,
) -> String {
  let without_url = match description.strip_suffix(url) {
    Some(rest) if !url.is_empty() => rest.trim(),
    _ => description,
  };

  let words: Vec<&str> = without_url.split_whitespace().collect();
  if words.len() <= MAX_DESCRIPTION_WORDS {
    return without_url.to_string();
  }
  format!("{}...", words[..MAX_DESCRIPTION_WORDS].join(" "))
}
