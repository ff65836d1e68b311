use std::time::Duration;

/// Counters collected over one extraction run.
///
/// Owned by the builder and handed back with the finished graph; callers that
/// want totals across runs sum these themselves.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    /// Pages seen in the stream, regardless of kind.
    pub pages: u64,
    /// Pages whose text body was processed.
    pub articles: u64,
    /// Redirect pages seen.
    pub redirects: u64,
    /// Redirects whose title already held an ID and had to be deferred to
    /// the finalization pass.
    pub deferred_redirects: u64,
    /// Link targets extracted from article bodies (duplicates included).
    pub links: u64,
}

/// Renders a duration as `HH:MM:SS` for progress lines on multi-hour runs.
pub fn human_duration(d: Duration) -> String {
    let s = d.as_secs();
    format!("{:02}:{:02}:{:02}", s / 3600, (s / 60) % 60, s % 60)
}
