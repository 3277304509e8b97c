//! Incremental update detection.
//!
//! Decides which items of a freshly fetched first page are newer than
//! anything seen before, using a single timestamp watermark.
//!
//! The scan trusts the catalog's newest-first ordering: it stops at the
//! first item that is not strictly newer than the watermark and never
//! looks past it.  If the catalog ever returns items out of order, new
//! items after the first stale one are missed.

use chrono::{DateTime, Utc};

use crate::catalog::ScriptItem;

/// Watermark-based classifier for polled pages.
#[derive(Debug, Clone, Default)]
pub struct UpdateDetector {
    watermark: Option<DateTime<Utc>>,
}

impl UpdateDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest timestamp observed so far, if any.
    pub fn watermark(&self) -> Option<DateTime<Utc>> {
        self.watermark
    }

    /// Account for a freshly loaded first page.
    ///
    /// Items on screen are already known, so the watermark moves up to
    /// the top item when that is newer.  It never moves backward.
    pub fn prime(&mut self, page: &[ScriptItem]) {
        let top = page.first().and_then(|item| item.published);
        self.watermark = self.watermark.max(top);
    }

    /// Classify `page` against the watermark and return the new items,
    /// oldest first.
    ///
    /// With no watermark the top item's timestamp is adopted and nothing
    /// is reported.  Otherwise items are accumulated while they are
    /// strictly newer; the first item that is not (including one without
    /// a timestamp) ends the scan.  When anything was found the watermark
    /// moves to the top item of `page`.
    pub fn scan(&mut self, page: &[ScriptItem]) -> Vec<ScriptItem> {
        let mut fresh = Vec::new();

        for item in page {
            let Some(mark) = self.watermark else {
                self.watermark = item.published;
                break;
            };
            match item.published {
                Some(ts) if ts > mark => fresh.push(item.clone()),
                _ => break,
            }
        }

        if !fresh.is_empty() {
            fresh.reverse();
            // page[0] was accumulated, so its timestamp is present.
            self.watermark = page[0].published;
        }

        fresh
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{at, make_item};

    fn ids(items: &[ScriptItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn bootstrap_adopts_top_item_and_reports_nothing() {
        let mut detector = UpdateDetector::new();
        let page = vec![at("t5", 5), at("t4", 4), at("t3", 3)];

        assert!(detector.scan(&page).is_empty());
        assert_eq!(detector.watermark(), page[0].published);
    }

    #[test]
    fn empty_page_is_a_noop() {
        let mut detector = UpdateDetector::new();
        assert!(detector.scan(&[]).is_empty());
        assert!(detector.watermark().is_none());

        detector.prime(&[at("t1", 1)]);
        assert!(detector.scan(&[]).is_empty());
        assert_eq!(detector.watermark(), at("t1", 1).published);
    }

    #[test]
    fn new_items_come_back_oldest_first() {
        let mut detector = UpdateDetector::new();
        detector.prime(&[at("t3", 3)]);

        let fresh = detector.scan(&[at("t5", 5), at("t4", 4), at("t3", 3)]);
        assert_eq!(ids(&fresh), ["t4", "t5"]);
        assert_eq!(detector.watermark(), at("t5", 5).published);
    }

    #[test]
    fn scan_stops_at_first_stale_item() {
        let mut detector = UpdateDetector::new();
        detector.prime(&[at("t4", 4)]);

        // t9 sits behind a stale item and is never inspected.
        let fresh = detector.scan(&[at("t5", 5), at("t4", 4), at("t9", 9)]);
        assert_eq!(ids(&fresh), ["t5"]);
        assert_eq!(detector.watermark(), at("t5", 5).published);
    }

    #[test]
    fn equal_timestamp_is_not_new() {
        let mut detector = UpdateDetector::new();
        detector.prime(&[at("a", 4)]);
        assert!(detector.scan(&[at("b", 4)]).is_empty());
    }

    #[test]
    fn missing_timestamp_ends_the_scan() {
        let mut detector = UpdateDetector::new();
        detector.prime(&[at("t1", 1)]);

        let fresh = detector.scan(&[at("t6", 6), make_item("undated", None), at("t5", 5)]);
        assert_eq!(ids(&fresh), ["t6"]);
    }

    #[test]
    fn undated_top_item_leaves_watermark_unset_on_bootstrap() {
        let mut detector = UpdateDetector::new();
        assert!(detector.scan(&[make_item("undated", None), at("t2", 2)]).is_empty());
        assert!(detector.watermark().is_none());

        // The next cycle bootstraps again.
        assert!(detector.scan(&[at("t3", 3)]).is_empty());
        assert_eq!(detector.watermark(), at("t3", 3).published);
    }

    #[test]
    fn watermark_never_moves_backward() {
        let mut detector = UpdateDetector::new();
        detector.prime(&[at("t5", 5)]);

        assert!(detector.scan(&[at("t2", 2), at("t1", 1)]).is_empty());
        assert_eq!(detector.watermark(), at("t5", 5).published);

        detector.prime(&[at("t1", 1)]);
        assert_eq!(detector.watermark(), at("t5", 5).published, "an older page does not lower it");
    }

    #[test]
    fn prime_advances_to_newer_loaded_page() {
        let mut detector = UpdateDetector::new();
        detector.prime(&[at("t1", 1)]);
        detector.prime(&[at("t3", 3), at("t1", 1)]);
        assert_eq!(detector.watermark(), at("t3", 3).published);

        // Everything on the loaded page is already shown.
        assert!(detector.scan(&[at("t3", 3), at("t1", 1)]).is_empty());

        detector.prime(&[make_item("undated", None)]);
        assert_eq!(detector.watermark(), at("t3", 3).published);
    }

    #[test]
    fn second_poll_of_unchanged_page_is_idempotent() {
        let mut detector = UpdateDetector::new();
        detector.prime(&[at("t1", 1)]);
        let page = vec![at("t3", 3), at("t2", 2), at("t1", 1)];

        assert_eq!(detector.scan(&page).len(), 2);
        assert!(detector.scan(&page).is_empty());
    }
}
