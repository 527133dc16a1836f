use tracing::{debug, error, info, info_span, warn};

use crate::domain::{FeedItem, NotificationMessage, Watermark};
use crate::errors::FeederResult;
use crate::services::filter::{newest_timestamp, select_new_items};
use crate::services::notification_service::Notifier;
use crate::sources::{decode_page, FeedSource};
use crate::storage::WatermarkStore;

/// Outcome of a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub fetched: usize,
    pub selected: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Watermark written at the end of the tick, if it moved
    pub watermark: Option<Watermark>,
}

pub struct Poller<S: FeedSource, N: Notifier, W: WatermarkStore> {
    source: S,
    notifier: N,
    store: W,
    dry_run: bool,
}

impl<S: FeedSource, N: Notifier, W: WatermarkStore> Poller<S, N, W> {
    pub fn new(source: S, notifier: N, store: W) -> Self {
        Self {
            source,
            notifier,
            store,
            dry_run: false,
        }
    }

    /// Log notifications instead of sending them and leave the watermark alone
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Fetch, filter, notify and advance the watermark once.
    ///
    /// Fetch and decode failures abort the tick before anything is sent or
    /// stored. Per-item delivery failures are counted and logged.
    pub fn tick(&self) -> FeederResult<TickReport> {
        let span = info_span!("tick", dry_run = self.dry_run);
        let _enter = span.enter();

        let bytes = self.source.fetch()?;
        let page = decode_page(&bytes)?;
        let watermark = self.store.load()?;

        let selected = select_new_items(&page.items, watermark);

        let mut report = TickReport {
            fetched: page.items.len(),
            selected: selected.len(),
            ..TickReport::default()
        };

        for item in selected {
            let message = NotificationMessage::from_item(item);

            if self.dry_run {
                info!(id = item.id, "[DRY RUN] {}", message.format());
                continue;
            }

            match self.notifier.send(&message) {
                Ok(()) => {
                    info!(id = item.id, "sent");
                    report.delivered += 1;
                }
                Err(e) => {
                    error!(id = item.id, error = %e, "delivery failed");
                    report.failed += 1;
                }
            }
        }

        report.watermark = self.advance_watermark(&page.items, watermark);

        Ok(report)
    }

    /// Run a tick and log the outcome; errors stop here.
    pub fn run_tick(&self) {
        match self.tick() {
            Ok(report) => info!(
                fetched = report.fetched,
                selected = report.selected,
                delivered = report.delivered,
                failed = report.failed,
                watermark = ?report.watermark.map(Watermark::timestamp),
                "tick complete"
            ),
            Err(e) => error!(error = %e, "tick aborted"),
        }
    }

    fn advance_watermark(&self, items: &[FeedItem], current: Watermark) -> Option<Watermark> {
        let newest = match newest_timestamp(items) {
            None => {
                info!("feed is empty, keeping watermark");
                return None;
            }
            Some(Err(e)) => {
                warn!(error = %e, "cannot read newest date, keeping watermark");
                return None;
            }
            Some(Ok(ts)) => Watermark(ts),
        };

        if newest <= current {
            debug!(%current, %newest, "watermark unchanged");
            return None;
        }

        if self.dry_run {
            info!(%newest, "[DRY RUN] would advance watermark");
            return None;
        }

        match self.store.save(newest) {
            Ok(()) => Some(newest),
            Err(e) => {
                error!(error = %e, "cannot update watermark");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{format_published, FeedPage};
    use crate::errors::FeederError;
    use crate::services::notification_service::MockNotifier;
    use crate::sources::traits::MockFeedSource;
    use crate::storage::traits::MockWatermarkStore;
    use crate::storage::FileWatermarkStore;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    const BASE: i64 = 1_600_000_000;

    fn item(id: i64, offset: i64, size: i64, votes: i64) -> FeedItem {
        FeedItem::new(id, format_published(BASE + offset).unwrap())
            .with_description(format!("post {}", id))
            .with_media(format!("https://x/{}.gif", id), size)
            .with_votes(votes)
    }

    fn scenario() -> Vec<FeedItem> {
        vec![
            item(3, 300, 100, 5),
            item(2, 200, 100, 5),
            item(1, 100, 100, 5),
        ]
    }

    fn source_for(items: Vec<FeedItem>) -> MockFeedSource {
        let body = serde_json::to_vec(&FeedPage { items }).unwrap();
        let mut source = MockFeedSource::new();
        source.expect_fetch().returning(move || Ok(body.clone()));
        source
    }

    fn store_at(watermark: i64) -> MockWatermarkStore {
        let mut store = MockWatermarkStore::new();
        store
            .expect_load()
            .returning(move || Ok(Watermark(watermark)));
        store
    }

    /// Notifier that records footers in delivery order
    fn recording_notifier() -> (MockNotifier, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&sent);
        let mut notifier = MockNotifier::new();
        notifier.expect_send().returning(move |m| {
            log.lock().unwrap().push(m.footer.clone());
            Ok(())
        });
        (notifier, sent)
    }

    #[test]
    fn test_delivers_new_items_oldest_first_and_advances() {
        let (notifier, sent) = recording_notifier();
        let mut store = store_at(BASE + 100);
        store
            .expect_save()
            .withf(|w| *w == Watermark(BASE + 300))
            .times(1)
            .returning(|_| Ok(()));

        let poller = Poller::new(source_for(scenario()), notifier, store);
        let report = poller.tick().unwrap();

        assert_eq!(
            *sent.lock().unwrap(),
            vec![
                "https://developerslife.ru/2".to_string(),
                "https://developerslife.ru/3".to_string()
            ]
        );
        assert_eq!(report.fetched, 3);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.watermark, Some(Watermark(BASE + 300)));
    }

    #[test]
    fn test_up_to_date_watermark_sends_nothing() {
        let mut notifier = MockNotifier::new();
        notifier.expect_send().times(0);
        let mut store = store_at(BASE + 300);
        store.expect_save().times(0);

        let poller = Poller::new(source_for(scenario()), notifier, store);
        let report = poller.tick().unwrap();

        assert_eq!(report.selected, 0);
        assert_eq!(report.watermark, None);
    }

    #[test]
    fn test_oversized_newest_item_still_moves_watermark() {
        let mut notifier = MockNotifier::new();
        notifier.expect_send().times(0);
        let mut store = store_at(BASE + 300);
        store
            .expect_save()
            .withf(|w| *w == Watermark(BASE + 400))
            .times(1)
            .returning(|_| Ok(()));

        let items = vec![item(4, 400, 4 * 1024 * 1024, 5), item(3, 300, 100, 5)];
        let poller = Poller::new(source_for(items), notifier, store);

        assert_eq!(poller.tick().unwrap().watermark, Some(Watermark(BASE + 400)));
    }

    #[test]
    fn test_bad_date_skips_only_that_item() {
        let (notifier, sent) = recording_notifier();
        let mut store = store_at(BASE);
        store.expect_save().times(1).returning(|_| Ok(()));

        let mut items = scenario();
        items[1].published_at = "32 Smarch".to_string();

        let poller = Poller::new(source_for(items), notifier, store);
        let report = poller.tick().unwrap();

        assert_eq!(report.delivered, 2);
        assert_eq!(
            *sent.lock().unwrap(),
            vec![
                "https://developerslife.ru/1".to_string(),
                "https://developerslife.ru/3".to_string()
            ]
        );
    }

    #[test]
    fn test_rejected_delivery_does_not_stop_tick() {
        let mut notifier = MockNotifier::new();
        let mut calls = 0;
        notifier.expect_send().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(FeederError::Delivery("webhook answered \"error: rate limited\"".into()))
            } else {
                Ok(())
            }
        });
        let mut store = store_at(BASE + 100);
        store
            .expect_save()
            .withf(|w| *w == Watermark(BASE + 300))
            .times(1)
            .returning(|_| Ok(()));

        let poller = Poller::new(source_for(scenario()), notifier, store);
        let report = poller.tick().unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.watermark, Some(Watermark(BASE + 300)));
    }

    #[test]
    fn test_fetch_failure_has_no_side_effects() {
        let mut source = MockFeedSource::new();
        source
            .expect_fetch()
            .returning(|| Err(FeederError::Fetch("connection reset".into())));
        let mut notifier = MockNotifier::new();
        notifier.expect_send().times(0);
        let mut store = MockWatermarkStore::new();
        store.expect_load().times(0);
        store.expect_save().times(0);

        let poller = Poller::new(source, notifier, store);
        assert!(matches!(poller.tick(), Err(FeederError::Fetch(_))));
    }

    #[test]
    fn test_decode_failure_has_no_side_effects() {
        let mut source = MockFeedSource::new();
        source
            .expect_fetch()
            .returning(|| Ok(b"{\"result\": [".to_vec()));
        let mut notifier = MockNotifier::new();
        notifier.expect_send().times(0);
        let mut store = MockWatermarkStore::new();
        store.expect_save().times(0);

        let poller = Poller::new(source, notifier, store);
        assert!(matches!(poller.tick(), Err(FeederError::Decode(_))));
    }

    #[test]
    fn test_empty_feed_keeps_watermark() {
        let mut notifier = MockNotifier::new();
        notifier.expect_send().times(0);
        let mut store = store_at(BASE);
        store.expect_save().times(0);

        let poller = Poller::new(source_for(Vec::new()), notifier, store);
        let report = poller.tick().unwrap();

        assert_eq!(report, TickReport::default());
    }

    #[test]
    fn test_unreadable_newest_date_keeps_watermark() {
        let (notifier, sent) = recording_notifier();
        let mut store = store_at(BASE);
        store.expect_save().times(0);

        let mut items = scenario();
        items[0].published_at = String::new();

        let poller = Poller::new(source_for(items), notifier, store);
        let report = poller.tick().unwrap();

        assert_eq!(sent.lock().unwrap().len(), 2);
        assert_eq!(report.watermark, None);
    }

    #[test]
    fn test_older_feed_never_regresses_watermark() {
        let mut notifier = MockNotifier::new();
        notifier.expect_send().times(0);
        let mut store = store_at(BASE + 1000);
        store.expect_save().times(0);

        let poller = Poller::new(source_for(scenario()), notifier, store);
        assert_eq!(poller.tick().unwrap().watermark, None);
    }

    #[test]
    fn test_dry_run_neither_sends_nor_persists() {
        let mut notifier = MockNotifier::new();
        notifier.expect_send().times(0);
        let mut store = store_at(BASE);
        store.expect_save().times(0);

        let poller = Poller::new(source_for(scenario()), notifier, store).with_dry_run(true);
        let report = poller.tick().unwrap();

        assert_eq!(report.selected, 3);
        assert_eq!(report.delivered, 0);
        assert_eq!(report.watermark, None);
    }

    #[test]
    fn test_persist_failure_is_logged_not_raised() {
        let (notifier, _sent) = recording_notifier();
        let mut store = store_at(BASE);
        store
            .expect_save()
            .returning(|_| Err(FeederError::Persist("read-only file system".into())));

        let poller = Poller::new(source_for(scenario()), notifier, store);
        let report = poller.tick().unwrap();

        assert_eq!(report.delivered, 3);
        assert_eq!(report.watermark, None);
    }

    #[test]
    fn test_second_tick_without_new_data_is_silent() {
        let dir = TempDir::new().unwrap();
        let store = FileWatermarkStore::new(dir.path().join("devlife.id"));
        let (notifier, sent) = recording_notifier();

        let poller = Poller::new(source_for(scenario()), notifier, store);

        let first = poller.tick().unwrap();
        let second = poller.tick().unwrap();

        assert_eq!(first.delivered, 3);
        assert_eq!(second.selected, 0);
        assert_eq!(sent.lock().unwrap().len(), 3);
    }
}
