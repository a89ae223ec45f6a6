use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::alert::{AlertBuilder, AlertStyle};
use crate::classifier::KeywordFilter;
use crate::config::WatchConfig;
use crate::diff::{DiffEngine, DiffKind, DiffPolicy, DiffResult};
use crate::error::Result;
use crate::history::{History, HistoryStore};
use crate::normalizer::{Confidence, MediaRef, NormalizedEntry, Normalizer};
use crate::notify::Notifier;
use crate::sources::{PageSummary, RawRecord, Source, TextFallback, oldest_first};

/// Counters for one pass of a monitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub fetched: usize,
    pub filtered_out: usize,
    pub new: usize,
    pub changed: usize,
    pub unchanged: usize,
    /// Recorded without a notification.
    pub suppressed: usize,
    pub delivered: usize,
    pub failed: usize,
    pub evicted: usize,
    pub saved: bool,
    pub source_unavailable: bool,
    pub history_recovered: bool,
}

/// One source wired to one notification channel and one history file.
pub struct Monitor {
    name: String,
    source: Box<dyn Source>,
    filter: KeywordFilter,
    normalizer: Normalizer,
    fallback: Option<Box<dyn TextFallback>>,
    diff: DiffEngine,
    alerts: AlertBuilder,
    notifier: Box<dyn Notifier>,
    store: Box<dyn HistoryStore>,
    history_cap: Option<usize>,
    dispatch_delay: Duration,
}

impl Monitor {
    pub fn new(
        name: impl Into<String>,
        watch: &WatchConfig,
        source: Box<dyn Source>,
        notifier: Box<dyn Notifier>,
        store: Box<dyn HistoryStore>,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            filter: KeywordFilter::from_config(watch),
            normalizer: Normalizer::from_config(watch),
            fallback: None,
            diff: DiffEngine::default(),
            alerts: AlertBuilder::default(),
            notifier,
            store,
            history_cap: watch.history_cap,
            dispatch_delay: Duration::ZERO,
        }
    }

    pub fn with_fallback(mut self, fallback: Box<dyn TextFallback>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_diff_policy(mut self, policy: DiffPolicy) -> Self {
        self.diff = DiffEngine::new(policy);
        self
    }

    pub fn with_alert_style(mut self, style: AlertStyle) -> Self {
        self.alerts = AlertBuilder::new(style);
        self
    }

    /// Pause between two notifications.
    pub fn with_dispatch_delay(mut self, delay: Duration) -> Self {
        self.dispatch_delay = delay;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetch, filter, normalize, diff, notify and persist once.
    ///
    /// An identity is committed to history only after its alert was
    /// delivered, or when the policy records it silently. Failed deliveries
    /// are retried on the next run. Nothing is written when nothing changed.
    pub async fn run(&self) -> Result<RunReport> {
        let span = info_span!("monitor_run", monitor = %self.name, run_id = %Uuid::new_v4());
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&self) -> Result<RunReport> {
        let mut report = RunReport::default();

        let records = match self.source.fetch().await {
            Ok(records) => records,
            Err(e) => {
                warn!(source = %self.source.name(), error = %e, "source unavailable, skipping run");
                report.source_unavailable = true;
                return Ok(report);
            }
        };
        report.fetched = records.len();

        let mut history = match self.store.load() {
            Ok(history) => history,
            Err(e) if e.is_malformed() => {
                warn!(error = %e, "history unreadable, starting from empty");
                report.history_recovered = true;
                History::new()
            }
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::with_capacity(records.len());
        let mut thin: HashMap<String, RawRecord> = HashMap::new();
        for record in oldest_first(records) {
            let verdict = self.filter.classify(&record.title);
            if !verdict.is_accepted() {
                debug!(identity = %record.identity, ?verdict, "filtered out");
                report.filtered_out += 1;
                continue;
            }

            let (entry, confidence) = self.normalizer.normalize(&record);
            if confidence == Confidence::Low {
                thin.entry(record.identity.clone()).or_insert(record);
            }
            entries.push(entry);
        }

        let results = self.diff.diff(entries, &history);
        let mut attempted = false;

        for mut result in results {
            match result.kind {
                DiffKind::Unchanged => {
                    report.unchanged += 1;
                    continue;
                }
                DiffKind::New => report.new += 1,
                DiffKind::Changed => report.changed += 1,
            }

            if !result.notify {
                debug!(identity = %result.entry.identity, label = result.label(), "recorded without notification");
                self.diff.merge(&mut history, &result);
                report.suppressed += 1;
                continue;
            }

            if let Some(record) = thin.get(&result.entry.identity) {
                self.enrich(&mut result, record).await;
            }

            let Some(alert) = self.alerts.build(&result) else {
                continue;
            };

            if attempted && !self.dispatch_delay.is_zero() {
                tokio::time::sleep(self.dispatch_delay).await;
            }
            attempted = true;

            match self.notifier.send(&alert).await {
                Ok(()) => {
                    self.diff.merge(&mut history, &result);
                    report.delivered += 1;
                    info!(identity = %result.entry.identity, kind = ?result.kind, "alert delivered");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(identity = %result.entry.identity, error = %e, "delivery failed, will retry next run");
                }
            }
        }

        if history.is_dirty() {
            if let Some(cap) = self.history_cap {
                report.evicted = history.retain_latest(cap);
            }
            self.store.save(&history)?;
            history.mark_clean();
            report.saved = true;
        }

        info!(
            fetched = report.fetched,
            new = report.new,
            changed = report.changed,
            delivered = report.delivered,
            failed = report.failed,
            saved = report.saved,
            "run finished"
        );

        Ok(report)
    }

    async fn enrich(&self, result: &mut DiffResult, record: &RawRecord) {
        let Some(fallback) = &self.fallback else {
            return;
        };
        if let Some(summary) = fallback.describe(record).await {
            self.apply_summary(&mut result.entry, record, summary);
        }
    }

    fn apply_summary(&self, entry: &mut NormalizedEntry, record: &RawRecord, summary: PageSummary) {
        if !summary.text.is_empty() {
            entry.clean_text = self.normalizer.truncate(&summary.text);
        }
        if entry.media_ref.is_none()
            && let Some(id) = summary.youtube_id
        {
            entry.media_ref = Some(MediaRef::Video(id));
        }
        if entry.canonical_link == record.url
            && let Some(link) = summary.store_link
        {
            entry.canonical_link = link;
        }
    }
}
