//! Clipboard auto-detection for the API key field.
//!
//! Reads happen on a scoped task after a short debounce. Results come back as
//! [`DetectorEvent`]s tagged with the generation that produced them, and the
//! owner hands them to [`ClipboardKeyDetector::accept`]. Any `arm`, `disarm`
//! or `close` bumps the generation, so a read that lands late has no effect.

use crate::task::ScopedTask;
use crate::timing::GateTiming;
use chrono::{DateTime, Utc};
use keygate_store::ClipboardReader;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

fn api_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^sk-[A-Za-z0-9_-]{20,200}$").expect("valid api key pattern"))
}

/// Returns the trimmed text if it looks like a pasted `sk-` key.
pub fn detect_api_key(text: &str) -> Option<String> {
    let trimmed = text.trim();
    api_key_pattern()
        .is_match(trimmed)
        .then(|| trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardCandidate {
    pub text: String,
    pub detected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectorEvent {
    Candidate {
        generation: u64,
        candidate: ClipboardCandidate,
    },
    SignalExpired {
        generation: u64,
    },
}

pub struct ClipboardKeyDetector {
    reader: Arc<dyn ClipboardReader>,
    debounce: Duration,
    notice: Duration,
    event_tx: mpsc::UnboundedSender<DetectorEvent>,
    event_rx: mpsc::UnboundedReceiver<DetectorEvent>,
    generation: u64,
    notice_generation: u64,
    pending_read: Option<ScopedTask>,
    notice_timer: Option<ScopedTask>,
    signal: Option<ClipboardCandidate>,
}

impl ClipboardKeyDetector {
    pub fn new(reader: Arc<dyn ClipboardReader>, timing: &GateTiming) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            reader,
            debounce: timing.clipboard_debounce,
            notice: timing.clipboard_notice,
            event_tx,
            event_rx,
            generation: 0,
            notice_generation: 0,
            pending_read: None,
            notice_timer: None,
            signal: None,
        }
    }

    /// Schedule one debounced clipboard check, replacing any check still pending.
    pub fn arm(&mut self) {
        self.disarm();
        let generation = self.generation;
        let reader = self.reader.clone();
        let debounce = self.debounce;
        let tx = self.event_tx.clone();

        self.pending_read = Some(ScopedTask::spawn(async move {
            tokio::time::sleep(debounce).await;
            let text = match reader.read_text().await {
                Ok(Some(text)) => text,
                Ok(None) => return,
                Err(e) => {
                    debug!("Failed to read clipboard: {}", e);
                    return;
                }
            };
            if let Some(key) = detect_api_key(&text) {
                debug!("Clipboard holds an API key candidate");
                let _ = tx.send(DetectorEvent::Candidate {
                    generation,
                    candidate: ClipboardCandidate {
                        text: key,
                        detected_at: Utc::now(),
                    },
                });
            }
        }));
    }

    /// Cancel the pending check and invalidate anything it might still deliver.
    pub fn disarm(&mut self) {
        self.generation += 1;
        self.pending_read = None;
    }

    pub fn is_armed(&self) -> bool {
        self.pending_read
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    pub fn try_next(&mut self) -> Option<DetectorEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Apply an event. Returns the key to put in the field when a current candidate arrives.
    pub fn accept(&mut self, event: DetectorEvent) -> Option<String> {
        match event {
            DetectorEvent::Candidate {
                generation,
                candidate,
            } if generation == self.generation => {
                self.pending_read = None;
                let text = candidate.text.clone();
                self.raise_signal(candidate);
                Some(text)
            }
            DetectorEvent::SignalExpired { generation } if generation == self.notice_generation => {
                self.signal = None;
                self.notice_timer = None;
                None
            }
            _ => None,
        }
    }

    fn raise_signal(&mut self, candidate: ClipboardCandidate) {
        self.notice_generation += 1;
        let generation = self.notice_generation;
        let notice = self.notice;
        let tx = self.event_tx.clone();
        self.signal = Some(candidate);
        self.notice_timer = Some(ScopedTask::spawn(async move {
            tokio::time::sleep(notice).await;
            let _ = tx.send(DetectorEvent::SignalExpired { generation });
        }));
    }

    pub fn clear_signal(&mut self) {
        self.notice_generation += 1;
        self.notice_timer = None;
        self.signal = None;
    }

    pub fn signal(&self) -> Option<&ClipboardCandidate> {
        self.signal.as_ref()
    }

    pub fn is_signalled(&self) -> bool {
        self.signal.is_some()
    }

    pub fn close(&mut self) {
        self.disarm();
        self.clear_signal();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use keygate_store::{StoreError, StoreResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Clipboard double that counts reads.
    pub(crate) struct FakeClipboard {
        text: Mutex<Option<String>>,
        fail: bool,
        pub(crate) reads: AtomicUsize,
    }

    impl FakeClipboard {
        pub(crate) fn holding(text: &str) -> Arc<Self> {
            Arc::new(Self {
                text: Mutex::new(Some(text.to_string())),
                fail: false,
                reads: AtomicUsize::new(0),
            })
        }

        pub(crate) fn empty() -> Arc<Self> {
            Arc::new(Self {
                text: Mutex::new(None),
                fail: false,
                reads: AtomicUsize::new(0),
            })
        }

        pub(crate) fn denied() -> Arc<Self> {
            Arc::new(Self {
                text: Mutex::new(None),
                fail: true,
                reads: AtomicUsize::new(0),
            })
        }

        pub(crate) fn read_count(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ClipboardReader for FakeClipboard {
        async fn read_text(&self) -> StoreResult<Option<String>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StoreError::Unavailable("permission denied".to_string()));
            }
            Ok(self.text.lock().expect("clipboard lock").clone())
        }
    }

    pub(crate) fn valid_key() -> String {
        format!("sk-{}", "a1B2_c3-".repeat(4))
    }

    pub(crate) async fn settle(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    fn body(len: usize) -> String {
        "x".repeat(len)
    }

    #[test]
    fn accepts_keys_within_length_bounds() {
        assert!(detect_api_key(&format!("sk-{}", body(20))).is_some());
        assert!(detect_api_key(&format!("sk-{}", body(200))).is_some());
        assert!(detect_api_key(&format!("sk-{}", body(19))).is_none());
        assert!(detect_api_key(&format!("sk-{}", body(201))).is_none());
    }

    #[test]
    fn trims_before_matching_and_returns_trimmed() {
        let key = valid_key();
        assert_eq!(detect_api_key(&format!("  {key}\n")), Some(key));
    }

    #[test]
    fn rejects_prefix_and_charset_violations() {
        assert!(detect_api_key(&body(40)).is_none());
        assert!(detect_api_key(&format!("pk-{}", body(30))).is_none());
        assert!(detect_api_key(&format!("sk-{} {}", body(15), body(15))).is_none());
        assert!(detect_api_key(&format!("sk-{}.", body(30))).is_none());
        assert!(detect_api_key(&format!("key: sk-{}", body(30))).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reads_only_after_debounce() {
        let clipboard = FakeClipboard::holding(&valid_key());
        let mut detector = ClipboardKeyDetector::new(clipboard.clone(), &GateTiming::default());

        detector.arm();
        settle(200).await;
        assert_eq!(clipboard.read_count(), 0);

        settle(200).await;
        assert_eq!(clipboard.read_count(), 1);
        let event = detector.try_next().expect("candidate event");
        assert_eq!(detector.accept(event), Some(valid_key()));
        assert!(detector.is_signalled());
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_before_debounce_skips_the_read() {
        let clipboard = FakeClipboard::holding(&valid_key());
        let mut detector = ClipboardKeyDetector::new(clipboard.clone(), &GateTiming::default());

        detector.arm();
        settle(100).await;
        detector.disarm();
        settle(1000).await;

        assert_eq!(clipboard.read_count(), 0);
        assert!(detector.try_next().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_candidate_is_ignored() {
        let clipboard = FakeClipboard::holding(&valid_key());
        let mut detector = ClipboardKeyDetector::new(clipboard, &GateTiming::default());

        detector.arm();
        settle(400).await;
        let event = detector.try_next().expect("candidate event");
        detector.disarm();

        assert_eq!(detector.accept(event), None);
        assert!(!detector.is_signalled());
    }

    #[tokio::test(start_paused = true)]
    async fn signal_expires_after_notice_timeout() {
        let clipboard = FakeClipboard::holding(&valid_key());
        let mut detector = ClipboardKeyDetector::new(clipboard, &GateTiming::default());

        detector.arm();
        settle(400).await;
        let event = detector.try_next().expect("candidate event");
        detector.accept(event);
        assert!(detector.is_signalled());

        settle(2900).await;
        assert!(detector.try_next().is_none());

        settle(200).await;
        let expiry = detector.try_next().expect("expiry event");
        assert_eq!(detector.accept(expiry), None);
        assert!(!detector.is_signalled());
    }

    #[tokio::test(start_paused = true)]
    async fn clipboard_failures_produce_nothing() {
        for clipboard in [FakeClipboard::denied(), FakeClipboard::empty()] {
            let mut detector = ClipboardKeyDetector::new(clipboard.clone(), &GateTiming::default());
            detector.arm();
            settle(400).await;
            assert_eq!(clipboard.read_count(), 1);
            assert!(detector.try_next().is_none());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_keeps_a_single_outstanding_read() {
        let clipboard = FakeClipboard::holding(&valid_key());
        let mut detector = ClipboardKeyDetector::new(clipboard.clone(), &GateTiming::default());

        detector.arm();
        settle(150).await;
        detector.arm();
        settle(150).await;
        assert_eq!(clipboard.read_count(), 0);

        settle(200).await;
        assert_eq!(clipboard.read_count(), 1);
    }
}
