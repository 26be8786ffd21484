use sender_core::AckLog;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

/// The ack log shared between the receive task (appender) and the
/// estimator stages (readers), plus a growth signal.
///
/// The core contract is "wake me when the ack log has grown past index
/// K". Implemented with a condition signal (`tokio::sync::Notify`) rather
/// than a bounded channel of growth notifications, because multiple
/// stages need to re-read the whole log (for pairwise diffs, gap
/// detection, stall windows), not just consume the newest entry.
#[derive(Clone)]
pub struct SharedAckLog {
    inner: Arc<Mutex<AckLog>>,
    grown: Arc<Notify>,
}

impl SharedAckLog {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(AckLog::new())),
            grown: Arc::new(Notify::new()),
        }
    }

    pub async fn push(&self, at: std::time::Instant, seq: u32) {
        self.inner.lock().await.push(at, seq);
        self.grown.notify_waiters();
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn last_seq(&self) -> i64 {
        self.inner.lock().await.last_seq()
    }

    pub async fn since(&self, snapshot_len: usize) -> Vec<sender_core::AckRecord> {
        self.inner.lock().await.since(snapshot_len).to_vec()
    }

    pub async fn tail(&self, n: usize) -> Vec<sender_core::AckRecord> {
        self.inner.lock().await.tail(n).to_vec()
    }

    /// Suspend until the log has grown past `len_at_call`, or `timeout`
    /// elapses first.
    pub async fn wait_for_growth(&self, len_at_call: usize, timeout: std::time::Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            // `enable()` registers this future with the `Notify` so a
            // `notify_waiters()` call during the condition check below is
            // not missed — merely constructing `Notified` does not
            // register it, only polling (or `enable()`) does.
            let notified = self.grown.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.len().await > len_at_call {
                return true;
            }
            tokio::select! {
                _ = notified => {}
                _ = tokio::time::sleep_until(deadline) => return self.len().await > len_at_call,
            }
        }
    }
}

impl Default for SharedAckLog {
    fn default() -> Self {
        Self::new()
    }
}
