//! Async orchestration of the three estimator stages. The arithmetic is
//! delegated to `sender_core::estimator`; this module owns the suspension
//! points — timeouts, drains, burst pacing.

use crate::config::Config;
use crate::shared::SharedAckLog;
use crate::transmit::SendQueue;
use sender_core::EstimatorError;
use std::time::{Duration, Instant};

const MAX_STAGE1_ATTEMPTS: u32 = 2;

/// Stage 1: estimate `rtt` and `service_delay`.
pub async fn stage1(
    queue: &SendQueue,
    ack_log: &SharedAckLog,
    cfg: &Config,
) -> Result<(Duration, Duration), EstimatorError> {
    for attempt in 1..=MAX_STAGE1_ATTEMPTS {
        let t0 = Instant::now();
        let snapshot = ack_log.len().await;
        let base = (ack_log.last_seq().await + 1).max(0) as u32;

        for _ in 0..cfg.stage1_burst_count {
            let _ = queue.send(Some(base));
        }

        if !ack_log.wait_for_growth(snapshot, cfg.stage1_timeout).await {
            tracing::warn!(attempt, "stage1: no ack observed before timeout");
            if attempt == MAX_STAGE1_ATTEMPTS {
                return Err(EstimatorError::ExtremelyHighLoss);
            }
            continue;
        }

        if !ack_log.wait_for_growth(snapshot + 1, cfg.stage1_timeout).await {
            let burst = ack_log.since(snapshot).await;
            let rtt = burst[0].at.duration_since(t0);
            return Err(EstimatorError::PartialLoss { rtt });
        }

        let burst = ack_log.since(snapshot).await;
        let rtt = burst[0].at.duration_since(t0);
        let mut service_delay = burst[1].at.duration_since(burst[0].at);

        let drain = sender_core::estimator::stage1_drain_sleep(
            burst.len(),
            cfg.stage1_burst_count,
            service_delay,
        );
        tokio::time::sleep(drain).await;

        let full_burst = ack_log.since(snapshot).await;
        let timestamps: Vec<Instant> = full_burst.iter().map(|r| r.at).collect();
        let refined = sender_core::estimator::mean_pairwise_diff(&timestamps);
        if refined > Duration::ZERO {
            service_delay = refined;
        }

        return Ok((rtt, service_delay));
    }
    Err(EstimatorError::ExtremelyHighLoss)
}

/// Stage 2: determine the peer's FIFO buffer depth.
pub async fn stage2(
    queue: &SendQueue,
    ack_log: &SharedAckLog,
    rtt: Duration,
    service_delay: Duration,
    cfg: &Config,
) -> u32 {
    let required = sender_core::estimator::required_buffer(rtt, service_delay);
    let burst_count = sender_core::estimator::stage2_burst_count(required);

    let snapshot = ack_log.len().await;
    let base = (ack_log.last_seq().await + 1).max(0) as u32;
    for i in 0..burst_count {
        let _ = queue.send(Some(base + i));
    }

    let drain = sender_core::estimator::stage2_drain_sleep(rtt, service_delay, burst_count);
    tokio::time::sleep(drain).await;

    let now = Instant::now();
    let records = ack_log.since(snapshot).await;
    let timestamps: Vec<Instant> = records.iter().map(|r| r.at).collect();
    sender_core::estimator::find_buffer_depth(&timestamps, now, service_delay, cfg.burst_drop, required)
}

/// Stage 3: the steady-state burst-pacing loop.
pub async fn stage3(
    queue: &SendQueue,
    ack_log: &SharedAckLog,
    rtt: Duration,
    service_delay: Duration,
    buffer_depth: u32,
    cfg: &Config,
) {
    let entry_snapshot = ack_log.len().await;
    let mut sent: u64 = 0;
    let mut seq: i64 = ack_log.last_seq().await;
    let mut last_seen_ack = seq;
    let mut last_correct_ts = Instant::now();

    let interval = sender_core::estimator::burst_interval(rtt, service_delay, buffer_depth);
    let paced_interval = interval.mul_f64(1.1);
    let stall_threshold = rtt.mul_f64(1.1);

    loop {
        let last_ack = ack_log.last_seq().await;
        if last_ack >= cfg.target as i64 {
            tracing::info!(target = cfg.target, "stage3: target reached");
            let _ = queue.send(None);
            return;
        }

        let recv = ack_log.len().await.saturating_sub(entry_snapshot) as u64;
        let p = sender_core::estimator::drop_probability(sent, recv, buffer_depth);
        let s = sender_core::find_s::find_s(buffer_depth, p);
        tracing::debug!(sent, recv, p, s, "stage3 iteration");

        seq += 1;
        let seq_u32 = seq.max(0) as u32;

        for _ in 0..s {
            sent += 1;
            let _ = queue.send(Some(seq_u32));
            tokio::time::sleep(paced_interval).await;

            let current_last_ack = ack_log.last_seq().await;
            if current_last_ack != last_seen_ack {
                last_seen_ack = current_last_ack;
                last_correct_ts = Instant::now();
            }

            if last_correct_ts.elapsed() >= stall_threshold {
                let tail = ack_log.tail(s as usize + 2).await;
                if sender_core::estimator::is_stalled(&tail, s) {
                    tracing::debug!(latest_ack = last_seen_ack, "stage3: stall detected, restarting");
                    seq = ack_log.last_seq().await;
                    last_seen_ack = seq;
                    last_correct_ts = Instant::now();
                    break;
                }
            }
        }
    }
}
