use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{ChatRef, ForwardConfig};
use crate::platform::ChatApi;

/// Where the loop waits between calls.
#[async_trait]
pub trait Pacer {
    async fn pause(&self, duration: Duration);
}

/// Real-time pacing with `tokio::time::sleep`.
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Limits that stay fixed for a whole run.
#[derive(Debug, Clone)]
pub struct ForwardPolicy {
    /// Stop after this many failures in a row; 0 never stops
    pub failure_limit: u32,
    /// Take the long pause after a successful forward of an id divisible by this
    pub long_pause_every: i32,
    pub long_pause: Duration,
}

impl ForwardPolicy {
    pub fn from_config(config: &ForwardConfig) -> Self {
        Self {
            failure_limit: config.failure_limit,
            long_pause_every: config.long_pause_every,
            long_pause: config.long_pause(),
        }
    }
}

impl Default for ForwardPolicy {
    fn default() -> Self {
        Self {
            failure_limit: 2000,
            long_pause_every: 300,
            long_pause: Duration::from_secs(60),
        }
    }
}

/// One forwarding run: which ids to visit and how fast.
#[derive(Debug, Clone)]
pub struct ForwardPlan {
    pub source: ChatRef,
    pub destination: ChatRef,
    pub start_id: i32,
    /// Inclusive upper bound
    pub max_id: i32,
    pub step: usize,
    pub delay: Duration,
}

impl ForwardPlan {
    pub fn new(
        source: ChatRef,
        destination: ChatRef,
        start_id: i32,
        max_id: i32,
        step: usize,
        delay_secs: f64,
    ) -> Result<Self> {
        if step == 0 {
            bail!("step must be at least 1");
        }
        let delay = Duration::try_from_secs_f64(delay_secs)
            .with_context(|| format!("invalid delay: {} seconds", delay_secs))?;

        Ok(Self {
            source,
            destination,
            start_id,
            max_id,
            step,
            delay,
        })
    }

    /// The message ids this plan visits, in order.
    pub fn ids(&self) -> impl Iterator<Item = i32> {
        (self.start_id..=self.max_id).step_by(self.step)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardStats {
    pub attempted: u64,
    pub forwarded: u64,
    pub failed: u64,
    pub last_id: Option<i32>,
    /// Longest run of consecutive failures seen
    pub max_failure_streak: u32,
    /// True when the run ended on the consecutive-failure cutoff
    pub stopped_early: bool,
}

impl ForwardStats {
    /// First id a follow-up run should start from.
    pub fn resume_from(&self, plan: &ForwardPlan) -> Option<i32> {
        let last = self.last_id?;
        last.checked_add(i32::try_from(plan.step).ok()?)
            .filter(|next| *next <= plan.max_id)
    }
}

/// Forward every id in `plan` from source to destination, one at a time.
pub async fn forward_range<A, P, W>(
    api: &A,
    pacer: &P,
    plan: &ForwardPlan,
    policy: &ForwardPolicy,
    out: &mut W,
) -> Result<ForwardStats>
where
    A: ChatApi + ?Sized,
    P: Pacer + ?Sized,
    W: Write,
{
    let mut stats = ForwardStats::default();
    let mut errors_in_row: u32 = 0;

    info!(
        "Forwarding {} -> {}, ids {}..={} step {}",
        plan.source, plan.destination, plan.start_id, plan.max_id, plan.step
    );

    for msg_id in plan.ids() {
        stats.attempted += 1;
        stats.last_id = Some(msg_id);

        match api
            .forward_message(&plan.source, &plan.destination, msg_id)
            .await
        {
            Ok(()) => {
                writeln!(out, "[+] Forwarded message {}", msg_id)?;
                debug!("Forwarded message {}", msg_id);
                stats.forwarded += 1;
                errors_in_row = 0;
            }
            Err(e) => {
                errors_in_row += 1;
                stats.failed += 1;
                stats.max_failure_streak = stats.max_failure_streak.max(errors_in_row);
                writeln!(out, "[-] Message {} failed: {:#}", msg_id, e)?;
                debug!("Message {} failed ({} in a row): {:#}", msg_id, errors_in_row, e);

                if policy.failure_limit > 0 && errors_in_row >= policy.failure_limit {
                    writeln!(
                        out,
                        "[!] {} consecutive errors, stopping (likely reached the end).",
                        errors_in_row
                    )?;
                    warn!(
                        "Stopped at message {} after {} consecutive failures",
                        msg_id, errors_in_row
                    );
                    stats.stopped_early = true;
                    break;
                }

                pacer.pause(plan.delay).await;
                continue;
            }
        }

        pacer.pause(plan.delay).await;

        // Keyed on the id itself, so coarse steps can skip every multiple.
        if policy.long_pause_every > 0 && msg_id % policy.long_pause_every == 0 {
            writeln!(
                out,
                "[*] Reached message {}, sleeping for {} seconds...",
                msg_id,
                policy.long_pause.as_secs()
            )?;
            out.flush()?;
            pacer.pause(policy.long_pause).await;
        }
    }

    info!(
        "Forwarding finished: {} attempted, {} forwarded, {} failed",
        stats.attempted, stats.forwarded, stats.failed
    );
    Ok(stats)
}
