use crate::config::QuotaConfig;
use tracing::{debug, info};

/// Outcome of proposing a test configuration to the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Denied(DenialReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    Concurrency { requested: u32, limit: u32 },
    Intensity { requested: u64, limit: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked,
    Rejected,
}

/// Two-ceiling admission policy with a one-way unlock latch.
///
/// Once unlocked, `admit` bypasses both ceilings for the rest of the
/// session regardless of magnitude. The secret is a local UX gate, not a
/// credential: comparison is plain equality and failed attempts are not
/// limited.
#[derive(Debug, Clone)]
pub struct QuotaPolicy {
    max_concurrency: u32,
    max_intensity: u64,
    secret: String,
    unlocked: bool,
}

impl QuotaPolicy {
    pub fn new(config: QuotaConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency,
            max_intensity: config.max_intensity,
            secret: config.secret,
            unlocked: false,
        }
    }

    pub fn max_concurrency(&self) -> u32 {
        self.max_concurrency
    }

    pub fn max_intensity(&self) -> u64 {
        self.max_intensity
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Decides whether a proposed configuration may dispatch. Pure decision:
    /// no state changes on either outcome.
    pub fn admit(&self, concurrency: u32, intensity: u64) -> Admission {
        if self.unlocked {
            return Admission::Admitted;
        }

        if concurrency > self.max_concurrency {
            debug!(
                "Denied: {} concurrent requests exceeds ceiling of {}",
                concurrency, self.max_concurrency
            );
            return Admission::Denied(DenialReason::Concurrency {
                requested: concurrency,
                limit: self.max_concurrency,
            });
        }

        if intensity > self.max_intensity {
            debug!(
                "Denied: intensity {} exceeds ceiling of {}",
                intensity, self.max_intensity
            );
            return Admission::Denied(DenialReason::Intensity {
                requested: intensity,
                limit: self.max_intensity,
            });
        }

        Admission::Admitted
    }

    /// Latches the policy open when the candidate matches the configured
    /// secret. A failed attempt changes nothing.
    pub fn unlock(&mut self, candidate: &str) -> UnlockOutcome {
        if candidate == self.secret {
            self.unlocked = true;
            info!("Quota ceilings unlocked for this session");
            UnlockOutcome::Unlocked
        } else {
            debug!("Unlock attempt rejected");
            UnlockOutcome::Rejected
        }
    }
}
