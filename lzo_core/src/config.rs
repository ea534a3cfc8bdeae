use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// How the engine provides compression work memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScratchPolicy {
    /// One region owned by the engine, leased under a mutex for the whole
    /// compress call. Compress calls on the same engine are serialized.
    #[default]
    Shared,
    /// A fresh region allocated for every compress call. Fully reentrant.
    PerCall,
}

impl fmt::Display for ScratchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScratchPolicy::Shared => f.write_str("shared"),
            ScratchPolicy::PerCall => f.write_str("per-call"),
        }
    }
}

/// A scratch policy name that is not `shared` or `per-call`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scratch policy '{0}'. Valid options: shared, per-call")]
pub struct UnknownScratchPolicy(pub String);

impl FromStr for ScratchPolicy {
    type Err = UnknownScratchPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shared" | "singleton" => Ok(ScratchPolicy::Shared),
            "per-call" | "percall" | "per_call" => Ok(ScratchPolicy::PerCall),
            other => Err(UnknownScratchPolicy(other.to_string())),
        }
    }
}

/// Engine construction options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub scratch_policy: ScratchPolicy,
}

impl EngineConfig {
    pub fn with_scratch_policy(mut self, policy: ScratchPolicy) -> Self {
        self.scratch_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_shared() {
        assert_eq!(EngineConfig::default().scratch_policy, ScratchPolicy::Shared);
    }

    #[test]
    fn test_policy_parse_and_display() {
        for policy in [ScratchPolicy::Shared, ScratchPolicy::PerCall] {
            assert_eq!(policy.to_string().parse::<ScratchPolicy>(), Ok(policy));
        }
        assert_eq!("Per_Call".parse::<ScratchPolicy>(), Ok(ScratchPolicy::PerCall));
        let err = "pooled".parse::<ScratchPolicy>().unwrap_err();
        assert_eq!(err, UnknownScratchPolicy("pooled".into()));
        assert!(err.to_string().contains("Valid options: shared, per-call"));
    }
}
