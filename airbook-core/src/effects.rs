//! Side-channel record of best-effort steps.
//!
//! Cache and publish failures never fail an operation. They are logged and
//! collected here so callers and tests can see what happened without being
//! forced to handle it.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CacheLookup,
    CacheFill,
    CacheInvalidate,
    DedupeCheck,
    DedupeMark,
    DedupeRelease,
    Publish,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectStatus {
    Applied,
    /// Nothing to do (cache miss, empty listing).
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideEffect {
    pub step: Step,
    pub target: String,
    pub status: EffectStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideEffects(Vec<SideEffect>);

impl SideEffects {
    pub fn record(&mut self, step: Step, target: impl Into<String>, status: EffectStatus) {
        self.0.push(SideEffect {
            step,
            target: target.into(),
            status,
        });
    }

    pub fn failed(&mut self, step: Step, target: impl Into<String>, err: impl fmt::Display) {
        self.record(step, target, EffectStatus::Failed(err.to_string()));
    }

    pub fn iter(&self) -> impl Iterator<Item = &SideEffect> {
        self.0.iter()
    }

    /// Status of the last recorded occurrence of `step`.
    pub fn status_of(&self, step: Step) -> Option<&EffectStatus> {
        self.0.iter().rev().find(|e| e.step == step).map(|e| &e.status)
    }

    pub fn failures(&self) -> impl Iterator<Item = &SideEffect> {
        self.0
            .iter()
            .filter(|e| matches!(e.status, EffectStatus::Failed(_)))
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Where a listing was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    Cache,
    Store,
}

/// Result of a cache-aside read. `items` carries no ordering guarantee.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub source: ReadSource,
    pub effects: SideEffects,
}

/// Result of a successful write together with its best-effort follow-ups.
#[derive(Debug, Clone)]
pub struct Written<T> {
    pub value: T,
    pub effects: SideEffects,
}
