use std::ops::Add;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::conditioning::{RejectAction, RejectionKind, Validator};
use crate::config::PipelineConfig;

use super::walk_audio_files;

/// Totals of one cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub checked: usize,
    pub rejected: usize,
    pub load_failures: usize,
    pub too_short: usize,
    pub too_silent: usize,
    /// Files that were never started because the pass was cancelled.
    pub cancelled: usize,
}

impl CleanupReport {
    pub fn remaining(&self) -> usize {
        self.checked - self.rejected
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled > 0
    }

    fn passed() -> Self {
        Self {
            checked: 1,
            ..Self::default()
        }
    }

    fn rejected(kind: RejectionKind) -> Self {
        let mut report = Self {
            checked: 1,
            rejected: 1,
            ..Self::default()
        };
        match kind {
            RejectionKind::LoadFailure => report.load_failures = 1,
            RejectionKind::TooShort => report.too_short = 1,
            RejectionKind::TooSilent => report.too_silent = 1,
        }
        report
    }

    fn not_started() -> Self {
        Self {
            cancelled: 1,
            ..Self::default()
        }
    }
}

impl Add for CleanupReport {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            checked: self.checked + other.checked,
            rejected: self.rejected + other.rejected,
            load_failures: self.load_failures + other.load_failures,
            too_short: self.too_short + other.too_short,
            too_silent: self.too_silent + other.too_silent,
            cancelled: self.cancelled + other.cancelled,
        }
    }
}

/// Validates every audio file under a root, applying one reject action.
#[derive(Debug, Clone)]
pub struct CleanupPass {
    validator: Validator,
    action: RejectAction,
    cancel: Arc<AtomicBool>,
}

impl CleanupPass {
    pub fn new(config: PipelineConfig, action: RejectAction) -> Self {
        Self {
            validator: Validator::new(config),
            action,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an external cancel flag; files already in flight still finish.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn run(&self, root: &Path) -> Result<CleanupReport> {
        let files = walk_audio_files(root)?;
        info!(
            root = %root.display(),
            files = files.len(),
            destructive = self.action.is_destructive(),
            "starting cleanup pass"
        );

        // each path appears once, so each file is claimed by exactly one worker
        let report = files
            .par_iter()
            .map(|path| self.check_one(path))
            .reduce(CleanupReport::default, |a, b| a + b);

        info!(
            checked = report.checked,
            rejected = report.rejected,
            remaining = report.remaining(),
            cancelled = report.cancelled,
            "cleanup pass complete"
        );
        Ok(report)
    }

    fn check_one(&self, path: &Path) -> CleanupReport {
        if self.cancel.load(Ordering::Relaxed) {
            return CleanupReport::not_started();
        }
        match self.validator.validate(path, &self.action) {
            Ok(_) => CleanupReport::passed(),
            Err(rejection) => CleanupReport::rejected(rejection.kind()),
        }
    }
}
