//! Round-based cooperative scheduling with deferred work.
//!
//! Steps that need an artifact another step has not emitted yet defer the
//! declaration instead of failing. A round that emits nothing new is
//! terminal: whatever is still deferred can never resolve, and the whole
//! build fails with one aggregated report.

use crate::error::{CompileError, Result};
use crate::host::HostEnv;
use crate::session::CompileSession;
use smol_str::SmolStr;
use std::collections::HashSet;

/// Keys a step resolved or deferred in one round. A key resolved in an
/// earlier round must never be deferred again: membership in the deferred
/// set is monotonic.
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    pub resolved: Vec<SmolStr>,
    pub deferred: Vec<SmolStr>,
}

impl StepReport {
    pub fn resolved(keys: impl IntoIterator<Item = SmolStr>) -> Self {
        Self {
            resolved: keys.into_iter().collect(),
            deferred: Vec::new(),
        }
    }
}

pub trait ProcessingStep {
    fn name(&self) -> &'static str;

    /// One round of work. Per-declaration fatal errors are recorded on the
    /// session (sibling declarations keep compiling); only infrastructure
    /// failures abort the whole step.
    fn process(
        &mut self,
        session: &mut CompileSession,
        host: &dyn HostEnv,
        round: usize,
    ) -> Result<StepReport>;

    /// Called once after the terminal round.
    fn on_processing_over(&mut self, session: &mut CompileSession) -> Result<()> {
        let _ = session;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileReport {
    pub artifacts: Vec<SmolStr>,
    pub failure_count: usize,
    pub rounds: usize,
}

impl CompileReport {
    pub fn is_success(&self) -> bool {
        self.failure_count == 0
    }
}

pub struct Scheduler {
    steps: Vec<Box<dyn ProcessingStep>>,
}

impl Scheduler {
    pub fn new(steps: Vec<Box<dyn ProcessingStep>>) -> Self {
        Self { steps }
    }

    pub fn run(&mut self, host: &dyn HostEnv, session: &mut CompileSession) -> Result<CompileReport> {
        let mut resolved_keys: HashSet<(&'static str, SmolStr)> = HashSet::new();
        let mut round = 0;
        let mut pending: Vec<SmolStr>;

        loop {
            round += 1;
            let artifacts_before = session.artifact_count();
            let mut deferred = Vec::new();

            for step in &mut self.steps {
                let report = step.process(session, host, round)?;
                for key in &report.deferred {
                    debug_assert!(
                        !resolved_keys.contains(&(step.name(), key.clone())),
                        "step {} re-deferred resolved declaration {key}",
                        step.name()
                    );
                }
                for key in report.resolved {
                    resolved_keys.insert((step.name(), key));
                }
                if !report.deferred.is_empty() {
                    tracing::debug!(
                        step = step.name(),
                        round,
                        deferred = report.deferred.len(),
                        "deferred declarations"
                    );
                }
                deferred.extend(report.deferred);
            }

            pending = deferred;
            if pending.is_empty() {
                break;
            }
            // No new artifacts means no deferral can resolve in a later
            // round; the symbol universe has reached its fixed point.
            if session.artifact_count() == artifacts_before {
                break;
            }
        }

        for step in &mut self.steps {
            step.on_processing_over(session)?;
        }

        if !pending.is_empty() {
            pending.sort();
            pending.dedup();
            return Err(CompileError::UnresolvedAtEnd(pending));
        }

        Ok(CompileReport {
            artifacts: session.artifacts().cloned().collect(),
            failure_count: session.failures().len(),
            rounds: round,
        })
    }
}
