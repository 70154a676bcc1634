use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use log::{debug, error, info, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tokio::task;

use super::{BatchOutcome, CancelFlag, Progress, ProgressCallback};
use crate::analyzer::InconsistencyDetector;
use crate::context::RunContext;
use crate::error::Result;
use crate::report::{write_base_reports, write_run_reports};
use crate::types::{RequiredFieldsMap, RunSummary, ValidationResult};
use crate::validator::validate_base;

/// Validates many bases on a worker pool, then detects naming drift
pub struct BatchValidator<'a> {
    ctx: &'a RunContext,
    threads: usize,
    progress: Option<ProgressCallback>,
    cancel: CancelFlag,
}

impl<'a> BatchValidator<'a> {
    pub fn new(ctx: &'a RunContext) -> Self {
        Self {
            ctx,
            threads: ctx.config().threads.max(1),
            progress: None,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Keep the bases requested by the configuration, all of them when none
    /// were requested. Unknown names are warned about and dropped.
    pub fn select_bases(&self, discovered: &[String]) -> Vec<String> {
        let requested = &self.ctx.config().bases;
        if requested.is_empty() {
            return discovered.to_vec();
        }

        for name in requested {
            if !discovered.contains(name) {
                warn!("Base '{}' was not discovered, ignoring it", name);
            }
        }

        discovered
            .iter()
            .filter(|base| requested.contains(base))
            .cloned()
            .collect()
    }

    /// Validate `bases` in parallel, then run inconsistency detection over
    /// the bases that were validated.
    pub fn run(&self, bases: &[String]) -> Result<BatchOutcome> {
        info!("Validating {} bases on {} threads", bases.len(), self.threads);

        let pool = ThreadPoolBuilder::new().num_threads(self.threads).build()?;
        let completed = AtomicUsize::new(0);
        let total = bases.len();

        let outcomes: Vec<Option<ValidationResult>> = pool.install(|| {
            bases
                .par_iter()
                .map(|base| {
                    if self.cancel.is_cancelled() {
                        debug!("Cancelled before base {}", base);
                        return None;
                    }

                    let result = validate_guarded(self.ctx, base);
                    if self.ctx.config().write_reports {
                        if let Err(e) = write_base_reports(self.ctx, &result) {
                            error!("Failed to write reports for {}: {:#}", base, e);
                        }
                    }

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(callback) = &self.progress {
                        callback(&Progress {
                            completed: done,
                            total,
                            base: base.clone(),
                        });
                    }
                    Some(result)
                })
                .collect()
        });

        let mut results = Vec::new();
        let mut skipped = Vec::new();
        for (base, outcome) in bases.iter().zip(outcomes) {
            match outcome {
                Some(result) => results.push(result),
                None => skipped.push(base.clone()),
            }
        }

        Ok(finish(self.ctx, results, skipped))
    }
}

/// Validate bases as blocking tasks on the tokio runtime.
///
/// For callers driving an event loop. Reports are written as in
/// [`BatchValidator::run`].
pub async fn validate_bases_async(ctx: Arc<RunContext>, bases: Vec<String>, cancel: CancelFlag) -> BatchOutcome {
    info!("Validating {} bases as blocking tasks", bases.len());

    let handles = bases.iter().cloned().map(|base| {
        let ctx = Arc::clone(&ctx);
        let cancel = cancel.clone();
        task::spawn_blocking(move || {
            if cancel.is_cancelled() {
                return None;
            }
            let result = validate_guarded(&ctx, &base);
            if ctx.config().write_reports {
                if let Err(e) = write_base_reports(&ctx, &result) {
                    error!("Failed to write reports for {}: {:#}", base, e);
                }
            }
            Some(result)
        })
    });

    let joined = join_all(handles).await;

    let mut results = Vec::new();
    let mut skipped = Vec::new();
    for (base, outcome) in bases.into_iter().zip(joined) {
        match outcome {
            Ok(Some(result)) => results.push(result),
            Ok(None) => skipped.push(base),
            Err(e) => {
                error!("Task for base {} failed: {}", base, e);
                results.push(failed_result(&base, ctx.required_fields(), &e.to_string()));
            }
        }
    }

    finish(&ctx, results, skipped)
}

/// Validate one base, turning a panic into a degraded result
fn validate_guarded(ctx: &RunContext, base: &str) -> ValidationResult {
    match catch_unwind(AssertUnwindSafe(|| validate_base(ctx, base))) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("Validation of base {} failed unexpectedly: {}", base, message);
            failed_result(base, ctx.required_fields(), &message)
        }
    }
}

fn failed_result(base: &str, required: &RequiredFieldsMap, message: &str) -> ValidationResult {
    let mut result = ValidationResult::new(base, required.len());
    result.problems.push(format!("unexpected failure: {}", message));
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Barrier stage: detect drift across the validated bases and summarise
fn finish(ctx: &RunContext, results: Vec<ValidationResult>, skipped: Vec<String>) -> BatchOutcome {
    if !skipped.is_empty() {
        warn!("Run cancelled, {} bases skipped", skipped.len());
    }

    let validated: Vec<String> = results.iter().map(|r| r.base.clone()).collect();
    let mut detector = InconsistencyDetector::new();
    detector.observe_outputs(ctx, &validated);
    let observation = detector.observation().clone();
    let inconsistencies = detector.detect(ctx.required_fields());

    let summary = RunSummary::from_results(&results, skipped.len(), &inconsistencies);
    info!("{}", summary);

    let outcome = BatchOutcome {
        results,
        skipped,
        observation,
        inconsistencies,
        summary,
    };

    if ctx.config().write_reports {
        if let Err(e) = write_run_reports(ctx, &outcome) {
            error!("Failed to write run reports: {:#}", e);
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn context(dir: &TempDir, bases: &[&str]) -> RunContext {
        let data = dir.path().join("data");
        fs::create_dir_all(&data).unwrap();
        for base in bases {
            fs::write(data.join(format!("{}-agend.csv", base)), "DataAgendamento,Placa\n1,2\n").unwrap();
        }

        let config = ValidatorConfig {
            data_dir: data,
            output_dir: dir.path().join("output"),
            threads: 2,
            write_reports: false,
            ..ValidatorConfig::default()
        };
        RunContext::new(
            config,
            RequiredFieldsMap::from_pairs([("agend.csv", vec!["DataAgendamento", "Placa"])]),
        )
    }

    #[test]
    fn test_progress_counts_every_base() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, &["B1", "B2", "B3"]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let outcome = BatchValidator::new(&ctx)
            .with_progress(Arc::new(move |p: &Progress| sink.lock().unwrap().push(p.completed)))
            .run(&["B1".into(), "B2".into(), "B3".into()])
            .unwrap();

        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.summary.bases_fully_valid, 3);
    }

    #[test]
    fn test_cancelled_run_skips_bases() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, &["B1", "B2"]);
        let cancel = CancelFlag::new();
        cancel.cancel();

        let outcome = BatchValidator::new(&ctx)
            .with_cancel(cancel)
            .run(&["B1".into(), "B2".into()])
            .unwrap();

        assert!(outcome.results.is_empty());
        assert_eq!(outcome.skipped, vec!["B1", "B2"]);
        assert_eq!(outcome.summary.bases_skipped, 2);
        assert!(!outcome.summary.is_fully_valid());
    }

    #[test]
    fn test_cancel_between_bases() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, &["B1", "B2", "B3"]);
        let cancel = CancelFlag::new();
        let trigger = cancel.clone();
        let bases: Vec<String> = vec!["B1".into(), "B2".into(), "B3".into()];

        let outcome = BatchValidator::new(&ctx)
            .with_threads(1)
            .with_cancel(cancel)
            .with_progress(Arc::new(move |p: &Progress| {
                if p.completed == 1 {
                    trigger.cancel();
                }
            }))
            .run(&bases)
            .unwrap();

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(outcome.summary.bases_skipped, 2);
        assert_eq!(outcome.summary.bases_total, 3);

        let mut seen: Vec<String> = outcome.skipped.clone();
        seen.push(outcome.results[0].base.clone());
        seen.sort();
        assert_eq!(seen, bases);
    }

    #[test]
    fn test_select_bases_ignores_unknown() {
        let dir = TempDir::new().unwrap();
        let mut ctx = context(&dir, &[]);
        let discovered = vec!["B1".to_string(), "B2".to_string()];
        assert_eq!(BatchValidator::new(&ctx).select_bases(&discovered), discovered);

        let config = ValidatorConfig {
            bases: vec!["B2".into(), "B9".into()],
            ..ctx.config().clone()
        };
        ctx = RunContext::new(config, ctx.required_fields().clone());
        assert_eq!(BatchValidator::new(&ctx).select_bases(&discovered), vec!["B2"]);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
