//! Executor policy tests against a scripted driver
//!
//! The `StepDriver` trait is the seam: these tests substitute a stub with
//! pre-programmed outcomes and a shared call log, verifying ordering,
//! fail-fast short-circuiting, and guaranteed teardown without a browser.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use flowcheck::{
    ElementState, LocatorSpec, RunResult, Step, StepDriver, StepError, run_to_completion,
};

/// What a scripted call should do.
#[derive(Debug, Clone, Copy)]
enum Outcome {
    Ok,
    Timeout,
    Interaction,
    Io,
}

impl Outcome {
    fn apply(self, call: &str) -> Result<(), StepError> {
        match self {
            Outcome::Ok => Ok(()),
            Outcome::Timeout => Err(StepError::Timeout {
                locator: call.to_string(),
                elapsed_ms: 60_000,
                last_state: ElementState::Missing,
            }),
            Outcome::Interaction => Err(StepError::Interaction(format!("{call}: no such target"))),
            Outcome::Io => Err(StepError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "unwritable path",
            ))),
        }
    }
}

/// Driver with one scripted outcome per step, consumed in call order.
struct StubDriver {
    script: Vec<Outcome>,
    next: usize,
    log: Arc<Mutex<Vec<String>>>,
    torn_down: Arc<AtomicBool>,
}

impl StubDriver {
    fn new(script: Vec<Outcome>) -> (Self, Arc<Mutex<Vec<String>>>, Arc<AtomicBool>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let torn_down = Arc::new(AtomicBool::new(false));
        (
            Self {
                script,
                next: 0,
                log: log.clone(),
                torn_down: torn_down.clone(),
            },
            log,
            torn_down,
        )
    }

    fn record(&mut self, call: String) -> Result<(), StepError> {
        let outcome = self.script.get(self.next).copied().unwrap_or(Outcome::Ok);
        self.next += 1;
        self.log.lock().unwrap().push(call.clone());
        outcome.apply(&call)
    }
}

#[async_trait]
impl StepDriver for StubDriver {
    async fn navigate(&mut self, url: &str) -> Result<(), StepError> {
        self.record(format!("navigate {url}"))
    }

    async fn click(&mut self, target: &LocatorSpec, _timeout: Duration) -> Result<(), StepError> {
        self.record(format!("click {target}"))
    }

    async fn fill(
        &mut self,
        target: &LocatorSpec,
        value: &str,
        _timeout: Duration,
    ) -> Result<(), StepError> {
        self.record(format!("fill {target}={value}"))
    }

    async fn assert_visible(
        &mut self,
        target: &LocatorSpec,
        _timeout: Duration,
    ) -> Result<(), StepError> {
        self.record(format!("assert {target}"))
    }

    async fn pause(&mut self, duration: Duration) -> Result<(), StepError> {
        self.record(format!("pause {}ms", duration.as_millis()))
    }

    async fn screenshot(
        &mut self,
        target: Option<&LocatorSpec>,
        path: &Path,
    ) -> Result<(), StepError> {
        let target = target.map(|t| t.to_string()).unwrap_or_else(|| "page".into());
        self.record(format!("screenshot {target} -> {}", path.display()))
    }

    async fn teardown(&mut self) {
        self.torn_down.store(true, Ordering::SeqCst);
    }
}

/// The sequence from the original verification script: start a new life,
/// wait for the stats screen, capture the stats card.
fn stat_capture_steps() -> Vec<Step> {
    vec![
        Step::Navigate {
            url: "/".to_string(),
        },
        Step::AssertVisible {
            target: LocatorSpec::role("button", "Start New Life"),
            timeout_ms: Some(60_000),
        },
        Step::Click {
            target: LocatorSpec::role("button", "Start New Life"),
            timeout_ms: None,
        },
        Step::AssertVisible {
            target: LocatorSpec::text("Stats"),
            timeout_ms: Some(60_000),
        },
        Step::Screenshot {
            target: Some(LocatorSpec::css(".statsCard")),
            path: PathBuf::from("out/stat.png"),
        },
    ]
}

#[tokio::test]
async fn clean_sequence_succeeds_with_one_capture_per_screenshot() {
    let steps = stat_capture_steps();
    let (driver, log, torn_down) = StubDriver::new(vec![Outcome::Ok; steps.len()]);

    let result = run_to_completion(driver, &steps).await;

    assert!(result.is_success());
    assert_eq!(result.exit_code(), 0);
    assert!(torn_down.load(Ordering::SeqCst));

    let log = log.lock().unwrap();
    assert_eq!(
        *log,
        vec![
            "navigate /",
            "assert role=button[name=\"Start New Life\"]",
            "click role=button[name=\"Start New Life\"]",
            "assert text=\"Stats\"",
            "screenshot css=.statsCard -> out/stat.png",
        ]
    );
    // Exactly one artifact call, in declared position
    assert_eq!(
        log.iter().filter(|c| c.starts_with("screenshot")).count(),
        1
    );
}

#[tokio::test]
async fn failure_short_circuits_remaining_steps() {
    let steps = stat_capture_steps();
    // The "Stats" assertion (index 3) never resolves
    let (driver, log, torn_down) = StubDriver::new(vec![
        Outcome::Ok,
        Outcome::Ok,
        Outcome::Ok,
        Outcome::Timeout,
        Outcome::Ok,
    ]);

    let result = run_to_completion(driver, &steps).await;

    match result {
        RunResult::Failure {
            index,
            ref reason,
            ..
        } => {
            assert_eq!(index, 3);
            assert!(matches!(reason, StepError::Timeout { .. }));
        }
        RunResult::Success => panic!("run should have failed"),
    }
    assert_eq!(result.exit_code(), 1);

    // Step 4 (the screenshot) never executed, so no artifact was produced
    let log = log.lock().unwrap();
    assert_eq!(log.len(), 4);
    assert!(!log.iter().any(|c| c.starts_with("screenshot")));
    assert!(torn_down.load(Ordering::SeqCst));
}

#[tokio::test]
async fn reruns_of_the_same_script_yield_the_same_outcome() {
    let steps = stat_capture_steps();
    let script = vec![
        Outcome::Ok,
        Outcome::Ok,
        Outcome::Timeout,
        Outcome::Ok,
        Outcome::Ok,
    ];

    let mut failing_indexes = Vec::new();
    for _ in 0..2 {
        let (driver, _, _) = StubDriver::new(script.clone());
        match run_to_completion(driver, &steps).await {
            RunResult::Failure { index, .. } => failing_indexes.push(index),
            RunResult::Success => panic!("run should have failed"),
        }
    }
    assert_eq!(failing_indexes, vec![2, 2]);
}

#[tokio::test]
async fn fill_on_missing_label_fails_and_still_tears_down() {
    let steps = vec![
        Step::Navigate {
            url: "/".to_string(),
        },
        Step::Fill {
            target: LocatorSpec::label("Middle Name"),
            value: "Jules".to_string(),
            timeout_ms: None,
        },
        Step::Screenshot {
            target: None,
            path: PathBuf::from("out/form.png"),
        },
    ];
    let (driver, log, torn_down) =
        StubDriver::new(vec![Outcome::Ok, Outcome::Interaction, Outcome::Ok]);

    let result = run_to_completion(driver, &steps).await;

    match result {
        RunResult::Failure { index, reason, .. } => {
            assert_eq!(index, 1);
            assert!(matches!(reason, StepError::Interaction(_)));
        }
        RunResult::Success => panic!("run should have failed"),
    }
    assert!(torn_down.load(Ordering::SeqCst));
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn artifact_write_failure_marks_run_failed_with_io_exit_code() {
    let steps = vec![
        Step::Navigate {
            url: "/".to_string(),
        },
        Step::Screenshot {
            target: None,
            path: PathBuf::from("/readonly/out.png"),
        },
    ];
    let (driver, _, torn_down) = StubDriver::new(vec![Outcome::Ok, Outcome::Io]);

    let result = run_to_completion(driver, &steps).await;

    assert_eq!(result.exit_code(), 3);
    match result {
        RunResult::Failure { index, reason, .. } => {
            assert_eq!(index, 1);
            assert!(matches!(reason, StepError::Io(_)));
        }
        RunResult::Success => panic!("run should have failed"),
    }
    assert!(torn_down.load(Ordering::SeqCst));
}

#[tokio::test]
async fn wait_steps_pause_for_the_declared_duration() {
    let steps = vec![Step::Wait { duration_ms: 500 }];
    let (driver, log, _) = StubDriver::new(vec![Outcome::Ok]);

    let result = run_to_completion(driver, &steps).await;

    assert!(result.is_success());
    assert_eq!(*log.lock().unwrap(), vec!["pause 500ms"]);
}

#[tokio::test]
async fn empty_sequence_succeeds_trivially() {
    let (driver, log, torn_down) = StubDriver::new(vec![]);
    let result = run_to_completion(driver, &[]).await;
    assert!(result.is_success());
    assert!(log.lock().unwrap().is_empty());
    assert!(torn_down.load(Ordering::SeqCst));
}
