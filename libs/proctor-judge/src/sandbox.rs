/// Sandbox Executor - Isolated Execution of Candidate Code
///
/// **Core Responsibility:**
/// Run untrusted JavaScript against a problem's test inputs and capture the
/// raw per-case results.
///
/// **Critical Architectural Boundary:**
/// - Sandbox knows HOW to execute (V8 isolate, limits, harness protocol)
/// - Sandbox does NOT compare results against expected values
/// - Sandbox returns raw `CaseRun`s for the evaluator to judge
///
/// **Isolation Rules:**
/// 1. One fresh V8 isolate per submission, dropped on every exit path
/// 2. Heap ceiling enforced through a near-heap-limit callback
/// 3. Wall-clock deadline enforced per stage by a watchdog thread that
///    terminates V8 execution (harness, candidate, tests)
/// 4. No host surface: no `Deno`, no fetch, no file system, no eval
///
/// V8 isolates are `!Send`, so `execute` blocks the calling thread;
/// `execute_isolated` moves the whole run onto a dedicated thread.
use crate::error::{SandboxError, Stage};
use crate::harness::{self, CaseRun, HarnessRecords};
use deno_core::{op2, v8, JsRuntime, OpState, RuntimeOptions};
use proctor_common::config::JudgeConfig;
use proctor_common::types::TestCase;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio::sync::OwnedSemaphorePermit;
use tracing::{debug, warn};

const SANDBOX_THREAD_STACK_BYTES: usize = 4 * 1024 * 1024;
/// Extra heap granted once the limit is hit so termination can unwind
const HEAP_GRACE_BYTES: usize = 1024 * 1024;

#[op2(fast)]
fn op_proctor_report(state: &mut OpState, #[string] kind: &str, #[string] payload: &str) {
    if let Some(records) = state.try_borrow_mut::<HarnessRecords>() {
        records.push(kind, payload);
    }
}

deno_core::extension!(proctor_harness, ops = [op_proctor_report]);

#[derive(Debug, Clone)]
pub struct SandboxConfig {
    pub memory_limit_mb: usize,
    pub stage_timeout: Duration,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self::from(&JudgeConfig::default())
    }
}

impl From<&JudgeConfig> for SandboxConfig {
    fn from(config: &JudgeConfig) -> Self {
        Self {
            memory_limit_mb: config.memory_limit_mb,
            stage_timeout: Duration::from_millis(config.stage_timeout_ms),
        }
    }
}

impl SandboxConfig {
    fn memory_limit_bytes(&self) -> usize {
        self.memory_limit_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Clone)]
pub struct SandboxExecutor {
    config: SandboxConfig,
}

impl SandboxExecutor {
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Execute a submission on the current thread.
    ///
    /// Returns one `CaseRun` per test case, in order, or the error that
    /// aborted the whole submission.
    pub fn execute(
        &self,
        code: &str,
        test_cases: &[TestCase],
        entry: &str,
    ) -> Result<Vec<CaseRun>, SandboxError> {
        let started = Instant::now();
        let invocation = harness::invocation(entry, test_cases)?;

        // deno_core expects a tokio context even for synchronous scripts
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SandboxError::Thread(e.to_string()))?;
        let _context = rt.enter();

        let mut sandbox = Sandbox::new(&self.config);
        sandbox.run_stage(Stage::Harness, harness::BOOTSTRAP.to_string())?;
        sandbox.run_stage(Stage::Candidate, code.to_string())?;

        // Anything the candidate reported while loading is discarded
        sandbox.reset_records(test_cases.len().max(1));
        sandbox.run_stage(Stage::Tests, invocation)?;
        let runs = harness::decode_records(sandbox.take_records(), entry, test_cases.len())?;

        debug!(
            cases = runs.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Sandbox run complete"
        );
        Ok(runs)
    }

    /// Execute a submission on a dedicated thread and await the outcome.
    ///
    /// `permit` is held by the sandbox thread until the isolate is gone, even
    /// if the returned future is dropped first.
    pub async fn execute_isolated(
        &self,
        code: String,
        test_cases: Vec<TestCase>,
        entry: String,
        permit: Option<OwnedSemaphorePermit>,
    ) -> Result<Vec<CaseRun>, SandboxError> {
        let executor = self.clone();
        let (tx, rx) = tokio::sync::oneshot::channel();

        std::thread::Builder::new()
            .name("proctor-sandbox".to_string())
            .stack_size(SANDBOX_THREAD_STACK_BYTES)
            .spawn(move || {
                let result = executor.execute(&code, &test_cases, &entry);
                drop(permit);
                if tx.send(result).is_err() {
                    warn!("Sandbox result receiver dropped before result was sent");
                }
            })
            .map_err(|e| SandboxError::Thread(e.to_string()))?;

        rx.await
            .map_err(|_| SandboxError::Thread("sandbox thread panicked".to_string()))?
    }
}

/// Shared with the near-heap-limit callback
struct HeapLimitState {
    handle: v8::IsolateHandle,
    triggered: AtomicBool,
}

/// Terminates execution once V8 approaches the heap ceiling and grants a
/// small grace so the termination can propagate instead of aborting the process.
extern "C" fn near_heap_limit_callback(
    data: *mut std::ffi::c_void,
    current_heap_limit: usize,
    _initial_heap_limit: usize,
) -> usize {
    // SAFETY: `data` points at the boxed HeapLimitState owned by the Sandbox
    // that owns the isolate. The runtime field is dropped before the box, so
    // the pointer is valid for every invocation.
    let state = unsafe { &*(data as *const HeapLimitState) };
    if !state.triggered.swap(true, Ordering::SeqCst) {
        state.handle.terminate_execution();
    }
    current_heap_limit + HEAP_GRACE_BYTES
}

/// One isolate plus its limit bookkeeping.
/// Field order matters: `runtime` must drop before `heap_state`.
struct Sandbox {
    runtime: JsRuntime,
    heap_state: Box<HeapLimitState>,
    memory_limit_mb: usize,
    stage_timeout: Duration,
}

impl Sandbox {
    fn new(config: &SandboxConfig) -> Self {
        let create_params = v8::CreateParams::default().heap_limits(0, config.memory_limit_bytes());
        let mut runtime = JsRuntime::new(RuntimeOptions {
            extensions: vec![proctor_harness::init()],
            create_params: Some(create_params),
            ..Default::default()
        });
        runtime
            .op_state()
            .borrow_mut()
            .put(HarnessRecords::with_limit(0));

        let heap_state = Box::new(HeapLimitState {
            handle: runtime.v8_isolate().thread_safe_handle(),
            triggered: AtomicBool::new(false),
        });
        runtime.v8_isolate().add_near_heap_limit_callback(
            near_heap_limit_callback,
            &*heap_state as *const HeapLimitState as *mut std::ffi::c_void,
        );

        Self {
            runtime,
            heap_state,
            memory_limit_mb: config.memory_limit_mb,
            stage_timeout: config.stage_timeout,
        }
    }

    /// Evaluate one script under a fresh deadline
    fn run_stage(&mut self, stage: Stage, source: String) -> Result<(), SandboxError> {
        let watchdog = Watchdog::arm(
            self.runtime.v8_isolate().thread_safe_handle(),
            self.stage_timeout,
        );
        let outcome = self.runtime.execute_script(stage.script_name(), source);
        let timed_out = watchdog.disarm();

        // Limit violations take priority over the termination exception they cause
        if self.heap_state.triggered.load(Ordering::SeqCst) {
            return Err(SandboxError::MemoryLimit {
                limit_mb: self.memory_limit_mb,
            });
        }
        if timed_out {
            return Err(SandboxError::Timeout {
                stage,
                timeout_ms: self.stage_timeout.as_millis() as u64,
            });
        }

        match outcome {
            Ok(_) => Ok(()),
            Err(e) => Err(SandboxError::Script {
                stage,
                message: e.to_string(),
            }),
        }
    }

    fn reset_records(&mut self, limit: usize) {
        self.runtime
            .op_state()
            .borrow_mut()
            .put(HarnessRecords::with_limit(limit));
    }

    fn take_records(&mut self) -> HarnessRecords {
        let state = self.runtime.op_state();
        let mut state = state.borrow_mut();
        let records = state.try_take::<HarnessRecords>().unwrap_or_default();
        state.put(HarnessRecords::with_limit(0));
        records
    }
}

/// Deadline thread for a single stage.
/// Dropping an armed watchdog cancels and joins it, so the isolate handle is
/// never used after the stage ends.
struct Watchdog {
    cancel: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
    fired: Arc<AtomicBool>,
}

impl Watchdog {
    fn arm(handle: v8::IsolateHandle, timeout: Duration) -> Self {
        let fired = Arc::new(AtomicBool::new(false));
        let watchdog_fired = fired.clone();
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();

        let thread = std::thread::spawn(move || {
            if let Err(mpsc::RecvTimeoutError::Timeout) = cancel_rx.recv_timeout(timeout) {
                watchdog_fired.store(true, Ordering::SeqCst);
                handle.terminate_execution();
            }
        });

        Self {
            cancel: Some(cancel_tx),
            thread: Some(thread),
            fired,
        }
    }

    /// Stop the watchdog; returns whether the deadline fired
    fn disarm(mut self) -> bool {
        self.stop();
        self.fired.load(Ordering::SeqCst)
    }

    fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Watchdog thread panicked");
            }
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.stop();
    }
}
