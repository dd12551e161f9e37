//! # Run Registry Module / 运行注册表模块
//!
//! The registry is the single source of truth for run state. It owns every
//! [`TestRun`] record, hands out clones to readers, and guarantees the
//! lifecycle invariants: one transition out of `Running`, monotonic
//! progress, and removal after the retention window.
//!
//! It is an injected service instance, never a process-wide global: the
//! clock and retention window are constructor parameters so tests can drive
//! time deterministically.
//!
//! 注册表是运行状态的唯一事实来源。它拥有每条 [`TestRun`] 记录，
//! 向读取方分发克隆，并保证生命周期不变量：只离开一次 `Running`、
//! 进度单调递增、超过保留窗口后移除。
//!
//! 它是一个被注入的服务实例，而非进程级全局变量：时钟和保留窗口
//! 都是构造参数，因此测试可以确定性地驱动时间。

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::core::framework::Framework;
use crate::core::models::{RunId, RunStatus, TestResult, TestRun};

/// Time source for the registry. Production uses [`SystemClock`]; tests
/// inject a manually-advanced clock.
///
/// 注册表的时间源。生产环境使用 [`SystemClock`]；测试注入手动推进的时钟。
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
/// 系统墙钟。
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Immutable parameters captured when a run is created.
/// 创建运行时捕获的不可变参数。
#[derive(Debug, Clone)]
pub struct RunParams {
    pub framework: Framework,
    pub directory: PathBuf,
    pub test_pattern: Option<String>,
    pub coverage: bool,
    pub timeout_ms: u64,
}

/// A partial update merged into one registry entry. Absent fields leave the
/// entry untouched; `errors` are appended, never replaced.
///
/// 合并到单条注册表条目的部分更新。缺省字段保持条目不变；
/// `errors` 只追加，从不替换。
#[derive(Debug, Default)]
pub struct RunUpdate {
    pub status: Option<RunStatus>,
    pub progress: Option<u8>,
    pub results: Option<TestResult>,
    pub errors: Vec<String>,
}

impl RunUpdate {
    /// Progress-only update, reported by the executor while the process runs.
    pub fn progress(progress: u8) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    /// Transition to `Completed` with parsed results and an optional
    /// degraded-parsing diagnostic.
    pub fn completed(results: TestResult, warning: Option<String>) -> Self {
        Self {
            status: Some(RunStatus::Completed),
            results: Some(results),
            errors: warning.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Transition to a terminal failure state carrying one diagnostic.
    pub fn terminal(status: RunStatus, error: String) -> Self {
        Self {
            status: Some(status),
            errors: vec![error],
            ..Self::default()
        }
    }
}

/// TTL-bounded, in-memory store of [`TestRun`] records.
/// 有 TTL 限制的内存 [`TestRun`] 记录存储。
pub struct RunRegistry {
    runs: Mutex<HashMap<RunId, TestRun>>,
    clock: Box<dyn Clock>,
    retention: Duration,
    next_seq: AtomicU64,
}

impl RunRegistry {
    /// Creates a registry on the system clock.
    pub fn new(retention: Duration) -> Self {
        Self::with_clock(Box::new(SystemClock), retention)
    }

    /// Creates a registry with an injected clock, for deterministic tests.
    /// 使用注入时钟创建注册表，用于确定性测试。
    pub fn with_clock(clock: Box<dyn Clock>, retention: Duration) -> Self {
        Self {
            runs: Mutex::new(HashMap::new()),
            clock,
            retention,
            next_seq: AtomicU64::new(0),
        }
    }

    /// The registry's view of "now"; the status API derives `elapsed_ms`
    /// from this so queries and records share one time source.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RunId, TestRun>> {
        // A poisoned lock only means another thread panicked mid-update;
        // the map itself is still usable.
        self.runs.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Creates a new `Running` entry with progress 0 and returns its
    /// snapshot. Always succeeds. Sweeps expired entries first, so cleanup
    /// cost is amortized onto submission traffic.
    ///
    /// 创建一个进度为 0 的新 `Running` 条目并返回其快照。总是成功。
    /// 先清理过期条目，因此清理成本被摊销到提交流量上。
    pub fn create(&self, params: RunParams) -> TestRun {
        self.sweep();

        let now = self.clock.now();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let run_id = format!("run-{}-{}", now.timestamp_millis(), seq);

        let run = TestRun {
            run_id: run_id.clone(),
            framework: params.framework,
            status: RunStatus::Running,
            progress: 0,
            start_time: now,
            directory: params.directory,
            test_pattern: params.test_pattern,
            coverage_requested: params.coverage,
            timeout_ms: params.timeout_ms,
            results: None,
            errors: Vec::new(),
        };

        self.lock().insert(run_id, run.clone());
        run
    }

    /// Merges `update` into the entry for `run_id`. Returns `false` when
    /// the entry is missing or already terminal: a terminal run never
    /// mutates again, so a late update cannot resurrect it.
    ///
    /// 将 `update` 合并到 `run_id` 的条目中。条目缺失或已是终态时返回
    /// `false`：终态运行不再变化，迟到的更新无法使其复活。
    pub fn update(&self, run_id: &str, update: RunUpdate) -> bool {
        let mut runs = self.lock();
        let Some(run) = runs.get_mut(run_id) else {
            return false;
        };
        if run.status.is_terminal() {
            return false;
        }

        if let Some(progress) = update.progress {
            // Monotonic: a stale tick can never move progress backwards.
            run.progress = run.progress.max(progress.min(100));
        }
        if let Some(results) = update.results {
            run.results = Some(results);
        }
        if !update.errors.is_empty() {
            run.errors.extend(update.errors);
        }
        if let Some(status) = update.status {
            run.status = status;
            if status.is_terminal() {
                run.progress = 100;
            }
        }
        true
    }

    /// Looks up a run snapshot. Entries past the retention window read as
    /// absent even before a sweep removes them, so expiry is observable at
    /// the window boundary regardless of submission traffic.
    ///
    /// 查找运行快照。超过保留窗口的条目即使尚未被清理也视为不存在，
    /// 因此无论提交流量如何，过期都能在窗口边界被观察到。
    pub fn get(&self, run_id: &str) -> Option<TestRun> {
        let now = self.clock.now();
        self.lock()
            .get(run_id)
            .filter(|run| now - run.start_time <= self.retention)
            .cloned()
    }

    /// Removes every entry older than the retention window.
    /// 移除所有早于保留窗口的条目。
    pub fn sweep(&self) {
        let now = self.clock.now();
        self.lock()
            .retain(|_, run| now - run.start_time <= self.retention);
    }

    /// Number of stored entries, including expired-but-unswept ones.
    /// 存储的条目数量，包含已过期但尚未清理的条目。
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
