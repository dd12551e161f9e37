//! # Status API Module / 状态 API 模块
//!
//! A stateless, read-only projection over the run registry, keyed by run
//! identifier. It never blocks and performs no side effects, so callers
//! may poll at any rate, including not at all.
//!
//! 运行注册表之上的无状态只读投影，以运行标识符为键。
//! 它从不阻塞也没有副作用，因此调用方可以以任意频率轮询，
//! 包括完全不轮询。

use serde::Serialize;
use std::sync::Arc;

use crate::core::framework::Framework;
use crate::core::models::{EngineError, RunStatus, TestResult};
use crate::core::registry::RunRegistry;

/// One point-in-time view of a run. `elapsed_ms` is computed at query time
/// from the registry clock and never stored.
///
/// 某一时刻的运行视图。`elapsed_ms` 在查询时根据注册表时钟计算，
/// 从不被存储。
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub run_id: String,
    pub framework: Framework,
    pub status: RunStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<TestResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub elapsed_ms: u64,
}

/// The query surface. Holds nothing but a handle to the registry.
/// 查询表面。除注册表句柄外不持有任何东西。
pub struct StatusApi {
    registry: Arc<RunRegistry>,
}

impl StatusApi {
    pub fn new(registry: Arc<RunRegistry>) -> Self {
        Self { registry }
    }

    /// Looks up the current snapshot for `run_id`. A run that was never
    /// issued, or whose record aged past the retention window, yields
    /// `UnknownRunId` - the two cases are indistinguishable by design.
    ///
    /// 查找 `run_id` 的当前快照。从未签发的运行，或记录已超过保留
    /// 窗口的运行，都会得到 `UnknownRunId`。这两种情况在设计上
    /// 无法区分。
    pub fn status(&self, run_id: &str) -> Result<StatusSnapshot, EngineError> {
        let run = self
            .registry
            .get(run_id)
            .ok_or_else(|| EngineError::UnknownRunId(run_id.to_string()))?;

        let elapsed = self.registry.now() - run.start_time;

        Ok(StatusSnapshot {
            run_id: run.run_id,
            framework: run.framework,
            status: run.status,
            progress: run.progress,
            results: run.results,
            errors: run.errors,
            elapsed_ms: elapsed.num_milliseconds().max(0) as u64,
        })
    }
}
