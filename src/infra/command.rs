//! # Process Execution Module / 进程执行模块
//!
//! This module owns the lowest layer of a run: spawning exactly one
//! external process, streaming its stdout/stderr, estimating progress from
//! elapsed time, and enforcing a hard wall-clock deadline. On Unix the
//! child is made leader of its own process group so a timeout can take the
//! whole tree down, not just the immediate child.
//!
//! 此模块拥有一次运行的最底层：派生恰好一个外部进程，流式读取其
//! stdout/stderr，根据已用时间估算进度，并强制执行硬性墙钟截止时间。
//! 在 Unix 上，子进程会成为其自身进程组的组长，
//! 因此超时可以终止整棵进程树，而不仅仅是直接子进程。

use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// A program plus its argument list, resolved before spawning.
/// 一个程序及其参数列表，在派生前已解析完毕。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ProcessCommand {
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The command as one displayable line, for logging.
    /// 以单行可展示形式表示的命令，用于日志。
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Everything captured from one finished process.
/// 从一个已结束进程捕获的全部内容。
#[derive(Debug, Clone)]
pub struct RawOutcome {
    /// Process exit code; `-1` when terminated by a signal.
    /// 进程退出码；被信号终止时为 `-1`。
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl RawOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout followed by stderr, the form retained on run records.
    /// stdout 后接 stderr，即保留在运行记录上的形式。
    pub fn combined_output(&self) -> String {
        let mut combined = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&self.stderr);
        }
        combined
    }
}

/// Failure modes of the executor. A timeout discards captured output for
/// result purposes; a spawn error happens before any timeout budget is
/// consumed.
///
/// 执行器的失败模式。超时会丢弃已捕获的输出（就结果而言）；
/// 派生错误发生在消耗任何超时预算之前。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Spawn(String),
    Timeout(u64),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Spawn(message) => write!(f, "failed to spawn process: {}", message),
            CommandError::Timeout(ms) => write!(f, "process exceeded {}ms deadline", ms),
        }
    }
}

impl std::error::Error for CommandError {}

/// Reads a captured stream to the end, line by line.
/// 逐行读取捕获的流直到末尾。
async fn drain<R: AsyncRead + Unpin>(stream: Option<R>) -> String {
    let Some(stream) = stream else {
        return String::new();
    };
    let mut output = String::new();
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        output.push_str(&line);
        output.push('\n');
    }
    output
}

/// Progress as a function of elapsed time versus the deadline, capped at 99
/// until the process actually exits.
/// 进度作为已用时间与截止时间之比的函数，在进程真正退出前封顶为 99。
fn estimate_progress(elapsed: Duration, timeout: Duration) -> u8 {
    let ratio = elapsed.as_millis() * 100 / timeout.as_millis().max(1);
    ratio.min(99) as u8
}

/// Kills the child and, on Unix, its whole process group. SIGKILL with no
/// grace period: a timed-out run is finalized immediately.
/// 终止子进程，并在 Unix 上终止其整个进程组。SIGKILL 且没有宽限期：
/// 超时的运行会立即被定格。
async fn kill_process_tree(child: &mut tokio::process::Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        // The child was spawned as its own group leader, so the group id
        // equals its pid.
        let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
    }
    let _ = child.start_kill();
    // Reap the child so it is no longer running when we return.
    let _ = child.wait().await;
}

/// Spawns `command` in `working_dir`, captures its stdout and stderr, and
/// waits for it to exit within `timeout`.
///
/// The output streams are read concurrently by two tasks. While the process
/// runs, `on_progress` is invoked on a fixed tick with an estimate derived
/// from elapsed time. On deadline expiry the process group is killed and
/// `CommandError::Timeout` is returned; partial output is dropped.
///
/// 在 `working_dir` 中派生 `command`，捕获其 stdout 和 stderr，
/// 并在 `timeout` 内等待其退出。
///
/// 输出流由两个任务并发读取。进程运行期间，`on_progress` 会按固定
/// 周期被调用，携带由已用时间推算的估计值。截止时间到达时进程组被
/// 终止并返回 `CommandError::Timeout`；部分输出被丢弃。
pub async fn run_with_deadline(
    command: &ProcessCommand,
    working_dir: &Path,
    timeout: Duration,
    mut on_progress: impl FnMut(u8),
) -> Result<RawOutcome, CommandError> {
    let start = Instant::now();

    let mut cmd = tokio::process::Command::new(&command.program);
    cmd.args(&command.args)
        .current_dir(working_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    // A missing or unstartable executable fails here, before any timeout
    // budget is consumed.
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return Err(CommandError::Spawn(e.to_string())),
    };

    let stdout_task = tokio::spawn(drain(child.stdout.take()));
    let stderr_task = tokio::spawn(drain(child.stderr.take()));

    let tick_every = (timeout / 20).max(Duration::from_millis(100));
    let mut ticks = tokio::time::interval(tick_every);
    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    let status = loop {
        tokio::select! {
            status = child.wait() => break status,
            _ = &mut deadline => {
                kill_process_tree(&mut child).await;
                stdout_task.abort();
                stderr_task.abort();
                return Err(CommandError::Timeout(timeout.as_millis() as u64));
            }
            _ = ticks.tick() => {
                on_progress(estimate_progress(start.elapsed(), timeout));
            }
        }
    };

    let status = match status {
        Ok(status) => status,
        Err(e) => return Err(CommandError::Spawn(e.to_string())),
    };

    // Wait for both reader tasks so all output is captured.
    let (stdout, stderr) = futures::join!(stdout_task, stderr_task);

    Ok(RawOutcome {
        exit_code: status.code().unwrap_or(-1),
        stdout: stdout.unwrap_or_default(),
        stderr: stderr.unwrap_or_default(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}
