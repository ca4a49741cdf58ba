// src/models/mod.rs

pub mod api;

use crate::{
    error::{AppError, AppResult},
    symbols, utils,
};
use colored::{ColoredString, Colorize};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::{fmt, str::FromStr, time::Duration};

/// 一个 4 位数字签到码，取值 0..=9999，规范形式为补零后的 4 个字符。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CodeGuess(u16);

impl CodeGuess {
    pub const MAX: u16 = 9999;

    pub fn new(value: u16) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// 按从小到大的顺序遍历整个 `0000`-`9999` 空间。
    pub fn all() -> impl ExactSizeIterator<Item = CodeGuess> {
        (0..=Self::MAX).map(Self)
    }
}

impl fmt::Display for CodeGuess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl FromStr for CodeGuess {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let s = s.trim();
        if !utils::CODE_PATTERN.is_match(s) {
            return Err(AppError::UserInputError(format!(
                "无效的签到码 '{}'，应为 4 位数字 (0000-9999)。",
                s
            )));
        }
        s.parse::<u16>()
            .map(Self)
            .map_err(|e| AppError::UserInputError(format!("无效的签到码 '{}': {}", s, e)))
    }
}

impl Serialize for CodeGuess {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 一次签到的回答方式，每次调用恰好选择一种。
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerMode {
    Radar {
        site: String,
        latitude: f64,
        longitude: f64,
    },
    NumberExact(CodeGuess),
    NumberBruteforce,
}

/// 每次命令行调用构造一次，不持久化。
#[derive(Debug, Clone, PartialEq)]
pub struct RollCallTask {
    pub rollcall_id: u64,
    pub device_id: String,
    pub mode: AnswerMode,
}

/// 单个猜测的结果。网络或解析错误按未命中处理，但单独计数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessResult {
    Found(CodeGuess),
    Miss,
    Errored(String),
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(CodeGuess),
    NotFound,
}

#[derive(Debug, Clone)]
pub struct BruteForceReport {
    pub outcome: SearchOutcome,
    /// 真正发出了请求的猜测数
    pub dispatched: usize,
    /// 因已命中、超时或用户中断而未发出请求的猜测数
    pub skipped: usize,
    pub errored: usize,
    pub extra_matches: usize,
    pub deadline_hit: bool,
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl BruteForceReport {
    pub fn total(&self) -> usize {
        self.dispatched + self.skipped
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RadarOutcome {
    Success,
    OutOfRange { distance: Option<f64> },
    Unknown(Value),
}

impl RadarOutcome {
    pub fn get_display_info(
        &self,
    ) -> (
        &'static ColoredString,
        fn(ColoredString) -> ColoredString,
        &'static str,
    ) {
        match self {
            RadarOutcome::Success => (&symbols::OK, |s| s.green(), "雷达签到成功"),
            RadarOutcome::OutOfRange { .. } => (&symbols::WARN, |s| s.yellow(), "不在签到范围内"),
            RadarOutcome::Unknown(_) => (&symbols::ERROR, |s| s.red(), "未知的签到响应"),
        }
    }
}

/// 一次签到命令的终态。
#[derive(Debug, Clone)]
pub enum AnswerOutcome {
    Radar {
        latitude: f64,
        longitude: f64,
        outcome: RadarOutcome,
    },
    Number {
        code: CodeGuess,
        accepted: bool,
    },
    Bruteforce(BruteForceReport),
}

impl AnswerOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            AnswerOutcome::Radar { outcome, .. } => *outcome == RadarOutcome::Success,
            AnswerOutcome::Number { accepted, .. } => *accepted,
            AnswerOutcome::Bruteforce(report) => {
                matches!(report.outcome, SearchOutcome::Found(_))
            }
        }
    }
}
