// src/cli.rs

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum, crate_version};

/// 定义日志输出级别
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    arg_required_else_help = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// 提供学在浙大登录 Session，优先级最高
    #[arg(long, global = true, help_heading = "General")]
    pub session: Option<String>,
    /// (隐藏参数) 设置日志文件的输出级别，用于调试
    #[arg(long, value_enum, default_value_t = LogLevel::Off, global = true, hide = true)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// 学在浙大签到相关命令组
    Rollcall {
        #[command(subcommand)]
        action: RollcallCommand,
    },
    /// 显示如何获取登录 Session 的指南并退出
    SessionHelp,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RollcallCommand {
    /// 列出当前的签到任务
    List,
    /// 回答一个签到任务
    Answer(AnswerArgs),
    /// 签到定位配置相关命令组
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Args, Debug, Clone)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .multiple(false)
        .args(["site", "number", "bruteforce"]),
))]
pub struct AnswerArgs {
    /// 签到任务 ID
    pub rollcall_id: u64,

    // --- 签到方式 (Mode)，三选一 ---
    /// 使用已保存的定位配置进行雷达签到
    #[arg(short, long, value_name = "NAME", help_heading = "Mode")]
    pub site: Option<String>,
    /// 直接提交 4 位数字签到码
    #[arg(short, long, value_name = "CODE", help_heading = "Mode")]
    pub number: Option<String>,
    /// 穷举 0000-9999 寻找数字签到码
    #[arg(short, long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub bruteforce: bool,

    // --- 爆破选项 (Options) ---
    /// [爆破模式] 同时在途的最大请求数 (默认 100)
    #[arg(short, long, value_parser = clap::value_parser!(usize), help_heading = "Options")]
    pub concurrency: Option<usize>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// 列出所有定位配置
    List,
    /// 添加一个定位配置
    Add {
        /// 配置项名称
        #[arg(short, long)]
        name: String,
        /// 纬度
        #[arg(short = 'L', long, allow_hyphen_values = true)]
        latitude: f64,
        /// 经度
        #[arg(short = 'l', long, allow_hyphen_values = true)]
        longitude: f64,
        /// 强制替换同名配置项
        #[arg(short, long, action = clap::ArgAction::SetTrue)]
        force: bool,
    },
    /// 删除一个定位配置
    Remove {
        /// 配置项名称
        name: String,
        /// 跳过二次确认
        #[arg(short, long, action = clap::ArgAction::SetTrue)]
        force: bool,
    },
    /// 初始化签到配置文件，首次使用或配置文件损坏时调用
    Init {
        /// 跳过二次确认
        #[arg(short, long, action = clap::ArgAction::SetTrue)]
        force: bool,
    },
}
