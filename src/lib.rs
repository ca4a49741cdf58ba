// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod rollcall;
pub mod symbols;
pub mod ui;
pub mod utils;
mod workflows;

use crate::{
    cli::{Cli, Command, RollcallCommand},
    config::AppConfig,
    error::AppResult,
};
use colored::*;
use log::debug;
use std::sync::{Arc, atomic::AtomicBool};

/// 需要访问学在浙大的命令共享的执行上下文
#[derive(Clone)]
pub struct RollcallContext {
    pub config: Arc<AppConfig>,
    pub args: Arc<Cli>,
    pub cancellation_token: Arc<AtomicBool>,
}

/// 库的公共入口点，由 `main.rs` 调用
pub async fn run_from_cli(args: Arc<Cli>, cancellation_token: Arc<AtomicBool>) -> AppResult<()> {
    debug!("CLI 参数: {:?}", args);

    let action = match &args.command {
        Command::SessionHelp => {
            ui::box_message(
                "获取学在浙大登录 Session 指南",
                constants::HELP_SESSION_GUIDE
                    .lines()
                    .collect::<Vec<_>>()
                    .as_slice(),
                |s| s.cyan(),
            );
            println!(
                "\n{} 安全提醒: Session 等同于你的登录凭据，请不要分享给他人。",
                *symbols::INFO
            );
            return Ok(());
        }
        Command::Rollcall { action } => action,
    };

    // 本地配置命令不需要网络配置
    if let RollcallCommand::Config { action } = action {
        return workflows::run_config(action);
    }

    let config = Arc::new(AppConfig::new()?);
    debug!("加载的应用配置: {:?}", config);
    let context = RollcallContext {
        config,
        args: args.clone(),
        cancellation_token,
    };

    match action {
        RollcallCommand::List => workflows::run_list(&context).await,
        RollcallCommand::Answer(answer_args) => workflows::run_answer(&context, answer_args).await,
        RollcallCommand::Config { .. } => Ok(()),
    }
}
