// src/workflows.rs

use crate::{
    RollcallContext,
    cli::{AnswerArgs, ConfigCommand},
    client::RobustClient,
    config::{AppConfig, rollcall_store::RollcallStore, session},
    error::{AppError, AppResult},
    models::{AnswerMode, CodeGuess, RollCallTask},
    rollcall::{self, HttpAnswerEndpoint, RollcallAnswerer},
    symbols, ui, utils,
};
use colored::*;
use log::{debug, info, warn};
use std::sync::Arc;

const LIST_TITLE_WIDTH: usize = 40;

/// 把命令行参数转换为签到方式，在任何网络请求之前完成全部校验。
pub(crate) fn resolve_mode(args: &AnswerArgs, store: &RollcallStore) -> AppResult<AnswerMode> {
    let selected = [args.site.is_some(), args.number.is_some(), args.bruteforce]
        .into_iter()
        .filter(|&b| b)
        .count();
    if selected != 1 {
        return Err(AppError::UserInputError(
            "必须且只能选择一种签到方式: --site、--number 或 --bruteforce。".to_string(),
        ));
    }

    if let Some(site) = &args.site {
        let (latitude, longitude) = store.coordinate(site)?;
        return Ok(AnswerMode::Radar {
            site: site.clone(),
            latitude,
            longitude,
        });
    }
    if let Some(number) = &args.number {
        return Ok(AnswerMode::NumberExact(number.parse::<CodeGuess>()?));
    }
    Ok(AnswerMode::NumberBruteforce)
}

/// 解析 Session 并构建 HTTP 会话。找不到 Session 时不发出任何请求。
fn build_client(context: &RollcallContext, config: Arc<AppConfig>) -> AppResult<RobustClient> {
    let (session_opt, source) = session::resolve_session(context.args.session.as_deref());
    let Some(session) = session_opt else {
        warn!("未找到登录 Session");
        return Err(AppError::SessionMissing);
    };
    info!("从 {} 加载 Session", source);
    println!("\n{} 已从 {} 加载 Session。", *symbols::INFO, source);
    RobustClient::new(config, Some(&session))
}

pub(crate) async fn run_list(context: &RollcallContext) -> AppResult<()> {
    let client = build_client(context, context.config.clone())?;
    let rollcalls = rollcall::list::fetch_rollcalls(&client).await?;

    if rollcalls.is_empty() {
        println!("\n{} {}", *symbols::OK, "当前没有进行中的签到任务。".green());
        return Ok(());
    }

    ui::print_header(&format!("当前共有 {} 个签到任务", rollcalls.len()));
    for summary in &rollcalls {
        let title = summary.course_title.as_deref().unwrap_or("未知课程");
        println!(
            "  {:<10} [{}] {} - {}{}",
            summary.rollcall_id.to_string().yellow(),
            rollcall::list::describe_kind(summary),
            utils::truncate_text(title, LIST_TITLE_WIDTH),
            summary.created_by_name.as_deref().unwrap_or("未知发起人"),
            summary
                .status
                .as_deref()
                .map(|s| format!(" ({})", s))
                .unwrap_or_default()
        );
    }
    Ok(())
}

pub(crate) async fn run_answer(context: &RollcallContext, args: &AnswerArgs) -> AppResult<()> {
    let store = RollcallStore::open_default()?;
    let mode = resolve_mode(args, &store)?;
    let config = Arc::new(
        context
            .config
            .as_ref()
            .clone()
            .with_concurrency(args.concurrency)?,
    );
    // 先确认 Session 可用，缺失时不应生成并写入设备 ID
    let client = Arc::new(build_client(context, config.clone())?);
    let device_id = store.device_id()?;
    let task = RollCallTask {
        rollcall_id: args.rollcall_id,
        device_id,
        mode,
    };
    debug!("签到任务: {:?}", task);

    let endpoint = Arc::new(HttpAnswerEndpoint::new(client));
    let answerer = RollcallAnswerer::new(endpoint, config, context.cancellation_token.clone())
        .with_progress(true);

    let outcome = answerer.answer(&task).await?;
    rollcall::report_outcome(&task, &outcome)
}

pub(crate) fn run_config(command: &ConfigCommand) -> AppResult<()> {
    let store = RollcallStore::open_default()?;
    run_config_with(&store, command)
}

fn run_config_with(store: &RollcallStore, command: &ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::List => {
            let config = store.load()?;
            if config.coordinates.is_empty() {
                ui::info("暂无定位配置，可使用 `rollcall config add` 添加。");
                return Ok(());
            }
            ui::print_sub_header(&format!("定位配置 ({})", store.path().display()));
            for (name, [latitude, longitude]) in &config.coordinates {
                println!("{}: ({}, {})", name.cyan(), latitude, longitude);
            }
            Ok(())
        }
        ConfigCommand::Add {
            name,
            latitude,
            longitude,
            force,
        } => {
            if !store.add_coordinate(name, *latitude, *longitude, *force)? {
                return Err(AppError::UserInputError(format!(
                    "{} 地点已存在，如需覆盖请使用 --force。",
                    name
                )));
            }
            info!("添加定位配置 {}: ({}, {})", name, latitude, longitude);
            println!(
                "\n{} 已保存定位配置 {}: ({}, {})",
                *symbols::OK,
                name,
                latitude,
                longitude
            );
            Ok(())
        }
        ConfigCommand::Remove { name, force } => {
            store.coordinate(name)?;
            if !*force && !ui::confirm(&format!("确定要删除定位配置 '{}' 吗?", name), false) {
                ui::warn("已取消。");
                return Ok(());
            }
            if store.remove_coordinate(name)?.is_none() {
                return Err(AppError::UserInputError(format!("{} 地点不存在！", name)));
            }
            info!("删除定位配置 {}", name);
            println!("\n{} 已删除定位配置 {}", *symbols::OK, name);
            Ok(())
        }
        ConfigCommand::Init { force } => {
            if !*force
                && store.is_healthy()
                && !ui::confirm("签到配置状态正常，确定要重置吗? 已保存的定位点将丢失", false)
            {
                ui::warn("已取消。");
                return Ok(());
            }
            store.reset()?;
            info!("签到配置已重置: {}", store.path().display());
            println!(
                "\n{} 签到配置已初始化: {}",
                *symbols::OK,
                store.path().display()
            );
            Ok(())
        }
    }
}
