// src/config/session.rs

use crate::{
    config::ExternalConfig,
    constants,
    error::{AppError, AppResult},
    utils,
};
use anyhow::{Context, anyhow};
use log::{debug, info};
use std::{fs, path::PathBuf};

pub(crate) fn config_dir() -> AppResult<PathBuf> {
    let dir = dirs::home_dir()
        .ok_or_else(|| AppError::Other(anyhow!("无法获取用户主目录")))?
        .join(constants::CONFIG_DIR_NAME);
    Ok(dir)
}

pub(super) fn get_config_path() -> AppResult<PathBuf> {
    Ok(config_dir()?.join(constants::CONFIG_FILE_NAME))
}

pub(crate) fn load_or_create_external_config() -> AppResult<ExternalConfig> {
    let config_path = get_config_path()?;
    if config_path.is_file() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("读取配置文件 '{}' 失败", config_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件 '{}' 失败", config_path.display()))
            .map_err(AppError::from)
    } else {
        info!("配置文件 {:?} 不存在，将创建默认配置。", config_path);
        let config = ExternalConfig::default_app_config();
        utils::write_json_atomic(&config_path, &config)?;
        Ok(config)
    }
}

pub fn load_session_from_config() -> Option<String> {
    load_or_create_external_config()
        .ok()
        .and_then(|config| config.session)
}

/// 依次从命令行、环境变量、本地配置文件中查找登录 Session。
pub fn resolve_session(cli_session: Option<&str>) -> (Option<String>, String) {
    if let Some(session) = cli_session && !session.is_empty() {
        debug!("使用来自命令行参数的 Session");
        return (Some(session.to_string()), "命令行参数".to_string());
    }
    if let Ok(session) = std::env::var(constants::SESSION_ENV_VAR) && !session.is_empty() {
        debug!("使用来自环境变量 {} 的 Session", constants::SESSION_ENV_VAR);
        return (
            Some(session),
            format!("环境变量 ({})", constants::SESSION_ENV_VAR),
        );
    }
    if let Some(session) = load_session_from_config() && !session.is_empty() {
        debug!("使用来自本地配置文件的 Session");
        return (Some(session), "本地配置文件".to_string());
    }
    debug!("未在任何位置找到可用的 Session");
    (None, "未找到".to_string())
}
