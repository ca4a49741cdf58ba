// src/config/rollcall_store.rs

use super::session::config_dir;
use crate::{
    constants,
    error::{AppError, AppResult},
    utils,
};
use anyhow::Context;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// `rollcall.json` 的内容：设备标识与命名定位点。
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RollcallSiteConfig {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub coordinates: BTreeMap<String, [f64; 2]>,
}

/// 本地签到配置存储，负责设备 ID 的生成与持久化以及定位点管理。
#[derive(Debug, Clone)]
pub struct RollcallStore {
    path: PathBuf,
}

impl RollcallStore {
    pub fn open_default() -> AppResult<Self> {
        Ok(Self::at(config_dir()?.join(constants::ROLLCALL_FILE_NAME)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文件不存在时返回空配置；文件损坏时报错并提示重新初始化。
    pub fn load(&self) -> AppResult<RollcallSiteConfig> {
        if !self.path.is_file() {
            debug!("签到配置 {:?} 不存在，使用空配置。", self.path);
            return Ok(RollcallSiteConfig::default());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("读取签到配置 '{}' 失败", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(RollcallSiteConfig::default());
        }
        serde_json::from_str(&content).map_err(|e| {
            warn!("签到配置 '{}' 解析失败: {}", self.path.display(), e);
            AppError::Config(format!(
                "签到配置 '{}' 已损坏 ({})，请运行 `rollcall config init` 重新初始化。",
                self.path.display(),
                e
            ))
        })
    }

    pub fn save(&self, config: &RollcallSiteConfig) -> AppResult<()> {
        utils::write_json_atomic(&self.path, config)?;
        info!("签到配置已写入 {}", self.path.display());
        Ok(())
    }

    /// 返回已持久化的设备 ID；缺失或无效时生成一个新的 UUID v4 并写回。
    pub fn device_id(&self) -> AppResult<String> {
        let mut config = self.load()?;
        if utils::is_device_id(&config.device_id) {
            debug!("使用已保存的设备 ID: {}", config.device_id);
            return Ok(config.device_id);
        }
        if !config.device_id.is_empty() {
            warn!("已保存的设备 ID '{}' 无效，将重新生成。", config.device_id);
        }
        config.device_id = uuid::Uuid::new_v4().to_string();
        self.save(&config)?;
        info!("生成新的设备 ID: {}", config.device_id);
        Ok(config.device_id)
    }

    pub fn coordinate(&self, name: &str) -> AppResult<(f64, f64)> {
        self.load()?
            .coordinates
            .get(name)
            .map(|[latitude, longitude]| (*latitude, *longitude))
            .ok_or_else(|| AppError::UserInputError(format!("{} 地点不存在！", name)))
    }

    /// 添加定位点。同名配置已存在且未指定 `force` 时返回 `Ok(false)`。
    pub fn add_coordinate(
        &self,
        name: &str,
        latitude: f64,
        longitude: f64,
        force: bool,
    ) -> AppResult<bool> {
        if name.trim().is_empty() {
            return Err(AppError::UserInputError("配置项名称不能为空。".to_string()));
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::UserInputError(format!(
                "无效的坐标 ({}, {})：纬度应在 [-90, 90]，经度应在 [-180, 180]。",
                latitude, longitude
            )));
        }
        let mut config = self.load()?;
        if config.coordinates.contains_key(name) && !force {
            return Ok(false);
        }
        config
            .coordinates
            .insert(name.to_string(), [latitude, longitude]);
        self.save(&config)?;
        Ok(true)
    }

    pub fn remove_coordinate(&self, name: &str) -> AppResult<Option<[f64; 2]>> {
        let mut config = self.load()?;
        let removed = config.coordinates.remove(name);
        if removed.is_some() {
            self.save(&config)?;
        }
        Ok(removed)
    }

    /// 配置文件可以解析且设备 ID 有效。
    pub fn is_healthy(&self) -> bool {
        self.load()
            .is_ok_and(|config| utils::is_device_id(&config.device_id))
    }

    pub fn reset(&self) -> AppResult<()> {
        self.save(&RollcallSiteConfig::default())
    }
}
