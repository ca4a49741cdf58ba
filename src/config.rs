// src/config.rs

pub mod rollcall_store;
pub mod session;

use self::session::load_or_create_external_config;
use crate::{
    constants::{self, api::templates},
    error::{AppError, AppResult},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, time::Duration};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    pub base_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BruteforceConfig {
    pub concurrency: Option<usize>,
    pub deadline_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub url_templates: HashMap<String, String>,
    #[serde(default)]
    pub bruteforce: BruteforceConfig,
}

impl ExternalConfig {
    pub(crate) fn default_app_config() -> Self {
        Self {
            session: None,
            network: NetworkConfig {
                base_url: Some(constants::DEFAULT_BASE_URL.into()),
                connect_timeout_secs: Some(constants::network::CONNECT_TIMEOUT_SECS),
                timeout_secs: Some(constants::network::TIMEOUT_SECS),
                max_retries: Some(constants::network::MAX_RETRIES),
            },
            url_templates: default_url_templates(),
            bruteforce: BruteforceConfig {
                concurrency: Some(constants::bruteforce::DEFAULT_CONCURRENCY),
                deadline_secs: Some(constants::bruteforce::DEFAULT_DEADLINE_SECS),
            },
        }
    }
}

fn default_url_templates() -> HashMap<String, String> {
    HashMap::from([
        (
            templates::ROLLCALL_LIST.into(),
            "{base_url}/api/radar/rollcalls?api_version=1.1.0".into(),
        ),
        (
            templates::ANSWER_NUMBER.into(),
            "{base_url}/api/rollcalls/{rollcall_id}/answer".into(),
        ),
        (
            templates::ANSWER_RADAR.into(),
            "{base_url}/api/rollcalls/{rollcall_id}/answer?api_version=1.76".into(),
        ),
    ])
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub max_retries: u32,
    pub url_templates: HashMap<String, String>,
    pub concurrency: usize,
    pub deadline: Duration,
}

impl AppConfig {
    pub fn new() -> AppResult<Self> {
        Self::from_external(load_or_create_external_config()?)
    }

    pub fn from_external(external_config: ExternalConfig) -> AppResult<Self> {
        let base_url = external_config
            .network
            .base_url
            .unwrap_or_else(|| constants::DEFAULT_BASE_URL.into());
        Url::parse(&base_url)?;

        // 配置文件里缺失的模板回退到内置默认值
        let mut url_templates = default_url_templates();
        url_templates.extend(external_config.url_templates);

        let config = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: constants::USER_AGENT.into(),
            connect_timeout: Duration::from_secs(
                external_config
                    .network
                    .connect_timeout_secs
                    .unwrap_or(constants::network::CONNECT_TIMEOUT_SECS),
            ),
            timeout: Duration::from_secs(
                external_config
                    .network
                    .timeout_secs
                    .unwrap_or(constants::network::TIMEOUT_SECS),
            ),
            max_retries: external_config
                .network
                .max_retries
                .unwrap_or(constants::network::MAX_RETRIES),
            url_templates,
            concurrency: constants::bruteforce::DEFAULT_CONCURRENCY,
            deadline: Duration::from_secs(
                external_config
                    .bruteforce
                    .deadline_secs
                    .unwrap_or(constants::bruteforce::DEFAULT_DEADLINE_SECS),
            ),
        };
        config.with_concurrency(external_config.bruteforce.concurrency)
    }

    /// 用命令行或配置文件中的值覆盖爆破并发上限。
    pub fn with_concurrency(mut self, concurrency: Option<usize>) -> AppResult<Self> {
        if let Some(n) = concurrency {
            if n == 0 {
                return Err(AppError::UserInputError(
                    "并发数必须至少为 1。".to_string(),
                ));
            }
            self.concurrency = n;
        }
        Ok(self)
    }

    /// 展开 URL 模板中的 `{base_url}` 与 `{rollcall_id}` 占位符。
    pub fn endpoint_url(&self, template_key: &str, rollcall_id: Option<u64>) -> AppResult<String> {
        let template = self.url_templates.get(template_key).ok_or_else(|| {
            AppError::Config(format!("缺少 URL 模板 '{}'", template_key))
        })?;
        let mut url = template.replace("{base_url}", &self.base_url);
        if let Some(id) = rollcall_id {
            url = url.replace("{rollcall_id}", &id.to_string());
        }
        if url.contains('{') {
            return Err(AppError::Config(format!(
                "URL 模板 '{}' 含有未替换的占位符: {}",
                template_key, url
            )));
        }
        Url::parse(&url)?;
        Ok(url)
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:1".to_string(),
            user_agent: "test-agent/1.0".to_string(),
            connect_timeout: Duration::from_secs(2),
            timeout: Duration::from_secs(5),
            max_retries: 0,
            url_templates: default_url_templates(),
            concurrency: constants::bruteforce::DEFAULT_CONCURRENCY,
            deadline: Duration::from_secs(60),
        }
    }
}
