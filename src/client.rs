// src/client.rs

use crate::{config::AppConfig, constants, error::*};
use log::debug;
use reqwest::{
    IntoUrl, Response, StatusCode,
    header::{COOKIE, HeaderMap, HeaderValue, ORIGIN},
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

/// 携带登录 Session 的共享 HTTP 会话。克隆开销很小，可被大量并发请求同时使用。
#[derive(Clone)]
pub struct RobustClient {
    /// 带指数退避重试的客户端，只用于幂等的 GET
    pub client: ClientWithMiddleware,
    /// 不重试的底层客户端，用于签到提交：每次调用只发一个请求
    raw: reqwest::Client,
    config: Arc<AppConfig>,
}

impl RobustClient {
    pub fn new(config: Arc<AppConfig>, session: Option<&str>) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(session) = session {
            let cookie = format!("{}={}", constants::SESSION_COOKIE_NAME, session);
            let value = HeaderValue::from_str(&cookie).map_err(|_| {
                AppError::UserInputError("Session 中包含非法字符。".to_string())
            })?;
            headers.insert(COOKIE, value);
        }
        if let Ok(origin) = HeaderValue::from_str(&config.base_url) {
            headers.insert(ORIGIN, origin);
        }

        let raw = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.concurrency)
            .build()?;

        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(raw.clone())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            raw,
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn get<T: IntoUrl>(&self, url: T) -> AppResult<Response> {
        let res = self.client.get(url).send().await?;
        if res.status() == StatusCode::UNAUTHORIZED || res.status() == StatusCode::FORBIDDEN {
            return Err(AppError::SessionInvalid);
        }
        Ok(res.error_for_status()?)
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        debug!("GET {}", url);
        let text = self.get(url).await?.text().await?;
        serde_json::from_str(&text).map_err(|source| AppError::ApiParseFailed {
            url: url.to_string(),
            source,
        })
    }

    /// 发送一次 PUT 请求，不重试、不检查状态码，由调用方解释响应。
    pub async fn put_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> AppResult<Response> {
        Ok(self.raw.put(url).json(body).send().await?)
    }
}
