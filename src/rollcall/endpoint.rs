// src/rollcall/endpoint.rs

use crate::{
    client::RobustClient,
    constants::api::templates,
    error::*,
    models::{
        CodeGuess,
        api::{NumberAnswerBody, RadarAnswerBody},
    },
};
use async_trait::async_trait;
use log::{debug, trace};
use reqwest::{Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;

/// 签到提交接口。HTTP 实现之外，测试中可以替换为进程内的假实现。
#[async_trait]
pub trait AnswerEndpoint: Send + Sync {
    /// 提交一个数字签到码，返回服务端的 JSON 响应。
    /// 非 2xx 状态按未命中处理并返回 `Value::Null`。
    async fn submit_number(
        &self,
        rollcall_id: u64,
        device_id: &str,
        code: CodeGuess,
    ) -> AppResult<Value>;

    /// 提交一次雷达签到。无论状态码如何都返回响应体，由调用方区分结果。
    async fn submit_radar(
        &self,
        rollcall_id: u64,
        device_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<Value>;
}

/// 响应是非空 JSON 对象即视为签到码正确。
pub fn is_accepted(response: &Value) -> bool {
    response.as_object().is_some_and(|obj| !obj.is_empty())
}

pub struct HttpAnswerEndpoint {
    client: Arc<RobustClient>,
}

impl HttpAnswerEndpoint {
    pub fn new(client: Arc<RobustClient>) -> Self {
        Self { client }
    }

    async fn read_json(url: &str, res: Response) -> AppResult<Value> {
        let text = res.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|source| AppError::ApiParseFailed {
            url: url.to_string(),
            source,
        })
    }
}

fn check_session(status: StatusCode) -> AppResult<()> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(AppError::SessionInvalid);
    }
    Ok(())
}

#[async_trait]
impl AnswerEndpoint for HttpAnswerEndpoint {
    async fn submit_number(
        &self,
        rollcall_id: u64,
        device_id: &str,
        code: CodeGuess,
    ) -> AppResult<Value> {
        let url = self
            .client
            .config()
            .endpoint_url(templates::ANSWER_NUMBER, Some(rollcall_id))?;
        let body = NumberAnswerBody {
            device_id,
            number_code: code,
        };
        let res = self.client.put_json(&url, &body).await?;
        let status = res.status();
        check_session(status)?;
        if !status.is_success() {
            trace!("签到码 {} 被拒绝 (HTTP {})", code, status);
            return Ok(Value::Null);
        }
        Self::read_json(&url, res).await
    }

    async fn submit_radar(
        &self,
        rollcall_id: u64,
        device_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<Value> {
        let url = self
            .client
            .config()
            .endpoint_url(templates::ANSWER_RADAR, Some(rollcall_id))?;
        let body = RadarAnswerBody::new(device_id, latitude, longitude);
        let res = self.client.put_json(&url, &body).await?;
        let status = res.status();
        check_session(status)?;
        debug!("雷达签到响应状态码: {}", status);
        Self::read_json(&url, res).await
    }
}
