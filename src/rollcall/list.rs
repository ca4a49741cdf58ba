// src/rollcall/list.rs

use crate::{
    client::RobustClient,
    constants::api::templates,
    error::*,
    models::api::{RollcallListResponse, RollcallSummary},
};
use log::info;

/// 拉取当前账号可见的签到任务。
pub async fn fetch_rollcalls(client: &RobustClient) -> AppResult<Vec<RollcallSummary>> {
    let url = client
        .config()
        .endpoint_url(templates::ROLLCALL_LIST, None)?;
    let response: RollcallListResponse = client.fetch_json(&url).await?;
    info!("获取到 {} 个签到任务", response.rollcalls.len());
    Ok(response.rollcalls)
}

/// 签到方式的简短描述，用于列表展示。
pub fn describe_kind(summary: &RollcallSummary) -> &'static str {
    match (summary.is_radar, summary.is_number) {
        (true, _) => "雷达",
        (false, true) => "数字",
        _ => "其他",
    }
}
