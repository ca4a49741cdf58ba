// src/models/api.rs

use super::CodeGuess;
use crate::constants::api::radar;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// --- 签到请求体 ---

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NumberAnswerBody<'a> {
    pub device_id: &'a str,
    pub number_code: CodeGuess,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RadarAnswerBody<'a> {
    pub accuracy: u32,
    pub altitude: Option<f64>,
    pub altitude_accuracy: Option<f64>,
    pub device_id: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: Option<f64>,
}

impl<'a> RadarAnswerBody<'a> {
    pub fn new(device_id: &'a str, latitude: f64, longitude: f64) -> Self {
        Self {
            accuracy: radar::ACCURACY,
            altitude: None,
            altitude_accuracy: None,
            device_id,
            latitude,
            longitude,
            speed: None,
        }
    }
}

// --- 签到列表响应 ---

#[derive(Deserialize, Debug, Clone)]
pub struct RollcallListResponse {
    #[serde(default)]
    pub rollcalls: Vec<RollcallSummary>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RollcallSummary {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub rollcall_id: u64,
    #[serde(default)]
    pub course_title: Option<String>,
    #[serde(default)]
    pub created_by_name: Option<String>,
    #[serde(default)]
    pub is_radar: bool,
    #[serde(default)]
    pub is_number: bool,
    #[serde(default)]
    pub status: Option<String>,
}

fn id_from_number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom(format!("无效的签到 ID: {}", n))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("无效的签到 ID: '{}'", s))),
        other => Err(serde::de::Error::custom(format!("无效的签到 ID: {}", other))),
    }
}
