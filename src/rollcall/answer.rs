// src/rollcall/answer.rs

use super::{
    bruteforce::BruteForcer,
    endpoint::{AnswerEndpoint, is_accepted},
};
use crate::{
    config::AppConfig,
    constants::api::radar,
    error::*,
    models::{AnswerMode, AnswerOutcome, RadarOutcome, RollCallTask, SearchOutcome},
    symbols, ui,
};
use colored::Colorize;
use log::{error, info, warn};
use serde_json::Value;
use std::sync::{Arc, atomic::AtomicBool};

/// 按任务选择的签到方式提交答案，产出唯一的终态。
pub struct RollcallAnswerer {
    endpoint: Arc<dyn AnswerEndpoint>,
    config: Arc<AppConfig>,
    interrupt: Arc<AtomicBool>,
    show_progress: bool,
}

impl RollcallAnswerer {
    pub fn new(
        endpoint: Arc<dyn AnswerEndpoint>,
        config: Arc<AppConfig>,
        interrupt: Arc<AtomicBool>,
    ) -> Self {
        Self {
            endpoint,
            config,
            interrupt,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub async fn answer(&self, task: &RollCallTask) -> AppResult<AnswerOutcome> {
        match &task.mode {
            AnswerMode::Radar {
                site,
                latitude,
                longitude,
            } => {
                info!(
                    "雷达签到 {}，地点 '{}' ({}, {})",
                    task.rollcall_id, site, latitude, longitude
                );
                let response = self
                    .endpoint
                    .submit_radar(task.rollcall_id, &task.device_id, *latitude, *longitude)
                    .await?;
                Ok(AnswerOutcome::Radar {
                    latitude: *latitude,
                    longitude: *longitude,
                    outcome: classify_radar(response),
                })
            }
            AnswerMode::NumberExact(code) => {
                info!("数字签到 {}，签到码 {}", task.rollcall_id, code);
                let response = self
                    .endpoint
                    .submit_number(task.rollcall_id, &task.device_id, *code)
                    .await?;
                Ok(AnswerOutcome::Number {
                    code: *code,
                    accepted: is_accepted(&response),
                })
            }
            AnswerMode::NumberBruteforce => {
                let progress = if self.show_progress {
                    ui::new_tasks_progress_bar(0, "爆破")
                } else {
                    indicatif::ProgressBar::hidden()
                };
                let forcer = BruteForcer::new(self.endpoint.clone(), self.config.concurrency)
                    .with_deadline(self.config.deadline)
                    .with_interrupt(self.interrupt.clone())
                    .with_progress(progress);
                if self.show_progress {
                    ui::info(&format!(
                        "开始爆破签到码 0000-9999 (并发数: {})...",
                        forcer.concurrency()
                    ));
                }
                let report = forcer.run(task.rollcall_id, &task.device_id).await;
                Ok(AnswerOutcome::Bruteforce(report))
            }
        }
    }
}

/// 根据 `status_name` 与 `error_code` 区分雷达签到的三种结果。
pub fn classify_radar(response: Value) -> RadarOutcome {
    let field = |name: &str| response.get(name).and_then(Value::as_str);
    if field("status_name") == Some(radar::STATUS_ON_CALL_FINE) {
        return RadarOutcome::Success;
    }
    if field("error_code") == Some(radar::ERROR_OUT_OF_SCOPE) {
        let distance = response.get("distance").and_then(Value::as_f64);
        return RadarOutcome::OutOfRange { distance };
    }
    RadarOutcome::Unknown(response)
}

/// 输出唯一的最终提示。失败时返回错误，使进程以非零状态退出。
pub fn report_outcome(task: &RollCallTask, outcome: &AnswerOutcome) -> AppResult<()> {
    match outcome {
        AnswerOutcome::Radar {
            latitude,
            longitude,
            outcome: radar_outcome,
        } => {
            let (symbol, color_fn, title) = radar_outcome.get_display_info();
            match radar_outcome {
                RadarOutcome::Success => {
                    info!("签到 {} 雷达签到成功", task.rollcall_id);
                    println!(
                        "\n{} {}\n签到纬度: {}\n签到经度: {}",
                        symbol,
                        color_fn(title.into()),
                        latitude,
                        longitude
                    );
                    Ok(())
                }
                RadarOutcome::OutOfRange { distance } => {
                    let detail = match distance {
                        Some(d) => format!("距离签到点约 {:.0} 米", d),
                        None => "服务端未返回距离".to_string(),
                    };
                    warn!("签到 {} 不在范围内: {}", task.rollcall_id, detail);
                    Err(AppError::RollcallFailed(format!(
                        "{} {} ({})",
                        task.rollcall_id, title, detail
                    )))
                }
                RadarOutcome::Unknown(raw) => {
                    error!("签到 {} 收到未知响应: {}", task.rollcall_id, raw);
                    Err(AppError::RollcallFailed(format!(
                        "{} {}: {}\n{} 这可能意味着学在浙大的接口发生了变化，欢迎将以上内容反馈给维护者。",
                        task.rollcall_id,
                        title,
                        raw,
                        *symbols::INFO
                    )))
                }
            }
        }
        AnswerOutcome::Number { code, accepted } => {
            if *accepted {
                info!("签到 {} 使用签到码 {} 成功", task.rollcall_id, code);
                println!(
                    "\n{} {}",
                    *symbols::OK,
                    format!("签到成功！签到码: {}", code).green()
                );
                Ok(())
            } else {
                warn!("签到 {} 使用签到码 {} 失败", task.rollcall_id, code);
                Err(AppError::RollcallFailed(format!(
                    "{} 签到码 {} 不正确",
                    task.rollcall_id, code
                )))
            }
        }
        AnswerOutcome::Bruteforce(report) => match report.outcome {
            SearchOutcome::Found(code) => {
                println!(
                    "\n{} {}",
                    *symbols::OK,
                    format!(
                        "签到成功！签到码: {} (尝试 {} 次，用时 {:.1} 秒)",
                        code,
                        report.dispatched,
                        report.elapsed.as_secs_f64()
                    )
                    .green()
                );
                if report.extra_matches > 0 {
                    println!(
                        "{} 另有 {} 个签到码也被服务端接受，已忽略。",
                        *symbols::WARN,
                        report.extra_matches
                    );
                }
                Ok(())
            }
            SearchOutcome::NotFound if report.interrupted => Err(AppError::UserInterrupt),
            SearchOutcome::NotFound => {
                let mut reason = if report.deadline_hit {
                    format!("{} 超出总时限，未找到签到码", task.rollcall_id)
                } else {
                    format!("{} 穷举全部签到码后仍未找到", task.rollcall_id)
                };
                if report.errored > 0 {
                    reason.push_str(&format!(
                        " (其中 {} 次请求出错，详情见日志)",
                        report.errored
                    ));
                }
                warn!("签到 {} 爆破失败: {}", task.rollcall_id, reason);
                Err(AppError::RollcallFailed(reason))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CodeGuess;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct ScriptedEndpoint {
        number_response: Value,
        radar_response: Value,
        last_radar: Mutex<Option<(f64, f64)>>,
    }

    #[async_trait]
    impl AnswerEndpoint for ScriptedEndpoint {
        async fn submit_number(
            &self,
            _rollcall_id: u64,
            _device_id: &str,
            _code: CodeGuess,
        ) -> AppResult<Value> {
            Ok(self.number_response.clone())
        }

        async fn submit_radar(
            &self,
            _rollcall_id: u64,
            _device_id: &str,
            latitude: f64,
            longitude: f64,
        ) -> AppResult<Value> {
            *self.last_radar.lock().unwrap() = Some((latitude, longitude));
            Ok(self.radar_response.clone())
        }
    }

    fn answerer(endpoint: Arc<ScriptedEndpoint>) -> RollcallAnswerer {
        RollcallAnswerer::new(
            endpoint,
            Arc::new(AppConfig::default()),
            Arc::new(AtomicBool::new(false)),
        )
    }

    fn task(mode: AnswerMode) -> RollCallTask {
        RollCallTask {
            rollcall_id: 500,
            device_id: "device".to_string(),
            mode,
        }
    }

    #[test]
    fn test_classify_radar() {
        assert_eq!(
            classify_radar(json!({"status_name": "on_call_fine", "id": 1})),
            RadarOutcome::Success
        );
        assert_eq!(
            classify_radar(json!({"error_code": "radar_out_of_rollcall_scope", "distance": 812.5})),
            RadarOutcome::OutOfRange {
                distance: Some(812.5)
            }
        );
        assert_eq!(
            classify_radar(json!({"error_code": "radar_out_of_rollcall_scope"})),
            RadarOutcome::OutOfRange { distance: None }
        );
        assert!(matches!(
            classify_radar(json!({"status_name": "absent"})),
            RadarOutcome::Unknown(_)
        ));
        assert!(matches!(classify_radar(Value::Null), RadarOutcome::Unknown(_)));
    }

    #[tokio::test]
    async fn test_radar_mode_sends_site_coordinates() {
        let endpoint = Arc::new(ScriptedEndpoint {
            number_response: json!({}),
            radar_response: json!({"status_name": "on_call_fine"}),
            last_radar: Mutex::new(None),
        });
        let outcome = answerer(endpoint.clone())
            .answer(&task(AnswerMode::Radar {
                site: "紫金港".to_string(),
                latitude: 30.3,
                longitude: 120.08,
            }))
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(*endpoint.last_radar.lock().unwrap(), Some((30.3, 120.08)));
    }

    #[tokio::test]
    async fn test_number_exact_mode_is_binary() {
        let code = CodeGuess::new(42).unwrap();
        let accepted = Arc::new(ScriptedEndpoint {
            number_response: json!({"id": 9}),
            radar_response: json!({}),
            last_radar: Mutex::new(None),
        });
        let rejected = Arc::new(ScriptedEndpoint {
            number_response: json!({}),
            radar_response: json!({}),
            last_radar: Mutex::new(None),
        });

        let t = task(AnswerMode::NumberExact(code));
        let ok = answerer(accepted).answer(&t).await.unwrap();
        let bad = answerer(rejected).answer(&t).await.unwrap();

        assert!(ok.is_success());
        assert!(report_outcome(&t, &ok).is_ok());
        assert!(!bad.is_success());
        assert!(matches!(
            report_outcome(&t, &bad),
            Err(AppError::RollcallFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_bruteforce_not_found_is_a_failure_not_a_crash() {
        let endpoint = Arc::new(ScriptedEndpoint {
            number_response: json!(false),
            radar_response: json!({}),
            last_radar: Mutex::new(None),
        });
        let t = task(AnswerMode::NumberBruteforce);
        let outcome = answerer(endpoint).answer(&t).await.unwrap();

        let AnswerOutcome::Bruteforce(report) = &outcome else {
            panic!("应当返回爆破报告");
        };
        assert_eq!(report.outcome, SearchOutcome::NotFound);
        assert_eq!(report.total(), 10_000);
        assert!(matches!(
            report_outcome(&t, &outcome),
            Err(AppError::RollcallFailed(_))
        ));
    }

    #[test]
    fn test_out_of_range_and_unknown_are_distinct_failures() {
        let t = task(AnswerMode::Radar {
            site: "home".to_string(),
            latitude: 0.0,
            longitude: 0.0,
        });
        let out_of_range = AnswerOutcome::Radar {
            latitude: 0.0,
            longitude: 0.0,
            outcome: RadarOutcome::OutOfRange {
                distance: Some(1000.0),
            },
        };
        let unknown = AnswerOutcome::Radar {
            latitude: 0.0,
            longitude: 0.0,
            outcome: RadarOutcome::Unknown(json!({"weird": true})),
        };

        let Err(AppError::RollcallFailed(a)) = report_outcome(&t, &out_of_range) else {
            panic!("超出范围应当是签到失败");
        };
        let Err(AppError::RollcallFailed(b)) = report_outcome(&t, &unknown) else {
            panic!("未知响应应当是签到失败");
        };
        assert_ne!(a, b);
    }
}
