// src/constants.rs

pub const UI_WIDTH: usize = 88;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const ROLLCALL_FILE_NAME: &str = "rollcall.json";
pub const LOG_FILE_NAME: &str = concat!(clap::crate_name!(), ".log");
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const SESSION_ENV_VAR: &str = "ZJU_SESSION";
pub const SESSION_COOKIE_NAME: &str = "session";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub const DEFAULT_BASE_URL: &str = "https://courses.zju.edu.cn";

pub mod network {
    pub const CONNECT_TIMEOUT_SECS: u64 = 5;
    pub const TIMEOUT_SECS: u64 = 10;
    pub const MAX_RETRIES: u32 = 3;
}

pub mod bruteforce {
    /// 同时在途的答题请求上限
    pub const DEFAULT_CONCURRENCY: usize = 100;
    /// 整轮爆破的总时限
    pub const DEFAULT_DEADLINE_SECS: u64 = 300;
    pub const CODE_SPACE: u16 = 10_000;
}

pub mod api {
    pub mod templates {
        pub const ROLLCALL_LIST: &str = "ROLLCALL_LIST";
        pub const ANSWER_NUMBER: &str = "ANSWER_NUMBER";
        pub const ANSWER_RADAR: &str = "ANSWER_RADAR";
    }
    pub mod radar {
        pub const ACCURACY: u32 = 64;
        pub const STATUS_ON_CALL_FINE: &str = "on_call_fine";
        pub const ERROR_OUT_OF_SCOPE: &str = "radar_out_of_rollcall_scope";
    }
}

pub const HELP_SESSION_GUIDE: &str = r#"
1. 使用浏览器登录学在浙大: https://courses.zju.edu.cn
2. 打开开发者工具 (F12 / Cmd+Opt+I)，切换到 “应用” (Application) 标签页。
3. 在 Cookies -> https://courses.zju.edu.cn 中找到名为 "session" 的条目。
4. 复制它的值，通过以下任一方式提供给本程序:
   - 命令行参数: --session <值>
   - 环境变量:   ZJU_SESSION=<值>
   - 配置文件:   ~/.lazy-rollcall/config.json 中的 "session" 字段"#;
