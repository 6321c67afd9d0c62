use chrono::{NaiveTime, Weekday};
use chrono_tz::Tz;

use crate::digest::DEFAULT_API_URL;
use crate::utils::time::parse_hhmm;

/// 服务器配置 - 订单服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | DATABASE_PATH | {WORK_DIR}/orders.db | SQLite 文件 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | TIMEZONE | America/Sao_Paulo | 业务时区 |
/// | DIGEST_WEEKDAY | sat | 周报星期 |
/// | DIGEST_TIME | 20:00 | 周报时间 (HH:MM) |
/// | DIGEST_ENABLED | true | 是否启用周报调度 |
/// | WHATSAPP_PHONE | - | 接收号码 |
/// | WHATSAPP_API_KEY | - | 网关凭证 |
/// | WHATSAPP_API_URL | CallMeBot | 网关地址 |
/// | DISPATCH_TIMEOUT_MS | 10000 | 网关请求超时(毫秒) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 设置后按天滚动写入文件 |
///
/// 时区、星期、时间无法解析时回退到默认值并记录警告。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/pedidos HTTP_PORT=8080 DIGEST_WEEKDAY=sun cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// SQLite 数据库文件路径
    pub database_path: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 业务时区 (order_date 与周报时间都以此为准)
    pub timezone: Tz,

    // === 周报 ===
    pub digest_weekday: Weekday,
    pub digest_time: NaiveTime,
    pub digest_enabled: bool,

    // === WhatsApp 网关 ===
    pub whatsapp_phone: Option<String>,
    pub whatsapp_api_key: Option<String>,
    pub whatsapp_api_url: String,
    /// 网关请求超时 (毫秒)
    pub dispatch_timeout_ms: u64,
}

/// 日志配置
///
/// 在 [`Config`] 之前读取并初始化日志，配置回退警告才能被记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// LOG_LEVEL (RUST_LOG 优先)
    pub level: String,
    /// LOG_DIR，设置后按天滚动写文件
    pub dir: Option<String>,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            level: get("LOG_LEVEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "info".into()),
            dir: get("LOG_DIR").filter(|v| !v.trim().is_empty()),
        }
    }
}

const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let work_dir = get("WORK_DIR").unwrap_or_else(|| "./data".into());
        let database_path = get("DATABASE_PATH").unwrap_or_else(|| default_database_path(&work_dir));

        let timezone = match get("TIMEZONE") {
            Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
                tracing::warn!(timezone = %name, "Invalid TIMEZONE, using {}", DEFAULT_TIMEZONE);
                DEFAULT_TIMEZONE
            }),
            None => DEFAULT_TIMEZONE,
        };

        let digest_weekday = match get("DIGEST_WEEKDAY") {
            Some(day) => day.trim().parse::<Weekday>().unwrap_or_else(|_| {
                tracing::warn!(weekday = %day, "Invalid DIGEST_WEEKDAY, using sat");
                Weekday::Sat
            }),
            None => Weekday::Sat,
        };

        let default_time = NaiveTime::from_hms_opt(20, 0, 0).unwrap_or_default();
        let digest_time = match get("DIGEST_TIME") {
            Some(value) => parse_hhmm(&value).unwrap_or_else(|| {
                tracing::warn!(time = %value, "Invalid DIGEST_TIME, using 20:00");
                default_time
            }),
            None => default_time,
        };

        Self {
            work_dir,
            database_path,
            http_port: get("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            timezone,
            digest_weekday,
            digest_time,
            digest_enabled: get("DIGEST_ENABLED")
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            whatsapp_phone: get("WHATSAPP_PHONE").filter(|v| !v.trim().is_empty()),
            whatsapp_api_key: get("WHATSAPP_API_KEY").filter(|v| !v.trim().is_empty()),
            whatsapp_api_url: get("WHATSAPP_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
            dispatch_timeout_ms: get("DISPATCH_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
        }
    }

    pub fn dispatch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.dispatch_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn default_database_path(work_dir: &str) -> String {
    std::path::Path::new(work_dir)
        .join("orders.db")
        .to_string_lossy()
        .into_owned()
}
