//! 时间工具函数 - 业务时区转换
//!
//! 订单的 `order_date` 是业务时区下的日历日期，与 `created_at`
//! 时间戳无关。所有 "今天" 的计算统一在这里完成。

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析可选日期，缺省时使用业务时区的今天
pub fn parse_date_or_today(date: Option<&str>, tz: Tz) -> AppResult<NaiveDate> {
    match date {
        Some(d) if !d.trim().is_empty() => parse_date(d),
        _ => Ok(today(tz)),
    }
}

/// 业务时区的今天
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// 解析时分 (HH:MM)
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2026-10-16").unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
        );
        assert!(parse_date("16/10/2026").unwrap_err().is_validation());
    }

    #[test]
    fn test_parse_date_or_today_defaults() {
        let tz = chrono_tz::America::Sao_Paulo;
        assert_eq!(parse_date_or_today(None, tz).unwrap(), today(tz));
        assert_eq!(parse_date_or_today(Some("  "), tz).unwrap(), today(tz));
        assert_eq!(
            parse_date_or_today(Some("2026-01-02"), tz).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 2).unwrap()
        );
    }

    #[test]
    fn test_parse_hhmm() {
        assert_eq!(parse_hhmm("20:00"), NaiveTime::from_hms_opt(20, 0, 0));
        assert_eq!(parse_hhmm("25:00"), None);
    }
}
