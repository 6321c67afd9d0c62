//! 周报调度器
//!
//! 每周在配置的星期/时间（业务时区）触发一次 digest。
//! 由 `ServerState::start_background_tasks()` 注册启动。
//! 失败只记录日志，不重试。

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Weekday};
use chrono_tz::Tz;
use tokio_util::sync::CancellationToken;

use super::service::DigestService;

/// 周报调度器
pub struct DigestScheduler {
    service: DigestService,
    shutdown: CancellationToken,
    weekday: Weekday,
    at: NaiveTime,
    tz: Tz,
}

impl DigestScheduler {
    pub fn new(
        service: DigestService,
        shutdown: CancellationToken,
        weekday: Weekday,
        at: NaiveTime,
        tz: Tz,
    ) -> Self {
        Self {
            service,
            shutdown,
            weekday,
            at,
            tz,
        }
    }

    /// 主循环：等待下一个触发点 → 执行 → 循环
    pub async fn run(self) {
        tracing::info!(weekday = %self.weekday, at = %self.at, tz = %self.tz, "Digest scheduler started");

        loop {
            let now = chrono::Utc::now().with_timezone(&self.tz);
            let next = next_trigger(now, self.weekday, self.at);
            let wait = (next - now)
                .to_std()
                .unwrap_or(std::time::Duration::from_secs(60));
            tracing::info!(next = %next, "Next digest scheduled");

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }

            if let Err(e) = self.service.run_scheduled().await {
                tracing::error!(error = %e, "Scheduled digest failed");
            }
        }

        tracing::info!("Digest scheduler stopped");
    }
}

/// 下一个严格晚于 `now` 的 `weekday at` 时刻
///
/// 结果总在 `(now, now + 7d]` 内。
pub fn next_trigger(now: DateTime<Tz>, weekday: Weekday, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();
    let ahead = (i64::from(weekday.num_days_from_monday())
        - i64::from(today.weekday().num_days_from_monday()))
    .rem_euclid(7);

    for offset in [ahead, ahead + 7] {
        let date = today + Duration::days(offset);
        if let Some(candidate) = resolve_local(tz, date, at) {
            if candidate > now {
                return candidate;
            }
        }
    }

    tracing::error!("Cannot resolve local time for digest scheduler, using fallback");
    now + Duration::days(7)
}

/// 本地时间 → 时区时间
///
/// DST 回拨取较早的一次；DST 跳过的时刻顺延一小时。
fn resolve_local(tz: Tz, date: NaiveDate, at: NaiveTime) -> Option<DateTime<Tz>> {
    let naive = date.and_time(at);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(early, _) => Some(early),
        LocalResult::None => tz.from_local_datetime(&(naive + Duration::hours(1))).earliest(),
    }
}
