//! Read → format → send pipeline shared by the manual and scheduled paths

use chrono::NaiveDate;
use chrono_tz::Tz;
use shared::models::DigestOutcome;
use sqlx::SqlitePool;

use super::builder::{self, Digest};
use super::dispatcher::DigestDispatcher;
use crate::stats;
use crate::utils::{AppResult, time};

#[derive(Clone, Debug)]
pub struct DigestService {
    pool: SqlitePool,
    dispatcher: DigestDispatcher,
    tz: Tz,
}

impl DigestService {
    pub fn new(pool: SqlitePool, dispatcher: DigestDispatcher, tz: Tz) -> Self {
        Self {
            pool,
            dispatcher,
            tz,
        }
    }

    pub fn is_dispatch_configured(&self) -> bool {
        self.dispatcher.is_configured()
    }

    /// Today in the business timezone
    pub fn today(&self) -> NaiveDate {
        time::today(self.tz)
    }

    /// Build the digest for `date` without sending it
    pub async fn preview(&self, date: NaiveDate) -> AppResult<Digest> {
        let snapshot = stats::daily_snapshot(&self.pool, date).await?;
        Ok(builder::build(date, snapshot.as_ref()))
    }

    /// Build and try to deliver the digest for `date`
    ///
    /// An empty day is never sent: `delivered` is false and the preview
    /// carries the "no orders" notice.
    pub async fn send(&self, date: NaiveDate) -> AppResult<DigestOutcome> {
        let digest = self.preview(date).await?;
        let preview = digest.text();
        let delivered = match &digest {
            Digest::Report(text) => self.dispatcher.send(text).await,
            Digest::NoOrders { .. } => {
                tracing::info!(%date, "No orders for date, digest not sent");
                false
            }
        };
        Ok(DigestOutcome { delivered, preview })
    }

    /// Scheduled run for today; silent when there is nothing to report
    ///
    /// Returns whether a digest was delivered.
    pub async fn run_scheduled(&self) -> AppResult<bool> {
        let date = self.today();
        match self.preview(date).await? {
            Digest::Report(text) => {
                let delivered = self.dispatcher.send(&text).await;
                tracing::info!(%date, delivered, "Scheduled digest finished");
                Ok(delivered)
            }
            Digest::NoOrders { .. } => {
                tracing::debug!(%date, "Scheduled digest skipped: no orders");
                Ok(false)
            }
        }
    }
}
