use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use tracing::instrument;
use uuid::Uuid;

use super::{db_err, Service};
use crate::contract::model::{
    CleanerReport, DashboardSummary, DateRange, FlagCounts, RecordFilter, Totals,
};
use crate::domain::error::DomainError;
use crate::domain::repo::RecordFlag;

fn midnight(d: NaiveDate) -> DateTime<Utc> {
    d.and_time(NaiveTime::MIN).and_utc()
}

/// 00:00 UTC of the current day.
pub fn today_start(now: DateTime<Utc>) -> DateTime<Utc> {
    midnight(now.date_naive())
}

/// Monday 00:00 UTC of the current week.
pub fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let d = now.date_naive();
    let back = u64::from(d.weekday().num_days_from_monday());
    midnight(d.checked_sub_days(Days::new(back)).unwrap_or(d))
}

/// The 1st of the current month, 00:00 UTC.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let d = now.date_naive();
    midnight(NaiveDate::from_ymd_opt(d.year(), d.month(), 1).unwrap_or(d))
}

impl Service {
    #[instrument(name = "cleaning_ops.service.dashboard_summary", skip(self))]
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, DomainError> {
        self.dashboard_summary_at(Utc::now()).await
    }

    /// Summary with the windows anchored at `now`.
    pub async fn dashboard_summary_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<DashboardSummary, DomainError> {
        let repo = &self.repo;
        let (today, week, month, top_cleaners, by_terminal) = tokio::try_join!(
            repo.count_records_since(today_start(now)),
            repo.count_records_since(week_start(now)),
            repo.count_records_since(month_start(now)),
            repo.top_cleaners(self.config.top_cleaners_limit),
            repo.count_by_terminal(),
        )
        .map_err(db_err)?;
        let by_type = repo
            .count_by_type(&RecordFilter::default())
            .await
            .map_err(db_err)?;

        Ok(DashboardSummary {
            totals: Totals { today, week, month },
            top_cleaners,
            by_terminal,
            by_type,
        })
    }

    #[instrument(name = "cleaning_ops.service.cleaner_report", skip(self, range), fields(user_id = %user_id))]
    pub async fn cleaner_report(
        &self,
        user_id: Uuid,
        range: DateRange,
    ) -> Result<CleanerReport, DomainError> {
        let filter = RecordFilter {
            user_id: Some(user_id),
            range,
            ..RecordFilter::default()
        };
        let repo = &self.repo;
        let (total, by_type, stickers_yes, stickers_no, graffiti_yes, graffiti_no) = tokio::try_join!(
            repo.count_records(&filter),
            repo.count_by_type(&filter),
            repo.count_flag(&filter, RecordFlag::StickersRemoved, true),
            repo.count_flag(&filter, RecordFlag::StickersRemoved, false),
            repo.count_flag(&filter, RecordFlag::GraffitiRemoved, true),
            repo.count_flag(&filter, RecordFlag::GraffitiRemoved, false),
        )
        .map_err(db_err)?;

        Ok(CleanerReport {
            total,
            by_type,
            stickers: FlagCounts {
                yes: stickers_yes,
                no: stickers_no,
            },
            graffiti: FlagCounts {
                yes: graffiti_yes,
                no: graffiti_no,
            },
        })
    }
}
