//! Collects the money movements of one business day.
//!
//! Two sources feed the register: the manual ledger and the settled sales.
//! A failing source is logged and contributes nothing, so a day can always be
//! collected (possibly incomplete).

use std::future::Future;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{EngineError, ResultEngine, Sale, Transaction};

/// `[00:00:00.000, 23:59:59.999]` of a calendar day in the register
/// timezone, both ends inclusive, expressed in UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayWindow {
    date: NaiveDate,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DayWindow {
    pub fn new(date: NaiveDate, timezone: Tz) -> ResultEngine<Self> {
        let invalid = || EngineError::InvalidDate(format!("invalid business day: {date}"));
        let first = date.and_hms_milli_opt(0, 0, 0, 0).ok_or_else(invalid)?;
        let last = date.and_hms_milli_opt(23, 59, 59, 999).ok_or_else(invalid)?;

        let start = resolve_local(timezone, first, true).ok_or_else(invalid)?;
        let end = resolve_local(timezone, last, false).ok_or_else(invalid)?;
        Ok(Self { date, start, end })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// Maps a local wall-clock time to UTC. Ambiguous times pick the outer
/// instant; times skipped by a DST jump move forward one hour.
fn resolve_local(timezone: Tz, local: NaiveDateTime, earliest: bool) -> Option<DateTime<Utc>> {
    let pick = |candidate: NaiveDateTime| {
        let resolved = timezone.from_local_datetime(&candidate);
        if earliest {
            resolved.earliest()
        } else {
            resolved.latest()
        }
    };
    pick(local)
        .or_else(|| pick(local + Duration::hours(1)))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Manually entered ledger rows.
pub trait LedgerSource {
    fn manual_transactions(
        &self,
        window: &DayWindow,
    ) -> impl Future<Output = ResultEngine<Vec<Transaction>>> + Send;
}

/// Orders paid or delivered within a window.
pub trait SaleSource {
    fn settled_sales(
        &self,
        window: &DayWindow,
    ) -> impl Future<Output = ResultEngine<Vec<Sale>>> + Send;
}

/// Collects the day's transactions, newest first.
///
/// Rows a source returns outside the window (or sales that are not settled)
/// are dropped here as well.
pub async fn collect_day<L, S>(ledger: &L, sales: &S, window: &DayWindow) -> Vec<Transaction>
where
    L: LedgerSource + ?Sized,
    S: SaleSource + ?Sized,
{
    let manual = match ledger.manual_transactions(window).await {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(date = %window.date(), "ledger source failed: {err}");
            Vec::new()
        }
    };
    let settled = match sales.settled_sales(window).await {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(date = %window.date(), "sales source failed: {err}");
            Vec::new()
        }
    };

    let mut out: Vec<Transaction> = manual
        .into_iter()
        .filter(|tx| window.contains(tx.time))
        .collect();
    out.extend(
        settled
            .iter()
            .filter(|sale| sale.status.is_settled())
            .filter(|sale| sale.paid_at.is_some_and(|at| window.contains(at)))
            .flat_map(Sale::transactions),
    );

    out.sort_by(|a, b| b.time.cmp(&a.time).then_with(|| b.id.cmp(&a.id)));
    tracing::debug!(date = %window.date(), count = out.len(), "collected day");
    out
}
