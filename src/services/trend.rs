// src/services/trend.rs

use std::time::Duration as FetchTimeout;

use chrono::{Duration, NaiveDate};

use crate::{
    common::error::AppError,
    db::{fetch_day_with_timeout, OrderStore},
    models::sales::{RevenuePoint, RevenueSeries},
    services::aggregator::aggregate,
};

/// Janela cronológica de `days` dias terminando em `end` (inclusive).
pub fn trailing_dates(end: NaiveDate, days: u32) -> Result<Vec<NaiveDate>, AppError> {
    (0..i64::from(days))
        .rev()
        .map(|back| {
            end.checked_sub_signed(Duration::days(back))
                .ok_or(AppError::DateOutOfRange { date: end })
        })
        .collect()
}

/// Uma entrada por data pedida, mesmo sem dados (receita 0): a série não tem buracos.
/// Uma busca por dia, em sequência.
pub async fn build_trend<S>(
    store: &S,
    dates: &[NaiveDate],
    timeout: FetchTimeout,
) -> Result<RevenueSeries, AppError>
where
    S: OrderStore + ?Sized,
{
    let mut series = Vec::with_capacity(dates.len());

    for &date in dates {
        let record = fetch_day_with_timeout(store, date, timeout).await?;
        let daily = aggregate(date, record.as_ref());
        series.push(RevenuePoint {
            date,
            total_revenue: daily.total_revenue,
        });
    }

    tracing::debug!(
        "Tendência montada com {} pontos (origem: {})",
        series.len(),
        store.source_name()
    );
    Ok(series)
}
