// src/services/baseline.rs

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::{fetch_day_with_timeout, OrderStore},
    models::{
        dashboard::{ActualPoint, ExpectedPoint, WeeklyPerformance},
        sales::{DayRecord, WeekdayBaseline},
    },
    services::aggregator::{aggregate, percent_change},
};

/// Média histórica de receita por dia da semana (segunda = 0).
///
/// Dia da semana sem nenhuma observação fica com 0. Não substituímos pela
/// média geral para manter o resultado reproduzível.
pub fn estimate_baselines<'a, I>(records: I) -> WeekdayBaseline
where
    I: IntoIterator<Item = &'a DayRecord>,
{
    let mut sums = [Decimal::ZERO; 7];
    let mut observations = [0usize; 7];

    for record in records {
        let idx = record.date.weekday().num_days_from_monday() as usize;
        sums[idx] += aggregate(record.date, Some(record)).total_revenue;
        observations[idx] += 1;
    }

    let mut means = [Decimal::ZERO; 7];
    for (idx, mean) in means.iter_mut().enumerate() {
        if observations[idx] > 0 {
            *mean = sums[idx] / Decimal::from(observations[idx]);
        }
    }

    WeekdayBaseline {
        means,
        observations,
    }
}

// Segunda a domingo da semana que contém `today`
pub fn week_dates(today: NaiveDate) -> Result<Vec<NaiveDate>, AppError> {
    let offset = i64::from(today.weekday().num_days_from_monday());
    (-offset..7 - offset)
        .map(|delta| {
            today
                .checked_add_signed(Duration::days(delta))
                .ok_or(AppError::DateOutOfRange { date: today })
        })
        .collect()
}

/// Esperado x realizado da semana corrente.
///
/// O "esperado" cobre os 7 dias; o "realizado" só dias <= hoje com registro.
pub async fn compare_week<S>(
    store: &S,
    baseline: &WeekdayBaseline,
    today: NaiveDate,
    timeout: std::time::Duration,
) -> Result<WeeklyPerformance, AppError>
where
    S: OrderStore + ?Sized,
{
    let dates = week_dates(today)?;
    let mut expected = Vec::with_capacity(dates.len());
    let mut actual = Vec::new();
    let mut today_deviation = None;

    for &date in &dates {
        let expected_value =
            baseline.expected_for(date.weekday().num_days_from_monday() as usize);
        expected.push(ExpectedPoint {
            date,
            expected: expected_value,
        });

        if date > today {
            continue;
        }

        let Some(record) = fetch_day_with_timeout(store, date, timeout).await? else {
            continue;
        };

        let realized = aggregate(date, Some(&record)).total_revenue;
        let deviation = percent_change(realized, expected_value);
        if date == today {
            today_deviation = Some(deviation);
        }
        actual.push(ActualPoint {
            date,
            actual: realized,
            expected: expected_value,
            deviation_percentage: deviation,
        });
    }

    Ok(WeeklyPerformance {
        week_start: dates[0],
        today,
        expected,
        actual,
        today_deviation,
    })
}
