// src/services/forecast.rs

pub mod optimizer;
pub mod sarima;

use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

use crate::models::{
    dashboard::{ForecastPoint, ForecastResult, ModelParameters},
    sales::RevenuePoint,
};
use sarima::{FittedSarima, SarimaOrder};

pub const DEFAULT_HORIZON: usize = 7;
// Quantil da normal para o intervalo de 95%
const Z_95: f64 = 1.959_963_984_540_054;

// Falhas do ajuste sobem para o chamador; não há previsão "ingênua" de reserva.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Dados insuficientes: são necessários {required} dias, há {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Datas fora de ordem na série: {next} depois de {previous}")]
    UnorderedDates { previous: NaiveDate, next: NaiveDate },

    #[error("Não há {horizon} dias representáveis depois de {last}")]
    DateOutOfRange { last: NaiveDate, horizon: usize },

    #[error("Série degenerada (constante ou zerada)")]
    DegenerateSeries,

    #[error("O ajuste não convergiu após {iterations} iterações")]
    NotConverged { iterations: usize },

    #[error("Erro numérico: {0}")]
    NumericalError(String),
}

/// Ajusta SARIMA(1,1,1)(1,1,1,7) à série e projeta `horizon` dias.
///
/// As datas previstas são `última data + i`, então a série não pode ter buraco no fim.
pub fn forecast(series: &[RevenuePoint], horizon: usize) -> Result<ForecastResult, ForecastError> {
    forecast_with_order(series, horizon, SarimaOrder::WEEKLY)
}

fn forecast_with_order(
    series: &[RevenuePoint],
    horizon: usize,
    order: SarimaOrder,
) -> Result<ForecastResult, ForecastError> {
    for pair in series.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(ForecastError::UnorderedDates {
                previous: pair[0].date,
                next: pair[1].date,
            });
        }
    }

    // As datas previstas precisam existir antes de gastar tempo no ajuste
    let forecast_dates = match series.last() {
        Some(last) => (1..=horizon)
            .map(|i| {
                i64::try_from(i)
                    .ok()
                    .and_then(Duration::try_days)
                    .and_then(|offset| last.date.checked_add_signed(offset))
                    .ok_or(ForecastError::DateOutOfRange {
                        last: last.date,
                        horizon,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    let values = series
        .iter()
        .map(|p| {
            p.total_revenue.to_f64().ok_or_else(|| {
                ForecastError::NumericalError(format!("receita inválida em {}", p.date))
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let model = FittedSarima::fit(order, &values)?;

    let points = model
        .forecast(horizon)
        .into_iter()
        .zip(forecast_dates)
        .map(|((mean, std_err), date)| {
            if !mean.is_finite() || !std_err.is_finite() {
                return Err(ForecastError::NumericalError(
                    "previsão não finita".to_string(),
                ));
            }
            Ok(ForecastPoint {
                date,
                point_estimate: mean,
                lower_bound: mean - Z_95 * std_err,
                upper_bound: mean + Z_95 * std_err,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        "SARIMA ajustado em {} iterações (σ² = {:.2}, logL = {:.2})",
        model.iterations,
        model.sigma2,
        model.log_likelihood
    );

    Ok(ForecastResult {
        history: series.to_vec(),
        points,
        confidence_level: 0.95,
        parameters: ModelParameters {
            ar: model.ar.first().copied().unwrap_or(0.0),
            ma: model.ma.first().copied().unwrap_or(0.0),
            seasonal_ar: model.seasonal_ar.first().copied().unwrap_or(0.0),
            seasonal_ma: model.seasonal_ma.first().copied().unwrap_or(0.0),
            sigma2: model.sigma2,
        },
    })
}
