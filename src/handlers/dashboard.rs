// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    // Importamos os models para referenciar no Swagger
    models::{
        dashboard::{DailySummary, ForecastResult, ProductTrendReport, SessionInfo, WeeklyPerformance},
        sales::RevenuePoint,
    },
    services::forecast::DEFAULT_HORIZON,
};

// "Hoje" do servidor quando o cliente não informa a data
fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ---
// Parâmetros de consulta
// ---
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct DateQuery {
    /// Data de referência (padrão: hoje)
    #[param(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct SalesChartQuery {
    /// Último dia do gráfico (padrão: hoje)
    #[param(value_type = Option<String>, format = Date)]
    pub end: Option<NaiveDate>,

    /// Tamanho da janela em dias (padrão: TREND_DAYS)
    #[validate(range(min = 1, max = 365, message = "A janela deve ter entre 1 e 365 dias."))]
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ForecastQuery {
    #[param(value_type = Option<String>, format = Date)]
    pub today: Option<NaiveDate>,

    #[validate(range(min = 1, max = 60, message = "O horizonte deve ter entre 1 e 60 dias."))]
    pub horizon: Option<usize>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshPayload {
    /// Nova semente para os dados sintéticos
    #[schema(example = 42)]
    pub seed: Option<u64>,
}

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    params(DateQuery),
    responses(
        (status = 200, description = "Cards do dia: receita, variação, mais vendido e total de itens", body = DailySummary),
        (status = 400, description = "Data fora do intervalo suportado"),
        (status = 504, description = "Tempo esgotado ao consultar os pedidos")
    )
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state
        .dashboard_service
        .get_summary(query.date.unwrap_or_else(today))
        .await?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/dashboard/sales-chart
#[utoipa::path(
    get,
    path = "/api/dashboard/sales-chart",
    tag = "Dashboard",
    params(SalesChartQuery),
    responses(
        (status = 200, description = "Receita diária da janela, sem buracos", body = Vec<RevenuePoint>),
        (status = 400, description = "Parâmetros inválidos")
    )
)]
pub async fn get_sales_chart(
    State(app_state): State<AppState>,
    Query(query): Query<SalesChartQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;

    let service = &app_state.dashboard_service;
    let chart = service
        .get_sales_chart(
            query.end.unwrap_or_else(today),
            query.days.unwrap_or(service.trend_days()),
        )
        .await?;

    Ok((StatusCode::OK, Json(chart)))
}

// GET /api/dashboard/weekly
#[utoipa::path(
    get,
    path = "/api/dashboard/weekly",
    tag = "Dashboard",
    params(DateQuery),
    responses(
        (status = 200, description = "Esperado (média por dia da semana) x realizado", body = WeeklyPerformance),
        (status = 400, description = "Data fora do intervalo suportado")
    )
)]
pub async fn get_weekly_performance(
    State(app_state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<impl IntoResponse, AppError> {
    let week = app_state
        .dashboard_service
        .get_weekly_performance(query.date.unwrap_or_else(today))
        .await?;

    Ok((StatusCode::OK, Json(week)))
}

// GET /api/dashboard/forecast
#[utoipa::path(
    get,
    path = "/api/dashboard/forecast",
    tag = "Dashboard",
    params(ForecastQuery),
    responses(
        (status = 200, description = "Previsão SARIMA com intervalo de 95%", body = ForecastResult),
        (status = 400, description = "Parâmetros inválidos ou datas previstas fora do calendário"),
        (status = 422, description = "Série curta ou degenerada demais para ajustar o modelo")
    )
)]
pub async fn get_forecast(
    State(app_state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;

    let result = app_state
        .dashboard_service
        .get_forecast(
            query.today.unwrap_or_else(today),
            query.horizon.unwrap_or(DEFAULT_HORIZON),
        )
        .await?;

    Ok((StatusCode::OK, Json(result)))
}

// GET /api/dashboard/product-trends
#[utoipa::path(
    get,
    path = "/api/dashboard/product-trends",
    tag = "Dashboard",
    params(DateQuery),
    responses(
        (status = 200, description = "Variação de vendas por produto (últimos 30 dias x 30 anteriores)", body = ProductTrendReport)
    )
)]
pub async fn get_product_trends(
    State(app_state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .dashboard_service
        .get_product_trends(query.date.unwrap_or_else(today))
        .await;

    Ok((StatusCode::OK, Json(report)))
}

// GET /api/dashboard/session
#[utoipa::path(
    get,
    path = "/api/dashboard/session",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Origem e período do histórico carregado", body = SessionInfo)
    )
)]
pub async fn get_session(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.dashboard_service.session_info().await)
}

// POST /api/dashboard/refresh
#[utoipa::path(
    post,
    path = "/api/dashboard/refresh",
    tag = "Dashboard",
    request_body = RefreshPayload,
    responses(
        (status = 200, description = "Histórico recarregado", body = SessionInfo)
    )
)]
pub async fn refresh(
    State(app_state): State<AppState>,
    payload: Option<Json<RefreshPayload>>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.unwrap_or_default();

    let info = app_state
        .dashboard_service
        .refresh(today(), payload.seed)
        .await?;

    Ok((StatusCode::OK, Json(info)))
}
