// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_sales_chart,
        handlers::dashboard::get_weekly_performance,
        handlers::dashboard::get_forecast,
        handlers::dashboard::get_product_trends,

        // --- Sessão ---
        handlers::dashboard::get_session,
        handlers::dashboard::refresh,
    ),
    components(
        schemas(
            // --- DASHBOARD ---
            models::dashboard::DailySummary,
            models::dashboard::BestProduct,
            models::dashboard::ExpectedPoint,
            models::dashboard::ActualPoint,
            models::dashboard::WeeklyPerformance,
            models::dashboard::ForecastPoint,
            models::dashboard::ModelParameters,
            models::dashboard::ForecastResult,
            models::dashboard::ChangeKind,
            models::dashboard::ProductChange,
            models::dashboard::ProductTrendReport,
            models::dashboard::SessionInfo,

            // --- Vendas ---
            models::sales::OrderLineItem,
            models::sales::DayRecord,
            models::sales::RevenuePoint,
            models::sales::WeekdayBaseline,

            // --- Payloads ---
            handlers::dashboard::RefreshPayload,
        )
    ),
    tags(
        (name = "Dashboard", description = "Indicadores, Gráficos e Previsão de Vendas da Cafeteria")
    )
)]
pub struct ApiDoc;
