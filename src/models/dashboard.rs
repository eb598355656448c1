// src/models/dashboard.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::sales::RevenuePoint;

// 1. Resumo do Dia (Os Cards do Topo)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub date: NaiveDate,
    pub total_revenue: Decimal,     // Receita do dia selecionado
    pub yesterday_revenue: Decimal, // Receita do dia anterior
    pub growth_percentage: Decimal, // 0 quando ontem não vendeu nada
    pub best_product: Option<BestProduct>,
    pub total_items: u64,
    // Distribuição de vendas por produto (gráfico de barras)
    pub product_quantities: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BestProduct {
    #[schema(example = "Latte")]
    pub name: String,
    #[schema(example = 42)]
    pub quantity: u64,
}

// 2. Performance Semanal (Esperado x Realizado)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedPoint {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub expected: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActualPoint {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub actual: Decimal,
    pub expected: Decimal,
    pub deviation_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPerformance {
    #[schema(value_type = String, format = Date)]
    pub week_start: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub today: NaiveDate,
    // Sempre os 7 dias da semana
    pub expected: Vec<ExpectedPoint>,
    // Apenas dias <= hoje que têm dados
    pub actual: Vec<ActualPoint>,
    // Desvio de hoje, se hoje já tem vendas registradas
    pub today_deviation: Option<Decimal>,
}

// 3. Previsão de Receita
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    #[schema(value_type = String, format = Date, example = "2024-01-08")]
    pub date: NaiveDate,
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModelParameters {
    pub ar: f64,
    pub ma: f64,
    pub seasonal_ar: f64,
    pub seasonal_ma: f64,
    pub sigma2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    // Pontos reais usados para alimentar o modelo
    pub history: Vec<RevenuePoint>,
    pub points: Vec<ForecastPoint>,
    pub confidence_level: f64,
    pub parameters: ModelParameters,
}

// 4. Alerta de Produtos (janela de 30 dias)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    Decline,
    Growth,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductChange {
    #[schema(example = "Mocha")]
    pub product_name: String,
    pub percent_change: Decimal,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductTrendReport {
    #[schema(value_type = String, format = Date)]
    pub now: NaiveDate,
    pub changes: BTreeMap<String, Decimal>,
    // None = dados insuficientes
    pub alert: Option<ProductChange>,
}

// 5. Estado da sessão após um refresh
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    #[schema(example = "synthetic")]
    pub source: String,
    // Só existe para a origem sintética
    pub seed: Option<u64>,
    pub days_loaded: usize,
    #[schema(value_type = Option<String>, format = Date)]
    pub first_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub last_date: Option<NaiveDate>,
}
