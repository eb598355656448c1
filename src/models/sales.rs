// src/models/sales.rs

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- 1. Item de Pedido ---
// O documento remoto usa `name`/`price`; o gerador sintético usa `coffee`/`price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    #[serde(alias = "name", alias = "coffee")]
    #[schema(example = "Latte")]
    pub product_name: String,

    #[schema(example = 3)]
    pub quantity: u32,

    #[serde(alias = "price")]
    #[schema(example = "50")]
    pub unit_price: Decimal,
}

impl OrderLineItem {
    pub fn new(product_name: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

// --- 2. Registro do Dia ---
// Uma data por registro; a unicidade é garantida pelo adaptador.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub date: NaiveDate,
    pub items: Vec<OrderLineItem>,
}

impl DayRecord {
    pub fn new(date: NaiveDate, items: Vec<OrderLineItem>) -> Self {
        Self { date, items }
    }
}

// --- 3. Agregado Diário (derivado, nunca armazenado) ---
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyAggregate {
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub date: NaiveDate,
    #[schema(example = "270")]
    pub total_revenue: Decimal,
    pub per_product_quantity: HashMap<String, u64>,
}

impl DailyAggregate {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_revenue: Decimal::ZERO,
            per_product_quantity: HashMap::new(),
        }
    }
}

// --- 4. Ponto da Série de Receita ---
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePoint {
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub date: NaiveDate,
    #[schema(example = "1530.00")]
    pub total_revenue: Decimal,
}

pub type RevenueSeries = Vec<RevenuePoint>;

// --- 5. Linha de Base por Dia da Semana ---
// Índice 0 = segunda-feira ... 6 = domingo.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayBaseline {
    #[schema(value_type = Vec<String>)]
    pub means: [Decimal; 7],
    // Quantos dias entraram em cada média
    #[schema(value_type = Vec<u32>)]
    pub observations: [usize; 7],
}

impl WeekdayBaseline {
    pub fn expected_for(&self, weekday_index: usize) -> Decimal {
        self.means.get(weekday_index).copied().unwrap_or(Decimal::ZERO)
    }
}
