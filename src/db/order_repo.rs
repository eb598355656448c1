// src/db/order_repo.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::order_store::OrderStore,
    models::sales::{DayRecord, OrderLineItem},
};

// Cada linha da tabela 'orders' é um documento com a lista de itens em JSONB.
#[derive(Debug, FromRow)]
struct OrderDocumentRow {
    id: Uuid,
    order_date: NaiveDate,
    // Decodificado item a item: um item ruim não derruba o dia inteiro
    items: Json<Value>,
}

// O repositório de pedidos remoto, responsável pelas consultas na tabela 'orders'
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Itens válidos de um documento. Itens malformados ou com preço negativo
// são ignorados com um aviso.
fn parse_items(order_id: Uuid, document: Value) -> Vec<OrderLineItem> {
    let Value::Array(raw_items) = document else {
        tracing::warn!("Pedido {} ignorado: 'items' não é uma lista", order_id);
        return Vec::new();
    };

    raw_items
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<OrderLineItem>(raw) {
            Ok(item) if item.unit_price.is_sign_negative() => {
                tracing::warn!(
                    "Pedido {} com preço negativo para '{}' ignorado",
                    order_id,
                    item.product_name
                );
                None
            }
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Pedido {} com item inválido ignorado: {}", order_id, e);
                None
            }
        })
        .collect()
}

// Junta os documentos de um mesmo dia num único registro.
// As linhas precisam vir ordenadas por data.
fn group_by_date(rows: Vec<OrderDocumentRow>) -> Vec<DayRecord> {
    let mut records: Vec<DayRecord> = Vec::new();

    for row in rows {
        let items = parse_items(row.id, row.items.0);

        match records.last_mut() {
            Some(last) if last.date == row.order_date => last.items.extend(items),
            _ => records.push(DayRecord::new(row.order_date, items)),
        }
    }

    records
}

#[async_trait]
impl OrderStore for PgOrderRepository {
    fn source_name(&self) -> &'static str {
        "postgres"
    }

    // Busca todos os pedidos de uma data
    async fn fetch_day(&self, date: NaiveDate) -> Result<Option<DayRecord>, AppError> {
        let rows = sqlx::query_as::<_, OrderDocumentRow>(
            r#"
            SELECT id, order_date, items
            FROM orders
            WHERE order_date = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(group_by_date(rows).into_iter().next())
    }

    // Uma única consulta para a janela inteira, em vez de uma por dia
    async fn fetch_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DayRecord>, AppError> {
        let rows = sqlx::query_as::<_, OrderDocumentRow>(
            r#"
            SELECT id, order_date, items
            FROM orders
            WHERE order_date BETWEEN $1 AND $2
            ORDER BY order_date ASC, created_at ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(group_by_date(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn document(day: u32, items: Value) -> OrderDocumentRow {
        OrderDocumentRow {
            id: Uuid::new_v4(),
            order_date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            items: Json(items),
        }
    }

    fn row(day: u32, items: Vec<OrderLineItem>) -> OrderDocumentRow {
        document(day, serde_json::to_value(items).unwrap())
    }

    #[test]
    fn documents_of_the_same_day_become_one_record() {
        let records = group_by_date(vec![
            row(1, vec![OrderLineItem::new("Latte", 2, dec!(50))]),
            row(1, vec![OrderLineItem::new("Latte", 1, dec!(50))]),
            row(2, vec![OrderLineItem::new("Mocha", 4, dec!(60))]),
        ]);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].items.len(), 2);
        assert_eq!(records[1].items[0].product_name, "Mocha");
    }

    #[test]
    fn negative_prices_are_dropped() {
        let records = group_by_date(vec![row(
            1,
            vec![
                OrderLineItem::new("Latte", 2, dec!(-50)),
                OrderLineItem::new("Mocha", 1, dec!(60)),
            ],
        )]);

        assert_eq!(records[0].items, vec![OrderLineItem::new("Mocha", 1, dec!(60))]);
    }

    #[test]
    fn malformed_items_are_skipped_not_fatal() {
        let records = group_by_date(vec![
            document(
                1,
                json!([
                    {"name": "Latte", "quantity": -2, "price": 50},
                    {"name": "Mocha", "quantity": 1.5, "price": 60},
                    {"name": "Cortado", "price": 45},
                    {"name": "Espresso", "quantity": 2, "price": 30},
                ]),
            ),
            document(2, json!({"name": "Latte"})),
        ]);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].items, vec![OrderLineItem::new("Espresso", 2, dec!(30))]);
        assert!(records[1].items.is_empty());
    }

    #[test]
    fn document_items_use_name_and_price_keys() {
        let items: Vec<OrderLineItem> = serde_json::from_str(
            r#"[{"name": "Cortado", "quantity": 3, "price": 45.5}]"#,
        )
        .unwrap();

        assert_eq!(items[0], OrderLineItem::new("Cortado", 3, dec!(45.5)));
    }
}
