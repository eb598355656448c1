// src/db/order_store.rs

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{common::error::AppError, models::sales::DayRecord};

/// Adaptador de pedidos: a única coisa que o núcleo precisa saber sobre o armazenamento.
///
/// "Sem dados para a data" é `Ok(None)`, nunca um erro.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Nome curto da origem (aparece nos logs e na resposta do refresh)
    fn source_name(&self) -> &'static str;

    async fn fetch_day(&self, date: NaiveDate) -> Result<Option<DayRecord>, AppError>;

    /// Todos os registros em `[from, to]`, em ordem cronológica.
    /// A implementação padrão faz uma consulta por dia.
    async fn fetch_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DayRecord>, AppError> {
        let mut records = Vec::new();
        for date in from.iter_days().take_while(|d| *d <= to) {
            if let Some(record) = self.fetch_day(date).await? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

// Toda busca passa por um tempo limite; o armazenamento remoto pode travar.
pub async fn fetch_day_with_timeout<S>(
    store: &S,
    date: NaiveDate,
    timeout: Duration,
) -> Result<Option<DayRecord>, AppError>
where
    S: OrderStore + ?Sized,
{
    match tokio::time::timeout(timeout, store.fetch_day(date)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::StoreTimeout { date }),
    }
}

// Carga de uma janela inteira (início da sessão e refresh) sob o mesmo limite.
pub async fn fetch_range_with_timeout<S>(
    store: &S,
    from: NaiveDate,
    to: NaiveDate,
    timeout: Duration,
) -> Result<Vec<DayRecord>, AppError>
where
    S: OrderStore + ?Sized,
{
    match tokio::time::timeout(timeout, store.fetch_range(from, to)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::StoreTimeout { date: from }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryOrderStore;
    use crate::models::sales::OrderLineItem;
    use rust_decimal_macros::dec;

    struct SlowStore;

    #[async_trait]
    impl OrderStore for SlowStore {
        fn source_name(&self) -> &'static str {
            "slow"
        }

        async fn fetch_day(&self, _date: NaiveDate) -> Result<Option<DayRecord>, AppError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[tokio::test]
    async fn slow_fetch_becomes_timeout_error() {
        let result = fetch_day_with_timeout(&SlowStore, d(1), Duration::from_millis(10)).await;
        assert!(matches!(result, Err(AppError::StoreTimeout { date }) if date == d(1)));
    }

    #[tokio::test]
    async fn slow_range_becomes_timeout_error() {
        let result =
            fetch_range_with_timeout(&SlowStore, d(1), d(7), Duration::from_millis(10)).await;
        assert!(matches!(result, Err(AppError::StoreTimeout { date }) if date == d(1)));
    }

    #[tokio::test]
    async fn default_range_skips_missing_days() {
        let store = InMemoryOrderStore::from_records(vec![
            DayRecord::new(d(2), vec![OrderLineItem::new("Latte", 1, dec!(50))]),
            DayRecord::new(d(4), vec![OrderLineItem::new("Mocha", 1, dec!(60))]),
        ]);

        let records = store.fetch_range(d(1), d(5)).await.unwrap();
        let dates: Vec<_> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2), d(4)]);
    }
}
