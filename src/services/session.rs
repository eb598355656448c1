// src/services/session.rs

use std::{sync::Arc, time::Duration as FetchTimeout};

use chrono::{Duration, NaiveDate};
use tokio::sync::RwLock;

use crate::{
    common::error::AppError,
    db::{fetch_range_with_timeout, InMemoryOrderStore, OrderStore, SyntheticOrderGenerator},
    models::dashboard::SessionInfo,
};

// De onde vêm os pedidos
#[derive(Clone)]
pub enum DataSource {
    Synthetic(SyntheticOrderGenerator),
    // Em produção, o PgOrderRepository
    Remote(Arc<dyn OrderStore>),
}

impl DataSource {
    pub fn name(&self) -> &'static str {
        match self {
            DataSource::Synthetic(_) => "synthetic",
            DataSource::Remote(store) => store.source_name(),
        }
    }

    async fn load(
        &self,
        today: NaiveDate,
        days: u32,
        timeout: FetchTimeout,
    ) -> Result<InMemoryOrderStore, AppError> {
        match self {
            DataSource::Synthetic(generator) => generator.generate(today),
            DataSource::Remote(store) => {
                let from = today
                    .checked_sub_signed(Duration::days(i64::from(days.saturating_sub(1))))
                    .ok_or(AppError::DateOutOfRange { date: today })?;
                let records =
                    fetch_range_with_timeout(store.as_ref(), from, today, timeout).await?;
                Ok(InMemoryOrderStore::from_records(records))
            }
        }
    }
}

struct SessionInner {
    source: DataSource,
    snapshot: Arc<InMemoryOrderStore>,
}

/// Histórico de vendas compartilhado entre as requisições.
///
/// Criado uma vez na inicialização, trocado por inteiro no refresh e somente
/// leitura no resto do tempo. Cada requisição trabalha com o `Arc` que pegou.
pub struct SalesSession {
    history_days: u32,
    fetch_timeout: FetchTimeout,
    inner: RwLock<SessionInner>,
}

impl SalesSession {
    pub async fn load(
        source: DataSource,
        history_days: u32,
        fetch_timeout: FetchTimeout,
        today: NaiveDate,
    ) -> Result<Self, AppError> {
        let snapshot = source.load(today, history_days, fetch_timeout).await?;
        tracing::info!(
            "✅ Sessão carregada: {} dias de vendas (origem: {})",
            snapshot.len(),
            source.name()
        );

        Ok(Self {
            history_days,
            fetch_timeout,
            inner: RwLock::new(SessionInner {
                source,
                snapshot: Arc::new(snapshot),
            }),
        })
    }

    pub async fn snapshot(&self) -> Arc<InMemoryOrderStore> {
        self.inner.read().await.snapshot.clone()
    }

    /// Recarrega tudo. `seed` só vale para a origem sintética.
    pub async fn refresh(
        &self,
        today: NaiveDate,
        seed: Option<u64>,
    ) -> Result<SessionInfo, AppError> {
        let source = {
            let inner = self.inner.read().await;
            match (&inner.source, seed) {
                (DataSource::Synthetic(generator), Some(seed)) => DataSource::Synthetic(
                    SyntheticOrderGenerator::new(seed, generator.days()),
                ),
                (DataSource::Remote(_), Some(_)) => {
                    tracing::warn!("Semente ignorada: a origem remota não é sintética");
                    inner.source.clone()
                }
                _ => inner.source.clone(),
            }
        };

        // Carrega fora do lock de escrita; leitores continuam com o snapshot antigo
        let snapshot = source
            .load(today, self.history_days, self.fetch_timeout)
            .await?;
        let snapshot = Arc::new(snapshot);
        let info = describe(&source, &snapshot);

        let mut inner = self.inner.write().await;
        inner.source = source;
        inner.snapshot = snapshot;

        tracing::info!(
            "🔄 Sessão recarregada: {} dias (origem: {})",
            info.days_loaded,
            info.source
        );
        Ok(info)
    }

    pub async fn info(&self) -> SessionInfo {
        let inner = self.inner.read().await;
        describe(&inner.source, &inner.snapshot)
    }
}

fn describe(source: &DataSource, snapshot: &InMemoryOrderStore) -> SessionInfo {
    SessionInfo {
        source: source.name().to_string(),
        seed: match source {
            DataSource::Synthetic(generator) => Some(generator.seed()),
            DataSource::Remote(_) => None,
        },
        days_loaded: snapshot.len(),
        first_date: snapshot.first_date(),
        last_date: snapshot.last_date(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sales::{DayRecord, OrderLineItem};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    async fn synthetic_session(seed: u64) -> SalesSession {
        let source = DataSource::Synthetic(SyntheticOrderGenerator::new(seed, 60));
        SalesSession::load(source, 60, FetchTimeout::from_secs(1), today())
            .await
            .unwrap()
    }

    // Banco remoto que nunca responde
    struct HangingStore;

    #[async_trait]
    impl OrderStore for HangingStore {
        fn source_name(&self) -> &'static str {
            "hanging"
        }

        async fn fetch_day(&self, _date: NaiveDate) -> Result<Option<DayRecord>, AppError> {
            std::future::pending().await
        }

        async fn fetch_range(
            &self,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<DayRecord>, AppError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn loads_trailing_history() {
        let session = synthetic_session(42).await;
        let info = session.info().await;

        assert_eq!(info.source, "synthetic");
        assert_eq!(info.days_loaded, 60);
        assert_eq!(info.last_date, Some(today()));
    }

    #[tokio::test]
    async fn refresh_with_same_seed_is_stable() {
        let session = synthetic_session(42).await;
        let before: Vec<_> = session.snapshot().await.records().cloned().collect();

        session.refresh(today(), None).await.unwrap();
        let after: Vec<_> = session.snapshot().await.records().cloned().collect();

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn refresh_replaces_snapshot_wholesale() {
        let session = synthetic_session(42).await;
        let old = session.snapshot().await;

        let info = session.refresh(today(), Some(7)).await.unwrap();
        let new = session.snapshot().await;

        assert_eq!(info.days_loaded, 60);
        assert_eq!(info.seed, Some(7));
        assert!(!Arc::ptr_eq(&old, &new));
        // Quem segurava o snapshot antigo continua lendo os mesmos dados
        assert_eq!(old.len(), 60);
        let old_days: Vec<_> = old.records().cloned().collect();
        let new_days: Vec<_> = new.records().cloned().collect();
        assert_ne!(old_days, new_days);
    }

    #[tokio::test]
    async fn hanging_remote_load_times_out() {
        let source = DataSource::Remote(Arc::new(HangingStore));
        let result =
            SalesSession::load(source, 60, FetchTimeout::from_millis(20), today()).await;

        let expected_from = today() - Duration::days(59);
        assert!(matches!(result, Err(AppError::StoreTimeout { date }) if date == expected_from));
    }

    #[tokio::test]
    async fn remote_load_keeps_only_the_history_window() {
        let remote = InMemoryOrderStore::from_records(vec![
            DayRecord::new(today() - Duration::days(70), vec![OrderLineItem::new("Latte", 1, dec!(50))]),
            DayRecord::new(today() - Duration::days(3), vec![OrderLineItem::new("Mocha", 2, dec!(60))]),
            DayRecord::new(today(), vec![OrderLineItem::new("Latte", 4, dec!(50))]),
        ]);
        let source = DataSource::Remote(Arc::new(remote));

        let session = SalesSession::load(source, 60, FetchTimeout::from_secs(1), today())
            .await
            .unwrap();
        let info = session.info().await;

        assert_eq!(info.source, "memory");
        assert_eq!(info.seed, None);
        assert_eq!(info.days_loaded, 2);
        assert_eq!(info.first_date, Some(today() - Duration::days(3)));
    }

    #[tokio::test]
    async fn refresh_against_hanging_remote_keeps_old_snapshot() {
        let remote = InMemoryOrderStore::from_records(vec![DayRecord::new(
            today(),
            vec![OrderLineItem::new("Latte", 4, dec!(50))],
        )]);
        let session = SalesSession::load(
            DataSource::Remote(Arc::new(remote)),
            60,
            FetchTimeout::from_millis(20),
            today(),
        )
        .await
        .unwrap();

        // Troca a origem por uma que trava e tenta recarregar
        session.inner.write().await.source = DataSource::Remote(Arc::new(HangingStore));
        let result = session.refresh(today(), None).await;

        assert!(matches!(result, Err(AppError::StoreTimeout { .. })));
        assert_eq!(session.snapshot().await.len(), 1);
    }
}
