// src/db/memory_store.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    common::error::AppError,
    db::order_store::OrderStore,
    models::sales::DayRecord,
};

// Histórico completo em memória, indexado pela data (chave natural).
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    days: BTreeMap<NaiveDate, DayRecord>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Registros repetidos para a mesma data têm seus itens concatenados.
    pub fn from_records(records: impl IntoIterator<Item = DayRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    pub fn insert(&mut self, record: DayRecord) {
        match self.days.get_mut(&record.date) {
            Some(existing) => existing.items.extend(record.items),
            None => {
                self.days.insert(record.date, record);
            }
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.days.get(&date)
    }

    /// Registros em ordem cronológica
    pub fn records(&self) -> impl Iterator<Item = &DayRecord> {
        self.days.values()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    fn source_name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_day(&self, date: NaiveDate) -> Result<Option<DayRecord>, AppError> {
        Ok(self.days.get(&date).cloned())
    }
}
