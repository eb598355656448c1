// src/db/synthetic.rs

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::memory_store::InMemoryOrderStore,
    models::sales::{DayRecord, OrderLineItem},
};

pub const COFFEE_MENU: [&str; 10] = [
    "Espresso",
    "Americano",
    "Cappuccino",
    "Latte",
    "Mocha",
    "Flat White",
    "Macchiato",
    "Cortado",
    "Turkish Coffee",
    "Irish Coffee",
];

// Desvio padrão da quantidade diária de cada café
const DAILY_STD_DEV: f64 = 5.0;
// Sábado e domingo vendem entre 10% e 30% a mais
const WEEKEND_BOOST_MIN: f64 = 1.1;
const WEEKEND_BOOST_MAX: f64 = 1.3;

// Arredonda para a dezena mais próxima; meio exato vai para a dezena par (105 -> 100, 115 -> 120)
fn round_to_ten_half_even(raw: u32) -> u32 {
    let (tens, units) = (raw / 10, raw % 10);
    let round_up = units > 5 || (units == 5 && tens % 2 == 1);
    (tens + u32::from(round_up)) * 10
}

/// Gerador determinístico de vendas: mesma semente + mesmo "hoje" = mesmos dados.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticOrderGenerator {
    seed: u64,
    days: u32,
}

impl SyntheticOrderGenerator {
    pub fn new(seed: u64, days: u32) -> Self {
        Self { seed, days }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn generate(&self, today: NaiveDate) -> Result<InMemoryOrderStore, AppError> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        // Preço por café: inteiro em [100, 200] arredondado para a dezena
        let prices: Vec<Decimal> = COFFEE_MENU
            .iter()
            .map(|_| {
                let raw: u32 = rng.gen_range(100..=200);
                Decimal::from(round_to_ten_half_even(raw))
            })
            .collect();

        // Média diária por café
        let means: Vec<f64> = COFFEE_MENU
            .iter()
            .map(|_| rng.gen_range(0..=30) as f64)
            .collect();

        let mut distributions = Vec::with_capacity(means.len());
        for mean in &means {
            let normal = Normal::new(*mean, DAILY_STD_DEV)
                .map_err(|e| anyhow::anyhow!("distribuição inválida: {e}"))?;
            distributions.push(normal);
        }

        let first_day = today - Duration::days(i64::from(self.days.saturating_sub(1)));
        let mut store = InMemoryOrderStore::new();

        for date in first_day.iter_days().take(self.days as usize) {
            let is_weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);

            let items = COFFEE_MENU
                .iter()
                .zip(prices.iter())
                .zip(distributions.iter())
                .map(|((coffee, price), normal)| {
                    let mut base_quantity = normal.sample(&mut rng);
                    if is_weekend {
                        base_quantity *= rng.gen_range(WEEKEND_BOOST_MIN..WEEKEND_BOOST_MAX);
                    }
                    // Trunca como `int()` e nunca fica negativo
                    let quantity = base_quantity.trunc().max(0.0) as u32;
                    OrderLineItem::new(*coffee, quantity, *price)
                })
                .collect();

            store.insert(DayRecord::new(date, items));
        }

        tracing::debug!(
            "Dados sintéticos gerados: {} dias (semente {})",
            store.len(),
            self.seed
        );
        Ok(store)
    }
}
