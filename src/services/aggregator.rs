// src/services/aggregator.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::{fetch_day_with_timeout, OrderStore},
    models::{
        dashboard::{BestProduct, DailySummary},
        sales::{DailyAggregate, DayRecord},
    },
};

/// Reduz os pedidos de um dia a receita total + quantidade por produto.
/// Dia sem registro vira agregado zerado: isso é um estado normal, não um erro.
pub fn aggregate(date: NaiveDate, record: Option<&DayRecord>) -> DailyAggregate {
    let Some(record) = record else {
        return DailyAggregate::empty(date);
    };

    let mut total_revenue = Decimal::ZERO;
    let mut per_product_quantity: HashMap<String, u64> = HashMap::new();

    for item in &record.items {
        total_revenue += item.line_total();
        *per_product_quantity
            .entry(item.product_name.clone())
            .or_insert(0) += u64::from(item.quantity);
    }

    DailyAggregate {
        date,
        total_revenue,
        per_product_quantity,
    }
}

// Percentual de variação; 0 quando a base é zero (nunca infinito ou NaN)
pub fn percent_change(current: Decimal, base: Decimal) -> Decimal {
    if base > Decimal::ZERO {
        (current - base) / base * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

pub fn growth_percentage(today_total: Decimal, yesterday_total: Decimal) -> Decimal {
    percent_change(today_total, yesterday_total)
}

/// Produto mais vendido do dia. Empate: menor nome em ordem alfabética.
pub fn best_product(aggregate: &DailyAggregate) -> Option<BestProduct> {
    aggregate
        .per_product_quantity
        .iter()
        .max_by(|(name_a, qty_a), (name_b, qty_b)| {
            qty_a.cmp(qty_b).then_with(|| name_b.cmp(name_a))
        })
        .map(|(name, quantity)| BestProduct {
            name: name.clone(),
            quantity: *quantity,
        })
}

pub fn total_items(aggregate: &DailyAggregate) -> u64 {
    aggregate.per_product_quantity.values().sum()
}

// Os quatro cards do topo + o gráfico de barras de um dia
pub async fn summarize_day<S>(
    store: &S,
    date: NaiveDate,
    timeout: std::time::Duration,
) -> Result<DailySummary, AppError>
where
    S: OrderStore + ?Sized,
{
    let yesterday = date
        .checked_sub_signed(Duration::days(1))
        .ok_or(AppError::DateOutOfRange { date })?;

    let today_record = fetch_day_with_timeout(store, date, timeout).await?;
    let yesterday_record = fetch_day_with_timeout(store, yesterday, timeout).await?;

    let today = aggregate(date, today_record.as_ref());
    let previous = aggregate(yesterday, yesterday_record.as_ref());

    Ok(DailySummary {
        date,
        total_revenue: today.total_revenue,
        yesterday_revenue: previous.total_revenue,
        growth_percentage: growth_percentage(today.total_revenue, previous.total_revenue),
        best_product: best_product(&today),
        total_items: total_items(&today),
        product_quantities: today
            .per_product_quantity
            .into_iter()
            .collect::<BTreeMap<_, _>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryOrderStore;
    use crate::models::sales::OrderLineItem;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn latte_and_mocha() -> DayRecord {
        DayRecord::new(
            d(1),
            vec![
                OrderLineItem::new("Latte", 3, dec!(50)),
                OrderLineItem::new("Mocha", 2, dec!(60)),
            ],
        )
    }

    #[test]
    fn aggregates_revenue_and_quantities() {
        let agg = aggregate(d(1), Some(&latte_and_mocha()));

        assert_eq!(agg.total_revenue, dec!(270));
        assert_eq!(agg.per_product_quantity.get("Latte"), Some(&3));
        assert_eq!(agg.per_product_quantity.get("Mocha"), Some(&2));
        assert_eq!(agg.per_product_quantity.len(), 2);
    }

    #[test]
    fn repeated_products_are_summed() {
        let record = DayRecord::new(
            d(1),
            vec![
                OrderLineItem::new("Latte", 3, dec!(50)),
                OrderLineItem::new("Latte", 4, dec!(50)),
                OrderLineItem::new("Espresso", 1, dec!(30.5)),
            ],
        );
        let agg = aggregate(d(1), Some(&record));

        let item_count: u64 = record.items.iter().map(|i| u64::from(i.quantity)).sum();
        assert_eq!(total_items(&agg), item_count);
        assert_eq!(agg.per_product_quantity.get("Latte"), Some(&7));
        assert_eq!(agg.total_revenue, dec!(380.5));
    }

    #[test]
    fn missing_day_is_zero_aggregate() {
        let agg = aggregate(d(5), None);

        assert_eq!(agg.total_revenue, Decimal::ZERO);
        assert!(agg.per_product_quantity.is_empty());
    }

    #[test]
    fn growth_against_zero_yesterday_is_zero() {
        assert_eq!(growth_percentage(dec!(100), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(growth_percentage(dec!(150), dec!(100)), dec!(50));
        assert_eq!(growth_percentage(dec!(50), dec!(100)), dec!(-50));
    }

    #[test]
    fn best_product_ties_pick_alphabetical_first() {
        let record = DayRecord::new(
            d(1),
            vec![
                OrderLineItem::new("Mocha", 5, dec!(60)),
                OrderLineItem::new("Americano", 5, dec!(40)),
                OrderLineItem::new("Latte", 2, dec!(50)),
            ],
        );
        let best = best_product(&aggregate(d(1), Some(&record))).unwrap();

        assert_eq!(best.name, "Americano");
        assert_eq!(best.quantity, 5);
        assert!(best_product(&aggregate(d(1), None)).is_none());
    }

    #[tokio::test]
    async fn summary_compares_against_previous_day() {
        let store = InMemoryOrderStore::from_records(vec![
            DayRecord::new(d(1), vec![OrderLineItem::new("Latte", 2, dec!(50))]),
            DayRecord::new(
                d(2),
                vec![
                    OrderLineItem::new("Latte", 2, dec!(50)),
                    OrderLineItem::new("Mocha", 1, dec!(50)),
                ],
            ),
        ]);

        let summary = summarize_day(&store, d(2), std::time::Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(summary.total_revenue, dec!(150));
        assert_eq!(summary.yesterday_revenue, dec!(100));
        assert_eq!(summary.growth_percentage, dec!(50));
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.best_product.unwrap().name, "Latte");
    }

    #[tokio::test]
    async fn summary_for_first_representable_day_is_rejected() {
        let store = InMemoryOrderStore::new();
        let result =
            summarize_day(&store, NaiveDate::MIN, std::time::Duration::from_secs(1)).await;

        assert!(matches!(
            result,
            Err(AppError::DateOutOfRange { date }) if date == NaiveDate::MIN
        ));
    }

    #[tokio::test]
    async fn summary_for_empty_day_has_no_best_product() {
        let store = InMemoryOrderStore::new();
        let summary = summarize_day(&store, d(2), std::time::Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(summary.total_revenue, Decimal::ZERO);
        assert_eq!(summary.growth_percentage, Decimal::ZERO);
        assert!(summary.best_product.is_none());
        assert!(summary.product_quantities.is_empty());
    }
}
