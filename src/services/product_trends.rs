// src/services/product_trends.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{
    dashboard::{ChangeKind, ProductChange, ProductTrendReport},
    sales::DayRecord,
};

const WINDOW_DAYS: i64 = 30;

/// Variação percentual por produto entre `[now-30, now]` e `[now-60, now-30)`.
///
/// Produto sem vendas na janela anterior fica de fora: a variação é indefinida.
pub fn compare_windows<'a, I>(records: I, now: NaiveDate) -> HashMap<String, Decimal>
where
    I: IntoIterator<Item = &'a DayRecord>,
{
    // Perto do início do calendário as janelas simplesmente encolhem
    let recent_start = now
        .checked_sub_signed(Duration::days(WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);
    let previous_start = now
        .checked_sub_signed(Duration::days(2 * WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);

    let mut recent: HashMap<&str, u64> = HashMap::new();
    let mut previous: HashMap<&str, u64> = HashMap::new();

    for record in records {
        let bucket = if recent_start <= record.date && record.date <= now {
            &mut recent
        } else if previous_start <= record.date && record.date < recent_start {
            &mut previous
        } else {
            continue;
        };

        for item in &record.items {
            *bucket.entry(item.product_name.as_str()).or_insert(0) += u64::from(item.quantity);
        }
    }

    previous
        .into_iter()
        .filter(|(_, prev)| *prev > 0)
        .map(|(name, prev)| {
            let recent_qty = recent.get(name).copied().unwrap_or(0);
            let prev = Decimal::from(prev);
            let change = (Decimal::from(recent_qty) - prev) / prev * Decimal::ONE_HUNDRED;
            (name.to_string(), change)
        })
        .collect()
}

/// A maior queda (variação mais negativa). Empate: menor nome em ordem alfabética.
pub fn biggest_decline(changes: &HashMap<String, Decimal>) -> Option<ProductChange> {
    changes
        .iter()
        .min_by(|(name_a, change_a), (name_b, change_b)| {
            change_a.cmp(change_b).then_with(|| name_a.cmp(name_b))
        })
        .map(|(name, change)| ProductChange {
            product_name: name.clone(),
            percent_change: *change,
            kind: if *change < Decimal::ZERO {
                ChangeKind::Decline
            } else {
                ChangeKind::Growth
            },
        })
}

pub fn product_trend_report<'a, I>(records: I, now: NaiveDate) -> ProductTrendReport
where
    I: IntoIterator<Item = &'a DayRecord>,
{
    let changes = compare_windows(records, now);
    let alert = biggest_decline(&changes);

    ProductTrendReport {
        now,
        changes: changes.into_iter().collect::<BTreeMap<_, _>>(),
        alert,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sales::OrderLineItem;
    use rust_decimal_macros::dec;

    fn now() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    fn sale(days_ago: i64, product: &str, quantity: u32) -> DayRecord {
        DayRecord::new(
            now() - Duration::days(days_ago),
            vec![OrderLineItem::new(product, quantity, dec!(50))],
        )
    }

    #[test]
    fn change_between_windows() {
        let records = vec![sale(45, "Latte", 10), sale(5, "Latte", 5)];
        let changes = compare_windows(&records, now());

        assert_eq!(changes.get("Latte"), Some(&dec!(-50)));
    }

    #[test]
    fn products_without_previous_sales_are_excluded() {
        let records = vec![
            sale(45, "Latte", 10),
            sale(5, "Cortado", 40),
            sale(50, "Mocha", 0),
        ];
        let changes = compare_windows(&records, now());

        assert!(!changes.contains_key("Cortado"));
        assert!(!changes.contains_key("Mocha"));
        assert_eq!(changes.get("Latte"), Some(&dec!(-100)));
    }

    #[test]
    fn window_boundaries() {
        // now-30 pertence à janela recente; now-60 à anterior; now-61 a nenhuma
        let records = vec![
            sale(30, "Latte", 3),
            sale(31, "Latte", 2),
            sale(60, "Latte", 2),
            sale(61, "Latte", 100),
        ];
        let changes = compare_windows(&records, now());

        // recente = 3, anterior = 4
        assert_eq!(changes.get("Latte"), Some(&dec!(-25)));
    }

    #[test]
    fn decline_ties_break_alphabetically() {
        let mut changes = HashMap::new();
        changes.insert("Mocha".to_string(), dec!(-20));
        changes.insert("Americano".to_string(), dec!(-20));
        changes.insert("Latte".to_string(), dec!(15));

        let alert = biggest_decline(&changes).unwrap();
        assert_eq!(alert.product_name, "Americano");
        assert_eq!(alert.kind, ChangeKind::Decline);
    }

    #[test]
    fn smallest_change_can_still_be_growth() {
        let mut changes = HashMap::new();
        changes.insert("Latte".to_string(), dec!(15));
        changes.insert("Mocha".to_string(), Decimal::ZERO);

        let alert = biggest_decline(&changes).unwrap();
        assert_eq!(alert.product_name, "Mocha");
        assert_eq!(alert.kind, ChangeKind::Growth);
    }

    #[test]
    fn windows_at_the_calendar_start_do_not_panic() {
        let records = vec![DayRecord::new(
            NaiveDate::MIN,
            vec![OrderLineItem::new("Latte", 1, dec!(50))],
        )];
        let report = product_trend_report(&records, NaiveDate::MIN);

        assert!(report.changes.is_empty());
        assert!(report.alert.is_none());
    }

    #[test]
    fn report_without_history_has_no_alert() {
        let report = product_trend_report(&Vec::<DayRecord>::new(), now());

        assert!(report.changes.is_empty());
        assert!(report.alert.is_none());
    }
}
