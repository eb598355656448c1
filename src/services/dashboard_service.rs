// src/services/dashboard_service.rs

use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;

use crate::{
    common::error::AppError,
    models::{
        dashboard::{DailySummary, ForecastResult, ProductTrendReport, SessionInfo, WeeklyPerformance},
        sales::RevenueSeries,
    },
    services::{
        aggregator::summarize_day,
        baseline::{compare_week, estimate_baselines},
        forecast::forecast,
        product_trends::product_trend_report,
        session::SalesSession,
        trend::{build_trend, trailing_dates},
    },
};

// Cada chamada é uma "renderização": tudo é recalculado a partir do snapshot atual.
#[derive(Clone)]
pub struct DashboardService {
    session: Arc<SalesSession>,
    trend_days: u32,
    fetch_timeout: Duration,
}

impl DashboardService {
    pub fn new(session: Arc<SalesSession>, trend_days: u32, fetch_timeout: Duration) -> Self {
        Self {
            session,
            trend_days,
            fetch_timeout,
        }
    }

    pub fn trend_days(&self) -> u32 {
        self.trend_days
    }

    pub async fn get_summary(&self, date: NaiveDate) -> Result<DailySummary, AppError> {
        let store = self.session.snapshot().await;
        summarize_day(store.as_ref(), date, self.fetch_timeout).await
    }

    pub async fn get_sales_chart(
        &self,
        end: NaiveDate,
        days: u32,
    ) -> Result<RevenueSeries, AppError> {
        let store = self.session.snapshot().await;
        build_trend(store.as_ref(), &trailing_dates(end, days)?, self.fetch_timeout).await
    }

    pub async fn get_weekly_performance(
        &self,
        today: NaiveDate,
    ) -> Result<WeeklyPerformance, AppError> {
        let store = self.session.snapshot().await;
        let baseline = estimate_baselines(store.records());
        compare_week(store.as_ref(), &baseline, today, self.fetch_timeout).await
    }

    // Previsão sobre a tendência dos últimos `trend_days` dias terminando em `today`
    pub async fn get_forecast(
        &self,
        today: NaiveDate,
        horizon: usize,
    ) -> Result<ForecastResult, AppError> {
        let series = self.get_sales_chart(today, self.trend_days).await?;
        let result = forecast(&series, horizon)?;

        tracing::info!(
            "🔮 Previsão de {} dias gerada a partir de {}",
            result.points.len(),
            today
        );
        Ok(result)
    }

    pub async fn get_product_trends(&self, now: NaiveDate) -> ProductTrendReport {
        let store = self.session.snapshot().await;
        product_trend_report(store.records(), now)
    }

    pub async fn refresh(
        &self,
        today: NaiveDate,
        seed: Option<u64>,
    ) -> Result<SessionInfo, AppError> {
        self.session.refresh(today, seed).await
    }

    pub async fn session_info(&self) -> SessionInfo {
        self.session.info().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{synthetic::COFFEE_MENU, SyntheticOrderGenerator};
    use crate::models::dashboard::ChangeKind;
    use crate::services::{forecast::ForecastError, session::DataSource};
    use chrono::Duration as Days;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 22).unwrap()
    }

    async fn service() -> DashboardService {
        let source = DataSource::Synthetic(SyntheticOrderGenerator::new(42, 60));
        let session = SalesSession::load(source, 60, Duration::from_secs(1), today())
            .await
            .unwrap();
        DashboardService::new(Arc::new(session), 30, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn sales_chart_covers_requested_window() {
        let chart = service().await.get_sales_chart(today(), 30).await.unwrap();

        assert_eq!(chart.len(), 30);
        assert_eq!(chart.last().unwrap().date, today());
    }

    #[tokio::test]
    async fn weekly_view_never_reports_future_actuals() {
        let week = service().await.get_weekly_performance(today()).await.unwrap();

        assert_eq!(week.expected.len(), 7);
        assert!(week.actual.iter().all(|p| p.date <= today()));
        assert!(week.today_deviation.is_some());
    }

    #[tokio::test]
    async fn forecast_follows_the_trend_window() {
        let svc = service().await;
        let result = svc.get_forecast(today(), 7).await.unwrap();

        assert_eq!(result.history.len(), svc.trend_days() as usize);
        assert_eq!(result.history.last().unwrap().date, today());
        assert_eq!(result.points.len(), 7);
        for (i, point) in result.points.iter().enumerate() {
            assert_eq!(point.date, today() + Days::days(i as i64 + 1));
            assert!(point.lower_bound < point.point_estimate);
            assert!(point.point_estimate < point.upper_bound);
        }
    }

    #[tokio::test]
    async fn forecast_past_the_calendar_end_is_rejected() {
        let err = service()
            .await
            .get_forecast(NaiveDate::MAX, 7)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::ForecastError(ForecastError::DateOutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn product_trends_cover_the_menu() {
        let svc = service().await;
        let report = svc.get_product_trends(today()).await;

        // 60 dias de histórico: todo café vendeu algo nos 30 dias anteriores
        assert_eq!(report.changes.len(), COFFEE_MENU.len());
        assert!(report.changes.keys().all(|name| COFFEE_MENU.contains(&name.as_str())));

        let (name, change) = report
            .changes
            .iter()
            .min_by(|(a_name, a), (b_name, b)| a.cmp(b).then_with(|| a_name.cmp(b_name)))
            .unwrap();
        let alert = report.alert.unwrap();
        assert_eq!(&alert.product_name, name);
        assert_eq!(&alert.percent_change, change);
        let expected_kind = if change.is_sign_negative() && !change.is_zero() {
            ChangeKind::Decline
        } else {
            ChangeKind::Growth
        };
        assert_eq!(alert.kind, expected_kind);

        // Mesma semente, mesmo alerta
        let again = service().await.get_product_trends(today()).await;
        assert_eq!(again.alert, Some(alert));
    }

    #[tokio::test]
    async fn summary_for_first_representable_day_is_rejected() {
        let err = service().await.get_summary(NaiveDate::MIN).await.unwrap_err();
        assert!(matches!(err, AppError::DateOutOfRange { .. }));
    }

    #[tokio::test]
    async fn summary_outside_history_is_zero() {
        let summary = service()
            .await
            .get_summary(today() + Days::days(10))
            .await
            .unwrap();

        assert!(summary.total_revenue.is_zero());
        assert!(summary.best_product.is_none());
    }
}
