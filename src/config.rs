// src/config.rs

use crate::{
    db::{PgOrderRepository, SyntheticOrderGenerator},
    services::{session::{DataSource, SalesSession}, DashboardService},
};
use anyhow::{bail, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, str::FromStr, sync::Arc, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Synthetic,
    Postgres,
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "synthetic" => Ok(SourceKind::Synthetic),
            "postgres" => Ok(SourceKind::Postgres),
            other => bail!("DATA_SOURCE desconhecida: '{other}' (use 'synthetic' ou 'postgres')"),
        }
    }
}

// Tudo que vem do ambiente (.env), já com os valores padrão aplicados
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: SourceKind,
    pub database_url: Option<String>,
    pub synthetic_seed: u64,
    pub history_days: u32,
    pub trend_days: u32,
    pub fetch_timeout: Duration,
    pub bind_addr: String,
}

fn parse_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{name} inválida ('{raw}'): {e}")),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let source = parse_or("DATA_SOURCE", SourceKind::Synthetic)?;
        let database_url = env::var("DATABASE_URL").ok();

        if source == SourceKind::Postgres && database_url.is_none() {
            bail!("DATABASE_URL deve ser definida quando DATA_SOURCE=postgres");
        }

        let settings = Self {
            source,
            database_url,
            synthetic_seed: parse_or("SYNTHETIC_SEED", 42)?,
            history_days: parse_or("HISTORY_DAYS", 60)?,
            trend_days: parse_or("TREND_DAYS", 30)?,
            fetch_timeout: Duration::from_millis(parse_or("FETCH_TIMEOUT_MS", 3_000)?),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        };

        if settings.history_days == 0 || settings.trend_days == 0 {
            bail!("HISTORY_DAYS e TREND_DAYS precisam ser maiores que zero");
        }
        Ok(settings)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let settings = Settings::from_env()?;

        let source = match settings.source {
            SourceKind::Synthetic => DataSource::Synthetic(SyntheticOrderGenerator::new(
                settings.synthetic_seed,
                settings.history_days,
            )),
            SourceKind::Postgres => {
                let database_url = settings
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL deve ser definida")?;
                let db_pool = connect(database_url).await?;
                DataSource::Remote(Arc::new(PgOrderRepository::new(db_pool)))
            }
        };

        // --- Monta o gráfico de dependências ---
        let today = chrono::Local::now().date_naive();
        let session = SalesSession::load(
            source,
            settings.history_days,
            settings.fetch_timeout,
            today,
        )
        .await?;
        let dashboard_service = DashboardService::new(
            Arc::new(session),
            settings.trend_days,
            settings.fetch_timeout,
        );

        Ok(Self {
            settings: Arc::new(settings),
            dashboard_service,
        })
    }
}

async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    // Conecta ao banco de dados, usando '?' para propagar erros
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

    sqlx::migrate!()
        .run(&db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    Ok(db_pool)
}
