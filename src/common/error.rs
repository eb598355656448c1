use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

use crate::services::forecast::ForecastError;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // A consulta de um dia estourou o tempo limite do adaptador
    #[error("Tempo esgotado ao buscar os pedidos de {date}")]
    StoreTimeout { date: NaiveDate },

    // Data pedida pelo cliente sem vizinhos representáveis (ex.: ontem de NaiveDate::MIN)
    #[error("Data fora do intervalo suportado: {date}")]
    DateOutOfRange { date: NaiveDate },

    #[error("Falha na previsão: {0}")]
    ForecastError(#[from] ForecastError),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::StoreTimeout { .. } => {
                tracing::warn!("{}", self);
                (StatusCode::GATEWAY_TIMEOUT, self.to_string())
            }
            AppError::DateOutOfRange { .. }
            | AppError::ForecastError(ForecastError::DateOutOfRange { .. }) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            // O chamador (a UI) decide se mostra ou esconde o gráfico de previsão.
            AppError::ForecastError(ref e) => {
                tracing::warn!("Previsão indisponível: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let response = AppError::StoreTimeout { date }.into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn forecast_failure_is_unprocessable() {
        let err = ForecastError::DegenerateSeries;
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn dates_out_of_range_are_bad_requests() {
        let response = AppError::DateOutOfRange { date: NaiveDate::MIN }.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let err = ForecastError::DateOutOfRange {
            last: NaiveDate::MAX,
            horizon: 7,
        };
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_errors_are_internal() {
        let response = AppError::DatabaseError(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
