use serde::{Deserialize, Serialize};

use crate::contract::{CoreRequest, CoreResponse};
use crate::core_service::{SearchService, ServiceError};
use crate::source::CatalogSource;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    InvalidRequest,
    Store,
    Config,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: CoreResponse },
    Err { error: ErrorResponse },
}

async fn dispatch<S: CatalogSource>(
    service: &SearchService<S>,
    request: CoreRequest,
) -> Result<CoreResponse, ServiceError> {
    match request {
        CoreRequest::SearchPage(request) => {
            let outcome = service.search_page(&request.q).await?;
            Ok(CoreResponse::SearchPage(outcome.into()))
        }
        CoreRequest::Suggest(request) => {
            let outcome = service.suggest(&request.query).await?;
            Ok(CoreResponse::Suggest(outcome.into()))
        }
    }
}

pub async fn handle_request<S: CatalogSource>(
    service: &SearchService<S>,
    request: CoreRequest,
) -> TransportResponse {
    match dispatch(service, request).await {
        Ok(response) => TransportResponse::Ok { response },
        Err(error) => TransportResponse::Err {
            error: map_service_error(error),
        },
    }
}

pub async fn handle_json<S: CatalogSource>(service: &SearchService<S>, payload: &str) -> String {
    let response = match serde_json::from_str::<CoreRequest>(payload) {
        Ok(request) => handle_request(service, request).await,
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::InvalidJson,
                message: error.to_string(),
            },
        },
    };

    serde_json::to_string(&response).unwrap_or_else(|error| {
        tracing::error!(%error, "failed to encode transport response");
        r#"{"status":"err","error":{"code":"invalid_request","message":"unencodable response"}}"#
            .to_string()
    })
}

fn map_service_error(error: ServiceError) -> ErrorResponse {
    let code = match &error {
        ServiceError::InvalidRequest(_) => ErrorCode::InvalidRequest,
        ServiceError::Store(_) => ErrorCode::Store,
        ServiceError::Config(_) => ErrorCode::Config,
    };
    ErrorResponse {
        code,
        message: error.to_string(),
    }
}
