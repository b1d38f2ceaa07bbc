use crate::search::criteria::{MediaKind, SearchCriteria};
use crate::search::orchestrator::SearchError;
use crate::server::AppContext;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    title: Option<String>,
    /// Comma-separated actor names.
    actors: Option<String>,
    #[serde(rename = "type")]
    media_type: Option<String>,
    genre: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

impl SearchQuery {
    fn into_criteria(self) -> Result<SearchCriteria, Response> {
        let kind = match self.media_type.as_deref().map(str::trim) {
            None | Some("") | Some("any") => MediaKind::Any,
            Some("movie") => MediaKind::Movie,
            Some("series") => MediaKind::Series,
            Some(other) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        code: "invalid_type",
                        message: format!(
                            "Unknown type '{}'; expected movie, series, or any",
                            other
                        ),
                    }),
                )
                    .into_response());
            }
        };

        let actors = self
            .actors
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(SearchCriteria {
            title: self.title,
            actors,
            kind,
            genre: self.genre,
        })
    }
}

/// GET /movies/search
///
/// All query parameters are optional; an empty query returns the popular
/// listing. A failed Primary fetch maps to 502, matching the upstream nature
/// of the failure.
pub async fn search(
    State(ctx): State<AppContext>,
    Query(params): Query<SearchQuery>,
) -> Response {
    let criteria = match params.into_criteria() {
        Ok(criteria) => criteria,
        Err(response) => return response,
    };

    match ctx.orchestrator.search(&criteria).await {
        Ok(movies) => Json(movies).into_response(),
        Err(e @ SearchError::ProviderUnavailable(_)) => {
            tracing::error!(error = %e, "Search failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    code: "provider_unavailable",
                    message: "Upstream metadata provider is unavailable".to_string(),
                }),
            )
                .into_response()
        }
    }
}
