use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::query::{Lookup, SearchHit};
use crate::server::error::AppError;
use crate::server::AppState;

/// `GET /naj/{*pattern}`
///
/// A segment that does not decode to UTF-8 is searched as the empty pattern.
pub async fn search(
    State(state): State<Arc<AppState>>,
    pattern: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    let pattern = match pattern {
        Ok(Path(pattern)) => pattern,
        Err(rejection) => {
            tracing::debug!("{}; matching all lemmas", rejection);
            String::new()
        }
    };

    let hits = state
        .with_store(move |store| Lookup::new(store).search(&pattern))
        .await?;
    Ok(Json(hits))
}

/// `GET /naj/`, the empty pattern
pub async fn search_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    let hits = state
        .with_store(|store| Lookup::new(store).search(""))
        .await?;
    Ok(Json(hits))
}

/// `GET /naj-classes`
pub async fn list_classes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, String>>, AppError> {
    let classes = state
        .with_store(|store| Lookup::new(store).word_classes())
        .await?;
    Ok(Json(classes))
}

/// `POST /add/naj-class/{name}`
///
/// Names other than ASCII `\w+` are treated as an unmatched route.
pub async fn add_class(
    State(state): State<Arc<AppState>>,
    name: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let name = match name {
        Ok(Path(name)) if is_word(&name) => name,
        _ => return Ok(StatusCode::NOT_FOUND),
    };

    let class = state
        .with_store(move |store| Lookup::new(store).add_word_class(&name))
        .await?;
    tracing::info!("Added naj class {} ({})", class.id, class.name);
    Ok(StatusCode::OK)
}

/// `GET /stop`
pub async fn stop(State(state): State<Arc<AppState>>) -> StatusCode {
    tracing::warn!("Shutdown requested over HTTP");
    state.control.stop();
    StatusCode::OK
}

fn is_word(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_word() {
        assert!(is_word("Noun"));
        assert!(is_word("proper_noun2"));
        assert!(!is_word(""));
        assert!(!is_word("名詞"));
        assert!(!is_word("²"));
        assert!(!is_word("café"));
        assert!(!is_word("two words"));
        assert!(!is_word("semi-vowel"));
    }
}
