use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use wordboard_core::model::{FirstWordResponse, IsWordResponse, PrefixWordsResponse};
use wordboard_core::trie::PrefixDictionary;

#[derive(Clone)]
pub struct AppState {
    pub dict: Arc<PrefixDictionary>,
}

pub async fn healthcheck() -> StatusCode {
    StatusCode::OK
}

/// Exact-membership query.
pub async fn is_word(State(state): State<AppState>, Path(word): Path<String>) -> Json<IsWordResponse> {
    Json(IsWordResponse {
        result: state.dict.contains(&word),
    })
}

/// All words extending the prefix.
pub async fn words_with_prefix(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Json<PrefixWordsResponse> {
    Json(PrefixWordsResponse {
        result: state.dict.find_all_with_prefix(&prefix),
    })
}

/// Lexicographically first word extending the prefix; `first_word` is null
/// when nothing does.
pub async fn first_word(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Json<FirstWordResponse> {
    Json(FirstWordResponse {
        first_word: state.dict.find_first_with_prefix(&prefix),
    })
}
