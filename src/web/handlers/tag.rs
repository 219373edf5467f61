//! Tag handlers.

use axum::{extract::Query, Json};

use crate::tree::{suggest_tags, TAG_COLORS};
use crate::web::dto::{ApiResponse, TagSuggestionQuery, TagSuggestionsResponse};

/// GET /api/tags/suggestions?prefix= - Tag autocomplete.
pub async fn tag_suggestions(
    Query(query): Query<TagSuggestionQuery>,
) -> Json<ApiResponse<TagSuggestionsResponse>> {
    Json(ApiResponse::new(TagSuggestionsResponse {
        suggestions: suggest_tags(&query.prefix),
        colors: TAG_COLORS,
    }))
}
