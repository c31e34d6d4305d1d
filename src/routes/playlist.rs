use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::errors::LoadError;
use crate::models::{ParseRequest, ParseResponse};
use crate::state::AppState;

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn error_response(err: LoadError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &err {
        LoadError::InvalidUrl(_) | LoadError::MissingCredentials(_) => StatusCode::BAD_REQUEST,
        LoadError::UnrecognizedFormat | LoadError::NoPlayableContent => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LoadError::Fetch(_) | LoadError::Http { .. } => StatusCode::BAD_GATEWAY,
        LoadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        LoadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(serde_json::json!({
            "error": err.to_string(),
            "reason": err.reason(),
        })),
    )
}

/// POST /api/playlist/parse - Parse a playlist given by URL or inline content
pub async fn parse_playlist(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ParseRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let url = non_blank(payload.url.as_deref());
    let content = payload
        .content
        .as_deref()
        .filter(|c| !c.trim().is_empty());

    let loaded = match (url, content) {
        (Some(url), None) => state.loader.load_from_url(url, &payload.options).await,
        (None, Some(content)) => state.loader.load_from_text(content, &payload.options),
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "Provide exactly one of url or content" })),
            ));
        }
    }
    .map_err(error_response)?;

    Ok(Json(ParseResponse {
        success: true,
        fingerprint: loaded.fingerprint,
        stats: loaded.stats,
        playlist: loaded.playlist,
        parsed_at: chrono::Utc::now().timestamp_millis(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    use crate::routes::router;
    use crate::state::test_state;

    async fn post_parse(body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/playlist/parse")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_parse_inline_content() {
        let content = "#EXTM3U\n#EXTINF:-1 group-title=\"Filmes\",Matrix\nhttp://cdn/matrix.m3u8\n#EXTINF:-1 group-title=\"Abertos\",Canal 1\nhttp://cdn/canal1.ts\n";
        let (status, json) = post_parse(serde_json::json!({ "content": content })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["stats"]["totalItems"], 2);
        assert_eq!(json["playlist"]["movies"][0]["name"], "Matrix");
        assert_eq!(json["playlist"]["channels"][0]["kind"], "channel");
        assert_eq!(json["fingerprint"].as_str().map(str::len), Some(40));
    }

    #[tokio::test]
    async fn test_parse_with_duplicate_removal() {
        let content = "#EXTINF:-1,A\nhttp://cdn/same.ts\n#EXTINF:-1,B\nhttp://cdn/same.ts\n";
        let (status, json) = post_parse(serde_json::json!({
            "content": content,
            "options": { "removeDuplicates": true }
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["stats"]["totalItems"], 1);
    }

    #[tokio::test]
    async fn test_requires_exactly_one_source() {
        let (status, _) = post_parse(serde_json::json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_parse(serde_json::json!({
            "url": "http://host/list.m3u",
            "content": "#EXTM3U"
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_url_is_bad_request() {
        let (status, json) = post_parse(serde_json::json!({ "url": "ftp://host/list.m3u" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["reason"], "invalid_url");
    }

    #[tokio::test]
    async fn test_unrecognized_and_empty_content() {
        let (status, json) = post_parse(serde_json::json!({ "content": "hello world" })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["reason"], "unrecognized_format");

        let (status, json) = post_parse(serde_json::json!({ "content": "#EXTM3U\n" })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["reason"], "no_playable_content");
    }
}
