use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::sync::Arc;

use crate::api::base_uri::RequestBaseUri;
use crate::logic::{BaseUriLinks, EventPublisher, LinkUpdate, ReferenceError, ReferenceService};
use crate::model::{media_type, EntityResource, IncomingLinks, Schema};
use crate::store::traits::Store;

/// Shared state of the property reference server
pub struct AppContext<S: Store> {
    pub references: ReferenceService<S>,
    /// Public base URI; when unset, links follow the request's host
    pub base_uri: Option<String>,
}

impl<S: Store> AppContext<S> {
    pub fn new(store: S, schema: Schema, events: EventPublisher) -> Self {
        Self {
            references: ReferenceService::new(store, schema, events),
            base_uri: None,
        }
    }

    pub fn with_base_uri(mut self, base_uri: Option<String>) -> Self {
        self.base_uri = base_uri;
        self
    }

    fn links(&self, request: &RequestBaseUri) -> BaseUriLinks {
        BaseUriLinks::new(self.base_uri.as_deref().unwrap_or(&request.0))
    }
}

pub type AppState<S> = Arc<AppContext<S>>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// How a property reference read is rendered, chosen from `Accept`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Embedded,
    CompactJson,
    UriList,
}

impl Representation {
    /// Pick the first media type in `Accept` that we can produce. Ranges with
    /// `q=0` are refused; anything unrecognised falls back to embedded JSON.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) else {
            return Representation::Embedded;
        };

        for range in accept.split(',') {
            let mut params = range.split(';');
            let media = params.next().unwrap_or_default().trim().to_ascii_lowercase();
            if params.any(is_zero_quality) {
                continue;
            }
            match media.as_str() {
                media_type::COMPACT_JSON => return Representation::CompactJson,
                media_type::URI_LIST => return Representation::UriList,
                media_type::JSON | media_type::VERBOSE_JSON | "*/*" => {
                    return Representation::Embedded;
                }
                _ => continue,
            }
        }
        Representation::Embedded
    }
}

fn is_zero_quality(param: &str) -> bool {
    let Some((name, value)) = param.split_once('=') else {
        return false;
    };
    name.trim().eq_ignore_ascii_case("q") && value.trim().parse::<f32>().map_or(false, |q| q == 0.0)
}

fn with_content_location(response: impl IntoResponse, location: Option<String>) -> Response {
    let mut response = response.into_response();
    if let Some(location) = location {
        match HeaderValue::from_str(&location) {
            Ok(value) => {
                response.headers_mut().insert(header::CONTENT_LOCATION, value);
            }
            Err(e) => log::warn!("Cannot send Content-Location '{}': {}", location, e),
        }
    }
    response
}

fn json_with_type<T: Serialize>(body: T, content_type: &'static str) -> Response {
    let mut response = Json(body).into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// Parse a POST/PUT body by its `Content-Type`
fn parse_incoming(headers: &HeaderMap, body: &str) -> Result<IncomingLinks, ReferenceError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_else(|| media_type::JSON.to_string());

    match content_type.as_str() {
        media_type::URI_LIST => Ok(IncomingLinks::from_uri_list(body)),
        media_type::JSON | media_type::VERBOSE_JSON | media_type::COMPACT_JSON => {
            serde_json::from_str(body)
                .map_err(|e| ReferenceError::bad_request(format!("Invalid links body: {}", e)))
        }
        other => Err(ReferenceError::bad_request(format!(
            "Unsupported content type '{}'",
            other
        ))),
    }
}

// GET /:repository/:id
pub async fn get_entity<S: Store>(
    State(state): State<AppState<S>>,
    Path((repository, id)): Path<(String, String)>,
    base: RequestBaseUri,
) -> Result<Json<EntityResource>, ReferenceError> {
    let links = state.links(&base);
    let resource = state.references.get_entity(&links, &repository, &id).await?;
    Ok(Json(resource))
}

// GET /:repository/:id/:property
pub async fn follow_property_reference<S: Store>(
    State(state): State<AppState<S>>,
    Path((repository, id, property)): Path<(String, String, String)>,
    base: RequestBaseUri,
    headers: HeaderMap,
) -> Result<Response, ReferenceError> {
    let links = state.links(&base);
    let references = &state.references;

    match Representation::from_headers(&headers) {
        Representation::Embedded => {
            let followed = references.follow(&links, &repository, &id, &property).await?;
            Ok(with_content_location(Json(followed.resource), followed.content_location))
        }
        Representation::CompactJson => {
            let compact = references
                .follow_compact(&links, &repository, &id, &property)
                .await?;
            Ok(json_with_type(compact, media_type::COMPACT_JSON))
        }
        Representation::UriList => {
            let compact = references
                .follow_compact(&links, &repository, &id, &property)
                .await?;
            Ok((
                [(header::CONTENT_TYPE, media_type::URI_LIST)],
                compact.to_uri_list(),
            )
                .into_response())
        }
    }
}

// GET /:repository/:id/:property/:property_id
pub async fn follow_property_reference_id<S: Store>(
    State(state): State<AppState<S>>,
    Path((repository, id, property, property_id)): Path<(String, String, String, String)>,
    base: RequestBaseUri,
) -> Result<Response, ReferenceError> {
    let links = state.links(&base);
    let followed = state
        .references
        .follow_by_id(&links, &repository, &id, &property, &property_id)
        .await?;
    Ok(with_content_location(Json(followed.resource), followed.content_location))
}

async fn update_property_reference<S: Store>(
    state: AppState<S>,
    (repository, id, property): (String, String, String),
    mode: LinkUpdate,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, ReferenceError> {
    let incoming = parse_incoming(&headers, &body)?;
    state
        .references
        .update(&repository, &id, &property, mode, incoming)
        .await?;
    Ok(StatusCode::CREATED)
}

// POST /:repository/:id/:property
pub async fn append_property_reference<S: Store>(
    State(state): State<AppState<S>>,
    Path(path): Path<(String, String, String)>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, ReferenceError> {
    update_property_reference(state, path, LinkUpdate::Append, headers, body).await
}

// PUT /:repository/:id/:property
pub async fn replace_property_reference<S: Store>(
    State(state): State<AppState<S>>,
    Path(path): Path<(String, String, String)>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, ReferenceError> {
    update_property_reference(state, path, LinkUpdate::Replace, headers, body).await
}

// DELETE /:repository/:id/:property
pub async fn delete_property_reference<S: Store>(
    State(state): State<AppState<S>>,
    Path((repository, id, property)): Path<(String, String, String)>,
) -> Result<StatusCode, ReferenceError> {
    state.references.delete(&repository, &id, &property).await?;
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /:repository/:id/:property/:property_id
pub async fn delete_property_reference_id<S: Store>(
    State(state): State<AppState<S>>,
    Path((repository, id, property, property_id)): Path<(String, String, String, String)>,
) -> Result<StatusCode, ReferenceError> {
    state
        .references
        .delete_by_id(&repository, &id, &property, &property_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(name: header::HeaderName, value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_representation_negotiation() {
        assert_eq!(Representation::from_headers(&HeaderMap::new()), Representation::Embedded);
        assert_eq!(
            Representation::from_headers(&headers(header::ACCEPT, "text/uri-list")),
            Representation::UriList
        );
        assert_eq!(
            Representation::from_headers(&headers(
                header::ACCEPT,
                "text/html, application/x-compact+json;q=0.9, application/json"
            )),
            Representation::CompactJson
        );
        assert_eq!(
            Representation::from_headers(&headers(
                header::ACCEPT,
                "application/json, text/uri-list"
            )),
            Representation::Embedded
        );
        assert_eq!(
            Representation::from_headers(&headers(header::ACCEPT, "text/html")),
            Representation::Embedded
        );
    }

    #[test]
    fn test_representation_ignores_case_and_refused_ranges() {
        assert_eq!(
            Representation::from_headers(&headers(header::ACCEPT, "Application/X-Compact+JSON")),
            Representation::CompactJson
        );
        assert_eq!(
            Representation::from_headers(&headers(
                header::ACCEPT,
                "application/x-compact+json;q=0, Text/URI-List"
            )),
            Representation::UriList
        );
        assert_eq!(
            Representation::from_headers(&headers(header::ACCEPT, "text/uri-list; Q=0.0")),
            Representation::Embedded
        );
    }

    #[test]
    fn test_parse_incoming_by_content_type() {
        let links = parse_incoming(
            &headers(header::CONTENT_TYPE, "text/uri-list; charset=utf-8"),
            "http://localhost/items/7\nhttp://localhost/items/9",
        )
        .unwrap();
        assert_eq!(links.links.len(), 2);

        let links = parse_incoming(
            &HeaderMap::new(),
            r#"{"links": [{"rel": "item", "href": "http://localhost/items/7"}]}"#,
        )
        .unwrap();
        assert_eq!(links.links[0].href, "http://localhost/items/7");

        let links = parse_incoming(
            &headers(header::CONTENT_TYPE, "Text/URI-List"),
            "http://localhost/items/7",
        )
        .unwrap();
        assert_eq!(links.links[0].rel, "7");

        let err = parse_incoming(&headers(header::CONTENT_TYPE, "application/json"), "not json")
            .unwrap_err();
        assert!(matches!(err, ReferenceError::BadRequest(_)));

        let err =
            parse_incoming(&headers(header::CONTENT_TYPE, "application/xml"), "<a/>").unwrap_err();
        assert!(matches!(err, ReferenceError::BadRequest(_)));
    }
}
