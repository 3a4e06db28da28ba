//! Catalog routes: genre table, movie index, downloads and attachments.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method},
    response::Response,
    routing::get,
    Router,
};
use duckflix_av::attachments::find_by_name;
use duckflix_common::paths::content_type_for;
use duckflix_common::{Error, MovieId};

use super::error::AppError;
use super::AppContext;
use crate::config::IndexFormat;
use crate::library::{genres, CatalogEntry, MovieFilter, COVER_ATTACHMENT, TMDB_ATTACHMENT};
use crate::streaming::ContentSource;

const JSON: &str = "application/json";

/// Create catalog routes. `get` also answers HEAD.
pub fn movie_routes() -> Router<AppContext> {
    Router::new()
        .route("/movie/genres.json", get(genres_index))
        .route("/movies.json", get(movies_index))
        .route("/movie/{id}/download", get(download))
        .route("/movie/{id}/attachment/{name}", get(attachment))
}

fn range_header(headers: &HeaderMap) -> Option<&str> {
    // A non-ASCII header still counts as a (malformed) range request.
    headers
        .get(header::RANGE)
        .map(|value| value.to_str().unwrap_or(""))
}

/// Route ids are numeric; leading zeros name the same movie.
fn lookup_id(id: &str) -> Result<MovieId, AppError> {
    id.bytes()
        .all(|b| b.is_ascii_digit())
        .then(|| id.parse::<u64>().ok())
        .flatten()
        .map(MovieId::from_number)
        .ok_or_else(|| AppError(Error::not_found("movie", format!("movie/{id}"))))
}

fn lookup<'a>(
    catalog: &'a crate::library::Catalog,
    id: &MovieId,
) -> Result<&'a CatalogEntry, AppError> {
    catalog
        .get(id)
        .ok_or_else(|| AppError(Error::not_found("movie", id)))
}

async fn genres_index(
    State(ctx): State<AppContext>,
    method: Method,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let body = serde_json::to_vec(genres::GENRES)?;
    let response = ctx
        .content
        .serve(body.into(), range_header(&headers), JSON, &method)
        .await?;
    Ok(response)
}

async fn movies_index(
    State(ctx): State<AppContext>,
    Query(params): Query<Vec<(String, String)>>,
    method: Method,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let filter = MovieFilter::from_query(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
    let catalog = ctx.library.snapshot();
    let matching = catalog
        .entries()
        .into_iter()
        .filter(|entry| filter.matches(&entry.details));

    let body = match ctx.config.library.index_format {
        IndexFormat::Details => {
            serde_json::to_vec(&matching.map(|e| &e.details).collect::<Vec<_>>())?
        }
        IndexFormat::Identifiers => {
            serde_json::to_vec(&matching.map(|e| &e.id).collect::<Vec<_>>())?
        }
    };

    let response = ctx
        .content
        .serve(body.into(), range_header(&headers), JSON, &method)
        .await?;
    Ok(response)
}

async fn download(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    method: Method,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let id = lookup_id(&id)?;
    let catalog = ctx.library.snapshot();
    let entry = lookup(&catalog, &id)?;

    tracing::debug!(movie_id = %id, path = %entry.path.display(), "Download");

    let response = ctx
        .content
        .serve(
            ContentSource::File(entry.path.clone()),
            range_header(&headers),
            content_type_for(&entry.path),
            &method,
        )
        .await?;
    Ok(response)
}

async fn attachment(
    State(ctx): State<AppContext>,
    Path((id, name)): Path<(String, String)>,
    method: Method,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let id = lookup_id(&id)?;
    let catalog = ctx.library.snapshot();
    let entry = lookup(&catalog, &id)?;

    let (source, media_type) = match (name.as_str(), &entry.cover) {
        (COVER_ATTACHMENT, Some(cover)) => {
            (ContentSource::from(cover.clone()), "image/jpeg".to_string())
        }
        (TMDB_ATTACHMENT, _) => (
            ContentSource::from(serde_json::to_vec(&entry.details)?),
            JSON.to_string(),
        ),
        _ => {
            let extractor = ctx.library.extractor();
            let attachments = extractor.list_attachments(&entry.path).await?;
            let attachment = find_by_name(&attachments, &name)
                .ok_or_else(|| AppError(Error::not_found("attachment", &name)))?;
            tracing::debug!(
                movie_id = %id,
                attachment = %attachment.file_name,
                "Extracting attachment"
            );
            let bytes = extractor.read_attachment(&entry.path, attachment.id).await?;
            (ContentSource::from(bytes), attachment.mime_type.clone())
        }
    };

    let response = ctx
        .content
        .serve(source, range_header(&headers), &media_type, &method)
        .await?;
    Ok(response)
}
