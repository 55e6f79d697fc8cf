//! API Routes module for the Donghua Scraper API
//!
//! This module contains all HTTP route handlers for the public API endpoints.
//! Each handler performs one upstream fetch through the shared [`PageFetcher`]
//! and hands the HTML to a parser.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::config::Config;
use crate::constants::endpoints;
use crate::constants::filters::Catalog;
use crate::error::{AppError, AppResult};
use crate::models::{ApiError, ApiResponse, EndpointInfo, PageDetail, ServiceInfo};
use crate::parser::{
    absolute_url, classify_page, parse_episode_detail, parse_genre_index, parse_listing,
    parse_schedule, parse_series_detail, DownloadGroup, DownloadLink, EpisodeDetail, EpisodeRef,
    GenreTag, InfoFields, ListingCard, Navigation, PageKind, ResolutionLinks, ScheduleDay,
    SeriesDetail, SiteContext, StreamServer, Theme,
};
use crate::scraper::PageFetcher;

/// Application state shared across handlers
pub struct AppState {
    pub fetcher: Arc<dyn PageFetcher>,
    pub config: Config,
    pub theme: &'static Theme,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: Config) -> Self {
        let theme = config.site_theme();
        Self {
            fetcher,
            config,
            theme,
        }
    }

    fn site(&self) -> SiteContext<'_> {
        SiteContext::new(&self.config.base_url, self.theme)
    }
}

/// Cross-origin policy applied to every route
pub fn cors() -> Cors {
    Cors::permissive().supports_credentials()
}

/// Query parameters for search endpoint
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SearchQuery {
    /// Search keyword
    pub s: Option<String>,
}

/// Query parameters for paginated listings
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PageQuery {
    /// Page number (default: 1)
    pub page: Option<u32>,
}

impl PageQuery {
    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

/// Query parameters for detail endpoints
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UrlQuery {
    /// Absolute or site-relative page URL
    pub url: Option<String>,
}

/// Resolve a user-supplied page URL against the site origin
///
/// Only `http` and `https` targets are fetched.
fn resolve_target_url(raw: Option<&str>, base_url: &str) -> AppResult<String> {
    let raw = raw
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::validation("Query parameter 'url' is required"))?;

    let resolved = absolute_url(base_url, raw);
    match url::Url::parse(&resolved) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(resolved),
        _ => Err(AppError::validation(format!(
            "Query parameter 'url' must be an http(s) URL: {}",
            raw
        ))),
    }
}

/// GET / - Service banner and endpoint index
#[utoipa::path(
    get,
    path = "/",
    tag = "meta",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    )
)]
pub async fn index(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::new(ServiceInfo::new(&data.config.base_url)))
}

/// GET /api/search - Search series by title
///
/// Query parameter: s (required) - search keyword
#[utoipa::path(
    get,
    path = "/api/search",
    tag = "listing",
    params(SearchQuery),
    responses(
        (status = 200, description = "Search results retrieved successfully", body = Vec<ListingCard>),
        (status = 400, description = "Bad request - search query is required", body = ApiError),
        (status = 502, description = "Upstream site unavailable", body = ApiError)
    )
)]
pub async fn search(
    data: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let keyword = query
        .s
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("Query parameter 's' is required"))?;

    info!("Searching for: {}", keyword);
    let html = data
        .fetcher
        .fetch_with_params(&endpoints::home(&data.config.base_url), &[("s", keyword)])
        .await?;

    let results = parse_listing(&html, &data.site());
    info!("Found {} results for {:?}", results.len(), keyword);
    Ok(HttpResponse::Ok().json(ApiResponse::new(results)))
}

/// GET /api/schedule - Weekly release schedule
#[utoipa::path(
    get,
    path = "/api/schedule",
    tag = "listing",
    responses(
        (status = 200, description = "Schedule retrieved successfully", body = Vec<ScheduleDay>),
        (status = 502, description = "Upstream site unavailable", body = ApiError)
    )
)]
pub async fn schedule(data: web::Data<AppState>) -> AppResult<HttpResponse> {
    let html = data
        .fetcher
        .fetch(&endpoints::schedule(&data.config.base_url))
        .await?;

    let days = parse_schedule(&html, &data.site());
    info!("Parsed schedule with {} days", days.len());
    Ok(HttpResponse::Ok().json(ApiResponse::new(days)))
}

async fn catalog_listing(
    data: &AppState,
    catalog: Catalog,
    query: &PageQuery,
) -> AppResult<HttpResponse> {
    let page = query.page();
    let url = endpoints::catalog(&data.config.base_url, catalog, page);
    let html = data.fetcher.fetch(&url).await?;

    let cards = parse_listing(&html, &data.site());
    info!("Parsed {} {} cards (page {})", cards.len(), catalog.name(), page);
    Ok(HttpResponse::Ok().json(ApiResponse::new(cards)))
}

/// GET /api/ongoing - Ongoing series
#[utoipa::path(
    get,
    path = "/api/ongoing",
    tag = "listing",
    params(PageQuery),
    responses(
        (status = 200, description = "Ongoing series", body = Vec<ListingCard>),
        (status = 502, description = "Upstream site unavailable", body = ApiError)
    )
)]
pub async fn ongoing(
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    catalog_listing(&data, Catalog::Ongoing, &query).await
}

/// GET /api/completed - Completed series
#[utoipa::path(
    get,
    path = "/api/completed",
    tag = "listing",
    params(PageQuery),
    responses(
        (status = 200, description = "Completed series", body = Vec<ListingCard>),
        (status = 502, description = "Upstream site unavailable", body = ApiError)
    )
)]
pub async fn completed(
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    catalog_listing(&data, Catalog::Completed, &query).await
}

/// GET /api/popular - Most popular series
#[utoipa::path(
    get,
    path = "/api/popular",
    tag = "listing",
    params(PageQuery),
    responses(
        (status = 200, description = "Popular series", body = Vec<ListingCard>),
        (status = 502, description = "Upstream site unavailable", body = ApiError)
    )
)]
pub async fn popular(
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    catalog_listing(&data, Catalog::Popular, &query).await
}

/// GET /api/rating - Highest rated series
#[utoipa::path(
    get,
    path = "/api/rating",
    tag = "listing",
    params(PageQuery),
    responses(
        (status = 200, description = "Highest rated series", body = Vec<ListingCard>),
        (status = 502, description = "Upstream site unavailable", body = ApiError)
    )
)]
pub async fn rating(
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    catalog_listing(&data, Catalog::Rating, &query).await
}

/// GET /api/recommended - The site's default catalog order
#[utoipa::path(
    get,
    path = "/api/recommended",
    tag = "listing",
    params(PageQuery),
    responses(
        (status = 200, description = "Recommended series", body = Vec<ListingCard>),
        (status = 502, description = "Upstream site unavailable", body = ApiError)
    )
)]
pub async fn recommended(
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    catalog_listing(&data, Catalog::Recommended, &query).await
}

/// GET /api/genres - Genre index, sorted by name
#[utoipa::path(
    get,
    path = "/api/genres",
    tag = "listing",
    responses(
        (status = 200, description = "Genre index", body = Vec<GenreTag>),
        (status = 502, description = "Upstream site unavailable", body = ApiError)
    )
)]
pub async fn genres(data: web::Data<AppState>) -> AppResult<HttpResponse> {
    let html = data
        .fetcher
        .fetch(&endpoints::home(&data.config.base_url))
        .await?;

    let genres = parse_genre_index(&html, &data.site());
    info!("Parsed {} genres", genres.len());
    Ok(HttpResponse::Ok().json(ApiResponse::new(genres)))
}

/// GET /api/genres/{slug} - Series tagged with a genre
#[utoipa::path(
    get,
    path = "/api/genres/{slug}",
    tag = "listing",
    params(
        ("slug" = String, Path, description = "Genre slug"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Series in the genre", body = Vec<ListingCard>),
        (status = 404, description = "Unknown genre", body = ApiError),
        (status = 502, description = "Upstream site unavailable", body = ApiError)
    )
)]
pub async fn genre_listing(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let page = query.page();
    let html = data
        .fetcher
        .fetch(&endpoints::genre(&data.config.base_url, &slug, page))
        .await?;

    let cards = parse_listing(&html, &data.site());
    info!("Parsed {} cards for genre {} (page {})", cards.len(), slug, page);
    Ok(HttpResponse::Ok().json(ApiResponse::new(cards)))
}

/// GET /api/series - Series details and episode list
#[utoipa::path(
    get,
    path = "/api/series",
    tag = "detail",
    params(UrlQuery),
    responses(
        (status = 200, description = "Series details", body = SeriesDetail),
        (status = 400, description = "Missing or invalid url", body = ApiError),
        (status = 404, description = "Page not found", body = ApiError),
        (status = 502, description = "Upstream site unavailable", body = ApiError)
    )
)]
pub async fn series_detail(
    data: web::Data<AppState>,
    query: web::Query<UrlQuery>,
) -> AppResult<HttpResponse> {
    let url = resolve_target_url(query.url.as_deref(), &data.config.base_url)?;
    let html = data.fetcher.fetch(&url).await?;

    let detail = parse_series_detail(&html, &url, &data.site())?;
    info!("Parsed series {:?} with {} episodes", detail.title, detail.episodes.len());
    Ok(HttpResponse::Ok().json(ApiResponse::new(detail)))
}

/// GET /api/episode - Episode streams, downloads and navigation
#[utoipa::path(
    get,
    path = "/api/episode",
    tag = "detail",
    params(UrlQuery),
    responses(
        (status = 200, description = "Episode details", body = EpisodeDetail),
        (status = 400, description = "Missing or invalid url", body = ApiError),
        (status = 404, description = "Page not found", body = ApiError),
        (status = 502, description = "Upstream site unavailable", body = ApiError)
    )
)]
pub async fn episode_detail(
    data: web::Data<AppState>,
    query: web::Query<UrlQuery>,
) -> AppResult<HttpResponse> {
    let url = resolve_target_url(query.url.as_deref(), &data.config.base_url)?;
    let html = data.fetcher.fetch(&url).await?;

    let detail = parse_episode_detail(&html, &url, &data.site())?;
    info!("Parsed episode {:?} with {} servers", detail.title, detail.servers.len());
    Ok(HttpResponse::Ok().json(ApiResponse::new(detail)))
}

/// GET /api/detail - Series or episode, detected from the page
#[utoipa::path(
    get,
    path = "/api/detail",
    tag = "detail",
    params(UrlQuery),
    responses(
        (status = 200, description = "Series or episode details tagged with kind", body = PageDetail),
        (status = 400, description = "Missing or invalid url", body = ApiError),
        (status = 404, description = "Page not found", body = ApiError),
        (status = 502, description = "Upstream site unavailable", body = ApiError)
    )
)]
pub async fn page_detail(
    data: web::Data<AppState>,
    query: web::Query<UrlQuery>,
) -> AppResult<HttpResponse> {
    let url = resolve_target_url(query.url.as_deref(), &data.config.base_url)?;
    let html = data.fetcher.fetch(&url).await?;
    let site = data.site();

    let kind = classify_page(&html, &url, &site);
    info!("Classified {} as {:?}", url, kind);
    let detail = match kind {
        PageKind::Series => PageDetail::Series(parse_series_detail(&html, &url, &site)?),
        PageKind::Episode => PageDetail::Episode(parse_episode_detail(&html, &url, &site)?),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::new(detail)))
}

/// Fallback for paths no route matches, answered with the error envelope
pub async fn route_not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::not_found(format!("No route for {}", req.path())))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Donghua Scraper API",
        version = "0.1.0",
        description = "Read-only JSON API over a donghua streaming site",
        license(
            name = "MIT"
        )
    ),
    paths(
        index,
        search,
        schedule,
        ongoing,
        completed,
        popular,
        rating,
        recommended,
        genres,
        genre_listing,
        series_detail,
        episode_detail,
        page_detail
    ),
    components(
        schemas(
            ListingCard,
            ScheduleDay,
            GenreTag,
            SeriesDetail,
            InfoFields,
            EpisodeRef,
            EpisodeDetail,
            StreamServer,
            DownloadGroup,
            ResolutionLinks,
            DownloadLink,
            Navigation,
            PageDetail,
            PageKind,
            ServiceInfo,
            EndpointInfo,
            ApiError,
            SearchQuery,
            PageQuery,
            UrlQuery
        )
    ),
    tags(
        (name = "meta", description = "Service information"),
        (name = "listing", description = "Listing, schedule and genre pages"),
        (name = "detail", description = "Series and episode pages")
    )
)]
pub struct ApiDoc;

/// Configure API routes
///
/// Malformed query strings are reported through the error envelope.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    );

    cfg.route("/", web::get().to(index)).service(
        web::scope("/api")
            .route("/search", web::get().to(search))
            .route("/schedule", web::get().to(schedule))
            .route("/ongoing", web::get().to(ongoing))
            .route("/completed", web::get().to(completed))
            .route("/popular", web::get().to(popular))
            .route("/rating", web::get().to(rating))
            .route("/recommended", web::get().to(recommended))
            .route("/genres", web::get().to(genres))
            .route("/genres/{slug}", web::get().to(genre_listing))
            .route("/series", web::get().to(series_detail))
            .route("/episode", web::get().to(episode_detail))
            .route("/detail", web::get().to(page_detail)),
    );
}
