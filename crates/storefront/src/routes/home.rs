//! Product listing route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use bramble_core::{Product, format_usd};

use crate::catalog::{Listing, ListingQuery, SortKey, build_listing};
use crate::filters;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub price: String,
    pub rating_rate: f64,
    pub rating_count: i64,
    /// Styles the add button as "Added" when the product is already in the cart.
    pub in_cart: bool,
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListingParams {
    pub category: Option<String>,
    pub sort: Option<String>,
    pub q: Option<String>,
    pub page: Option<usize>,
}

impl From<ListingParams> for ListingQuery {
    fn from(params: ListingParams) -> Self {
        Self {
            category: params.category.unwrap_or_else(|| "all".to_string()),
            sort: SortKey::parse(params.sort.as_deref().unwrap_or("default")),
            search: params.q.unwrap_or_default(),
            page: params.page.unwrap_or(1).max(1),
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub products: Vec<ProductCardView>,
    pub categories: Vec<String>,
    pub selected_category: String,
    pub sort: String,
    pub search_query: String,
    pub page: usize,
    pub has_more: bool,
    pub load_more_url: String,
}

/// Display the product listing page.
///
/// Feed failures degrade to an empty grid rather than an error page - the
/// cart and checkout never depend on the catalog being reachable.
#[instrument(skip(state))]
pub async fn home(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> impl IntoResponse {
    let query = ListingQuery::from(params);

    let feed = match state.catalog().list_products().await {
        Ok(feed) => feed,
        Err(e) => {
            tracing::error!("Failed to fetch product feed: {e}");
            std::sync::Arc::new(Vec::new())
        }
    };

    let listing = build_listing(&feed, &query);

    let products = listing
        .products
        .iter()
        .map(|p| product_card(p, &state))
        .collect();

    HomeTemplate {
        products,
        categories: listing.categories.clone(),
        selected_category: query.category.clone(),
        sort: query.sort.as_str().to_string(),
        search_query: query.search.clone(),
        page: query.page,
        has_more: listing.has_more,
        load_more_url: load_more_url(&query, &listing),
    }
}

fn product_card(product: &Product, state: &AppState) -> ProductCardView {
    ProductCardView {
        id: product.id.as_i64(),
        title: product.title.clone(),
        description: product.description.clone(),
        category: product.category.clone(),
        image: product.image.clone(),
        price: format_usd(product.price),
        rating_rate: product.rating.rate,
        rating_count: product.rating.count,
        in_cart: state.cart().contains(product.id),
    }
}

/// URL for the load-more control: same category/sort, next page.
///
/// The search query is deliberately omitted - the control is only rendered
/// when no search is active.
fn load_more_url(query: &ListingQuery, listing: &Listing) -> String {
    if !listing.has_more {
        return String::new();
    }
    format!(
        "/?category={}&sort={}&page={}",
        urlencoding::encode(&query.category),
        query.sort.as_str(),
        query.page + 1
    )
}
