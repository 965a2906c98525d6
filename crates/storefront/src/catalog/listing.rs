//! Listing logic: category filter, sort, load-more pagination, and search.
//!
//! The pipeline order matters and is part of the page contract:
//! filter by category, sort, slice to the loaded window (`page * 3`), THEN
//! apply the search query to that window only. An active search therefore
//! never reveals products that have not been loaded yet, and the load-more
//! control is hidden while searching. Changing category or sort resets to
//! page 1; changing the search query keeps the current page.

use bramble_core::Product;

/// Products revealed per "load more" click.
pub const PRODUCTS_PER_PAGE: usize = 3;

/// Sort orders offered by the filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Feed order, untouched.
    #[default]
    Default,
    /// Price, lowest first.
    PriceLow,
    /// Price, highest first.
    PriceHigh,
    /// Average rating, highest first.
    Rating,
    /// Title, A to Z (case-insensitive).
    Name,
}

impl SortKey {
    /// Parse a query-string value; unknown values fall back to feed order.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "price-low" => Self::PriceLow,
            "price-high" => Self::PriceHigh,
            "rating" => Self::Rating,
            "name" => Self::Name,
            _ => Self::Default,
        }
    }

    /// The query-string value for this sort order.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Rating => "rating",
            Self::Name => "name",
        }
    }
}

/// Listing request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    /// Selected category, or "all".
    pub category: String,
    /// Selected sort order.
    pub sort: SortKey,
    /// Search query; empty means no search.
    pub search: String,
    /// 1-based page; the loaded window is `page * PRODUCTS_PER_PAGE`.
    pub page: usize,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            category: "all".to_string(),
            sort: SortKey::Default,
            search: String::new(),
            page: 1,
        }
    }
}

/// The computed listing for one page render.
#[derive(Debug, Clone)]
pub struct Listing {
    /// Products to display, in final order.
    pub products: Vec<Product>,
    /// "all" plus every distinct category in first-seen feed order.
    pub categories: Vec<String>,
    /// Whether a load-more control should be shown.
    pub has_more: bool,
}

/// Build the listing for a query over the full product feed.
#[must_use]
pub fn build_listing(feed: &[Product], query: &ListingQuery) -> Listing {
    let categories = collect_categories(feed);

    let mut filtered: Vec<&Product> = feed
        .iter()
        .filter(|p| query.category == "all" || p.category == query.category)
        .collect();

    sort_products(&mut filtered, query.sort);

    let loaded_end = query
        .page
        .max(1)
        .saturating_mul(PRODUCTS_PER_PAGE)
        .min(filtered.len());
    let loaded = filtered.get(..loaded_end).unwrap_or_default();

    let products: Vec<Product> = if query.search.is_empty() {
        loaded.iter().map(|p| (*p).clone()).collect()
    } else {
        let needle = query.search.to_lowercase();
        loaded
            .iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .map(|p| (*p).clone())
            .collect()
    };

    // Load-more is offered only outside of an active search, and only while
    // the category-filtered feed still has unloaded products.
    let has_more = query.search.is_empty() && loaded_end < filtered.len();

    Listing {
        products,
        categories,
        has_more,
    }
}

fn collect_categories(feed: &[Product]) -> Vec<String> {
    let mut categories = vec!["all".to_string()];
    for product in feed {
        if !categories.contains(&product.category) {
            categories.push(product.category.clone());
        }
    }
    categories
}

fn sort_products(products: &mut [&Product], sort: SortKey) {
    match sort {
        SortKey::Default => {}
        SortKey::PriceLow => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::Rating => {
            products.sort_by(|a, b| b.rating.rate.total_cmp(&a.rating.rate));
        }
        SortKey::Name => {
            products.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        }
    }
}
