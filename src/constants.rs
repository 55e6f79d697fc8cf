//! Constants module for the Donghua Scraper API
//!
//! Contains upstream URL builders that use the base URL from configuration.

/// URL builder functions for all upstream pages
pub mod endpoints {
    use super::filters::Catalog;

    /// Home page URL
    pub fn home(base_url: &str) -> String {
        format!("{}/", base_url)
    }

    /// Weekly release schedule page URL
    pub fn schedule(base_url: &str) -> String {
        format!("{}/schedule/", base_url)
    }

    /// Catalog listing URL for a filter
    pub fn catalog(base_url: &str, catalog: Catalog, page: u32) -> String {
        let mut url = format!("{}/anime/?", base_url);
        if let Some(status) = catalog.status() {
            url.push_str(&format!("status={}&", status));
        }
        if let Some(order) = catalog.order() {
            url.push_str(&format!("order={}&", order));
        }
        url.push_str(&format!("page={}", page));
        url
    }

    /// Genre listing URL
    pub fn genre(base_url: &str, slug: &str, page: u32) -> String {
        if page <= 1 {
            format!("{}/genres/{}/", base_url, urlencoding::encode(slug))
        } else {
            format!(
                "{}/genres/{}/page/{}/",
                base_url,
                urlencoding::encode(slug),
                page
            )
        }
    }
}

/// Catalog filters exposed by the API
pub mod filters {
    /// Catalog listings backed by the site's `/anime/` filter page
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Catalog {
        Ongoing,
        Completed,
        Popular,
        Rating,
        Recommended,
    }

    impl Catalog {
        /// Value of the `status` query parameter
        pub fn status(self) -> Option<&'static str> {
            match self {
                Catalog::Ongoing => Some("ongoing"),
                Catalog::Completed => Some("completed"),
                _ => None,
            }
        }

        /// Value of the `order` query parameter
        pub fn order(self) -> Option<&'static str> {
            match self {
                Catalog::Ongoing | Catalog::Completed => Some("update"),
                Catalog::Popular => Some("popular"),
                Catalog::Rating => Some("rating"),
                Catalog::Recommended => None,
            }
        }

        pub fn name(self) -> &'static str {
            match self {
                Catalog::Ongoing => "ongoing",
                Catalog::Completed => "completed",
                Catalog::Popular => "popular",
                Catalog::Rating => "rating",
                Catalog::Recommended => "recommended",
            }
        }
    }
}
