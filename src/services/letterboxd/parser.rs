use scraper::{ElementRef, Html, Selector};

/// A poster on a watchlist page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterEntry {
    pub title: String,
    /// Site-relative film link, e.g. `/film/dune-2021/`
    pub link: String,
}

/// What one watchlist page yields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchlistPage {
    pub entries: Vec<PosterEntry>,
    /// Site-relative link to the following page, if any
    pub next_href: Option<String>,
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static CSS selector is valid")
}

fn non_empty_attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Extracts the profile picture from the `og:image` meta tag
pub fn profile_image(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let meta = selector(r#"meta[property="og:image"]"#);

    document
        .select(&meta)
        .find_map(|element| non_empty_attr(element, "content"))
}

/// Extracts poster entries and the next-page link from a watchlist page.
///
/// Posters without an `alt` title or a `data-target-link` are skipped.
pub fn watchlist_page(html: &str) -> WatchlistPage {
    let document = Html::parse_document(html);
    let container = selector("li.poster-container");
    let poster = selector("div.film-poster");
    let poster_img = selector("div.film-poster img");
    let next = selector("a.next");

    let entries = document
        .select(&container)
        .filter_map(|item| {
            let link = item
                .select(&poster)
                .next()
                .and_then(|div| non_empty_attr(div, "data-target-link"))?;
            let title = item
                .select(&poster_img)
                .next()
                .and_then(|img| non_empty_attr(img, "alt"))?;
            Some(PosterEntry { title, link })
        })
        .collect();

    let next_href = document
        .select(&next)
        .find_map(|anchor| non_empty_attr(anchor, "href"));

    WatchlistPage { entries, next_href }
}
