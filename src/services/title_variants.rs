use regex::Regex;
use std::sync::OnceLock;

/// Search strings to try for one watchlist title, most faithful first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleQuery {
    /// Release year taken from a trailing "(YYYY)", used to narrow the search
    pub year: Option<u16>,
    pub variants: Vec<String>,
}

const REPLACEMENTS: [(&str, &str); 4] = [("&", "and"), ("'", ""), ("-", " "), (":", "")];

fn trailing_year() -> &'static Regex {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    YEAR.get_or_init(|| Regex::new(r"\(([0-9]{4})\)$").expect("year pattern is valid"))
}

/// Splits a trailing "(YYYY)" off a title
pub fn split_year(title: &str) -> (String, Option<u16>) {
    let title = title.trim();
    match trailing_year().captures(title) {
        Some(captures) => {
            let year = captures.get(1).and_then(|m| m.as_str().parse().ok());
            let stripped = trailing_year().replace(title, "");
            (stripped.trim().to_string(), year)
        }
        None => (title.to_string(), None),
    }
}

/// Drops everything except ASCII word characters and whitespace
fn strip_punctuation(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_ascii_whitespace())
        .collect()
}

/// Spells out or drops the punctuation that most often differs between sites
fn common_replacements(title: &str) -> String {
    let replaced = REPLACEMENTS
        .iter()
        .fold(title.to_string(), |acc, (from, to)| acc.replace(from, to));
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Builds the ordered search variants for a displayed title
pub fn build_query(title: &str) -> TitleQuery {
    let (base, year) = split_year(title);

    // Looser spellings are compared with the original only; the replacement
    // spelling may repeat the stripped one
    let alternates = [strip_punctuation(&base), common_replacements(&base)]
        .into_iter()
        .filter(|candidate| !candidate.trim().is_empty() && *candidate != base);

    let mut variants = Vec::with_capacity(3);
    if !base.is_empty() {
        variants.push(base.clone());
    }
    variants.extend(alternates);

    TitleQuery { year, variants }
}
