use std::collections::{BTreeMap, BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    artifacts::{Listings, SectorListing},
    error::{AppError, AppResult},
    models::{SectorSummary, TextSource, WordCloud, WordCount, ALL_SECTORS},
};

/// Words never counted in a word cloud
const STOPWORDS: [&str; 3] = ["s", "na", "none"];

static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w[\w']+").expect("Failed to compile word pattern"));

#[derive(Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Default)]
struct SectorAccumulator {
    listings: usize,
    price: Mean,
    price_per_sqft: Mean,
    built_up_area: Mean,
    latitude: Mean,
    longitude: Mean,
}

fn sector_of(listing: &SectorListing) -> Option<&str> {
    listing
        .sector
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Averages per sector, sorted by sector name.
///
/// An unparseable built-up area counts as 0. Sectors without a usable mean
/// coordinate are left out since they cannot be placed on the map.
pub fn sector_summaries(listings: &Listings) -> Vec<SectorSummary> {
    let mut groups: BTreeMap<&str, SectorAccumulator> = BTreeMap::new();

    for listing in &listings.rows {
        let Some(sector) = sector_of(listing) else {
            continue;
        };
        let acc = groups.entry(sector).or_default();
        acc.listings += 1;
        acc.price.add(listing.price);
        acc.price_per_sqft.add(listing.price_per_sqft);
        acc.built_up_area.add(Some(listing.built_up_area.unwrap_or(0.0)));
        acc.latitude.add(listing.latitude);
        acc.longitude.add(listing.longitude);
    }

    groups
        .into_iter()
        .filter_map(|(sector, acc)| {
            Some(SectorSummary {
                sector: sector.to_string(),
                listings: acc.listings,
                price: acc.price.value(),
                price_per_sqft: acc.price_per_sqft.value(),
                built_up_area: acc.built_up_area.value().unwrap_or(0.0),
                latitude: acc.latitude.value()?,
                longitude: acc.longitude.value()?,
            })
        })
        .collect()
}

/// Sorted distinct sector names
pub fn sector_names(listings: &Listings) -> Vec<String> {
    listings
        .rows
        .iter()
        .filter_map(sector_of)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Lowercase words with any trailing `'s` removed. Numbers and stopwords
/// are skipped.
fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    WORD_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .map(|mut token| {
            if token.ends_with("'s") {
                token.truncate(token.len() - 2);
            }
            token
        })
        .filter(|token| !token.is_empty() && !token.chars().all(char::is_numeric))
        .filter(|token| !STOPWORDS.contains(&token.as_str()))
}

/// Most frequent words for a sector (or all sectors), ties in alphabetical order.
///
/// Text comes from the first free-text column the listings declare; when
/// they declare none, the separate feature text is used for every sector.
pub fn word_frequencies(
    listings: &Listings,
    feature_text: Option<&str>,
    sector: Option<&str>,
    limit: usize,
) -> AppResult<WordCloud> {
    if limit == 0 {
        return Err(AppError::InvalidInput("limit must be at least 1".to_string()));
    }

    let sector = sector
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != ALL_SECTORS);

    if let Some(wanted) = sector {
        if !listings.rows.iter().any(|l| sector_of(l) == Some(wanted)) {
            return Err(AppError::NotFound(format!("Sector '{}' not found", wanted)));
        }
    }

    let rows = listings
        .rows
        .iter()
        .filter(|l| sector.map_or(true, |wanted| sector_of(l) == Some(wanted)));

    let mut counts: HashMap<String, usize> = HashMap::new();
    let source = match (listings.preferred_text_field(), feature_text) {
        (Some(field), _) => {
            for text in rows.filter_map(|l| field.read(l)) {
                for word in words(text) {
                    *counts.entry(word).or_default() += 1;
                }
            }
            TextSource::Listing(field)
        }
        (None, Some(text)) => {
            for word in words(text) {
                *counts.entry(word).or_default() += 1;
            }
            TextSource::FeatureText
        }
        (None, None) => TextSource::None,
    };

    let mut ranked: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    ranked.truncate(limit);

    if ranked.is_empty() {
        tracing::info!(sector = ?sector, "No text data available for word cloud");
    }

    Ok(WordCloud {
        sector: sector.map(str::to_string),
        source,
        words: ranked,
    })
}
