use std::{collections::BTreeSet, ops::RangeInclusive};

use serde::Serialize;

use crate::models::{CleanedTable, ContentType, RatingGroup, TitleRecord};

/// The user's current selection. A row is kept only if it matches every part.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterSpec {
    pub content_types: BTreeSet<ContentType>,
    pub rating_groups: BTreeSet<RatingGroup>,
    pub release_years: RangeInclusive<i16>,
    /// Substring tokens matched against the country cell. Empty means any country.
    pub countries: Vec<String>,
}

impl FilterSpec {
    /// Everything selected, full year range, and whichever of `default_countries`
    /// actually occur in the table.
    pub fn defaults(options: &FilterOptions, default_countries: &[String]) -> Self {
        Self {
            content_types: options.content_types.iter().copied().collect(),
            rating_groups: options.rating_groups.iter().copied().collect(),
            release_years: options.release_years.clone(),
            countries: default_countries
                .iter()
                .filter(|c| options.countries.contains(c))
                .cloned()
                .collect(),
        }
    }

    pub fn matches(&self, record: &TitleRecord) -> bool {
        self.content_types.contains(&record.content_type)
            && self.rating_groups.contains(&record.rating_group)
            && self.release_years.contains(&record.release_year)
            && (self.countries.is_empty()
                || self.countries.iter().any(|c| record.country.contains(c.as_str())))
    }
}

/// Derives the Filtered View. Input order is preserved.
pub fn apply<'a, I>(rows: I, spec: &FilterSpec) -> Vec<&'a TitleRecord>
where
    I: IntoIterator<Item = &'a TitleRecord>,
{
    rows.into_iter().filter(|r| spec.matches(r)).collect()
}

/// Narrows a view to titles listed under `genre`; `None` keeps the view.
pub fn by_genre<'a>(view: &[&'a TitleRecord], genre: Option<&str>) -> Vec<&'a TitleRecord> {
    match genre {
        None => view.to_vec(),
        Some(genre) => view.iter().copied().filter(|r| r.listed_in.contains(genre)).collect(),
    }
}

/// The choices offered by the filter form, taken from the whole cleaned table.
#[derive(Clone, Debug, Serialize)]
pub struct FilterOptions {
    pub content_types: Vec<ContentType>,
    pub rating_groups: Vec<RatingGroup>,
    pub countries: Vec<String>,
    pub genres: Vec<String>,
    pub release_years: RangeInclusive<i16>,
}

impl FilterOptions {
    pub fn from_table(table: &CleanedTable) -> Self {
        let mut content_types = Vec::new();
        let mut rating_groups = Vec::new();
        let mut countries = BTreeSet::new();
        let mut genres = BTreeSet::new();
        let mut min_year = i16::MAX;
        let mut max_year = i16::MIN;

        for row in &table.rows {
            if !content_types.contains(&row.content_type) {
                content_types.push(row.content_type);
            }
            if !rating_groups.contains(&row.rating_group) {
                rating_groups.push(row.rating_group);
            }
            countries.extend(row.countries().map(str::to_string));
            genres.extend(row.genres().map(str::to_string));
            min_year = min_year.min(row.release_year);
            max_year = max_year.max(row.release_year);
        }

        let release_years = if table.is_empty() { 0..=0 } else { min_year..=max_year };

        Self {
            content_types,
            rating_groups,
            countries: countries.into_iter().collect(),
            genres: genres.into_iter().collect(),
            release_years,
        }
    }
}
