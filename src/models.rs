use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// One row of the catalog export, exactly as it appears in the file.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawTitle {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub director: Option<String>,
    pub cast: Option<String>,
    pub country: Option<String>,
    pub date_added: Option<String>,
    pub release_year: Option<String>,
    pub rating: Option<String>,
    pub duration: Option<String>,
    pub listed_in: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Movie,
    #[serde(rename = "TV Show")]
    TvShow,
}

impl ContentType {
    pub fn label(self) -> &'static str {
        match self {
            ContentType::Movie => "Movie",
            ContentType::TvShow => "TV Show",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Movie" => Some(ContentType::Movie),
            "TV Show" => Some(ContentType::TvShow),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum RatingGroup {
    Adult,
    Teen,
    #[serde(rename = "Family/Kids")]
    FamilyKids,
}

impl RatingGroup {
    /// Buckets a content rating into an audience segment. Unknown ratings land
    /// in `FamilyKids`.
    pub fn from_rating(rating: &str) -> Self {
        match rating.trim() {
            "TV-MA" | "R" | "NC-17" | "UR" => RatingGroup::Adult,
            "TV-14" | "PG-13" => RatingGroup::Teen,
            _ => RatingGroup::FamilyKids,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RatingGroup::Adult => "Adult",
            RatingGroup::Teen => "Teen",
            RatingGroup::FamilyKids => "Family/Kids",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Adult" => Some(RatingGroup::Adult),
            "Teen" => Some(RatingGroup::Teen),
            "Family/Kids" => Some(RatingGroup::FamilyKids),
            _ => None,
        }
    }
}

impl fmt::Display for RatingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Runtime {
    Minutes(f64),
    Seasons(f64),
}

#[derive(Clone, Debug, Serialize)]
pub struct TitleRecord {
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub director: String,
    pub cast: String,
    pub country: String,
    pub date_added: Date,
    pub year_added: i16,
    pub month_added: i8,
    pub release_year: i16,
    pub content_lag_years: i16,
    pub rating: String,
    pub rating_group: RatingGroup,
    pub duration: Runtime,
    pub listed_in: String,
    pub description: String,
}

impl TitleRecord {
    pub fn duration_minutes(&self) -> Option<f64> {
        match (self.content_type, self.duration) {
            (ContentType::Movie, Runtime::Minutes(m)) => Some(m),
            _ => None,
        }
    }

    pub fn duration_seasons(&self) -> Option<f64> {
        match (self.content_type, self.duration) {
            (ContentType::TvShow, Runtime::Seasons(s)) => Some(s),
            _ => None,
        }
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        split_list(&self.country)
    }

    pub fn genres(&self) -> impl Iterator<Item = &str> {
        split_list(&self.listed_in)
    }
}

/// Splits a ", "-joined cell into its trimmed, non-empty parts.
pub fn split_list(cell: &str) -> impl Iterator<Item = &str> {
    cell.split(", ").map(str::trim).filter(|s| !s.is_empty())
}

/// Rows removed by each pipeline step, in step order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub duplicates: usize,
    pub missing_required: usize,
    pub unknown_type: usize,
    pub bad_release_year: usize,
    pub bad_date: usize,
    pub added_before_release: usize,
    pub malformed_duration: usize,
    pub output_rows: usize,
}

impl CleaningReport {
    pub fn dropped(&self) -> usize {
        self.input_rows - self.output_rows
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CleanedTable {
    pub rows: Vec<TitleRecord>,
    pub report: CleaningReport,
}

impl CleanedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_groups_cover_every_rating() {
        for r in ["TV-MA", "R", "NC-17", "UR"] {
            assert_eq!(RatingGroup::from_rating(r), RatingGroup::Adult, "{r}");
        }
        for r in ["TV-14", "PG-13"] {
            assert_eq!(RatingGroup::from_rating(r), RatingGroup::Teen, "{r}");
        }
        for r in ["PG", "G", "TV-Y", "TV-Y7", "TV-G", "NR", "74 min", "", "tv-ma"] {
            assert_eq!(RatingGroup::from_rating(r), RatingGroup::FamilyKids, "{r}");
        }
    }

    #[test]
    fn labels_round_trip() {
        for g in [RatingGroup::Adult, RatingGroup::Teen, RatingGroup::FamilyKids] {
            assert_eq!(RatingGroup::from_label(g.label()), Some(g));
        }
        for t in [ContentType::Movie, ContentType::TvShow] {
            assert_eq!(ContentType::from_label(t.label()), Some(t));
        }
        assert_eq!(ContentType::from_label("Podcast"), None);
    }

    #[test]
    fn split_list_skips_blank_parts() {
        let parts: Vec<_> = split_list("United States, India, ").collect();
        assert_eq!(parts, vec!["United States", "India"]);
    }
}
