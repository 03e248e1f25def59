use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use serde::Serialize;

use crate::models::{ContentType, RatingGroup, TitleRecord};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Headline {
    pub total: usize,
    pub movies: usize,
    pub tv_shows: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Count<K> {
    pub key: K,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct YearRow {
    pub year: i16,
    pub movies: usize,
    pub tv_shows: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeasonCount {
    pub seasons: f64,
    pub count: usize,
}

/// Every report the dashboard shows for one Filtered View.
#[derive(Clone, Debug, Serialize)]
pub struct Dashboard {
    pub headline: Headline,
    pub by_type: Vec<Count<ContentType>>,
    pub by_rating_group: Vec<Count<RatingGroup>>,
    pub additions_by_year: Vec<YearRow>,
    pub top_countries: Vec<Count<String>>,
    pub top_genres: Vec<Count<String>>,
    pub duration_histogram: Vec<Bin>,
    pub season_counts: Vec<SeasonCount>,
    pub top_words: Vec<Count<String>>,
}

impl Dashboard {
    /// `word_view` is the view narrowed by the genre selection.
    pub fn build(
        view: &[&TitleRecord],
        word_view: &[&TitleRecord],
        top_k: usize,
        bins: usize,
    ) -> Self {
        Self {
            headline: headline(view),
            by_type: counts_by_type(view),
            by_rating_group: counts_by_rating_group(view),
            additions_by_year: additions_by_year(view),
            top_countries: top_countries(view, top_k),
            top_genres: top_genres(view, top_k),
            duration_histogram: duration_histogram(view, bins),
            season_counts: season_counts(view),
            top_words: top_words(word_view, top_k.saturating_mul(3)),
        }
    }
}

pub fn headline(view: &[&TitleRecord]) -> Headline {
    let movies = view.iter().filter(|r| r.content_type == ContentType::Movie).count();
    let tv_shows = view.iter().filter(|r| r.content_type == ContentType::TvShow).count();
    Headline { total: view.len(), movies, tv_shows }
}

pub fn counts_by_type(view: &[&TitleRecord]) -> Vec<Count<ContentType>> {
    tally(view.iter().map(|r| r.content_type), usize::MAX)
}

pub fn counts_by_rating_group(view: &[&TitleRecord]) -> Vec<Count<RatingGroup>> {
    tally(view.iter().map(|r| r.rating_group), usize::MAX)
}

pub fn additions_by_year(view: &[&TitleRecord]) -> Vec<YearRow> {
    let mut years: BTreeMap<i16, (usize, usize)> = BTreeMap::new();
    for r in view {
        let entry = years.entry(r.year_added).or_default();
        match r.content_type {
            ContentType::Movie => entry.0 += 1,
            ContentType::TvShow => entry.1 += 1,
        }
    }
    years
        .into_iter()
        .map(|(year, (movies, tv_shows))| YearRow { year, movies, tv_shows })
        .collect()
}

/// Producing countries, one count per country listed in a cell. Titles whose
/// country is unknown are left out.
pub fn top_countries(view: &[&TitleRecord], k: usize) -> Vec<Count<String>> {
    tally(
        view.iter()
            .filter(|r| r.country != "Unknown")
            .flat_map(|r| r.countries())
            .map(str::to_string),
        k,
    )
}

pub fn top_genres(view: &[&TitleRecord], k: usize) -> Vec<Count<String>> {
    tally(view.iter().flat_map(|r| r.genres()).map(str::to_string), k)
}

/// Equal-width histogram of movie running times spanning `[min, max]`; the last
/// bin is closed on the right.
pub fn duration_histogram(view: &[&TitleRecord], bins: usize) -> Vec<Bin> {
    let minutes: Vec<f64> = view.iter().filter_map(|r| r.duration_minutes()).collect();
    let (Some(min), Some(max)) = (
        minutes.iter().copied().reduce(f64::min),
        minutes.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };

    let bins = bins.max(1);
    if max <= min {
        return vec![Bin { start: min, end: max, count: minutes.len() }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            start: min + width * i as f64,
            end: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for m in minutes {
        let idx = (((m - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

pub fn season_counts(view: &[&TitleRecord]) -> Vec<SeasonCount> {
    let mut counts: Vec<SeasonCount> = Vec::new();
    for seasons in view.iter().filter_map(|r| r.duration_seasons()) {
        match counts.iter_mut().find(|c| c.seasons == seasons) {
            Some(c) => c.count += 1,
            None => counts.push(SeasonCount { seasons, count: 1 }),
        }
    }
    counts.sort_by(|a, b| a.seasons.total_cmp(&b.seasons));
    counts
}

/// Most frequent description words, lower-cased, stopwords removed.
pub fn top_words(view: &[&TitleRecord], k: usize) -> Vec<Count<String>> {
    let stopwords: HashSet<&str> = STOPWORDS.iter().copied().collect();
    let words = view.iter().flat_map(|r| {
        r.description
            .split(|c: char| !c.is_alphabetic() && c != '\'')
            .map(|w| w.trim_matches('\'').to_lowercase())
            .collect::<Vec<_>>()
    });
    tally(
        words.filter(|w| w.chars().count() >= 3 && !stopwords.contains(w.as_str())),
        k,
    )
}

/// First `n` rows of the view, for the data table.
pub fn sample<'a>(view: &[&'a TitleRecord], n: usize) -> Vec<&'a TitleRecord> {
    view.iter().take(n).copied().collect()
}

/// Counts keys and returns the `k` most frequent, descending. Ties keep the
/// order in which keys were first seen.
fn tally<K, I>(keys: I, k: usize) -> Vec<Count<K>>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<Count<K>> = Vec::new();
    for key in keys {
        match index.get(&key) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push(Count { key, count: 1 });
            },
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(k);
    counts
}

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "can't", "cannot", "could", "couldn't", "did", "didn't", "do",
    "does", "doesn't", "doing", "don't", "down", "during", "each", "else", "ever", "few", "for",
    "from", "further", "get", "had", "hadn't", "has", "hasn't", "have", "haven't", "having", "he",
    "he'd", "he'll", "he's", "her", "here", "here's", "hers", "herself", "him", "himself", "his",
    "how", "how's", "however", "i", "i'd", "i'll", "i'm", "i've", "if", "in", "into", "is",
    "isn't", "it", "it's", "its", "itself", "just", "let's", "like", "me", "more", "most",
    "mustn't", "my", "myself", "no", "nor", "not", "of", "off", "on", "once", "only", "or",
    "other", "otherwise", "ought", "our", "ours", "ourselves", "out", "over", "own", "same",
    "shall", "shan't", "she", "she'd", "she'll", "she's", "should", "shouldn't", "since", "so",
    "some", "such", "than", "that", "that's", "the", "their", "theirs", "them", "themselves",
    "then", "there", "there's", "these", "they", "they'd", "they'll", "they're", "they've",
    "this", "those", "through", "to", "too", "under", "until", "up", "very", "was", "wasn't",
    "we", "we'd", "we'll", "we're", "we've", "were", "weren't", "what", "what's", "when",
    "when's", "where", "where's", "which", "while", "who", "who's", "whom", "why", "why's",
    "with", "won't", "would", "wouldn't", "you", "you'd", "you'll", "you're", "you've", "your",
    "yours", "yourself", "yourselves",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Runtime;

    fn movie(title: &str, minutes: f64, year_added: i16, country: &str, genres: &str) -> TitleRecord {
        TitleRecord {
            title: title.to_string(),
            content_type: ContentType::Movie,
            director: "Unknown".to_string(),
            cast: "Unknown".to_string(),
            country: country.to_string(),
            date_added: jiff::civil::date(year_added, 3, 1),
            year_added,
            month_added: 3,
            release_year: 2000,
            content_lag_years: year_added - 2000,
            rating: "R".to_string(),
            rating_group: RatingGroup::Adult,
            duration: Runtime::Minutes(minutes),
            listed_in: genres.to_string(),
            description: String::new(),
        }
    }

    fn show(title: &str, seasons: f64, year_added: i16) -> TitleRecord {
        TitleRecord {
            content_type: ContentType::TvShow,
            rating: "TV-14".to_string(),
            rating_group: RatingGroup::Teen,
            duration: Runtime::Seasons(seasons),
            ..movie(title, 0.0, year_added, "Unknown", "TV Dramas")
        }
    }

    #[test]
    fn empty_view_yields_empty_reports() {
        let view: Vec<&TitleRecord> = Vec::new();
        let dash = Dashboard::build(&view, &view, 10, 40);
        assert_eq!(dash.headline, Headline::default());
        assert!(dash.by_type.is_empty());
        assert!(dash.by_rating_group.is_empty());
        assert!(dash.additions_by_year.is_empty());
        assert!(dash.top_countries.is_empty());
        assert!(dash.top_genres.is_empty());
        assert!(dash.duration_histogram.is_empty());
        assert!(dash.season_counts.is_empty());
        assert!(dash.top_words.is_empty());
        assert!(sample(&view, 10).is_empty());
    }

    #[test]
    fn huge_top_k_does_not_overflow() {
        let rows = vec![movie("a", 90.0, 2019, "India", "Dramas")];
        let view: Vec<_> = rows.iter().collect();
        let dash = Dashboard::build(&view, &view, usize::MAX, 40);
        assert_eq!(dash.top_countries.len(), 1);
        assert_eq!(dash.top_genres.len(), 1);
    }

    #[test]
    fn headline_and_type_counts() {
        let rows = vec![movie("a", 90.0, 2019, "India", ""), show("b", 1.0, 2019), show("c", 2.0, 2020)];
        let view: Vec<_> = rows.iter().collect();
        assert_eq!(headline(&view), Headline { total: 3, movies: 1, tv_shows: 2 });
        assert_eq!(
            counts_by_type(&view),
            vec![
                Count { key: ContentType::TvShow, count: 2 },
                Count { key: ContentType::Movie, count: 1 },
            ]
        );
        assert_eq!(
            counts_by_rating_group(&view),
            vec![
                Count { key: RatingGroup::Teen, count: 2 },
                Count { key: RatingGroup::Adult, count: 1 },
            ]
        );
    }

    #[test]
    fn additions_by_year_zero_fills_missing_type() {
        let rows = vec![movie("a", 90.0, 2019, "", ""), movie("b", 90.0, 2019, "", ""), show("c", 2.0, 2021)];
        let view: Vec<_> = rows.iter().collect();
        assert_eq!(
            additions_by_year(&view),
            vec![
                YearRow { year: 2019, movies: 2, tv_shows: 0 },
                YearRow { year: 2021, movies: 0, tv_shows: 1 },
            ]
        );
    }

    #[test]
    fn countries_are_exploded_and_unknown_skipped() {
        let rows = vec![
            movie("a", 90.0, 2019, "India, United States", ""),
            movie("b", 90.0, 2019, "United States", ""),
            movie("c", 90.0, 2019, "Unknown", ""),
            movie("d", 90.0, 2019, "France", ""),
        ];
        let view: Vec<_> = rows.iter().collect();
        let top = top_countries(&view, 2);
        assert_eq!(
            top,
            vec![
                Count { key: "United States".to_string(), count: 2 },
                Count { key: "India".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn top_genres_breaks_ties_by_first_appearance() {
        let rows = vec![
            movie("a", 90.0, 2019, "", "Dramas, Comedies"),
            movie("b", 90.0, 2019, "", "Thrillers, Comedies"),
        ];
        let view: Vec<_> = rows.iter().collect();
        let keys: Vec<_> = top_genres(&view, 10).into_iter().map(|c| c.key).collect();
        assert_eq!(keys, vec!["Comedies", "Dramas", "Thrillers"]);
    }

    #[test]
    fn histogram_covers_every_movie() {
        let rows = vec![
            movie("a", 60.0, 2019, "", ""),
            movie("b", 90.0, 2019, "", ""),
            movie("c", 120.0, 2019, "", ""),
            show("d", 3.0, 2019),
        ];
        let view: Vec<_> = rows.iter().collect();
        let hist = duration_histogram(&view, 2);
        assert_eq!(hist.len(), 2);
        assert_eq!(hist[0].start, 60.0);
        assert_eq!(hist[1].end, 120.0);
        assert_eq!(hist.iter().map(|b| b.count).sum::<usize>(), 3);
        assert_eq!(hist[1].count, 2);

        let single = vec![movie("a", 75.0, 2019, "", "")];
        let view: Vec<_> = single.iter().collect();
        assert_eq!(duration_histogram(&view, 40), vec![Bin { start: 75.0, end: 75.0, count: 1 }]);
    }

    #[test]
    fn season_counts_are_sorted_by_season() {
        let rows = vec![show("a", 3.0, 2019), show("b", 1.0, 2019), show("c", 3.0, 2019)];
        let view: Vec<_> = rows.iter().collect();
        assert_eq!(
            season_counts(&view),
            vec![SeasonCount { seasons: 1.0, count: 1 }, SeasonCount { seasons: 3.0, count: 2 }]
        );
    }

    #[test]
    fn words_skip_stopwords_and_short_tokens() {
        let mut a = movie("a", 90.0, 2019, "", "");
        a.description = "A detective hunts a killer. The detective's partner is a killer too!".to_string();
        let rows = vec![a];
        let view: Vec<_> = rows.iter().collect();
        let words = top_words(&view, 3);
        assert_eq!(words[0], Count { key: "killer".to_string(), count: 2 });
        assert!(words.iter().all(|w| w.key != "the" && w.key != "a"));
    }

    #[test]
    fn sample_is_clamped() {
        let rows = vec![movie("a", 90.0, 2019, "", ""), movie("b", 90.0, 2019, "", "")];
        let view: Vec<_> = rows.iter().collect();
        assert_eq!(sample(&view, 10).len(), 2);
        assert_eq!(sample(&view, 1)[0].title, "a");
    }
}
