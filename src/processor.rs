use std::collections::HashSet;

use jiff::civil::Date;
use tracing::{debug, info, warn};

use crate::models::{
    CleanedTable, CleaningReport, ContentType, RatingGroup, RawTitle, Runtime, TitleRecord,
};

const UNKNOWN: &str = "Unknown";

/// Runs the cleaning and feature pipeline over raw catalog rows.
///
/// Every step only removes rows or adds derived fields; row-level defects are
/// counted in the returned report and never abort the run.
pub fn clean(raw: Vec<RawTitle>) -> CleanedTable {
    let mut report = CleaningReport { input_rows: raw.len(), ..Default::default() };

    let rows = dedup(raw);
    report.duplicates = report.input_rows - rows.len();
    debug!(rows = rows.len(), dropped = report.duplicates, "deduplicated on title and type");

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(record) = clean_row(row, &mut report) {
            out.push(record);
        }
    }

    report.output_rows = out.len();
    info!(
        input = report.input_rows,
        output = report.output_rows,
        dropped = report.dropped(),
        duplicates = report.duplicates,
        missing_required = report.missing_required,
        unknown_type = report.unknown_type,
        bad_release_year = report.bad_release_year,
        bad_date = report.bad_date,
        added_before_release = report.added_before_release,
        malformed_duration = report.malformed_duration,
        "catalog cleaned"
    );

    CleanedTable { rows: out, report }
}

/// Keys on the parsed content type so padded spellings of the same type
/// collapse; unrecognised types fall back to the raw cell.
fn dedup(raw: Vec<RawTitle>) -> Vec<RawTitle> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter(|r| {
            let kind = r
                .content_type
                .as_deref()
                .and_then(ContentType::from_label)
                .ok_or_else(|| r.content_type.clone());
            seen.insert((r.title.clone(), kind))
        })
        .collect()
}

fn clean_row(row: RawTitle, report: &mut CleaningReport) -> Option<TitleRecord> {
    let director = impute(row.director);
    let cast = impute(row.cast);
    let country = impute(row.country);

    let (Some(date_added), Some(rating), Some(duration)) = (row.date_added, row.rating, row.duration)
    else {
        report.missing_required += 1;
        return None;
    };

    let Some(content_type) = row.content_type.as_deref().and_then(ContentType::from_label) else {
        report.unknown_type += 1;
        return None;
    };

    let Some(release_year) = row.release_year.as_deref().and_then(parse_year) else {
        report.bad_release_year += 1;
        return None;
    };

    let Some(date_added) = parse_date_added(&date_added) else {
        report.bad_date += 1;
        return None;
    };

    let year_added = date_added.year();
    if year_added < release_year {
        report.added_before_release += 1;
        return None;
    }

    let rating_group = RatingGroup::from_rating(&rating);
    let title = row.title.unwrap_or_default();

    let Some(duration) = parse_runtime(content_type, &duration) else {
        warn!(title = %title, duration = %duration, "malformed duration, dropping row");
        report.malformed_duration += 1;
        return None;
    };

    Some(TitleRecord {
        title,
        content_type,
        director,
        cast,
        country,
        date_added,
        year_added,
        month_added: date_added.month(),
        release_year,
        content_lag_years: year_added - release_year,
        rating: rating.trim().to_string(),
        rating_group,
        duration,
        listed_in: row.listed_in.unwrap_or_default(),
        description: row.description.unwrap_or_default(),
    })
}

fn impute(value: Option<String>) -> String {
    value.filter(|v| !v.trim().is_empty()).unwrap_or_else(|| UNKNOWN.to_string())
}

fn parse_year(raw: &str) -> Option<i16> {
    let raw = raw.trim();
    // Some exports write integer columns as floats ("2019.0").
    let raw = raw.strip_suffix(".0").unwrap_or(raw);
    raw.parse().ok()
}

/// Parses "Month D, YYYY" (full or abbreviated English month name) or an ISO
/// "YYYY-MM-DD" date. Surrounding whitespace is ignored.
pub fn parse_date_added(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    if let Ok(date) = raw.parse::<Date>() {
        return Some(date);
    }

    let (month_day, year) = raw.rsplit_once(',')?;
    let (month, day) = month_day.trim().split_once(char::is_whitespace)?;
    let month = month_number(month)?;
    let day: i8 = day.trim().parse().ok()?;
    let year: i16 = year.trim().parse().ok()?;
    Date::new(year, month, day).ok()
}

fn month_number(name: &str) -> Option<i8> {
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    let name = name.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == name || (name.len() == 3 && m.starts_with(name.as_str())))
        .map(|i| i as i8 + 1)
}

/// Splits the free-text duration by content type: "<N> min" for movies,
/// "<N> Season(s)" for shows.
pub fn parse_runtime(content_type: ContentType, raw: &str) -> Option<Runtime> {
    let raw = raw.trim();
    match content_type {
        ContentType::Movie => parse_amount(raw.strip_suffix(" min")?).map(Runtime::Minutes),
        ContentType::TvShow => {
            let n = raw.strip_suffix(" Seasons").or_else(|| raw.strip_suffix(" Season"))?;
            parse_amount(n).map(Runtime::Seasons)
        },
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite() && *n >= 0.0)
}
