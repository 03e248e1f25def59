use std::fmt::Display;

use maud::{DOCTYPE, Markup, html};

use crate::{
    aggregate::{Count, Dashboard},
    filter::{FilterOptions, FilterSpec},
    models::{CleaningReport, TitleRecord},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const RED: &str = "#E50914";
const BLACK: &str = "#221f1f";

/// Selection echoed back into the form and the JSON links.
pub struct Selection<'a> {
    pub spec: &'a FilterSpec,
    pub genre: Option<&'a str>,
    pub rows: usize,
}

pub fn dashboard_page(
    options: &FilterOptions,
    selection: &Selection<'_>,
    dash: &Dashboard,
    sample: &[&TitleRecord],
    report: &CleaningReport,
) -> String {
    let query = selection_query(selection);

    page(
        "Catalog Dashboard",
        html! {
            div class="min-h-screen bg-gray-50 flex" {
                aside class="w-80 shrink-0 bg-white shadow p-6 space-y-6" {
                    h2 class="text-lg font-semibold text-gray-900" { "Filters" }
                    (filter_form(options, selection))
                    p class="text-xs text-gray-500" {
                        (report.output_rows) " of " (report.input_rows) " rows kept after cleaning"
                    }
                }

                main class="flex-1 px-8 py-10 space-y-10" {
                    div class="flex items-start justify-between gap-6" {
                        h1 class="text-3xl font-bold text-gray-900" { "Catalog Dashboard" }
                        div class="text-sm space-x-4" {
                            a class="text-blue-600 hover:text-blue-800" href=(format!("/api/titles?{query}")) { "Titles JSON" }
                            a class="text-blue-600 hover:text-blue-800" href=(format!("/api/summary?{query}")) { "Summary JSON" }
                        }
                    }

                    section class="grid gap-4 md:grid-cols-3" {
                        (metric("Total titles", dash.headline.total))
                        (metric("Movies", dash.headline.movies))
                        (metric("TV shows", dash.headline.tv_shows))
                    }

                    section class="grid gap-6 md:grid-cols-2" {
                        (card("Movies vs. TV shows", bars(&labelled(&dash.by_type), RED)))
                        (card("Audience segments", bars(&labelled(&dash.by_rating_group), RED)))
                    }

                    (card("Titles added per year", additions_table(dash)))

                    section class="grid gap-6 md:grid-cols-2" {
                        (card("Top producing countries", bars(&labelled(&dash.top_countries), RED)))
                        (card("Most common genres", bars(&labelled(&dash.top_genres), RED)))
                    }

                    section class="grid gap-6 md:grid-cols-2" {
                        (card("Movie running time (minutes)", bars(&histogram_rows(dash), RED)))
                        (card("TV shows by number of seasons", html! {
                            @if dash.season_counts.is_empty() {
                                p class="text-sm text-gray-500" { "No TV shows match the selected filters." }
                            } @else {
                                (bars(&dash.season_counts.iter().map(|s| (s.seasons.to_string(), s.count)).collect::<Vec<_>>(), BLACK))
                            }
                        }))
                    }

                    (card(&format!("Description words: {}", selection.genre.unwrap_or("All genres")), html! {
                        @if dash.top_words.is_empty() {
                            p class="text-sm text-gray-500" { "No descriptions available for this genre with the current filters." }
                        } @else {
                            div class="flex flex-wrap gap-2" {
                                @for w in &dash.top_words {
                                    span class="rounded bg-red-50 px-2 py-1 text-sm text-red-800" { (w.key) " " span class="text-red-400" { (w.count) } }
                                }
                            }
                        }
                    }))

                    (card("Filtered titles", sample_table(sample)))
                }
            }
        },
    )
}

pub fn no_data_page(message: String) -> String {
    page(
        "No data",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "No data to display" }
                        p class="mt-4 text-gray-700" { (message) }
                        p class="mt-2 text-sm text-gray-500" { "Place the catalog CSV at the configured CATALOG_PATH and reload." }
                    }
                }
            }
        },
    )
}

pub fn error_page(message: String) -> String {
    page(
        "Error",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Error" }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}

fn filter_form(options: &FilterOptions, selection: &Selection<'_>) -> Markup {
    let spec = selection.spec;
    html! {
        form class="space-y-5" method="get" action="/" {
            input type="hidden" name="applied" value="1";

            fieldset {
                legend class="text-sm font-medium text-gray-700" { "Content type" }
                @for t in &options.content_types {
                    label class="mt-1 flex items-center gap-2 text-sm" {
                        input type="checkbox" name="type" value=(t.label()) checked[spec.content_types.contains(t)];
                        (t.label())
                    }
                }
            }

            fieldset {
                legend class="text-sm font-medium text-gray-700" { "Rating" }
                @for g in &options.rating_groups {
                    label class="mt-1 flex items-center gap-2 text-sm" {
                        input type="checkbox" name="rating" value=(g.label()) checked[spec.rating_groups.contains(g)];
                        (g.label())
                    }
                }
            }

            div {
                label class="block text-sm font-medium text-gray-700" for="country" { "Production country" }
                select class="mt-2 w-full rounded-md border border-gray-300 px-2 py-1 text-sm" name="country" id="country" multiple size="8" {
                    @for c in &options.countries {
                        option value=(c) selected[spec.countries.contains(c)] { (c) }
                    }
                }
            }

            div {
                label class="block text-sm font-medium text-gray-700" for="genre" { "Genre for description words" }
                select class="mt-2 w-full rounded-md border border-gray-300 px-2 py-1 text-sm" name="genre" id="genre" {
                    option value="" selected[selection.genre.is_none()] { "All" }
                    @for g in &options.genres {
                        option value=(g) selected[selection.genre == Some(g.as_str())] { (g) }
                    }
                }
            }

            div class="grid grid-cols-2 gap-2" {
                div {
                    label class="block text-sm font-medium text-gray-700" for="year_min" { "Released from" }
                    input class="mt-2 w-full rounded-md border border-gray-300 px-2 py-1 text-sm" type="number" name="year_min" id="year_min"
                        min=(options.release_years.start()) max=(options.release_years.end()) value=(spec.release_years.start());
                }
                div {
                    label class="block text-sm font-medium text-gray-700" for="year_max" { "to" }
                    input class="mt-2 w-full rounded-md border border-gray-300 px-2 py-1 text-sm" type="number" name="year_max" id="year_max"
                        min=(options.release_years.start()) max=(options.release_years.end()) value=(spec.release_years.end());
                }
            }

            div {
                label class="block text-sm font-medium text-gray-700" for="rows" { "Rows to show" }
                input class="mt-2 w-full rounded-md border border-gray-300 px-2 py-1 text-sm" type="number" name="rows" id="rows" min="5" step="5" value=(selection.rows);
            }

            button class="w-full rounded-md bg-red-600 px-4 py-2 font-semibold text-white hover:bg-red-700" type="submit" { "Apply" }
            a class="block text-center text-sm text-gray-500 hover:text-gray-700" href="/" { "Reset" }
        }
    }
}

fn metric(label: &str, value: usize) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6" {
            p class="text-sm text-gray-500" { (label) }
            p class="mt-1 text-3xl font-semibold text-gray-900" { (value) }
        }
    }
}

fn card(title: &str, inner: Markup) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6" {
            h2 class="text-lg font-semibold text-gray-900" { (title) }
            div class="mt-4" { (inner) }
        }
    }
}

fn bars(rows: &[(String, usize)], color: &str) -> Markup {
    let max = rows.iter().map(|(_, n)| *n).max().unwrap_or(0).max(1);
    html! {
        @if rows.is_empty() {
            p class="text-sm text-gray-500" { "No titles match the selected filters." }
        } @else {
            ul class="space-y-1" {
                @for (label, count) in rows {
                    li class="flex items-center gap-3 text-sm" {
                        span class="w-40 shrink-0 truncate text-gray-700" title=(label) { (label) }
                        span class="h-3 rounded" style=(format!("width: {}%; background: {color}", count * 100 / max)) {}
                        span class="text-gray-500" { (count) }
                    }
                }
            }
        }
    }
}

fn labelled<K: Display>(counts: &[Count<K>]) -> Vec<(String, usize)> {
    counts.iter().map(|c| (c.key.to_string(), c.count)).collect()
}

fn histogram_rows(dash: &Dashboard) -> Vec<(String, usize)> {
    dash.duration_histogram
        .iter()
        .map(|b| (format!("{:.0}–{:.0}", b.start, b.end), b.count))
        .collect()
}

fn additions_table(dash: &Dashboard) -> Markup {
    html! {
        @if dash.additions_by_year.is_empty() {
            p class="text-sm text-gray-500" { "No titles match the selected filters." }
        } @else {
            table class="w-full text-sm" {
                thead {
                    tr class="text-left text-gray-500" { th { "Year added" } th { "Movies" } th { "TV shows" } }
                }
                tbody {
                    @for row in &dash.additions_by_year {
                        tr class="border-t border-gray-100" {
                            td { (row.year) }
                            td { (row.movies) }
                            td { (row.tv_shows) }
                        }
                    }
                }
            }
        }
    }
}

fn sample_table(sample: &[&TitleRecord]) -> Markup {
    html! {
        @if sample.is_empty() {
            p class="text-sm text-gray-500" { "No titles match the selected filters. Adjust the filters and try again." }
        } @else {
            div class="overflow-x-auto" {
                table class="w-full text-sm" {
                    thead {
                        tr class="text-left text-gray-500" {
                            th { "Title" } th { "Type" } th { "Country" } th { "Added" }
                            th { "Released" } th { "Rating" } th { "Duration" } th { "Genres" }
                        }
                    }
                    tbody {
                        @for r in sample {
                            tr class="border-t border-gray-100 align-top" {
                                td class="font-medium text-gray-900" { (r.title) }
                                td { (r.content_type.label()) }
                                td { (r.country) }
                                td { (r.date_added.strftime("%Y-%m-%d").to_string()) }
                                td { (r.release_year) }
                                td { (r.rating) " · " (r.rating_group.label()) }
                                td { (format_duration(r)) }
                                td { (r.listed_in) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn format_duration(r: &TitleRecord) -> String {
    match (r.duration_minutes(), r.duration_seasons()) {
        (Some(m), _) => format!("{m} min"),
        (_, Some(s)) if s == 1.0 => "1 season".to_string(),
        (_, Some(s)) => format!("{s} seasons"),
        _ => String::new(),
    }
}

/// Query string reproducing the current selection, for links to the JSON views.
pub fn selection_query(selection: &Selection<'_>) -> String {
    let spec = selection.spec;
    let mut parts = vec!["applied=1".to_string()];
    parts.extend(spec.content_types.iter().map(|t| format!("type={}", urlencoding::encode(t.label()))));
    parts.extend(spec.rating_groups.iter().map(|g| format!("rating={}", urlencoding::encode(g.label()))));
    parts.extend(spec.countries.iter().map(|c| format!("country={}", urlencoding::encode(c))));
    parts.push(format!("year_min={}", spec.release_years.start()));
    parts.push(format!("year_max={}", spec.release_years.end()));
    if let Some(genre) = selection.genre {
        parts.push(format!("genre={}", urlencoding::encode(genre)));
    }
    parts.push(format!("rows={}", selection.rows));
    parts.join("&")
}
