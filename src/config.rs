use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub catalog_path: PathBuf,
    pub default_countries: Vec<String>,
    pub top_k: usize,
    pub histogram_bins: usize,
    pub sample_rows: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let catalog_path = std::env::var("CATALOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("netflix_titles.csv"));

        let default_countries = parse_countries(
            &std::env::var("DEFAULT_COUNTRIES").unwrap_or_else(|_| "United States".to_string()),
        );

        let top_k: usize = std::env::var("TOP_K").ok().and_then(|s| s.parse().ok()).unwrap_or(10);

        let histogram_bins: usize =
            std::env::var("HISTOGRAM_BINS").ok().and_then(|s| s.parse().ok()).unwrap_or(40);

        let sample_rows: usize =
            std::env::var("SAMPLE_ROWS").ok().and_then(|s| s.parse().ok()).unwrap_or(10);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            catalog_path,
            default_countries,
            top_k: top_k.max(1),
            histogram_bins: histogram_bins.max(1),
            sample_rows,
        })
    }
}

fn parse_countries(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::parse_countries;

    #[test]
    fn default_countries_are_comma_separated() {
        assert_eq!(parse_countries("United States, India,,"), vec!["United States", "India"]);
        assert!(parse_countries("").is_empty());
    }
}
