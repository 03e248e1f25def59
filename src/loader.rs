use std::{io::Read, path::Path};

use csv::ReaderBuilder;
use tracing::debug;

use crate::{error::LoadError, models::RawTitle};

/// Reads the whole catalog file into memory. The bytes double as the cache key.
pub fn read_catalog_bytes(path: &Path) -> Result<Vec<u8>, LoadError> {
    debug!(path = %path.display(), "reading catalog");
    std::fs::read(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound { path: path.to_path_buf() },
        _ => LoadError::Io { path: path.to_path_buf(), source },
    })
}

pub fn parse_catalog<R: Read>(reader: R) -> Result<Vec<RawTitle>, LoadError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(reader);

    let mut out = Vec::new();
    for record in rdr.deserialize::<RawTitle>() {
        out.push(blank_to_none(record?));
    }

    debug!(rows = out.len(), "parsed catalog");
    Ok(out)
}

fn blank_to_none(mut raw: RawTitle) -> RawTitle {
    for field in [
        &mut raw.title,
        &mut raw.content_type,
        &mut raw.director,
        &mut raw.cast,
        &mut raw.country,
        &mut raw.date_added,
        &mut raw.release_year,
        &mut raw.rating,
        &mut raw.duration,
        &mut raw.listed_in,
        &mut raw.description,
    ] {
        if field.as_deref().is_some_and(|s| s.trim().is_empty()) {
            *field = None;
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = "\
show_id,type,title,director,cast,country,date_added,release_year,rating,duration,listed_in,description
s1,Movie,Dick Johnson Is Dead,Kirsten Johnson,,United States,\"September 25, 2021\",2020,PG-13,90 min,Documentaries,\"As her father nears the end of his life, filmmaker Kirsten Johnson stages his death.\"
s2,TV Show,Blood & Water,,\"Ama Qamata, Khosi Ngema\",South Africa,\"September 24, 2021\",2021,TV-MA,2 Seasons,\"International TV Shows, TV Dramas\",After crossing paths at a party...
";

    #[test]
    fn parses_rows_by_header_name() {
        let rows = parse_catalog(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        let movie = &rows[0];
        assert_eq!(movie.title.as_deref(), Some("Dick Johnson Is Dead"));
        assert_eq!(movie.content_type.as_deref(), Some("Movie"));
        assert_eq!(movie.cast, None);
        assert_eq!(movie.date_added.as_deref(), Some("September 25, 2021"));

        let show = &rows[1];
        assert_eq!(show.director, None);
        assert_eq!(show.cast.as_deref(), Some("Ama Qamata, Khosi Ngema"));
        assert_eq!(show.listed_in.as_deref(), Some("International TV Shows, TV Dramas"));
    }

    #[test]
    fn whitespace_only_cells_are_absent() {
        let csv = "title,type,country,rating\nX,Movie,   ,PG\n";
        let rows = parse_catalog(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].country, None);
        assert_eq!(rows[0].duration, None);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_catalog_bytes(&dir.path().join("netflix_titles.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }), "{err:?}");
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let rows = parse_catalog(read_catalog_bytes(file.path()).unwrap().as_slice()).unwrap();
        assert_eq!(rows.len(), 2);
    }
}
