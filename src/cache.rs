use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{error::LoadError, loader, models::CleanedTable, processor};

struct CachedTable {
    digest: String,
    table: Arc<CleanedTable>,
}

/// Memoizes the cleaned table by the content of the source file. The file is
/// re-read on every lookup; the pipeline only re-runs when its bytes change.
#[derive(Clone)]
pub struct CatalogCache {
    path: PathBuf,
    slot: Arc<RwLock<Option<CachedTable>>>,
}

impl CatalogCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), slot: Arc::new(RwLock::new(None)) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> Result<Arc<CleanedTable>, LoadError> {
        let bytes = loader::read_catalog_bytes(&self.path)?;
        let digest = hex::encode(Sha256::digest(&bytes));

        {
            let slot = self.slot.read().map_err(|_| LoadError::Poisoned)?;
            if let Some(cached) = slot.as_ref().filter(|c| c.digest == digest) {
                debug!(digest = %digest, "using cached catalog");
                return Ok(cached.table.clone());
            }
        }

        debug!(digest = %digest, path = %self.path.display(), "catalog changed, cleaning");
        let raw = loader::parse_catalog(bytes.as_slice())?;
        let table = Arc::new(processor::clean(raw));

        let mut slot = self.slot.write().map_err(|_| LoadError::Poisoned)?;
        *slot = Some(CachedTable { digest, table: table.clone() });

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "show_id,type,title,director,cast,country,date_added,release_year,rating,duration,listed_in,description\n";

    fn write(path: &Path, rows: &[&str]) {
        let mut body = HEADER.to_string();
        for row in rows {
            body.push_str(row);
            body.push('\n');
        }
        std::fs::write(path, body).unwrap();
    }

    #[test]
    fn unchanged_file_reuses_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("titles.csv");
        write(&path, &["s1,Movie,A,,,India,\"May 1, 2020\",2019,R,100 min,Dramas,x"]);

        let cache = CatalogCache::new(&path);
        let first = cache.table().unwrap();
        let second = cache.table().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn changed_file_is_cleaned_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("titles.csv");
        write(&path, &["s1,Movie,A,,,India,\"May 1, 2020\",2019,R,100 min,Dramas,x"]);

        let cache = CatalogCache::new(&path);
        let first = cache.table().unwrap();

        write(
            &path,
            &[
                "s1,Movie,A,,,India,\"May 1, 2020\",2019,R,100 min,Dramas,x",
                "s2,TV Show,B,,,,\"May 1, 2021\",2020,TV-Y,1 Season,Kids' TV,y",
            ],
        );
        let second = cache.table().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn missing_file_reports_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CatalogCache::new(dir.path().join("absent.csv"));
        assert!(matches!(cache.table(), Err(LoadError::NotFound { .. })));
    }
}
