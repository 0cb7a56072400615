//! Career catalog: the context provider behind advice requests.

pub mod ranking;

use crate::state::Database;
use crate::types::{CareerCatalogFile, CareerRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Retrieves career records relevant to a question. May return nothing.
#[async_trait]
pub trait CareerSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<CareerRecord>>;
}

/// No retrieval: every question is answered without career context.
pub struct NoContext;

#[async_trait]
impl CareerSearch for NoContext {
    async fn search(&self, _query: &str) -> Result<Vec<CareerRecord>> {
        Ok(Vec::new())
    }
}

/// Career search over the SQLite catalog.
#[derive(Clone)]
pub struct CareerStore {
    db: Arc<Mutex<Database>>,
    limit: usize,
}

impl CareerStore {
    pub fn new(db: Arc<Mutex<Database>>, limit: usize) -> Self {
        Self { db, limit }
    }
}

#[async_trait]
impl CareerSearch for CareerStore {
    async fn search(&self, query: &str) -> Result<Vec<CareerRecord>> {
        let careers = {
            let db_lock = self.db.lock().await;
            db_lock.all_careers()?
        };

        let total = careers.len();
        let ranked = ranking::rank(query, careers, self.limit);
        for (i, hit) in ranked.iter().enumerate() {
            debug!(
                "[{}] {} (score: {:.2})",
                i + 1,
                hit.record.title,
                hit.score
            );
        }
        info!("Career search: {} of {} careers matched", ranked.len(), total);

        Ok(ranked.into_iter().map(|s| s.record).collect())
    }
}

/// Summary of an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub created: usize,
    pub skipped: usize,
}

/// Insert careers, skipping ids that already exist. Records without an id
/// get one derived from their title.
pub fn import_careers(db: &Database, careers: &[CareerRecord]) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    for career in careers {
        let mut career = career.clone();
        if career.id.trim().is_empty() {
            career.id = slug(&career.title);
        }
        if db.insert_career(&career)? {
            info!("Created career: {}", career.title);
            report.created += 1;
        } else {
            debug!("Skipped (exists): {}", career.title);
            report.skipped += 1;
        }
    }
    Ok(report)
}

/// Career catalog bundled with the binary and loaded by `init`.
pub const SAMPLE_CATALOG: &str = include_str!("../../data/careers.json");

pub fn sample_careers() -> Result<Vec<CareerRecord>> {
    let file: CareerCatalogFile =
        serde_json::from_str(SAMPLE_CATALOG).context("Failed to parse bundled career catalog")?;
    Ok(file.careers)
}

/// Read a `{ "careers": [...] }` JSON file and import it.
pub fn import_careers_file(db: &Database, path: &Path) -> Result<ImportReport> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read career file {}", path.display()))?;
    let file: CareerCatalogFile = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse career file {}", path.display()))?;
    import_careers(db, &file.careers)
}

fn slug(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
