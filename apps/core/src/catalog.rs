use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;
use crate::model::{
    ArticleRecord, ArticleSummary, PromptRecord, PromptSummary, PublishStatus,
};
use crate::source::{ArticleQuery, CatalogSource, PromptOrder, PromptQuery, SourceError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("seed error: {0}")]
    Seed(String),
    #[error("catalog connection lock poisoned")]
    LockPoisoned,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS prompts (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    body TEXT NOT NULL DEFAULT '',
    code TEXT,
    image_url TEXT,
    status TEXT NOT NULL,
    views INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS prompts_code ON prompts(code);
CREATE TABLE IF NOT EXISTS articles (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    excerpt TEXT NOT NULL DEFAULT '',
    content TEXT NOT NULL DEFAULT '',
    image_url TEXT,
    status TEXT NOT NULL
);
";

pub fn open_memory() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    ensure_schema(&conn)?;
    Ok(conn)
}

pub fn open_file(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

pub fn open_from_config(config: &Config) -> Result<Connection, StoreError> {
    open_file(&config.catalog_db_path)
}

fn ensure_schema(db: &Connection) -> Result<(), StoreError> {
    db.execute_batch(SCHEMA)?;
    Ok(())
}

pub fn upsert_prompt(db: &Connection, prompt: &PromptRecord) -> Result<(), StoreError> {
    db.execute(
        "INSERT INTO prompts (id, title, slug, description, body, code, image_url, status, views)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
            title=excluded.title, slug=excluded.slug, description=excluded.description,
            body=excluded.body, code=excluded.code, image_url=excluded.image_url,
            status=excluded.status, views=excluded.views",
        params![
            prompt.id,
            prompt.title,
            prompt.slug,
            prompt.description,
            prompt.body,
            prompt.code,
            prompt.image_url,
            prompt.status.as_str(),
            i64::try_from(prompt.views).unwrap_or(i64::MAX),
        ],
    )?;
    Ok(())
}

pub fn upsert_article(db: &Connection, article: &ArticleRecord) -> Result<(), StoreError> {
    db.execute(
        "INSERT INTO articles (id, title, slug, excerpt, content, image_url, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
            title=excluded.title, slug=excluded.slug, excerpt=excluded.excerpt,
            content=excluded.content, image_url=excluded.image_url, status=excluded.status",
        params![
            article.id,
            article.title,
            article.slug,
            article.excerpt,
            article.content,
            article.image_url,
            article.status.as_str(),
        ],
    )?;
    Ok(())
}

fn read_status(row: &Row<'_>, index: usize) -> Result<PublishStatus, rusqlite::Error> {
    let raw: String = row.get(index)?;
    PublishStatus::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Text,
            format!("unknown status '{raw}'").into(),
        )
    })
}

fn prompt_summary(row: &Row<'_>) -> Result<PromptSummary, rusqlite::Error> {
    Ok(PromptSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        image_url: row.get(3)?,
        status: read_status(row, 4)?,
    })
}

fn article_summary(row: &Row<'_>) -> Result<ArticleSummary, rusqlite::Error> {
    Ok(ArticleSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        image_url: row.get(3)?,
        status: read_status(row, 4)?,
    })
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

pub fn find_prompts(db: &Connection, query: &PromptQuery) -> Result<Vec<PromptSummary>, StoreError> {
    let order_by = match query.order {
        PromptOrder::Insertion => "rowid ASC",
        PromptOrder::Popularity => "views DESC, rowid ASC",
    };
    let sql = format!(
        "SELECT id, title, slug, image_url, status FROM prompts
         WHERE status = 'published'
           AND (title LIKE ?1 ESCAPE '\\' OR slug LIKE ?1 ESCAPE '\\'
                OR description LIKE ?1 ESCAPE '\\' OR body LIKE ?1 ESCAPE '\\')
         ORDER BY {order_by}
         LIMIT ?2"
    );
    let mut stmt = db.prepare(&sql)?;
    let rows = stmt.query_map(params![query.pattern, sql_limit(query.limit)], prompt_summary)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn find_articles(
    db: &Connection,
    query: &ArticleQuery,
) -> Result<Vec<ArticleSummary>, StoreError> {
    let mut stmt = db.prepare(
        "SELECT id, title, slug, image_url, status FROM articles
         WHERE status = 'published'
           AND (title LIKE ?1 ESCAPE '\\' OR slug LIKE ?1 ESCAPE '\\'
                OR excerpt LIKE ?1 ESCAPE '\\' OR content LIKE ?1 ESCAPE '\\')
         ORDER BY rowid ASC
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![query.pattern, sql_limit(query.limit)], article_summary)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn find_prompt_by_code(
    db: &Connection,
    code: &str,
) -> Result<Option<PromptSummary>, StoreError> {
    let mut stmt = db.prepare(
        "SELECT id, title, slug, image_url, status FROM prompts
         WHERE status = 'published' AND code = ?1
         ORDER BY rowid ASC
         LIMIT 1",
    )?;
    Ok(stmt.query_row(params![code], prompt_summary).optional()?)
}

pub fn count_rows(db: &Connection) -> Result<(usize, usize), StoreError> {
    let prompts: i64 = db.query_row("SELECT COUNT(*) FROM prompts", [], |row| row.get(0))?;
    let articles: i64 = db.query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
    Ok((
        usize::try_from(prompts).unwrap_or(0),
        usize::try_from(articles).unwrap_or(0),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub prompts: Vec<PromptRecord>,
    #[serde(default)]
    pub articles: Vec<ArticleRecord>,
}

/// Parses a JSON5 seed document and upserts every record in one transaction.
pub fn import_seed(db: &mut Connection, raw: &str) -> Result<(usize, usize), StoreError> {
    let seed: SeedFile = json5::from_str(raw).map_err(|e| StoreError::Seed(e.to_string()))?;
    let tx = db.transaction()?;
    for prompt in &seed.prompts {
        upsert_prompt(&tx, prompt)?;
    }
    for article in &seed.articles {
        upsert_article(&tx, article)?;
    }
    tx.commit()?;
    Ok((seed.prompts.len(), seed.articles.len()))
}

pub fn import_seed_file(db: &mut Connection, path: &Path) -> Result<(usize, usize), StoreError> {
    let raw = std::fs::read_to_string(path)?;
    import_seed(db, &raw)
}

/// [`CatalogSource`] over a shared SQLite connection. Reads run on the
/// blocking pool.
#[derive(Clone)]
pub struct SqliteCatalog {
    db: Arc<Mutex<Connection>>,
}

impl SqliteCatalog {
    pub fn new(db: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut db = self.db.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&mut db)
    }

    async fn read<T, F>(&self, f: F) -> Result<T, SourceError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let db = db.lock().map_err(|_| StoreError::LockPoisoned)?;
            f(&db)
        })
        .await
        .map_err(|e| SourceError::Join(e.to_string()))?
        .map_err(SourceError::from)
    }
}

#[async_trait]
impl CatalogSource for SqliteCatalog {
    async fn find_prompts(&self, query: &PromptQuery) -> Result<Vec<PromptSummary>, SourceError> {
        let query = query.clone();
        self.read(move |db| find_prompts(db, &query)).await
    }

    async fn find_articles(
        &self,
        query: &ArticleQuery,
    ) -> Result<Vec<ArticleSummary>, SourceError> {
        let query = query.clone();
        self.read(move |db| find_articles(db, &query)).await
    }

    async fn find_prompt_by_code(&self, code: &str) -> Result<Option<PromptSummary>, SourceError> {
        let code = code.to_string();
        self.read(move |db| find_prompt_by_code(db, &code)).await
    }
}
