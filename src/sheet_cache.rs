//! Conditional-GET cache for published sheet CSVs.
//!
//! The publish endpoint honours `If-None-Match` / `If-Modified-Since`, so an
//! unchanged sheet comes back as a bodiless 304 and the copy kept on disk is
//! reused. A missing, unreadable or older-version cache file is treated as
//! empty.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use once_cell::sync::{Lazy, OnceCell};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ETAG, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};

const FORMAT_VERSION: u32 = 2;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("roster_terminal/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();
static SHARED: Lazy<Mutex<SheetCache>> =
    Lazy::new(|| Mutex::new(SheetCache::open(default_cache_file())));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSheet {
    pub body: String,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    sheets: HashMap<String, CachedSheet>,
}

/// Sheet bodies keyed by URL, backed by one JSON file.
#[derive(Debug)]
pub struct SheetCache {
    path: Option<PathBuf>,
    sheets: HashMap<String, CachedSheet>,
}

impl SheetCache {
    /// Loads `path` if it holds a cache of the current format. `None` keeps
    /// everything in memory.
    pub fn open(path: Option<PathBuf>) -> Self {
        let sheets = path
            .as_deref()
            .and_then(read_cache_file)
            .map(|file| file.sheets)
            .unwrap_or_default();
        Self { path, sheets }
    }

    pub fn get(&self, url: &str) -> Option<&CachedSheet> {
        self.sheets.get(url)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn insert(&mut self, url: &str, sheet: CachedSheet) -> Result<()> {
        self.sheets.insert(url.to_string(), sheet);
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("create cache dir {}", dir.display()))?;
        }
        let file = CacheFile {
            version: FORMAT_VERSION,
            sheets: self.sheets.clone(),
        };
        let json = serde_json::to_string(&file).context("serialize sheet cache")?;
        let staged = path.with_extension("json.tmp");
        fs::write(&staged, json).context("write sheet cache")?;
        fs::rename(&staged, path).context("replace sheet cache")?;
        Ok(())
    }
}

fn read_cache_file(path: &Path) -> Option<CacheFile> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str::<CacheFile>(&raw)
        .ok()
        .filter(|file| file.version == FORMAT_VERSION)
}

fn default_cache_file() -> Option<PathBuf> {
    let non_blank = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
    let base = match non_blank("XDG_CACHE_HOME") {
        Some(xdg) => PathBuf::from(xdg),
        None => PathBuf::from(non_blank("HOME")?).join(".cache"),
    };
    Some(base.join("roster_terminal").join("sheets.json"))
}

fn client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")
    })
}

/// GETs `url`, revalidating against the shared on-disk cache.
pub fn fetch_sheet_text(url: &str) -> Result<String> {
    let known = SHARED
        .lock()
        .expect("sheet cache lock poisoned")
        .get(url)
        .cloned();

    let mut req = client()?.get(url);
    if let Some(sheet) = &known {
        if let Some(etag) = &sheet.etag {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(stamp) = &sheet.last_modified {
            req = req.header(IF_MODIFIED_SINCE, stamp);
        }
    }

    let resp = req.send().with_context(|| format!("GET {url}"))?;
    if resp.status() == StatusCode::NOT_MODIFIED {
        return match known {
            Some(sheet) => Ok(sheet.body),
            None => bail!("304 for {url} with nothing cached"),
        };
    }
    if !resp.status().is_success() {
        bail!("HTTP {} for {url}", resp.status());
    }

    let sheet = read_sheet(resp)?;
    let body = sheet.body.clone();
    // An unwritable cache dir only costs the next revalidation.
    let _ = SHARED
        .lock()
        .expect("sheet cache lock poisoned")
        .insert(url, sheet);
    Ok(body)
}

fn read_sheet(resp: Response) -> Result<CachedSheet> {
    let header = |name: HeaderName| {
        resp.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let etag = header(ETAG);
    let last_modified = header(LAST_MODIFIED);
    Ok(CachedSheet {
        body: resp.text().context("read sheet body")?,
        etag,
        last_modified,
        fetched_at: Utc::now(),
    })
}
