use chrono::{Datelike, Duration, NaiveDate, Utc};
use log::{debug, info};
use reqwest::Client;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use crate::errors::CoreError;
use crate::models::settings::EngineSettings;
use crate::services::progress::ProgressSink;

const ARCHIVE_BASE_URL: &str = "https://bvmf.bmfbovespa.com.br/InstDados/SerHist";

/// Record type of daily quote lines; header and trailer lines use other codes.
const QUOTE_RECORD_TYPE: &[u8] = b"01";

/// Days of history loaded per requested year.
const DAYS_PER_YEAR_BACK: i64 = 370;

/// Month length used to turn a month count into a day window.
const DAYS_PER_MONTH: f64 = 30.41;

/// One daily quote from a COTAHIST file.
#[derive(Debug, Clone, PartialEq)]
pub struct CotahistRecord {
    pub date: NaiveDate,
    pub ticker: String,
    pub close: f64,
}

/// Parse one fixed-width COTAHIST line.
///
/// Layout (0-based byte offsets): record type 0..2, trade date 2..10
/// (`YYYYMMDD`), ticker 12..24, closing price 108..121 in cents. The file
/// is Latin-1, so offsets are taken on raw bytes. Non-quote lines and
/// malformed lines yield `None`.
pub fn parse_cotahist_line(line: &[u8]) -> Option<CotahistRecord> {
    if !line.starts_with(QUOTE_RECORD_TYPE) {
        return None;
    }
    let field = move |from: usize, to: usize| {
        line.get(from..to)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .map(str::trim)
    };

    let date = NaiveDate::parse_from_str(field(2, 10)?, "%Y%m%d").ok()?;
    let ticker = field(12, 24)?;
    if ticker.is_empty() {
        return None;
    }
    let cents: i64 = field(108, 121)?.parse().ok()?;

    Some(CotahistRecord {
        date,
        ticker: ticker.to_string(),
        close: cents as f64 / 100.0,
    })
}

/// Parse every quote line of a COTAHIST file.
pub fn parse_cotahist(data: &[u8]) -> Vec<CotahistRecord> {
    data.split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter_map(parse_cotahist_line)
        .collect()
}

/// `PETR4.SA` → `PETR4`, uppercased and trimmed.
pub fn strip_exchange_suffix(ticker: &str) -> String {
    let upper = ticker.trim().to_uppercase();
    match upper.strip_suffix(".SA") {
        Some(base) => base.to_string(),
        None => upper,
    }
}

/// Calendar years needed to cover `years_back` years before `as_of`.
pub fn years_to_load(as_of: NaiveDate, years_back: u32) -> Vec<i32> {
    let start = as_of - Duration::days(DAYS_PER_YEAR_BACK * i64::from(years_back));
    (start.year()..=as_of.year()).collect()
}

/// Daily closing prices from the B3 exchange's yearly COTAHIST archives.
///
/// Archives are downloaded once per year and kept raw in the cache
/// directory from `EngineSettings`; a cached year is never re-downloaded.
#[derive(Debug, Clone)]
pub struct B3History {
    records: Vec<CotahistRecord>,
    as_of: NaiveDate,
}

impl B3History {
    pub fn from_records(records: Vec<CotahistRecord>, as_of: NaiveDate) -> Self {
        Self { records, as_of }
    }

    /// Load every year needed for `settings.b3_years_back`, ending today.
    pub async fn load(
        settings: &EngineSettings,
        progress: &mut (dyn ProgressSink + Send),
    ) -> Result<Self, CoreError> {
        Self::load_as_of(settings, Utc::now().date_naive(), progress).await
    }

    pub async fn load_as_of(
        settings: &EngineSettings,
        as_of: NaiveDate,
        progress: &mut (dyn ProgressSink + Send),
    ) -> Result<Self, CoreError> {
        let client = Client::new();
        let years = years_to_load(as_of, settings.b3_years_back);
        let total = years.len();
        let mut records = Vec::new();

        for (idx, year) in years.into_iter().enumerate() {
            let raw = year_archive(&client, &settings.cache_dir, year).await?;
            records.extend(parse_cotahist(&raw));
            progress.on_progress(idx + 1, total);
        }

        records.sort_by_key(|r| r.date);
        Ok(Self { records, as_of })
    }

    /// Closing prices of `ticker` over the last `months` months, oldest first.
    /// The day the window starts on is not part of it.
    pub fn prices(&self, ticker: &str, months: u32) -> Vec<f64> {
        let code = strip_exchange_suffix(ticker);
        let window_days = (DAYS_PER_MONTH * f64::from(months)) as i64;
        let start = self.as_of - Duration::days(window_days);

        let mut matching: Vec<&CotahistRecord> = self
            .records
            .iter()
            .filter(|r| r.ticker == code && r.date > start && r.date <= self.as_of)
            .collect();
        matching.sort_by_key(|r| r.date);
        matching.into_iter().map(|r| r.close).collect()
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Raw text of one yearly archive, from cache or downloaded and cached.
async fn year_archive(client: &Client, cache_dir: &Path, year: i32) -> Result<Vec<u8>, CoreError> {
    let cache_file = cache_path(cache_dir, year);
    if cache_file.exists() {
        debug!("Using cached COTAHIST {year} at {}", cache_file.display());
        return Ok(std::fs::read(&cache_file)?);
    }

    info!("Downloading COTAHIST {year}");
    let url = format!("{ARCHIVE_BASE_URL}/COTAHIST_A{year}.ZIP");
    let archive = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    let raw = extract_first_entry(&archive)?;
    std::fs::create_dir_all(cache_dir)?;
    std::fs::write(&cache_file, &raw)?;
    Ok(raw)
}

pub fn cache_path(cache_dir: &Path, year: i32) -> PathBuf {
    cache_dir.join(format!("COTAHIST_{year}.txt"))
}

/// Contents of the first file of a ZIP archive.
pub fn extract_first_entry(archive: &[u8]) -> Result<Vec<u8>, CoreError> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;
    if zip.len() == 0 {
        return Err(CoreError::InvalidFileFormat("empty COTAHIST archive".into()));
    }
    let mut entry = zip.by_index(0)?;
    let mut raw = Vec::new();
    entry.read_to_end(&mut raw)?;
    Ok(raw)
}
