//! Liturgical feast source and per-year cache.
//!
//! Feast dates come from a [`CalendarProvider`]. Provider output is reduced
//! to the significant feasts used for novena recommendations and cached per
//! year in a [`CalendarCache`] owned by the caller.
//!
//! Feast classification is keyword based on the feast id and only
//! approximates liturgical taxonomy.

use crate::recommend::{associated_novena, MARIAN_FEASTS_FOR_54_DAY};
use crate::{
    Celebration, Error, FeastRank, FeastType, LiturgicalFeast, ProviderCalendar, Result,
};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Optional memorials kept despite their rank
pub const SIGNIFICANT_OPTIONAL_MEMORIALS: [&str; 3] = [
    "our_lady_of_lourdes",
    "our_lady_of_fatima",
    "our_lady_of_mount_carmel",
];

const MARIAN_KEYWORDS: [&str; 6] = [
    "mary",
    "our_lady",
    "immaculate",
    "assumption",
    "annunciation",
    "visitation",
];

const TEMPORAL_KEYWORDS: [&str; 6] = ["sunday", "weekday", "christmas", "easter", "lent", "advent"];

pub const DEFAULT_PROVIDER_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Guess the kind of feast from its id
pub fn classify_feast(id: &str) -> FeastType {
    let id = id.to_lowercase();
    if MARIAN_KEYWORDS.iter().any(|k| id.contains(k)) {
        FeastType::Marian
    } else if !TEMPORAL_KEYWORDS.iter().any(|k| id.contains(k)) {
        FeastType::Saint
    } else {
        FeastType::General
    }
}

/// Whether a celebration is worth considering for a novena
pub fn is_significant(id: &str, rank: FeastRank) -> bool {
    match rank {
        FeastRank::Solemnity | FeastRank::Feast | FeastRank::Memorial => true,
        FeastRank::OptionalMemorial => SIGNIFICANT_OPTIONAL_MEMORIALS.contains(&id),
    }
}

/// Priority derived from rank, 1 being the most important
pub fn rank_priority(rank: FeastRank) -> u8 {
    match rank {
        FeastRank::Solemnity => 1,
        FeastRank::Feast => 2,
        FeastRank::Memorial => 3,
        FeastRank::OptionalMemorial => 4,
    }
}

fn humanize_id(id: &str) -> String {
    id.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reduce a provider calendar to significant feasts sorted by date
pub fn feasts_from_calendar(calendar: &ProviderCalendar) -> Vec<LiturgicalFeast> {
    let mut feasts = Vec::new();

    for (date_str, celebrations) in calendar {
        let date = match NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                tracing::warn!("Skipping calendar entry with bad date {:?}: {}", date_str, e);
                continue;
            }
        };

        for celebration in celebrations {
            let Some(rank) = FeastRank::parse(&celebration.rank) else {
                continue;
            };
            if !is_significant(&celebration.id, rank) {
                continue;
            }

            feasts.push(LiturgicalFeast {
                id: celebration.id.clone(),
                name: celebration
                    .name
                    .clone()
                    .unwrap_or_else(|| humanize_id(&celebration.id)),
                date,
                rank,
                feast_type: classify_feast(&celebration.id),
                associated_novena: associated_novena(&celebration.id).map(str::to_string),
                priority: rank_priority(rank),
                triggers_long_novena: MARIAN_FEASTS_FOR_54_DAY.contains(&celebration.id.as_str()),
            });
        }
    }

    feasts.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    feasts
}

// ============================================================================
// Providers
// ============================================================================

/// Source of yearly liturgical calendars
///
/// Implementors can read from bundled data, files on disk, or a remote
/// service. Errors are absorbed by [`FeastCalendar`].
#[async_trait::async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Fetch the full calendar for a civil year
    async fn get_calendar(&self, year: i32) -> Result<ProviderCalendar>;

    /// Returns a name for this provider (used in logging).
    fn name(&self) -> &str {
        "CalendarProvider"
    }
}

#[async_trait::async_trait]
impl<P: CalendarProvider + ?Sized> CalendarProvider for Box<P> {
    async fn get_calendar(&self, year: i32) -> Result<ProviderCalendar> {
        (**self).get_calendar(year).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Fixed in-memory calendars, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct StaticCalendarProvider {
    calendars: HashMap<i32, ProviderCalendar>,
}

impl StaticCalendarProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one celebration on a date
    pub fn with_celebration(mut self, date: NaiveDate, id: &str, rank: FeastRank) -> Self {
        self.calendars
            .entry(date.year())
            .or_default()
            .entry(date.format("%Y-%m-%d").to_string())
            .or_default()
            .push(Celebration {
                id: id.to_string(),
                name: None,
                rank: rank.as_str().to_string(),
            });
        self
    }

    /// Replace the calendar for a year
    pub fn with_calendar(mut self, year: i32, calendar: ProviderCalendar) -> Self {
        self.calendars.insert(year, calendar);
        self
    }
}

#[async_trait::async_trait]
impl CalendarProvider for StaticCalendarProvider {
    async fn get_calendar(&self, year: i32) -> Result<ProviderCalendar> {
        Ok(self.calendars.get(&year).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "StaticCalendarProvider"
    }
}

/// Reads `{dir}/{year}.json` files in the provider calendar format
#[derive(Debug, Clone)]
pub struct JsonCalendarProvider {
    dir: PathBuf,
}

impl JsonCalendarProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, year: i32) -> PathBuf {
        self.dir.join(format!("{}.json", year))
    }
}

#[async_trait::async_trait]
impl CalendarProvider for JsonCalendarProvider {
    async fn get_calendar(&self, year: i32) -> Result<ProviderCalendar> {
        let path = self.path_for(year);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::Provider(format!("cannot read {:?}: {}", path, e)))?;
        let calendar: ProviderCalendar = serde_json::from_str(&contents)?;
        tracing::debug!("Loaded {} calendar dates from {:?}", calendar.len(), path);
        Ok(calendar)
    }

    fn name(&self) -> &str {
        "JsonCalendarProvider"
    }
}

/// Built-in subset of the General Roman Calendar
///
/// Covers the Marian feasts, the major solemnities and a handful of popular
/// saints. Movable feasts are placed from the Gregorian Easter date.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledCalendarProvider;

const FIXED_FEASTS: &[(u32, u32, &str, &str, FeastRank)] = &[
    (1, 1, "mary_mother_of_god", "Mary, Mother of God", FeastRank::Solemnity),
    (2, 2, "presentation_of_the_lord", "Presentation of the Lord", FeastRank::Feast),
    (2, 3, "blaise_bishop", "Saint Blaise", FeastRank::OptionalMemorial),
    (2, 11, "our_lady_of_lourdes", "Our Lady of Lourdes", FeastRank::OptionalMemorial),
    (
        3,
        19,
        "joseph_spouse_of_mary",
        "Saint Joseph, Spouse of the Blessed Virgin Mary",
        FeastRank::Solemnity,
    ),
    (3, 25, "annunciation", "Annunciation of the Lord", FeastRank::Solemnity),
    (5, 13, "our_lady_of_fatima", "Our Lady of Fatima", FeastRank::OptionalMemorial),
    (5, 31, "visitation_of_mary", "Visitation of the Blessed Virgin Mary", FeastRank::Feast),
    (6, 13, "anthony_of_padua_priest", "Saint Anthony of Padua", FeastRank::Memorial),
    (6, 29, "peter_and_paul_apostles", "Saints Peter and Paul", FeastRank::Solemnity),
    (7, 16, "our_lady_of_mount_carmel", "Our Lady of Mount Carmel", FeastRank::OptionalMemorial),
    (7, 26, "joachim_and_anne_parents_of_mary", "Saints Joachim and Anne", FeastRank::Memorial),
    (8, 6, "transfiguration", "Transfiguration of the Lord", FeastRank::Feast),
    (8, 15, "assumption", "Assumption of the Blessed Virgin Mary", FeastRank::Solemnity),
    (8, 22, "queenship_of_mary", "Queenship of the Blessed Virgin Mary", FeastRank::Memorial),
    (9, 8, "nativity_of_mary", "Nativity of the Blessed Virgin Mary", FeastRank::Feast),
    (9, 14, "exaltation_of_the_holy_cross", "Exaltation of the Holy Cross", FeastRank::Feast),
    (9, 15, "our_lady_of_sorrows", "Our Lady of Sorrows", FeastRank::Memorial),
    (
        9,
        29,
        "michael_gabriel_and_raphael_archangels",
        "Saints Michael, Gabriel and Raphael",
        FeastRank::Feast,
    ),
    (
        10,
        1,
        "therese_of_the_child_jesus_virgin",
        "Saint Thérèse of the Child Jesus",
        FeastRank::Memorial,
    ),
    (10, 4, "francis_of_assisi", "Saint Francis of Assisi", FeastRank::Memorial),
    (10, 7, "our_lady_of_the_rosary", "Our Lady of the Rosary", FeastRank::Memorial),
    (10, 28, "simon_and_jude_apostles", "Saints Simon and Jude", FeastRank::Feast),
    (11, 1, "all_saints", "All Saints", FeastRank::Solemnity),
    (
        11,
        21,
        "presentation_of_mary",
        "Presentation of the Blessed Virgin Mary",
        FeastRank::Memorial,
    ),
    (
        12,
        8,
        "immaculate_conception_of_mary",
        "Immaculate Conception of the Blessed Virgin Mary",
        FeastRank::Solemnity,
    ),
    (12, 12, "our_lady_of_guadalupe", "Our Lady of Guadalupe", FeastRank::Feast),
    (12, 25, "christmas", "Nativity of the Lord", FeastRank::Solemnity),
];

/// Feasts placed relative to Easter Sunday (days after Easter)
const EASTER_FEASTS: &[(i64, &str, &str, FeastRank)] = &[
    (0, "easter_sunday", "Easter Sunday", FeastRank::Solemnity),
    (7, "divine_mercy_sunday", "Divine Mercy Sunday", FeastRank::Solemnity),
    (39, "ascension", "Ascension of the Lord", FeastRank::Solemnity),
    (49, "pentecost_sunday", "Pentecost Sunday", FeastRank::Solemnity),
    (68, "most_sacred_heart_of_jesus", "Most Sacred Heart of Jesus", FeastRank::Solemnity),
    (69, "immaculate_heart_of_mary", "Immaculate Heart of Mary", FeastRank::Memorial),
];

/// Gregorian Easter Sunday (Oudin's algorithm)
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    if year < 1583 {
        return None;
    }
    let y = year;
    let c = y / 100;
    let n = y - 19 * (y / 19);
    let k = (c - 17) / 25;
    let mut i = c - (c / 4) - ((c - k) / 3) + 19 * n + 15;
    i -= 30 * (i / 30);
    i -= (i / 28) * (1 - (i / 28) * (29 / (i + 1)) * ((21 - n) / 11));
    let mut j = y + (y / 4) + i + 2 - c + (c / 4);
    j -= 7 * (j / 7);
    let l = i - j;
    let month = 3 + ((l + 40) / 44);
    let day = l + 28 - 31 * (month / 4);

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Christ the King: the Sunday before the first Sunday of Advent
pub fn christ_the_king(year: i32) -> Option<NaiveDate> {
    let dec3 = NaiveDate::from_ymd_opt(year, 12, 3)?;
    let back = dec3.weekday().num_days_from_sunday() as i64;
    Some(dec3 - Duration::days(back) - Duration::days(7))
}

impl BundledCalendarProvider {
    fn build(year: i32) -> Result<ProviderCalendar> {
        let easter = easter_sunday(year).ok_or_else(|| {
            Error::Provider(format!("year {} is before the Gregorian calendar", year))
        })?;

        let mut calendar = ProviderCalendar::new();
        let mut add = |date: NaiveDate, id: &str, name: &str, rank: FeastRank| {
            calendar
                .entry(date.format("%Y-%m-%d").to_string())
                .or_default()
                .push(Celebration {
                    id: id.to_string(),
                    name: Some(name.to_string()),
                    rank: rank.as_str().to_string(),
                });
        };

        for (month, day, id, name, rank) in FIXED_FEASTS {
            if let Some(date) = NaiveDate::from_ymd_opt(year, *month, *day) {
                add(date, *id, *name, *rank);
            }
        }

        for (offset, id, name, rank) in EASTER_FEASTS {
            add(easter + Duration::days(*offset), *id, *name, *rank);
        }

        if let Some(date) = christ_the_king(year) {
            add(
                date,
                "christ_the_king",
                "Our Lord Jesus Christ, King of the Universe",
                FeastRank::Solemnity,
            );
        }

        Ok(calendar)
    }
}

#[async_trait::async_trait]
impl CalendarProvider for BundledCalendarProvider {
    async fn get_calendar(&self, year: i32) -> Result<ProviderCalendar> {
        Self::build(year)
    }

    fn name(&self) -> &str {
        "BundledCalendarProvider"
    }
}

// ============================================================================
// Cache
// ============================================================================

/// Year-keyed cache of significant feasts
///
/// Entries are written once per year. Two concurrent misses for the same
/// year may both fetch; the later write replaces an equal value.
#[derive(Debug, Default)]
pub struct CalendarCache {
    entries: RwLock<HashMap<i32, Arc<Vec<LiturgicalFeast>>>>,
}

impl CalendarCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, year: i32) -> Option<Arc<Vec<LiturgicalFeast>>> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&year)
            .cloned()
    }

    pub fn insert(&self, year: i32, feasts: Arc<Vec<LiturgicalFeast>>) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(year, feasts);
    }

    /// Drop a cached year so the next lookup refetches it
    pub fn invalidate(&self, year: i32) -> bool {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&year)
            .is_some()
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A provider paired with its cache and call timeout
pub struct FeastCalendar<P> {
    provider: P,
    cache: CalendarCache,
    timeout: std::time::Duration,
}

impl<P: CalendarProvider> FeastCalendar<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            cache: CalendarCache::new(),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache(&self) -> &CalendarCache {
        &self.cache
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Significant feasts for a year, sorted by date
    ///
    /// Provider errors and timeouts are logged and yield an empty list;
    /// they are not cached, so a later call retries.
    pub async fn feasts(&self, year: i32) -> Arc<Vec<LiturgicalFeast>> {
        if let Some(cached) = self.cache.get(year) {
            tracing::debug!("Calendar cache hit for {}", year);
            return cached;
        }

        let fetched = tokio::time::timeout(self.timeout, self.provider.get_calendar(year)).await;

        match fetched {
            Ok(Ok(calendar)) => {
                let feasts = Arc::new(feasts_from_calendar(&calendar));
                tracing::info!(
                    "Loaded {} significant feasts for {} from {}",
                    feasts.len(),
                    year,
                    self.provider.name()
                );
                self.cache.insert(year, Arc::clone(&feasts));
                feasts
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    "Calendar provider '{}' failed for {}: {}",
                    self.provider.name(),
                    year,
                    e
                );
                Arc::new(Vec::new())
            }
            Err(_) => {
                tracing::warn!(
                    "Calendar provider '{}' timed out after {:?} for {}",
                    self.provider.name(),
                    self.timeout,
                    year
                );
                Arc::new(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct FailingProvider;

    #[async_trait::async_trait]
    impl CalendarProvider for FailingProvider {
        async fn get_calendar(&self, _year: i32) -> Result<ProviderCalendar> {
            Err(Error::Provider("network unreachable".into()))
        }
    }

    struct SlowProvider;

    #[async_trait::async_trait]
    impl CalendarProvider for SlowProvider {
        async fn get_calendar(&self, year: i32) -> Result<ProviderCalendar> {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            BundledCalendarProvider.get_calendar(year).await
        }
    }

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl CalendarProvider for CountingProvider {
        async fn get_calendar(&self, year: i32) -> Result<ProviderCalendar> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            BundledCalendarProvider.get_calendar(year).await
        }
    }

    #[test]
    fn test_classify_feast() {
        assert_eq!(classify_feast("assumption"), FeastType::Marian);
        assert_eq!(classify_feast("our_lady_of_fatima"), FeastType::Marian);
        assert_eq!(classify_feast("francis_of_assisi"), FeastType::Saint);
        assert_eq!(classify_feast("pentecost_sunday"), FeastType::General);
        assert_eq!(classify_feast("easter_sunday"), FeastType::General);
    }

    #[test]
    fn test_significance_filter() {
        assert!(is_significant("anything", FeastRank::Memorial));
        assert!(is_significant("our_lady_of_lourdes", FeastRank::OptionalMemorial));
        assert!(!is_significant("blaise_bishop", FeastRank::OptionalMemorial));
    }

    #[test]
    fn test_easter_dates() {
        assert_eq!(easter_sunday(2024), Some(date(2024, 3, 31)));
        assert_eq!(easter_sunday(2025), Some(date(2025, 4, 20)));
        assert_eq!(easter_sunday(2026), Some(date(2026, 4, 5)));
        assert_eq!(easter_sunday(1500), None);
    }

    #[test]
    fn test_christ_the_king() {
        assert_eq!(christ_the_king(2025), Some(date(2025, 11, 23)));
        assert_eq!(christ_the_king(2026), Some(date(2026, 11, 22)));
    }

    #[test]
    fn test_feasts_from_calendar_filters_and_sorts() {
        let mut calendar = ProviderCalendar::new();
        calendar.insert(
            "2026-12-08".into(),
            vec![Celebration {
                id: "immaculate_conception_of_mary".into(),
                name: None,
                rank: "SOLEMNITY".into(),
            }],
        );
        calendar.insert(
            "2026-02-03".into(),
            vec![Celebration {
                id: "blaise_bishop".into(),
                name: None,
                rank: "OPTIONAL_MEMORIAL".into(),
            }],
        );
        calendar.insert(
            "2026-02-11".into(),
            vec![
                Celebration {
                    id: "our_lady_of_lourdes".into(),
                    name: Some("Our Lady of Lourdes".into()),
                    rank: "OPTIONAL_MEMORIAL".into(),
                },
                Celebration {
                    id: "weekday_ordinary_time".into(),
                    name: None,
                    rank: "WEEKDAY".into(),
                },
            ],
        );
        calendar.insert("not-a-date".into(), vec![]);

        let feasts = feasts_from_calendar(&calendar);
        let ids: Vec<_> = feasts.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["our_lady_of_lourdes", "immaculate_conception_of_mary"]);

        let immaculate = &feasts[1];
        assert_eq!(immaculate.name, "Immaculate Conception Of Mary");
        assert_eq!(immaculate.feast_type, FeastType::Marian);
        assert_eq!(immaculate.priority, 1);
        assert!(immaculate.triggers_long_novena);
        assert_eq!(
            immaculate.associated_novena.as_deref(),
            Some("immaculate-conception-novena")
        );
    }

    #[tokio::test]
    async fn test_bundled_calendar_contents() {
        let calendar = BundledCalendarProvider.get_calendar(2026).await.unwrap();
        let feasts = feasts_from_calendar(&calendar);

        let find = |id: &str| feasts.iter().find(|f| f.id == id);
        assert_eq!(find("assumption").unwrap().date, date(2026, 8, 15));
        assert_eq!(find("divine_mercy_sunday").unwrap().date, date(2026, 4, 12));
        assert_eq!(find("pentecost_sunday").unwrap().date, date(2026, 5, 24));
        assert!(find("our_lady_of_fatima").is_some());
        assert!(find("blaise_bishop").is_none());
        assert!(feasts.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[tokio::test]
    async fn test_feast_calendar_caches_per_year() {
        let calendar = FeastCalendar::new(CountingProvider::default());

        let first = calendar.feasts(2026).await;
        let second = calendar.feasts(2026).await;
        assert_eq!(first, second);
        assert_eq!(calendar.provider().calls.load(Ordering::SeqCst), 1);

        assert!(calendar.cache().invalidate(2026));
        calendar.feasts(2026).await;
        assert_eq!(calendar.provider().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_provider_failure_yields_empty_and_is_not_cached() {
        crate::logging::init_test();
        let calendar = FeastCalendar::new(FailingProvider);
        let feasts = calendar.feasts(2026).await;
        assert!(feasts.is_empty());
        assert!(calendar.cache().is_empty());
    }

    #[tokio::test]
    async fn test_provider_timeout_yields_empty() {
        crate::logging::init_test();
        let calendar =
            FeastCalendar::new(SlowProvider).with_timeout(std::time::Duration::from_millis(20));
        let feasts = calendar.feasts(2026).await;
        assert!(feasts.is_empty());
    }

    #[tokio::test]
    async fn test_json_provider_reads_year_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("2027.json"),
            r#"{"2027-08-15": [{"id": "assumption", "rank": "SOLEMNITY"}]}"#,
        )
        .unwrap();

        let provider = JsonCalendarProvider::new(dir.path());
        let calendar = provider.get_calendar(2027).await.unwrap();
        assert_eq!(calendar.len(), 1);

        assert!(provider.get_calendar(2028).await.is_err());
    }

    #[tokio::test]
    async fn test_boxed_provider() {
        let provider: Box<dyn CalendarProvider> = Box::new(BundledCalendarProvider);
        let calendar = FeastCalendar::new(provider);
        assert!(!calendar.feasts(2025).await.is_empty());
        assert_eq!(calendar.provider().name(), "BundledCalendarProvider");
    }
}
