//! Novena recommendations driven by upcoming feasts.
//!
//! A 9-day novena ends on its feast, so it starts nine days before. The
//! 54-day rosary novena is offered for a short list of Marian feasts and
//! starts 54 days before. [`recommend`] is pure; [`NovenaRecommender`] adds
//! the calendar fetch around it.

use crate::feasts::{CalendarProvider, FeastCalendar};
use crate::NovenaCategory::{Christ, HolySpirit, Marian, Saint, Seasonal};
use crate::{
    FeastNovenaMapping, LiturgicalFeast, NovenaCategory, NovenaDuration, NovenaRecommendation,
    RecommendationRequest, Urgency,
};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Marian feasts that may be the target of a 54-day rosary novena
pub const MARIAN_FEASTS_FOR_54_DAY: [&str; 7] = [
    "immaculate_conception_of_mary",
    "assumption",
    "annunciation",
    "our_lady_of_the_rosary",
    "our_lady_of_guadalupe",
    "nativity_of_mary",
    "mary_mother_of_god",
];

/// Novena type reported for 54-day recommendations without a specific mapping
pub const LONG_NOVENA_TYPE: &str = "54-day-novena";

const fn nine_day(
    feast_id: &'static str,
    feast_name: &'static str,
    novena_type: &'static str,
    priority: u8,
    category: NovenaCategory,
    message_template: Option<&'static str>,
) -> FeastNovenaMapping {
    FeastNovenaMapping {
        feast_id,
        feast_name,
        novena_type,
        duration_type: NovenaDuration::NineDay,
        priority,
        category,
        message_template,
    }
}

pub static FEAST_NOVENA_MAPPINGS: &[FeastNovenaMapping] = &[
    nine_day(
        "immaculate_conception_of_mary",
        "Immaculate Conception",
        "immaculate-conception-novena",
        1,
        Marian,
        Some("Begin the Immaculate Conception novena on {start} to honor Our Lady on {date}."),
    ),
    nine_day(
        "assumption",
        "Assumption",
        "assumption-novena",
        1,
        Marian,
        Some("Prepare for the Assumption on {date} with a novena beginning {start}."),
    ),
    nine_day("annunciation", "Annunciation", "annunciation-novena", 2, Marian, None),
    nine_day(
        "our_lady_of_lourdes",
        "Our Lady of Lourdes",
        "our-lady-of-lourdes-novena",
        2,
        Marian,
        None,
    ),
    nine_day(
        "our_lady_of_fatima",
        "Our Lady of Fatima",
        "our-lady-of-fatima-novena",
        2,
        Marian,
        None,
    ),
    nine_day(
        "our_lady_of_mount_carmel",
        "Our Lady of Mount Carmel",
        "our-lady-of-mount-carmel-novena",
        3,
        Marian,
        None,
    ),
    nine_day(
        "our_lady_of_guadalupe",
        "Our Lady of Guadalupe",
        "our-lady-of-guadalupe-novena",
        2,
        Marian,
        None,
    ),
    nine_day("our_lady_of_sorrows", "Our Lady of Sorrows", "seven-sorrows-novena", 3, Marian, None),
    nine_day(
        "our_lady_of_the_rosary",
        "Our Lady of the Rosary",
        "holy-rosary-novena",
        2,
        Marian,
        None,
    ),
    nine_day("nativity_of_mary", "Nativity of Mary", "nativity-of-mary-novena", 3, Marian, None),
    nine_day(
        "joseph_spouse_of_mary",
        "Saint Joseph",
        "st-joseph-novena",
        1,
        Saint,
        Some("The St. Joseph novena begins {start}, ending on his solemnity {date}."),
    ),
    nine_day(
        "anthony_of_padua_priest",
        "Saint Anthony of Padua",
        "st-anthony-novena",
        3,
        Saint,
        None,
    ),
    nine_day(
        "therese_of_the_child_jesus_virgin",
        "Saint Thérèse",
        "st-therese-novena",
        3,
        Saint,
        None,
    ),
    nine_day(
        "michael_gabriel_and_raphael_archangels",
        "Saint Michael",
        "st-michael-novena",
        3,
        Saint,
        None,
    ),
    nine_day("francis_of_assisi", "Saint Francis of Assisi", "st-francis-novena", 4, Saint, None),
    nine_day(
        "divine_mercy_sunday",
        "Divine Mercy Sunday",
        "divine-mercy-novena",
        1,
        Christ,
        Some("The Divine Mercy novena begins {start} (Good Friday) and ends on {feast}, {date}."),
    ),
    nine_day(
        "most_sacred_heart_of_jesus",
        "Sacred Heart of Jesus",
        "sacred-heart-novena",
        2,
        Christ,
        None,
    ),
    nine_day("christ_the_king", "Christ the King", "christ-the-king-novena", 3, Christ, None),
    nine_day("christmas", "Christmas", "christmas-novena", 2, Seasonal, None),
    nine_day(
        "pentecost_sunday",
        "Pentecost",
        "holy-spirit-novena",
        1,
        HolySpirit,
        Some("The novena to the Holy Spirit begins {start}, the day after the Ascension, and ends on Pentecost, {date}."),
    ),
    FeastNovenaMapping {
        feast_id: "immaculate_conception_of_mary",
        feast_name: "Immaculate Conception",
        novena_type: LONG_NOVENA_TYPE,
        duration_type: NovenaDuration::FiftyFourDay,
        priority: 1,
        category: Marian,
        message_template: Some("Begin the 54-day rosary novena on {start} to finish on the Immaculate Conception, {date}."),
    },
    FeastNovenaMapping {
        feast_id: "assumption",
        feast_name: "Assumption",
        novena_type: LONG_NOVENA_TYPE,
        duration_type: NovenaDuration::FiftyFourDay,
        priority: 1,
        category: Marian,
        message_template: None,
    },
];

/// Find the mapping for a feast and novena length
pub fn find_mapping(
    feast_id: &str,
    duration: NovenaDuration,
) -> Option<&'static FeastNovenaMapping> {
    FEAST_NOVENA_MAPPINGS
        .iter()
        .find(|m| m.feast_id == feast_id && m.duration_type == duration)
}

/// Novena associated with a feast, preferring the 9-day one
pub fn associated_novena(feast_id: &str) -> Option<&'static str> {
    find_mapping(feast_id, NovenaDuration::NineDay)
        .or_else(|| find_mapping(feast_id, NovenaDuration::FiftyFourDay))
        .map(|m| m.novena_type)
}

/// Recommendation settings, the `[liturgical]` section of the config file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LiturgicalCalendarConfig {
    pub enabled: bool,
    pub max_recommendations: usize,
    /// Upper bound on days until a novena starts
    pub days_in_advance: i64,
    /// Lower bound on days until a 9-day novena starts
    pub min_days_before_feast: i64,
    /// Only recommend mappings with priority 1 or 2
    pub high_priority_only: bool,
    /// Restrict to these categories; empty means all
    pub included_categories: Vec<NovenaCategory>,
}

impl Default for LiturgicalCalendarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_recommendations: 3,
            days_in_advance: 14,
            min_days_before_feast: 2,
            high_priority_only: false,
            included_categories: Vec::new(),
        }
    }
}

impl LiturgicalCalendarConfig {
    fn admits(&self, priority: u8, category: NovenaCategory) -> bool {
        if self.high_priority_only && priority > 2 {
            return false;
        }
        self.included_categories.is_empty() || self.included_categories.contains(&category)
    }
}

/// Urgency tier for a novena starting in `days` days
pub fn urgency_for(days: i64) -> Urgency {
    if days <= 3 {
        Urgency::High
    } else if days <= 7 {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}

/// Stable identity used for dedup and dismissal
pub fn recommendation_id(kind: NovenaDuration, feast: &LiturgicalFeast) -> String {
    format!("{}-{}-{}", kind, feast.id, feast.date.format("%Y-%m-%d"))
}

fn long_date(date: NaiveDate) -> String {
    format!("{} {}, {}", date.format("%B"), date.day(), date.year())
}

fn render_message(
    template: Option<&str>,
    kind: NovenaDuration,
    feast: &LiturgicalFeast,
    start: NaiveDate,
) -> String {
    let template = template.unwrap_or(match kind {
        NovenaDuration::NineDay => {
            "Start a 9-day novena on {start} in preparation for {feast} on {date}."
        }
        NovenaDuration::FiftyFourDay => {
            "Start the 54-day rosary novena on {start} so that it ends on {feast}, {date}."
        }
    });

    template
        .replace("{feast}", &feast.name)
        .replace("{date}", &long_date(feast.date))
        .replace("{start}", &long_date(start))
}

fn build(
    kind: NovenaDuration,
    feast: &LiturgicalFeast,
    today: NaiveDate,
    novena_type: &str,
    template: Option<&str>,
) -> NovenaRecommendation {
    let start_date = feast.date - Duration::days(kind.days());
    let days_until_start = (start_date - today).num_days();

    NovenaRecommendation {
        kind,
        target_feast: feast.clone(),
        start_date,
        days_until_start,
        message: render_message(template, kind, feast, start_date),
        novena_type: Some(novena_type.to_string()),
        urgency: urgency_for(days_until_start),
        id: recommendation_id(kind, feast),
    }
}

/// Ranked novena suggestions for `today`
///
/// Feasts can span several years; duplicates by id are collapsed and
/// dismissed ids dropped before the cap is applied.
pub fn recommend(
    feasts: &[LiturgicalFeast],
    today: NaiveDate,
    request: &RecommendationRequest,
    config: &LiturgicalCalendarConfig,
) -> Vec<NovenaRecommendation> {
    let mut candidates = Vec::new();

    for feast in feasts {
        let Some(mapping) = find_mapping(&feast.id, NovenaDuration::NineDay) else {
            continue;
        };
        if request.active_novenas.iter().any(|n| n == mapping.novena_type) {
            continue;
        }
        if !config.admits(mapping.priority, mapping.category) {
            continue;
        }

        let rec = build(
            NovenaDuration::NineDay,
            feast,
            today,
            mapping.novena_type,
            mapping.message_template,
        );
        let d = rec.days_until_start;
        if (0..=config.days_in_advance).contains(&d) && d >= config.min_days_before_feast {
            candidates.push(rec);
        }
    }

    if !request.has_54_day_active {
        for feast in feasts
            .iter()
            .filter(|f| MARIAN_FEASTS_FOR_54_DAY.contains(&f.id.as_str()))
        {
            let mapping = find_mapping(&feast.id, NovenaDuration::FiftyFourDay);
            let priority = mapping.map_or(feast.priority, |m| m.priority);
            if !config.admits(priority, NovenaCategory::Marian) {
                continue;
            }

            let rec = build(
                NovenaDuration::FiftyFourDay,
                feast,
                today,
                mapping.map_or(LONG_NOVENA_TYPE, |m| m.novena_type),
                mapping.and_then(|m| m.message_template),
            );
            let d = rec.days_until_start;
            if (0..=config.days_in_advance).contains(&d) {
                candidates.push(rec);
            }
        }
    }

    let mut seen = HashSet::new();
    candidates.retain(|r| seen.insert(r.id.clone()) && !request.dismissed.contains(&r.id));
    candidates.sort_by_key(|r| (r.urgency, r.days_until_start));
    candidates.truncate(config.max_recommendations);
    candidates
}

/// Feast calendar plus recommendation settings
pub struct NovenaRecommender<P> {
    calendar: FeastCalendar<P>,
    config: LiturgicalCalendarConfig,
}

impl<P: CalendarProvider> NovenaRecommender<P> {
    pub fn new(calendar: FeastCalendar<P>, config: LiturgicalCalendarConfig) -> Self {
        Self { calendar, config }
    }

    pub fn config(&self) -> &LiturgicalCalendarConfig {
        &self.config
    }

    pub fn calendar(&self) -> &FeastCalendar<P> {
        &self.calendar
    }

    /// Significant feasts for the current and following year
    pub async fn upcoming_feasts(&self, today: NaiveDate) -> Vec<LiturgicalFeast> {
        let year = today.year();
        let (current, next) = tokio::join!(
            self.calendar.feasts(year),
            self.calendar.feasts(year + 1)
        );

        current.iter().chain(next.iter()).cloned().collect()
    }

    pub async fn recommendations(
        &self,
        today: NaiveDate,
        request: &RecommendationRequest,
    ) -> Vec<NovenaRecommendation> {
        if !self.config.enabled {
            tracing::debug!("Liturgical recommendations disabled");
            return Vec::new();
        }

        let feasts = self.upcoming_feasts(today).await;
        let recs = recommend(&feasts, today, request, &self.config);
        tracing::info!(
            "Computed {} novena recommendations from {} feasts for {}",
            recs.len(),
            feasts.len(),
            today
        );
        recs
    }
}
