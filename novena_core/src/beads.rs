//! Bead layouts for the rosary and chaplets.
//!
//! Each layout is a literal table of bead runs describing the physical
//! string of beads. Tables are expanded once into position-indexed
//! sequences and cached for the life of the process. The expansion only
//! repeats runs as written; it does not compute or infer any layout, so
//! every bead count and position comes straight from the tables below.

use crate::BeadType::{Cross, LargeBead, Medal, SmallBead};
use crate::{Bead, BeadType, ChapletType, PrayerType, RosaryConfig};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A run of identical beads
#[derive(Clone, Copy, Debug)]
struct Segment {
    bead_type: BeadType,
    count: usize,
    prayers: &'static [&'static str],
    /// `{n}` is replaced with the 1-based repetition of the enclosing block
    label: Option<&'static str>,
}

/// A block of runs strung `times` times in a row
type Block = (usize, &'static [Segment]);

const fn run(
    bead_type: BeadType,
    count: usize,
    prayers: &'static [&'static str],
    label: Option<&'static str>,
) -> Segment {
    Segment {
        bead_type,
        count,
        prayers,
        label,
    }
}

// ============================================================================
// Layout tables
// ============================================================================

const STANDARD_ROSARY: &[Block] = &[
    (
        1,
        &[
            run(Cross, 1, &["sign_of_the_cross", "apostles_creed"], Some("Crucifix")),
            run(LargeBead, 1, &["our_father"], None),
            run(SmallBead, 3, &["hail_mary"], None),
            run(LargeBead, 1, &["glory_be"], None),
            run(Medal, 1, &[], Some("Centre medal")),
        ],
    ),
    (
        5,
        &[
            run(LargeBead, 1, &["our_father"], Some("Decade {n}")),
            run(SmallBead, 10, &["hail_mary"], None),
            run(Medal, 1, &["glory_be", "fatima_prayer"], Some("Glory Be")),
        ],
    ),
    (
        1,
        &[
            run(Medal, 1, &["hail_holy_queen"], Some("Hail, Holy Queen")),
            run(Medal, 1, &["rosary_final_prayer"], Some("Concluding prayer")),
        ],
    ),
];

const DIVINE_MERCY: &[Block] = &[
    (
        1,
        &[
            run(Cross, 1, &["sign_of_the_cross"], Some("Crucifix")),
            run(LargeBead, 1, &["our_father"], None),
            run(SmallBead, 3, &["hail_mary"], None),
            run(Medal, 1, &["apostles_creed"], Some("Centre medal")),
        ],
    ),
    (
        5,
        &[
            run(LargeBead, 1, &["eternal_father"], Some("Decade {n}")),
            run(SmallBead, 10, &["for_the_sake"], None),
        ],
    ),
    (1, &[run(Medal, 1, &["holy_god"], Some("Holy God"))]),
];

const SEVEN_SORROWS: &[Block] = &[
    (1, &[run(Medal, 1, &["sign_of_the_cross"], Some("Medal"))]),
    (
        7,
        &[
            run(LargeBead, 1, &["our_father"], Some("Sorrow {n}")),
            run(SmallBead, 7, &["hail_mary"], None),
        ],
    ),
    (
        1,
        &[run(
            SmallBead,
            3,
            &["hail_mary"],
            Some("In honor of Our Lady's tears"),
        )],
    ),
];

const ST_MICHAEL: &[Block] = &[
    (1, &[run(Medal, 1, &["sign_of_the_cross"], Some("Medal"))]),
    (
        9,
        &[
            run(LargeBead, 1, &["our_father"], Some("Salutation {n}")),
            run(SmallBead, 3, &["hail_mary"], None),
        ],
    ),
    (1, &[run(LargeBead, 4, &["our_father"], Some("Archangels and guardian angel"))]),
];

// Simplified layouts: a cross, then groups of k beads each led by a large bead.

const SACRED_HEART: &[Block] = &[
    (1, &[run(Cross, 1, &["sign_of_the_cross"], Some("Crucifix"))]),
    (
        11,
        &[
            run(LargeBead, 1, &["our_father"], None),
            run(SmallBead, 2, &["hail_mary"], None),
        ],
    ),
];

const INFANT_OF_PRAGUE: &[Block] = &[
    (1, &[run(Cross, 1, &["sign_of_the_cross"], Some("Crucifix"))]),
    (
        5,
        &[
            run(LargeBead, 1, &["our_father"], None),
            run(SmallBead, 2, &["hail_mary"], None),
        ],
    ),
];

const HOLY_SPIRIT: &[Block] = &[
    (1, &[run(Cross, 1, &["sign_of_the_cross"], Some("Crucifix"))]),
    (
        7,
        &[
            run(LargeBead, 1, &["our_father"], None),
            run(SmallBead, 4, &["glory_be"], None),
        ],
    ),
];

const HOLY_FACE: &[Block] = &[
    (1, &[run(Cross, 1, &["sign_of_the_cross"], Some("Crucifix"))]),
    (
        6,
        &[
            run(LargeBead, 1, &["our_father"], None),
            run(SmallBead, 5, &["glory_be"], None),
        ],
    ),
];

const PRECIOUS_BLOOD: &[Block] = &[
    (1, &[run(Cross, 1, &["sign_of_the_cross"], Some("Crucifix"))]),
    (
        7,
        &[
            run(LargeBead, 1, &["glory_be"], None),
            run(SmallBead, 6, &["our_father"], None),
        ],
    ),
];

const ST_JOSEPH: &[Block] = &[
    (1, &[run(Cross, 1, &["sign_of_the_cross"], Some("Crucifix"))]),
    (
        5,
        &[
            run(LargeBead, 1, &["our_father"], None),
            run(SmallBead, 9, &["hail_mary"], None),
        ],
    ),
];

fn layout_for(prayer_type: PrayerType) -> &'static [Block] {
    match prayer_type {
        PrayerType::DailyRosary | PrayerType::FiftyFourDayNovena => STANDARD_ROSARY,
        PrayerType::Chaplet(chaplet) => match chaplet {
            ChapletType::DivineMercy => DIVINE_MERCY,
            ChapletType::SevenSorrows => SEVEN_SORROWS,
            ChapletType::StMichael => ST_MICHAEL,
            ChapletType::SacredHeart => SACRED_HEART,
            ChapletType::InfantOfPrague => INFANT_OF_PRAGUE,
            ChapletType::HolySpirit => HOLY_SPIRIT,
            ChapletType::HolyFace => HOLY_FACE,
            ChapletType::PreciousBlood => PRECIOUS_BLOOD,
            ChapletType::StJoseph => ST_JOSEPH,
        },
    }
}

fn display_name(prayer_type: PrayerType) -> &'static str {
    match prayer_type {
        PrayerType::DailyRosary => "Holy Rosary",
        PrayerType::FiftyFourDayNovena => "54-Day Rosary Novena",
        PrayerType::Chaplet(chaplet) => chaplet.name(),
    }
}

/// Expand a layout table into a position-indexed bead sequence
fn expand_layout(prayer_type: PrayerType, layout: &[Block]) -> Vec<Bead> {
    let mut beads = Vec::new();

    for (times, segments) in layout {
        for repetition in 1..=*times {
            for segment in segments.iter() {
                for _ in 0..segment.count {
                    let position = beads.len();
                    beads.push(Bead {
                        id: format!("{}-bead-{}", prayer_type.slug(), position),
                        bead_type: segment.bead_type,
                        prayers: segment.prayers.iter().map(|p| p.to_string()).collect(),
                        position,
                        label: segment
                            .label
                            .map(|l| l.replace("{n}", &repetition.to_string())),
                    });
                }
            }
        }
    }

    beads
}

fn build_config(prayer_type: PrayerType) -> RosaryConfig {
    let bead_sequence = expand_layout(prayer_type, layout_for(prayer_type));
    RosaryConfig {
        prayer_type,
        total_beads: bead_sequence.len(),
        bead_sequence,
        name: display_name(prayer_type).to_string(),
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// All bead layouts keyed by prayer type
#[derive(Debug)]
pub struct BeadCatalog {
    configs: HashMap<PrayerType, RosaryConfig>,
    default: RosaryConfig,
}

/// Cached catalog - built once and reused across all lookups
static CATALOG: Lazy<BeadCatalog> = Lazy::new(build_bead_catalog);

/// Get a reference to the cached bead catalog
pub fn bead_catalog() -> &'static BeadCatalog {
    &CATALOG
}

/// Builds the catalog of every known layout
pub fn build_bead_catalog() -> BeadCatalog {
    let configs = PrayerType::all()
        .into_iter()
        .map(|pt| (pt, build_config(pt)))
        .collect();

    BeadCatalog {
        configs,
        default: build_config(PrayerType::DailyRosary),
    }
}

impl BeadCatalog {
    pub fn get(&self, prayer_type: PrayerType) -> &RosaryConfig {
        self.configs.get(&prayer_type).unwrap_or(&self.default)
    }

    /// Layout used for names that do not parse
    pub fn fallback(&self) -> &RosaryConfig {
        &self.default
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Validate every layout, returning a list of problems (empty if valid)
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for prayer_type in PrayerType::all() {
            match self.configs.get(&prayer_type) {
                Some(config) => errors.extend(config.validate()),
                None => errors.push(format!("No bead layout for '{}'", prayer_type)),
            }
        }
        errors
    }
}

/// Bead layout for a prayer type
pub fn rosary_config(prayer_type: PrayerType) -> &'static RosaryConfig {
    bead_catalog().get(prayer_type)
}

/// Bead layout by name, falling back to the standard rosary for unknown names
pub fn rosary_config_by_name(name: &str) -> &'static RosaryConfig {
    match name.parse::<PrayerType>() {
        Ok(prayer_type) => rosary_config(prayer_type),
        Err(e) => {
            tracing::warn!("{}; using the standard rosary layout", e);
            bead_catalog().fallback()
        }
    }
}

impl RosaryConfig {
    /// Validate layout invariants, returning a list of problems
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let name = self.prayer_type.slug();

        if self.bead_sequence.is_empty() {
            errors.push(format!("Layout '{}' has no beads", name));
            return errors;
        }

        if self.total_beads != self.bead_sequence.len() {
            errors.push(format!(
                "Layout '{}': total_beads {} != sequence length {}",
                name,
                self.total_beads,
                self.bead_sequence.len()
            ));
        }

        for (index, bead) in self.bead_sequence.iter().enumerate() {
            if bead.position != index {
                errors.push(format!(
                    "Layout '{}': bead at index {} has position {}",
                    name, index, bead.position
                ));
            }
        }

        let first = self.bead_sequence[0].bead_type;
        if first != BeadType::Cross && first != BeadType::Medal {
            errors.push(format!(
                "Layout '{}' starts with {:?} instead of a cross or medal",
                name, first
            ));
        }

        errors
    }

    pub fn bead(&self, index: usize) -> Option<&Bead> {
        self.bead_sequence.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_every_prayer_type() {
        let catalog = build_bead_catalog();
        assert_eq!(catalog.len(), 11);
    }

    #[test]
    fn test_default_catalog_validates() {
        let errors = bead_catalog().validate();
        assert!(errors.is_empty(), "Bead catalog errors: {:?}", errors);
    }

    #[test]
    fn test_standard_rosary_layout() {
        let config = rosary_config(PrayerType::DailyRosary);
        assert_eq!(config.total_beads, 69);
        assert_eq!(config.bead_sequence[0].bead_type, BeadType::Cross);
        assert_eq!(config.bead_sequence[6].bead_type, BeadType::Medal);
        for decade_start in [7, 19, 31, 43, 55] {
            let bead = &config.bead_sequence[decade_start];
            assert_eq!(bead.bead_type, BeadType::LargeBead);
            assert_eq!(bead.prayers, vec!["our_father".to_string()]);
        }
        assert_eq!(config.bead_sequence[7].label.as_deref(), Some("Decade 1"));
        assert_eq!(config.bead_sequence[55].label.as_deref(), Some("Decade 5"));
        assert_eq!(config.bead_sequence[68].bead_type, BeadType::Medal);
    }

    #[test]
    fn test_novena_shares_rosary_layout() {
        let daily = rosary_config(PrayerType::DailyRosary);
        let novena = rosary_config(PrayerType::FiftyFourDayNovena);
        assert_eq!(daily.total_beads, novena.total_beads);
        assert_eq!(novena.name, "54-Day Rosary Novena");
        assert!(novena.bead_sequence[0].id.starts_with("54-day-novena"));
    }

    #[test]
    fn test_divine_mercy_layout() {
        let config = rosary_config(PrayerType::Chaplet(ChapletType::DivineMercy));
        assert_eq!(config.total_beads, 62);
        for decade in 0..5 {
            let bead = &config.bead_sequence[6 + 11 * decade];
            assert_eq!(bead.bead_type, BeadType::LargeBead);
            assert_eq!(bead.prayers, vec!["eternal_father".to_string()]);
        }
        assert_eq!(config.bead_sequence[61].bead_type, BeadType::Medal);
    }

    #[test]
    fn test_chaplet_sizes() {
        let expected = [
            (ChapletType::SevenSorrows, 60),
            (ChapletType::StMichael, 41),
            (ChapletType::SacredHeart, 34),
            (ChapletType::InfantOfPrague, 16),
            (ChapletType::HolySpirit, 36),
            (ChapletType::HolyFace, 37),
            (ChapletType::PreciousBlood, 50),
            (ChapletType::StJoseph, 51),
        ];
        for (chaplet, total) in expected {
            assert_eq!(
                rosary_config(PrayerType::Chaplet(chaplet)).total_beads,
                total,
                "{:?}",
                chaplet
            );
        }
    }

    #[test]
    fn test_synthetic_group_pattern() {
        let config = rosary_config(PrayerType::Chaplet(ChapletType::HolyFace));
        for (index, bead) in config.bead_sequence.iter().enumerate().skip(1) {
            let expected = if (index - 1) % 6 == 0 {
                BeadType::LargeBead
            } else {
                BeadType::SmallBead
            };
            assert_eq!(bead.bead_type, expected, "bead {}", index);
        }
    }

    #[test]
    fn test_unknown_name_falls_back_to_rosary() {
        let config = rosary_config_by_name("chaplet-of-nowhere");
        assert_eq!(config.prayer_type, PrayerType::DailyRosary);
        assert_eq!(config.total_beads, 69);

        let mercy = rosary_config_by_name("divine-mercy");
        assert_eq!(mercy.total_beads, 62);
    }
}
