//! Step-to-bead mapping for guided prayer.
//!
//! A guided prayer has more steps than the string has distinct bead
//! positions worth animating, so several steps can resolve to one bead.
//! The standard rosary and the Divine Mercy chaplet use hand-authored
//! tables; every other chaplet uses an approximate proportional spread.

use crate::beads::rosary_config;
use crate::{ChapletType, PrayerStepMapping, PrayerType, RosaryConfig};
use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug)]
struct MappingEntry {
    step: usize,
    bead: usize,
    step_id: &'static str,
    description: &'static str,
}

const fn entry(
    step: usize,
    bead: usize,
    step_id: &'static str,
    description: &'static str,
) -> MappingEntry {
    MappingEntry {
        step,
        bead,
        step_id,
        description,
    }
}

// Beads 7, 19, 31, 43 and 55 are the Our Father beads opening each decade
// of the 69-position standard rosary.
const DAILY_ROSARY_MAPPING: &[MappingEntry] = &[
    entry(0, 0, "intro", "Sign of the Cross and Creed on the crucifix"),
    entry(1, 1, "rosary-opening", "Our Father, three Hail Marys, Glory Be"),
    entry(2, 6, "mysteries-intro", "Announce the mysteries at the centre medal"),
    entry(3, 7, "decade-1", "First decade"),
    entry(4, 19, "decade-2", "Second decade"),
    entry(5, 31, "decade-3", "Third decade"),
    entry(6, 43, "decade-4", "Fourth decade"),
    entry(7, 55, "decade-5", "Fifth decade"),
    entry(8, 67, "hail-holy-queen", "Hail, Holy Queen"),
    entry(9, 68, "final-prayer", "Concluding prayer"),
];

const NOVENA_MAPPING: &[MappingEntry] = &[
    entry(0, 0, "intro", "Sign of the Cross and Creed on the crucifix"),
    entry(1, 0, "novena-opening", "Novena opening prayer on the crucifix"),
    entry(2, 1, "rosary-opening", "Our Father, three Hail Marys, Glory Be"),
    entry(3, 6, "mysteries-intro", "Announce the mysteries at the centre medal"),
    entry(4, 7, "decade-1", "First decade"),
    entry(5, 19, "decade-2", "Second decade"),
    entry(6, 31, "decade-3", "Third decade"),
    entry(7, 43, "decade-4", "Fourth decade"),
    entry(8, 55, "decade-5", "Fifth decade"),
    entry(9, 67, "hail-holy-queen", "Hail, Holy Queen"),
    entry(10, 68, "final-prayer", "Concluding prayer"),
    entry(11, 68, "novena-closing", "Novena closing prayer"),
    entry(12, 68, "conclusion", "Conclusion"),
];

// Decade d opens on bead 6 + 11 * d.
const DIVINE_MERCY_MAPPING: &[MappingEntry] = &[
    entry(0, 0, "intro", "Sign of the Cross on the crucifix"),
    entry(1, 1, "opening", "Our Father, Hail Mary, Creed"),
    entry(2, 6, "decade-1", "First decade"),
    entry(3, 17, "decade-2", "Second decade"),
    entry(4, 28, "decade-3", "Third decade"),
    entry(5, 39, "decade-4", "Fourth decade"),
    entry(6, 50, "decade-5", "Fifth decade"),
    entry(7, 61, "closing", "Holy God, three times"),
];

const MAX_PROPORTIONAL_STEPS: usize = 10;
const BEADS_PER_STEP: usize = 5;

fn from_table(table: &[MappingEntry], config: &RosaryConfig) -> Vec<PrayerStepMapping> {
    table
        .iter()
        .map(|e| PrayerStepMapping {
            step_index: e.step,
            bead_index: e.bead,
            step_id: e.step_id.to_string(),
            bead_id: bead_id(config, e.bead),
            description: e.description.to_string(),
        })
        .collect()
}

fn bead_id(config: &RosaryConfig, index: usize) -> String {
    config
        .bead(index)
        .map(|b| b.id.clone())
        .unwrap_or_else(|| format!("{}-bead-{}", config.prayer_type.slug(), index))
}

/// Hand-authored mapping for the daily rosary or the 54-day novena
pub fn create_rosary_step_mapping(is_novena: bool) -> Vec<PrayerStepMapping> {
    if is_novena {
        from_table(NOVENA_MAPPING, rosary_config(PrayerType::FiftyFourDayNovena))
    } else {
        from_table(DAILY_ROSARY_MAPPING, rosary_config(PrayerType::DailyRosary))
    }
}

/// Mapping for a chaplet: exact for Divine Mercy, proportional otherwise
pub fn create_chaplet_step_mapping(chaplet: ChapletType) -> Vec<PrayerStepMapping> {
    let config = rosary_config(PrayerType::Chaplet(chaplet));
    match chaplet {
        ChapletType::DivineMercy => from_table(DIVINE_MERCY_MAPPING, config),
        _ => proportional_step_mapping(config),
    }
}

/// Approximate mapping spreading up to ten steps evenly over a bead string
///
/// `total_steps = min(total_beads / 5, 10)` taken as a real number, and
/// step `i` (for every `i < total_steps`) lands on
/// `floor(i / total_steps * total_beads)`. Both are evaluated in integers:
/// with `span = min(total_beads, 50)` the step count is the number of `i`
/// with `5 * i < span`, and the bead is `5 * i * total_beads / span`.
/// This keeps the bead marker moving forward but does not line steps up
/// with any particular prayer.
pub fn proportional_step_mapping(config: &RosaryConfig) -> Vec<PrayerStepMapping> {
    let total_beads = config.bead_sequence.len();
    let span = total_beads.min(MAX_PROPORTIONAL_STEPS * BEADS_PER_STEP);
    let total_steps = span.div_ceil(BEADS_PER_STEP);

    (0..total_steps)
        .map(|i| {
            let bead_index = BEADS_PER_STEP * i * total_beads / span;
            PrayerStepMapping {
                step_index: i,
                bead_index,
                step_id: format!("step-{}", i + 1),
                bead_id: bead_id(config, bead_index),
                description: format!("Approximate position {} of {}", i + 1, total_steps),
            }
        })
        .collect()
}

fn build_mapping(prayer_type: PrayerType) -> Vec<PrayerStepMapping> {
    match prayer_type {
        PrayerType::DailyRosary => create_rosary_step_mapping(false),
        PrayerType::FiftyFourDayNovena => create_rosary_step_mapping(true),
        PrayerType::Chaplet(chaplet) => create_chaplet_step_mapping(chaplet),
    }
}

static MAPPINGS: Lazy<HashMap<PrayerType, Vec<PrayerStepMapping>>> = Lazy::new(|| {
    PrayerType::all()
        .into_iter()
        .map(|pt| (pt, build_mapping(pt)))
        .collect()
});

/// Cached step mapping for a prayer type, ordered by step index
pub fn step_mapping(prayer_type: PrayerType) -> &'static [PrayerStepMapping] {
    MAPPINGS
        .get(&prayer_type)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Resolve a step to a bead against an explicit mapping
///
/// Exact match first, then the most recent mapped step before it, then bead 0.
pub fn resolve_bead(mapping: &[PrayerStepMapping], step_index: usize) -> usize {
    if let Some(exact) = mapping.iter().find(|m| m.step_index == step_index) {
        return exact.bead_index;
    }

    mapping
        .iter()
        .filter(|m| m.step_index <= step_index)
        .max_by_key(|m| m.step_index)
        .map(|m| m.bead_index)
        .unwrap_or(0)
}

/// Resolve a bead to a step against an explicit mapping
///
/// Exact match (the first step on that bead), then the nearest mapped bead
/// below it, then step 0.
pub fn resolve_step(mapping: &[PrayerStepMapping], bead_index: usize) -> usize {
    if let Some(exact) = mapping.iter().find(|m| m.bead_index == bead_index) {
        return exact.step_index;
    }

    mapping
        .iter()
        .filter(|m| m.bead_index <= bead_index)
        .min_by_key(|m| (std::cmp::Reverse(m.bead_index), m.step_index))
        .map(|m| m.step_index)
        .unwrap_or(0)
}

/// Bead to highlight while a guided prayer shows `step_index`
pub fn bead_index_for_step(step_index: usize, prayer_type: PrayerType) -> usize {
    resolve_bead(step_mapping(prayer_type), step_index)
}

/// Step to jump to when the user taps `bead_index`
pub fn step_index_for_bead(bead_index: usize, prayer_type: PrayerType) -> usize {
    resolve_step(step_mapping(prayer_type), bead_index)
}

/// Whether advancing between two steps moves the bead marker
pub fn bead_changed(previous_step: usize, next_step: usize, prayer_type: PrayerType) -> bool {
    bead_index_for_step(previous_step, prayer_type) != bead_index_for_step(next_step, prayer_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prayers::{prayer_steps, StepContext};
    use crate::{Mystery, Phase};

    #[test]
    fn test_first_decade_round_trip() {
        assert_eq!(step_index_for_bead(7, PrayerType::DailyRosary), 3);
        assert_eq!(bead_index_for_step(3, PrayerType::DailyRosary), 7);
    }

    #[test]
    fn test_novena_extra_opening_step_shares_cross() {
        assert_eq!(bead_index_for_step(0, PrayerType::FiftyFourDayNovena), 0);
        assert_eq!(bead_index_for_step(1, PrayerType::FiftyFourDayNovena), 0);
        assert_eq!(step_index_for_bead(0, PrayerType::FiftyFourDayNovena), 0);
        assert_eq!(bead_index_for_step(4, PrayerType::FiftyFourDayNovena), 7);
        for step in 10..=12 {
            assert_eq!(bead_index_for_step(step, PrayerType::FiftyFourDayNovena), 68);
        }
    }

    #[test]
    fn test_between_beads_resolves_to_previous_entry() {
        // Hail Mary beads of the first decade belong to the decade step
        assert_eq!(step_index_for_bead(12, PrayerType::DailyRosary), 3);
        assert_eq!(step_index_for_bead(66, PrayerType::DailyRosary), 7);
        // Steps past the table stay on the last bead
        assert_eq!(bead_index_for_step(40, PrayerType::DailyRosary), 68);
    }

    #[test]
    fn test_empty_mapping_defaults_to_zero() {
        assert_eq!(resolve_bead(&[], 5), 0);
        assert_eq!(resolve_step(&[], 5), 0);
    }

    #[test]
    fn test_mappings_are_monotonic() {
        for prayer_type in PrayerType::all() {
            let mapping = step_mapping(prayer_type);
            assert!(!mapping.is_empty(), "{} has no mapping", prayer_type);
            for pair in mapping.windows(2) {
                assert!(pair[0].step_index < pair[1].step_index);
                assert!(
                    pair[0].bead_index <= pair[1].bead_index,
                    "{} not monotonic at step {}",
                    prayer_type,
                    pair[1].step_index
                );
            }
        }
    }

    #[test]
    fn test_mapped_beads_exist() {
        for prayer_type in PrayerType::all() {
            let config = rosary_config(prayer_type);
            for m in step_mapping(prayer_type) {
                assert!(m.bead_index < config.total_beads);
                assert_eq!(m.bead_id, config.bead_sequence[m.bead_index].id);
            }
        }
    }

    #[test]
    fn test_round_trip_never_overshoots() {
        for bead in 0..69 {
            let step = step_index_for_bead(bead, PrayerType::DailyRosary);
            assert!(bead_index_for_step(step, PrayerType::DailyRosary) <= bead);
        }
    }

    #[test]
    fn test_divine_mercy_table() {
        let beads: Vec<_> = step_mapping(PrayerType::Chaplet(ChapletType::DivineMercy))
            .iter()
            .map(|m| m.bead_index)
            .collect();
        assert_eq!(beads, vec![0, 1, 6, 17, 28, 39, 50, 61]);
    }

    #[test]
    fn test_proportional_mapping_for_seven_sorrows() {
        let mapping = step_mapping(PrayerType::Chaplet(ChapletType::SevenSorrows));
        assert_eq!(mapping.len(), 10);
        let beads: Vec<_> = mapping.iter().map(|m| m.bead_index).collect();
        assert_eq!(beads, vec![0, 6, 12, 18, 24, 30, 36, 42, 48, 54]);
    }

    #[test]
    fn test_proportional_mapping_small_chaplet() {
        let mapping = step_mapping(PrayerType::Chaplet(ChapletType::InfantOfPrague));
        // 16 beads -> 3.2 steps
        let beads: Vec<_> = mapping.iter().map(|m| m.bead_index).collect();
        assert_eq!(beads, vec![0, 5, 10, 15]);
    }

    #[test]
    fn test_proportional_mapping_keeps_fractional_step() {
        let beads = |chaplet| -> Vec<usize> {
            step_mapping(PrayerType::Chaplet(chaplet))
                .iter()
                .map(|m| m.bead_index)
                .collect()
        };
        // 34 beads -> 6.8 steps, one every five beads
        assert_eq!(beads(ChapletType::SacredHeart), vec![0, 5, 10, 15, 20, 25, 30]);
        // 41 beads -> 8.2 steps
        assert_eq!(
            beads(ChapletType::StMichael),
            vec![0, 5, 10, 15, 20, 25, 30, 35, 40]
        );
    }

    #[test]
    fn test_proportional_mapping_matches_real_division() {
        for chaplet in ChapletType::ALL {
            if chaplet == ChapletType::DivineMercy {
                continue;
            }
            let config = rosary_config(PrayerType::Chaplet(chaplet));
            let len = config.bead_sequence.len() as f64;
            let total_steps = (len / 5.0).min(10.0);
            let expected: Vec<usize> = (0..)
                .take_while(|i| (*i as f64) < total_steps)
                .map(|i| (i as f64 * len / total_steps + 1e-9).floor() as usize)
                .collect();
            let got: Vec<usize> = proportional_step_mapping(config)
                .iter()
                .map(|m| m.bead_index)
                .collect();
            assert_eq!(got, expected, "{}", chaplet.slug());
        }
    }

    #[test]
    fn test_proportional_mapping_tiny_layouts() {
        let mut config = rosary_config(PrayerType::Chaplet(ChapletType::InfantOfPrague)).clone();
        config.bead_sequence.truncate(3);
        let mapping = proportional_step_mapping(&config);
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping[0].bead_index, 0);

        config.bead_sequence.clear();
        assert!(proportional_step_mapping(&config).is_empty());
    }

    #[test]
    fn test_bead_changed_only_across_entries() {
        assert!(!bead_changed(0, 1, PrayerType::FiftyFourDayNovena));
        assert!(bead_changed(1, 2, PrayerType::FiftyFourDayNovena));
        assert!(!bead_changed(11, 12, PrayerType::FiftyFourDayNovena));
    }

    #[test]
    fn test_step_ids_match_generated_steps() {
        let ctx = StepContext {
            mystery: Mystery::Glorious,
            phase: Phase::Thanksgiving,
            intention: None,
        };
        for prayer_type in [
            PrayerType::DailyRosary,
            PrayerType::FiftyFourDayNovena,
            PrayerType::Chaplet(ChapletType::DivineMercy),
        ] {
            let steps = prayer_steps(prayer_type, &ctx);
            let mapping = step_mapping(prayer_type);
            assert_eq!(steps.len(), mapping.len(), "{}", prayer_type);
            for m in mapping {
                assert_eq!(steps[m.step_index].id, m.step_id);
            }
        }
    }
}
