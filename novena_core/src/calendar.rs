//! Day arithmetic for the 54-day rosary novena.
//!
//! Days 1-27 are prayed in petition, days 28-54 in thanksgiving. Each phase
//! is nine three-day cycles of Joyful, Sorrowful and Glorious mysteries.

use crate::{CycleInfo, Error, Mystery, Phase, Result};

pub const NOVENA_DAYS: u32 = 54;
pub const PHASE_DAYS: u32 = 27;

const ROTATION: [Mystery; 3] = [Mystery::Joyful, Mystery::Sorrowful, Mystery::Glorious];

/// A day number known to lie within 1..=54
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NovenaDay(u32);

impl NovenaDay {
    /// Validate a caller-supplied day, rejecting anything outside 1..=54
    pub fn new(day: u32) -> Result<Self> {
        if (1..=NOVENA_DAYS).contains(&day) {
            Ok(Self(day))
        } else {
            Err(Error::DayOutOfRange(day))
        }
    }

    /// Pin a day into 1..=54
    pub fn clamped(day: u32) -> Self {
        Self(day.clamp(1, NOVENA_DAYS))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn phase(self) -> Phase {
        current_phase(self.0)
    }

    pub fn mystery(self) -> Mystery {
        mystery_for_day(self.0)
    }

    pub fn cycle_info(self) -> CycleInfo {
        cycle_info(self.0)
    }
}

fn clamp_day(day: u32) -> u32 {
    let clamped = day.clamp(1, NOVENA_DAYS);
    if clamped != day {
        tracing::debug!("Clamped novena day {} to {}", day, clamped);
    }
    clamped
}

/// Phase of the novena for a day
pub fn current_phase(day: u32) -> Phase {
    if clamp_day(day) <= PHASE_DAYS {
        Phase::Petition
    } else {
        Phase::Thanksgiving
    }
}

/// Mystery prayed on a day, rotating Joyful, Sorrowful, Glorious from day 1
pub fn mystery_for_day(day: u32) -> Mystery {
    let day = clamp_day(day);
    ROTATION[((day - 1) % 3) as usize]
}

/// Phase, three-day cycle (1..=9) and mystery for a day
pub fn cycle_info(day: u32) -> CycleInfo {
    let day = clamp_day(day);
    let phase = current_phase(day);
    let adjusted = match phase {
        Phase::Petition => day,
        Phase::Thanksgiving => day - PHASE_DAYS,
    };

    CycleInfo {
        phase,
        cycle: adjusted.div_ceil(3),
        mystery: mystery_for_day(day),
    }
}

/// Every day of the novena with its cycle info
pub fn novena_schedule() -> Vec<(u32, CycleInfo)> {
    (1..=NOVENA_DAYS).map(|day| (day, cycle_info(day))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_boundary() {
        for day in 1..=NOVENA_DAYS {
            let expected = if day <= 27 {
                Phase::Petition
            } else {
                Phase::Thanksgiving
            };
            assert_eq!(current_phase(day), expected, "day {}", day);
        }
    }

    #[test]
    fn test_mystery_rotation_period_three() {
        assert_eq!(mystery_for_day(1), Mystery::Joyful);
        assert_eq!(mystery_for_day(2), Mystery::Sorrowful);
        assert_eq!(mystery_for_day(3), Mystery::Glorious);
        for day in 1..=NOVENA_DAYS - 3 {
            assert_eq!(mystery_for_day(day), mystery_for_day(day + 3));
        }
    }

    #[test]
    fn test_each_mystery_nine_times_per_phase() {
        for mystery in ROTATION {
            let petition = (1..=27).filter(|d| mystery_for_day(*d) == mystery).count();
            let thanksgiving = (28..=54).filter(|d| mystery_for_day(*d) == mystery).count();
            assert_eq!(petition, 9, "{:?} in petition", mystery);
            assert_eq!(thanksgiving, 9, "{:?} in thanksgiving", mystery);
            assert_eq!(petition + thanksgiving, 18);
        }
    }

    #[test]
    fn test_cycle_info_boundaries() {
        assert_eq!(
            cycle_info(1),
            CycleInfo {
                phase: Phase::Petition,
                cycle: 1,
                mystery: Mystery::Joyful
            }
        );
        assert_eq!(
            cycle_info(27),
            CycleInfo {
                phase: Phase::Petition,
                cycle: 9,
                mystery: Mystery::Glorious
            }
        );
        assert_eq!(
            cycle_info(28),
            CycleInfo {
                phase: Phase::Thanksgiving,
                cycle: 1,
                mystery: Mystery::Joyful
            }
        );
        assert_eq!(
            cycle_info(54),
            CycleInfo {
                phase: Phase::Thanksgiving,
                cycle: 9,
                mystery: Mystery::Glorious
            }
        );
    }

    #[test]
    fn test_out_of_range_days_are_clamped() {
        assert_eq!(cycle_info(0), cycle_info(1));
        assert_eq!(cycle_info(99), cycle_info(54));
        assert_eq!(current_phase(0), Phase::Petition);
    }

    #[test]
    fn test_novena_day_rejects_out_of_range() {
        assert!(NovenaDay::new(0).is_err());
        assert!(NovenaDay::new(55).is_err());
        assert_eq!(NovenaDay::new(54).unwrap().get(), 54);
        assert_eq!(NovenaDay::clamped(70).get(), 54);
    }

    #[test]
    fn test_schedule_covers_every_day_once() {
        let schedule = novena_schedule();
        assert_eq!(schedule.len(), 54);
        assert_eq!(schedule.first().unwrap().0, 1);
        assert_eq!(schedule.last().unwrap().0, 54);
        assert!(schedule.iter().all(|(_, info)| (1..=9).contains(&info.cycle)));
    }
}
