#![forbid(unsafe_code)]

//! Core domain model and logic for the 54-day rosary novena tracker.
//!
//! This crate provides:
//! - Novena day arithmetic (phase, three-day cycle, mystery)
//! - Prayer texts and guided prayer steps
//! - Bead layouts for the rosary and chaplets, and step/bead mapping
//! - Liturgical feast sources and novena recommendations
//! - Persistence of the caller-owned novena progress

pub mod types;
pub mod error;
pub mod calendar;
pub mod prayers;
pub mod beads;
pub mod mapping;
pub mod feasts;
pub mod recommend;
pub mod config;
pub mod logging;
pub mod state;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use calendar::{current_phase, cycle_info, mystery_for_day, novena_schedule, NovenaDay};
pub use prayers::{closing_prayer, decade_prayers, opening_prayer, prayer_steps, StepContext};
pub use beads::{rosary_config, rosary_config_by_name};
pub use mapping::{bead_changed, bead_index_for_step, step_index_for_bead, step_mapping};
pub use feasts::{
    BundledCalendarProvider, CalendarCache, CalendarProvider, FeastCalendar, JsonCalendarProvider,
    StaticCalendarProvider,
};
pub use recommend::{recommend, LiturgicalCalendarConfig, NovenaRecommender};
pub use config::Config;
pub use state::NovenaProgress;
