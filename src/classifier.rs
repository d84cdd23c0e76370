//! Raw survey code to canonical category lookup.
//!
//! Each axis has its own static table. Extending the taxonomy means adding
//! rows here; lookups that miss fail with [`OdError::UnknownCode`].

use crate::error::{OdError, Result};
use crate::taxonomy::{Axis, Category, Mode, Purpose, TimePeriod};

static MODE_CODES: &[(&str, Mode)] = &[
    ("SOV", Mode::Auto),  // single-occupant vehicle
    ("HOV2", Mode::Auto), // 2 occupants
    ("HOV3", Mode::Auto), // 3+ occupants
    ("SB", Mode::Auto),   // school bus
    ("WAT", Mode::Transit),
    ("PNR", Mode::Transit),
    ("RNUP", Mode::Transit),
    ("KNR", Mode::Transit),
    ("RNK", Mode::Transit),
    ("Bike", Mode::Active),
    ("Walk", Mode::Active),
];

static PURPOSE_CODES: &[(&str, Purpose)] = &[
    ("O", Purpose::Home),
    ("W", Purpose::Work),
    ("S", Purpose::School),
    ("H", Purpose::Shop),
    ("T", Purpose::Eat),
    ("C", Purpose::Other), // escort
    ("P", Purpose::Other), // personal business
    ("Q", Purpose::Other), // quick stop
    ("L", Purpose::Other), // social
    ("R", Purpose::Other), // recreation
];

static TIME_CODES: &[(&str, TimePeriod)] = &[
    ("1", TimePeriod::Early),
    ("21", TimePeriod::AmRush),
    ("22", TimePeriod::AmRush),
    ("23", TimePeriod::AmRush),
    ("3", TimePeriod::Midday),
    ("41", TimePeriod::PmRush),
    ("42", TimePeriod::PmRush),
    ("43", TimePeriod::PmRush),
    ("5", TimePeriod::Evening),
    ("6", TimePeriod::Overnight),
];

fn lookup<T: Copy>(table: &[(&str, T)], axis: Axis, code: &str) -> Result<T> {
    table
        .iter()
        .find(|(raw, _)| *raw == code)
        .map(|(_, value)| *value)
        .ok_or_else(|| OdError::UnknownCode {
            axis,
            code: code.to_string(),
        })
}

/// Classifies `code` on the given axis.
pub fn classify(axis: Axis, code: &str) -> Result<Category> {
    match axis {
        Axis::Mode => mode(code).map(Category::Mode),
        Axis::Purpose => purpose(code).map(Category::Purpose),
        Axis::Time => time_period(code).map(Category::Time),
    }
}

pub fn mode(code: &str) -> Result<Mode> {
    lookup(MODE_CODES, Axis::Mode, code)
}

pub fn purpose(code: &str) -> Result<Purpose> {
    lookup(PURPOSE_CODES, Axis::Purpose, code)
}

pub fn time_period(code: &str) -> Result<TimePeriod> {
    lookup(TIME_CODES, Axis::Time, code)
}

/// All raw codes known on `axis`, in table order.
pub fn known_codes(axis: Axis) -> Vec<&'static str> {
    match axis {
        Axis::Mode => MODE_CODES.iter().map(|(c, _)| *c).collect(),
        Axis::Purpose => PURPOSE_CODES.iter().map(|(c, _)| *c).collect(),
        Axis::Time => TIME_CODES.iter().map(|(c, _)| *c).collect(),
    }
}
