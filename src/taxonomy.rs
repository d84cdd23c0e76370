//! Canonical output categories.
//!
//! The declaration order of each `ALL` array is the axis order of every
//! serialized row: mode outer, purpose middle, time inner.

use std::fmt;

/// One of the three classification axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Mode,
    Purpose,
    Time,
}

impl Axis {
    pub fn name(self) -> &'static str {
        match self {
            Axis::Mode => "mode",
            Axis::Purpose => "purpose",
            Axis::Time => "time",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Auto,
    Transit,
    Active,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Auto, Mode::Transit, Mode::Active];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Auto => "auto",
            Mode::Transit => "transit",
            Mode::Active => "active",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    Home,
    Work,
    School,
    Shop,
    Eat,
    Other,
}

impl Purpose {
    pub const ALL: [Purpose; 6] = [
        Purpose::Home,
        Purpose::Work,
        Purpose::School,
        Purpose::Shop,
        Purpose::Eat,
        Purpose::Other,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Purpose::Home => "home",
            Purpose::Work => "work",
            Purpose::School => "school",
            Purpose::Shop => "shop",
            Purpose::Eat => "eat",
            Purpose::Other => "other",
        }
    }
}

/// Coarse time-of-day bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimePeriod {
    Early,
    AmRush,
    Midday,
    PmRush,
    Evening,
    Overnight,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 6] = [
        TimePeriod::Early,
        TimePeriod::AmRush,
        TimePeriod::Midday,
        TimePeriod::PmRush,
        TimePeriod::Evening,
        TimePeriod::Overnight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            TimePeriod::Early => "early",
            TimePeriod::AmRush => "amRush",
            TimePeriod::Midday => "midday",
            TimePeriod::PmRush => "pmRush",
            TimePeriod::Evening => "evening",
            TimePeriod::Overnight => "overnight",
        }
    }
}

/// A classified value on any axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Mode(Mode),
    Purpose(Purpose),
    Time(TimePeriod),
}

impl Category {
    pub fn axis(self) -> Axis {
        match self {
            Category::Mode(_) => Axis::Mode,
            Category::Purpose(_) => Axis::Purpose,
            Category::Time(_) => Axis::Time,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Mode(m) => m.name(),
            Category::Purpose(p) => p.name(),
            Category::Time(t) => t.name(),
        }
    }
}
