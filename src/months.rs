use crate::error::{PortfolioAnalyticsError, Result};
use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar month of a due date, named the way every report labels it.
///
/// Declaration order is the reporting order: `Month::ALL` always runs Enero..Diciembre
/// and every twelve-element array in this crate is indexed by [`Month::index`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum Month {
    Enero,
    Febrero,
    Marzo,
    Abril,
    Mayo,
    Junio,
    Julio,
    Agosto,
    Septiembre,
    Octubre,
    Noviembre,
    Diciembre,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Enero,
        Month::Febrero,
        Month::Marzo,
        Month::Abril,
        Month::Mayo,
        Month::Junio,
        Month::Julio,
        Month::Agosto,
        Month::Septiembre,
        Month::Octubre,
        Month::Noviembre,
        Month::Diciembre,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Month::Enero => "Enero",
            Month::Febrero => "Febrero",
            Month::Marzo => "Marzo",
            Month::Abril => "Abril",
            Month::Mayo => "Mayo",
            Month::Junio => "Junio",
            Month::Julio => "Julio",
            Month::Agosto => "Agosto",
            Month::Septiembre => "Septiembre",
            Month::Octubre => "Octubre",
            Month::Noviembre => "Noviembre",
            Month::Diciembre => "Diciembre",
        }
    }

    /// 0-based position in the reporting order (Enero = 0).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Month> {
        Self::ALL.get(index).copied()
    }

    /// Month-of-year of a date; the year is ignored.
    pub fn from_date(date: NaiveDate) -> Month {
        Self::ALL[date.month0() as usize]
    }

    /// The preceding month in reporting order. Enero has none; there is no wrap to
    /// the previous year's Diciembre.
    pub fn previous(self) -> Option<Month> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn names() -> [&'static str; 12] {
        Self::ALL.map(Month::name)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = PortfolioAnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|month| month.name() == s)
            .ok_or_else(|| PortfolioAnalyticsError::InvalidMonth(s.to_string()))
    }
}
