//! [`Sale`] read model definitions.

use std::{fmt, str::FromStr};

use common::{Date, DateOf};
use derive_more::{Display, Error};

use crate::domain::sale;
#[cfg(doc)]
use crate::domain::Sale;

/// Period of [`Sale`]s closing, both ends inclusive.
///
/// Missing end means the period is unbounded at that side.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Period {
    /// First [`Date`] of this [`Period`].
    pub from: Option<sale::ClosingDate>,

    /// Last [`Date`] of this [`Period`].
    pub to: Option<sale::ClosingDate>,
}

impl Period {
    /// Returns [`Period`] covering the whole provided [`Month`].
    #[must_use]
    pub fn month(month: Month) -> Self {
        Self {
            from: Some(month.first_day()),
            to: Some(month.last_day()),
        }
    }

    /// Indicates whether the provided [`Date`] belongs to this [`Period`].
    #[must_use]
    pub fn contains(&self, date: sale::ClosingDate) -> bool {
        self.from.map_or(true, |from| from <= date)
            && self.to.map_or(true, |to| date <= to)
    }
}

/// Calendar month [`Sale`]s are closed in.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Month {
    /// Year of this [`Month`].
    year: i32,

    /// Number of this [`Month`] in its year, in `1..=12` range.
    month: u8,
}

impl Month {
    /// Creates a new [`Month`] out of the provided `year` and `month` number.
    ///
    /// [`None`] is returned if the `month` is not in `1..=12` range, or the
    /// `year` is out of the supported range.
    #[must_use]
    pub fn new(year: i32, month: u8) -> Option<Self> {
        Date::from_calendar_date(year, month, 1).map(|_| Self { year, month })
    }

    /// Returns the [`Month`] the provided [`Date`] belongs to.
    #[must_use]
    pub fn of<Of: ?Sized>(date: DateOf<Of>) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Returns the first day of this [`Month`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn first_day(self) -> sale::ClosingDate {
        sale::ClosingDate::from_calendar_date(self.year, self.month, 1)
            .expect("checked on creation")
    }

    /// Returns the last day of this [`Month`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn last_day(self) -> sale::ClosingDate {
        (28..=31)
            .rev()
            .find_map(|day| {
                sale::ClosingDate::from_calendar_date(
                    self.year, self.month, day,
                )
            })
            .expect("every month has at least 28 days")
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Error of parsing a [`Month`] from a string.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid `YYYY-MM` month")]
pub struct ParseMonthError;

impl FromStr for Month {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s.split_once('-').ok_or(ParseMonthError)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(ParseMonthError);
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(ParseMonthError);
        }
        Self::new(
            year.parse().map_err(|_| ParseMonthError)?,
            month.parse().map_err(|_| ParseMonthError)?,
        )
        .ok_or(ParseMonthError)
    }
}

pub mod list {
    //! [`Sale`]s list definitions.

    use std::{fmt, str::FromStr};

    use common::{define_pagination, Date, DateTime};
    use derive_more::{Display, Error, From, Into};

    use crate::domain::{broker, development, sale, Sale};

    use super::Month;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = sale::Id;

    /// Cursor pointing to a specific [`Sale`] in a list.
    ///
    /// [`Sale`]s are listed from the newest to the oldest one.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct Cursor {
        /// [`DateTime`] the [`Sale`] was created at.
        pub created_at: sale::CreationDateTime,

        /// ID of the [`Sale`].
        pub id: sale::Id,
    }

    impl From<&Sale> for Cursor {
        fn from(sale: &Sale) -> Self {
            Self {
                created_at: sale.created_at,
                id: sale.id,
            }
        }
    }

    impl fmt::Display for Cursor {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}_{}", self.created_at.to_rfc3339(), self.id)
        }
    }

    /// Error of parsing a [`Cursor`] from a string.
    #[derive(Clone, Copy, Debug, Display, Error)]
    #[display("invalid `Cursor`")]
    pub struct ParseCursorError;

    impl FromStr for Cursor {
        type Err = ParseCursorError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let (created_at, id) =
                s.split_once('_').ok_or(ParseCursorError)?;
            Ok(Self {
                created_at: DateTime::from_rfc3339(created_at)
                    .map_err(|_| ParseCursorError)?
                    .coerce(),
                id: id.parse().map_err(|_| ParseCursorError)?,
            })
        }
    }

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// ID of the [`Broker`] who closed the [`Sale`]s.
        ///
        /// [`Broker`]: crate::domain::Broker
        pub broker_id: Option<broker::Id>,

        /// ID of the [`Development`] the [`Sale`]s belong to.
        ///
        /// [`Development`]: crate::domain::Development
        pub development_id: Option<development::Id>,

        /// [`Month`] the [`Sale`]s were closed in.
        pub month: Option<Month>,

        /// [`sale::Status`] the [`Sale`]s have.
        pub status: Option<StatusAsOf>,
    }

    impl Filter {
        /// Indicates whether the provided [`Sale`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, sale: &Sale) -> bool {
            self.broker_id.map_or(true, |id| sale.broker_id == id)
                && self
                    .development_id
                    .map_or(true, |id| sale.development_id == id)
                && self
                    .month
                    .map_or(true, |m| Month::of(sale.sold_on) == m)
                && self
                    .status
                    .map_or(true, |s| sale.status(s.today) == s.status)
        }
    }

    /// [`sale::Status`] as of the provided [`Date`].
    #[derive(Clone, Copy, Debug)]
    pub struct StatusAsOf {
        /// Required [`sale::Status`].
        pub status: sale::Status,

        /// [`Date`] to evaluate the [`sale::Status`] on.
        pub today: Date,
    }

    /// Total count of [`Sale`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}

#[cfg(test)]
mod spec {
    use super::{list::Cursor, Month, Period};
    use crate::domain::sale;

    #[test]
    fn parses_month() {
        let m: Month = "2024-02".parse().unwrap();
        assert_eq!(m.to_string(), "2024-02");
        assert_eq!(m.first_day().to_string(), "2024-02-01");
        assert_eq!(m.last_day().to_string(), "2024-02-29");

        for invalid in ["2024-13", "2024-00", "2024-2", "24-02", "2024/02", ""]
        {
            assert!(invalid.parse::<Month>().is_err(), "{invalid}");
        }
    }

    #[test]
    fn bounds_month_period() {
        let period = Period::month("2023-12".parse().unwrap());
        let day = |s: &str| s.parse::<sale::ClosingDate>().unwrap();

        assert!(period.contains(day("2023-12-01")));
        assert!(period.contains(day("2023-12-31")));
        assert!(!period.contains(day("2023-11-30")));
        assert!(!period.contains(day("2024-01-01")));
        assert!(Period::default().contains(day("2024-01-01")));
    }

    #[test]
    fn round_trips_cursor() {
        let cursor: Cursor =
            "2024-02-01T10:00:00.5Z_67e55044-10b1-426f-9247-bb680e5fe0c8"
                .parse()
                .unwrap();
        assert_eq!(
            cursor.to_string(),
            "2024-02-01T10:00:00.5Z_67e55044-10b1-426f-9247-bb680e5fe0c8",
        );
        assert!("2024-02-01T10:00:00Z".parse::<Cursor>().is_err());
    }
}
