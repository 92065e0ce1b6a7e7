//! [`Broker`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::{Date, DateTime};
use common::{unit, DateOf, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Real estate broker selling [`Sale`]s and earning commissions on them.
///
/// [`Sale`]: crate::domain::Sale
#[derive(Clone, Debug)]
pub struct Broker {
    /// ID of this [`Broker`].
    pub id: Id,

    /// [`Name`] of this [`Broker`].
    pub name: Name,

    /// [`Email`] of this [`Broker`].
    pub email: Email,

    /// [`Phone`] of this [`Broker`], if any.
    pub phone: Option<Phone>,

    /// [`Date`] when this [`Broker`] was hired.
    pub hired_on: HiringDate,

    /// [`DateTime`] when this [`Broker`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Broker`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[expect(
        clippy::new_without_default,
        reason = "random `Id` is not a default one"
    )]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of a [`Broker`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Email address of a [`Broker`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    ///
    /// Only the overall `local@domain.tld` shape is checked, the mailbox
    /// itself is never verified.
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]{1,64}@[^\s@.]+(\.[^\s@.]+)+$")
                .expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 254 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Phone number of a [`Broker`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `number` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    ///
    /// Accepts an optional country code followed by an area code (possibly
    /// in parentheses) and an 8 or 9 digits subscriber number.
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                r"^(\+?\d{1,3}[-\s]?)?(\(\d{2,3}\)|\d{2,3})[-\s]?\d{4,5}[-\s]?\d{4}$",
            )
            .expect("valid regex")
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// [`Date`] when a [`Broker`] was hired.
pub type HiringDate = DateOf<(Broker, unit::Hiring)>;

/// [`DateTime`] when a [`Broker`] was created.
pub type CreationDateTime = DateTimeOf<(Broker, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Email, Name, Phone};

    #[test]
    fn validates_name() {
        assert!(Name::new("Ana Souza").is_some());
        assert!(Name::new("").is_none());
        assert!(Name::new(" Ana").is_none());
        assert!(Name::new("Ana ").is_none());
        assert!(Name::new("a".repeat(513)).is_none());
    }

    #[test]
    fn validates_email() {
        assert!(Email::new("ana@imobiliaria.com.br").is_some());
        assert!(Email::new("ana.souza+vendas@example.com").is_some());

        assert!(Email::new("ana").is_none());
        assert!(Email::new("ana@localhost").is_none());
        assert!(Email::new("ana @example.com").is_none());
        assert!(Email::new("@example.com").is_none());
    }

    #[test]
    fn validates_phone() {
        assert!(Phone::new("(11) 98765-4321").is_some());
        assert!(Phone::new("+55 11 98765-4321").is_some());
        assert!(Phone::new("1133334444").is_some());

        assert!(Phone::new("12345").is_none());
        assert!(Phone::new("phone").is_none());
    }
}
