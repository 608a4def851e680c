//! Person records.

use std::fmt;

use chrono::{DateTime, NaiveDate};

/// Validation errors returned by [`Person::try_new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    /// Surname was missing or blank once trimmed.
    EmptySurname,
    /// Name was missing or blank once trimmed.
    EmptyName,
    /// Birthdate text was neither a calendar date nor an RFC 3339 timestamp.
    InvalidBirthdate,
}

impl fmt::Display for PersonValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySurname => write!(f, "Surname is required"),
            Self::EmptyName => write!(f, "Name is required"),
            Self::InvalidBirthdate => write!(f, "Birthdate must be a date (yyyy-mm-dd)"),
        }
    }
}

impl std::error::Error for PersonValidationError {}

/// A person entry.
///
/// ## Invariants
/// - `surname` and `name` are non-empty once trimmed; the submitted text is
///   stored as given.
/// - `birthdate` is a calendar date without a time component.
///
/// # Examples
/// ```
/// use roster::domain::Person;
///
/// let person = Person::try_new("Rossi", "Mario", None).unwrap();
/// assert_eq!(person.surname(), "Rossi");
/// assert!(person.birthdate().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    surname: String,
    name: String,
    birthdate: Option<NaiveDate>,
}

impl Person {
    /// Validate and construct a person.
    pub fn try_new(
        surname: impl Into<String>,
        name: impl Into<String>,
        birthdate: Option<NaiveDate>,
    ) -> Result<Self, PersonValidationError> {
        let surname = surname.into();
        let name = name.into();
        if surname.trim().is_empty() {
            return Err(PersonValidationError::EmptySurname);
        }
        if name.trim().is_empty() {
            return Err(PersonValidationError::EmptyName);
        }
        Ok(Self {
            surname,
            name,
            birthdate,
        })
    }

    /// Family name.
    pub fn surname(&self) -> &str {
        self.surname.as_str()
    }

    /// Given name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Date of birth, if known.
    pub fn birthdate(&self) -> Option<NaiveDate> {
        self.birthdate
    }
}

/// Parse submitted birthdate text.
///
/// Blank text means "no birthdate". Accepts `yyyy-mm-dd` or an RFC 3339
/// timestamp, keeping only its calendar date.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use roster::domain::parse_birthdate;
///
/// let expected = NaiveDate::from_ymd_opt(1980, 5, 17);
/// assert_eq!(parse_birthdate("1980-05-17").unwrap(), expected);
/// assert_eq!(parse_birthdate("1980-05-17T00:00:00Z").unwrap(), expected);
/// assert_eq!(parse_birthdate("  ").unwrap(), None);
/// ```
pub fn parse_birthdate(raw: &str) -> Result<Option<NaiveDate>, PersonValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|timestamp| Some(timestamp.date_naive()))
        .map_err(|_| PersonValidationError::InvalidBirthdate)
}

/// Render a birthdate the way clients receive it (`yyyy-mm-dd`).
pub fn format_birthdate(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
