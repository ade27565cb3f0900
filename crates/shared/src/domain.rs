use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(FestivalId);
id_newtype!(PerformerId);

pub const DEFAULT_FESTIVAL_NAME: &str = "unknown";
pub const DEFAULT_FESTIVAL_LOCATION: &str = "location unknown";

/// Upper bound, in characters, for every text column.
pub const MAX_TEXT_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Festival {
    pub id: FestivalId,
    pub name: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub location: String,
}

impl Festival {
    pub fn absolute_url(&self) -> String {
        festival_url(self.id)
    }

    pub fn input(&self) -> FestivalInput {
        FestivalInput {
            name: self.name.clone(),
            start: self.start,
            end: self.end,
            location: self.location.clone(),
        }
    }
}

impl fmt::Display for Festival {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}\u{2013}{}), {}",
            self.name,
            DateLabel(self.start),
            DateLabel(self.end),
            self.location
        )
    }
}

struct DateLabel(Option<NaiveDate>);

impl fmt::Display for DateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            None => f.write_str("?"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Performer {
    pub id: PerformerId,
    pub name: String,
    pub is_band: bool,
    pub festival: Option<FestivalId>,
}

impl Performer {
    pub fn absolute_url(&self) -> String {
        performer_url(self.id)
    }

    pub fn role(&self) -> &'static str {
        role_label(self.is_band)
    }

    pub fn input(&self) -> PerformerInput {
        PerformerInput {
            name: self.name.clone(),
            is_band: self.is_band,
            festival: self.festival,
        }
    }
}

impl fmt::Display for Performer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.role())
    }
}

pub fn role_label(is_band: bool) -> &'static str {
    if is_band { "band" } else { "musician" }
}

pub fn festival_url(id: FestivalId) -> String {
    format!("/festivals/{}/", id.0)
}

pub fn performer_url(id: PerformerId) -> String {
    format!("/performers/{}/", id.0)
}

/// Field values of a festival that passed form validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FestivalInput {
    pub name: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub location: String,
}

impl Default for FestivalInput {
    fn default() -> Self {
        Self {
            name: DEFAULT_FESTIVAL_NAME.to_string(),
            start: None,
            end: None,
            location: DEFAULT_FESTIVAL_LOCATION.to_string(),
        }
    }
}

/// Field values of a performer that passed form validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerformerInput {
    pub name: String,
    pub is_band: bool,
    pub festival: Option<FestivalId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueSummary {
    pub performers: i64,
    pub festivals: i64,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
