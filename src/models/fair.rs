use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{lenient_date, RecordId};
use crate::error::Error;
use crate::validation;

/// How a fair is held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FairKind {
    Virtual,
    Presencial,
    Mixta,
}

impl FairKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FairKind::Virtual => "Virtual",
            FairKind::Presencial => "Presencial",
            FairKind::Mixta => "Mixta",
        }
    }
}

impl fmt::Display for FairKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FairKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "virtual" => Ok(FairKind::Virtual),
            "presencial" => Ok(FairKind::Presencial),
            "mixta" => Ok(FairKind::Mixta),
            other => Err(Error::validation("tipo", format!("unknown fair type {}", other))),
        }
    }
}

/// A feria: a time-boxed event products and users can join
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fair {
    #[serde(rename = "id_feria")]
    pub id: RecordId,

    #[serde(rename = "nombre_feria", default)]
    pub name: String,

    #[serde(rename = "tipo", default)]
    pub kind: Option<FairKind>,

    #[serde(rename = "fechaInicio", default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,

    #[serde(rename = "fechaFin", default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,

    #[serde(rename = "reglas", default)]
    pub rules: Option<String>,
}

impl Fair {
    pub const TABLE: &'static str = "Feria";
    pub const ID: &'static str = "id_feria";

    /// Whether `day` falls inside the fair, both ends included
    pub fn is_open_on(&self, day: NaiveDate) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= day && day <= end,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewFair {
    #[serde(rename = "nombre_feria")]
    pub name: String,

    #[serde(rename = "tipo")]
    pub kind: FairKind,

    #[serde(rename = "fechaInicio")]
    pub start_date: NaiveDate,

    #[serde(rename = "fechaFin")]
    pub end_date: NaiveDate,

    #[serde(rename = "reglas")]
    pub rules: String,
}

/// Fair form input before validation
#[derive(Debug, Clone, Default)]
pub struct FairDraft {
    pub name: String,
    pub kind: Option<FairKind>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub rules: String,
}

impl FairDraft {
    /// Every field is required and the fair cannot end before it starts.
    pub fn validate(self) -> Result<NewFair, Error> {
        let name = validation::require_text("nombre_feria", &self.name)?;
        let kind = self
            .kind
            .ok_or_else(|| Error::validation("tipo", "is required"))?;
        let (start_date, end_date) = validation::fair_dates(self.start_date, self.end_date)?;
        let rules = validation::require_text("reglas", &self.rules)?;
        Ok(NewFair {
            name,
            kind,
            start_date,
            end_date,
            rules,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FairPatch {
    #[serde(rename = "nombre_feria", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "tipo", skip_serializing_if = "Option::is_none")]
    pub kind: Option<FairKind>,

    #[serde(rename = "fechaInicio", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(rename = "fechaFin", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(rename = "reglas", skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
}
