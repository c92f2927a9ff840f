//! Certification categories published by the registry
//!
//! Each category is one listing section of the site with its own URL path.

use crate::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// A certification-state bucket of listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Projects whose certification process is ongoing
    EnProceso,

    /// Projects holding a pre-certification
    PreCertificacion,

    /// Certified projects
    Certificacion,

    /// Certified projects with the "sello plus" distinction
    SelloPlus,
}

impl Category {
    /// Returns the identifier used in configuration, URLs and artifact names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnProceso => "en-proceso",
            Self::PreCertificacion => "pre-certificacion",
            Self::Certificacion => "certificacion",
            Self::SelloPlus => "sello-plus",
        }
    }

    /// Returns the URL path segment of the category's first listing page
    pub fn path_segment(&self) -> String {
        format!("{}/", self.as_str())
    }

    /// Parses a category from its identifier
    ///
    /// Returns None if the string doesn't match any known category.
    pub fn from_id(s: &str) -> Option<Self> {
        match s {
            "en-proceso" => Some(Self::EnProceso),
            "pre-certificacion" => Some(Self::PreCertificacion),
            "certificacion" => Some(Self::Certificacion),
            "sello-plus" => Some(Self::SelloPlus),
            _ => None,
        }
    }

    /// Returns all categories in the order the site lists them
    pub fn all() -> Vec<Self> {
        vec![
            Self::EnProceso,
            Self::PreCertificacion,
            Self::Certificacion,
            Self::SelloPlus,
        ]
    }
}

impl FromStr for Category {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s.trim()).ok_or_else(|| ConfigError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
