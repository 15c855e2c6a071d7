//! Departments, categories and buildings known to the register.
//!
//! These are closed sets. Every string form (slug, two-letter code, display
//! label) is parsed at the boundary so unknown keys are rejected instead of
//! silently matching nothing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Department
// ---------------------------------------------------------------------------

/// Organizational unit that owns an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Secretariat,
    MosqueProsperity,
    Education,
    SocialAffairs,
    Ict,
}

impl Department {
    /// All departments in display order.
    pub const ALL: [Department; 5] = [
        Department::Secretariat,
        Department::MosqueProsperity,
        Department::Education,
        Department::SocialAffairs,
        Department::Ict,
    ];

    /// Two-letter code used as the first segment of an asset number.
    pub fn code(self) -> &'static str {
        match self {
            Self::Secretariat => "ST",
            Self::MosqueProsperity => "KM",
            Self::Education => "PD",
            Self::SocialAffairs => "SK",
            Self::Ict => "IT",
        }
    }

    /// Stable slug matching serde's `rename_all = "snake_case"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Secretariat => "secretariat",
            Self::MosqueProsperity => "mosque_prosperity",
            Self::Education => "education",
            Self::SocialAffairs => "social_affairs",
            Self::Ict => "ict",
        }
    }

    /// Human-readable label, as printed on exports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Secretariat => "Sekretariat",
            Self::MosqueProsperity => "Bidang Kemakmuran Masjid",
            Self::Education => "Bidang Pendidikan",
            Self::SocialAffairs => "Bidang Sosial Kemasyarakatan",
            Self::Ict => "Bidang ICT",
        }
    }

    /// Look up a department by its two-letter asset-number code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.code() == code)
    }

    /// Categories owned by this department (may be empty).
    pub fn categories(self) -> &'static [Category] {
        match self {
            Self::Secretariat => &[Category::Fixed, Category::Inventory],
            Self::Education => &[
                Category::Tki,
                Category::Sdi,
                Category::Tpa,
                Category::Madrasah,
            ],
            Self::SocialAffairs => &[Category::Ayd, Category::Youth, Category::Muamalah],
            Self::MosqueProsperity | Self::Ict => &[],
        }
    }

    /// Comma-separated list of all codes, for error messages.
    pub fn known_codes() -> String {
        Self::ALL.map(Department::code).join(", ")
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = CoreError;

    /// Accepts either the slug (`"education"`) or the two-letter code (`"PD"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == trimmed || d.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CoreError::Validation(format!("Unknown department: '{trimmed}'")))
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Sub-classification of assets within a department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    // Secretariat
    Fixed,
    Inventory,
    // Education
    Tki,
    Sdi,
    Tpa,
    Madrasah,
    // Social affairs
    Ayd,
    Youth,
    Muamalah,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Fixed,
        Category::Inventory,
        Category::Tki,
        Category::Sdi,
        Category::Tpa,
        Category::Madrasah,
        Category::Ayd,
        Category::Youth,
        Category::Muamalah,
    ];

    /// The department this category belongs to.
    pub fn department(self) -> Department {
        match self {
            Self::Fixed | Self::Inventory => Department::Secretariat,
            Self::Tki | Self::Sdi | Self::Tpa | Self::Madrasah => Department::Education,
            Self::Ayd | Self::Youth | Self::Muamalah => Department::SocialAffairs,
        }
    }

    pub fn belongs_to(self, department: Department) -> bool {
        self.department() == department
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Inventory => "inventory",
            Self::Tki => "tki",
            Self::Sdi => "sdi",
            Self::Tpa => "tpa",
            Self::Madrasah => "madrasah",
            Self::Ayd => "ayd",
            Self::Youth => "youth",
            Self::Muamalah => "muamalah",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fixed => "Aset Tetap",
            Self::Inventory => "Inventaris Aset",
            Self::Tki => "TKI",
            Self::Sdi => "SDI",
            Self::Tpa => "TPA",
            Self::Madrasah => "Madrasah",
            Self::Ayd => "Seksi AYD",
            Self::Youth => "Seksi Remaja",
            Self::Muamalah => "Seksi Muamalah dan Kematian",
        }
    }

    /// Reverse-map a spreadsheet label to a category of `department`.
    ///
    /// Labels are compared after trimming. Returns `None` when the label is
    /// unknown or belongs to a different department.
    pub fn from_label(department: Department, label: &str) -> Option<Self> {
        let label = label.trim();
        department
            .categories()
            .iter()
            .copied()
            .find(|c| c.label() == label)
    }

    /// Ensure `category` (if any) is owned by `department`.
    pub fn check_pairing(department: Department, category: Option<Self>) -> Result<(), CoreError> {
        match category {
            Some(c) if !c.belongs_to(department) => Err(CoreError::Validation(format!(
                "Category '{c}' does not belong to department '{department}'"
            ))),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == trimmed)
            .ok_or_else(|| CoreError::Validation(format!("Unknown category: '{trimmed}'")))
    }
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Building an asset is located in; the fifth character of an asset number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Building {
    A,
    B,
    C,
    D,
}

impl Building {
    pub const ALL: [Building; 4] = [Building::A, Building::B, Building::C, Building::D];

    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.as_char() == c)
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
