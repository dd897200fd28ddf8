//! Domain model for the six tracked record kinds plus the fish profile.
//!
//! # Responsibility
//! - Define the record shapes shared by persistence, services and views.
//! - Own the record-local rules (task status, treatment lifecycle, issues).
//!
//! # Invariants
//! - `id` is `None` until the store assigns one on creation.
//! - Embedded lists keep insertion order as produced by the owning mutators.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod fish;
pub mod maintenance;
pub mod note;
pub mod photo;
pub mod plant;
pub mod tank_log;
pub mod treatment;

/// Store-assigned row identifier.
pub type RecordId = i64;

/// Default free-text category used by logs and photos.
pub const DEFAULT_CATEGORY: &str = "General";

/// Record-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty or whitespace only.
    BlankField(&'static str),
    /// A recurring task carries a zero recurrence interval.
    NonPositiveRecurrence,
    /// A recurring task's interval exceeds `MAX_RECURRENCE_DAYS`.
    RecurrenceTooLong(u32),
    /// An end timestamp precedes its start timestamp.
    EndBeforeStart(&'static str),
    /// An embedded list index does not exist.
    IndexOutOfRange {
        list: &'static str,
        index: usize,
        len: usize,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::NonPositiveRecurrence => {
                write!(f, "recurring task must have a positive recurrence interval")
            }
            Self::RecurrenceTooLong(days) => write!(
                f,
                "recurrence interval of {days} days exceeds {} days",
                maintenance::MAX_RECURRENCE_DAYS
            ),
            Self::EndBeforeStart(field) => write!(f, "`{field}` is earlier than its start"),
            Self::IndexOutOfRange { list, index, len } => {
                write!(f, "{list} index {index} out of range (len {len})")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

pub(crate) fn check_index(
    list: &'static str,
    index: usize,
    len: usize,
) -> Result<(), ValidationError> {
    if index >= len {
        return Err(ValidationError::IndexOutOfRange { list, index, len });
    }
    Ok(())
}

/// Declares `as_str`/`parse`/`ALL` for a fieldless enum persisted as text.
macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Stable snake_case form used in storage and on the wire.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }

            /// Parses the snake_case form, case-insensitively.
            pub fn parse(value: &str) -> Option<Self> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($text => Some($ty::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.as_str())
            }
        }
    };
}

pub(crate) use text_enum;
