//! Expiration Module
//!
//! Normalizes the different ways of expressing a time-to-live into a single
//! absolute deadline.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

// == TTL ==
/// A time-to-live as supplied by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// No TTL given; the pool default applies, or the item never expires
    #[default]
    Unset,
    /// Lifetime in whole seconds from the moment of the call.
    /// Zero or negative values yield an already-expired deadline.
    Seconds(i64),
    /// Absolute deadline, used verbatim
    At(DateTime<Utc>),
    /// Lifetime relative to the moment of the call
    After(Duration),
}

impl From<i64> for Ttl {
    fn from(seconds: i64) -> Self {
        Ttl::Seconds(seconds)
    }
}

impl From<Duration> for Ttl {
    fn from(duration: Duration) -> Self {
        Ttl::After(duration)
    }
}

impl From<DateTime<Utc>> for Ttl {
    fn from(deadline: DateTime<Utc>) -> Self {
        Ttl::At(deadline)
    }
}

impl<T: Into<Ttl>> From<Option<T>> for Ttl {
    fn from(ttl: Option<T>) -> Self {
        ttl.map_or(Ttl::Unset, Into::into)
    }
}

// == Expiration ==
/// Resolved expiration of an item or stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "deadline", rename_all = "snake_case")]
pub enum Expiration {
    /// Permanent
    Never,
    /// Expires once the clock reaches this instant
    At(DateTime<Utc>),
}

impl Expiration {
    /// Checks if the deadline has passed at `now`.
    ///
    /// A record is expired when `now` is greater than or equal to its deadline,
    /// so a zero lifetime is expired immediately.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Expiration::Never => false,
            Expiration::At(deadline) => now >= *deadline,
        }
    }

    /// Returns the absolute deadline, or None for permanent records.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        match self {
            Expiration::Never => None,
            Expiration::At(deadline) => Some(*deadline),
        }
    }

    /// Returns the remaining lifetime at `now`, or None if it never expires.
    ///
    /// An elapsed deadline reports `Some(Duration::ZERO)`.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.deadline()
            .map(|deadline| (deadline - now).to_std().unwrap_or(Duration::ZERO))
    }
}

// == Expiration Resolver ==
/// Turns a [`Ttl`] into an [`Expiration`] relative to a given instant.
///
/// The resolver is stateless apart from the owning pool's default TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpirationResolver {
    default_ttl: Option<Duration>,
}

impl ExpirationResolver {
    /// Creates a resolver falling back to `default_ttl` for unset TTLs.
    ///
    /// # Errors
    /// `InvalidArgument` if `default_ttl` added to the current time cannot be
    /// represented as a deadline.
    pub fn new(default_ttl: Option<Duration>) -> Result<Self> {
        if let Some(default) = default_ttl {
            offset_std(Utc::now(), default).map_err(|_| {
                CacheError::InvalidArgument(format!(
                    "default TTL of {:?} is out of range",
                    default
                ))
            })?;
        }
        Ok(Self { default_ttl })
    }

    /// Returns the pool default TTL, if any.
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    /// Resolves `ttl` against `now`.
    ///
    /// # Errors
    /// `InvalidArgument` if the resulting deadline cannot be represented.
    pub fn resolve(&self, ttl: Ttl, now: DateTime<Utc>) -> Result<Expiration> {
        match ttl {
            Ttl::Unset => match self.default_ttl {
                Some(default) => offset_std(now, default),
                None => Ok(Expiration::Never),
            },
            Ttl::Seconds(seconds) => {
                let delta = TimeDelta::try_seconds(seconds).ok_or_else(|| {
                    CacheError::InvalidArgument(format!("TTL of {} seconds is out of range", seconds))
                })?;
                offset(now, delta)
            }
            Ttl::At(deadline) => Ok(Expiration::At(deadline)),
            Ttl::After(duration) => offset_std(now, duration),
        }
    }

    /// Resolves the pool default against `now`, saturating at the latest
    /// representable instant.
    pub(crate) fn resolve_default(&self, now: DateTime<Utc>) -> Expiration {
        self.resolve(Ttl::Unset, now)
            .unwrap_or(Expiration::At(DateTime::<Utc>::MAX_UTC))
    }
}

fn offset_std(now: DateTime<Utc>, duration: Duration) -> Result<Expiration> {
    let delta = TimeDelta::from_std(duration).map_err(|_| {
        CacheError::InvalidArgument(format!("TTL of {:?} is out of range", duration))
    })?;
    offset(now, delta)
}

fn offset(now: DateTime<Utc>, delta: TimeDelta) -> Result<Expiration> {
    now.checked_add_signed(delta)
        .map(Expiration::At)
        .ok_or_else(|| {
            CacheError::InvalidArgument(format!("deadline {} after {} overflows", delta, now))
        })
}
