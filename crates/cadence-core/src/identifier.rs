//! Stable element identifiers backed by string interning.
//!
//! Every diagram element, semantic target and event end is addressed through an
//! [`Id`]. Ids are `Copy`, hash cheaply and never change while an element lives,
//! which makes them safe keys for the concurrent caches of the engine.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock, PoisonError},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Process-wide string interner shared by all identifiers.
///
/// # Thread Safety
///
/// Access goes through a `Mutex`. A poisoned lock is recovered because the
/// interner is append-only and cannot be observed half-written.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Interned identifier of a diagram element or semantic object.
///
/// # Examples
///
/// ```
/// use cadence_core::identifier::Id;
///
/// let lifeline = Id::new("client");
/// assert_eq!(lifeline, Id::new("client"));
/// assert_eq!(lifeline.to_string(), "client");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from its textual name.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Returns the interned text of this identifier.
    pub fn name(&self) -> String {
        interner().resolve(self.0).unwrap_or_default().to_string()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        write!(f, "{name}")
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        interner().resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
