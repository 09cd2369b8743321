//! Citation module - references to customer specifications and their resolution

use std::fmt;

use crate::range::LineRange;

/// Identifier of the customer whose specification library applies
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CustomerId(String);

impl CustomerId {
    /// Create a customer identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a library entry based on UUIDv7
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LibraryEntryId(u128);

impl LibraryEntryId {
    /// Generate a new UUIDv7-based id
    ///
    /// # Examples
    ///
    /// ```
    /// use clauseflow_domain::LibraryEntryId;
    ///
    /// let id = LibraryEntryId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an id from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an id from a UUID string
    ///
    /// # Examples
    ///
    /// ```
    /// use clauseflow_domain::LibraryEntryId;
    ///
    /// let id = LibraryEntryId::new();
    /// let parsed = LibraryEntryId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid entry id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for LibraryEntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LibraryEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// One known specification in a customer's reference library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    /// Unique identifier
    pub id: LibraryEntryId,

    /// Owning customer
    pub customer: CustomerId,

    /// Spec identifier as published, e.g. "SDC-Q-401"
    pub identifier: String,

    /// Revision, e.g. "Rev C"
    pub version: Option<String>,

    /// Descriptive title
    pub title: Option<String>,
}

impl LibraryEntry {
    /// Create an entry with a fresh id
    pub fn new(customer: CustomerId, identifier: impl Into<String>) -> Self {
        Self {
            id: LibraryEntryId::new(),
            customer,
            identifier: identifier.into(),
            version: None,
            title: None,
        }
    }

    /// Set the version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A reference to an external specification found inside a clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedCitation {
    /// Range of the clause containing the citation
    pub range: LineRange,

    /// Spec identifier as written in the document
    pub identifier: String,

    /// Version as written, if any
    pub version: Option<String>,

    /// Short context describing how the spec is invoked
    pub context: Option<String>,
}

/// Result of matching one citation against a customer library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOutcome {
    /// Identifier and version both agree
    Matched(LibraryEntryId),

    /// Identifier agrees but the versions differ or one side has none
    Partial(LibraryEntryId),

    /// No entry shares the identifier
    Unresolved,
}

impl MatchOutcome {
    /// Matched entry, for matched and partial outcomes
    pub fn entry(&self) -> Option<LibraryEntryId> {
        match self {
            MatchOutcome::Matched(id) | MatchOutcome::Partial(id) => Some(*id),
            MatchOutcome::Unresolved => None,
        }
    }

    /// Short name for output
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOutcome::Matched(_) => "matched",
            MatchOutcome::Partial(_) => "partial",
            MatchOutcome::Unresolved => "unresolved",
        }
    }
}

/// A citation paired with its match outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledLink {
    /// The citation as detected
    pub citation: DetectedCitation,

    /// How it resolved against the library
    pub outcome: MatchOutcome,
}
