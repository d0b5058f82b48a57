//! ID generation utilities.

use uuid::Uuid;

/// ID generator for support records.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a report ticket ID (random UUID v4, hyphenated).
    #[must_use]
    pub fn generate_uuid_v4(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
