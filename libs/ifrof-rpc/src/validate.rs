//! Structural validation of decoded procedure payloads.

use crate::problem::ValidationViolation;

/// Bounds and shape checks run after a payload is decoded and before any
/// ownership predicate or body runs.
pub trait Validate {
    /// # Errors
    /// Returns every violation found, not just the first one.
    fn validate(&self) -> Result<(), Vec<ValidationViolation>> {
        Ok(())
    }
}

/// Accumulates violations for one payload.
#[derive(Debug, Default)]
#[must_use]
pub struct Violations(Vec<ValidationViolation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless `ok` holds.
    pub fn check(mut self, ok: bool, field: &str, message: &str) -> Self {
        if !ok {
            self.0.push(ValidationViolation::new(field, message));
        }
        self
    }

    /// Non-blank text of at most `max` characters.
    pub fn required_text(self, field: &str, value: &str, max: usize) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return self.check(false, field, "must not be empty");
        }
        let len = trimmed.chars().count();
        self.check(len <= max, field, &format!("must be at most {max} characters"))
    }

    /// Text that may be absent but, when present, is bounded by `max` characters.
    pub fn optional_text(self, field: &str, value: Option<&str>, max: usize) -> Self {
        match value {
            Some(v) => {
                let len = v.trim().chars().count();
                self.check(len <= max, field, &format!("must be at most {max} characters"))
            }
            None => self,
        }
    }

    /// Merge violations of a nested value under `prefix`.
    pub fn nested(mut self, prefix: &str, inner: Result<(), Vec<ValidationViolation>>) -> Self {
        if let Err(found) = inner {
            self.0.extend(found.into_iter().map(|v| ValidationViolation {
                field: format!("{prefix}.{}", v.field),
                message: v.message,
            }));
        }
        self
    }

    /// # Errors
    /// Returns the collected violations when there is at least one.
    pub fn finish(self) -> Result<(), Vec<ValidationViolation>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}
