//! Business rules checked before a change becomes an event.
//!
//! Validation only runs on the command side ([`User::change`]). Events that
//! are already in a log are facts and are replayed without re-validation.
//!
//! [`User::change`]: crate::User::change

use serde::{Deserialize, Serialize};

use sourced_types::UserField;

use crate::{RulesError, ValidationError};

/// Limits applied to user field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Minimum name length in characters.
    #[serde(default = "default_min_name_len")]
    pub min_name_len: usize,

    /// Maximum name length in characters.
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,

    /// Maximum email length in characters (RFC 5321 path limit).
    #[serde(default = "default_max_email_len")]
    pub max_email_len: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_name_len: default_min_name_len(),
            max_name_len: default_max_name_len(),
            max_email_len: default_max_email_len(),
        }
    }
}

impl ValidationRules {
    /// Check that the rules can accept at least one value per field.
    ///
    /// Rules loaded from configuration should pass this before use; a
    /// minimum above the maximum would reject every name change.
    pub fn check(&self) -> Result<(), RulesError> {
        if self.max_name_len == 0 {
            return Err(RulesError {
                reason: "max_name_len must be at least 1".to_owned(),
            });
        }
        if self.min_name_len > self.max_name_len {
            return Err(RulesError {
                reason: format!(
                    "min_name_len ({}) must not exceed max_name_len ({})",
                    self.min_name_len, self.max_name_len
                ),
            });
        }
        if self.max_email_len == 0 {
            return Err(RulesError {
                reason: "max_email_len must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// Check `value` against the rule for `field`.
    pub fn validate(&self, field: UserField, value: &str) -> Result<(), ValidationError> {
        match field {
            UserField::Name => self.validate_name(value),
            UserField::Email => self.validate_email(value),
        }
    }

    /// A name must be non-blank, trimmed, and within the length bounds.
    pub fn validate_name(&self, value: &str) -> Result<(), ValidationError> {
        let field = UserField::Name;
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field });
        }
        if value.trim() != value {
            return Err(ValidationError::Untrimmed { field });
        }

        let actual = value.chars().count();
        if actual < self.min_name_len {
            return Err(ValidationError::TooShort {
                field,
                min: self.min_name_len,
                actual,
            });
        }
        if actual > self.max_name_len {
            return Err(ValidationError::TooLong {
                field,
                max: self.max_name_len,
                actual,
            });
        }
        Ok(())
    }

    /// An email must have one `@`, a non-empty local part, and a dotted
    /// domain with no empty labels. Whitespace is never allowed.
    pub fn validate_email(&self, value: &str) -> Result<(), ValidationError> {
        let field = UserField::Email;
        if value.is_empty() {
            return Err(ValidationError::Empty { field });
        }

        let actual = value.chars().count();
        if actual > self.max_email_len {
            return Err(ValidationError::TooLong {
                field,
                max: self.max_email_len,
                actual,
            });
        }

        let invalid = |reason: &'static str| ValidationError::InvalidEmail {
            value: value.to_owned(),
            reason,
        };

        if value.chars().any(char::is_whitespace) {
            return Err(invalid("contains whitespace"));
        }
        let Some((local, domain)) = value.split_once('@') else {
            return Err(invalid("missing '@'"));
        };
        if domain.contains('@') {
            return Err(invalid("more than one '@'"));
        }
        if local.is_empty() {
            return Err(invalid("empty local part"));
        }
        if !domain.contains('.') {
            return Err(invalid("domain has no '.'"));
        }
        if domain.split('.').any(str::is_empty) {
            return Err(invalid("empty domain label"));
        }
        Ok(())
    }
}

const fn default_min_name_len() -> usize {
    2
}

const fn default_max_name_len() -> usize {
    64
}

const fn default_max_email_len() -> usize {
    254
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ValidationRules {
        ValidationRules::default()
    }

    #[test]
    fn default_rules_are_consistent() {
        assert!(rules().check().is_ok());
    }

    #[test]
    fn inverted_name_bounds_are_rejected() {
        let inverted = ValidationRules {
            min_name_len: 10,
            max_name_len: 5,
            ..rules()
        };
        let result = inverted.check();
        assert!(matches!(result, Err(ref e) if e.reason.contains("min_name_len (10)")));

        let equal = ValidationRules {
            min_name_len: 5,
            max_name_len: 5,
            ..rules()
        };
        assert!(equal.check().is_ok());
    }

    #[test]
    fn zero_maximums_are_rejected() {
        let no_names = ValidationRules {
            min_name_len: 0,
            max_name_len: 0,
            ..rules()
        };
        assert!(no_names.check().is_err());

        let no_emails = ValidationRules {
            max_email_len: 0,
            ..rules()
        };
        assert!(no_emails.check().is_err());
    }

    #[test]
    fn accepts_ordinary_values() {
        assert!(rules().validate(UserField::Name, "Alice").is_ok());
        assert!(rules().validate(UserField::Email, "alice.smith@example.com").is_ok());
        assert!(rules().validate(UserField::Email, "a+tag@mail.example.co.uk").is_ok());
    }

    #[test]
    fn empty_values_are_rejected() {
        assert!(matches!(
            rules().validate(UserField::Email, ""),
            Err(ValidationError::Empty { field: UserField::Email })
        ));
        assert!(matches!(
            rules().validate(UserField::Name, "   "),
            Err(ValidationError::Empty { field: UserField::Name })
        ));
    }

    #[test]
    fn short_and_long_names() {
        assert!(matches!(
            rules().validate_name("A"),
            Err(ValidationError::TooShort { min: 2, actual: 1, .. })
        ));
        let long = "x".repeat(65);
        assert!(matches!(
            rules().validate_name(&long),
            Err(ValidationError::TooLong { max: 64, actual: 65, .. })
        ));
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        // Two characters, four bytes.
        assert!(rules().validate_name("Ñö").is_ok());
    }

    #[test]
    fn untrimmed_name_rejected() {
        assert!(matches!(
            rules().validate_name(" Alice"),
            Err(ValidationError::Untrimmed { .. })
        ));
    }

    #[test]
    fn malformed_emails() {
        for bad in [
            "alice",
            "@example.com",
            "alice@",
            "alice@example",
            "alice@@example.com",
            "a@b@example.com",
            "alice@example..com",
            "alice@.example.com",
            "alice @example.com",
        ] {
            assert!(
                matches!(
                    rules().validate_email(bad),
                    Err(ValidationError::InvalidEmail { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn overlong_email_rejected() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            rules().validate_email(&email),
            Err(ValidationError::TooLong { field: UserField::Email, .. })
        ));
    }

    #[test]
    fn rules_deserialize_with_defaults() {
        let parsed: Result<ValidationRules, _> =
            serde_json::from_str(r#"{"min_name_len": 5}"#);
        assert!(matches!(
            parsed,
            Ok(ValidationRules { min_name_len: 5, max_name_len: 64, max_email_len: 254 })
        ));
    }
}
