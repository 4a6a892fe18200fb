use std::collections::BTreeMap;
use validator::{ValidationError, ValidationErrors};

/// Field name -> human-readable reason. Ordered so responses are stable.
pub type FieldErrors = BTreeMap<String, String>;

/// Collects violations across fields so a request reports everything wrong
/// with it at once instead of failing on the first bad field.
#[derive(Debug, Default)]
pub struct Violations {
    errors: FieldErrors,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Record the outcome of one of the field validators below.
    pub fn check(&mut self, field: &str, result: Result<(), ValidationError>) {
        if let Err(e) = result {
            let message = e
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string());
            self.add(field, message);
        }
    }

    /// Fold in the output of a `validator` derive pass.
    pub fn merge(&mut self, errors: &ValidationErrors) {
        for (field, message) in field_errors(errors) {
            self.add(&field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() { Ok(()) } else { Err(self.errors) }
    }
}

fn violation(code: &'static str, message: &str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.to_string().into());
    err
}

/// Flatten `validator` derive output into a plain field -> message map.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect()
}

/// `#RGB` or `#RRGGBB`
pub fn hex_color(value: &str) -> Result<(), ValidationError> {
    let digits = value.strip_prefix('#');
    let ok = matches!(digits, Some(d) if (d.len() == 3 || d.len() == 6) && d.chars().all(|c| c.is_ascii_hexdigit()));
    if ok {
        Ok(())
    } else {
        Err(violation("hex_color", "must be a hex color such as #6b7280"))
    }
}

/// ASCII letters and digits only, 1-100 characters
pub fn alphanumeric_slug(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.len() > 100 {
        return Err(violation("slug_length", "must be between 1 and 100 characters"));
    }
    if value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(violation("slug_charset", "must contain only letters and digits"))
    }
}

/// Strict semantic version, e.g. `1.0.0`
pub fn semver_version(value: &str) -> Result<(), ValidationError> {
    match semver::Version::parse(value) {
        Ok(_) => Ok(()),
        Err(_) => Err(violation("semver", "must be a semantic version such as 1.0.0")),
    }
}

pub fn length_between(value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let count = value.chars().count();
    if count < min || count > max {
        let message = if min == 0 {
            format!("must be at most {max} characters")
        } else {
            format!("must be between {min} and {max} characters")
        };
        Err(violation("length", &message))
    } else {
        Ok(())
    }
}

pub fn priority_range(value: i32) -> Result<(), ValidationError> {
    if (0..=100).contains(&value) {
        Ok(())
    } else {
        Err(violation("priority_range", "must be between 0 and 100"))
    }
}

pub fn non_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(violation("required", "must not be empty"))
    } else {
        Ok(())
    }
}
