use axum::extract::rejection::JsonRejection;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::usecase::error::UsecaseError;

/// Flattens nested field errors into sorted, human-readable messages.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    collect(errors, "", &mut messages);
    messages.sort();
    messages.dedup();
    messages
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    match &error.message {
                        Some(message) => out.push(message.to_string()),
                        None => out.push(format!("{path} is invalid ({})", error.code)),
                    }
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

pub fn validated<T: Validate>(payload: T) -> Result<T, UsecaseError> {
    match payload.validate() {
        Ok(()) => Ok(payload),
        Err(errors) => {
            let messages = validation_messages(&errors);
            tracing::warn!(?messages, "validation failed");
            Err(UsecaseError::Validation(messages.join(", ")))
        }
    }
}

pub fn rejection_error(rejection: JsonRejection) -> UsecaseError {
    tracing::warn!(error = %rejection, "malformed request body");
    UsecaseError::Validation(rejection.body_text())
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Debug, Validate)]
    struct Inner {
        #[validate(range(min = 1, max = 4, message = "value must be between 1 and 4"))]
        value: Option<i16>,
    }

    #[derive(Debug, Validate)]
    struct Outer {
        #[validate(required(message = "name is required"))]
        name: Option<String>,
        #[validate(nested)]
        inner: Inner,
        #[validate(range(min = 0))]
        unlabelled: i32,
    }

    #[test]
    fn test_messages_are_flattened_and_sorted() {
        let payload = Outer {
            name: None,
            inner: Inner { value: Some(9) },
            unlabelled: -1,
        };

        let errors = payload.validate().unwrap_err();
        let messages = validation_messages(&errors);

        assert_eq!(
            messages,
            vec![
                "name is required".to_string(),
                "unlabelled is invalid (range)".to_string(),
                "value must be between 1 and 4".to_string(),
            ]
        );
    }

    #[test]
    fn test_validated_passes_valid_payload() {
        let payload = Outer {
            name: Some("ok".to_string()),
            inner: Inner { value: Some(2) },
            unlabelled: 3,
        };

        assert!(validated(payload).is_ok());
    }

    #[test]
    fn test_validated_joins_messages() {
        let payload = Outer {
            name: None,
            inner: Inner { value: Some(0) },
            unlabelled: 0,
        };

        let err = validated(payload).unwrap_err();

        assert!(matches!(err, UsecaseError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "name is required, value must be between 1 and 4"
        );
    }
}
