// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Validation helpers for API contract types

use crate::error::ApiContractError;
use crate::types::*;
use std::collections::HashMap;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

/// Validate a create repository request
pub fn validate_create_repository_request(
    request: &CreateRepositoryRequest,
) -> Result<(), ApiContractError> {
    request.validate()?;
    Ok(())
}

/// Validate listing bounds
pub fn validate_list_query(query: &ListRepositoriesQuery) -> Result<(), ApiContractError> {
    query.validate()?;
    Ok(())
}

/// Repository names are restricted to ASCII letters, digits, `_` and `-`.
///
/// Length bounds are checked separately by the `length` rule on the field.
pub fn validate_repository_name(name: &str) -> Result<(), ValidationError> {
    if let Some(c) = name.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '-') {
        let mut error = ValidationError::new("repository_name");
        error.message = Some(
            format!(
                "may only contain letters, digits, '_' and '-' (found {:?})",
                c
            )
            .into(),
        );
        return Err(error);
    }
    Ok(())
}

/// Flatten validator output into `field -> messages`.
///
/// Nested structs are reported with dotted paths.
pub fn field_errors(errors: &ValidationErrors) -> HashMap<String, Vec<String>> {
    let mut out = HashMap::new();
    collect_field_errors("", errors, &mut out);
    out
}

fn collect_field_errors(
    prefix: &str,
    errors: &ValidationErrors,
    out: &mut HashMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = out.entry(path).or_insert_with(Vec::new);
                for error in field_errors {
                    messages.push(describe(error));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_field_errors(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_field_errors(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "length" => {
            let min = error.params.get("min").map(|v| v.to_string());
            let max = error.params.get("max").map(|v| v.to_string());
            match (min, max) {
                (Some(min), Some(max)) => format!("length must be between {} and {}", min, max),
                (None, Some(max)) => format!("length must be at most {}", max),
                (Some(min), None) => format!("length must be at least {}", min),
                (None, None) => "invalid length".to_string(),
            }
        }
        "range" => {
            let min = error.params.get("min").map(|v| v.to_string()).unwrap_or_default();
            let max = error.params.get("max").map(|v| v.to_string()).unwrap_or_default();
            format!("must be between {} and {}", min, max)
        }
        code => format!("failed {} check", code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> CreateRepositoryRequest {
        CreateRepositoryRequest {
            name: name.to_string(),
            description: None,
            is_private: false,
        }
    }

    #[test]
    fn test_validate_create_repository_request_valid() {
        assert!(validate_create_repository_request(&request("demo")).is_ok());
        assert!(validate_create_repository_request(&request("My_Repo-2")).is_ok());
    }

    #[test]
    fn test_validate_create_repository_request_rejects_spaces_and_punctuation() {
        let err = validate_create_repository_request(&request("bad name!")).unwrap_err();
        let fields = err.field_errors();
        assert!(fields.contains_key("name"), "got {:?}", fields);
    }

    #[test]
    fn test_validate_create_repository_request_empty_name() {
        let err = validate_create_repository_request(&request("")).unwrap_err();
        let fields = err.field_errors();
        assert_eq!(
            fields.get("name").map(Vec::as_slice),
            Some(&["length must be between 1 and 100".to_string()][..])
        );
    }

    #[test]
    fn test_validate_create_repository_request_name_too_long() {
        let name = "a".repeat(101);
        assert!(validate_create_repository_request(&request(&name)).is_err());
        let name = "a".repeat(100);
        assert!(validate_create_repository_request(&request(&name)).is_ok());
    }

    #[test]
    fn test_validate_create_repository_request_description_limit() {
        let mut req = request("demo");
        req.description = Some("d".repeat(501));
        let err = validate_create_repository_request(&req).unwrap_err();
        assert!(err.field_errors().contains_key("description"));

        req.description = Some("d".repeat(500));
        assert!(validate_create_repository_request(&req).is_ok());
    }

    #[test]
    fn test_validate_repository_name_non_ascii() {
        assert!(validate_repository_name("caf\u{e9}").is_err());
        assert!(validate_repository_name("a.b").is_err());
        assert!(validate_repository_name("ok-name_1").is_ok());
    }

    #[test]
    fn test_validate_list_query_bounds() {
        assert!(validate_list_query(&ListRepositoriesQuery::default()).is_ok());
        assert!(validate_list_query(&ListRepositoriesQuery { skip: 5, limit: 0 }).is_err());
        assert!(validate_list_query(&ListRepositoriesQuery {
            skip: 0,
            limit: MAX_LIST_LIMIT + 1
        })
        .is_err());
    }

    #[test]
    fn test_create_request_defaults_from_json() {
        let req: CreateRepositoryRequest = serde_json::from_str(r#"{"name":"demo"}"#).unwrap();
        assert_eq!(req.description, None);
        assert!(!req.is_private);
    }

    #[test]
    fn test_list_query_defaults_from_json() {
        let query: ListRepositoriesQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query, ListRepositoriesQuery::default());
        assert_eq!(query.limit, DEFAULT_LIST_LIMIT);
    }

    #[test]
    fn test_problem_details_omits_empty_errors() {
        let problem = crate::ProblemDetails {
            problem_type: "https://docs.example.com/errors/not-found".to_string(),
            title: "Repository Not Found".to_string(),
            status: Some(404),
            detail: "Repository 999 not found".to_string(),
            errors: HashMap::new(),
        };
        let json = serde_json::to_value(&problem).unwrap();
        assert!(json.get("errors").is_none());
        assert_eq!(json["type"], "https://docs.example.com/errors/not-found");
    }
}
