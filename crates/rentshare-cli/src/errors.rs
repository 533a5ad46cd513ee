//! Mapping of failures to exit codes and hints.

use std::fmt;

use rentshare_core::RentshareError;

use crate::constants::exit_codes;

/// A CLI-level failure carrying its own exit code and hint.
#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub hint: Option<String>,
    pub code: i32,
}

impl CliError {
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: Some(hint.into()),
            code: exit_codes::NOT_FOUND,
        }
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: Some("Restore from a backup before writing to this database.".to_string()),
            code: exit_codes::INTEGRITY_FAILED,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Exit code and optional hint for an error returned by a handler.
pub fn classify(err: &anyhow::Error) -> (i32, Option<String>) {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return (cli_err.code, cli_err.hint.clone());
    }
    match err.downcast_ref::<RentshareError>() {
        Some(RentshareError::NotFound(_)) => (exit_codes::NOT_FOUND, None),
        Some(RentshareError::InvalidArgument(_)) => (exit_codes::INVALID_INPUT, None),
        Some(RentshareError::Conflict(_)) => (
            exit_codes::CONFLICT,
            Some("Another writer changed the data; retry the command.".to_string()),
        ),
        Some(RentshareError::PartialFailure { .. }) => (
            exit_codes::PARTIAL_FAILURE,
            Some("Fix the listed records and run `rentshare recalculate` again.".to_string()),
        ),
        Some(RentshareError::Validation(_)) => (exit_codes::INTEGRITY_FAILED, None),
        Some(RentshareError::Storage(_)) | None => (exit_codes::FAILURE, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_codes() {
        let err: anyhow::Error = RentshareError::NotFound("Owner 'x'".to_string()).into();
        assert_eq!(classify(&err).0, exit_codes::NOT_FOUND);

        let err: anyhow::Error = RentshareError::InvalidArgument("bad".to_string()).into();
        assert_eq!(classify(&err), (exit_codes::INVALID_INPUT, None));

        let err: anyhow::Error = RentshareError::PartialFailure {
            skipped: 1,
            reasons: vec![],
        }
        .into();
        assert_eq!(classify(&err).0, exit_codes::PARTIAL_FAILURE);
    }

    #[test]
    fn test_cli_error_keeps_hint() {
        let err: anyhow::Error = CliError::not_found("No database", "rentshare init").into();
        assert_eq!(
            classify(&err),
            (exit_codes::NOT_FOUND, Some("rentshare init".to_string()))
        );
        let plain: anyhow::Error = anyhow::anyhow!("boom");
        assert_eq!(classify(&plain), (exit_codes::FAILURE, None));
    }
}
