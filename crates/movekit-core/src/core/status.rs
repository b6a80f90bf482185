use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Outcome of a single mover application.
///
/// A status is data, not a fault: containers and loops inspect it to decide whether to
/// continue, stop early, or retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum MoverStatus {
    #[default]
    Success,
    FailRetry,
    FailDoNotRetry,
    FailBadInput,
    Fail,
}

static STATUS_NAMES: Map<&'static str, MoverStatus> = phf_map! {
    "MS_SUCCESS" => MoverStatus::Success,
    "FAIL_RETRY" => MoverStatus::FailRetry,
    "FAIL_DO_NOT_RETRY" => MoverStatus::FailDoNotRetry,
    "FAIL_BAD_INPUT" => MoverStatus::FailBadInput,
    "FAIL" => MoverStatus::Fail,
};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error(
    "Unknown mover status '{0}'. Expected one of MS_SUCCESS, FAIL_RETRY, FAIL_DO_NOT_RETRY, FAIL_BAD_INPUT, FAIL."
)]
pub struct StatusParseError(pub String);

impl MoverStatus {
    pub const ALL: [MoverStatus; 5] = [
        MoverStatus::Success,
        MoverStatus::FailRetry,
        MoverStatus::FailDoNotRetry,
        MoverStatus::FailBadInput,
        MoverStatus::Fail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoverStatus::Success => "MS_SUCCESS",
            MoverStatus::FailRetry => "FAIL_RETRY",
            MoverStatus::FailDoNotRetry => "FAIL_DO_NOT_RETRY",
            MoverStatus::FailBadInput => "FAIL_BAD_INPUT",
            MoverStatus::Fail => "FAIL",
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, MoverStatus::Success)
    }
}

impl fmt::Display for MoverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MoverStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        STATUS_NAMES
            .get(s.trim())
            .copied()
            .ok_or_else(|| StatusParseError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_success() {
        assert_eq!(MoverStatus::default(), MoverStatus::Success);
        assert!(MoverStatus::default().is_success());
    }

    #[test]
    fn every_status_parses_back_from_its_name() {
        for status in MoverStatus::ALL {
            assert_eq!(status.as_str().parse::<MoverStatus>(), Ok(status));
        }
    }

    #[test]
    fn parsing_ignores_surrounding_whitespace() {
        assert_eq!(
            "  FAIL_RETRY ".parse::<MoverStatus>(),
            Ok(MoverStatus::FailRetry)
        );
    }

    #[test]
    fn parsing_is_case_sensitive_and_rejects_unknown_names() {
        let err = "ms_success".parse::<MoverStatus>().unwrap_err();
        assert_eq!(err, StatusParseError("ms_success".to_string()));
        assert!("SUCCESS".parse::<MoverStatus>().is_err());
    }

    #[test]
    fn display_matches_script_names() {
        assert_eq!(MoverStatus::FailDoNotRetry.to_string(), "FAIL_DO_NOT_RETRY");
        assert_eq!(MoverStatus::Fail.to_string(), "FAIL");
    }

    #[test]
    fn only_success_counts_as_success() {
        let failures = MoverStatus::ALL
            .iter()
            .filter(|status| !status.is_success())
            .count();
        assert_eq!(failures, 4);
    }
}
