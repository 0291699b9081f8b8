//! Unit tests for error handling

use super::*;
use std::io;

#[cfg(test)]
mod aggregator_error_tests {
    use super::*;

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = AggregatorError::from(json_error);

        match error {
            AggregatorError::Json(_) => (),
            _ => panic!("Expected Json error variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = AggregatorError::from(io_error);

        match error {
            AggregatorError::Io(_) => (),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_invalid_header_error_conversion() {
        let header_error = reqwest::header::HeaderValue::from_str("invalid\nheader").unwrap_err();
        let error = AggregatorError::from(header_error);

        match error {
            AggregatorError::InvalidHeader(_) => (),
            _ => panic!("Expected InvalidHeader error variant"),
        }
    }

    #[test]
    fn test_parse_int_error_conversion() {
        let parse_error = "not_a_number".parse::<u16>().unwrap_err();
        let error = AggregatorError::from(parse_error);

        match error {
            AggregatorError::InvalidNumber(_) => (),
            _ => panic!("Expected InvalidNumber error variant"),
        }
    }

    #[test]
    fn test_missing_league_id_error() {
        let error = AggregatorError::MissingLeagueId {
            env_var: "FFL_LEAGUE_ID".to_string(),
        };

        let error_string = error.to_string();
        assert!(error_string.contains("League ID not provided"));
        assert!(error_string.contains("FFL_LEAGUE_ID"));
    }

    #[test]
    fn test_unknown_platform_error() {
        let error = AggregatorError::UnknownPlatform {
            name: "yahoo".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown platform: yahoo");
    }

    #[test]
    fn test_error_source_chain() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = AggregatorError::from(io_error);

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }
}

#[cfg(test)]
mod tier_error_tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            TierError::Authentication {
                context: "espn/native".into()
            }
            .kind(),
            TierErrorKind::Authentication
        );
        assert_eq!(
            TierError::parse("espn/native", "missing teams").kind(),
            TierErrorKind::Parse
        );
        assert_eq!(
            TierError::upstream("sleeper/native", "HTTP 500").kind(),
            TierErrorKind::UpstreamUnavailable
        );
        assert_eq!(
            TierError::Timeout {
                context: "espn/browser".into()
            }
            .kind(),
            TierErrorKind::Timeout
        );
    }

    #[test]
    fn test_from_status_success_is_none() {
        assert!(TierError::from_status("ctx", StatusCode::OK).is_none());
        assert!(TierError::from_status("ctx", StatusCode::NO_CONTENT).is_none());
    }

    #[test]
    fn test_from_status_mapping() {
        let kind = |code: u16| {
            TierError::from_status("ctx", StatusCode::from_u16(code).unwrap())
                .unwrap()
                .kind()
        };

        assert_eq!(kind(401), TierErrorKind::Authentication);
        assert_eq!(kind(403), TierErrorKind::Authentication);
        assert_eq!(kind(429), TierErrorKind::RateLimitExceeded);
        assert_eq!(kind(504), TierErrorKind::Timeout);
        assert_eq!(kind(500), TierErrorKind::UpstreamUnavailable);
        assert_eq!(kind(404), TierErrorKind::UpstreamUnavailable);
    }

    #[test]
    fn test_upstream_message_includes_status() {
        let err = TierError::from_status("sleeper/native", StatusCode::INTERNAL_SERVER_ERROR)
            .unwrap();
        let text = err.to_string();
        assert!(text.contains("sleeper/native"));
        assert!(text.contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_connection_failure_is_upstream_unavailable() {
        let client = reqwest::Client::new();
        let err = client
            .get("http://127.0.0.1:1/unreachable")
            .send()
            .await
            .unwrap_err();

        let tier_error = TierError::from_reqwest("test", &err);
        assert_eq!(tier_error.kind(), TierErrorKind::UpstreamUnavailable);
    }
}
