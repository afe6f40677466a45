//! Airhub API request and response shapes

use serde::Serialize;
use serde_json::{json, Value};

/// Flag value the plan endpoint expects for retail plan listings
pub const PLAN_LISTING_FLAG: u8 = 6;

/// Body of the login call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub user_name: &'a str,
    pub password: &'a str,
}

/// Pull the bearer token out of a login response
///
/// Accounts have been seen answering with `token`, `data.token` or
/// `accessToken`; the first non-empty string wins.
pub fn extract_token(body: &Value) -> Option<String> {
    ["/token", "/data/token", "/accessToken", "/data/accessToken"]
        .iter()
        .filter_map(|path| body.pointer(path)?.as_str())
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

/// Alternative plan-query bodies, tried in order until one returns plans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanQueryShape {
    /// `flag` plus the code list in `multiplecountrycode`
    FlaggedMulti,
    /// Code list only
    Multi,
    /// Single `countryCode`, only for one-code batches
    Single,
}

impl PlanQueryShape {
    /// Shapes worth trying for this many codes
    pub fn variants_for(code_count: usize) -> Vec<PlanQueryShape> {
        let mut shapes = vec![PlanQueryShape::FlaggedMulti, PlanQueryShape::Multi];
        if code_count == 1 {
            shapes.push(PlanQueryShape::Single);
        }
        shapes
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlanQueryShape::FlaggedMulti => "flagged_multi",
            PlanQueryShape::Multi => "multi",
            PlanQueryShape::Single => "single",
        }
    }

    /// Request body for this shape
    pub fn body(&self, partner_code: &str, codes: &[String]) -> Value {
        let partner = partner_code_value(partner_code);
        match self {
            PlanQueryShape::FlaggedMulti => json!({
                "partnerCode": partner,
                "flag": PLAN_LISTING_FLAG,
                "countryCode": "",
                "multiplecountrycode": codes,
            }),
            PlanQueryShape::Multi => json!({
                "partnerCode": partner,
                "multiplecountrycode": codes,
            }),
            PlanQueryShape::Single => json!({
                "partnerCode": partner,
                "flag": PLAN_LISTING_FLAG,
                "countryCode": codes.first().cloned().unwrap_or_default(),
            }),
        }
    }
}

/// Partner codes are numeric for most accounts; send them as numbers when they are
fn partner_code_value(partner_code: &str) -> Value {
    let trimmed = partner_code.trim();
    trimmed
        .parse::<u64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_locations() {
        assert_eq!(extract_token(&json!({"token": "abc"})).as_deref(), Some("abc"));
        assert_eq!(extract_token(&json!({"data": {"token": "def"}})).as_deref(), Some("def"));
        assert_eq!(
            extract_token(&json!({"token": "", "accessToken": "ghi"})).as_deref(),
            Some("ghi")
        );
        assert_eq!(extract_token(&json!({"message": "invalid"})), None);
        assert_eq!(extract_token(&json!({"token": 42})), None);
    }

    #[test]
    fn test_login_request_field_names() {
        let body = serde_json::to_value(LoginRequest {
            user_name: "agent@example.com",
            password: "secret",
        })
        .unwrap();
        assert_eq!(body, json!({"userName": "agent@example.com", "password": "secret"}));
    }

    #[test]
    fn test_variants_for_single_code() {
        assert_eq!(PlanQueryShape::variants_for(3).len(), 2);
        assert_eq!(
            PlanQueryShape::variants_for(1),
            vec![
                PlanQueryShape::FlaggedMulti,
                PlanQueryShape::Multi,
                PlanQueryShape::Single
            ]
        );
    }

    #[test]
    fn test_bodies() {
        let codes = vec!["JP".to_string(), "KR".to_string()];

        assert_eq!(
            PlanQueryShape::FlaggedMulti.body("776059345", &codes),
            json!({
                "partnerCode": 776059345u64,
                "flag": 6,
                "countryCode": "",
                "multiplecountrycode": ["JP", "KR"],
            })
        );
        assert_eq!(
            PlanQueryShape::Multi.body("P-1", &codes),
            json!({"partnerCode": "P-1", "multiplecountrycode": ["JP", "KR"]})
        );
        assert_eq!(
            PlanQueryShape::Single.body("7", &codes[..1]),
            json!({"partnerCode": 7, "flag": 6, "countryCode": "JP"})
        );
    }
}
