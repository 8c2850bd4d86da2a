use crate::whitelist::UserSummary;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VerifyUserRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub telegram_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddUserRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub telegram_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub secret_key: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RemoveUserRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub telegram_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub secret_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

impl ApiResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            user: None,
        }
    }

    pub fn verified(user: UserSummary) -> Self {
        Self {
            success: true,
            message: None,
            user: Some(user),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
            user: None,
        }
    }
}

// Bots commonly send numeric ids as JSON numbers; accept both and keep the
// decimal text. Anything else (objects, arrays, bools) is treated as absent.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telegram_id_as_string_or_number() {
        let text: VerifyUserRequest =
            serde_json::from_str(r#"{"telegramId": "123"}"#).unwrap();
        assert_eq!(text.telegram_id.as_deref(), Some("123"));

        let number: VerifyUserRequest = serde_json::from_str(r#"{"telegramId": 123}"#).unwrap();
        assert_eq!(number.telegram_id.as_deref(), Some("123"));

        let negative: VerifyUserRequest = serde_json::from_str(r#"{"telegramId": -5}"#).unwrap();
        assert_eq!(negative.telegram_id.as_deref(), Some("-5"));
    }

    #[test]
    fn test_missing_and_unusable_fields_are_absent() {
        let empty: AddUserRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.telegram_id.is_none());
        assert!(empty.secret_key.is_none());

        let odd: RemoveUserRequest =
            serde_json::from_str(r#"{"telegramId": null, "secretKey": ["x"]}"#).unwrap();
        assert!(odd.telegram_id.is_none());
        assert!(odd.secret_key.is_none());
    }

    #[test]
    fn test_response_omits_empty_fields() {
        let value = serde_json::to_value(ApiResponse::error("Access denied")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"success": false, "message": "Access denied"})
        );
    }
}
