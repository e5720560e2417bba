use serde::Serialize;

/// JSON envelope shared by every endpoint.
///
/// The payload is flattened next to `success`, so `ApiResponse::success(TeamPayload { team })`
/// renders as `{"success": true, "team": {...}}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    // Success with data
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    // Success with message
    pub fn success_with_message(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.to_string()),
        }
    }

    // Error with data (e.g. the team that is already checked in)
    pub fn error_with_data(data: T, message: &str) -> Self {
        Self {
            success: false,
            data: Some(data),
            message: Some(message.to_string()),
        }
    }
}

impl ApiResponse<()> {
    // Error response (no data)
    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Serialize)]
    struct Payload {
        count: u32,
    }

    #[test]
    fn test_payload_is_flattened_next_to_success() {
        let value = serde_json::to_value(ApiResponse::success(Payload { count: 3 })).unwrap();
        assert_eq!(value, json!({ "success": true, "count": 3 }));
    }

    #[test]
    fn test_error_has_message_and_no_payload() {
        let value = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(value, json!({ "success": false, "message": "nope" }));
    }
}
