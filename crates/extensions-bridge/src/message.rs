//! Wire shape of the content ↔ background message contract.

use serde::{Deserialize, Serialize};
use spell_model::CheckResult;

/// Request sent from a page to the background context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum BridgeRequest {
    CheckSpelling {
        text: String,
    },
    SetApiKey {
        #[serde(rename = "apiKey")]
        api_key: String,
    },
    ClearApiKey,
    CheckSetup,
    ToggleExtension {
        enabled: bool,
    },
}

impl BridgeRequest {
    pub fn check(text: impl Into<String>) -> Self {
        BridgeRequest::CheckSpelling { text: text.into() }
    }

    pub fn action(&self) -> &'static str {
        match self {
            BridgeRequest::CheckSpelling { .. } => "checkSpelling",
            BridgeRequest::SetApiKey { .. } => "setApiKey",
            BridgeRequest::ClearApiKey => "clearApiKey",
            BridgeRequest::CheckSetup => "checkSetup",
            BridgeRequest::ToggleExtension { .. } => "toggleExtension",
        }
    }
}

/// Reply from the background context. Only the fields relevant to the
/// request are populated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CheckResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub needs_setup: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_setup: Option<bool>,
}

impl BridgeResponse {
    pub fn checked(result: CheckResult) -> Self {
        Self {
            success: true,
            data: Some(result),
            ..Self::default()
        }
    }

    pub fn ack() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn needs_setup(message: impl Into<String>) -> Self {
        Self {
            needs_setup: true,
            ..Self::failure(message)
        }
    }

    pub fn disabled(message: impl Into<String>) -> Self {
        Self {
            disabled: true,
            ..Self::failure(message)
        }
    }

    pub fn setup_status(is_setup: bool) -> Self {
        Self {
            is_setup: Some(is_setup),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requests_use_action_tag() {
        let value = serde_json::to_value(BridgeRequest::SetApiKey {
            api_key: "secret".into(),
        })
        .unwrap();
        assert_eq!(value, json!({"action": "setApiKey", "apiKey": "secret"}));

        let parsed: BridgeRequest =
            serde_json::from_value(json!({"action": "toggleExtension", "enabled": false})).unwrap();
        assert_eq!(parsed, BridgeRequest::ToggleExtension { enabled: false });
        assert_eq!(parsed.action(), "toggleExtension");
    }

    #[test]
    fn failure_replies_only_carry_set_flags() {
        let value = serde_json::to_value(BridgeResponse::needs_setup("no key")).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "error": "no key", "needsSetup": true})
        );
        let value = serde_json::to_value(BridgeResponse::setup_status(true)).unwrap();
        assert_eq!(value, json!({"success": false, "isSetup": true}));
    }
}
