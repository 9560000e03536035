use super::SessionSettings;

/// Who the gateway should act for. Passed explicitly to the client; nothing
/// else in the crate reads credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub user_id: Option<String>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            access_token: non_empty(access_token.into()),
            user_id: non_empty(user_id.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

impl From<&SessionSettings> for Session {
    fn from(settings: &SessionSettings) -> Self {
        Self::new(settings.access_token.clone(), settings.user_id.clone())
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
