#[derive(Debug, Clone, Default)]
pub struct TelemetryLabels {
    pub chat_id: Option<String>,
    pub user_id: Option<String>,
    pub msg_id: Option<String>,
    pub extra: Vec<(String, String)>,
}

impl TelemetryLabels {
    pub fn for_message(chat_id: i64, user_id: i64, msg_id: i64) -> Self {
        Self {
            chat_id: Some(chat_id.to_string()),
            user_id: Some(user_id.to_string()),
            msg_id: Some(msg_id.to_string()),
            extra: Vec::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// Labels attached to counters. Ids are left out to keep cardinality low.
    pub fn tags(&self) -> Vec<(String, String)> {
        self.extra.clone()
    }
}
