use serde::{Deserialize, Serialize};

/// Point-in-time liveness of a downstream dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Online,
    Offline,
}

impl From<bool> for ServiceState {
    fn from(online: bool) -> Self {
        if online {
            ServiceState::Online
        } else {
            ServiceState::Offline
        }
    }
}

impl ServiceState {
    pub fn is_online(self) -> bool {
        self == ServiceState::Online
    }
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceState::Online => write!(f, "online"),
            ServiceState::Offline => write!(f, "offline"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub llm: ServiceState,
    pub vector_db: ServiceState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_wire_format() {
        let status = HealthStatus {
            llm: ServiceState::Offline,
            vector_db: true.into(),
        };
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            r#"{"llm":"offline","vectorDb":"online"}"#
        );
    }
}
