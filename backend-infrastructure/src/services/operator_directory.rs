use std::collections::HashMap;

use async_trait::async_trait;
use backend_domain::ports::OperatorDirectory;
use backend_domain::{OperatorCredential, OperatorId, RuntimeConfig};

/// Bearer tokens from config mapped to operator ids. With no operators
/// configured every caller acts as the default operator.
pub struct StaticOperatorDirectory {
    default_operator: OperatorId,
    by_token: HashMap<String, OperatorId>,
}

impl StaticOperatorDirectory {
    pub fn new(default_operator: &str, operators: &[OperatorCredential]) -> Self {
        let by_token = operators
            .iter()
            .map(|operator| (operator.token.clone(), OperatorId::new(operator.id.clone())))
            .collect();
        Self {
            default_operator: OperatorId::new(default_operator),
            by_token,
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(&config.default_operator, &config.operators)
    }

    pub fn is_open(&self) -> bool {
        self.by_token.is_empty()
    }
}

#[async_trait]
impl OperatorDirectory for StaticOperatorDirectory {
    async fn current_operator(&self, bearer: Option<&str>) -> Option<OperatorId> {
        if self.is_open() {
            return Some(self.default_operator.clone());
        }
        let token = bearer?.trim();
        self.by_token.get(token).cloned()
    }
}
