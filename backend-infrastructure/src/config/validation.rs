use std::collections::HashSet;

use anyhow::{anyhow, Result};

use backend_domain::OperatorCredential;

pub fn validate_operators(operators: &[OperatorCredential]) -> Result<()> {
    let mut ids = HashSet::new();
    let mut tokens = HashSet::new();
    for operator in operators {
        if operator.id.trim().is_empty() {
            return Err(anyhow!("operator id is empty"));
        }
        if operator.token.trim().is_empty() {
            return Err(anyhow!("operator '{}' has an empty token", operator.id));
        }
        if !ids.insert(operator.id.as_str()) {
            return Err(anyhow!("operator '{}' is listed twice", operator.id));
        }
        if !tokens.insert(operator.token.as_str()) {
            return Err(anyhow!("operator '{}' reuses another operator's token", operator.id));
        }
    }
    Ok(())
}
