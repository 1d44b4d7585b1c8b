use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::llm::ollama::OllamaClient;
use crate::llm::InsightSettings;

#[derive(Debug, Serialize)]
pub struct ConnectionTestResult {
    pub success: bool,
    pub message: String,
}

pub async fn test_connection(settings: &InsightSettings) -> Result<ConnectionTestResult> {
    let client = OllamaClient::new(settings.clone())?;

    match client.test_connection().await {
        Ok(()) => Ok(ConnectionTestResult {
            success: true,
            message: format!("Ollama connected successfully ({} available)", settings.model),
        }),
        Err(e) => Ok(ConnectionTestResult { success: false, message: e }),
    }
}

pub async fn check(settings: &InsightSettings) -> Result<()> {
    let result = test_connection(settings).await?;
    if result.success {
        println!("✅ {}", result.message);
        Ok(())
    } else {
        Err(anyhow!(result.message))
    }
}

pub async fn models(settings: &InsightSettings) -> Result<()> {
    let client = OllamaClient::new(settings.clone())?;
    let models = client.list_models().await.map_err(|e| anyhow!(e))?;

    if models.is_empty() {
        println!("No models installed.");
    }
    for name in models {
        println!("{}", name);
    }
    Ok(())
}
