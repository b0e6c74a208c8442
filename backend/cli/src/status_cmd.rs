//! CLI Status Command
//!
//! Queries `/api/health` of a locally running server.

use anyhow::Result;

use crate::terminal_output::note_warn;

pub async fn run(port: u16) -> Result<()> {
    println!("LlamaOCR status: checking...");
    let client = reqwest::Client::new();
    match client.get(health_url(port)).send().await {
        Ok(resp) => {
            let body: serde_json::Value = resp.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Err(_) => note_warn(&format!("LlamaOCR is not running on port {port}")),
    }
    Ok(())
}

fn health_url(port: u16) -> String {
    format!("http://localhost:{port}/api/health")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_url_uses_port() {
        assert_eq!(health_url(8501), "http://localhost:8501/api/health");
    }
}
