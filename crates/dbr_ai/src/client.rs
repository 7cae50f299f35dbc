use dbr_core::error::AppError;

/// HTTP client handle for the local model runtime hosting the embedding and
/// completion endpoints. Strictly limited to `127.0.0.1`.
#[derive(Debug, Clone)]
pub struct LocalClient {
    base_url: String,
}

impl LocalClient {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        // Binding constraint: local-only via 127.0.0.1.
        if !base_url.starts_with("http://127.0.0.1:") && base_url != "http://127.0.0.1" {
            return Err(AppError::new(
                "AI_REMOTE_NOT_ALLOWED",
                "Model runtime base URL must be localhost (127.0.0.1)",
            )
            .with_details(format!("base_url={base_url}")));
        }
        if let Some(port) = base_url.strip_prefix("http://127.0.0.1:") {
            let valid = port.parse::<u16>().map(|p| p > 0).unwrap_or(false);
            if !valid {
                return Err(AppError::new(
                    "AI_REMOTE_NOT_ALLOWED",
                    "Model runtime base URL has an invalid port",
                )
                .with_details(format!("base_url={base_url}")));
            }
        }

        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health_check(&self) -> Result<(), AppError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = ureq::get(&url)
            .timeout(std::time::Duration::from_millis(800))
            .call();

        match resp {
            Ok(r) if r.status() == 200 => Ok(()),
            Ok(r) => Err(
                AppError::new("AI_RUNTIME_UNHEALTHY", "Model runtime health check failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(e) => Err(AppError::new(
                "AI_RUNTIME_UNREACHABLE",
                "Failed to reach model runtime on 127.0.0.1",
            )
            .with_details(e.to_string())
            .with_retryable(true)),
        }
    }
}
