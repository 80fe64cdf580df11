use gqa_core::error::QaError;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
}

impl OllamaClient {
    /// Create a client for Ollama. This is strictly limited to `127.0.0.1`.
    pub fn new(base_url: &str) -> Result<Self, QaError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let rejected = || {
            QaError::new(
                "AI_REMOTE_NOT_ALLOWED",
                "Ollama base URL must be localhost (127.0.0.1)",
            )
            .with_details(format!("base_url={base_url}"))
        };

        // Binding constraint: local-only via 127.0.0.1, optional port, no path.
        let rest = base_url.strip_prefix("http://").ok_or_else(rejected)?;
        if rest.contains('/') {
            return Err(rejected());
        }
        match rest.split_once(':') {
            None => {
                if rest != "127.0.0.1" {
                    return Err(rejected());
                }
            }
            Some((host, port)) => {
                if host != "127.0.0.1" {
                    return Err(rejected());
                }
                let port: u16 = port.parse().map_err(|_| rejected())?;
                if port == 0 {
                    return Err(rejected());
                }
            }
        }

        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health_check(&self) -> Result<(), QaError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = ureq::get(&url)
            .timeout(std::time::Duration::from_millis(800))
            .call();

        match resp {
            Ok(r) if r.status() == 200 => Ok(()),
            Ok(r) => Err(
                QaError::new("AI_OLLAMA_UNHEALTHY", "Ollama health check failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(e) => Err(QaError::new(
                "AI_OLLAMA_UNREACHABLE",
                "Failed to reach Ollama on 127.0.0.1",
            )
            .with_details(e.to_string())
            .with_retryable(true)),
        }
    }
}
