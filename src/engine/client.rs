use super::types::{BulkCalculationRequest, BulkCalculationResponse, CalculationResult};
use crate::config::EngineConfig;
use crate::error::EngineError;
use tracing::{debug, warn};

/// Anything that can price a batch of enhancement paths in one round trip.
///
/// Implementations return exactly one result per request item, in request
/// order. Retry and backoff, if any, live here rather than in callers.
pub trait CostEngine {
    fn calculate_bulk(
        &self,
        request: &BulkCalculationRequest,
    ) -> Result<Vec<CalculationResult>, EngineError>;
}

impl<E: CostEngine + ?Sized> CostEngine for &E {
    fn calculate_bulk(
        &self,
        request: &BulkCalculationRequest,
    ) -> Result<Vec<CalculationResult>, EngineError> {
        (**self).calculate_bulk(request)
    }
}

/// Reject a response whose length does not match the request, since results
/// are attributed by position.
pub fn check_result_count(
    expected: usize,
    results: Vec<CalculationResult>,
) -> Result<Vec<CalculationResult>, EngineError> {
    if results.len() != expected {
        return Err(EngineError::ResultCountMismatch {
            expected,
            actual: results.len(),
        });
    }
    Ok(results)
}

/// Blocking HTTP client for the cost engine.
pub struct HttpCostEngine {
    agent: ureq::Agent,
    url: String,
    user_agent: String,
}

impl HttpCostEngine {
    pub fn new(config: &EngineConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout()).build();
        Self {
            agent,
            url: config.url(),
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl CostEngine for HttpCostEngine {
    fn calculate_bulk(
        &self,
        request: &BulkCalculationRequest,
    ) -> Result<Vec<CalculationResult>, EngineError> {
        debug!(url = %self.url, items = request.items.len(), "Submitting bulk calculation");

        let response = self
            .agent
            .post(&self.url)
            .set("User-Agent", &self.user_agent)
            .send_json(request)
            .map_err(map_ureq_error)?;

        let body: BulkCalculationResponse = response
            .into_json()
            .map_err(|e| EngineError::Decode(e.to_string()))?;

        check_result_count(request.items.len(), body.results)
    }
}

fn map_ureq_error(err: ureq::Error) -> EngineError {
    match err {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            warn!(code, "Cost engine rejected request");
            EngineError::Status { code, body }
        }
        ureq::Error::Transport(transport) => {
            warn!(error = %transport, "Cost engine unreachable");
            EngineError::Transport(transport.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(cost: f64) -> CalculationResult {
        CalculationResult {
            average_cost: cost,
            median_cost: cost,
            percentile75_cost: cost,
            average_spare_count: 0.0,
            median_spare_count: 0.0,
            percentile75_spare_count: 0.0,
            luck_analysis: None,
        }
    }

    #[test]
    fn test_check_result_count_accepts_exact() {
        let results = check_result_count(2, vec![result(1.0), result(2.0)]).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_check_result_count_rejects_short_batch() {
        let err = check_result_count(3, vec![result(1.0)]).unwrap_err();
        assert_eq!(
            err,
            EngineError::ResultCountMismatch {
                expected: 3,
                actual: 1
            }
        );
    }

    #[test]
    fn test_http_engine_uses_configured_url() {
        let config = EngineConfig::default().with_base_url("http://engine.test:9000");
        let engine = HttpCostEngine::new(&config);
        assert_eq!(engine.url(), "http://engine.test:9000/starforce/bulk");
    }

    #[test]
    fn test_unreachable_engine_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let config = EngineConfig {
            timeout_secs: 2,
            ..EngineConfig::default().with_base_url("http://127.0.0.1:9")
        };
        let engine = HttpCostEngine::new(&config);
        let err = engine
            .calculate_bulk(&BulkCalculationRequest::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::Transport(_)));
    }
}
