use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    response::ErrorBody,
    rpc::{CommandRequest, CommandServiceClient, VALIDATE_PRODUCTS},
};

/// A product as resolved by the product service: current name and unit price
/// (minor units) for a referenced id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: i64,
}

/// Port to the product service. Given a set of product ids, returns the
/// current name and price for each, or fails if any id is unknown.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn validate(&self, product_ids: &[i32]) -> AppResult<Vec<Product>>;
}

/// `ProductLookup` backed by the product service's command RPC endpoint.
/// Transport failures are retried a bounded number of times with a fixed
/// delay; a definitive rejection from the service is not retried.
pub struct GrpcProductLookup {
    endpoint: String,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl GrpcProductLookup {
    pub fn new(endpoint: String, retry_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            endpoint,
            retry_attempts,
            retry_delay,
        }
    }

    async fn call(&self, payload: String) -> anyhow::Result<crate::rpc::CommandResponse> {
        let mut client = CommandServiceClient::connect(self.endpoint.clone()).await?;
        let response = client
            .dispatch(CommandRequest {
                command: VALIDATE_PRODUCTS.to_string(),
                payload,
            })
            .await?;
        Ok(response.into_inner())
    }
}

#[async_trait]
impl ProductLookup for GrpcProductLookup {
    async fn validate(&self, product_ids: &[i32]) -> AppResult<Vec<Product>> {
        let payload = serde_json::to_string(product_ids)
            .map_err(|e| AppError::Internal(e.into()))?;

        let mut attempt = 0;
        let response = loop {
            match self.call(payload.clone()).await {
                Ok(response) => break response,
                Err(err) if attempt < self.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        error = %err,
                        attempt,
                        max_attempts = self.retry_attempts,
                        "product lookup transport error, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) => {
                    tracing::error!(error = %err, "product lookup failed, retries exhausted");
                    return Err(AppError::ProductLookup(
                        "product service unavailable".into(),
                    ));
                }
            }
        };

        if response.status != 200 {
            let message = serde_json::from_str::<ErrorBody>(&response.body)
                .map(|body| body.message)
                .unwrap_or_else(|_| "product validation rejected".into());
            return Err(AppError::ProductLookup(message));
        }

        serde_json::from_str(&response.body)
            .map_err(|e| AppError::ProductLookup(format!("malformed product response: {e}")))
    }
}
