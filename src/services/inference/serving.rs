//! Model server backend
//!
//! Talks to a TensorFlow-Serving style REST API hosting the exported
//! retrieval model:
//!
//! 1. Startup probe: `GET {url}/v1/models/{name}` must answer 2xx
//! 2. Prediction: `POST {url}/v1/models/{name}:predict` with
//!    `{"inputs": [user_id]}`. Signatures that only accept named inputs
//!    reject that with a 400, in which case the request is retried once as
//!    `{"inputs": {input_key: [user_id]}}`.
//!
//! The response carries one or more output tensors (scores and titles). The
//! first tensor holding strings is the ranked title list.
use std::time::Duration;

use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{InferenceError, PredictionList, RetrievalModel};

#[derive(Debug, Deserialize)]
struct PredictResponse {
    outputs: Value,
}

#[derive(Clone)]
pub struct ServingModel {
    http_client: HttpClient,
    model_url: String,
    input_key: String,
}

impl ServingModel {
    /// Creates a client and checks that the server knows the model
    pub async fn connect(
        base_url: &str,
        model_name: &str,
        input_key: &str,
        timeout: Duration,
    ) -> Result<Self, InferenceError> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        let model_url = format!("{}/v1/models/{}", base_url.trim_end_matches('/'), model_name);

        let response = http_client
            .get(&model_url)
            .send()
            .await
            .map_err(|e| InferenceError::ArtifactUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(InferenceError::ArtifactUnavailable(format!(
                "{} answered {}",
                model_url,
                response.status()
            )));
        }

        Ok(Self {
            http_client,
            model_url,
            input_key: input_key.to_string(),
        })
    }

    async fn call(&self, body: &Value) -> Result<Option<PredictResponse>, InferenceError> {
        let response = self
            .http_client
            .post(format!("{}:predict", self.model_url))
            .json(body)
            .send()
            .await?;

        match response.status() {
            StatusCode::BAD_REQUEST => Ok(None),
            status if status.is_success() => {
                let parsed = response
                    .json::<PredictResponse>()
                    .await
                    .map_err(|e| InferenceError::MalformedOutput(e.to_string()))?;
                Ok(Some(parsed))
            }
            status => Err(InferenceError::CallingConvention(format!(
                "model server answered {}",
                status
            ))),
        }
    }
}

/// First string tensor in `outputs`, first row
fn extract_titles(outputs: &Value) -> Result<PredictionList, InferenceError> {
    let tensors: Vec<&Value> = match outputs {
        Value::Object(named) => named.values().collect(),
        single => vec![single],
    };

    tensors
        .into_iter()
        .find_map(string_row)
        .ok_or_else(|| InferenceError::MalformedOutput("no string output tensor".to_string()))
}

fn string_row(tensor: &Value) -> Option<PredictionList> {
    let row = tensor.as_array()?.first()?.as_array()?;
    row.iter()
        .map(|value| value.as_str().map(str::to_string))
        .collect()
}

#[async_trait::async_trait]
impl RetrievalModel for ServingModel {
    async fn predict(&self, user_id: &str) -> Result<PredictionList, InferenceError> {
        let positional = json!({ "inputs": [user_id] });
        let response = match self.call(&positional).await? {
            Some(response) => response,
            None => {
                tracing::debug!(
                    input_key = %self.input_key,
                    "Positional input rejected, retrying with named input"
                );
                let mut inputs = Map::new();
                inputs.insert(self.input_key.clone(), json!([user_id]));
                let named = json!({ "inputs": inputs });
                self.call(&named).await?.ok_or_else(|| {
                    InferenceError::CallingConvention(
                        "model server rejected positional and named inputs".to_string(),
                    )
                })?
            }
        };

        extract_titles(&response.outputs)
    }

    fn name(&self) -> &'static str {
        "serving"
    }
}
