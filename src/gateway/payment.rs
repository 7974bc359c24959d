//! Payment gateway
//!
//! One payment session is created per submission: the provider returns a
//! transaction id and a hosted checkout URL the customer is redirected to.
//! The outcome arrives later through the webhook (see `crate::payments`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::error::{GatewayError, GatewayResult};

/// Everything the provider needs to open a checkout session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: f64,
    pub description: String,
    pub request_id: String,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: String,
}

impl PaymentRequest {
    /// Split the contact name into provider first/last names.
    ///
    /// The first word is the first name, the remainder the last name; either
    /// side falls back to the full name when empty.
    pub fn customer_names(&self) -> (String, String) {
        let full = self.customer_name.trim();
        let mut words = full.split_whitespace();
        let first = words.next().unwrap_or_default();
        let rest = words.collect::<Vec<_>>().join(" ");

        let first = if first.is_empty() { full } else { first };
        let last = if rest.is_empty() { full } else { rest.as_str() };
        (first.to_string(), last.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    pub transaction_id: String,
    pub payment_url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a checkout session for `request`
    async fn create_session(&self, request: &PaymentRequest) -> GatewayResult<PaymentSession>;
}

/// FedaPay REST client
pub struct FedaPayClient {
    client: Client,
    base_url: String,
    secret_key: String,
    currency: String,
    country: String,
    callback_url: Option<String>,
}

impl FedaPayClient {
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
            currency: "XOF".to_string(),
            country: "CI".to_string(),
            callback_url: None,
        })
    }

    pub fn with_currency(mut self, currency: impl Into<String>, country: impl Into<String>) -> Self {
        self.currency = currency.into();
        self.country = country.into();
        self
    }

    pub fn with_callback_url(mut self, url: Option<String>) -> Self {
        self.callback_url = url;
        self
    }

    fn transaction_body(&self, request: &PaymentRequest) -> Value {
        let (firstname, lastname) = request.customer_names();
        let mut body = json!({
            "description": request.description,
            "amount": request.amount.round() as i64,
            "currency": { "iso": self.currency },
            "customer": {
                "firstname": firstname,
                "lastname": lastname,
                "email": request.customer_email,
                "phone_number": {
                    "number": request.customer_phone,
                    "country": self.country,
                },
            },
            "custom_metadata": { "request_id": request.request_id },
        });
        if let Some(url) = &self.callback_url {
            body["callback_url"] = json!(url);
        }
        body
    }

    async fn post(&self, url: String, body: Option<&Value>) -> GatewayResult<Value> {
        let mut builder = self.client.post(url).bearer_auth(&self.secret_key);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

/// The API wraps objects as `{"v1": {...}}` or `{"v1/transaction": {...}}`
fn unwrap_entity<'a>(value: &'a Value, key: &str) -> &'a Value {
    value
        .get("v1")
        .or_else(|| value.get(format!("v1/{key}")))
        .unwrap_or(value)
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    match value.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl PaymentGateway for FedaPayClient {
    async fn create_session(&self, request: &PaymentRequest) -> GatewayResult<PaymentSession> {
        debug!(
            "Creating transaction for request {} ({} {})",
            request.request_id, request.amount, self.currency
        );

        let body = self.transaction_body(request);
        let created = self
            .post(format!("{}/v1/transactions", self.base_url), Some(&body))
            .await?;
        let transaction_id = string_field(unwrap_entity(&created, "transaction"), "id")
            .ok_or_else(|| GatewayError::invalid_response("transaction response without id"))?;

        let token = self
            .post(
                format!("{}/v1/transactions/{}/token", self.base_url, transaction_id),
                None,
            )
            .await?;
        let payment_url = string_field(unwrap_entity(&token, "token"), "url")
            .ok_or_else(|| GatewayError::invalid_response("token response without url"))?;

        info!(
            "Payment session {} opened for request {}",
            transaction_id, request.request_id
        );
        Ok(PaymentSession {
            transaction_id,
            payment_url,
        })
    }
}

/// Payment gateway double that records requests and replays queued results
#[derive(Clone, Default)]
pub struct MockPaymentGateway {
    responses: Arc<Mutex<VecDeque<GatewayResult<PaymentSession>>>>,
    requests: Arc<Mutex<Vec<PaymentRequest>>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_response(&self, response: GatewayResult<PaymentSession>) {
        self.responses.lock().await.push_back(response);
    }

    pub async fn requests(&self) -> Vec<PaymentRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_session(&self, request: &PaymentRequest) -> GatewayResult<PaymentSession> {
        let mut requests = self.requests.lock().await;
        requests.push(request.clone());
        let count = requests.len();
        drop(requests);

        match self.responses.lock().await.pop_front() {
            Some(response) => response,
            None => Ok(PaymentSession {
                transaction_id: format!("txn-{count}"),
                payment_url: format!("https://checkout.test/pay/txn-{count}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> PaymentRequest {
        PaymentRequest {
            amount: 150_000.0,
            description: "Création SARL".to_string(),
            request_id: "req-1".to_string(),
            customer_email: "awa@example.com".to_string(),
            customer_name: name.to_string(),
            customer_phone: "+2250101010101".to_string(),
        }
    }

    #[test]
    fn test_customer_names_split() {
        assert_eq!(
            request("Awa Marie Kone").customer_names(),
            ("Awa".to_string(), "Marie Kone".to_string())
        );
        assert_eq!(
            request("Yao").customer_names(),
            ("Yao".to_string(), "Yao".to_string())
        );
    }

    #[test]
    fn test_transaction_body() {
        let client = FedaPayClient::new("https://sandbox-api.fedapay.com/", "sk", Duration::from_secs(5))
            .unwrap()
            .with_callback_url(Some("https://api.legalform.ci/api/v1/payments/webhook".to_string()));

        let body = client.transaction_body(&request("Awa Kone"));
        assert_eq!(body["amount"], json!(150000));
        assert_eq!(body["currency"]["iso"], json!("XOF"));
        assert_eq!(body["customer"]["phone_number"]["country"], json!("CI"));
        assert_eq!(body["custom_metadata"]["request_id"], json!("req-1"));
        assert_eq!(
            body["callback_url"],
            json!("https://api.legalform.ci/api/v1/payments/webhook")
        );
    }

    #[test]
    fn test_unwrap_entity_shapes() {
        let wrapped = json!({"v1": {"id": 42}});
        assert_eq!(string_field(unwrap_entity(&wrapped, "transaction"), "id").as_deref(), Some("42"));

        let keyed = json!({"v1/transaction": {"id": "abc"}});
        assert_eq!(string_field(unwrap_entity(&keyed, "transaction"), "id").as_deref(), Some("abc"));

        let bare = json!({"url": "https://pay"});
        assert_eq!(string_field(unwrap_entity(&bare, "token"), "url").as_deref(), Some("https://pay"));
    }

    #[tokio::test]
    async fn test_mock_replays_queued_failure() {
        let mock = MockPaymentGateway::new();
        mock.add_response(Err(GatewayError::unavailable("down"))).await;

        assert!(mock.create_session(&request("Awa")).await.is_err());
        let session = mock.create_session(&request("Awa")).await.unwrap();
        assert_eq!(session.transaction_id, "txn-2");
        assert_eq!(mock.requests().await.len(), 2);
    }
}
