//! HTTP client for network-based API calls

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::order::{
    AddItemsRequest, COMMAND_ID_HEADER, CartLine, CreateOrderRequest, ItemChanges, ItemStatus,
    MarkItemReadyRequest, OrderEvent, OrderItem, OrderSnapshot, OrderStatus, PaymentMethod,
    SetItemStatusRequest, SetOrderStatusRequest, StaffResponseRequest,
};
use shared::ApiResponse;

use crate::{ClientConfig, ClientError, ClientResult, OrderApi};

/// Error code for an illegal transition; `data` carries the current order
const CODE_ILLEGAL_TRANSITION: &str = "E0007";

/// HTTP client for making network requests to the order server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut request = self.client.request(method, url);
        if let Some(token) = &self.token {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token));
        }
        request
    }

    /// Send a JSON request and unwrap the response envelope
    pub async fn call<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call_with_id(method, path, body, None).await
    }

    /// Like [`call`](Self::call) with an explicit command id for retries
    pub async fn call_with_id<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        command_id: Option<&str>,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(id) = command_id {
            request = request.header(COMMAND_ID_HEADER, id);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;

        let envelope: ApiResponse<serde_json::Value> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => return Err(Self::status_error(status, text)),
            Err(e) => return Err(ClientError::InvalidResponse(e.to_string())),
        };

        if status.is_success() && envelope.is_success() {
            let data = envelope
                .data
                .ok_or_else(|| ClientError::InvalidResponse("Missing data".to_string()))?;
            return serde_json::from_value(data).map_err(Into::into);
        }

        if envelope.code == CODE_ILLEGAL_TRANSITION || status == StatusCode::CONFLICT {
            let current = envelope
                .data
                .and_then(|d| serde_json::from_value::<OrderSnapshot>(d).ok())
                .map(Box::new);
            return Err(ClientError::Conflict {
                message: envelope.message,
                current,
            });
        }

        Err(Self::status_error(status, envelope.message))
    }

    fn status_error(status: StatusCode, message: String) -> ClientError {
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::BAD_REQUEST => ClientError::Validation(message),
            StatusCode::CONFLICT => ClientError::Conflict {
                message,
                current: None,
            },
            _ => ClientError::Internal(message),
        }
    }
}

#[async_trait]
impl OrderApi for HttpClient {
    async fn create_order(
        &self,
        table_id: Option<&str>,
        lines: Vec<CartLine>,
        payment_method: Option<PaymentMethod>,
    ) -> ClientResult<OrderSnapshot> {
        let body = CreateOrderRequest {
            table_id: table_id.map(str::to_string),
            lines,
            payment_method,
        };
        self.call(Method::POST, "/api/orders", Some(&body)).await
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<OrderSnapshot> {
        self.call::<_, ()>(Method::GET, &format!("/api/orders/{}", order_id), None)
            .await
    }

    async fn list_orders(&self, status: Option<OrderStatus>) -> ClientResult<Vec<OrderSnapshot>> {
        let path = match status {
            Some(status) => format!("/api/orders?status={}", status),
            None => "/api/orders".to_string(),
        };
        self.call::<_, ()>(Method::GET, &path, None).await
    }

    async fn order_events(&self, order_id: &str) -> ClientResult<Vec<OrderEvent>> {
        self.call::<_, ()>(Method::GET, &format!("/api/orders/{}/events", order_id), None)
            .await
    }

    async fn add_items(&self, order_id: &str, lines: Vec<CartLine>) -> ClientResult<OrderSnapshot> {
        let body = AddItemsRequest { lines };
        self.call(Method::POST, &format!("/api/orders/{}/items", order_id), Some(&body))
            .await
    }

    async fn cancel_item(&self, order_id: &str, item_id: &str) -> ClientResult<OrderSnapshot> {
        let path = format!("/api/orders/{}/items/{}", order_id, item_id);
        self.call::<_, ()>(Method::DELETE, &path, None).await
    }

    async fn resubmit(&self, order_id: &str, changes: ItemChanges) -> ClientResult<OrderSnapshot> {
        let path = format!("/api/orders/{}/resubmit", order_id);
        self.call(Method::POST, &path, Some(&changes)).await
    }

    async fn set_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        payment_method: Option<PaymentMethod>,
    ) -> ClientResult<OrderSnapshot> {
        let body = SetOrderStatusRequest {
            status,
            payment_method,
        };
        self.call(Method::PUT, &format!("/api/orders/{}/status", order_id), Some(&body))
            .await
    }

    async fn staff_respond(
        &self,
        order_id: &str,
        approved: bool,
        reason: Option<&str>,
    ) -> ClientResult<OrderSnapshot> {
        let body = StaffResponseRequest {
            approved,
            reason: reason.map(str::to_string),
        };
        let path = format!("/api/orders/{}/staff-response", order_id);
        self.call(Method::POST, &path, Some(&body)).await
    }

    async fn confirm(&self, order_id: &str) -> ClientResult<OrderSnapshot> {
        self.call::<_, ()>(Method::POST, &format!("/api/orders/{}/confirm", order_id), None)
            .await
    }

    async fn start_preparing(&self, order_id: &str) -> ClientResult<OrderSnapshot> {
        let path = format!("/api/orders/{}/start-preparing", order_id);
        self.call::<_, ()>(Method::POST, &path, None).await
    }

    async fn set_item_status(&self, item_id: &str, status: ItemStatus) -> ClientResult<OrderItem> {
        let body = SetItemStatusRequest { status };
        self.call(Method::PUT, &format!("/api/items/{}/status", item_id), Some(&body))
            .await
    }

    async fn mark_item_ready(
        &self,
        item_id: &str,
        preparer_id: Option<&str>,
    ) -> ClientResult<OrderItem> {
        let body = MarkItemReadyRequest {
            preparer_id: preparer_id.map(str::to_string),
        };
        self.call(Method::POST, &format!("/api/items/{}/ready", item_id), Some(&body))
            .await
    }
}
