//! Command-envelope RPC transport.
//!
//! The service speaks a single `Dispatch` RPC whose request carries a command
//! key plus a JSON payload, and whose response carries a status code plus a
//! JSON body. Peer services (the product service included) speak the same
//! envelope, so the generated client doubles as the outbound channel.

use serde::{Serialize, de::DeserializeOwned};
use tonic::{Request, Response, Status};

use crate::{
    dto::orders::{
        ChangeOrderStatusRequest, CreateOrderRequest, FindAllOrdersRequest, FindOneOrderRequest,
    },
    error::{AppError, AppResult},
    services::order_service,
    state::AppState,
};

#[derive(Clone, prost::Message)]
pub struct CommandRequest {
    #[prost(string, tag = "1")]
    pub command: String,
    /// JSON-encoded command payload.
    #[prost(string, tag = "2")]
    pub payload: String,
}

#[derive(Clone, prost::Message)]
pub struct CommandResponse {
    #[prost(uint32, tag = "1")]
    pub status: u32,
    /// JSON-encoded result on success, `{status, message}` on failure.
    #[prost(string, tag = "2")]
    pub body: String,
}

include!(concat!(env!("OUT_DIR"), "/orders.rpc.CommandService.rs"));

pub use command_service_client::CommandServiceClient;
pub use command_service_server::{CommandService, CommandServiceServer};

pub const CREATE_ORDER: &str = "create_order";
pub const FIND_ALL_ORDERS: &str = "find_all_orders";
pub const FIND_ONE_ORDER: &str = "find_one_order";
pub const CHANGE_ORDER_STATUS: &str = "change_order_status";

/// Outbound command understood by the product service.
pub const VALIDATE_PRODUCTS: &str = "validate_products";

/// Inbound handler: routes command keys to the order service.
pub struct OrdersRpc {
    state: AppState,
}

impl OrdersRpc {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    async fn handle(&self, command: &str, payload: &str) -> AppResult<serde_json::Value> {
        match command {
            CREATE_ORDER => {
                let request: CreateOrderRequest = parse(payload)?;
                to_body(order_service::create(&self.state, request).await?)
            }
            FIND_ALL_ORDERS => {
                let request: FindAllOrdersRequest = parse(payload)?;
                to_body(order_service::find_all(&self.state, request).await?)
            }
            FIND_ONE_ORDER => {
                let request: FindOneOrderRequest = parse(payload)?;
                to_body(order_service::find_one(&self.state, request.id).await?)
            }
            CHANGE_ORDER_STATUS => {
                let request: ChangeOrderStatusRequest = parse(payload)?;
                to_body(order_service::change_status(&self.state, request).await?)
            }
            other => Err(AppError::InvalidArgument(format!(
                "unknown command: {other}"
            ))),
        }
    }
}

#[tonic::async_trait]
impl CommandService for OrdersRpc {
    async fn dispatch(
        &self,
        request: Request<CommandRequest>,
    ) -> Result<Response<CommandResponse>, Status> {
        let request = request.into_inner();
        tracing::debug!(command = %request.command, "dispatching command");

        let response = match self.handle(&request.command, &request.payload).await {
            Ok(body) => CommandResponse {
                status: 200,
                body: body.to_string(),
            },
            Err(err) => {
                tracing::warn!(command = %request.command, error = %err, "command failed");
                let status = err.status_code();
                let body =
                    serde_json::json!({ "status": status, "message": err.to_string() });
                CommandResponse {
                    status,
                    body: body.to_string(),
                }
            }
        };

        Ok(Response::new(response))
    }
}

fn parse<T: DeserializeOwned>(payload: &str) -> AppResult<T> {
    serde_json::from_str(payload)
        .map_err(|e| AppError::InvalidArgument(format!("invalid payload: {e}")))
}

fn to_body<T: Serialize>(value: T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.into()))
}

/// Build the tonic service wrapping the dispatch handler.
pub fn command_server(state: AppState) -> CommandServiceServer<OrdersRpc> {
    CommandServiceServer::new(OrdersRpc::new(state))
}
