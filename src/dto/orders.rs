use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Order, OrderStatus},
    response::Meta,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: i32,
    pub quantity: i32,
    /// Clients may send a price; it is ignored, the product service is
    /// authoritative.
    #[serde(default)]
    pub price: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.items.is_empty() {
            return Err(AppError::InvalidArgument(
                "order must contain at least one item".into(),
            ));
        }
        for (idx, item) in self.items.iter().enumerate() {
            if item.product_id <= 0 {
                return Err(AppError::InvalidArgument(format!(
                    "items[{idx}].productId must be a positive integer"
                )));
            }
            if item.quantity <= 0 {
                return Err(AppError::InvalidArgument(format!(
                    "items[{idx}].quantity must be a positive integer"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindAllOrdersRequest {
    pub status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl FindAllOrdersRequest {
    /// Validate the filter and fill in defaults. Returns
    /// `(status, page, limit)`.
    pub fn validated(&self, default_limit: u64) -> AppResult<(Option<OrderStatus>, u64, u64)> {
        let status = match self.status.as_deref() {
            None => None,
            Some(raw) => Some(parse_status(raw)?),
        };
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::InvalidArgument("page must be positive".into()));
        }
        let limit = self.limit.unwrap_or(default_limit);
        if limit == 0 {
            return Err(AppError::InvalidArgument("limit must be positive".into()));
        }
        Ok((status, page, limit))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FindOneOrderRequest {
    pub id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeOrderStatusRequest {
    pub id: Uuid,
    pub status: String,
}

impl ChangeOrderStatusRequest {
    pub fn parsed_status(&self) -> AppResult<OrderStatus> {
        parse_status(&self.status)
    }
}

fn parse_status(raw: &str) -> AppResult<OrderStatus> {
    OrderStatus::parse(raw).ok_or_else(|| {
        AppError::InvalidArgument(format!(
            "invalid status '{raw}', valid values are {}",
            OrderStatus::valid_values()
        ))
    })
}

/// An order line joined with the product name resolved from the product
/// service. The name is never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemWithProduct {
    pub id: Uuid,
    pub product_id: i32,
    pub quantity: i32,
    pub price: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemWithProduct>,
}

#[derive(Debug, Serialize)]
pub struct OrderList {
    pub data: Vec<Order>,
    pub meta: Meta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: i32, quantity: i32) -> OrderItemRequest {
        OrderItemRequest {
            product_id,
            quantity,
            price: None,
        }
    }

    #[test]
    fn create_rejects_an_empty_item_list() {
        let req = CreateOrderRequest { items: vec![] };
        let err = req.validate().unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn create_rejects_non_positive_fields() {
        let req = CreateOrderRequest {
            items: vec![item(0, 1)],
        };
        assert!(req.validate().is_err());

        let req = CreateOrderRequest {
            items: vec![item(1, 0)],
        };
        assert!(req.validate().is_err());

        let req = CreateOrderRequest {
            items: vec![item(1, 2), item(-3, 2)],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_accepts_valid_items_and_ignores_client_price() {
        let req: CreateOrderRequest = serde_json::from_str(
            r#"{"items": [{"productId": 1, "quantity": 2, "price": 999}]}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.items[0].price, Some(999));
    }

    #[test]
    fn find_all_defaults_page_and_limit() {
        let req = FindAllOrdersRequest::default();
        let (status, page, limit) = req.validated(10).unwrap();
        assert_eq!(status, None);
        assert_eq!(page, 1);
        assert_eq!(limit, 10);
    }

    #[test]
    fn find_all_rejects_zero_page_or_limit_or_bad_status() {
        let req = FindAllOrdersRequest {
            page: Some(0),
            ..Default::default()
        };
        assert!(req.validated(10).is_err());

        let req = FindAllOrdersRequest {
            limit: Some(0),
            ..Default::default()
        };
        assert!(req.validated(10).is_err());

        let req = FindAllOrdersRequest {
            status: Some("SHIPPED".into()),
            ..Default::default()
        };
        let err = req.validated(10).unwrap_err();
        assert!(err.to_string().contains("PENDING, CONFIRMED"));
    }

    #[test]
    fn change_status_parses_enum_members_only() {
        let req = ChangeOrderStatusRequest {
            id: Uuid::new_v4(),
            status: "DELIVERED".into(),
        };
        assert_eq!(req.parsed_status().unwrap(), OrderStatus::Delivered);

        let req = ChangeOrderStatusRequest {
            id: Uuid::new_v4(),
            status: "delivered".into(),
        };
        assert!(req.parsed_status().is_err());
    }
}
