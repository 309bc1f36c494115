use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::orders::{
        ChangeOrderStatusRequest, CreateOrderRequest, FindAllOrdersRequest, OrderItemRequest,
        OrderItemWithProduct, OrderList, OrderWithItems,
    },
    entity::{orders::Model as OrderModel, order_items::Model as OrderItemModel},
    error::{AppError, AppResult},
    models::Order,
    products::Product,
    response::Meta,
    state::AppState,
    store::{NewOrder, NewOrderItem},
};

/// Create an order. Product ids are validated against the product service
/// first; totals are computed from the resolved prices, never from the
/// client's. The order and its items are persisted atomically.
pub async fn create(state: &AppState, payload: CreateOrderRequest) -> AppResult<OrderWithItems> {
    payload.validate()?;

    let product_ids = distinct_ids(payload.items.iter().map(|item| item.product_id));
    let products = state.products.validate(&product_ids).await?;

    let new_order = compute_totals(&payload.items, &products)?;
    let total_amount = new_order.total_amount;
    let total_items = new_order.total_items;

    let (order, items) = state.store.create(new_order).await?;

    tracing::info!(order_id = %order.id, total_amount, total_items, "order created");

    with_product_names(order, items, &products)
}

/// List orders, optionally filtered by status, one page at a time.
pub async fn find_all(state: &AppState, payload: FindAllOrdersRequest) -> AppResult<OrderList> {
    let (status, page, limit) = payload.validated(state.default_page_limit)?;

    let total = state.store.count(status).await?;
    let data = state
        .store
        .find_many(status, page, limit)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    Ok(OrderList {
        data,
        meta: Meta::new(total, page, limit),
    })
}

/// Fetch one order with its items, enriched with product names from the
/// product service.
pub async fn find_one(state: &AppState, id: Uuid) -> AppResult<OrderWithItems> {
    let (order, items) = state
        .store
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound(id))?;

    let product_ids = distinct_ids(items.iter().map(|item| item.product_id));
    let products = state.products.validate(&product_ids).await?;

    with_product_names(order, items, &products)
}

/// Move an order to a new status. A self-transition is a no-op: the order is
/// returned unchanged and `updated_at` does not advance.
pub async fn change_status(
    state: &AppState,
    payload: ChangeOrderStatusRequest,
) -> AppResult<Order> {
    let status = payload.parsed_status()?;

    let current = find_one(state, payload.id).await?;
    if current.order.status == status {
        return Ok(current.order);
    }

    let updated = state.store.update_status(payload.id, status).await?;
    tracing::info!(order_id = %updated.id, status = %updated.status, "order status changed");

    Ok(order_from_entity(updated))
}

/// Aggregate the order totals from the lookup-resolved prices. Overflow is a
/// client error: the request describes an order outside the representable
/// range.
fn compute_totals(items: &[OrderItemRequest], products: &[Product]) -> AppResult<NewOrder> {
    let overflow = || AppError::InvalidArgument("order totals exceed the supported range".into());

    let mut total_amount: i64 = 0;
    let mut total_items: i32 = 0;
    let mut new_items = Vec::with_capacity(items.len());
    for item in items {
        let price = unit_price(products, item.product_id)?;
        let line_total = price
            .checked_mul(i64::from(item.quantity))
            .ok_or_else(overflow)?;
        total_amount = total_amount.checked_add(line_total).ok_or_else(overflow)?;
        total_items = total_items.checked_add(item.quantity).ok_or_else(overflow)?;
        new_items.push(NewOrderItem {
            product_id: item.product_id,
            quantity: item.quantity,
            price,
        });
    }

    Ok(NewOrder {
        total_amount,
        total_items,
        items: new_items,
    })
}

fn distinct_ids(ids: impl Iterator<Item = i32>) -> Vec<i32> {
    let mut ids: Vec<i32> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn unit_price(products: &[Product], product_id: i32) -> AppResult<i64> {
    products
        .iter()
        .find(|p| p.id == product_id)
        .map(|p| p.price)
        .ok_or_else(|| {
            AppError::ProductLookup(format!(
                "product {product_id} missing from lookup response"
            ))
        })
}

fn with_product_names(
    order: OrderModel,
    items: Vec<OrderItemModel>,
    products: &[Product],
) -> AppResult<OrderWithItems> {
    let items = items
        .into_iter()
        .map(|item| {
            let name = products
                .iter()
                .find(|p| p.id == item.product_id)
                .map(|p| p.name.clone())
                .ok_or_else(|| {
                    AppError::ProductLookup(format!(
                        "product {} missing from lookup response",
                        item.product_id
                    ))
                })?;
            Ok(OrderItemWithProduct {
                id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
                name,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(OrderWithItems {
        order: order_from_entity(order),
        items,
    })
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        total_amount: model.total_amount,
        total_items: model.total_items,
        status: model.status,
        paid: model.paid,
        paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderStatus;

    fn order_model() -> OrderModel {
        let now = Utc::now().into();
        OrderModel {
            id: Uuid::new_v4(),
            total_amount: 2000,
            total_items: 2,
            status: OrderStatus::Pending,
            paid: false,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn item_model(order_id: Uuid, product_id: i32) -> OrderItemModel {
        OrderItemModel {
            id: Uuid::new_v4(),
            order_id,
            product_id,
            quantity: 2,
            price: 1000,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn unit_price_resolves_from_the_lookup_response() {
        let products = vec![Product {
            id: 1,
            name: "Widget".into(),
            price: 1000,
        }];
        assert_eq!(unit_price(&products, 1).unwrap(), 1000);
        assert!(unit_price(&products, 2).is_err());
    }

    #[test]
    fn enrichment_joins_names_onto_items() {
        let order = order_model();
        let items = vec![item_model(order.id, 1)];
        let products = vec![Product {
            id: 1,
            name: "Widget".into(),
            price: 1000,
        }];

        let enriched = with_product_names(order, items, &products).unwrap();
        assert_eq!(enriched.items.len(), 1);
        assert_eq!(enriched.items[0].name, "Widget");
        assert_eq!(enriched.items[0].price, 1000);
    }

    #[test]
    fn enrichment_fails_hard_when_a_product_is_missing() {
        let order = order_model();
        let items = vec![item_model(order.id, 1), item_model(order.id, 2)];
        let products = vec![Product {
            id: 1,
            name: "Widget".into(),
            price: 1000,
        }];

        let err = with_product_names(order, items, &products).unwrap_err();
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn distinct_ids_deduplicates() {
        assert_eq!(distinct_ids([3, 1, 3, 2, 1].into_iter()), vec![1, 2, 3]);
    }

    fn line(product_id: i32, quantity: i32) -> OrderItemRequest {
        OrderItemRequest {
            product_id,
            quantity,
            price: None,
        }
    }

    #[test]
    fn totals_aggregate_resolved_prices_and_quantities() {
        let products = vec![
            Product {
                id: 1,
                name: "Widget".into(),
                price: 1000,
            },
            Product {
                id: 2,
                name: "Gadget".into(),
                price: 250,
            },
        ];

        let order = compute_totals(&[line(1, 2), line(2, 4)], &products).unwrap();
        assert_eq!(order.total_amount, 2 * 1000 + 4 * 250);
        assert_eq!(order.total_items, 6);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].price, 1000);
    }

    #[test]
    fn totals_reject_overflowing_amounts_as_invalid_argument() {
        let products = vec![Product {
            id: 1,
            name: "Widget".into(),
            price: i64::MAX / 2,
        }];

        let err = compute_totals(&[line(1, 3)], &products).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn totals_reject_overflowing_item_counts() {
        let products = vec![Product {
            id: 1,
            name: "Widget".into(),
            price: 1,
        }];

        let err =
            compute_totals(&[line(1, i32::MAX), line(1, i32::MAX)], &products).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
