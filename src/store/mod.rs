use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    models::OrderStatus,
};

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i32,
    pub quantity: i32,
    pub price: i64,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub total_amount: i64,
    pub total_items: i32,
    pub items: Vec<NewOrderItem>,
}

/// Durable persistence for orders and their line items. Holds the database
/// connection; constructed once at startup and injected into the service
/// layer.
#[derive(Clone)]
pub struct OrderStore {
    conn: DatabaseConnection,
}

impl OrderStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert an order together with all of its items in one transaction.
    pub async fn create(
        &self,
        new: NewOrder,
    ) -> Result<(OrderModel, Vec<OrderItemModel>), DbErr> {
        let txn = self.conn.begin().await?;

        let order = OrderActive {
            id: Set(Uuid::new_v4()),
            total_amount: Set(new.total_amount),
            total_items: Set(new.total_items),
            status: Set(OrderStatus::Pending),
            paid: Set(false),
            paid_at: Set(None),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(new.items.len());
        for item in new.items {
            let item = OrderItemActive {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                price: Set(item.price),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;
            items.push(item);
        }

        txn.commit().await?;

        Ok((order, items))
    }

    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<(OrderModel, Vec<OrderItemModel>)>, DbErr> {
        let order = Orders::find_by_id(id).one(&self.conn).await?;
        let order = match order {
            Some(o) => o,
            None => return Ok(None),
        };

        let items = OrderItems::find()
            .filter(OrderItemCol::OrderId.eq(order.id))
            .order_by_asc(OrderItemCol::CreatedAt)
            .all(&self.conn)
            .await?;

        Ok(Some((order, items)))
    }

    /// Fetch one page of orders. Ordered by creation time with the id as a
    /// tie-break so pagination stays stable across calls.
    pub async fn find_many(
        &self,
        status: Option<OrderStatus>,
        page: u64,
        limit: u64,
    ) -> Result<Vec<OrderModel>, DbErr> {
        let mut finder = Orders::find();
        if let Some(status) = status {
            finder = finder.filter(OrderCol::Status.eq(status));
        }

        finder
            .order_by_asc(OrderCol::CreatedAt)
            .order_by_asc(OrderCol::Id)
            .offset(page_offset(page, limit))
            .limit(limit)
            .all(&self.conn)
            .await
    }

    pub async fn count(&self, status: Option<OrderStatus>) -> Result<u64, DbErr> {
        let mut finder = Orders::find();
        if let Some(status) = status {
            finder = finder.filter(OrderCol::Status.eq(status));
        }
        finder.count(&self.conn).await
    }

    /// Update only the status column; `updated_at` is bumped here, the other
    /// columns are left untouched.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderModel, DbErr> {
        OrderActive {
            id: Set(id),
            status: Set(status),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .update(&self.conn)
        .await
    }
}

/// Row offset for a page window. Saturates instead of overflowing on extreme
/// page numbers, which lands the window past the last row (an empty page).
fn page_offset(page: u64, limit: u64) -> u64 {
    (page - 1).saturating_mul(limit)
}
