//! Shared fixtures for unit tests.

use rust_decimal::Decimal;

use crate::domain::{Account, Order, OrderStatus, PaymentMethod};

pub const VENDOR_ID: u64 = 100;
pub const CUSTOMER_ID: u64 = 200;

pub fn product_order(id: u64, total: i64, category: &str) -> Order {
    Order {
        id,
        vendor_id: VENDOR_ID,
        customer_id: CUSTOMER_ID,
        total: Decimal::from(total),
        category: category.to_owned(),
        delivery_fee: Decimal::ZERO,
        assigned_delivery_man_id: None,
        referral_code: None,
        payment_method: PaymentMethod::Wallet,
        status: OrderStatus::Delivered,
        is_processed: false,
        is_refunded: false,
    }
}

pub fn ride_order(id: u64, total: i64) -> Order {
    let mut order = product_order(id, total, "ride");
    order.status = OrderStatus::RideCompleted;
    order.delivery_fee = Decimal::ZERO;
    order
}

pub fn vendor(id: u64) -> Account {
    let mut account = Account::new(id);
    account.is_vendor = true;
    account
}

pub fn reseller(id: u64) -> Account {
    let mut account = Account::new(id);
    account.is_reseller = true;
    account
}
