use std::io::Read;
use std::pin::Pin;

use chrono::Utc;
use futures::stream::{self, Stream};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::traits::EventStream;
use crate::domain::{Error, Order, OrderEvent, OrderStatus, PaymentMethod};

/// CSV-backed source of order state-change events.
pub struct CsvReader<R: Read> {
    reader: Option<csv::Reader<R>>,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R) -> Result<Self, Error> {
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        Ok(Self { reader: Some(rdr) })
    }
}

/// Internal shape used only for CSV deserialization.
#[derive(Debug, Deserialize)]
struct CsvRow {
    order_id: u64,
    previous_status: String,
    new_status: String,
    vendor_id: u64,
    customer_id: u64,
    total: Decimal,
    category: String,
    delivery_fee: Option<Decimal>,
    delivery_man_id: Option<u64>,
    referral_code: Option<String>,
    payment_method: Option<String>,
}

impl TryFrom<CsvRow> for OrderEvent {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        let previous_status = OrderStatus::parse(&row.previous_status)?;
        let new_status = OrderStatus::parse(&row.new_status)?;
        let payment_method = row
            .payment_method
            .as_deref()
            .map(PaymentMethod::parse)
            .unwrap_or(PaymentMethod::Other("unspecified".to_owned()));

        let order = Order {
            id: row.order_id,
            vendor_id: row.vendor_id,
            customer_id: row.customer_id,
            total: row.total,
            category: row.category,
            delivery_fee: row.delivery_fee.unwrap_or(Decimal::ZERO),
            assigned_delivery_man_id: row.delivery_man_id,
            referral_code: row.referral_code.filter(|c| !c.is_empty()),
            payment_method,
            status: new_status,
            is_processed: false,
            is_refunded: false,
        };

        Ok(OrderEvent {
            previous_status,
            new_status,
            order,
            occurred_at: Utc::now(),
        })
    }
}

impl<R: Read + Send + 'static> EventStream for CsvReader<R> {
    type EvStream = Pin<Box<dyn Stream<Item = Result<OrderEvent, Error>> + Send>>;

    fn stream(&mut self) -> Self::EvStream {
        // Take ownership of the reader so the iterator we build owns all data and is 'static.
        let reader = match self.reader.take() {
            Some(r) => r,
            None => {
                // Already consumed; return an empty stream.
                return Box::pin(stream::iter(Vec::<Result<OrderEvent, Error>>::new()));
            }
        };

        let iter = reader.into_deserialize::<CsvRow>().map(|row_res| match row_res {
            Ok(row) => OrderEvent::try_from(row),
            Err(e) => Err(Error::Ingestion(format!("CSV deserialization error: {}", e))),
        });

        Box::pin(stream::iter(iter))
    }
}
