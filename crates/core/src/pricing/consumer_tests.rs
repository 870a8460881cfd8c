//! Tests for the price sync consumer's decode/apply/drop behavior.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::mpsc;

use super::consumer::PriceSyncConsumer;
use crate::errors::{Error, Result};
use crate::lists::{Item, List, ListServiceTrait, NewItem};

/// Records the bulk price changes routed through the list service; the
/// rest of the trait is unreachable from the consumer.
#[derive(Default)]
struct RecordingListService {
    applied: Mutex<Vec<(i64, i64, Decimal)>>,
    fail_once: Mutex<bool>,
}

#[async_trait]
impl ListServiceTrait for RecordingListService {
    async fn create_list(&self, _user_id: &str, _name: &str) -> Result<List> {
        unimplemented!()
    }

    fn get_list(&self, _user_id: &str, _list_id: i64) -> Result<List> {
        unimplemented!()
    }

    fn get_lists(&self, _user_id: &str) -> Result<Vec<List>> {
        unimplemented!()
    }

    async fn finalize_list(&self, _user_id: &str, _list_id: i64) -> Result<List> {
        unimplemented!()
    }

    async fn cancel_list(&self, _user_id: &str, _list_id: i64) -> Result<List> {
        unimplemented!()
    }

    async fn add_item(&self, _user_id: &str, _new_item: NewItem) -> Result<Item> {
        unimplemented!()
    }

    async fn remove_item(&self, _user_id: &str, _item_id: i64) -> Result<()> {
        unimplemented!()
    }

    async fn set_item_purchased(
        &self,
        _user_id: &str,
        _item_id: i64,
        _purchased: bool,
    ) -> Result<Item> {
        unimplemented!()
    }

    async fn apply_price_change(
        &self,
        product_id: i64,
        market_id: i64,
        new_price: Decimal,
    ) -> Result<usize> {
        let mut fail_once = self.fail_once.lock().unwrap();
        if *fail_once {
            *fail_once = false;
            return Err(Error::Unexpected("store unavailable".to_string()));
        }
        self.applied
            .lock()
            .unwrap()
            .push((product_id, market_id, new_price));
        Ok(1)
    }
}

fn event_payload(product_id: i64, market_id: i64, unit_price: &str) -> String {
    format!(
        r#"{{
            "id": 1,
            "user_id": "feed",
            "market_product": {{
                "id": 10,
                "product_id": {product_id},
                "market_id": {market_id},
                "unit_price": {unit_price},
                "confidence_level": 3,
                "created_at": "2026-01-10T08:00:00Z",
                "modified_at": "2026-01-11T08:00:00Z",
                "deleted_at": null
            }}
        }}"#
    )
}

async fn drain(service: Arc<RecordingListService>, payloads: Vec<String>) {
    let consumer = PriceSyncConsumer::new(service);
    let (tx, rx) = mpsc::channel(16);
    let handle = tokio::spawn(consumer.run(rx));
    for payload in payloads {
        tx.send(payload).await.unwrap();
    }
    drop(tx);
    // The loop must terminate once the channel closes.
    handle.await.unwrap();
}

#[tokio::test]
async fn applies_events_in_arrival_order() {
    let service = Arc::new(RecordingListService::default());
    drain(
        service.clone(),
        vec![
            event_payload(42, 7, "4.00"),
            event_payload(42, 7, "3.75"),
            event_payload(99, 2, "1.10"),
        ],
    )
    .await;

    assert_eq!(
        *service.applied.lock().unwrap(),
        vec![
            (42, 7, dec!(4.00)),
            (42, 7, dec!(3.75)),
            (99, 2, dec!(1.10)),
        ]
    );
}

#[tokio::test]
async fn undecodable_events_are_dropped() {
    let service = Arc::new(RecordingListService::default());
    drain(
        service.clone(),
        vec![
            "not json at all".to_string(),
            r#"{"market_product": {"product_id": 1}}"#.to_string(),
            event_payload(42, 7, "4.00"),
        ],
    )
    .await;

    assert_eq!(*service.applied.lock().unwrap(), vec![(42, 7, dec!(4.00))]);
}

#[tokio::test]
async fn apply_failures_do_not_stop_the_loop() {
    let service = Arc::new(RecordingListService::default());
    *service.fail_once.lock().unwrap() = true;
    drain(
        service.clone(),
        vec![event_payload(42, 7, "4.00"), event_payload(42, 7, "4.25")],
    )
    .await;

    // The first event is dropped, not retried; the second still applies.
    assert_eq!(*service.applied.lock().unwrap(), vec![(42, 7, dec!(4.25))]);
}

#[tokio::test]
async fn provenance_fields_are_optional() {
    let service = Arc::new(RecordingListService::default());
    let bare = r#"{"market_product": {"product_id": 5, "market_id": 6, "unit_price": 2.5}}"#;
    drain(service.clone(), vec![bare.to_string()]).await;

    assert_eq!(*service.applied.lock().unwrap(), vec![(5, 6, dec!(2.5))]);
}
