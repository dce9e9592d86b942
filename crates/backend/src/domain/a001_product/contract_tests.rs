//! Общие проверки поведения для всех реализаций `ProductStore`.

use contracts::domain::a001_product::aggregate::{
    Product, ProductCreationPayload, ProductId, ProductUpdatePayload,
};
use std::sync::Arc;

use super::store::{ProductStore, StoreError};

pub fn widget() -> Product {
    Product::new_for_insert(&ProductCreationPayload {
        name: "Widget".into(),
        price: 9.99,
        quantity: 3,
        discount: 0.0,
        description: String::new(),
    })
}

fn with_quantity(quantity: i64) -> Product {
    let mut product = widget();
    product.quantity = quantity;
    product
}

pub async fn create_and_retrieve(store: &dyn ProductStore) {
    let created = store.create(&widget()).await.unwrap();

    assert!(!created.id.is_unassigned());
    assert_eq!(created.name, "Widget");
    assert_eq!(created.quantity, 3);
    assert_eq!(created.price, 9.99);
    assert_eq!(created.created_at, created.last_updated);

    let fetched = store.retrieve(created.id).await.unwrap();
    assert_eq!(fetched, created);

    let second = store.create(&widget()).await.unwrap();
    assert_ne!(second.id, created.id);
}

pub async fn retrieve_missing(store: &dyn ProductStore) {
    let err = store.retrieve(ProductId(404)).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(ProductId(404))));
}

pub async fn retrieve_all_empty(store: &dyn ProductStore) {
    let products = store.retrieve_all(1, 10).await.unwrap();
    assert!(products.is_empty());
    assert_eq!(serde_json::to_string(&products).unwrap(), "[]");
}

pub async fn retrieve_all_pages(store: &dyn ProductStore) {
    let mut ids = Vec::new();
    for i in 0..5 {
        let created = store.create(&with_quantity(i)).await.unwrap();
        ids.push(created.id);
    }

    let first: Vec<ProductId> = store
        .retrieve_all(1, 2)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    let third: Vec<ProductId> = store
        .retrieve_all(3, 2)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(first, ids[0..2].to_vec());
    assert_eq!(third, ids[4..5].to_vec());

    // page < 1 и limit < 1 приводятся к 1 и 10
    assert_eq!(store.retrieve_all(0, 0).await.unwrap().len(), 5);
    assert!(store.retrieve_all(4, 2).await.unwrap().is_empty());
}

pub async fn retrieve_all_huge_page(store: &dyn ProductStore) {
    store.create(&widget()).await.unwrap();

    assert!(store.retrieve_all(i64::MAX, i64::MAX).await.unwrap().is_empty());
    assert!(store.retrieve_all(2, i64::MAX).await.unwrap().is_empty());
    assert_eq!(store.retrieve_all(1, i64::MAX).await.unwrap().len(), 1);
}

pub async fn update_sets_requested_quantity(store: &dyn ProductStore) {
    let created = store.create(&with_quantity(10)).await.unwrap();

    let mut product = created.clone();
    let patch = ProductUpdatePayload {
        quantity: Some(15),
        name: Some("Renamed".into()),
        ..ProductUpdatePayload::for_id(created.id)
    };
    let delta = product.apply_update(&patch);
    assert_eq!(delta, 5);

    let updated = store.update(&product, delta).await.unwrap();
    assert_eq!(updated.quantity, 15);
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.last_updated, product.last_updated);
    assert_eq!(store.retrieve(created.id).await.unwrap(), updated);
}

pub async fn update_rejects_negative_inventory(store: &dyn ProductStore) {
    let created = store.create(&with_quantity(5)).await.unwrap();

    let mut product = created.clone();
    product.name = "Should not persist".into();
    let err = store.update(&product, -6).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict { delta: -6, .. }));

    let stored = store.retrieve(created.id).await.unwrap();
    assert_eq!(stored, created);

    // ровно до нуля можно
    let drained = store.update(&created, -5).await.unwrap();
    assert_eq!(drained.quantity, 0);
}

pub async fn update_rejects_quantity_overflow(store: &dyn ProductStore) {
    let created = store.create(&with_quantity(i64::MAX)).await.unwrap();

    let err = store.update(&created, 5).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict { delta: 5, .. }));
    assert_eq!(store.retrieve(created.id).await.unwrap(), created);

    let lowered = store.update(&created, -5).await.unwrap();
    assert_eq!(lowered.quantity, i64::MAX - 5);
    assert_eq!(store.update(&created, 5).await.unwrap().quantity, i64::MAX);
}

pub async fn update_missing_is_conflict(store: &dyn ProductStore) {
    let mut product = widget();
    product.id = ProductId(999);

    let err = store.update(&product, 0).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict { id: ProductId(999), .. }));
}

pub async fn concurrent_deltas(store: Arc<dyn ProductStore>) {
    let created = store.create(&with_quantity(20)).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = store.clone();
        let product = created.clone();
        let delta = if i % 2 == 0 { 3 } else { -2 };
        handles.push(tokio::spawn(async move {
            store.update(&product, delta).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = store.retrieve(created.id).await.unwrap();
    assert_eq!(stored.quantity, 20 + 10 * 3 - 10 * 2);
}

pub async fn quantity_never_negative(store: &dyn ProductStore) {
    let created = store.create(&with_quantity(4)).await.unwrap();
    let mut expected = 4;

    for delta in [-3, -2, 5, -6, -1, 2, -2, -3] {
        match store.update(&created, delta).await {
            Ok(updated) => {
                expected += delta;
                assert_eq!(updated.quantity, expected);
            }
            Err(StoreError::Conflict { .. }) => assert!(expected + delta < 0),
            Err(e) => panic!("unexpected error: {e}"),
        }
        let stored = store.retrieve(created.id).await.unwrap();
        assert!(stored.quantity >= 0);
        assert_eq!(stored.quantity, expected);
    }
}

pub async fn delete_then_missing(store: &dyn ProductStore) {
    let created = store.create(&widget()).await.unwrap();

    store.delete(created.id).await.unwrap();

    assert!(matches!(
        store.retrieve(created.id).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.delete(created.id).await,
        Err(StoreError::NotFound(_))
    ));
}
