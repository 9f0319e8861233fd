//! Query bindings and cache behavior against a mock backend.

#[path = "common/mod.rs"]
mod common;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use common::{envelope, page, settings};
use jiff::Timestamp;
use leadflow::api::create_api_call;
use leadflow::crm::deals::{self, DealUpdate};
use leadflow::crm::workspaces::{self, SettingsUpdate};
use leadflow::query::{EntityKind, QueryClient, QueryKey};
use leadflow::store::{FilterStore, RequestBody, SortStore};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn now() -> Timestamp {
    Timestamp::from_str("2026-03-15T12:00:00Z").unwrap()
}

fn deal(id: &str, title: &str) -> serde_json::Value {
    json!({ "id": id, "title": title, "status": 1 })
}

#[tokio::test]
async fn test_default_deals_request_sends_null_filter() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/organizations/acme/deals/query"))
        .and(body_json(json!({ "filter": null, "sort": [["created_at", "desc"]] })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(json!([deal("d1", "Renewal")]), 1)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = create_api_call(&settings(&server), "acme", Some("sales")).unwrap();
    let query = deals::deals_query(
        Arc::new(QueryClient::new()),
        api,
        FilterStore::deals_at(now(), 20),
        SortStore::default(),
    );

    let page = query.read().await.into_result().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page.content[0].title, "Renewal");
}

#[tokio::test]
async fn test_filter_change_issues_new_request_with_new_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/organizations/acme/deals/query"))
        .and(body_json(json!({ "filter": null, "sort": [["created_at", "desc"]] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([]), 0)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/organizations/acme/deals/query"))
        .and(body_json(json!({ "filter": { "limit": 20 }, "sort": [["created_at", "desc"]] })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(json!([deal("d2", "Upsell")]), 1)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = create_api_call(&settings(&server), "acme", None).unwrap();
    let filter = FilterStore::deals_at(now(), 20);
    let query = deals::deals_query(
        Arc::new(QueryClient::new()),
        api,
        filter.clone(),
        SortStore::default(),
    );

    let first_key = query.key();
    assert!(query.read().await.into_result().unwrap().is_empty());

    let mut criteria = filter.filter();
    criteria.is_filter_applied = true;
    criteria.filter_body = Some(RequestBody::with_limit(20));
    filter.set_filter(criteria);

    assert_ne!(query.key(), first_key);
    let page = query.read().await.into_result().unwrap();
    assert_eq!(page.content[0].id, "d2");

    // Both keys are now cached: reading again hits neither mock
    assert_eq!(query.read().await.into_result().unwrap().content[0].id, "d2");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_reads_of_one_key_send_one_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/organizations/acme/deals/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(json!([deal("d1", "Renewal")]), 1))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = create_api_call(&settings(&server), "acme", None).unwrap();
    let query = deals::deals_query(
        Arc::new(QueryClient::new()),
        api,
        FilterStore::deals_at(now(), 20),
        SortStore::default(),
    );

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let query = query.clone();
            tokio::spawn(async move { query.read().await.into_result() })
        })
        .collect();

    for handle in handles {
        let page = handle.await.unwrap().unwrap();
        assert_eq!(page.content[0].id, "d1");
    }
}

#[tokio::test]
async fn test_settings_update_invalidates_and_next_read_sees_new_values() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/organizations/acme/workspaces/sales/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "currency": "USD",
            "timezone": "UTC",
            "pipelineStages": ["new", "won"]
        }))))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/organizations/acme/workspaces/sales/settings"))
        .and(body_json(json!({ "currency": "EUR" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "currency": "EUR",
            "timezone": "UTC",
            "pipelineStages": ["new", "won"]
        }))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/organizations/acme/workspaces/sales/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "currency": "EUR",
            "timezone": "UTC",
            "pipelineStages": ["new", "won"]
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let client = Arc::new(QueryClient::new());
    let api = create_api_call(&settings(&server), "acme", Some("sales")).unwrap();
    let query = workspaces::settings_query(Arc::clone(&client), api.clone()).unwrap();

    let before = query.read().await.into_result().unwrap();
    assert_eq!(before.currency.as_deref(), Some("USD"));

    // Cached until something invalidates it
    assert_eq!(query.read().await.into_result().unwrap().currency.as_deref(), Some("USD"));

    let update = SettingsUpdate {
        currency: Some("EUR".to_string()),
        ..Default::default()
    };
    workspaces::update_settings(&client, &api, &update).await.unwrap();
    assert!(client.is_stale(query.key()));

    let after = query.read().await.into_result().unwrap();
    assert_eq!(after.currency.as_deref(), Some("EUR"));
}

#[tokio::test]
async fn test_failed_mutation_keeps_cached_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/organizations/acme/deals/query"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(json!([deal("d1", "Renewal")]), 1)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/organizations/acme/deals/d1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = Arc::new(QueryClient::new());
    let api = create_api_call(&settings(&server), "acme", None).unwrap();
    let query = deals::deals_query(
        Arc::clone(&client),
        api.clone(),
        FilterStore::deals_at(now(), 20),
        SortStore::default(),
    );
    query.read().await.into_result().unwrap();

    let update = DealUpdate {
        title: Some("Renamed".to_string()),
        ..Default::default()
    };
    let err = deals::update_deal(&client, &api, "d1", &update).await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    assert!(!client.is_stale(&query.key()));
    let cached = query.state().into_result().unwrap();
    assert_eq!(cached.content[0].title, "Renewal");
}

#[tokio::test]
async fn test_deal_update_invalidates_its_workspace_and_org_wide_lists() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/organizations/acme/deals/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(deal("d1", "Renamed"))))
        .expect(1)
        .mount(&server)
        .await;

    let client = QueryClient::new();
    let sales = create_api_call(&settings(&server), "acme", Some("sales")).unwrap();
    let ops = create_api_call(&settings(&server), "acme", Some("ops")).unwrap();
    let org = create_api_call(&settings(&server), "acme", None).unwrap();

    let sales_key = QueryKey::new(EntityKind::Deals, sales.scope());
    let ops_key = QueryKey::new(EntityKind::Deals, ops.scope());
    let org_key = QueryKey::new(EntityKind::Deals, org.scope());
    let settings_key = QueryKey::new(EntityKind::WorkspaceSettings, sales.scope());
    for key in [&sales_key, &ops_key, &org_key, &settings_key] {
        client
            .fetch(key, || async { Ok::<_, leadflow::LeadflowError>(json!(null)) })
            .await;
    }

    let update = DealUpdate {
        title: Some("Renamed".to_string()),
        ..Default::default()
    };
    let updated = deals::update_deal(&client, &sales, "d1", &update).await.unwrap();
    assert_eq!(updated.title, "Renamed");

    assert!(client.is_stale(&sales_key));
    assert!(client.is_stale(&org_key));
    assert!(!client.is_stale(&ops_key));
    assert!(!client.is_stale(&settings_key));
}

#[tokio::test]
async fn test_http_error_is_reported_as_error_state() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/organizations/acme/customers/query"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let api = create_api_call(&settings(&server), "acme", None).unwrap();
    let query = leadflow::crm::customers::customers_query(
        Arc::new(QueryClient::new()),
        api,
        FilterStore::customers_at(now(), 20),
        SortStore::default(),
    );

    let state = query.read().await;
    assert!(state.is_error());
    assert_eq!(state.error().and_then(|e| e.status()), Some(502));

    // The error is cached like data; no retry is attempted
    assert!(query.read().await.is_error());
}
