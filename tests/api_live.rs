//! Tests that hit the live NSRDB API. Run with: cargo test --features online
#![cfg(feature = "online")]

use nsrdb::{Client, CredentialOverrides, QueryLocation};

#[test]
fn data_query_lists_datasets_for_a_point() {
    let client = Client::new().unwrap();
    let location = QueryLocation::from((-93.1567288182409, 45.15793882400205));
    let credentials = CredentialOverrides::api_key("DEMO_KEY");

    let reply = client
        .data_query(&location, None, false, &credentials)
        .unwrap();
    assert!(
        reply.get("outputs").is_some() || reply.get("errors").is_some(),
        "unexpected reply shape: {reply}"
    );
}
