mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{encode_query_value, token, TestApp, ALL_SCOPES};
use serde_json::json;
use standups_api::database::keys::{update_sort_key, Parent};
use standups_api::database::models::{now, TranscodingStatus, Update};

async fn create_standup(app: &TestApp, token: &str, name: &str) -> Result<String> {
    let res = app.post("/standups", token, &json!({ "name": name }).to_string()).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    Ok(res.body["id"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn create_standup_makes_the_creator_a_member() -> Result<()> {
    let app = TestApp::new();
    let token = token("user|1", "w1", ALL_SCOPES);

    let res = app.post("/standups", &token, r#"{"name":"Daily standup"}"#).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["createdBy"], "user|1");
    assert_eq!(res.body["isPrivate"], true);
    let id = res.body["id"].as_str().unwrap();

    let standup = app.get(&format!("/standups/{}", id), &token).await?;
    assert_eq!(standup.status, StatusCode::OK);
    assert_eq!(standup.body, res.body);

    let members = app.get(&format!("/standups/{}/members", id), &token).await?;
    assert_eq!(members.status, StatusCode::OK);
    let items = members.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["userId"], "user|1");
    assert_eq!(items[0]["standupId"], id);
    Ok(())
}

#[tokio::test]
async fn create_standup_validates_the_body() -> Result<()> {
    let app = TestApp::new();
    let token = token("user|1", "w1", ALL_SCOPES);

    let res = app.post("/standups", &token, r#"{"name":""}"#).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["details"], json!(["\"name\" is not allowed to be empty"]));

    let res = app.post("/standups", &token, r#""Daily standup""#).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["details"], json!(["\"value\" must be of type object"]));
    Ok(())
}

#[tokio::test]
async fn get_standups_lists_only_the_callers_memberships() -> Result<()> {
    let app = TestApp::new();
    let alice = token("alice", "w1", ALL_SCOPES);
    let bob = token("bob", "w1", ALL_SCOPES);

    let first = create_standup(&app, &alice, "Morning").await?;
    let second = create_standup(&app, &alice, "Evening").await?;
    create_standup(&app, &bob, "Bob's").await?;

    let page = app.get("/standups?limit=1", &alice).await?;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body["items"].as_array().unwrap().len(), 1);
    let next = page.body["cursor"]["next"].as_str().unwrap().to_string();

    let rest = app
        .get(&format!("/standups?limit=1&cursor={}", encode_query_value(&next)), &alice)
        .await?;
    assert_eq!(rest.body["items"].as_array().unwrap().len(), 1);
    assert_eq!(rest.body["cursor"]["next"], serde_json::Value::Null);

    let mut ids = vec![
        page.body["items"][0]["standupId"].as_str().unwrap().to_string(),
        rest.body["items"][0]["standupId"].as_str().unwrap().to_string(),
    ];
    ids.sort();
    let mut expected = vec![first, second];
    expected.sort();
    assert_eq!(ids, expected);
    Ok(())
}

#[tokio::test]
async fn non_members_get_not_found() -> Result<()> {
    let app = TestApp::new();
    let alice = token("alice", "w1", ALL_SCOPES);
    let bob = token("bob", "w1", ALL_SCOPES);
    let id = create_standup(&app, &alice, "Private").await?;

    let not_found = json!({
        "message": "Not Found",
        "details": "You might not have access to this standup, or it doesn't exist."
    });
    for uri in [
        format!("/standups/{}", id),
        format!("/standups/{}/members", id),
        format!("/standups/{}/updates?date=2020-01-28", id),
        "/standups/missing".to_string(),
    ] {
        let res = app.get(&uri, &bob).await?;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(res.body, not_found);
    }
    Ok(())
}

#[tokio::test]
async fn updates_are_listed_for_one_date() -> Result<()> {
    let app = TestApp::new();
    let token = token("alice", "w1", ALL_SCOPES);
    let id = create_standup(&app, &token, "Daily").await?;

    let parent = Parent::standup("w1", &id);
    for (date, update_id) in [("2020-01-28", "u-1"), ("2020-01-28", "u-2"), ("2020-01-29", "u-3")] {
        let ts = now();
        let update = Update {
            id: update_id.to_string(),
            created_by: "alice".to_string(),
            created_at: ts,
            updated_at: ts,
            name: format!("Update {}", update_id),
            transcoded_file_key: None,
            transcoding_status: TranscodingStatus::Processing,
        };
        app.storage
            .insert(parent.child(update_sort_key(date, "alice", update_id)), update)
            .await?;
    }

    let res = app.get(&format!("/standups/{}/updates?date=2020-01-28", id), &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["date"], "2020-01-28");
    let ids: Vec<_> = res.body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["u-1", "u-2"]);
    assert_eq!(res.body["items"][0]["transcodingStatus"], "processing");

    let res = app.get(&format!("/standups/{}/updates?date=2020-02-01", id), &token).await?;
    assert_eq!(res.body, json!({ "date": "2020-02-01", "items": [] }));
    Ok(())
}

#[tokio::test]
async fn updates_require_a_valid_date() -> Result<()> {
    let app = TestApp::new();
    let token = token("alice", "w1", ALL_SCOPES);
    let id = create_standup(&app, &token, "Daily").await?;

    for query in [
        "",
        "?date=28-01-2020",
        "?date=2020-1-28",
        "?date=2020-02-30",
        "?date=2020-01-01&date=2020-01-02",
    ] {
        let res = app.get(&format!("/standups/{}/updates{}", id, query), &token).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", query);
        assert_eq!(
            res.body,
            json!({
                "message": "Invalid Date Format",
                "details": "The valid date format is \"YYYY-MM-DD\", for example \"2020-01-28\""
            })
        );
    }
    Ok(())
}

#[tokio::test]
async fn rejected_dates_are_reported() -> Result<()> {
    let app = TestApp::new();
    let token = token("alice", "w1", ALL_SCOPES);
    let id = create_standup(&app, &token, "Daily").await?;

    let res = app
        .get(&format!("/standups/{}/updates?date=2020-01-01&date=2020-01-02", id), &token)
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.reporter.captured(), vec!["Invalid Date Format"]);
    Ok(())
}
