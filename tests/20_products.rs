mod common;

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn timestamp(v: &Value) -> DateTime<Utc> {
    v.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn create_then_retrieve_and_list() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };

    let created = app
        .create_product(&app.user.token, json!({ "name": "Comic Books", "cost": 25, "quantity": 60 }))
        .await?;
    assert_eq!(created["name"], "Comic Books");
    assert_eq!(created["cost"], 25);
    assert_eq!(created["quantity"], 60);
    assert_eq!(created["sold"], 0);
    assert_eq!(created["revenue"], 0);
    assert_eq!(created["user_id"], app.user.id.to_string());
    assert_eq!(created["date_created"], created["date_updated"]);

    let id = created["id"].as_i64().unwrap();
    let res = app
        .client
        .get(app.url(&format!("/v1/products/{id}")))
        .bearer_auth(&app.user.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, created);

    // Listing is public
    let res = app.client.get(app.url("/v1/products")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let list: Vec<Value> = res.json().await?;
    assert!(list.contains(&created));

    app.cleanup().await
}

#[tokio::test]
async fn list_returns_every_product_without_sales() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };

    for i in 1..=3 {
        app.create_product(&app.user.token, json!({ "name": i.to_string(), "cost": 1, "quantity": 1 }))
            .await?;
    }

    let list: Vec<Value> = app.client.get(app.url("/v1/products")).send().await?.json().await?;
    assert_eq!(list.len(), 3);
    for product in &list {
        assert_eq!(product["sold"], 0);
        assert_eq!(product["revenue"], 0);
    }

    app.cleanup().await
}

#[tokio::test]
async fn retrieve_missing_and_malformed_ids() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };

    let res = app
        .client
        .get(app.url("/v1/products/987654"))
        .bearer_auth(&app.user.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "product not found" }));

    let res = app
        .client
        .get(app.url("/v1/products/abc"))
        .bearer_auth(&app.user.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "ID is not in its proper form" }));

    app.cleanup().await
}

#[tokio::test]
async fn create_rejects_invalid_products() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };

    let res = app
        .client
        .post(app.url("/v1/products"))
        .bearer_auth(&app.user.token)
        .json(&json!({ "name": "Freebie", "cost": 0, "quantity": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "field validation error");
    assert!(body["fields"].get("cost").is_some());

    app.cleanup().await
}

#[tokio::test]
async fn owner_and_admin_may_update() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };

    let created = app
        .create_product(&app.user.token, json!({ "name": "Mug", "cost": 10, "quantity": 4 }))
        .await?;
    let path = format!("/v1/products/{}", created["id"]);

    // Partial update by the owner
    let res = app
        .client
        .patch(app.url(&path))
        .bearer_auth(&app.user.token)
        .json(&json!({ "cost": 40 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["cost"], 40);
    assert_eq!(updated["name"], "Mug");
    assert_eq!(updated["quantity"], 4);

    let res = app
        .client
        .get(app.url(&path))
        .bearer_auth(&app.user.token)
        .send()
        .await?;
    let stored: Value = res.json().await?;
    assert_eq!(stored["cost"], 40);
    assert_eq!(stored["date_updated"], updated["date_updated"]);
    assert!(timestamp(&stored["date_updated"]) > timestamp(&stored["date_created"]));

    // Another plain user may not
    let res = app
        .client
        .patch(app.url(&path))
        .bearer_auth(&app.other.token)
        .json(&json!({ "name": "Stolen" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "attempted action is not allowed" }));

    // An admin may
    let res = app
        .client
        .patch(app.url(&path))
        .bearer_auth(&app.admin.token)
        .json(&json!({ "quantity": 0 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["quantity"], 0);

    app.cleanup().await
}

#[tokio::test]
async fn update_rejects_bad_values_and_unknown_products() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };

    let created = app
        .create_product(&app.user.token, json!({ "name": "Lamp", "cost": 30, "quantity": 2 }))
        .await?;

    let res = app
        .client
        .patch(app.url(&format!("/v1/products/{}", created["id"])))
        .bearer_auth(&app.user.token)
        .json(&json!({ "quantity": -5 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .client
        .patch(app.url("/v1/products/987654"))
        .bearer_auth(&app.admin.token)
        .json(&json!({ "cost": 5 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    app.cleanup().await
}

#[tokio::test]
async fn admin_deletes_and_delete_is_idempotent() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };

    let created = app
        .create_product(&app.user.token, json!({ "name": "Chair", "cost": 80, "quantity": 1 }))
        .await?;
    let path = format!("/v1/products/{}", created["id"]);

    let res = app.client.delete(app.url(&path)).bearer_auth(&app.user.token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    for _ in 0..2 {
        let res = app.client.delete(app.url(&path)).bearer_auth(&app.admin.token).send().await?;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(res.bytes().await?.is_empty());
    }

    let res = app.client.get(app.url(&path)).bearer_auth(&app.admin.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    app.cleanup().await
}
