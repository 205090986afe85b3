use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn creating_an_existing_name_is_idempotent() {
    let app = TestApp::spawn().await;

    let first = app.create_ingredient("Tomato").await;
    let second = app.create_ingredient("Tomato").await;

    assert_eq!(first, second);
    let list = app.get(routes::INGREDIENTS).await;
    assert_eq!(list.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn ingredient_can_be_read_and_updated() {
    let app = TestApp::spawn().await;
    let id = app.create_ingredient("Tomatoe").await;

    let res = app
        .put(
            &routes::ingredient(&id),
            &json!({"name": "Tomato", "image_url": "/api/v1/images/tomato"}),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let fetched = app.get(&routes::ingredient(&id)).await;
    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.body["name"], "Tomato");
    assert_eq!(fetched.body["image_url"], "/api/v1/images/tomato");
}

#[tokio::test]
async fn updating_a_missing_ingredient_returns_404() {
    let app = TestApp::spawn().await;

    let res = app
        .put(&routes::ingredient("missing"), &json!({"name": "Salt"}))
        .await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn renaming_onto_a_taken_name_is_a_conflict() {
    let app = TestApp::spawn().await;
    app.create_ingredient("Salt").await;
    let pepper = app.create_ingredient("Pepper").await;

    let res = app
        .put(&routes::ingredient(&pepper), &json!({"name": "Salt"}))
        .await;

    assert_eq!(res.status, 409);
}

#[tokio::test]
async fn ingredient_used_by_a_recipe_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let category = app.create_category("Soups").await;
    let tomato = app.create_ingredient("Tomato").await;
    let recipe_id = app
        .create_recipe("Tomato Soup", &category, &[(&tomato, 400, "g")])
        .await;

    let res = app.delete(&routes::ingredient(&tomato)).await;
    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "CONFLICT");

    // Once the recipe stops using it, it can go.
    app.delete(&routes::recipe(&recipe_id)).await;
    let res = app.delete(&routes::ingredient(&tomato)).await;
    assert_eq!(res.status, 204);
}
