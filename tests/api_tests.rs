use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use reelbase::api::AppState;
use reelbase::config::Config;
use reelbase::state::SharedState;
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let config = Config::default();

    let shared = SharedState::new(&config)
        .await
        .expect("Failed to create app state");
    reelbase::api::router(Arc::new(AppState::new(Arc::new(shared))))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn send(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn empty(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn sample_user(login: &str) -> serde_json::Value {
    serde_json::json!({
        "email": format!("{login}@example.com"),
        "login": login,
        "name": "",
        "birthday": "1990-05-05"
    })
}

fn sample_film(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "description": "a film",
        "release_date": "2000-01-01",
        "duration": 120,
        "mpa": 1,
        "genres": [1, 2]
    })
}

async fn create_user(app: &Router, login: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(send("POST", "/api/users", sample_user(login)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await["data"]["id"].as_i64().unwrap()
}

async fn create_film(app: &Router, name: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(send("POST", "/api/films", sample_film(name)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_system_endpoints() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/system/status"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["backend"], "memory");
    assert_eq!(body["data"]["film_count"], 0);

    let response = app
        .clone()
        .oneshot(get("/api/system/health/live"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/system/health/ready"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_user_crud() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(send("POST", "/api/users", sample_user("ada")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(id, 1);
    // Blank name falls back to the login.
    assert_eq!(body["data"]["name"], "ada");

    let response = app
        .clone()
        .oneshot(get(&format!("/api/users/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["login"], "ada");

    let updated = serde_json::json!({
        "id": id,
        "email": "ada@new.example",
        "login": "ada",
        "name": "Ada Lovelace",
        "birthday": "1990-05-05"
    });
    let response = app
        .clone()
        .oneshot(send("PUT", "/api/users", updated))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["email"], "ada@new.example");
    assert_eq!(body["data"]["name"], "Ada Lovelace");

    let response = app
        .clone()
        .oneshot(empty("DELETE", &format!("/api/users/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/users/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_validation_failures() {
    let app = spawn_app().await;

    let mut bad = sample_user("ada");
    bad["email"] = serde_json::json!("no-at-sign");
    let response = app
        .clone()
        .oneshot(send("POST", "/api/users", bad))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut bad = sample_user("ada");
    bad["login"] = serde_json::json!("with space");
    let response = app
        .clone()
        .oneshot(send("POST", "/api/users", bad))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_positive_and_unknown_ids_are_404() {
    let app = spawn_app().await;

    let response = app.clone().oneshot(get("/api/users/0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.clone().oneshot(get("/api/users/-5")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.clone().oneshot(get("/api/users/9999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.clone().oneshot(get("/api/films/0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.clone().oneshot(get("/api/films/9999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_film_crud_and_validation() {
    let app = spawn_app().await;

    let id = create_film(&app, "Alien").await;
    assert_eq!(id, 1);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/films/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["name"], "Alien");
    assert_eq!(body["data"]["mpa"], 1);

    // Blank name fails validation.
    let mut bad = sample_film(" ");
    bad["name"] = serde_json::json!("  ");
    let response = app
        .clone()
        .oneshot(send("POST", "/api/films", bad))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Pre-1895 release date fails validation.
    let mut bad = sample_film("Ancient");
    bad["release_date"] = serde_json::json!("1800-01-01");
    let response = app
        .clone()
        .oneshot(send("POST", "/api/films", bad))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown genre reference fails validation.
    let mut bad = sample_film("Ghost Genre");
    bad["genres"] = serde_json::json!([42]);
    let response = app
        .clone()
        .oneshot(send("POST", "/api/films", bad))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(empty("DELETE", &format!("/api/films/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/films/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_likes_and_popularity_ranking() {
    let app = spawn_app().await;

    let f1 = create_film(&app, "First").await;
    let f2 = create_film(&app, "Second").await;
    let f3 = create_film(&app, "Third").await;
    let u1 = create_user(&app, "u1").await;
    let u2 = create_user(&app, "u2").await;

    for (film, user) in [(f1, u1), (f1, u2), (f2, u1), (f3, u2)] {
        let response = app
            .clone()
            .oneshot(empty("PUT", &format!("/api/films/{film}/like/{user}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get("/api/films/popular?count=10"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_i64().unwrap())
        .collect();
    // f2 and f3 are tied at one like; the higher id ranks first.
    assert_eq!(ids, vec![f1, f3, f2]);

    // count=0 is rejected.
    let response = app
        .clone()
        .oneshot(get("/api/films/popular?count=0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Liking a missing film is a 404.
    let response = app
        .clone()
        .oneshot(empty("PUT", &format!("/api/films/9999/like/{u1}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Unliking restores the ranking.
    let response = app
        .clone()
        .oneshot(empty("DELETE", &format!("/api/films/{f1}/like/{u2}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_friendship_endpoints() {
    let app = spawn_app().await;

    let a = create_user(&app, "ada").await;
    let b = create_user(&app, "bob").await;
    let c = create_user(&app, "cyd").await;

    let response = app
        .clone()
        .oneshot(empty("PUT", &format!("/api/users/{a}/friends/{c}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(empty("PUT", &format!("/api/users/{b}/friends/{c}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Symmetric: c sees both a and b.
    let response = app
        .clone()
        .oneshot(get(&format!("/api/users/{c}/friends")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![a, b]);

    // Common friends of a and b is exactly c.
    let response = app
        .clone()
        .oneshot(get(&format!("/api/users/{a}/friends/common/{b}")))
        .await
        .unwrap();
    let body = json_body(response).await;
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![c]);

    // Self-friendship is a 400.
    let response = app
        .clone()
        .oneshot(empty("PUT", &format!("/api/users/{a}/friends/{a}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Befriending a missing user is a 404.
    let response = app
        .clone()
        .oneshot(empty("PUT", &format!("/api/users/{a}/friends/9999")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Removing a friendship clears both sides.
    let response = app
        .clone()
        .oneshot(empty("DELETE", &format!("/api/users/{c}/friends/{a}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/users/{a}/friends")))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_user_delete_cascades() {
    let app = spawn_app().await;

    let a = create_user(&app, "ada").await;
    let b = create_user(&app, "bob").await;
    let film = create_film(&app, "Alien").await;

    app.clone()
        .oneshot(empty("PUT", &format!("/api/users/{a}/friends/{b}")))
        .await
        .unwrap();
    app.clone()
        .oneshot(empty("PUT", &format!("/api/films/{film}/like/{a}")))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(empty("DELETE", &format!("/api/users/{a}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // b's friend set no longer mentions a.
    let response = app
        .clone()
        .oneshot(get(&format!("/api/users/{b}/friends")))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    // The film no longer carries a's like.
    let response = app
        .clone()
        .oneshot(get(&format!("/api/films/{film}")))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert!(body["data"]["likes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reference_tables() {
    let app = spawn_app().await;

    let response = app.clone().oneshot(get("/api/mpa")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["data"][0]["name"], "G");

    let response = app.clone().oneshot(get("/api/mpa/3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["name"], "PG-13");

    let response = app.clone().oneshot(get("/api/mpa/99")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.clone().oneshot(get("/api/genres")).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 6);

    let response = app.clone().oneshot(get("/api/genres/6")).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["name"], "Action");

    let response = app.clone().oneshot(get("/api/genres/0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ids_survive_deletion() {
    let app = spawn_app().await;

    let first = create_film(&app, "First").await;
    app.clone()
        .oneshot(empty("DELETE", &format!("/api/films/{first}")))
        .await
        .unwrap();

    // A deleted id is never reissued.
    let second = create_film(&app, "Second").await;
    assert!(second > first);
}
