use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{analytics, auth, feeding, foods, pets, weights};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(auth::router())
                .merge(pets::router())
                .merge(foods::router())
                .merge(feeding::router())
                .merge(weights::router())
                .merge(analytics::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use time::{format_description::well_known::Rfc3339, OffsetDateTime};
    use tower::ServiceExt;

    use super::*;
    use crate::{calc::ConsumptionPolicy, config::TrackingConfig};

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register(app: &Router) -> String {
        let (status, body) = call(
            app,
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({ "email": "Owner@Example.com", "password": "correct horse" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["email"], "owner@example.com");
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn register_as(app: &Router, email: &str) -> String {
        let (status, body) = call(
            app,
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({ "email": email, "password": "correct horse" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["access_token"].as_str().unwrap().to_string()
    }

    fn instant(value: &Value) -> OffsetDateTime {
        OffsetDateTime::parse(value.as_str().unwrap(), &Rfc3339).unwrap()
    }

    async fn tick() {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    async fn seed_pet_and_food(app: &Router, token: &str) -> (String, String) {
        let (status, pet) = call(
            app,
            Method::POST,
            "/api/v1/pets",
            Some(token),
            Some(json!({ "name": "Rex", "species": "dog", "target_weight": 12.5 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, food) = call(
            app,
            Method::POST,
            "/api/v1/foods",
            Some(token),
            Some(json!({ "name": "Kibble", "brand": "Acme", "calories_per_gram": 4 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        (
            pet["id"].as_str().unwrap().to_string(),
            food["id"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn health_needs_no_token() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_reject_missing_token() {
        let app = build_app(AppState::fake());
        let (status, body) = call(&app, Method::GET, "/api/v1/pets", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let app = build_app(AppState::fake());
        register(&app).await;
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({ "email": "owner@example.com", "password": "another one" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn feeding_lifecycle_with_refills() {
        let app = build_app(AppState::fake());
        let token = register(&app).await;
        let (pet_id, food_id) = seed_pet_and_food(&app, &token).await;

        let (status, feeding) = call(
            &app,
            Method::POST,
            "/api/v1/feedings",
            Some(&token),
            Some(json!({
                "pet_id": pet_id,
                "food_id": food_id,
                "amount_put_out": 100,
                "amount_not_eaten": 20,
                "amount_refilled": 10
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(feeding["actual_consumed"], 90.0);
        assert_eq!(feeding["calories_consumed"], 360.0);
        assert_eq!(feeding["pet_name"], "Rex");
        assert_eq!(feeding["food_brand"], "Acme");
        let feeding_id = feeding["id"].as_str().unwrap().to_string();

        let (status, list) = call(
            &app,
            Method::GET,
            &format!("/api/v1/feedings?pet_id={pet_id}&limit=10"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, dash) = call(&app, Method::GET, "/api/v1/dashboard", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(dash["pet_count"], 1);
        assert_eq!(dash["today"]["feedings"], 1);
        assert_eq!(dash["today"]["calories"], 360.0);
        assert_eq!(dash["pets"][0]["consumed_today"], 90.0);
        assert_eq!(dash["recent_feedings"].as_array().unwrap().len(), 1);

        let (status, stats) = call(
            &app,
            Method::GET,
            "/api/v1/analytics?days=7",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let daily = stats["daily_calories"].as_array().unwrap();
        assert_eq!(daily.len(), 7);
        assert_eq!(daily[6]["calories"], 360.0);
        assert_eq!(stats["food_distribution"][0]["food_name"], "Kibble");

        let uri = format!("/api/v1/feedings/{feeding_id}");
        let (status, _) = call(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);

        let (status, _) = call(
            &app,
            Method::DELETE,
            &format!("{uri}?confirm=true"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, list) = call(&app, Method::GET, "/api/v1/feedings", Some(&token), None).await;
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn comma_locale_text_amounts_are_accepted() {
        let app = build_app(AppState::fake());
        let token = register(&app).await;
        let (pet_id, food_id) = seed_pet_and_food(&app, &token).await;

        let (status, feeding) = call(
            &app,
            Method::POST,
            "/api/v1/feedings",
            Some(&token),
            Some(json!({
                "pet_id": pet_id,
                "food_id": food_id,
                "amount_put_out": "3,5",
                "locale": "de-DE"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(feeding["actual_consumed"], 3.5);
        assert_eq!(feeding["calories_consumed"], 14.0);

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/weights",
            Some(&token),
            Some(json!({ "pet_id": pet_id, "weight": "abc" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("weight"));
    }

    #[tokio::test]
    async fn bowl_weight_policy_uses_previous_put_out() {
        let app = build_app(AppState::fake_with(TrackingConfig {
            consumption_policy: ConsumptionPolicy::BowlWeight,
            ..Default::default()
        }));
        let token = register(&app).await;
        let (pet_id, food_id) = seed_pet_and_food(&app, &token).await;

        let mut later_id = String::new();
        for (at, put_out, expected) in [
            ("2024-05-01T07:00:00Z", 150, 0.0),
            ("2024-05-01T19:00:00Z", 40, 110.0),
        ] {
            let (status, feeding) = call(
                &app,
                Method::POST,
                "/api/v1/feedings",
                Some(&token),
                Some(json!({
                    "pet_id": pet_id,
                    "food_id": food_id,
                    "amount_put_out": put_out,
                    "fed_at": at
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(feeding["actual_consumed"], expected);
            later_id = feeding["id"].as_str().unwrap().to_string();
        }

        // The edited entry is not its own predecessor and keeps its time.
        let (status, edited) = call(
            &app,
            Method::PUT,
            &format!("/api/v1/feedings/{later_id}"),
            Some(&token),
            Some(json!({ "pet_id": pet_id, "food_id": food_id, "amount_put_out": 30 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(edited["actual_consumed"], 120.0);
        assert_eq!(edited["calories_consumed"], 480.0);
        assert_eq!(edited["fed_at"], "2024-05-01T19:00:00Z");
    }

    #[tokio::test]
    async fn updating_a_feeding_rederives_and_keeps_its_time() {
        let app = build_app(AppState::fake());
        let token = register(&app).await;
        let (pet_id, food_id) = seed_pet_and_food(&app, &token).await;

        let (_, created) = call(
            &app,
            Method::POST,
            "/api/v1/feedings",
            Some(&token),
            Some(json!({
                "pet_id": pet_id,
                "food_id": food_id,
                "amount_put_out": 100,
                "amount_not_eaten": 20,
                "amount_refilled": 10,
                "fed_at": "2024-01-01T08:00:00Z"
            })),
        )
        .await;
        assert_eq!(created["actual_consumed"], 90.0);
        let id = created["id"].as_str().unwrap();

        tick().await;
        let (status, updated) = call(
            &app,
            Method::PUT,
            &format!("/api/v1/feedings/{id}"),
            Some(&token),
            Some(json!({
                "pet_id": pet_id,
                "food_id": food_id,
                "amount_put_out": 100,
                "amount_not_eaten": 50,
                "amount_refilled": 10,
                "notes": "left half"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["actual_consumed"], 60.0);
        assert_eq!(updated["calories_consumed"], 240.0);
        assert_eq!(updated["notes"], "left half");
        assert_eq!(updated["fed_at"], "2024-01-01T08:00:00Z");
        assert!(instant(&updated["updated_at"]) > instant(&created["updated_at"]));
        assert_eq!(updated["created_at"], created["created_at"]);
    }

    #[tokio::test]
    async fn pet_food_and_weight_updates_advance_updated_at() {
        let app = build_app(AppState::fake());
        let token = register(&app).await;
        let (pet_id, food_id) = seed_pet_and_food(&app, &token).await;
        let (status, weight) = call(
            &app,
            Method::POST,
            "/api/v1/weights",
            Some(&token),
            Some(json!({ "pet_id": pet_id, "weight": 12.1, "weighed_at": "2024-02-01T09:00:00Z" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let weight_id = weight["id"].as_str().unwrap();

        tick().await;
        let (status, pet) = call(
            &app,
            Method::PUT,
            &format!("/api/v1/pets/{pet_id}"),
            Some(&token),
            Some(json!({ "name": "Rex II", "species": "dog", "target_weight": "11,5", "locale": "de" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pet["name"], "Rex II");
        assert_eq!(pet["target_weight"], 11.5);
        assert!(instant(&pet["updated_at"]) > instant(&pet["created_at"]));

        let (status, food) = call(
            &app,
            Method::PUT,
            &format!("/api/v1/foods/{food_id}"),
            Some(&token),
            Some(json!({ "name": "Kibble Lite", "calories_per_gram": 3.66666 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(food["calories_per_gram"], 3.6667);
        assert!(instant(&food["updated_at"]) > instant(&food["created_at"]));

        let (status, weight) = call(
            &app,
            Method::PUT,
            &format!("/api/v1/weights/{weight_id}"),
            Some(&token),
            Some(json!({ "pet_id": pet_id, "weight": "12,3", "locale": "de", "notes": "after walk" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(weight["weight"], 12.3);
        assert_eq!(weight["weighed_at"], "2024-02-01T09:00:00Z");
        assert!(instant(&weight["updated_at"]) > instant(&weight["created_at"]));
    }

    #[tokio::test]
    async fn updates_to_another_users_rows_are_not_found() {
        let app = build_app(AppState::fake());
        let owner = register(&app).await;
        let (pet_id, food_id) = seed_pet_and_food(&app, &owner).await;
        let (_, feeding) = call(
            &app,
            Method::POST,
            "/api/v1/feedings",
            Some(&owner),
            Some(json!({ "pet_id": pet_id, "food_id": food_id, "amount_put_out": 50 })),
        )
        .await;
        let (_, weight) = call(
            &app,
            Method::POST,
            "/api/v1/weights",
            Some(&owner),
            Some(json!({ "pet_id": pet_id, "weight": 12.0 })),
        )
        .await;

        let intruder = register_as(&app, "intruder@example.com").await;
        let attempts = [
            (
                format!("/api/v1/pets/{pet_id}"),
                json!({ "name": "Mine now", "species": "dog" }),
            ),
            (format!("/api/v1/foods/{food_id}"), json!({ "name": "Mine now" })),
            (
                format!("/api/v1/feedings/{}", feeding["id"].as_str().unwrap()),
                json!({ "pet_id": pet_id, "food_id": food_id, "amount_put_out": 1 }),
            ),
            (
                format!("/api/v1/weights/{}", weight["id"].as_str().unwrap()),
                json!({ "pet_id": pet_id, "weight": 1 }),
            ),
        ];
        for (uri, body) in attempts {
            let (status, _) = call(&app, Method::PUT, &uri, Some(&intruder), Some(body)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        }

        let (_, pet) = call(
            &app,
            Method::GET,
            &format!("/api/v1/pets/{pet_id}"),
            Some(&owner),
            None,
        )
        .await;
        assert_eq!(pet["name"], "Rex");
    }

    #[tokio::test]
    async fn values_the_columns_cannot_hold_are_rejected() {
        let app = build_app(AppState::fake());
        let token = register(&app).await;
        let (pet_id, _) = seed_pet_and_food(&app, &token).await;

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/foods",
            Some(&token),
            Some(json!({ "name": "Lard", "calories_per_gram": 12345 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/weights",
            Some(&token),
            Some(json!({ "pet_id": pet_id, "weight": 10000 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, dense) = call(
            &app,
            Method::POST,
            "/api/v1/foods",
            Some(&token),
            Some(json!({ "name": "Paste", "calories_per_gram": 9999 })),
        )
        .await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/feedings",
            Some(&token),
            Some(json!({
                "pet_id": pet_id,
                "food_id": dense["id"],
                "amount_put_out": 999999
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("calories_consumed"));

        let (_, feedings) = call(&app, Method::GET, "/api/v1/feedings", Some(&token), None).await;
        assert!(feedings.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_pet_removes_its_entries() {
        let app = build_app(AppState::fake());
        let token = register(&app).await;
        let (pet_id, food_id) = seed_pet_and_food(&app, &token).await;

        call(
            &app,
            Method::POST,
            "/api/v1/feedings",
            Some(&token),
            Some(json!({ "pet_id": pet_id, "food_id": food_id, "amount_put_out": 50 })),
        )
        .await;
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/weights",
            Some(&token),
            Some(json!({ "pet_id": pet_id, "weight": 11.8 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = call(
            &app,
            Method::DELETE,
            &format!("/api/v1/pets/{pet_id}?confirm=true"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, feedings) = call(&app, Method::GET, "/api/v1/feedings", Some(&token), None).await;
        let (_, weights) = call(&app, Method::GET, "/api/v1/weights", Some(&token), None).await;
        assert!(feedings.as_array().unwrap().is_empty());
        assert!(weights.as_array().unwrap().is_empty());

        let (status, _) = call(
            &app,
            Method::GET,
            &format!("/api/v1/pets/{pet_id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
