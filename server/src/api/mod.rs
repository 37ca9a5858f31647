//! HTTP API
//!
//! Thin handlers over the hosted backend. Each one authenticates the caller
//! when it needs to, resolves a [`Capability`](commander_ledger_core::Capability)
//! for the row it touches and forwards the call.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

pub mod account;
pub mod decks;
pub mod formats;
pub mod matches;
pub mod stats;
pub mod tools;

/// Routes mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/decks", get(decks::list_decks).post(decks::create_deck))
        .route("/decks/:id", get(decks::get_deck).delete(decks::delete_deck))
        .route("/matches/create", post(matches::create_match))
        .route("/matches/:id", delete(matches::delete_match))
        .route("/matches/:id/delete", post(matches::delete_match))
        .route("/formats/:id", delete(formats::delete_format))
        .route(
            "/tools/backfill-commander-colors",
            post(tools::backfill_commander_colors),
        )
        .route("/delete-user", delete(account::delete_user))
        .route("/resend-confirmation", post(account::resend_confirmation))
        .route("/profile/public-url", post(account::profile_public_url))
        .route("/stats", get(stats::stats))
        .route("/players/:id/stats", get(stats::player_stats))
        .route("/home", get(stats::home))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use rstest::rstest;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::build_router;
    use crate::config::ServerConfig;
    use crate::testing::{card, state_with, MemoryBackend, MockCards};

    struct Harness {
        backend: Arc<MemoryBackend>,
        owner: Uuid,
        admin: Uuid,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_backend(MemoryBackend::new())
        }

        fn with_backend(backend: MemoryBackend) -> Self {
            let backend = Arc::new(backend);
            let owner = backend.add_user("owner-token", "owner", json!({}));
            backend.add_user("other-token", "other", json!({ "provider": "email" }));
            let admin = backend.add_user("admin-token", "admin", json!({ "role": "admin" }));
            Self {
                backend,
                owner,
                admin,
            }
        }

        fn app(&self, config: ServerConfig) -> Router {
            self.app_with_cards(config, MockCards::new())
        }

        fn app_with_cards(&self, config: ServerConfig, cards: MockCards) -> Router {
            build_router(state_with(self.backend.clone(), cards, config))
        }
    }

    fn request(
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let harness = Harness::new();
        let (status, body) = send(
            harness.app(ServerConfig::for_testing()),
            request("GET", "/health", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_deck_delete_requires_token() {
        let harness = Harness::new();
        let deck = harness.backend.add_deck(harness.owner, "Yuriko", None);

        let (status, body) = send(
            harness.app(ServerConfig::for_testing()),
            request("DELETE", &format!("/api/decks/{}", deck.id), None, None),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "missing bearer token");
    }

    #[tokio::test]
    async fn test_deck_delete_rejects_bad_token() {
        let harness = Harness::new();
        let deck = harness.backend.add_deck(harness.owner, "Yuriko", None);

        let (status, _) = send(
            harness.app(ServerConfig::for_testing()),
            request("DELETE", &format!("/api/decks/{}", deck.id), Some("forged"), None),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_deck_delete_by_other_user_is_forbidden() {
        let harness = Harness::new();
        let deck = harness.backend.add_deck(harness.owner, "Yuriko", None);

        let (status, _) = send(
            harness.app(ServerConfig::for_testing()),
            request("DELETE", &format!("/api/decks/{}", deck.id), Some("other-token"), None),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(harness.backend.tables.lock().unwrap().decks.len(), 1);
    }

    #[tokio::test]
    async fn test_user_metadata_does_not_grant_admin() {
        let harness = Harness::new();
        let deck = harness.backend.add_deck(harness.owner, "Yuriko", None);
        harness
            .backend
            .add_user("sneaky-token", "sneaky", json!({}));
        harness
            .backend
            .tables
            .lock()
            .unwrap()
            .users
            .get_mut("sneaky-token")
            .unwrap()
            .user_metadata = json!({ "role": "admin" });

        let (status, _) = send(
            harness.app(ServerConfig::for_testing()),
            request("DELETE", &format!("/api/decks/{}", deck.id), Some("sneaky-token"), None),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_deck_delete_by_owner_and_admin() {
        let harness = Harness::new();
        let mine = harness.backend.add_deck(harness.owner, "Yuriko", None);
        let theirs = harness.backend.add_deck(Uuid::new_v4(), "Lathril", None);

        let (status, body) = send(
            harness.app(ServerConfig::for_testing()),
            request("DELETE", &format!("/api/decks/{}", mine.id), Some("owner-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], mine.id.to_string());

        let (status, _) = send(
            harness.app(ServerConfig::for_testing()),
            request("DELETE", &format!("/api/decks/{}", theirs.id), Some("admin-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let tables = harness.backend.tables.lock().unwrap();
        assert!(tables.decks.is_empty());
        // the admin delete went through the service key
        assert!(tables.service_calls > 0);
    }

    #[tokio::test]
    async fn test_missing_deck_is_not_found() {
        let harness = Harness::new();
        let (status, body) = send(
            harness.app(ServerConfig::for_testing()),
            request("GET", &format!("/api/decks/{}", Uuid::new_v4()), Some("owner-token"), None),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "deck not found");
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let harness = Harness::new();
        let (status, body) = send(
            harness.app(ServerConfig::for_testing()),
            request("GET", "/api/decks/not-a-uuid", Some("owner-token"), None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_create_deck_derives_color_code() {
        let harness = Harness::new();
        let (status, body) = send(
            harness.app(ServerConfig::for_testing()),
            request(
                "POST",
                "/api/decks",
                Some("owner-token"),
                Some(json!({
                    "name": " Niv Mizzet Wheels ",
                    "commander_name": "Niv-Mizzet, Parun",
                    "commander_colors": ["r", "U", "u"],
                })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Niv Mizzet Wheels");
        assert_eq!(body["color_code"], "UR");
        assert_eq!(body["commander_colors"], json!(["U", "R"]));
        assert_eq!(body["user_id"], harness.owner.to_string());
        assert_eq!(body["archetype"]["label"], "Izzet");
    }

    #[tokio::test]
    async fn test_list_decks_by_owner() {
        let harness = Harness::new();
        harness.backend.add_deck(harness.owner, "Ghave", Some(&["w", "b", "g"]));
        harness.backend.add_deck(harness.admin, "Omnath", None);

        let (status, body) = send(
            harness.app(ServerConfig::for_testing()),
            request(
                "GET",
                &format!("/api/decks?user_id={}", harness.owner),
                Some("owner-token"),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let decks = body.as_array().unwrap();
        assert_eq!(decks.len(), 1);
        assert_eq!(decks[0]["name"], "Ghave");
        assert_eq!(decks[0]["archetype"]["code"], "WBG");
        assert_eq!(decks[0]["archetype"]["label"], "Abzan");

        let (status, body) = send(
            harness.app(ServerConfig::for_testing()),
            request("GET", "/api/decks", Some("owner-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, _) = send(
            harness.app(ServerConfig::for_testing()),
            request("GET", "/api/decks?user_id=nope", Some("owner-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_deck_requires_name() {
        let harness = Harness::new();
        let (status, _) = send(
            harness.app(ServerConfig::for_testing()),
            request("POST", "/api/decks", Some("owner-token"), Some(json!({ "name": "  " }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_match_and_delete_it() {
        let harness = Harness::new();
        let other = Uuid::new_v4();

        let (status, body) = send(
            harness.app(ServerConfig::for_testing()),
            request(
                "POST",
                "/api/matches/create",
                Some("owner-token"),
                Some(json!({
                    "notes": "  ",
                    "participants": [
                        {
                            "user_id": harness.owner,
                            "commander_name": "Tergrid",
                            "is_winner": true,
                            "kills": 2
                        },
                        { "user_id": other, "commander_name": "Light-Paws" },
                    ]
                })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let match_id = body["match"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["participants"].as_array().unwrap().len(), 2);
        assert!(body["match"]["notes"].is_null());

        let (status, _) = send(
            harness.app(ServerConfig::for_testing()),
            request(
                "POST",
                &format!("/api/matches/{}/delete", match_id),
                Some("other-token"),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            harness.app(ServerConfig::for_testing()),
            request(
                "POST",
                &format!("/api/matches/{}/delete", match_id),
                Some("owner-token"),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let tables = harness.backend.tables.lock().unwrap();
        assert!(tables.matches.is_empty());
        assert!(tables.participants.is_empty());
    }

    #[tokio::test]
    async fn test_create_match_removed_when_participants_fail() {
        let harness = Harness::with_backend(MemoryBackend {
            fail_participant_insert: true,
            ..MemoryBackend::default()
        });

        let (status, body) = send(
            harness.app(ServerConfig::for_testing()),
            request(
                "POST",
                "/api/matches/create",
                Some("owner-token"),
                Some(json!({
                    "participants": [
                        {
                            "user_id": harness.owner,
                            "commander_name": "Tergrid",
                            "is_winner": true
                        },
                    ]
                })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal server error");

        let tables = harness.backend.tables.lock().unwrap();
        assert!(tables.matches.is_empty());
        assert!(tables.participants.is_empty());
    }

    #[tokio::test]
    async fn test_create_match_rejects_two_winners() {
        let harness = Harness::new();
        let (status, body) = send(
            harness.app(ServerConfig::for_testing()),
            request(
                "POST",
                "/api/matches/create",
                Some("owner-token"),
                Some(json!({
                    "participants": [
                        { "commander_name": "Tergrid", "is_winner": true },
                        { "commander_name": "Light-Paws", "is_winner": true },
                    ]
                })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "a match has at most one winner");
        assert!(harness.backend.tables.lock().unwrap().matches.is_empty());
    }

    #[tokio::test]
    async fn test_admin_deletes_match_via_delete_verb() {
        let harness = Harness::new();
        let row = harness.backend.add_match(harness.owner, None);

        let (status, _) = send(
            harness.app(ServerConfig::for_testing()),
            request("DELETE", &format!("/api/matches/{}", row.id), Some("admin-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_format_delete_cascades() {
        let harness = Harness::new();
        let format = harness.backend.add_format("Commander");
        let keep = harness.backend.add_format("Brawl");
        let played = harness.backend.add_match(harness.owner, Some(format.id));
        harness
            .backend
            .add_participant(played.id, harness.owner, "Tergrid", true);
        let other = harness.backend.add_match(harness.owner, Some(keep.id));

        let (status, _) = send(
            harness.app(ServerConfig::for_testing()),
            request("DELETE", &format!("/api/formats/{}", format.id), Some("owner-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            harness.app(ServerConfig::for_testing()),
            request("DELETE", &format!("/api/formats/{}", format.id), Some("admin-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matches_deleted"], 1);

        let tables = harness.backend.tables.lock().unwrap();
        assert_eq!(tables.formats.len(), 1);
        assert_eq!(tables.matches.len(), 1);
        assert_eq!(tables.matches[0].id, other.id);
        assert!(tables.participants.is_empty());
    }

    #[tokio::test]
    async fn test_backfill_disabled_without_secret() {
        let harness = Harness::new();
        let (status, _) = send(
            harness.app(ServerConfig::for_testing()),
            request("POST", "/api/tools/backfill-commander-colors", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_backfill_rejects_wrong_secret() {
        let harness = Harness::new();
        let config = ServerConfig {
            backfill_secret: Some("s3cret".to_string()),
            ..ServerConfig::for_testing()
        };

        let mut req = request("POST", "/api/tools/backfill-commander-colors", None, None);
        req.headers_mut()
            .insert("x-backfill-secret", "guess".parse().unwrap());

        let (status, _) = send(harness.app(config), req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_backfill_runs_with_secret() {
        let harness = Harness::new();
        harness.backend.add_deck(harness.owner, "Prossh", None);
        harness.backend.add_deck(harness.owner, "Krenko", Some(&["R"]));

        let mut cards = MockCards::new();
        cards
            .expect_fetch_card()
            .times(1)
            .returning(|_| Ok(card("Prossh, Skyraider of Kher", &["B", "R", "G"])));

        let config = ServerConfig {
            backfill_secret: Some("s3cret".to_string()),
            ..ServerConfig::for_testing()
        };
        let mut req = request(
            "POST",
            "/api/tools/backfill-commander-colors?concurrency=2&limit=5",
            None,
            Some(json!({ "dry_run": false })),
        );
        req.headers_mut()
            .insert("x-backfill-secret", "s3cret".parse().unwrap());

        let (status, body) = send(harness.app_with_cards(config, cards), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scanned"], 2);
        assert_eq!(body["updated"], 2);
        assert_eq!(body["limit"], 5);
        assert_eq!(body["concurrency"], 2);
        assert_eq!(body["outcomes"][0]["color_code"], "BRG");
        assert_eq!(body["outcomes"][0]["status"], "updated");
        assert_eq!(body["outcomes"][1]["source"], "stored");
    }

    fn backfill_request(uri: &str, content_type: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("x-backfill-secret", "s3cret");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn backfill_config() -> ServerConfig {
        ServerConfig {
            backfill_secret: Some("s3cret".to_string()),
            ..ServerConfig::for_testing()
        }
    }

    #[rstest]
    #[case::no_content_type(None, r#"{"dry_run": true}"#)]
    #[case::wrong_field_type(Some("application/json"), r#"{"dry_run": "yes"}"#)]
    #[case::truncated(Some("application/json"), r#"{"dry_run": true"#)]
    #[tokio::test]
    async fn test_backfill_rejects_unreadable_body(
        #[case] content_type: Option<&str>,
        #[case] body: &str,
    ) {
        let harness = Harness::new();
        harness.backend.add_deck(harness.owner, "Muldrotha", Some(&["b", "g", "u"]));

        let (status, response) = send(
            harness.app(backfill_config()),
            backfill_request("/api/tools/backfill-commander-colors", content_type, body),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["error"].is_string());
        assert!(harness.backend.tables.lock().unwrap().color_updates.is_empty());
    }

    #[rstest]
    #[case::json_body(
        "/api/tools/backfill-commander-colors",
        Some("application/json; charset=utf-8"),
        r#"{"dry_run": true}"#
    )]
    #[case::query_only("/api/tools/backfill-commander-colors?dry_run=true", None, "")]
    #[tokio::test]
    async fn test_backfill_dry_run_writes_nothing(
        #[case] uri: &str,
        #[case] content_type: Option<&str>,
        #[case] body: &str,
    ) {
        let harness = Harness::new();
        harness.backend.add_deck(harness.owner, "Muldrotha", Some(&["b", "g", "u"]));

        let (status, report) = send(
            harness.app(backfill_config()),
            backfill_request(uri, content_type, body),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["dry_run"], true);
        assert_eq!(report["updated"], 0);
        assert_eq!(report["outcomes"][0]["status"], "dry_run");
        assert!(harness.backend.tables.lock().unwrap().color_updates.is_empty());
    }

    #[tokio::test]
    async fn test_stats_leaderboard() {
        let harness = Harness::new();
        let row = harness.backend.add_match(harness.owner, None);
        harness
            .backend
            .add_participant(row.id, harness.owner, "Tergrid", true);
        harness
            .backend
            .add_participant(row.id, harness.admin, "Light-Paws", false);

        let (status, body) = send(
            harness.app(ServerConfig::for_testing()),
            request("GET", "/api/stats", None, None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["leaderboard"][0]["display_name"], "owner");
        assert_eq!(body["leaderboard"][0]["wins"], 1);
        assert_eq!(body["commanders"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stats_degrade_when_backend_fails() {
        let backend = Arc::new(MemoryBackend {
            fail_reads: true,
            ..MemoryBackend::default()
        });
        let app = build_router(state_with(backend, MockCards::new(), ServerConfig::for_testing()));

        let (status, body) = send(app, request("GET", "/api/home", None, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totals"]["matches"], 0);
        assert!(body["recent_matches"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_player_stats_for_unknown_player() {
        let harness = Harness::new();
        let (status, body) = send(
            harness.app(ServerConfig::for_testing()),
            request("GET", &format!("/api/players/{}/stats", Uuid::new_v4()), None, None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["standing"]["matches"], 0);
    }

    #[tokio::test]
    async fn test_delete_user_removes_caller() {
        let harness = Harness::new();
        let (status, _) = send(
            harness.app(ServerConfig::for_testing()),
            request("DELETE", "/api/delete-user", Some("owner-token"), None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            harness.backend.tables.lock().unwrap().deleted_users,
            vec![harness.owner]
        );
    }

    #[tokio::test]
    async fn test_resend_confirmation() {
        let harness = Harness::new();

        let (status, _) = send(
            harness.app(ServerConfig::for_testing()),
            request("POST", "/api/resend-confirmation", None, Some(json!({ "email": "nope" }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            harness.app(ServerConfig::for_testing()),
            request(
                "POST",
                "/api/resend-confirmation",
                None,
                Some(json!({ "email": " pod@example.com " })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sent"], true);
        assert_eq!(
            harness.backend.tables.lock().unwrap().resent,
            vec!["pod@example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_profile_public_url() {
        let harness = Harness::new();

        let (status, body) = send(
            harness.app(ServerConfig::for_testing()),
            request(
                "POST",
                "/api/profile/public-url",
                Some("owner-token"),
                Some(json!({ "path": format!("{}/avatar.png", harness.owner) })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let expected = format!("https://storage.test/avatars/{}/avatar.png", harness.owner);
        assert_eq!(body["public_url"], expected);

        let tables = harness.backend.tables.lock().unwrap();
        let profile = tables.profiles.iter().find(|p| p.id == harness.owner).unwrap();
        assert_eq!(profile.avatar_url.as_deref(), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn test_profile_public_url_rejects_traversal() {
        let harness = Harness::new();
        let (status, _) = send(
            harness.app(ServerConfig::for_testing()),
            request(
                "POST",
                "/api/profile/public-url",
                Some("owner-token"),
                Some(json!({ "path": "../secrets/key.pem" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
