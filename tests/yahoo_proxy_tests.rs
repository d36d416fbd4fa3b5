// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Yahoo Fantasy proxy routes against a mocked Yahoo API.

use axum::{body::Body, http::StatusCode};
use fantasy_sports_api::config::Config;
use fantasy_sports_api::db;
use fantasy_sports_api::error::AppError;
use fantasy_sports_api::models::Position;
use fantasy_sports_api::AppState;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

mod common;
use common::{authed_request, body_json, create_test_app_with_config, link_yahoo, register_and_login};

const LEAGUES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<fantasy_content xmlns="http://fantasysports.yahooapis.com/fantasy/v2/base.rng">
  <users count="1"><user><games count="1"><game>
    <game_key>423</game_key><code>nfl</code>
    <leagues count="1"><league>
      <league_key>423.l.12345</league_key>
      <league_id>12345</league_id>
      <name>Sunday Funday</name>
      <url>https://football.fantasysports.yahoo.com/f1/12345</url>
      <num_teams>10</num_teams>
      <season>2023</season>
      <settings><stat_modifiers><stats>
        <stat><stat_id>11</stat_id><value>1</value></stat>
      </stats></stat_modifiers></settings>
    </league></leagues>
  </game></games></user></users>
</fantasy_content>"#;

const WAIVER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<fantasy_content xmlns="http://fantasysports.yahooapis.com/fantasy/v2/base.rng">
  <league><league_key>423.l.12345</league_key><players count="1">
    <player>
      <player_key>423.p.33393</player_key>
      <player_id>33393</player_id>
      <name><full>Puka Nacua</full></name>
      <editorial_team_abbr>LAR</editorial_team_abbr>
      <display_position>WR</display_position>
      <headshot><url>https://s.yimg.com/nacua.png</url></headshot>
      <eligible_positions><position>WR</position></eligible_positions>
      <percent_owned><value>12</value></percent_owned>
    </player>
  </players></league>
</fantasy_content>"#;

const TEAMS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<fantasy_content xmlns="http://fantasysports.yahooapis.com/fantasy/v2/base.rng">
  <users><user><games><game><teams>
    <team><team_key>423.l.777.t.2</team_key><name>Elsewhere</name></team>
    <team><team_key>423.l.12345.t.3</team_key><name>Gridiron Gurus</name></team>
  </teams></game></games></user></users>
</fantasy_content>"#;

const ROSTER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<fantasy_content xmlns="http://fantasysports.yahooapis.com/fantasy/v2/base.rng">
  <team>
    <team_key>423.l.12345.t.3</team_key><name>Gridiron Gurus</name>
    <roster><players>
      <player>
        <player_key>423.p.30977</player_key><player_id>30977</player_id>
        <name><full>Josh Allen</full></name>
        <editorial_team_abbr>Buf</editorial_team_abbr>
        <display_position>QB</display_position>
        <selected_position><position>QB</position></selected_position>
      </player>
      <player>
        <player_key>423.p.99999</player_key><player_id>99999</player_id>
        <name><full>Unknown Rookie</full></name>
        <display_position>RB</display_position>
        <selected_position><position>BN</position></selected_position>
      </player>
    </players></roster>
  </team>
</fantasy_content>"#;

const SETTINGS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<fantasy_content xmlns="http://fantasysports.yahooapis.com/fantasy/v2/base.rng">
  <league>
    <league_key>423.l.12345</league_key><league_id>12345</league_id>
    <name>Sunday Funday</name><season>2023</season>
    <settings><stat_modifiers><stats>
      <stat><stat_id>11</stat_id><value>0.5</value></stat>
    </stats></stat_modifiers></settings>
  </league>
</fantasy_content>"#;

struct Fixture {
    app: axum::Router,
    state: Arc<AppState>,
    server: MockServer,
    user_id: i64,
    cookie: String,
}

/// A logged-in user with a linked Yahoo account and a fresh access token.
async fn linked_user() -> Fixture {
    let server = MockServer::start().await;
    let mut config = Config::test_default();
    config.yahoo_api_base_url = server.uri();
    config.yahoo_oauth_base_url = server.uri();
    let (app, state) = create_test_app_with_config(config).await;
    let (user_id, cookie) = register_and_login(&app, "owner@example.com").await;
    link_yahoo(&state, user_id, "access-1", "refresh-1", 3600).await;

    Fixture {
        app,
        state,
        server,
        user_id,
        cookie,
    }
}

fn xml(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/xml")
        .set_body_string(body)
}

impl Fixture {
    async fn get(&self, uri: &str) -> axum::response::Response {
        self.app
            .clone()
            .oneshot(authed_request("GET", uri, &self.cookie, Body::empty()))
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_leagues_are_returned_and_stored() {
    let f = linked_user().await;
    Mock::given(method("GET"))
        .and(path("/users;use_login=1/games;game_keys=nfl/leagues;out=settings"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(xml(LEAGUES_XML))
        .expect(1)
        .mount(&f.server)
        .await;

    let response = f.get("/api/v1/yahoo/leagues").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let leagues = body["leagues"].as_array().unwrap();
    assert_eq!(leagues.len(), 1);
    assert_eq!(leagues[0]["league_key"], "423.l.12345");
    assert_eq!(leagues[0]["name"], "Sunday Funday");
    assert_eq!(leagues[0]["season"], 2023);

    let stored = db::leagues::get_by_key(f.state.db.pool(), "423.l.12345")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Sunday Funday");
    assert_eq!(stored.owner_id, Some(f.user_id));
}

#[tokio::test]
async fn test_waiver_wire_defaults_to_waivers() {
    let f = linked_user().await;
    Mock::given(method("GET"))
        .and(path("/league/423.l.12345/players;status=W/stats"))
        .respond_with(xml(WAIVER_XML))
        .expect(1)
        .mount(&f.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/league/423.l.12345/players;status=FA/stats"))
        .respond_with(xml(WAIVER_XML))
        .expect(1)
        .mount(&f.server)
        .await;

    let response = f.get("/api/v1/yahoo/leagues/423.l.12345/waiver-wire").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["full_name"], "Puka Nacua");
    assert_eq!(body[0]["percent_owned"], 12);
    assert_eq!(body[0]["image_url"], "https://s.yimg.com/nacua.png");

    let response = f
        .get("/api/v1/yahoo/leagues/423.l.12345/waiver-wire?status=fa")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_waiver_wire_rejects_bad_input() {
    let f = linked_user().await;

    let response = f
        .get("/api/v1/yahoo/leagues/423.l.12345/waiver-wire?status=T")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = f.get("/api/v1/yahoo/leagues/not-a-league/waiver-wire").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_roster_links_local_players() {
    let f = linked_user().await;
    let allen = db::players::insert(f.state.db.pool(), "Josh Allen", Position::QB, Some("BUF"))
        .await
        .unwrap();
    db::players::fill_yahoo_id(f.state.db.pool(), allen, "30977")
        .await
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/users;use_login=1/games;game_keys=nfl/teams"))
        .respond_with(xml(TEAMS_XML))
        .mount(&f.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/team/423.l.12345.t.3/roster/players"))
        .respond_with(xml(ROSTER_XML))
        .mount(&f.server)
        .await;
    // League not seen before, so its settings are fetched once
    Mock::given(method("GET"))
        .and(path("/league/423.l.12345/settings"))
        .respond_with(xml(SETTINGS_XML))
        .expect(1)
        .mount(&f.server)
        .await;

    let response = f.get("/api/v1/yahoo/leagues/423.l.12345/roster").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["team_key"], "423.l.12345.t.3");
    assert_eq!(body["team_name"], "Gridiron Gurus");
    let players = body["players"].as_array().unwrap();
    assert_eq!(players.len(), 2);
    assert_eq!(players[0]["local_player_id"], allen);
    assert_eq!(players[0]["selected_position"], "QB");
    assert!(players[1]["local_player_id"].is_null());

    // Second fetch finds the stored league and replaces the roster
    let response = f.get("/api/v1/yahoo/leagues/423.l.12345/roster").await;
    assert_eq!(response.status(), StatusCode::OK);

    let league = db::leagues::get_by_key(f.state.db.pool(), "423.l.12345")
        .await
        .unwrap()
        .unwrap();
    let team = db::leagues::upsert_team(
        f.state.db.pool(),
        league.id,
        "423.l.12345.t.3",
        "Gridiron Gurus",
    )
    .await
    .unwrap();
    let roster = db::leagues::roster_player_ids(f.state.db.pool(), team.id)
        .await
        .unwrap();
    assert_eq!(roster, vec![allen]);
}

#[tokio::test]
async fn test_roster_for_foreign_league_is_not_found() {
    let f = linked_user().await;
    Mock::given(method("GET"))
        .and(path("/users;use_login=1/games;game_keys=nfl/teams"))
        .respond_with(xml(TEAMS_XML))
        .mount(&f.server)
        .await;

    let response = f.get("/api/v1/yahoo/leagues/423.l.555/roster").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["details"], "League not found");
}

#[tokio::test]
async fn test_unlinked_user_gets_yahoo_not_linked() {
    let f = linked_user().await;
    f.state.yahoo_service.unlink(f.user_id).await.unwrap();

    let response = f.get("/api/v1/yahoo/leagues").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "yahoo_not_linked");
}

#[tokio::test]
async fn test_rate_limit_is_bad_gateway() {
    let f = linked_user().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&f.server)
        .await;

    let response = f.get("/api/v1/yahoo/leagues").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["details"], AppError::YAHOO_RATE_LIMIT);
}

#[tokio::test]
async fn test_malformed_xml_is_bad_gateway() {
    let f = linked_user().await;
    Mock::given(method("GET"))
        .respond_with(xml("<fantasy_content><leagues>"))
        .mount(&f.server)
        .await;

    let response = f.get("/api/v1/yahoo/leagues").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error"], "upstream_parse_error");
}

#[tokio::test]
async fn test_rejected_token_drops_cache() {
    let f = linked_user().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&f.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users;use_login=1/games;game_keys=nfl/leagues;out=settings"))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(xml(LEAGUES_XML))
        .expect(1)
        .mount(&f.server)
        .await;

    let response = f.get("/api/v1/yahoo/leagues").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        body_json(response).await["details"],
        AppError::YAHOO_TOKEN_REJECTED
    );

    // A re-link stores a new token; the next call must not reuse the old one
    link_yahoo(&f.state, f.user_id, "access-2", "refresh-2", 3600).await;
    let response = f.get("/api/v1/yahoo/leagues").await;
    assert_eq!(response.status(), StatusCode::OK);
}
