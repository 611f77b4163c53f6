//! Intent dispatch
//!
//! State-free request/response mapping. The only session state is the
//! should-end flag on each response; the top-level entry point converts
//! every error into a fixed apology so the caller always gets a
//! well-formed reply.

pub mod handlers;
pub mod matching;
pub mod watering;

use crate::api::GardenClient;
use crate::auth::{resolver, AuthError, TokenStore};
use crate::config::Credentials;
use crate::event::{Request, SkillEvent};
use crate::response::SkillResponse;

/// Everything a handler needs for one invocation. Built once in `main`
/// and passed by reference; nothing here is ambient.
pub struct SkillContext<'a> {
    pub client: &'a GardenClient,
    pub store: &'a dyn TokenStore,
    pub creds: Option<&'a Credentials>,
    pub fallback_token: Option<&'a str>,
}

impl SkillContext<'_> {
    pub(crate) async fn resolve_token(
        &self,
        event: &SkillEvent,
    ) -> Result<Option<String>, AuthError> {
        resolver::resolve_access_token(
            event.access_token(),
            event.user_id(),
            self.store,
            self.creds,
            self.fallback_token,
        )
        .await
    }
}

/// Entry point: dispatch the event and never fail.
pub async fn handle_event(ctx: &SkillContext<'_>, event: &SkillEvent) -> SkillResponse {
    match dispatch(ctx, event).await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::error!("Unhandled error during dispatch: {:#}", e);
            SkillResponse::tell(handlers::APOLOGY)
        }
    }
}

async fn dispatch(ctx: &SkillContext<'_>, event: &SkillEvent) -> anyhow::Result<SkillResponse> {
    match &event.request {
        Request::LaunchRequest => Ok(handlers::launch()),
        Request::IntentRequest { intent } => {
            tracing::debug!("Dispatching intent {}", intent.name);
            match intent.name.as_str() {
                "HealthCheckIntent" => handlers::health_check(ctx, event).await,
                "ListPlantsIntent" => handlers::list_all_plants(ctx, event).await,
                "TeamPlantsIntent" => handlers::team_plants(ctx, event, intent).await,
                "AMAZON.HelpIntent" => Ok(handlers::help()),
                "AMAZON.StopIntent" | "AMAZON.CancelIntent" => Ok(handlers::stop()),
                "AMAZON.FallbackIntent" => handlers::fallback(ctx, event).await,
                other => {
                    tracing::warn!("Unknown intent {}", other);
                    Ok(handlers::unknown())
                }
            }
        }
        Request::SessionEndedRequest { reason } => {
            tracing::debug!("Session ended (reason: {:?})", reason);
            Ok(handlers::stop())
        }
        Request::Unknown => {
            tracing::warn!("Unknown request type");
            Ok(handlers::unknown())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use crate::response::Card;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event(json: serde_json::Value) -> SkillEvent {
        serde_json::from_value(json).unwrap()
    }

    fn launch_event() -> SkillEvent {
        event(serde_json::json!({"request": {"type": "LaunchRequest"}}))
    }

    /// Intent event carrying an embedded access token.
    fn intent_event(name: &str, slots: serde_json::Value) -> SkillEvent {
        event(serde_json::json!({
            "session": {"user": {"userId": "user-1", "accessToken": "tok-1"}},
            "request": {"type": "IntentRequest", "intent": {"name": name, "slots": slots}}
        }))
    }

    /// Intent event with no identity and no token anywhere.
    fn anonymous_intent(name: &str) -> SkillEvent {
        event(serde_json::json!({
            "request": {"type": "IntentRequest", "intent": {"name": name}}
        }))
    }

    async fn run(server: &MockServer, ev: &SkillEvent) -> SkillResponse {
        let client = GardenClient::new(&server.uri()).unwrap();
        let store = MemoryTokenStore::new();
        let ctx = SkillContext {
            client: &client,
            store: &store,
            creds: None,
            fallback_token: None,
        };
        handle_event(&ctx, ev).await
    }

    #[tokio::test]
    async fn test_launch_welcome_session_open() {
        let server = MockServer::start().await;
        let resp = run(&server, &launch_event()).await;
        assert!(resp.speech_text().starts_with("Welcome to Plant Ranger Check"));
        assert!(!resp.response.should_end_session);
    }

    #[tokio::test]
    async fn test_help_and_stop_flags() {
        let server = MockServer::start().await;

        let help = run(&server, &anonymous_intent("AMAZON.HelpIntent")).await;
        assert!(!help.speech_text().is_empty());
        assert!(!help.response.should_end_session);

        let stop = run(&server, &anonymous_intent("AMAZON.StopIntent")).await;
        assert!(!stop.speech_text().is_empty());
        assert!(stop.response.should_end_session);

        let cancel = run(&server, &anonymous_intent("AMAZON.CancelIntent")).await;
        assert!(cancel.response.should_end_session);
    }

    #[tokio::test]
    async fn test_unknown_intent_generic_response_ends_session() {
        let server = MockServer::start().await;
        let resp = run(&server, &anonymous_intent("SingToMyPlantsIntent")).await;
        assert!(!resp.speech_text().is_empty());
        assert!(resp.response.should_end_session);
    }

    #[tokio::test]
    async fn test_unknown_request_type_generic_response() {
        let server = MockServer::start().await;
        let ev = event(serde_json::json!({"request": {"type": "BrandNewRequest"}}));
        let resp = run(&server, &ev).await;
        assert!(!resp.speech_text().is_empty());
        assert!(resp.response.should_end_session);
    }

    #[tokio::test]
    async fn test_health_check_healthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "recommendations": ["water the ferns"]
            })))
            .mount(&server)
            .await;

        let resp = run(&server, &intent_event("HealthCheckIntent", serde_json::json!({}))).await;
        assert!(resp.speech_text().contains("healthy"));
        assert!(resp.speech_text().contains("water the ferns"));
        assert!(resp.response.should_end_session);
    }

    #[tokio::test]
    async fn test_health_check_unauthorized_prompts_account_link() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        // No token anywhere: the call goes out unauthenticated and the 401
        // becomes a link-account prompt.
        let resp = run(&server, &anonymous_intent("HealthCheckIntent")).await;
        assert!(matches!(resp.response.card, Some(Card::LinkAccount)));
        assert!(resp.response.should_end_session);
    }

    #[tokio::test]
    async fn test_list_plants_without_token_prompts_account_link() {
        let server = MockServer::start().await;
        let resp = run(&server, &anonymous_intent("ListPlantsIntent")).await;
        assert!(matches!(resp.response.card, Some(Card::LinkAccount)));
    }

    #[tokio::test]
    async fn test_list_plants_aggregates_and_skips_failed_team() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/teams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "teams": [
                    {"id": "t1", "name": "kitchen"},
                    {"id": "t2", "name": "balcony"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/teams/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "t1",
                "name": "kitchen",
                "plants": [
                    {"id": "p1", "name": "Fern", "needs_water": true},
                    {"id": "p2", "name": "Basil", "status": "healthy"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/teams/t2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let resp = run(&server, &intent_event("ListPlantsIntent", serde_json::json!({}))).await;
        // Only the surviving team's plants are counted
        assert!(resp.speech_text().contains("2 plants across 1 team"));
        assert!(resp.speech_text().contains("Fern"));
        assert!(resp.response.should_end_session);
    }

    #[tokio::test]
    async fn test_conclusive_summary_skips_plant_detail_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/teams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "teams": [{"id": "t1", "name": "kitchen"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/teams/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "t1",
                "name": "kitchen",
                "plants": [{"id": "p1", "name": "Fern", "status": "needs water"}]
            })))
            .mount(&server)
            .await;
        // Any plant-detail fetch would trip this
        Mock::given(method("GET"))
            .and(path("/plants/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "p1", "name": "Fern"
            })))
            .expect(0)
            .mount(&server)
            .await;

        let resp = run(&server, &intent_event("ListPlantsIntent", serde_json::json!({}))).await;
        assert!(resp.speech_text().contains("Fern"));
    }

    #[tokio::test]
    async fn test_inconclusive_summary_fetches_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/teams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "teams": [{"id": "t1", "name": "kitchen"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/teams/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "t1",
                "name": "kitchen",
                "plants": [{"id": "p1", "name": "Fern"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/plants/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "p1",
                "name": "Fern",
                "checkups": [{"timestamp": "2024-05-03T10:00:00Z", "status": "thirsty"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = run(&server, &intent_event("ListPlantsIntent", serde_json::json!({}))).await;
        assert!(resp.speech_text().contains("1 needs water: Fern"));
    }

    #[tokio::test]
    async fn test_plant_with_no_signal_counts_as_not_thirsty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/teams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "teams": [{"id": "t1", "name": "kitchen"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/teams/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "t1",
                "name": "kitchen",
                "plants": [{"id": "p1", "name": "Fern"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/plants/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "p1", "name": "Fern"
            })))
            .mount(&server)
            .await;

        let resp = run(&server, &intent_event("ListPlantsIntent", serde_json::json!({}))).await;
        assert!(resp.speech_text().contains("None of them need water"));
    }

    #[tokio::test]
    async fn test_team_intent_matches_spoken_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/teams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "teams": [{"id": "t1", "name": "kitchen"}, {"id": "t2", "name": "balcony"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/teams/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "t1",
                "name": "kitchen",
                "plants": [{"id": "p1", "name": "Fern", "needsWater": true}]
            })))
            .mount(&server)
            .await;

        let ev = intent_event(
            "TeamPlantsIntent",
            serde_json::json!({"team": {"value": "Team Kitchen"}}),
        );
        let resp = run(&server, &ev).await;
        assert!(resp.speech_text().contains("Team kitchen"));
        assert!(resp.speech_text().contains("Fern"));
        assert!(resp.response.should_end_session);
    }

    #[tokio::test]
    async fn test_team_intent_no_match_reprompts_with_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/teams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "teams": [{"id": "t1", "name": "kitchen"}, {"id": "t2", "name": "balcony"}]
            })))
            .mount(&server)
            .await;

        let ev = intent_event(
            "TeamPlantsIntent",
            serde_json::json!({"team": {"value": "greenhouse"}}),
        );
        let resp = run(&server, &ev).await;
        assert!(resp.speech_text().contains("kitchen, balcony"));
        assert!(!resp.response.should_end_session);
        assert!(resp.response.reprompt.is_some());
    }

    #[tokio::test]
    async fn test_team_intent_missing_slot_reprompts() {
        let server = MockServer::start().await;
        let ev = intent_event("TeamPlantsIntent", serde_json::json!({}));
        let resp = run(&server, &ev).await;
        assert!(resp.speech_text().contains("Which team"));
        assert!(!resp.response.should_end_session);
    }

    #[tokio::test]
    async fn test_fallback_with_token_lists_team_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/teams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "teams": [{"id": "t1", "name": "kitchen"}]
            })))
            .mount(&server)
            .await;

        let resp = run(&server, &intent_event("AMAZON.FallbackIntent", serde_json::json!({}))).await;
        assert!(resp.speech_text().contains("kitchen"));
        assert!(!resp.response.should_end_session);
    }

    #[tokio::test]
    async fn test_fallback_without_token_generic_reprompt() {
        let server = MockServer::start().await;
        let resp = run(&server, &anonymous_intent("AMAZON.FallbackIntent")).await;
        assert!(resp.speech_text().contains("didn't catch that"));
        assert!(!resp.response.should_end_session);
        assert!(resp.response.reprompt.is_some());
    }

    #[tokio::test]
    async fn test_service_unavailable_yields_apology() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/teams"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let resp = run(&server, &intent_event("ListPlantsIntent", serde_json::json!({}))).await;
        assert!(resp.speech_text().starts_with("Sorry"));
        assert!(resp.response.should_end_session);
    }
}
