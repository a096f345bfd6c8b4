//! Integration tests for the instant-meet endpoint

mod test_utils;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use quickmeet_providers::ProviderError;
    use serde_json::json;
    use tower::util::ServiceExt;

    use crate::test_utils::{FakeProvider, body_to_json, test_app};

    fn instant() -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/instant-meet")
            .body(Body::empty())
            .unwrap()
    }

    /// Tests that only the join URL is returned
    #[tokio::test]
    async fn it_creates_an_instant_meeting() {
        let provider = Arc::new(FakeProvider::default());
        let app = test_app(provider.clone());

        let response = app.oneshot(instant()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(
            body,
            json!({"success": true, "meetUrl": "https://meet.google.com/xyz-abcd-efg"})
        );
        assert!(body.get("calendarEvent").is_none());
        assert_eq!(provider.instant_calls(), 1);
    }

    /// Tests the failure shape
    #[tokio::test]
    async fn it_returns_500_on_failure() {
        let provider = Arc::new(FakeProvider::failing(ProviderError::server(
            "Meet API returned 503",
        )));
        let app = test_app(provider);

        let response = app.oneshot(instant()).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(
            body,
            json!({"success": false, "message": "Meet API returned 503"})
        );
    }
}
