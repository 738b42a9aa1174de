#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web, App};
    use async_trait::async_trait;
    use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
    use base64::Engine;
    use chrono::Duration;
    use jarvis::api::middleware::{SessionCookie, SESSION_COOKIE};
    use jarvis::api::routes::json_config;
    use jarvis::config::DEFAULT_MAX_UPLOAD_BYTES;
    use jarvis::llm::models::ImagePayload;
    use jarvis::llm::{LlmError, VisionProvider};
    use jarvis::page::PageController;
    use jarvis::session::SessionStore;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct FixedProvider(Option<&'static str>);

    #[async_trait]
    impl VisionProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn answer(
            &self,
            _instruction: &str,
            _image: &ImagePayload,
            _question: &str,
        ) -> Result<String, LlmError> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| LlmError::Api("quota exceeded".to_string()))
        }
    }

    fn controller(reply: Option<&'static str>) -> PageController {
        PageController::new(
            Arc::new(FixedProvider(reply)),
            "You are Jarvis.",
            Duration::seconds(120),
        )
    }

    // "AQID" is base64 for [1, 2, 3]
    fn ask_body(question: &str) -> Value {
        json!({
            "question": question,
            "image": { "mime_type": "image/png", "data": "data:image/png;base64,AQID" }
        })
    }

    fn jpeg_body(raw_len: usize) -> Value {
        json!({
            "question": "What is this?",
            "image": { "mime_type": "image/jpeg", "data": BASE64_STANDARD.encode(vec![0u8; raw_len]) }
        })
    }

    #[actix_web::test]
    async fn test_session_cookie_is_issued_and_reused() {
        let store = SessionStore::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store.clone()))
                .app_data(web::Data::new(controller(Some("A cat."))))
                .wrap(SessionCookie)
                .configure(jarvis::api::routes::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/session").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .expect("session cookie")
            .into_owned();
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["chat_history"], json!([]));

        let req = test::TestRequest::post()
            .uri("/api/ask")
            .cookie(cookie.clone())
            .set_json(ask_body("What is this?"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.response().cookies().next().is_none());

        let req = test::TestRequest::get()
            .uri("/api/session")
            .cookie(cookie)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["last_question"], "What is this?");
        assert_eq!(body["last_response"], "A cat.");
        assert_eq!(body["chat_history"], json!([{ "user": "What is this?", "ai": "A cat." }]));
        assert_eq!(store.len(), 1);
    }

    #[actix_web::test]
    async fn test_ask_without_image_is_unprocessable() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(SessionStore::new()))
                .app_data(web::Data::new(controller(Some("A cat."))))
                .wrap(SessionCookie)
                .configure(jarvis::api::routes::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/ask")
            .set_json(json!({ "question": "What is this?" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["chat_history"], json!([]));
        assert!(body["notice"].as_str().unwrap().contains("upload an image"));
    }

    #[actix_web::test]
    async fn test_bad_base64_is_unprocessable() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(SessionStore::new()))
                .app_data(web::Data::new(controller(Some("A cat."))))
                .wrap(SessionCookie)
                .configure(jarvis::api::routes::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/ask")
            .set_json(json!({
                "question": "What is this?",
                "image": { "mime_type": "image/png", "data": "%%%not-base64%%%" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(SessionStore::new()))
                .app_data(web::Data::new(controller(None)))
                .wrap(SessionCookie)
                .configure(jarvis::api::routes::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/ask")
            .set_json(ask_body("What is this?"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["chat_history"], json!([]));
        assert_eq!(body["last_response"], Value::Null);
        assert!(body["notice"].is_string());
    }

    #[actix_web::test]
    async fn test_forget_session_clears_store() {
        let store = SessionStore::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store.clone()))
                .app_data(web::Data::new(controller(Some("A cat."))))
                .wrap(SessionCookie)
                .configure(jarvis::api::routes::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/ask")
            .set_json(ask_body("What is this?"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .expect("session cookie")
            .into_owned();
        assert_eq!(store.len(), 1);

        let req = test::TestRequest::delete()
            .uri("/api/session")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(store.is_empty());
    }

    #[actix_web::test]
    async fn test_phone_sized_photo_fits_default_limit() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(SessionStore::new()))
                .app_data(web::Data::new(controller(Some("A cat."))))
                .app_data(json_config(DEFAULT_MAX_UPLOAD_BYTES))
                .wrap(SessionCookie)
                .configure(jarvis::api::routes::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/ask")
            .set_json(jpeg_body(3_000_000))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["last_response"], "A cat.");
    }

    #[actix_web::test]
    async fn test_upload_just_under_limit_is_answered() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(SessionStore::new()))
                .app_data(web::Data::new(controller(Some("A cat."))))
                .app_data(json_config(300_000))
                .wrap(SessionCookie)
                .configure(jarvis::api::routes::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/ask")
            .set_json(jpeg_body(299_000))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_oversized_upload_gets_json_notice() {
        let store = SessionStore::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store.clone()))
                .app_data(web::Data::new(controller(Some("A cat."))))
                .app_data(json_config(300_000))
                .wrap(SessionCookie)
                .configure(jarvis::api::routes::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/ask")
            .set_json(jpeg_body(400_000))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["notice"].as_str().unwrap().contains("too large"));
        assert!(store.is_empty());
    }
}
