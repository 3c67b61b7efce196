use serde_json::json;

use crate::common::{TEACHER_ID, TEACHER_PASSWORD, TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_student_can_register_with_valid_credentials() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let res = client
            .post_json(
                routes::REGISTER,
                &json!({"identifier": "s1", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 201);
        assert!(res.body["id"].is_number());
        assert_eq!(res.body["identifier"], "s1");
    }

    #[tokio::test]
    async fn registering_the_same_identifier_twice_conflicts() {
        let app = TestApp::spawn().await;
        let client = app.client();
        let body = json!({"identifier": "s1", "password": "securepass"});

        let first = client.post_json(routes::REGISTER, &body).await;
        assert_eq!(
            first.status, 201,
            "First registration failed: {}",
            first.text
        );

        let res = client.post_json(routes::REGISTER, &body).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "IDENTIFIER_TAKEN");
    }

    #[tokio::test]
    async fn student_may_reuse_the_seeded_teacher_identifier() {
        // Identifiers are unique per role, not globally.
        let app = TestApp::spawn().await;
        let client = app.client();

        let res = client
            .post_json(
                routes::REGISTER,
                &json!({"identifier": TEACHER_ID, "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 201, "Registration failed: {}", res.text);
    }

    #[tokio::test]
    async fn cannot_register_with_a_password_that_is_too_short() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let res = client
            .post_json(
                routes::REGISTER,
                &json!({"identifier": "s1", "password": "short"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn cannot_register_with_an_invalid_identifier() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let res = client
            .post_json(
                routes::REGISTER,
                &json!({"identifier": "no spaces!", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn cannot_register_with_an_empty_identifier() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let res = client
            .post_json(
                routes::REGISTER,
                &json!({"identifier": "   ", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn registered_student_can_login_and_gets_a_session() {
        let app = TestApp::spawn().await;
        let client = app.client();
        let body = json!({"identifier": "s1", "password": "securepass"});

        let reg = client.post_json(routes::REGISTER, &body).await;
        assert_eq!(reg.status, 201, "Registration failed: {}", reg.text);

        let res = client.post_json(routes::STUDENT_LOGIN, &body).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["identifier"], "s1");
        assert_eq!(res.body["role"], "student");

        // The cookie jar now carries a session.
        let me = client.get(routes::ME).await;
        assert_eq!(me.status, 200);
        assert_eq!(me.body["identifier"], "s1");
        assert_eq!(me.body["role"], "student");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let reg = client
            .post_json(
                routes::REGISTER,
                &json!({"identifier": "s1", "password": "securepass"}),
            )
            .await;
        assert_eq!(reg.status, 201);

        let res = client
            .post_json(
                routes::STUDENT_LOGIN,
                &json!({"identifier": "s1", "password": "wrongpass1"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_identifier_is_indistinguishable_from_wrong_password() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let unknown = client
            .post_json(
                routes::STUDENT_LOGIN,
                &json!({"identifier": "ghost", "password": "whatever1"}),
            )
            .await;

        let reg = client
            .post_json(
                routes::REGISTER,
                &json!({"identifier": "s1", "password": "securepass"}),
            )
            .await;
        assert_eq!(reg.status, 201);

        let wrong_pw = client
            .post_json(
                routes::STUDENT_LOGIN,
                &json!({"identifier": "s1", "password": "wrongpass1"}),
            )
            .await;

        assert_eq!(unknown.status, wrong_pw.status);
        assert_eq!(unknown.body["code"], wrong_pw.body["code"]);
    }

    #[tokio::test]
    async fn student_cannot_login_through_the_teacher_endpoint() {
        let app = TestApp::spawn().await;
        let client = app.client();
        let body = json!({"identifier": "s1", "password": "securepass"});

        let reg = client.post_json(routes::REGISTER, &body).await;
        assert_eq!(reg.status, 201);

        let res = client.post_json(routes::TEACHER_LOGIN, &body).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn seeded_teacher_can_login_through_the_teacher_endpoint() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let res = client
            .post_json(
                routes::TEACHER_LOGIN,
                &json!({"identifier": TEACHER_ID, "password": TEACHER_PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200, "Teacher login failed: {}", res.text);
        assert_eq!(res.body["role"], "teacher");
    }
}

mod sessions {
    use super::*;

    #[tokio::test]
    async fn me_without_a_session_is_unauthorized() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let res = client.get(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "SESSION_MISSING");
    }

    #[tokio::test]
    async fn logout_invalidates_the_session() {
        let app = TestApp::spawn().await;
        let client = app.student_client("s1").await;

        let res = client.post_empty(routes::LOGOUT).await;
        assert_eq!(res.status, 204);

        let me = client.get(routes::ME).await;
        assert_eq!(me.status, 401);
    }
}
