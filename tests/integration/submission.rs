use serde_json::json;

use crate::common::{TestApp, routes, submission_form};

mod submit {
    use super::*;

    #[tokio::test]
    async fn student_can_submit_a_problem_with_a_file() {
        let app = TestApp::spawn().await;
        let client = app.student_client("s1").await;

        let form = submission_form(
            "Program prints 42",
            "Program prints 41",
            "Off-by-one somewhere in the loop",
            "main.py",
            b"print(41)",
        );
        let res = client.post_multipart(routes::SUBMISSIONS, form).await;

        assert_eq!(res.status, 201, "Submit failed: {}", res.text);
        assert_eq!(res.body["student_identifier"], "s1");
        assert_eq!(res.body["desired_outcome"], "Program prints 42");
        let file_path = res.body["file_path"].as_str().unwrap();
        assert_eq!(file_path.len(), 64);
        assert!(res.body["feedback"].is_null());
        assert!(res.body["revised_file_path"].is_null());
    }

    #[tokio::test]
    async fn submit_without_a_session_is_unauthorized() {
        let app = TestApp::spawn().await;
        let client = app.client();

        let form = submission_form("a", "b", "c", "f.txt", b"x");
        let res = client.post_multipart(routes::SUBMISSIONS, form).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "SESSION_MISSING");
    }

    #[tokio::test]
    async fn teacher_cannot_submit() {
        let app = TestApp::spawn().await;
        let client = app.teacher_client().await;

        let form = submission_form("a", "b", "c", "f.txt", b"x");
        let res = client.post_multipart(routes::SUBMISSIONS, form).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "ROLE_DENIED");
    }

    #[tokio::test]
    async fn submit_without_a_file_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let client = app.student_client("s1").await;

        let form = reqwest::multipart::Form::new()
            .text("desired_outcome", "works")
            .text("actual_outcome", "crashes")
            .text("problem", "segfault");
        let res = client.post_multipart(routes::SUBMISSIONS, form).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn missing_text_fields_are_stored_as_empty_strings() {
        let app = TestApp::spawn().await;
        let client = app.student_client("s1").await;

        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(b"data".to_vec()).file_name("f.txt"),
        );
        let res = client.post_multipart(routes::SUBMISSIONS, form).await;

        assert_eq!(res.status, 201, "Submit failed: {}", res.text);
        assert_eq!(res.body["desired_outcome"], "");
        assert_eq!(res.body["actual_outcome"], "");
        assert_eq!(res.body["problem"], "");
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let app = TestApp::spawn().await;
        let client = app.student_client("s1").await;

        // The test app's per-file limit is 1 MiB.
        let big = vec![0u8; 2 * 1024 * 1024];
        let form = submission_form("a", "b", "c", "big.bin", &big);
        let res = client.post_multipart(routes::SUBMISSIONS, form).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod list {
    use super::*;

    #[tokio::test]
    async fn teacher_sees_all_submissions_in_insertion_order() {
        let app = TestApp::spawn().await;
        let student = app.student_client("s1").await;

        for problem in ["first", "second"] {
            let form = submission_form("a", "b", problem, "f.txt", b"x");
            let res = student.post_multipart(routes::SUBMISSIONS, form).await;
            assert_eq!(res.status, 201);
        }

        let teacher = app.teacher_client().await;
        let res = teacher.get(routes::SUBMISSIONS).await;

        assert_eq!(res.status, 200);
        let list = res.body.as_array().expect("Expected a JSON array");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["problem"], "first");
        assert_eq!(list[1]["problem"], "second");
    }

    #[tokio::test]
    async fn listing_without_a_session_returns_no_data() {
        let app = TestApp::spawn().await;
        let student = app.student_client("s1").await;
        let form = submission_form("a", "b", "c", "f.txt", b"x");
        assert_eq!(
            student.post_multipart(routes::SUBMISSIONS, form).await.status,
            201
        );

        let anonymous = app.client();
        let res = anonymous.get(routes::SUBMISSIONS).await;

        assert_eq!(res.status, 401);
        assert!(res.body.get("student_identifier").is_none());
        assert!(!res.text.contains("\"problem\""));
    }

    #[tokio::test]
    async fn students_cannot_list_submissions() {
        let app = TestApp::spawn().await;
        let student = app.student_client("s1").await;

        let res = student.get(routes::SUBMISSIONS).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "ROLE_DENIED");
    }
}

mod feedback {
    use super::*;

    async fn submit_one(app: &TestApp) -> i64 {
        let student = app.student_client("s1").await;
        let form = submission_form("works", "fails", "bug", "f.txt", b"x");
        let res = student.post_multipart(routes::SUBMISSIONS, form).await;
        assert_eq!(res.status, 201, "Submit failed: {}", res.text);
        res.body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn teacher_can_attach_feedback_without_a_file() {
        let app = TestApp::spawn().await;
        let id = submit_one(&app).await;
        let teacher = app.teacher_client().await;

        let form = reqwest::multipart::Form::new().text("feedback", "Good job");
        let res = teacher.post_multipart(&routes::feedback(id), form).await;

        assert_eq!(res.status, 200, "Feedback failed: {}", res.text);
        assert_eq!(res.body["feedback"], "Good job");
        assert!(res.body["revised_file_path"].is_null());
        // The student's original file is untouched.
        assert_eq!(res.body["file_path"].as_str().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn teacher_can_attach_feedback_with_a_revised_file() {
        let app = TestApp::spawn().await;
        let id = submit_one(&app).await;
        let teacher = app.teacher_client().await;

        let form = reqwest::multipart::Form::new()
            .text("feedback", "See the corrected version")
            .part(
                "revised_file",
                reqwest::multipart::Part::bytes(b"print(42)".to_vec()).file_name("fixed.py"),
            );
        let res = teacher.post_multipart(&routes::feedback(id), form).await;

        assert_eq!(res.status, 200, "Feedback failed: {}", res.text);
        assert_eq!(res.body["revised_file_path"].as_str().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn feedback_without_a_new_file_preserves_the_revised_file() {
        let app = TestApp::spawn().await;
        let id = submit_one(&app).await;
        let teacher = app.teacher_client().await;

        let form = reqwest::multipart::Form::new()
            .text("feedback", "first pass")
            .part(
                "revised_file",
                reqwest::multipart::Part::bytes(b"v2".to_vec()).file_name("v2.txt"),
            );
        let first = teacher.post_multipart(&routes::feedback(id), form).await;
        assert_eq!(first.status, 200);
        let revised = first.body["revised_file_path"].as_str().unwrap().to_string();

        let form = reqwest::multipart::Form::new().text("feedback", "second pass");
        let second = teacher.post_multipart(&routes::feedback(id), form).await;

        assert_eq!(second.status, 200);
        assert_eq!(second.body["feedback"], "second pass");
        assert_eq!(second.body["revised_file_path"], revised.as_str());
    }

    #[tokio::test]
    async fn feedback_on_an_unknown_id_is_not_found() {
        let app = TestApp::spawn().await;
        let teacher = app.teacher_client().await;

        let form = reqwest::multipart::Form::new().text("feedback", "nice try");
        let res = teacher.post_multipart(&routes::feedback(9999), form).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");

        // No record was created.
        let list = teacher.get(routes::SUBMISSIONS).await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn students_cannot_attach_feedback() {
        let app = TestApp::spawn().await;
        let id = submit_one(&app).await;
        let student = app.student_client("s2").await;

        let form = reqwest::multipart::Form::new().text("feedback", "self review");
        let res = student.post_multipart(&routes::feedback(id), form).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "ROLE_DENIED");
    }
}

mod files {
    use super::*;

    #[tokio::test]
    async fn uploaded_file_can_be_downloaded_by_the_teacher() {
        let app = TestApp::spawn().await;
        let student = app.student_client("s1").await;

        let content = b"print('hello grader')";
        let form = submission_form("a", "b", "c", "main.py", content);
        let res = student.post_multipart(routes::SUBMISSIONS, form).await;
        assert_eq!(res.status, 201);
        let hash = res.body["file_path"].as_str().unwrap().to_string();

        let teacher = app.teacher_client().await;
        let (status, bytes) = teacher.get_bytes(&routes::file(&hash)).await;

        assert_eq!(status, 200);
        assert_eq!(bytes, content);
    }

    #[tokio::test]
    async fn download_without_a_session_is_unauthorized() {
        let app = TestApp::spawn().await;
        let hash = "0".repeat(64);

        let anonymous = app.client();
        let (status, _) = anonymous.get_bytes(&routes::file(&hash)).await;

        assert_eq!(status, 401);
    }

    #[tokio::test]
    async fn download_of_an_unknown_hash_is_not_found() {
        let app = TestApp::spawn().await;
        let teacher = app.teacher_client().await;
        let hash = "0".repeat(64);

        let res = teacher.get(&routes::file(&hash)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn matching_etag_yields_not_modified() {
        let app = TestApp::spawn().await;
        let student = app.student_client("s1").await;

        let form = submission_form("a", "b", "c", "f.txt", b"cache me");
        let res = student.post_multipart(routes::SUBMISSIONS, form).await;
        assert_eq!(res.status, 201);
        let hash = res.body["file_path"].as_str().unwrap().to_string();

        let etag = format!("\"{hash}\"");
        let status = student
            .get_if_none_match(&routes::file(&hash), &etag)
            .await;

        assert_eq!(status, 304);
    }
}

mod end_to_end {
    use super::*;

    /// Full classroom flow: student registers, logs in, submits; teacher
    /// logs in, reviews, attaches feedback.
    #[tokio::test]
    async fn register_submit_review_feedback() {
        let app = TestApp::spawn().await;

        let student = app.client();
        let creds = json!({"identifier": "s1", "password": "pw1_long_enough"});
        assert_eq!(student.post_json(routes::REGISTER, &creds).await.status, 201);

        let login = student.post_json(routes::STUDENT_LOGIN, &creds).await;
        assert_eq!(login.status, 200);
        assert_eq!(login.body["role"], "student");

        let form = submission_form(
            "Parser accepts the file",
            "Parser panics",
            "Unclosed bracket handling",
            "parser.rs",
            b"fn parse() {}",
        );
        let created = student.post_multipart(routes::SUBMISSIONS, form).await;
        assert_eq!(created.status, 201);
        let id = created.body["id"].as_i64().unwrap();
        let original_file = created.body["file_path"].as_str().unwrap().to_string();
        assert!(created.body["feedback"].is_null());

        let teacher = app.teacher_client().await;
        let list = teacher.get(routes::SUBMISSIONS).await;
        assert_eq!(list.status, 200);
        let submissions = list.body.as_array().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0]["id"].as_i64().unwrap(), id);

        let form = reqwest::multipart::Form::new().text("feedback", "Good job");
        let updated = teacher.post_multipart(&routes::feedback(id), form).await;
        assert_eq!(updated.status, 200);
        assert_eq!(updated.body["feedback"], "Good job");
        assert_eq!(updated.body["file_path"], original_file.as_str());
    }
}
