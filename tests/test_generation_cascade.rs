use chop::{
    fallback_generate, ChopConfig, GenerateResult, Platform, ProviderConfig, Repurposer,
};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;

const SOURCE: &str = "We rebuilt our release pipeline around reproducible builds.\n\n\
                      Update 1: nightly artifacts are now signed.";

fn groq_config(url: String) -> ChopConfig {
    ChopConfig {
        groq: ProviderConfig {
            api_key: Some("gsk_test".to_string()),
            base_url: Some(url),
            ..ProviderConfig::default()
        },
        ..ChopConfig::default()
    }
}

fn chat_completion(content: &str) -> String {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

async fn groq_model(server: &mut ServerGuard, model: &str, status: usize, body: String) -> Mock {
    server
        .mock("POST", "/openai/v1/chat/completions")
        .match_header("authorization", "Bearer gsk_test")
        .match_body(Matcher::PartialJson(json!({"model": model})))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

async fn generate(config: ChopConfig, platforms: &[&str]) -> Vec<GenerateResult> {
    Repurposer::builder()
        .config(config)
        .text(SOURCE)
        .platforms(platforms.iter().copied())
        .build()
        .await
        .unwrap()
        .posts
}

#[tokio::test]
async fn test_cascade_skips_failing_model_and_fills_gaps() {
    let mut server = Server::new_async().await;

    let first = groq_model(
        &mut server,
        "llama-3.3-70b-versatile",
        503,
        r#"{"error": "over capacity"}"#.to_string(),
    )
    .await;

    // Fenced output with trailing commas, as models like to return it
    let content = "```json\n{\"results\": [\
        {\"platform\": \"twitter\", \"threads\": [\"1/ Reproducible builds\", \"2/ Signed nightlies\",],},\
        {\"platform\": \"LinkedIn\", \"post\": \"Our release pipeline is now reproducible.\"},\
    ]}\n```";
    let second = groq_model(
        &mut server,
        "llama-3.1-70b-versatile",
        200,
        chat_completion(content),
    )
    .await;

    let posts = generate(
        groq_config(server.url()),
        &["twitter", "linkedin", "reddit"],
    )
    .await;

    first.assert_async().await;
    second.assert_async().await;

    assert_eq!(posts.len(), 3);
    assert_eq!(
        posts[0],
        GenerateResult::Twitter {
            threads: vec![
                "1/ Reproducible builds".to_string(),
                "2/ Signed nightlies".to_string()
            ]
        }
    );
    assert_eq!(
        posts[1],
        GenerateResult::Linkedin {
            post: "Our release pipeline is now reproducible.".to_string()
        }
    );
    assert_eq!(posts[2], fallback_generate(SOURCE, &[Platform::Reddit])[0]);
}

#[tokio::test]
async fn test_incomplete_entry_is_replaced_by_template() {
    let mut server = Server::new_async().await;
    let content = json!({
        "results": [
            {"platform": "reddit", "title": "only title"},
            {"platform": "linkedin", "post": "A finished post."}
        ]
    })
    .to_string();
    let _mock = groq_model(
        &mut server,
        "llama-3.3-70b-versatile",
        200,
        chat_completion(&content),
    )
    .await;

    let posts = generate(groq_config(server.url()), &["reddit", "linkedin"]).await;

    assert_eq!(
        posts[0],
        GenerateResult::Linkedin {
            post: "A finished post.".to_string()
        }
    );
    assert_eq!(posts[1], fallback_generate(SOURCE, &[Platform::Reddit])[0]);
}

#[tokio::test]
async fn test_exhausted_cascade_returns_full_template_set() {
    let mut server = Server::new_async().await;
    let mocks = vec![
        groq_model(&mut server, "llama-3.3-70b-versatile", 500, "boom".into()).await,
        groq_model(
            &mut server,
            "llama-3.1-70b-versatile",
            200,
            chat_completion("I cannot produce JSON today."),
        )
        .await,
        groq_model(
            &mut server,
            "llama-3.1-8b-instant",
            200,
            chat_completion(r#"{"posts": []}"#),
        )
        .await,
    ];

    let platforms = ["youtube", "telegram", "twitter"];
    let posts = generate(groq_config(server.url()), &platforms).await;

    for mock in &mocks {
        mock.assert_async().await;
    }
    assert_eq!(
        posts,
        fallback_generate(
            SOURCE,
            &[Platform::Youtube, Platform::Telegram, Platform::Twitter]
        )
    );
}

#[tokio::test]
async fn test_model_override_is_tried_first() {
    let mut server = Server::new_async().await;
    let content = json!({"results": [{"platform": "telegram", "post": "From the override."}]});
    let mock = groq_model(
        &mut server,
        "custom-model",
        200,
        chat_completion(&content.to_string()),
    )
    .await;

    let response = Repurposer::builder()
        .config(groq_config(server.url()))
        .model("custom-model")
        .text(SOURCE)
        .platforms(["telegram"])
        .build()
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(
        response.posts,
        vec![GenerateResult::Telegram {
            post: "From the override.".to_string()
        }]
    );
}

#[tokio::test]
async fn test_secondary_provider_after_primary_exhausted() {
    let mut groq = Server::new_async().await;
    let groq_mock = groq
        .mock("POST", "/openai/v1/chat/completions")
        .with_status(429)
        .with_body("rate limited")
        .expect(3)
        .create_async()
        .await;

    let mut google = Server::new_async().await;
    let content = json!({"results": [{"platform": "youtube", "script": "[0:00] Intro"}]});
    let google_mock = google
        .mock("POST", "/v1beta/models/gemini-1.5-flash-001:generateContent")
        .match_query(Matcher::UrlEncoded("key".into(), "google-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{"content": {"parts": [{"text": content.to_string()}]}}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let mut config = groq_config(groq.url());
    config.google = ProviderConfig {
        api_key: Some("google-key".to_string()),
        base_url: Some(google.url()),
        ..ProviderConfig::default()
    };

    let posts = generate(config, &["youtube"]).await;

    groq_mock.assert_async().await;
    google_mock.assert_async().await;
    assert_eq!(
        posts,
        vec![GenerateResult::Youtube {
            script: "[0:00] Intro".to_string()
        }]
    );
}

#[tokio::test]
async fn test_disabled_provider_is_never_called() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut config = groq_config(server.url());
    config.groq.enabled = false;

    let posts = generate(config, &["linkedin"]).await;

    mock.assert_async().await;
    assert_eq!(posts, fallback_generate(SOURCE, &[Platform::Linkedin]));
}
