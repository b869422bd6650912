// tests/comment_tests.rs

mod common;

use common::{spawn_app, spawn_app_with};
use serde_json::{Value, json};

#[tokio::test]
async fn adding_a_comment_links_it_to_post_and_author() {
    let app = spawn_app().await;
    let alice = app.user("alice").await;
    let post_id = app.post_id(&alice).await;

    let response = app.add_comment(&alice, &post_id, "First comment here").await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    let comment = &body["data"];
    assert_eq!(comment["postId"], post_id.as_str());
    assert_eq!(comment["userId"], alice.id.as_str());
    assert_eq!(comment["comment"], "First comment here");

    let (_, post) = app.get_json(&format!("/post/{}", post_id)).await;
    assert_eq!(post["data"]["comments"], json!([comment["id"]]));

    let (_, profile) = app.get_json(&format!("/user/{}", alice.id)).await;
    assert_eq!(profile["data"]["comments"], json!([comment["id"]]));
}

#[tokio::test]
async fn adding_a_comment_validates_input() {
    let app = spawn_app().await;
    let alice = app.user("alice").await;
    let post_id = app.post_id(&alice).await;

    let short = app.add_comment(&alice, &post_id, "hey").await;
    assert_eq!(short.status().as_u16(), 400);

    let long = app.add_comment(&alice, &post_id, &"x".repeat(301)).await;
    assert_eq!(long.status().as_u16(), 400);

    let orphan = app.add_comment(&alice, "no-such-post", "Hello there").await;
    assert_eq!(orphan.status().as_u16(), 404);
}

#[tokio::test]
async fn comment_length_is_checked_after_sanitizing() {
    let app = spawn_app().await;
    let alice = app.user("alice").await;
    let post_id = app.post_id(&alice).await;

    let markup_only = app
        .add_comment(&alice, &post_id, "<script>alert(1)</script>")
        .await;
    assert_eq!(markup_only.status().as_u16(), 400);

    // Each `&` is stored as `&amp;`, so this would exceed 300 characters.
    let escaped = app.add_comment(&alice, &post_id, &"&".repeat(300)).await;
    assert_eq!(escaped.status().as_u16(), 400);

    let mixed = app
        .add_comment(&alice, &post_id, "Great post<script>alert(1)</script>")
        .await;
    assert_eq!(mixed.status().as_u16(), 201);
    let body: Value = mixed.json().await.unwrap();
    assert_eq!(body["data"]["comment"], "Great post");

    let (_, post) = app.get_json(&format!("/post/{}", post_id)).await;
    assert_eq!(post["data"]["comments"], json!([body["data"]["id"]]));
}

#[tokio::test]
async fn comment_like_toggle_returns_to_unliked() {
    let app = spawn_app().await;
    let alice = app.user("alice").await;
    let post_id = app.post_id(&alice).await;
    let comment_id = app.comment_id(&alice, &post_id).await;

    let like = || {
        app.client
            .post(app.url(&format!("/comment/like/{}", comment_id)))
            .bearer_auth(&alice.token)
            .send()
    };

    let first: Value = like().await.unwrap().json().await.unwrap();
    assert_eq!(first["message"], "Liked comment");
    assert_eq!(first["data"]["likes"], 1);

    let second: Value = like().await.unwrap().json().await.unwrap();
    assert_eq!(second["message"], "Unliked comment");
    assert_eq!(second["data"]["likes"], 0);

    let (_, comment) = app.get_json(&format!("/comment/{}", comment_id)).await;
    assert_eq!(comment["data"]["likes"], json!([]));
}

#[tokio::test]
async fn admin_cannot_edit_but_can_delete_a_comment() {
    let app = spawn_app().await;
    let alice = app.user("alice").await;
    let admin = app.admin().await;
    let post_id = app.post_id(&alice).await;
    let comment_id = app.comment_id(&alice, &post_id).await;

    let edit = app
        .client
        .put(app.url("/comment"))
        .bearer_auth(&admin.token)
        .json(&json!({ "commentId": comment_id, "postId": post_id, "comment": "Edited by admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(edit.status().as_u16(), 403);

    let delete = app
        .client
        .delete(app.url("/comment"))
        .bearer_auth(&admin.token)
        .json(&json!({ "commentId": comment_id, "postId": post_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(delete.status().as_u16(), 200);
    let body: Value = delete.json().await.unwrap();
    assert_eq!(body["message"], "Comment deleted");

    let (_, post) = app.get_json(&format!("/post/{}", post_id)).await;
    assert_eq!(post["data"]["comments"], json!([]));
    let (_, profile) = app.get_json(&format!("/user/{}", alice.id)).await;
    assert_eq!(profile["data"]["comments"], json!([]));
}

#[tokio::test]
async fn owner_edits_and_others_are_forbidden() {
    let app = spawn_app().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let post_id = app.post_id(&alice).await;
    let comment_id = app.comment_id(&alice, &post_id).await;

    let edit = |token: &str, text: &str| {
        app.client
            .put(app.url("/comment"))
            .bearer_auth(token)
            .json(&json!({ "commentId": comment_id, "postId": post_id, "comment": text }))
            .send()
    };

    assert_eq!(
        edit(&bob.token, "Bob was here").await.unwrap().status().as_u16(),
        403
    );

    let response = edit(&alice.token, "Edited by the author").await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["comment"], "Edited by the author");

    let bob_delete = app
        .client
        .delete(app.url("/comment"))
        .bearer_auth(&bob.token)
        .json(&json!({ "commentId": comment_id, "postId": post_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(bob_delete.status().as_u16(), 403);
}

#[tokio::test]
async fn comment_addressed_through_wrong_post_is_mismatched() {
    let app = spawn_app().await;
    let alice = app.user("alice").await;
    let post_a = app.post_id(&alice).await;
    let post_b = app.post_id(&alice).await;
    let comment_id = app.comment_id(&alice, &post_a).await;

    let edit = app
        .client
        .put(app.url("/comment"))
        .bearer_auth(&alice.token)
        .json(&json!({ "commentId": comment_id, "postId": post_b, "comment": "Moved elsewhere" }))
        .send()
        .await
        .unwrap();
    assert_eq!(edit.status().as_u16(), 400);
    let body: Value = edit.json().await.unwrap();
    assert_eq!(body["message"], "Comment does not belong to this post");

    let delete = app
        .client
        .delete(app.url("/comment"))
        .bearer_auth(&alice.token)
        .json(&json!({ "commentId": comment_id, "postId": "missing-post" }))
        .send()
        .await
        .unwrap();
    assert_eq!(delete.status().as_u16(), 404);
}

#[tokio::test]
async fn listing_comments_of_a_post() {
    let app = spawn_app().await;
    let alice = app.user("alice").await;
    let post_id = app.post_id(&alice).await;

    // No comments yet is reported as not found.
    let (status, body) = app.get_json(&format!("/comment/post/{}", post_id)).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "No comments for this post");

    let first = app.comment_id(&alice, &post_id).await;
    let second = app.comment_id(&alice, &post_id).await;

    let (status, body) = app.get_json(&format!("/comment/post/{}", post_id)).await;
    assert_eq!(status, 200);
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![first.as_str(), second.as_str()]);

    assert_eq!(app.get_json("/comment/missing").await.0, 404);
}

#[tokio::test]
async fn empty_comment_list_can_be_a_plain_success() {
    let app = spawn_app_with(|config| config.empty_comments_not_found = false).await;
    let alice = app.user("alice").await;
    let post_id = app.post_id(&alice).await;

    let (status, body) = app.get_json(&format!("/comment/post/{}", post_id)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"], json!([]));

    let (status, _) = app.get_json("/comment/post/unknown-post").await;
    assert_eq!(status, 404);
}
