//! Post, comment, and group authoring rules.

mod support;

use tidings::application::comments::CommentError;
use tidings::application::groups::{CreateGroupCommand, GroupError};
use tidings::application::posts::{CreatePostCommand, PostError, UpdatePostCommand};
use tidings::domain::error::DomainError;
use tidings::domain::types::{MediaRef, Viewer};
use uuid::Uuid;

use support::Harness;

#[tokio::test]
async fn edit_keeps_pub_date_and_replaces_content() {
    let app = Harness::uncached();
    let leo = app.author("leo").await;
    let cats = app.group("Cats").await;
    let post = app.publish(&leo, "draft text", None).await;

    let edited = app
        .posts
        .edit(
            Viewer::Authenticated(leo.id),
            UpdatePostCommand {
                id: post.id,
                group_id: Some(cats.id),
                text: "final text".to_string(),
                image: Some(MediaRef::new("posts/cat.png")),
            },
        )
        .await
        .expect("edit");

    assert_eq!(edited.pub_date, post.pub_date);
    assert_eq!(edited.text, "final text");
    assert_eq!(edited.group_id(), Some(cats.id));
    assert_eq!(edited.image.as_ref().map(MediaRef::as_str), Some("posts/cat.png"));
}

#[tokio::test]
async fn only_the_author_may_edit_or_delete() {
    let app = Harness::uncached();
    let leo = app.author("leo").await;
    let other = app.author("other").await;
    let post = app.publish(&leo, "mine", None).await;

    let edit = app
        .posts
        .edit(
            Viewer::Authenticated(other.id),
            UpdatePostCommand {
                id: post.id,
                group_id: None,
                text: "hijacked".to_string(),
                image: None,
            },
        )
        .await
        .expect_err("foreign edit");
    assert!(matches!(edit, PostError::Forbidden(id) if id == post.id));

    let delete = app
        .posts
        .delete(Viewer::Authenticated(other.id), post.id)
        .await
        .expect_err("foreign delete");
    assert!(matches!(delete, PostError::Forbidden(_)));

    assert_eq!(app.posts.find(post.id).await.expect("post").text, "mine");
}

#[tokio::test]
async fn post_text_and_group_are_validated() {
    let app = Harness::uncached();
    let leo = app.author("leo").await;
    let viewer = Viewer::Authenticated(leo.id);

    let empty = app
        .posts
        .create(
            viewer,
            CreatePostCommand {
                text: "   ".to_string(),
                ..Default::default()
            },
        )
        .await
        .expect_err("empty text");
    assert!(matches!(
        empty,
        PostError::Domain(DomainError::Validation { field: "text", .. })
    ));

    let unknown_group = app
        .posts
        .create(
            viewer,
            CreatePostCommand {
                group_id: Some(Uuid::new_v4()),
                text: "hello".to_string(),
                image: None,
            },
        )
        .await
        .expect_err("unknown group");
    assert!(matches!(
        unknown_group,
        PostError::Domain(DomainError::Validation { field: "group", .. })
    ));
}

#[tokio::test]
async fn editing_a_missing_post_is_not_found() {
    let app = Harness::uncached();
    let leo = app.author("leo").await;
    let id = Uuid::new_v4();

    let err = app
        .posts
        .delete(Viewer::Authenticated(leo.id), id)
        .await
        .expect_err("missing post");
    assert!(matches!(err, PostError::NotFound(missing) if missing == id));
}

#[tokio::test]
async fn comments_are_trimmed_and_bounded() {
    let app = Harness::uncached();
    let leo = app.author("leo").await;
    let post = app.publish(&leo, "topic", None).await;
    let viewer = Viewer::Authenticated(leo.id);

    let comment = app
        .comments
        .add(viewer, post.id, "  well said  ")
        .await
        .expect("comment");
    assert_eq!(comment.text, "well said");
    assert_eq!(comment.post_id, Some(post.id));

    let longest = "x".repeat(2000);
    app.comments
        .add(viewer, post.id, &longest)
        .await
        .expect("2000 characters fit");

    let too_long = app
        .comments
        .add(viewer, post.id, &"x".repeat(2001))
        .await
        .expect_err("too long");
    assert!(matches!(too_long, CommentError::Domain(_)));

    let blank = app
        .comments
        .add(viewer, post.id, " ")
        .await
        .expect_err("blank");
    assert!(matches!(blank, CommentError::Domain(_)));

    let unknown = app
        .comments
        .add(viewer, Uuid::new_v4(), "hello")
        .await
        .expect_err("unknown post");
    assert!(matches!(unknown, CommentError::UnknownPost(_)));

    assert_eq!(app.comments.list(post.id).await.expect("list").len(), 2);
}

#[tokio::test]
async fn group_slugs_are_derived_and_unique() {
    let app = Harness::uncached();

    let first = app.group("Cats & Dogs Club").await;
    let second = app.group("Cats & Dogs Club").await;
    assert_eq!(first.slug, "cats-dogs-club");
    assert_eq!(second.slug, "cats-dogs-club-2");

    let explicit = app
        .groups
        .create(CreateGroupCommand {
            title: "Birds".to_string(),
            slug: Some("cats-dogs-club".to_string()),
            description: Some("  feathers  ".to_string()),
        })
        .await
        .expect_err("taken slug");
    assert!(matches!(explicit, GroupError::SlugTaken(_)));

    let birds = app
        .groups
        .create(CreateGroupCommand {
            title: "Birds".to_string(),
            slug: Some("birds".to_string()),
            description: Some("  feathers  ".to_string()),
        })
        .await
        .expect("explicit slug");
    assert_eq!(birds.description.as_deref(), Some("feathers"));
    assert_eq!(
        app.groups.find_by_slug("birds").await.expect("lookup").id,
        birds.id
    );

    let slugs: Vec<String> = app
        .groups
        .list()
        .await
        .expect("list")
        .into_iter()
        .map(|group| group.slug)
        .collect();
    assert_eq!(slugs, vec!["birds", "cats-dogs-club", "cats-dogs-club-2"]);
}

#[tokio::test]
async fn group_titles_are_validated() {
    let app = Harness::uncached();

    let err = app
        .groups
        .create(CreateGroupCommand {
            title: "t".repeat(201),
            ..Default::default()
        })
        .await
        .expect_err("title too long");
    assert!(matches!(err, GroupError::Domain(_)));

    let bad_slug = app
        .groups
        .create(CreateGroupCommand {
            title: "Fine".to_string(),
            slug: Some("not a slug".to_string()),
            description: None,
        })
        .await
        .expect_err("invalid slug");
    assert!(matches!(bad_slug, GroupError::Slug(_)));
}

#[tokio::test]
async fn headline_is_first_fifteen_characters() {
    let app = Harness::uncached();
    let leo = app.author("leo").await;
    let post = app
        .publish(&leo, "The quick brown fox jumps over the lazy dog", None)
        .await;

    assert_eq!(post.headline(), "The quick brown");
}
