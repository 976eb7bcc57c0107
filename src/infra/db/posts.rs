use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageWindow;
use crate::application::repos::{
    CreatePostParams, PostListScope, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::{PostGroupRef, PostRecord};
use crate::domain::types::MediaRef;

use super::{PostgresRepositories, map_sqlx_error};

const POST_SELECT: &str = "SELECT p.id, p.seq, p.author_id, a.username AS author_username, \
    p.group_id, g.slug AS group_slug, g.title AS group_title, \
    p.text, p.image, p.pub_date, p.updated_at \
    FROM posts p \
    INNER JOIN authors a ON a.id = p.author_id \
    LEFT JOIN post_groups g ON g.id = p.group_id";

const FEED_ORDER: &str = " ORDER BY p.pub_date DESC, p.seq DESC";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    seq: i64,
    author_id: Uuid,
    author_username: String,
    group_id: Option<Uuid>,
    group_slug: Option<String>,
    group_title: Option<String>,
    text: String,
    image: Option<String>,
    pub_date: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        let group = match (row.group_id, row.group_slug, row.group_title) {
            (Some(id), Some(slug), Some(title)) => Some(PostGroupRef { id, slug, title }),
            _ => None,
        };

        Self {
            id: row.id,
            seq: row.seq,
            author_id: row.author_id,
            author_username: row.author_username,
            group,
            text: row.text,
            image: row.image.map(MediaRef::from),
            pub_date: row.pub_date,
            updated_at: row.updated_at,
        }
    }
}

impl PostgresRepositories {
    async fn fetch_post(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(POST_SELECT);
        qb.push(" WHERE p.id = ");
        qb.push_bind(id);

        let row = qb
            .build_query_as::<PostRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_posts(
        &self,
        scope: PostListScope,
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(POST_SELECT);
        Self::apply_scope(&mut qb, scope);
        qb.push(FEED_ORDER);
        Self::apply_window(&mut qb, window)?;

        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn count_posts(&self, scope: PostListScope) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts p");
        Self::apply_scope(&mut qb, scope);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        self.fetch_post(id).await
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO posts (id, author_id, group_id, text, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(params.author_id)
        .bind(params.group_id)
        .bind(params.text)
        .bind(params.image.map(MediaRef::into_inner))
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        self.fetch_post(id).await?.ok_or(RepoError::NotFound)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let updated: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE posts
            SET group_id = $2, text = $3, image = $4, updated_at = now()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(params.id)
        .bind(params.group_id)
        .bind(params.text)
        .bind(params.image.map(MediaRef::into_inner))
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let id = updated.ok_or(RepoError::NotFound)?;
        self.fetch_post(id).await?.ok_or(RepoError::NotFound)
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();

        if deleted == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
