//! Set-like operations on the JSON reference lists embedded in documents.

use sqlx::SqliteExecutor;

/// A reference list embedded in a document: which table and which column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefList {
    /// `users.posts`: posts owned by the user.
    UserPosts,
    /// `users.comments`: comments authored by the user.
    UserComments,
    /// `posts.comments`: comments attached to the post.
    PostComments,
    /// `posts.likes`: users who like the post.
    PostLikes,
    /// `comments.likes`: users who like the comment.
    CommentLikes,
}

impl RefList {
    fn table(self) -> &'static str {
        match self {
            RefList::UserPosts | RefList::UserComments => "users",
            RefList::PostComments | RefList::PostLikes => "posts",
            RefList::CommentLikes => "comments",
        }
    }

    fn column(self) -> &'static str {
        match self {
            RefList::UserPosts => "posts",
            RefList::UserComments | RefList::PostComments => "comments",
            RefList::PostLikes | RefList::CommentLikes => "likes",
        }
    }
}

/// Appends `id` to the list held by document `owner_id` unless it is already
/// present. Returns `true` if the list changed.
pub async fn push<'e>(
    db: impl SqliteExecutor<'e>,
    list: RefList,
    owner_id: &str,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let (table, column) = (list.table(), list.column());
    let sql = format!(
        "UPDATE {table} SET {column} = json_insert({column}, '$[#]', ?1) \
         WHERE id = ?2 \
           AND NOT EXISTS (SELECT 1 FROM json_each({table}.{column}) WHERE value = ?1)"
    );

    let result = sqlx::query(&sql).bind(id).bind(owner_id).execute(db).await?;
    Ok(result.rows_affected() > 0)
}

/// Removes `id` from the list held by document `owner_id`.
/// Returns `true` if the list changed.
pub async fn pull<'e>(
    db: impl SqliteExecutor<'e>,
    list: RefList,
    owner_id: &str,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let (table, column) = (list.table(), list.column());
    let sql = format!(
        "UPDATE {table} \
         SET {column} = (SELECT json_group_array(value) FROM json_each({table}.{column}) WHERE value <> ?1) \
         WHERE id = ?2 \
           AND EXISTS (SELECT 1 FROM json_each({table}.{column}) WHERE value = ?1)"
    );

    let result = sqlx::query(&sql).bind(id).bind(owner_id).execute(db).await?;
    Ok(result.rows_affected() > 0)
}

/// Removes `id` from this list in every document of the table.
/// Returns the number of documents changed.
pub async fn pull_everywhere<'e>(
    db: impl SqliteExecutor<'e>,
    list: RefList,
    id: &str,
) -> Result<u64, sqlx::Error> {
    let (table, column) = (list.table(), list.column());
    let sql = format!(
        "UPDATE {table} \
         SET {column} = (SELECT json_group_array(value) FROM json_each({table}.{column}) WHERE value <> ?1) \
         WHERE EXISTS (SELECT 1 FROM json_each({table}.{column}) WHERE value = ?1)"
    );

    let result = sqlx::query(&sql).bind(id).execute(db).await?;
    Ok(result.rows_affected())
}

/// Whether document `owner_id` holds `id` in this list.
pub async fn contains<'e>(
    db: impl SqliteExecutor<'e>,
    list: RefList,
    owner_id: &str,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let (table, column) = (list.table(), list.column());
    let sql = format!(
        "SELECT EXISTS ( \
           SELECT 1 FROM {table}, json_each({table}.{column}) \
           WHERE {table}.id = ?1 AND json_each.value = ?2 \
         )"
    );

    sqlx::query_scalar::<_, bool>(&sql)
        .bind(owner_id)
        .bind(id)
        .fetch_one(db)
        .await
}

/// Length of the list held by document `owner_id`, or `None` if the document
/// does not exist.
pub async fn len<'e>(
    db: impl SqliteExecutor<'e>,
    list: RefList,
    owner_id: &str,
) -> Result<Option<i64>, sqlx::Error> {
    let (table, column) = (list.table(), list.column());
    let sql = format!("SELECT json_array_length({column}) FROM {table} WHERE id = ?1");

    sqlx::query_scalar::<_, i64>(&sql)
        .bind(owner_id)
        .fetch_optional(db)
        .await
}
