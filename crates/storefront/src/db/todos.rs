//! Todo repository.
//!
//! Every query carries the owner in its predicate. A todo that exists but
//! belongs to someone else is indistinguishable from one that does not exist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use online_store_core::{TodoId, UserId};

use super::RepositoryError;
use crate::models::{NewTodo, Todo, TodoChanges};

/// Owner-scoped todo storage.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// The owner's todos, newest first.
    async fn list(&self, owner: UserId) -> Result<Vec<Todo>, RepositoryError>;

    /// Insert a todo stamped with `owner`.
    async fn create(&self, owner: UserId, todo: &NewTodo) -> Result<Todo, RepositoryError>;

    /// One of the owner's todos.
    async fn get(&self, owner: UserId, id: TodoId) -> Result<Option<Todo>, RepositoryError>;

    /// Apply a partial update to one of the owner's todos.
    async fn update(
        &self,
        owner: UserId,
        id: TodoId,
        changes: &TodoChanges,
    ) -> Result<Option<Todo>, RepositoryError>;

    /// Delete one of the owner's todos. Returns `false` if there was none.
    async fn delete(&self, owner: UserId, id: TodoId) -> Result<bool, RepositoryError>;

    /// Invert the completed flag of one of the owner's todos.
    async fn toggle(&self, owner: UserId, id: TodoId) -> Result<Option<Todo>, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct TodoRow {
    id: TodoId,
    owner_id: UserId,
    content: String,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            owner: row.owner_id,
            content: row.content,
            completed: row.completed,
            created_at: row.created_at,
        }
    }
}

/// `PostgreSQL`-backed todo repository.
#[derive(Clone)]
pub struct PgTodoRepository {
    pool: PgPool,
}

impl PgTodoRepository {
    /// Create a new todo repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoRepository for PgTodoRepository {
    async fn list(&self, owner: UserId) -> Result<Vec<Todo>, RepositoryError> {
        let rows = sqlx::query_as::<_, TodoRow>(
            r"
            SELECT id, owner_id, content, completed, created_at
            FROM store.todo
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn create(&self, owner: UserId, todo: &NewTodo) -> Result<Todo, RepositoryError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r"
            INSERT INTO store.todo (owner_id, content, completed)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, content, completed, created_at
            ",
        )
        .bind(owner)
        .bind(todo.content())
        .bind(todo.completed())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get(&self, owner: UserId, id: TodoId) -> Result<Option<Todo>, RepositoryError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r"
            SELECT id, owner_id, content, completed, created_at
            FROM store.todo
            WHERE id = $1 AND owner_id = $2
            ",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Todo::from))
    }

    async fn update(
        &self,
        owner: UserId,
        id: TodoId,
        changes: &TodoChanges,
    ) -> Result<Option<Todo>, RepositoryError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r"
            UPDATE store.todo
            SET content = COALESCE($3, content),
                completed = COALESCE($4, completed)
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, content, completed, created_at
            ",
        )
        .bind(id)
        .bind(owner)
        .bind(changes.content())
        .bind(changes.completed())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Todo::from))
    }

    async fn delete(&self, owner: UserId, id: TodoId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM store.todo WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn toggle(&self, owner: UserId, id: TodoId) -> Result<Option<Todo>, RepositoryError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r"
            UPDATE store.todo
            SET completed = NOT completed
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, content, completed, created_at
            ",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Todo::from))
    }
}
