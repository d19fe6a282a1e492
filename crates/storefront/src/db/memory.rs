//! In-memory repository backends.
//!
//! Used when no database is configured and by the test suites. Each table
//! sits behind a single async mutex, so check-then-insert sequences (unique
//! usernames, one token per account) are atomic just like their SQL
//! counterparts.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use online_store_core::{ApiToken, ProductId, TodoId, UserId, Username};

use super::{AccountRepository, ProductRepository, RepositoryError, TodoRepository};
use crate::models::{NewProduct, NewTodo, Product, ProductChanges, Todo, TodoChanges, User};

// =============================================================================
// Products
// =============================================================================

#[derive(Default)]
struct ProductTable {
    last_id: i32,
    rows: BTreeMap<ProductId, Product>,
}

/// In-memory product repository.
#[derive(Default)]
pub struct MemoryProductRepository {
    table: Mutex<ProductTable>,
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.table.lock().await.rows.values().cloned().collect())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.table.lock().await.rows.get(&id).cloned())
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let mut table = self.table.lock().await;
        table.last_id += 1;

        let now = Utc::now();
        let product = Product {
            id: ProductId::new(table.last_id),
            name: product.name().to_owned(),
            price: product.price(),
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(product.id, product.clone());

        Ok(product)
    }

    async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut table = self.table.lock().await;
        let Some(product) = table.rows.get_mut(&id) else {
            return Ok(None);
        };

        changes.apply_to(product);
        product.updated_at = Utc::now();

        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        Ok(self.table.lock().await.rows.remove(&id).is_some())
    }
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Default)]
struct AccountTable {
    last_id: i32,
    accounts: HashMap<Username, (User, String)>,
    tokens: HashMap<UserId, ApiToken>,
}

/// In-memory account repository.
#[derive(Default)]
pub struct MemoryAccountRepository {
    table: Mutex<AccountTable>,
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn create_user_with_token(
        &self,
        username: &Username,
        password_hash: &str,
        token: &ApiToken,
    ) -> Result<(User, ApiToken), RepositoryError> {
        let mut table = self.table.lock().await;
        if table.accounts.contains_key(username) {
            return Err(RepositoryError::Conflict(
                "username already exists".to_owned(),
            ));
        }

        table.last_id += 1;
        let user = User {
            id: UserId::new(table.last_id),
            username: username.clone(),
            created_at: Utc::now(),
        };
        table
            .accounts
            .insert(username.clone(), (user.clone(), password_hash.to_owned()));
        table.tokens.insert(user.id, token.clone());

        Ok((user, token.clone()))
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self.table.lock().await.accounts.get(username).cloned())
    }

    async fn get_or_create_token(
        &self,
        user_id: UserId,
        candidate: &ApiToken,
    ) -> Result<ApiToken, RepositoryError> {
        let mut table = self.table.lock().await;
        Ok(table
            .tokens
            .entry(user_id)
            .or_insert_with(|| candidate.clone())
            .clone())
    }

    async fn user_for_token(&self, token: &ApiToken) -> Result<Option<User>, RepositoryError> {
        let table = self.table.lock().await;
        let Some(user_id) = table
            .tokens
            .iter()
            .find_map(|(user_id, key)| (key == token).then_some(*user_id))
        else {
            return Ok(None);
        };

        Ok(table
            .accounts
            .values()
            .find(|(user, _)| user.id == user_id)
            .map(|(user, _)| user.clone()))
    }
}

// =============================================================================
// Todos
// =============================================================================

#[derive(Default)]
struct TodoTable {
    last_id: i32,
    rows: BTreeMap<TodoId, Todo>,
}

impl TodoTable {
    fn owned_mut(&mut self, owner: UserId, id: TodoId) -> Option<&mut Todo> {
        self.rows.get_mut(&id).filter(|todo| todo.owner == owner)
    }
}

/// In-memory todo repository.
#[derive(Default)]
pub struct MemoryTodoRepository {
    table: Mutex<TodoTable>,
}

#[async_trait]
impl TodoRepository for MemoryTodoRepository {
    async fn list(&self, owner: UserId) -> Result<Vec<Todo>, RepositoryError> {
        let table = self.table.lock().await;
        let mut todos: Vec<Todo> = table
            .rows
            .values()
            .filter(|todo| todo.owner == owner)
            .cloned()
            .collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(todos)
    }

    async fn create(&self, owner: UserId, todo: &NewTodo) -> Result<Todo, RepositoryError> {
        let mut table = self.table.lock().await;
        table.last_id += 1;

        let todo = Todo {
            id: TodoId::new(table.last_id),
            owner,
            content: todo.content().to_owned(),
            completed: todo.completed(),
            created_at: Utc::now(),
        };
        table.rows.insert(todo.id, todo.clone());

        Ok(todo)
    }

    async fn get(&self, owner: UserId, id: TodoId) -> Result<Option<Todo>, RepositoryError> {
        let table = self.table.lock().await;
        Ok(table
            .rows
            .get(&id)
            .filter(|todo| todo.owner == owner)
            .cloned())
    }

    async fn update(
        &self,
        owner: UserId,
        id: TodoId,
        changes: &TodoChanges,
    ) -> Result<Option<Todo>, RepositoryError> {
        let mut table = self.table.lock().await;
        Ok(table.owned_mut(owner, id).map(|todo| {
            changes.apply_to(todo);
            todo.clone()
        }))
    }

    async fn delete(&self, owner: UserId, id: TodoId) -> Result<bool, RepositoryError> {
        let mut table = self.table.lock().await;
        if table.owned_mut(owner, id).is_none() {
            return Ok(false);
        }
        Ok(table.rows.remove(&id).is_some())
    }

    async fn toggle(&self, owner: UserId, id: TodoId) -> Result<Option<Todo>, RepositoryError> {
        let mut table = self.table.lock().await;
        Ok(table.owned_mut(owner, id).map(|todo| {
            todo.completed = !todo.completed;
            todo.clone()
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use online_store_core::Price;

    use super::*;

    fn username(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    fn token(byte: u8) -> ApiToken {
        ApiToken::from_bytes(&[byte; ApiToken::BYTES])
    }

    #[tokio::test]
    async fn test_products_crud() {
        let repo = MemoryProductRepository::default();
        let created = repo
            .create(&NewProduct::new("TV", Price::parse("1200").unwrap()).unwrap())
            .await
            .unwrap();
        assert_eq!(created.id, ProductId::new(1));

        let changes = ProductChanges::new(Some("OLED TV"), None).unwrap();
        let updated = repo.update(created.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.name, "OLED TV");
        assert_eq!(updated.price, created.price);

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.get(created.id).await.unwrap().is_none());
        assert!(repo.update(created.id, &changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts_without_new_token() {
        let repo = MemoryAccountRepository::default();
        let (user, _) = repo
            .create_user_with_token(&username("alice"), "hash", &token(1))
            .await
            .unwrap();

        let err = repo
            .create_user_with_token(&username("alice"), "hash2", &token(2))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        assert!(repo.user_for_token(&token(2)).await.unwrap().is_none());
        assert_eq!(
            repo.user_for_token(&token(1)).await.unwrap().unwrap().id,
            user.id
        );
    }

    #[tokio::test]
    async fn test_get_or_create_token_keeps_first_token() {
        let repo = MemoryAccountRepository::default();
        let user_id = UserId::new(5);

        let first = repo.get_or_create_token(user_id, &token(1)).await.unwrap();
        let second = repo.get_or_create_token(user_id, &token(2)).await.unwrap();
        assert_eq!(first, token(1));
        assert_eq!(second, token(1));
    }

    #[tokio::test]
    async fn test_todos_are_owner_scoped() {
        let repo = MemoryTodoRepository::default();
        let alice = UserId::new(1);
        let bob = UserId::new(2);

        let todo = repo
            .create(alice, &NewTodo::new("buy milk", false).unwrap())
            .await
            .unwrap();

        assert!(repo.get(bob, todo.id).await.unwrap().is_none());
        assert!(repo.toggle(bob, todo.id).await.unwrap().is_none());
        assert!(!repo.delete(bob, todo.id).await.unwrap());
        assert!(repo.list(bob).await.unwrap().is_empty());

        assert!(repo.get(alice, todo.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_todos_listed_newest_first() {
        let repo = MemoryTodoRepository::default();
        let owner = UserId::new(1);
        for content in ["first", "second", "third"] {
            repo.create(owner, &NewTodo::new(content, false).unwrap())
                .await
                .unwrap();
        }

        let contents: Vec<String> = repo
            .list(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|todo| todo.content)
            .collect();
        assert_eq!(contents, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let repo = MemoryTodoRepository::default();
        let owner = UserId::new(1);
        let todo = repo
            .create(owner, &NewTodo::new("walk dog", false).unwrap())
            .await
            .unwrap();

        let once = repo.toggle(owner, todo.id).await.unwrap().unwrap();
        assert!(once.completed);
        let twice = repo.toggle(owner, todo.id).await.unwrap().unwrap();
        assert!(!twice.completed);
    }
}
