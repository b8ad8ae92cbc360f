// Problem lookup collaborator: where the judge reads problems from

use crate::error::StoreError;
use async_trait::async_trait;
use proctor_common::types::Problem;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[async_trait]
pub trait ProblemStore: Send + Sync {
    /// `Ok(None)` means the id is unknown
    async fn get_problem(&self, id: &str) -> Result<Option<Problem>, StoreError>;

    async fn list_problem_ids(&self) -> Result<Vec<String>, StoreError>;
}

/// Process-local store, used by the CLI and in tests
#[derive(Default)]
pub struct InMemoryProblemStore {
    problems: RwLock<HashMap<String, Problem>>,
}

impl InMemoryProblemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_problems(problems: impl IntoIterator<Item = Problem>) -> Self {
        let problems = problems
            .into_iter()
            .map(|problem| (problem.id.clone(), problem))
            .collect();
        Self {
            problems: RwLock::new(problems),
        }
    }

    pub async fn insert(&self, problem: Problem) {
        self.problems.write().await.insert(problem.id.clone(), problem);
    }
}

#[async_trait]
impl ProblemStore for InMemoryProblemStore {
    async fn get_problem(&self, id: &str) -> Result<Option<Problem>, StoreError> {
        Ok(self.problems.read().await.get(id).cloned())
    }

    async fn list_problem_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut ids: Vec<String> = self.problems.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// Redis-backed catalogue (see `proctor_common::redis` for the key layout)
#[derive(Clone)]
pub struct RedisProblemStore {
    conn: redis::aio::ConnectionManager,
}

impl RedisProblemStore {
    pub fn new(conn: redis::aio::ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ProblemStore for RedisProblemStore {
    async fn get_problem(&self, id: &str) -> Result<Option<Problem>, StoreError> {
        let mut conn = self.conn.clone();
        Ok(proctor_common::redis::get_problem(&mut conn, id).await?)
    }

    async fn list_problem_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        Ok(proctor_common::redis::list_problem_ids(&mut conn).await?)
    }
}
