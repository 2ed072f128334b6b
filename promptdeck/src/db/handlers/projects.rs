//! Database repository for projects.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::projects::{ProjectCreateDBRequest, ProjectDBResponse, ProjectUpdateDBRequest},
};
use crate::types::{ProjectId, UserId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing projects.
///
/// Results come back newest first; `by_name` switches to alphabetical order
/// (the playground's default selection).
#[derive(Debug, Clone)]
pub struct ProjectFilter {
    pub user_id: UserId,
    pub skip: i64,
    pub limit: i64,
    pub order_by_name: bool,
}

impl ProjectFilter {
    pub fn new(user_id: UserId, skip: i64, limit: i64) -> Self {
        Self {
            user_id,
            skip,
            limit,
            order_by_name: false,
        }
    }

    pub fn by_name(mut self) -> Self {
        self.order_by_name = true;
        self
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Project {
    pub id: ProjectId,
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectDBResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            user_id: project.user_id,
            name: project.name,
            description: project.description,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

pub struct Projects<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Projects<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Projects<'c> {
    type CreateRequest = ProjectCreateDBRequest;
    type UpdateRequest = ProjectUpdateDBRequest;
    type Response = ProjectDBResponse;
    type Id = ProjectId;
    type Filter = ProjectFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let now = Utc::now();
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (id, user_id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(now)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(ProjectDBResponse::from(project))
    }

    #[instrument(skip(self), fields(project_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(project.map(ProjectDBResponse::from))
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let order = if filter.order_by_name { "name ASC" } else { "created_at DESC" };
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT * FROM projects WHERE user_id = $1 ORDER BY {order} LIMIT $2 OFFSET $3"
        ))
        .bind(filter.user_id)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(projects.into_iter().map(ProjectDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(project_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(project_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(Utc::now())
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(ProjectDBResponse::from(project))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::users::Users;
    use crate::db::models::users::UserCreateDBRequest;
    use sqlx::SqlitePool;

    async fn seed_user(pool: &SqlitePool) -> UserId {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        users
            .create(&UserCreateDBRequest {
                email: format!("user-{}@example.com", Uuid::new_v4().simple()),
                display_name: None,
                is_admin: false,
                password_hash: None,
            })
            .await
            .unwrap()
            .id
    }

    fn request(user_id: UserId, name: &str) -> ProjectCreateDBRequest {
        ProjectCreateDBRequest {
            user_id,
            name: name.to_string(),
            description: "a project".to_string(),
        }
    }

    #[test_log::test(sqlx::test)]
    async fn test_create_and_get_project(pool: SqlitePool) {
        let user_id = seed_user(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut projects = Projects::new(&mut conn);

        let created = projects.create(&request(user_id, "Support Bot")).await.unwrap();
        assert_eq!(created.name, "Support Bot");
        assert_eq!(created.user_id, user_id);

        let fetched = projects.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
    }

    #[test_log::test(sqlx::test)]
    async fn test_list_orders_and_scopes_to_owner(pool: SqlitePool) {
        let user_a = seed_user(&pool).await;
        let user_b = seed_user(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut projects = Projects::new(&mut conn);

        projects.create(&request(user_a, "alpha")).await.unwrap();
        projects.create(&request(user_a, "zeta")).await.unwrap();
        projects.create(&request(user_b, "beta")).await.unwrap();

        // Default: newest first
        let listed = projects.list(&ProjectFilter::new(user_a, 0, 100)).await.unwrap();
        let names: Vec<_> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);

        // Playground's default selection asks for name order
        let listed = projects.list(&ProjectFilter::new(user_a, 0, 100).by_name()).await.unwrap();
        let names: Vec<_> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test_log::test(sqlx::test)]
    async fn test_update_partial_fields(pool: SqlitePool) {
        let user_id = seed_user(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut projects = Projects::new(&mut conn);

        let created = projects.create(&request(user_id, "before")).await.unwrap();
        let updated = projects
            .update(
                created.id,
                &ProjectUpdateDBRequest {
                    name: Some("after".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "after");
        assert_eq!(updated.description, created.description);
    }

    #[test_log::test(sqlx::test)]
    async fn test_update_missing_project_not_found(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut projects = Projects::new(&mut conn);

        let err = projects
            .update(
                Uuid::new_v4(),
                &ProjectUpdateDBRequest {
                    name: Some("x".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[test_log::test(sqlx::test)]
    async fn test_delete_project(pool: SqlitePool) {
        let user_id = seed_user(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut projects = Projects::new(&mut conn);

        let created = projects.create(&request(user_id, "doomed")).await.unwrap();
        assert!(projects.delete(created.id).await.unwrap());
        assert!(projects.get_by_id(created.id).await.unwrap().is_none());
        assert!(!projects.delete(created.id).await.unwrap());
    }
}
