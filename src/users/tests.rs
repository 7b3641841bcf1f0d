//! Tests for users module

#[cfg(test)]
mod tests {
    use super::super::*;
    use std::sync::Arc;

    use crate::common::ApiError;
    use crate::repositories::memory::InMemoryUserRepository;
    use crate::repositories::{RepositoryError, UserRepository};
    use models::NewUser;
    use services::{normalize_paging, UserService, UserServiceError, MAX_LIMIT};

    async fn seeded_service(count: usize) -> (UserService, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        for i in 1..=count {
            repo.save(NewUser {
                name: format!("User {}", i),
                email: format!("user{}@example.com", i),
                password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA".to_string(),
            })
            .await
            .unwrap();
        }
        (UserService::new(repo.clone()), repo)
    }

    #[test]
    fn test_normalize_paging_defaults_and_bounds() {
        assert_eq!(normalize_paging(None, None), (1, 10));
        assert_eq!(normalize_paging(Some(0), Some(0)), (1, 1));
        assert_eq!(normalize_paging(Some(-3), Some(-5)), (1, 1));
        assert_eq!(normalize_paging(Some(4), Some(1000)), (4, MAX_LIMIT));
        assert_eq!(normalize_paging(Some(2), Some(25)), (2, 25));
    }

    #[tokio::test]
    async fn test_get_profile() {
        let (service, _) = seeded_service(1).await;

        let user = service.get_profile(1).await.unwrap();
        assert_eq!(user.email, "user1@example.com");
        assert!(user.password_hash.is_empty());

        assert!(matches!(
            service.get_profile(42).await,
            Err(UserServiceError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_get_all_users_paginates() {
        let (service, _) = seeded_service(25).await;

        let page = service.get_all_users(Some(2), Some(10), None).await.unwrap();

        assert_eq!(page.total, 25);
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 10);
        assert_eq!(page.users.len(), 10);
        assert_eq!(page.users[0].name, "User 11");
        assert_eq!(page.users[9].name, "User 20");

        let last = service.get_all_users(Some(3), Some(10), None).await.unwrap();
        assert_eq!(last.users.len(), 5);

        let beyond = service.get_all_users(Some(9), Some(10), None).await.unwrap();
        assert!(beyond.users.is_empty());
        assert_eq!(beyond.total, 25);
    }

    #[tokio::test]
    async fn test_get_all_users_search_is_trimmed_case_insensitive_prefix() {
        let (service, repo) = seeded_service(3).await;
        repo.save(NewUser {
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: "x".to_string(),
        })
        .await
        .unwrap();

        let page = service
            .get_all_users(None, None, Some("  adm  "))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.users[0].email, "admin@example.com");

        let blank = service.get_all_users(None, None, Some("   ")).await.unwrap();
        assert_eq!(blank.total, 4);
    }

    #[tokio::test]
    async fn test_get_all_users_huge_page_is_empty() {
        let (service, _) = seeded_service(3).await;

        let page = service
            .get_all_users(Some(i64::MAX), Some(MAX_LIMIT), None)
            .await
            .unwrap();

        assert!(page.users.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.page, i64::MAX);
    }

    #[tokio::test]
    async fn test_listed_users_never_expose_password_hash() {
        let (service, _) = seeded_service(3).await;

        let page = service.get_all_users(None, None, None).await.unwrap();
        assert!(page.users.iter().all(|u| u.password_hash.is_empty()));

        let json = serde_json::to_value(&page).unwrap();
        let first = &json["users"][0];
        assert!(first.get("password_hash").is_none());
        assert!(first.get("password").is_none());
        assert_eq!(first["email"], "user1@example.com");
        assert_eq!(json["total"], 3);
    }

    #[test]
    fn test_user_serialization_skips_hash_even_when_present() {
        let now = chrono::Utc::now();
        let user = User {
            id: 7,
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            email_verified_at: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("email_verified_at"));
    }

    #[test]
    fn test_user_service_errors_map_to_api_errors() {
        assert!(matches!(
            ApiError::from(UserServiceError::UserNotFound),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(UserServiceError::from(RepositoryError::Database(
                sqlx::Error::PoolClosed
            ))),
            ApiError::DatabaseError(_)
        ));
        assert!(matches!(
            UserServiceError::from(RepositoryError::NotFound),
            UserServiceError::UserNotFound
        ));
    }
}
