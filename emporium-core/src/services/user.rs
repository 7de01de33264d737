use crate::{
    Error, User, UserId, UserSummary,
    crypto::PasswordHasher,
    error::{AuthError, StorageError},
    pagination::{PageParam, PageResult, paginate},
    query::{build_search_spec, build_sort_spec},
    repositories::UserRepository,
    storage::NewUser,
    validation::{validate_email, validate_name, validate_password},
};
use std::sync::Arc;

/// Service for user management operations
///
/// Writes that fail in the store are logged and reported as `Ok(None)`, the
/// same as a missing user. Validation, password confirmation and duplicate
/// email checks are reported as typed errors.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new UserService with the given repository
    pub fn new(repository: Arc<R>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    /// List users, optionally filtered, sorted and paged.
    ///
    /// `search` and `sort` are raw `field:value` directives.
    pub async fn list_users(
        &self,
        search: Option<&str>,
        sort: Option<&str>,
        page_number: PageParam,
        page_size: PageParam,
    ) -> Result<PageResult, Error> {
        let search = build_search_spec(search);
        let sort = build_sort_spec(sort);

        let users = self.repository.find_all(&search, &sort).await?;
        Ok(paginate(users, page_number, page_size))
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<UserSummary>, Error> {
        Ok(self.repository.find_by_id(user_id).await?.map(UserSummary::from))
    }

    /// Register a new user with a password
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<Option<User>, Error> {
        validate_name(name)?;
        validate_email(email)?;
        validate_password(password)?;

        if password != password_confirm {
            return Err(AuthError::PasswordMismatch.into());
        }

        if self.repository.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailAlreadyRegistered.into());
        }

        let password_hash = self.hasher.hash(password).await?;
        let new_user = NewUser::builder()
            .id(UserId::new_random())
            .name(name.to_string())
            .email(email.to_string())
            .password_hash(password_hash)
            .build()?;

        match self.repository.create(new_user).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Created user");
                Ok(Some(user))
            }
            Err(e) => {
                tracing::error!(email = %email, error = %e, "Failed to create user");
                Ok(None)
            }
        }
    }

    /// Change a user's name and email
    pub async fn update_user(
        &self,
        user_id: &UserId,
        name: &str,
        email: &str,
    ) -> Result<Option<User>, Error> {
        validate_name(name)?;
        validate_email(email)?;

        let Some(mut user) = self.repository.find_by_id(user_id).await? else {
            return Ok(None);
        };

        if user.email != email {
            if let Some(other) = self.repository.find_by_email(email).await? {
                if other.id != user.id {
                    return Err(AuthError::EmailAlreadyRegistered.into());
                }
            }
        }

        user.name = name.to_string();
        user.email = email.to_string();

        match self.repository.update(&user).await {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to update user");
                Ok(None)
            }
        }
    }

    /// Delete a user
    pub async fn delete_user(&self, user_id: &UserId) -> Result<Option<UserId>, Error> {
        match self.repository.delete(user_id).await {
            Ok(()) => {
                tracing::info!(user_id = %user_id, "Deleted user");
                Ok(Some(user_id.clone()))
            }
            Err(Error::Storage(StorageError::NotFound)) => Ok(None),
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to delete user");
                Ok(None)
            }
        }
    }

    /// Change a user's password after checking the current one
    pub async fn change_password(
        &self,
        user_id: &UserId,
        password_old: &str,
        password_new: &str,
        password_confirm: &str,
    ) -> Result<Option<UserId>, Error> {
        validate_password(password_new)?;

        if password_new != password_confirm {
            return Err(AuthError::PasswordMismatch.into());
        }

        let Some(user) = self.repository.find_by_id(user_id).await? else {
            return Ok(None);
        };
        let Some(credentials) = self.repository.find_credentials_by_email(&user.email).await?
        else {
            return Ok(None);
        };

        if !self
            .hasher
            .verify(password_old, &credentials.password_hash)
            .await?
        {
            return Err(AuthError::WrongPassword.into());
        }

        let new_hash = self.hasher.hash(password_new).await?;
        match self.repository.set_password_hash(user_id, &new_hash).await {
            Ok(()) => {
                tracing::info!(user_id = %user_id, "Changed password");
                Ok(Some(user_id.clone()))
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to change password");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ValidationError,
        query::{SearchSpec, SortSpec},
        storage::UserCredentials,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Stores users in a Vec and can be told to fail every write.
    #[derive(Default)]
    struct MockUserRepository {
        users: Mutex<Vec<(User, String)>>,
        fail_writes: AtomicBool,
    }

    impl MockUserRepository {
        fn check_writable(&self) -> Result<(), Error> {
            if self.fail_writes.load(Ordering::SeqCst) {
                Err(StorageError::Database("disk full".to_string()).into())
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_all(
            &self,
            search: &SearchSpec,
            sort: &SortSpec,
        ) -> Result<Vec<User>, Error> {
            let mut users: Vec<User> = self
                .users
                .lock()
                .unwrap()
                .iter()
                .map(|(u, _)| u.clone())
                .filter(|u| search.matches(u))
                .collect();
            users.sort_by(|a, b| sort.compare(a, b));
            Ok(users)
        }

        async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|(u, _)| &u.id == id).map(|(u, _)| u.clone()))
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
            let users = self.users.lock().unwrap();
            Ok(users
                .iter()
                .find(|(u, _)| u.email == email)
                .map(|(u, _)| u.clone()))
        }

        async fn find_credentials_by_email(
            &self,
            email: &str,
        ) -> Result<Option<UserCredentials>, Error> {
            let users = self.users.lock().unwrap();
            Ok(users
                .iter()
                .find(|(u, _)| u.email == email)
                .map(|(u, h)| UserCredentials {
                    user: u.clone(),
                    password_hash: h.clone(),
                }))
        }

        async fn create(&self, user: NewUser) -> Result<User, Error> {
            self.check_writable()?;
            let created = User::builder()
                .id(user.id)
                .name(user.name)
                .email(user.email)
                .build()?;
            self.users
                .lock()
                .unwrap()
                .push((created.clone(), user.password_hash));
            Ok(created)
        }

        async fn update(&self, user: &User) -> Result<User, Error> {
            self.check_writable()?;
            let mut users = self.users.lock().unwrap();
            let entry = users
                .iter_mut()
                .find(|(u, _)| u.id == user.id)
                .ok_or(StorageError::NotFound)?;
            entry.0 = user.clone();
            Ok(user.clone())
        }

        async fn delete(&self, id: &UserId) -> Result<(), Error> {
            self.check_writable()?;
            let mut users = self.users.lock().unwrap();
            let before = users.len();
            users.retain(|(u, _)| &u.id != id);
            if users.len() == before {
                return Err(StorageError::NotFound.into());
            }
            Ok(())
        }

        async fn set_password_hash(&self, id: &UserId, hash: &str) -> Result<(), Error> {
            self.check_writable()?;
            let mut users = self.users.lock().unwrap();
            let entry = users
                .iter_mut()
                .find(|(u, _)| &u.id == id)
                .ok_or(StorageError::NotFound)?;
            entry.1 = hash.to_string();
            Ok(())
        }
    }

    /// Cheap reversible "hash" so tests stay fast.
    struct PlainHasher;

    #[async_trait]
    impl PasswordHasher for PlainHasher {
        async fn hash(&self, plain: &str) -> Result<String, Error> {
            Ok(format!("plain:{plain}"))
        }

        async fn verify(&self, plain: &str, digest: &str) -> Result<bool, Error> {
            Ok(digest == format!("plain:{plain}"))
        }
    }

    fn service() -> (UserService<MockUserRepository>, Arc<MockUserRepository>) {
        let repo = Arc::new(MockUserRepository::default());
        (UserService::new(repo.clone(), Arc::new(PlainHasher)), repo)
    }

    async fn create(service: &UserService<MockUserRepository>, name: &str, email: &str) -> User {
        service
            .create_user(name, email, "rahasia123", "rahasia123")
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let (service, repo) = service();
        let user = create(&service, "Budi", "budi@example.com").await;

        let creds = repo
            .find_credentials_by_email("budi@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.user.id, user.id);
        assert_eq!(creds.password_hash, "plain:rahasia123");
    }

    #[tokio::test]
    async fn test_create_user_rejections() {
        let (service, _repo) = service();
        create(&service, "Budi", "budi@example.com").await;

        let err = service
            .create_user("Ani", "ani@example.com", "rahasia123", "rahasia124")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::PasswordMismatch)));

        let err = service
            .create_user("Budi 2", "budi@example.com", "rahasia123", "rahasia123")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::EmailAlreadyRegistered)));

        let err = service
            .create_user("Ani", "not-an-email", "rahasia123", "rahasia123")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::InvalidEmail(_))));
    }

    #[tokio::test]
    async fn test_store_failure_is_no_result() {
        let (service, repo) = service();
        let user = create(&service, "Budi", "budi@example.com").await;
        repo.fail_writes.store(true, Ordering::SeqCst);

        let created = service
            .create_user("Ani", "ani@example.com", "rahasia123", "rahasia123")
            .await
            .unwrap();
        assert!(created.is_none());

        let updated = service
            .update_user(&user.id, "Budi S", "budi@example.com")
            .await
            .unwrap();
        assert!(updated.is_none());

        assert!(service.delete_user(&user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_users_filters_sorts_and_pages() {
        let (service, _repo) = service();
        for (name, email) in [
            ("Citra", "citra@example.com"),
            ("Ani", "ani@example.com"),
            ("Budi", "budi@example.com"),
            ("Daniel", "daniel@mail.id"),
        ] {
            create(&service, name, email).await;
        }

        let page = service
            .list_users(
                Some("email:example"),
                Some("name:desc"),
                PageParam::Valid(1),
                PageParam::Valid(2),
            )
            .await
            .unwrap();

        let names: Vec<&str> = page.data.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Citra", "Budi"]);
        assert_eq!(page.total_pages, Some(2));
        assert!(page.has_next_page);

        let all = service
            .list_users(None, None, PageParam::Unspecified, PageParam::Unspecified)
            .await
            .unwrap();
        let emails: Vec<&str> = all.data.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(
            emails,
            vec![
                "ani@example.com",
                "budi@example.com",
                "citra@example.com",
                "daniel@mail.id"
            ]
        );
    }

    #[tokio::test]
    async fn test_update_user() {
        let (service, _repo) = service();
        let budi = create(&service, "Budi", "budi@example.com").await;
        create(&service, "Ani", "ani@example.com").await;

        let updated = service
            .update_user(&budi.id, "Budi Santoso", "budi@mail.id")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Budi Santoso");

        let err = service
            .update_user(&budi.id, "Budi", "ani@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::EmailAlreadyRegistered)));

        let missing = service
            .update_user(&UserId::new_random(), "X", "x@example.com")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let (service, _repo) = service();
        let user = create(&service, "Budi", "budi@example.com").await;

        assert_eq!(service.delete_user(&user.id).await.unwrap(), Some(user.id.clone()));
        assert!(service.get_user(&user.id).await.unwrap().is_none());
        assert!(service.delete_user(&user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_change_password() {
        let (service, repo) = service();
        let user = create(&service, "Budi", "budi@example.com").await;

        let err = service
            .change_password(&user.id, "salah123", "baru12345", "baru12345")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::WrongPassword)));

        let err = service
            .change_password(&user.id, "rahasia123", "baru12345", "baru12346")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::PasswordMismatch)));

        let changed = service
            .change_password(&user.id, "rahasia123", "baru12345", "baru12345")
            .await
            .unwrap();
        assert_eq!(changed, Some(user.id.clone()));

        let creds = repo
            .find_credentials_by_email("budi@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.password_hash, "plain:baru12345");

        let missing = service
            .change_password(&UserId::new_random(), "rahasia123", "baru12345", "baru12345")
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
