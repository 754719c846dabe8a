//! [`Command`] for creating a new [`User`].

use common::operations::{By, Insert, Select};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Login, Password};
use crate::{
    domain::{user, User},
    infra::{database, hasher::HashingError, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Debug)]
pub struct CreateUser {
    /// [`Login`] of a new [`User`].
    pub login: user::Login,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Login>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = user::Id;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser { login, password } = cmd;

        let existing = self
            .database()
            .execute(Select(By::new(login.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::DuplicateUser(login)));
        }

        let user = User {
            id: user::Id::new(),
            login: login.clone(),
            password_hash: self
                .hasher()
                .hash(password.expose_secret())
                .map_err(tracerr::from_and_wrap!(=> E))?,
        };
        let id = user.id;

        // The check above is not atomic with the insertion.
        match self.database().execute(Insert(user)).await {
            Ok(()) => Ok(id),
            Err(e) if e.as_ref().is_unique_login_violation() => {
                Err(tracerr::new!(E::DuplicateUser(login)))
            }
            Err(e) => Err(e).map_err(tracerr::map_from_and_wrap!(=> E)),
        }
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] with the same [`Login`] already exists.
    #[display("`User` with `{_0}` login already exists")]
    #[from(ignore)]
    DuplicateUser(#[error(not(source))] user::Login),

    /// [`Password`] hashing failed.
    #[display("{_0}")]
    Hashing(HashingError),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};
    use secrecy::SecretBox;
    use tracerr::Traced;

    use crate::{
        command::Command as _,
        domain::{
            user::{self, Password},
            User,
        },
        infra::{database, Database, Memory},
        spec::{service, service_over},
    };

    use super::{CreateUser, ExecutionError};

    /// [`Memory`] database whose [`User`] lookups never see any [`User`], as
    /// if a concurrent registration wasn't committed yet.
    #[derive(Debug, Default)]
    struct Lagging(Memory);

    impl Database<Select<By<Option<User>, user::Login>>> for Lagging {
        type Ok = Option<User>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            _: Select<By<Option<User>, user::Login>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(None)
        }
    }

    impl Database<Insert<User>> for Lagging {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            insert: Insert<User>,
        ) -> Result<Self::Ok, Self::Err> {
            self.0.execute(insert).await
        }
    }

    fn cmd(login: &str, password: &str) -> CreateUser {
        CreateUser {
            login: user::Login::new(login).unwrap(),
            password: SecretBox::new(Box::new(
                Password::new(password).unwrap(),
            )),
        }
    }

    #[tokio::test]
    async fn registers_user() {
        let service = service();

        let first =
            service.execute(cmd("a@b.com", "12345678")).await.unwrap();
        let second =
            service.execute(cmd("c@d.com", "12345678")).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(service.database().users_count(), 2);
    }

    #[tokio::test]
    async fn rejects_duplicate_login() {
        let service = service();

        drop(service.execute(cmd("a@b.com", "12345678")).await.unwrap());
        let err = service
            .execute(cmd("a@b.com", "other-password"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::DuplicateUser(login) if login.as_ref() == "a@b.com",
        ));
        assert_eq!(service.database().users_count(), 1);
    }

    #[tokio::test]
    async fn stores_only_password_hash() {
        let service = service();

        let id = service.execute(cmd("a@b.com", "12345678")).await.unwrap();

        let stored = service
            .database()
            .execute(Select(By::<Option<User>, _>::new(
                user::Login::new("a@b.com").unwrap(),
            )))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, id);
        assert_ne!(stored.password_hash.as_ref(), "12345678");
        assert!(service.hasher().verify(
            &stored.password_hash,
            &Password::new("12345678").unwrap(),
        ));
    }

    #[tokio::test]
    async fn rejects_duplicate_login_violating_uniqueness() {
        let service = service_over(Lagging::default());

        drop(service.execute(cmd("a@b.com", "12345678")).await.unwrap());
        let err = service
            .execute(cmd("a@b.com", "other-password"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::DuplicateUser(login) if login.as_ref() == "a@b.com",
        ));
        assert_eq!(service.database().0.users_count(), 1);
    }
}
