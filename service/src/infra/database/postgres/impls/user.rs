//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use serde::{Deserialize, Serialize};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{
            self,
            postgres::{Connection, Postgres},
        },
        Database,
    },
};

use super::decode_doc;

/// [`User`] document as stored in the `users` collection.
#[derive(Deserialize, Serialize)]
struct Doc {
    /// [`user::Login`] of the [`User`].
    username: user::Login,

    /// [`user::PasswordHash`] of the [`User`].
    password: user::PasswordHash,
}

impl<C> Database<Select<By<Option<User>, user::Login>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let login = by.into_inner();

        const SQL: &str = "\
            SELECT id, doc \
            FROM users \
            WHERE doc->>'username' = $1::VARCHAR \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[&login])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let Doc { username, password } =
            decode_doc(&row).map_err(tracerr::wrap!())?;
        Ok(Some(User {
            id: row.get("id"),
            login: username,
            password_hash: password,
        }))
    }
}

impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            login,
            password_hash,
        } = user;
        let doc = serde_json::to_value(Doc {
            username: login,
            password: password_hash,
        })
        .map_err(tracerr::from_and_wrap!(=> database::Error))?;

        const SQL: &str = "\
            INSERT INTO users (id, doc) \
            VALUES ($1::UUID, $2::JSONB)";
        self.exec(SQL, &[&id, &doc])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
