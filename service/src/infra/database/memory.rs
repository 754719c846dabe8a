//! In-memory [`Database`] implementation.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use derive_more::{Display, Error as StdError};
use serde_json::Value;
use tracerr::Traced;

use crate::{
    domain::{
        product::{self, Document, Fields},
        user, Product, User,
    },
    infra::{database, Database},
    read::product::list,
};

/// In-memory [`Database`] holding its collections in the process memory.
///
/// Clones share the same collections. Transactions are not isolated:
/// [`Transact`] returns the same [`Memory`], and [`Commit`] does nothing.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<Mutex<Collections>>);

/// Collections of a [`Memory`] database.
#[derive(Debug, Default)]
struct Collections {
    /// Registered [`User`]s.
    users: HashMap<user::Id, User>,

    /// Raw [`Product`] documents without their [`product::Id`]s.
    products: BTreeMap<product::Id, Value>,
}

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored [`User`]s.
    #[must_use]
    pub fn users_count(&self) -> usize {
        self.collections().users.len()
    }

    /// Returns the raw stored document of the [`Product`] with the provided
    /// [`product::Id`], if any.
    #[must_use]
    pub fn raw_product(&self, id: product::Id) -> Option<Value> {
        self.collections().products.get(&id).cloned()
    }

    /// Stores the provided raw document as the [`Product`] with the provided
    /// [`product::Id`], without any validation.
    pub fn put_raw_product(&self, id: product::Id, doc: Value) {
        drop(self.collections().products.insert(id, doc));
    }

    /// Locks the [`Collections`] of this [`Memory`] database.
    ///
    /// Never held across an `.await` point.
    fn collections(&self) -> MutexGuard<'_, Collections> {
        // Every mutation is a single map operation, so a poisoned lock still
        // guards consistent data.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Uniqueness constraint of a collection is violated.
    #[display("Uniqueness constraint violated")]
    UniqueViolation,
}

/// Decodes the provided raw document of a [`Product`].
fn decode(
    id: product::Id,
    doc: Value,
) -> Result<Document, Traced<database::Error>> {
    Ok(Document {
        id,
        fields: serde_json::from_value(doc)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?,
    })
}

/// Encodes the provided [`Product`] into a raw document.
fn encode(product: Product) -> Result<Value, Traced<database::Error>> {
    serde_json::to_value(Fields::from(product))
        .map_err(tracerr::from_and_wrap!(=> database::Error))
}

impl Database<Select<By<Option<User>, user::Login>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let login = by.into_inner();
        Ok(self
            .collections()
            .users
            .values()
            .find(|u| u.login == login)
            .cloned())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut collections = self.collections();
        if collections.users.values().any(|u| u.login == user.login) {
            return Err(tracerr::new!(database::Error::from(
                Error::UniqueViolation
            )));
        }
        drop(collections.users.insert(user.id, user));
        Ok(())
    }
}

impl Database<Select<By<Option<Document>, product::Id>>> for Memory {
    type Ok = Option<Document>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Document>, product::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.raw_product(id)
            .map(|doc| decode(id, doc))
            .transpose()
            .map_err(tracerr::wrap!())
    }
}

impl Database<Select<By<Vec<Document>, list::Filter>>> for Memory {
    type Ok = Vec<Document>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Document>, list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let matched = self
            .collections()
            .products
            .iter()
            .filter(|(id, doc)| filter.matches(**id, doc))
            .map(|(id, doc)| (*id, doc.clone()))
            .collect::<Vec<_>>();

        matched
            .into_iter()
            .map(|(id, doc)| decode(id, doc))
            .collect::<Result<_, _>>()
            .map_err(tracerr::wrap!())
    }
}

impl Database<Insert<Product>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(product): Insert<Product>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = product.id;
        let doc = encode(product).map_err(tracerr::wrap!())?;

        let mut collections = self.collections();
        if collections.products.contains_key(&id) {
            return Err(tracerr::new!(database::Error::from(
                Error::UniqueViolation
            )));
        }
        drop(collections.products.insert(id, doc));
        Ok(())
    }
}

impl Database<Update<Product>> for Memory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(product): Update<Product>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = product.id;
        let doc = encode(product).map_err(tracerr::wrap!())?;

        let mut collections = self.collections();
        let Some(stored) = collections.products.get_mut(&id) else {
            return Ok(false);
        };
        *stored = doc;
        Ok(true)
    }
}

impl Database<Delete<By<u64, product::Id>>> for Memory {
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<u64, product::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.collections().products.remove(&id).map_or(0, |_| 1))
    }
}

impl Database<Lock<By<Product, product::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Product, product::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Delete, Insert, Select, Update};
    use serde_json::json;

    use crate::{
        domain::{
            product::{self, Document, Fields},
            user, Product, User,
        },
        infra::Database as _,
        read::product::list::Filter,
    };

    use super::Memory;

    fn user(login: &str) -> User {
        User {
            id: user::Id::new(),
            login: user::Login::new(login).unwrap(),
            password_hash: "$argon2id$stub".to_owned().into(),
        }
    }

    fn product(vendor: &str) -> Product {
        Product::validate(
            product::Id::new(),
            Fields {
                name: "A".into(),
                price: 10,
                currency: "USD".into(),
                vendor: vendor.into(),
                ..Fields::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn keeps_logins_unique() {
        let db = Memory::new();

        db.execute(Insert(user("a@b.com"))).await.unwrap();
        let err = db.execute(Insert(user("a@b.com"))).await.unwrap_err();

        assert!(err.as_ref().is_unique_login_violation());
        assert_eq!(db.users_count(), 1);
    }

    #[tokio::test]
    async fn selects_user_by_login() {
        let db = Memory::new();
        let stored = user("a@b.com");
        db.execute(Insert(stored.clone())).await.unwrap();

        let found = db
            .execute(Select(By::<Option<User>, _>::new(
                user::Login::new("a@b.com").unwrap(),
            )))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, stored.id);

        assert!(db
            .execute(Select(By::<Option<User>, _>::new(
                user::Login::new("c@d.com").unwrap(),
            )))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn filters_products() {
        let db = Memory::new();
        let first = product("V");
        let second = product("W");
        db.execute(Insert(first.clone())).await.unwrap();
        db.execute(Insert(second.clone())).await.unwrap();

        let all = db
            .execute(Select(By::<Vec<Document>, _>::new(Filter::default())))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let by_vendor = db
            .execute(Select(By::<Vec<Document>, _>::new(
                Filter::from_query([("vendor", "W")]).unwrap(),
            )))
            .await
            .unwrap();
        assert_eq!(by_vendor, vec![Document::from(second)]);
    }

    #[tokio::test]
    async fn updates_existing_only() {
        let db = Memory::new();
        let stored = product("V");

        assert!(!db.execute(Update(stored.clone())).await.unwrap());

        db.execute(Insert(stored.clone())).await.unwrap();
        let updated = Product {
            discount: 5,
            ..stored
        };
        assert!(db.execute(Update(updated.clone())).await.unwrap());

        let found = db
            .execute(Select(By::<Option<Document>, _>::new(updated.id)))
            .await
            .unwrap();
        assert_eq!(found, Some(Document::from(updated)));
    }

    #[tokio::test]
    async fn deletes_by_id() {
        let db = Memory::new();
        let stored = product("V");
        db.execute(Insert(stored.clone())).await.unwrap();

        let deleted = db
            .execute(Delete(By::<u64, _>::new(stored.id)))
            .await
            .unwrap();
        assert_eq!(deleted, 1);

        let deleted = db
            .execute(Delete(By::<u64, _>::new(stored.id)))
            .await
            .unwrap();
        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn reports_undecodable_document() {
        let db = Memory::new();
        let id = product::Id::new();
        db.put_raw_product(id, json!({"price": "cheap"}));

        let err = db
            .execute(Select(By::<Option<Document>, _>::new(id)))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            crate::infra::database::Error::Decode(_),
        ));
    }
}
