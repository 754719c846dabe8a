//! [`Product`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use serde_json::Value;
use tracerr::Traced;

use crate::{
    domain::{
        product::{self, Document, Fields},
        Product,
    },
    infra::{
        database::{
            self,
            postgres::{Connection, Postgres},
        },
        Database,
    },
    read::product::list,
};

use super::decode_doc;

/// Encodes the provided [`Product`] into its stored document, without the
/// [`product::Id`].
fn encode(product: Product) -> Result<Value, Traced<database::Error>> {
    serde_json::to_value(Fields::from(product))
        .map_err(tracerr::from_and_wrap!(=> database::Error))
}

impl<C> Database<Select<By<Option<Document>, product::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Document>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Document>, product::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT doc \
            FROM products \
            WHERE id = $1::UUID";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| {
                Ok(Document {
                    id,
                    fields: decode_doc(&row).map_err(tracerr::wrap!())?,
                })
            })
            .transpose()
    }
}

impl<C> Database<Select<By<Vec<Document>, list::Filter>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Document>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Document>, list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let contained = Value::Object(filter.fields());

        const SQL: &str = "\
            SELECT id, doc \
            FROM products \
            WHERE ($1::UUID IS NULL OR id = $1::UUID) \
                  AND doc @> $2::JSONB \
            ORDER BY id";
        self.query(SQL, &[&filter.id, &contained])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                Ok(Document {
                    id: row.get("id"),
                    fields: decode_doc(&row).map_err(tracerr::wrap!())?,
                })
            })
            .collect()
    }
}

impl<C> Database<Insert<Product>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(product): Insert<Product>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = product.id;
        let doc = encode(product).map_err(tracerr::wrap!())?;

        const SQL: &str = "\
            INSERT INTO products (id, doc) \
            VALUES ($1::UUID, $2::JSONB)";
        self.exec(SQL, &[&id, &doc])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Update<Product>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(product): Update<Product>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = product.id;
        let doc = encode(product).map_err(tracerr::wrap!())?;

        const SQL: &str = "\
            UPDATE products \
            SET doc = $2::JSONB \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id, &doc])
            .await
            .map_err(tracerr::wrap!())
            .map(|updated| updated > 0)
    }
}

impl<C> Database<Delete<By<u64, product::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<u64, product::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM products \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id]).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Lock<By<Product, product::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Product, product::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: product::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM products \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
