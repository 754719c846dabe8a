//! [`Product`] read model definition.
//!
//! [`Product`]: crate::domain::Product

pub mod list {
    //! [`Product`]s list definitions.

    use std::collections::{btree_map::Entry, BTreeMap};

    use serde_json::{Map, Value};

    #[cfg(doc)]
    use crate::domain::Product;
    use crate::domain::product::{self, Document, InvalidIdentifier};

    /// Equality filter selecting [`Product`]s.
    ///
    /// Fields of a [`Product`] having a textual representation are typed
    /// explicitly, while any other field name lands into the
    /// [`Filter::opaque`] bucket and is compared with its stored value as a
    /// plain string (so it never matches a numeric, boolean or missing one).
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub struct Filter {
        /// [`product::Id`] to select by.
        pub id: Option<product::Id>,

        /// Exact [`product::Name`] to select by.
        pub name: Option<String>,

        /// Exact [`product::Currency`] to select by.
        pub currency: Option<String>,

        /// Exact [`product::Vendor`] to select by.
        pub vendor: Option<String>,

        /// Other fields to select by, compared as opaque strings.
        pub opaque: BTreeMap<String, String>,
    }

    impl Filter {
        /// Name of the [`Filter::name`] field in a [`Document`].
        const NAME: &'static str = "product_name";

        /// Name of the [`Filter::currency`] field in a [`Document`].
        const CURRENCY: &'static str = "currency";

        /// Name of the [`Filter::vendor`] field in a [`Document`].
        const VENDOR: &'static str = "vendor";

        /// Builds a [`Filter`] out of the provided query parameters.
        ///
        /// Only the first value of a repeated parameter is taken into
        /// account.
        ///
        /// # Errors
        ///
        /// If the `_id` parameter is not a valid [`product::Id`].
        pub fn from_query<I, K, V>(query: I) -> Result<Self, InvalidIdentifier>
        where
            I: IntoIterator<Item = (K, V)>,
            K: Into<String>,
            V: Into<String>,
        {
            let mut firsts = BTreeMap::<String, String>::new();
            for (key, value) in query {
                if let Entry::Vacant(e) = firsts.entry(key.into()) {
                    _ = e.insert(value.into());
                }
            }

            Ok(Self {
                id: firsts
                    .remove(Document::ID_FIELD)
                    .map(|id| product::Id::parse(&id))
                    .transpose()?,
                name: firsts.remove(Self::NAME),
                currency: firsts.remove(Self::CURRENCY),
                vendor: firsts.remove(Self::VENDOR),
                opaque: firsts,
            })
        }

        /// Returns the equality constraints of this [`Filter`] over the
        /// [`product::Fields`] of a [`Document`].
        ///
        /// [`Filter::id`] is not included, as it's not a part of
        /// [`product::Fields`].
        #[must_use]
        pub fn fields(&self) -> Map<String, Value> {
            let Self {
                id: _,
                name,
                currency,
                vendor,
                opaque,
            } = self;

            [
                (Self::NAME, name),
                (Self::CURRENCY, currency),
                (Self::VENDOR, vendor),
            ]
            .into_iter()
            .filter_map(|(k, v)| Some((k.to_owned(), v.clone()?)))
            .chain(opaque.iter().map(|(k, v)| (k.clone(), v.clone())))
            .map(|(k, v)| (k, Value::String(v)))
            .collect()
        }

        /// Checks whether the provided [`Document`] in its raw JSON form
        /// matches this [`Filter`].
        #[must_use]
        pub fn matches(&self, id: product::Id, fields: &Value) -> bool {
            self.id.map_or(true, |expected| expected == id)
                && self
                    .fields()
                    .iter()
                    .all(|(k, v)| fields.get(k) == Some(v))
        }
    }

    #[cfg(test)]
    mod spec {
        use serde_json::json;

        use crate::domain::product;

        use super::Filter;

        #[test]
        fn takes_first_value_only() {
            let filter = Filter::from_query([
                ("vendor", "V"),
                ("vendor", "W"),
                ("color", "red"),
                ("color", "blue"),
            ])
            .unwrap();

            assert_eq!(filter.vendor.as_deref(), Some("V"));
            assert_eq!(
                filter.opaque.get("color").map(String::as_str),
                Some("red"),
            );
        }

        #[test]
        fn parses_identifier() {
            let id = product::Id::new();

            let filter =
                Filter::from_query([("_id", id.to_string())]).unwrap();

            assert_eq!(filter.id, Some(id));
            assert!(filter.fields().is_empty());
        }

        #[test]
        fn rejects_malformed_identifier() {
            let err = Filter::from_query([("_id", "zzz"), ("vendor", "V")])
                .unwrap_err();

            assert_eq!(err.input, "zzz");
        }

        #[test]
        fn passes_unknown_fields_through() {
            let filter =
                Filter::from_query([("vendor", "V"), ("extraneous", "X")])
                    .unwrap();

            let fields = filter.fields();
            assert_eq!(fields.len(), 2);
            assert_eq!(fields["vendor"], json!("V"));
            assert_eq!(fields["extraneous"], json!("X"));
        }

        #[test]
        fn compares_opaque_fields_as_strings() {
            let id = product::Id::new();
            let stored = json!({
                "product_name": "vivo",
                "price": 20,
                "currency": "USD",
                "vendor": "V",
                "is_essential": false,
            });

            let by_vendor = Filter::from_query([("vendor", "V")]).unwrap();
            assert!(by_vendor.matches(id, &stored));

            let by_price = Filter::from_query([("price", "20")]).unwrap();
            assert!(!by_price.matches(id, &stored));

            let by_other_id =
                Filter::from_query([("_id", product::Id::new().to_string())])
                    .unwrap();
            assert!(!by_other_id.matches(id, &stored));

            assert!(Filter::default().matches(id, &stored));
        }
    }
}
