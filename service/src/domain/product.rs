//! [`Product`] definitions.

use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Product of the catalog, with every field validated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Product {
    /// ID of this [`Product`].
    pub id: Id,

    /// [`Name`] of this [`Product`].
    pub name: Name,

    /// [`Price`] of this [`Product`].
    pub price: Price,

    /// [`Currency`] of the [`Price`].
    pub currency: Currency,

    /// Discount of this [`Product`].
    pub discount: i64,

    /// [`Vendor`] of this [`Product`].
    pub vendor: Vendor,

    /// Accessories shipped along with this [`Product`].
    pub accessories: Vec<String>,

    /// Indicator whether this [`Product`] is an essential one.
    pub is_essential: bool,
}

impl Product {
    /// Validates the provided [`Fields`] into a [`Product`] with the provided
    /// [`Id`].
    ///
    /// # Errors
    ///
    /// With the first [`ValidationError`] encountered, if any.
    pub fn validate(id: Id, fields: Fields) -> Result<Self, ValidationError> {
        use ValidationError as E;

        let Fields {
            name,
            price,
            currency,
            discount,
            vendor,
            accessories,
            is_essential,
        } = fields;

        Ok(Self {
            id,
            name: Name::new(name).ok_or(E::Name)?,
            price: Price::new(price).ok_or(E::Price)?,
            currency: Currency::new(currency).ok_or(E::Currency)?,
            discount,
            vendor: Vendor::new(vendor).ok_or(E::Vendor)?,
            accessories,
            is_essential,
        })
    }
}

/// ID of a [`Product`], assigned on creation and never changed afterwards.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an [`Id`] from its string representation.
    ///
    /// # Errors
    ///
    /// If the `input` is not a valid [`Id`] representation.
    pub fn parse(input: &str) -> Result<Self, InvalidIdentifier> {
        input.parse().map_err(|_| InvalidIdentifier {
            input: input.to_owned(),
        })
    }
}

/// Error of parsing an [`Id`].
#[derive(Clone, Debug, Display, Error)]
#[display("`{input}` is not a valid `Product` identifier")]
pub struct InvalidIdentifier {
    /// Input failed to be parsed.
    pub input: String,
}

/// Name of a [`Product`].
#[derive(AsRef, Clone, Debug, Display, Eq, Into, PartialEq)]
#[as_ref(str)]
pub struct Name(String);

impl Name {
    /// Maximum length of a [`Name`] in characters.
    pub const MAX_LEN: usize = 10;

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        !name.is_empty() && name.chars().count() <= Self::MAX_LEN
    }
}

/// Price of a [`Product`] in units of its [`Currency`].
#[derive(Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd)]
pub struct Price(u8);

impl Price {
    /// Maximum allowed [`Price`].
    pub const MAX: u8 = 200;

    /// Creates a new [`Price`] if the given `amount` is positive and doesn't
    /// exceed the [`Price::MAX`].
    #[must_use]
    pub fn new(amount: i64) -> Option<Self> {
        u8::try_from(amount)
            .ok()
            .filter(|a| (1..=Self::MAX).contains(a))
            .map(Self)
    }
}

/// Currency code of a [`Price`].
#[derive(AsRef, Clone, Debug, Display, Eq, Into, PartialEq)]
#[as_ref(str)]
pub struct Currency(String);

impl Currency {
    /// Length of a [`Currency`] code in characters.
    pub const LEN: usize = 3;

    /// Creates a new [`Currency`] if the given `code` is valid.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        (code.chars().count() == Self::LEN).then_some(Self(code))
    }
}

/// Vendor of a [`Product`].
#[derive(AsRef, Clone, Debug, Display, Eq, Into, PartialEq)]
#[as_ref(str)]
pub struct Vendor(String);

impl Vendor {
    /// Creates a new [`Vendor`] if the given `name` is not empty.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (!name.is_empty()).then_some(Self(name))
    }
}

/// Error of [`Product`] validation.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum ValidationError {
    /// Invalid [`Name`].
    #[display("`product_name` is required and must be at most 10 characters")]
    Name,

    /// Invalid [`Price`].
    #[display("`price` is required and must be between 1 and 200")]
    Price,

    /// Invalid [`Currency`].
    #[display("`currency` is required and must be exactly 3 characters")]
    Currency,

    /// Invalid [`Vendor`].
    #[display("`vendor` is required")]
    Vendor,
}

/// Unvalidated fields of a [`Product`], as they're stored and transferred.
///
/// Missing fields take their zero values, the same way a blank field does,
/// so required ones are caught by [`Product::validate()`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Fields {
    /// Name of a [`Product`].
    #[serde(rename = "product_name")]
    pub name: String,

    /// Price of a [`Product`].
    pub price: i64,

    /// Currency code of a [`Product`] price.
    pub currency: String,

    /// Discount of a [`Product`].
    pub discount: i64,

    /// Vendor of a [`Product`].
    pub vendor: String,

    /// Accessories of a [`Product`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accessories: Vec<String>,

    /// Indicator whether a [`Product`] is an essential one.
    pub is_essential: bool,
}

impl Fields {
    /// Overlays the provided raw JSON `payload` on top of these [`Fields`].
    ///
    /// Only the top-level members present in the `payload` are overwritten,
    /// with `null` resetting a field to its zero value. The `_id` member is
    /// ignored, since an [`Id`] never changes.
    ///
    /// # Errors
    ///
    /// If the `payload` is not a JSON object, or any of its members has an
    /// unexpected type.
    pub fn merge(self, payload: &[u8]) -> Result<Self, serde_json::Error> {
        let overlay: Map<String, Value> = serde_json::from_slice(payload)?;
        let mut merged: Map<String, Value> =
            serde_json::from_value(serde_json::to_value(self)?)?;

        for (field, value) in overlay {
            if field == Document::ID_FIELD {
                continue;
            }
            if value.is_null() {
                drop(merged.remove(&field));
            } else {
                drop(merged.insert(field, value));
            }
        }

        serde_json::from_value(Value::Object(merged))
    }
}

impl From<Product> for Fields {
    fn from(product: Product) -> Self {
        let Product {
            id: _,
            name,
            price,
            currency,
            discount,
            vendor,
            accessories,
            is_essential,
        } = product;

        Self {
            name: name.into(),
            price: u8::from(price).into(),
            currency: currency.into(),
            discount,
            vendor: vendor.into(),
            accessories,
            is_essential,
        }
    }
}

/// [`Product`] as held by a document store, not necessarily valid.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Document {
    /// ID of the [`Product`].
    #[serde(rename = "_id")]
    pub id: Id,

    /// [`Fields`] of the [`Product`].
    #[serde(flatten)]
    pub fields: Fields,
}

impl Document {
    /// Name of the [`Id`] field in a [`Document`].
    pub const ID_FIELD: &'static str = "_id";
}

impl From<Product> for Document {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            fields: product.into(),
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{Fields, Id, Price, Product, ValidationError};

    fn fields() -> Fields {
        Fields {
            name: "A".into(),
            price: 10,
            currency: "USD".into(),
            discount: 0,
            vendor: "V".into(),
            accessories: vec!["charger".into()],
            is_essential: false,
        }
    }

    #[test]
    fn validates_required_fields() {
        let id = Id::new();

        assert!(Product::validate(id, fields()).is_ok());

        assert_eq!(
            Product::validate(
                id,
                Fields {
                    name: String::new(),
                    ..fields()
                },
            ),
            Err(ValidationError::Name),
        );
        assert_eq!(
            Product::validate(
                id,
                Fields {
                    name: "ElevenChars".into(),
                    ..fields()
                },
            ),
            Err(ValidationError::Name),
        );
        assert_eq!(
            Product::validate(
                id,
                Fields {
                    currency: "US".into(),
                    ..fields()
                },
            ),
            Err(ValidationError::Currency),
        );
        assert_eq!(
            Product::validate(
                id,
                Fields {
                    vendor: String::new(),
                    ..fields()
                },
            ),
            Err(ValidationError::Vendor),
        );
    }

    #[test]
    fn price_is_positive_and_bounded() {
        assert!(Price::new(0).is_none());
        assert!(Price::new(-5).is_none());
        assert!(Price::new(1).is_some());
        assert!(Price::new(200).is_some());
        assert!(Price::new(201).is_none());
        assert!(Price::new(i64::MAX).is_none());
    }

    #[test]
    fn parses_id() {
        let id = Id::new();

        assert_eq!(Id::parse(&id.to_string()).unwrap(), id);
        assert_eq!(Id::parse("nope").unwrap_err().input, "nope");
    }

    #[test]
    fn deserializes_missing_fields_as_zero_values() {
        let fields: Fields =
            serde_json::from_str(r#"{"product_name":"vivo"}"#).unwrap();

        assert_eq!(
            fields,
            Fields {
                name: "vivo".into(),
                ..Fields::default()
            },
        );
    }

    #[test]
    fn merge_overwrites_present_fields_only() {
        let merged = fields().merge(br#"{"price":20}"#).unwrap();

        assert_eq!(
            merged,
            Fields {
                price: 20,
                ..fields()
            },
        );
    }

    #[test]
    fn merge_resets_nulls_and_ignores_id() {
        let merged = fields()
            .merge(br#"{"_id":"whatever","accessories":null,"extra":1}"#)
            .unwrap();

        assert_eq!(
            merged,
            Fields {
                accessories: vec![],
                ..fields()
            },
        );
    }

    #[test]
    fn merge_rejects_malformed_payload() {
        assert!(fields().merge(b"[1, 2]").is_err());
        assert!(fields().merge(b"not json").is_err());
        assert!(fields().merge(br#"{"price":"cheap"}"#).is_err());
    }
}
