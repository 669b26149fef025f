//! Schema-type templates: static, per-type configuration driving assembly.
//!
//! Each supported type is one immutable [`SchemaTemplate`] entry. Adding a
//! new type means adding one entry to [`TEMPLATES`]; the assembler never
//! grows type-specific branches.

use serde::{Serialize, Serializer};

use crate::error::Error;

/// Symbolic tag selecting a schema.org template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Organization,
    Service,
    PaymentCard,
    LoanOrCredit,
    BankAccount,
    FinancialProduct,
    BlogPosting,
}

impl SchemaType {
    pub const ALL: &'static [SchemaType] = &[
        SchemaType::Organization,
        SchemaType::Service,
        SchemaType::PaymentCard,
        SchemaType::LoanOrCredit,
        SchemaType::BankAccount,
        SchemaType::FinancialProduct,
        SchemaType::BlogPosting,
    ];

    /// The canonical snake_case tag for this type.
    pub fn tag(&self) -> &'static str {
        match self {
            SchemaType::Organization => "organization",
            SchemaType::Service => "service",
            SchemaType::PaymentCard => "payment_card",
            SchemaType::LoanOrCredit => "loan_or_credit",
            SchemaType::BankAccount => "bank_account",
            SchemaType::FinancialProduct => "financial_product",
            SchemaType::BlogPosting => "blog_posting",
        }
    }

    /// Parse a tag, accepting snake_case, kebab-case and CamelCase spellings.
    pub fn parse(tag: &str) -> Result<SchemaType, Error> {
        let key = normalize_tag(tag);
        SchemaType::ALL
            .iter()
            .copied()
            .find(|ty| ty.tag() == key)
            .ok_or_else(|| Error::UnsupportedSchemaType(tag.to_string()))
    }
}

impl Serialize for SchemaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

/// "PaymentCard" / "payment-card" / "payment_card" all normalize to
/// "payment_card".
fn normalize_tag(tag: &str) -> String {
    let mut key = String::with_capacity(tag.len() + 4);
    for (index, ch) in tag.trim().chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if index > 0 {
                key.push('_');
            }
            key.push(ch.to_ascii_lowercase());
        } else if ch == '-' {
            key.push('_');
        } else {
            key.push(ch);
        }
    }
    key
}

/// Which [`IntermediateRecord`](crate::IntermediateRecord) field feeds a
/// property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Display-name argument; falls back to the scraped title when the
    /// argument is empty.
    DisplayName,
    Description,
    /// First extracted image URL.
    PrimaryImage,
    PageUrl,
    Address,
    PriceHint,
    BodyText,
    /// Word count of the extracted body text.
    WordCount,
}

/// One property the template declares on the root entity, in output order.
#[derive(Debug, Clone, Copy)]
pub struct PropertySpec {
    pub name: &'static str,
    pub source: FieldSource,
    pub required: bool,
    /// Substituted when the source field is empty. A required property with
    /// no fallback and no value fails assembly.
    pub fallback: Option<&'static str>,
}

/// Defaults for the Offer entity attached to commercial types.
#[derive(Debug, Clone, Copy)]
pub struct OfferDefaults {
    pub price: &'static str,
    pub currency: &'static str,
    pub availability: &'static str,
    /// Days from today used for `priceValidUntil`.
    pub validity_days: i64,
}

const OFFER_DEFAULTS: OfferDefaults = OfferDefaults {
    price: "0",
    currency: "USD",
    availability: "https://schema.org/InStock",
    validity_days: 365,
};

/// Static definition for one supported schema type.
#[derive(Debug, Clone, Copy)]
pub struct SchemaTemplate {
    pub schema_type: SchemaType,
    /// schema.org `@type` of the root entity.
    pub root_type: &'static str,
    /// Fragment appended to the page URL to form the root `@id`.
    pub root_fragment: &'static str,
    /// Declared properties, in serialization order.
    pub properties: &'static [PropertySpec],
    /// Root properties that reference the Organization entity by `@id`.
    /// Empty when the root entity is the Organization itself.
    pub org_links: &'static [&'static str],
    pub offer: Option<OfferDefaults>,
    /// Whether a companion Product entity is emitted alongside the root.
    pub companion_product: bool,
    pub include_faq: bool,
}

const fn prop(
    name: &'static str,
    source: FieldSource,
    required: bool,
    fallback: Option<&'static str>,
) -> PropertySpec {
    PropertySpec {
        name,
        source,
        required,
        fallback,
    }
}

static TEMPLATES: &[SchemaTemplate] = &[
    SchemaTemplate {
        schema_type: SchemaType::Organization,
        root_type: "Organization",
        root_fragment: "#organization",
        properties: &[
            prop("name", FieldSource::DisplayName, true, None),
            prop("description", FieldSource::Description, false, None),
            prop("url", FieldSource::PageUrl, true, None),
            prop("logo", FieldSource::PrimaryImage, false, None),
            prop("address", FieldSource::Address, false, None),
        ],
        org_links: &[],
        offer: None,
        companion_product: false,
        include_faq: true,
    },
    SchemaTemplate {
        schema_type: SchemaType::Service,
        root_type: "Service",
        root_fragment: "#Service",
        properties: &[
            prop("name", FieldSource::DisplayName, true, None),
            prop(
                "description",
                FieldSource::Description,
                true,
                Some("Financial service offered online."),
            ),
            prop("serviceType", FieldSource::DisplayName, true, None),
            prop("image", FieldSource::PrimaryImage, false, None),
        ],
        org_links: &["provider"],
        offer: Some(OFFER_DEFAULTS),
        companion_product: false,
        include_faq: true,
    },
    SchemaTemplate {
        schema_type: SchemaType::PaymentCard,
        root_type: "PaymentCard",
        root_fragment: "#PaymentCard",
        properties: &[
            prop("name", FieldSource::DisplayName, true, None),
            prop("description", FieldSource::Description, false, None),
            prop("image", FieldSource::PrimaryImage, false, None),
        ],
        org_links: &["provider"],
        offer: Some(OFFER_DEFAULTS),
        companion_product: true,
        include_faq: true,
    },
    SchemaTemplate {
        schema_type: SchemaType::LoanOrCredit,
        root_type: "LoanOrCredit",
        root_fragment: "#LoanOrCredit",
        properties: &[
            prop("name", FieldSource::DisplayName, true, None),
            prop("description", FieldSource::Description, false, None),
            prop("loanType", FieldSource::DisplayName, true, None),
            prop("amount", FieldSource::PriceHint, false, None),
            prop("image", FieldSource::PrimaryImage, false, None),
        ],
        org_links: &["provider"],
        offer: Some(OFFER_DEFAULTS),
        companion_product: true,
        include_faq: true,
    },
    SchemaTemplate {
        schema_type: SchemaType::BankAccount,
        root_type: "BankAccount",
        root_fragment: "#BankAccount",
        properties: &[
            prop("name", FieldSource::DisplayName, true, None),
            prop("description", FieldSource::Description, false, None),
            prop("image", FieldSource::PrimaryImage, false, None),
        ],
        org_links: &["provider"],
        offer: Some(OFFER_DEFAULTS),
        companion_product: true,
        include_faq: true,
    },
    SchemaTemplate {
        schema_type: SchemaType::FinancialProduct,
        root_type: "FinancialProduct",
        root_fragment: "#FinancialProduct",
        properties: &[
            prop("name", FieldSource::DisplayName, true, None),
            prop("description", FieldSource::Description, false, None),
            prop("image", FieldSource::PrimaryImage, false, None),
        ],
        org_links: &["provider"],
        offer: Some(OFFER_DEFAULTS),
        companion_product: true,
        include_faq: true,
    },
    SchemaTemplate {
        schema_type: SchemaType::BlogPosting,
        root_type: "BlogPosting",
        root_fragment: "#BlogPosting",
        properties: &[
            prop("headline", FieldSource::DisplayName, true, None),
            prop("description", FieldSource::Description, false, None),
            prop("image", FieldSource::PrimaryImage, false, None),
            prop("articleBody", FieldSource::BodyText, false, None),
            prop("wordCount", FieldSource::WordCount, false, None),
        ],
        org_links: &["author", "publisher"],
        offer: None,
        companion_product: false,
        include_faq: false,
    },
];

/// Resolve a schema-type tag to its template.
///
/// This is the single validation gate protecting the assembler from unmapped
/// work; it is a pure function of static configuration.
pub fn resolve(tag: &str) -> Result<&'static SchemaTemplate, Error> {
    let schema_type = SchemaType::parse(tag)?;
    Ok(template_for(schema_type))
}

pub fn template_for(schema_type: SchemaType) -> &'static SchemaTemplate {
    TEMPLATES
        .iter()
        .find(|template| template.schema_type == schema_type)
        .expect("every SchemaType variant has a template entry")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_a_template() {
        for ty in SchemaType::ALL {
            let template = template_for(*ty);
            assert_eq!(template.schema_type, *ty);
            assert!(!template.root_type.is_empty());
            assert!(template.root_fragment.starts_with('#'));
        }
    }

    #[test]
    fn parse_accepts_camel_and_kebab_spellings() {
        assert_eq!(
            SchemaType::parse("PaymentCard").unwrap(),
            SchemaType::PaymentCard
        );
        assert_eq!(
            SchemaType::parse("payment-card").unwrap(),
            SchemaType::PaymentCard
        );
        assert_eq!(
            SchemaType::parse("payment_card").unwrap(),
            SchemaType::PaymentCard
        );
        assert_eq!(
            SchemaType::parse("blog_posting").unwrap(),
            SchemaType::BlogPosting
        );
    }

    #[test]
    fn parse_rejects_unknown_tags() {
        let err = SchemaType::parse("gizmo").unwrap_err();
        assert!(matches!(err, Error::UnsupportedSchemaType(ref tag) if tag == "gizmo"));
    }

    #[test]
    fn resolve_returns_matching_template() {
        let template = resolve("organization").unwrap();
        assert_eq!(template.root_type, "Organization");
        assert!(template.org_links.is_empty());
        assert!(resolve("gizmo").is_err());
    }

    #[test]
    fn name_like_property_is_required_everywhere() {
        // Every template leads with a required display-name property so an
        // assembled graph always carries a human-readable name.
        for ty in SchemaType::ALL {
            let template = template_for(*ty);
            let first = &template.properties[0];
            assert_eq!(first.source, FieldSource::DisplayName);
            assert!(first.required);
        }
    }

    #[test]
    fn service_description_cannot_fail_assembly() {
        // Required with a declared fallback: always present, never an error.
        let template = template_for(SchemaType::Service);
        let description = template
            .properties
            .iter()
            .find(|spec| spec.name == "description")
            .unwrap();
        assert!(description.required);
        assert!(description.fallback.is_some());
    }

    #[test]
    fn tags_round_trip_through_parse() {
        for ty in SchemaType::ALL {
            assert_eq!(SchemaType::parse(ty.tag()).unwrap(), *ty);
        }
    }
}
