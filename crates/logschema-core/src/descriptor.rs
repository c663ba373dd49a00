//! The `log_schema` descriptor attached to run and task logs.
//!
//! A descriptor declares where the schema of a `structured_log` lives
//! (`schema_uri`), which well-known format it follows, the media type of the
//! content and an optional schema version for compatibility negotiation.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::DescriptorError;

/// Media type assumed when a descriptor does not declare one.
pub const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// Well-known structured log formats.
///
/// Unknown wire values are preserved as [`LogFormat::Unrecognized`] so that
/// descriptor self-validation can report them instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogFormat {
    /// W3C PROV / Open Provenance Model graph.
    Opm,
    /// Workflow Run RO-Crate (JSON-LD).
    RoCrate,
    /// Generic JSON Schema.
    JsonSchema,
    /// Any other producer-defined format.
    Custom,
    /// A wire value outside the enumerated formats, kept verbatim.
    ///
    /// Produced by `From<String>`. A known identifier wrapped here by hand is
    /// still treated as that format by [`LogSchema::validate`].
    Unrecognized(String),
}

impl LogFormat {
    /// Wire identifier of the format.
    pub fn as_str(&self) -> &str {
        match self {
            LogFormat::Opm => "opm",
            LogFormat::RoCrate => "ro-crate",
            LogFormat::JsonSchema => "json-schema",
            LogFormat::Custom => "custom",
            LogFormat::Unrecognized(raw) => raw,
        }
    }

    /// Re-reads the wire identifier, turning a hand-wrapped known identifier
    /// into its enumerated variant.
    pub fn canonical(&self) -> LogFormat {
        LogFormat::from(self.as_str())
    }

    /// Whether this is one of the enumerated formats.
    pub fn is_known(&self) -> bool {
        !matches!(self, LogFormat::Unrecognized(_))
    }
}

impl From<String> for LogFormat {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "opm" => LogFormat::Opm,
            "ro-crate" => LogFormat::RoCrate,
            "json-schema" => LogFormat::JsonSchema,
            "custom" => LogFormat::Custom,
            _ => LogFormat::Unrecognized(raw),
        }
    }
}

impl From<&str> for LogFormat {
    fn from(raw: &str) -> Self {
        LogFormat::from(raw.to_string())
    }
}

impl From<LogFormat> for String {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes the shape of `structured_log` content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogSchema {
    /// Resolvable URI of the schema definition,
    /// e.g. `https://www.w3.org/TR/prov-o/` for OPM.
    #[serde(default)]
    pub schema_uri: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_format_as_none"
    )]
    pub format: Option<LogFormat>,

    /// MIME type of the content. Defaults to [`DEFAULT_MEDIA_TYPE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    /// Lets clients handle backward-incompatible schema changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
}

impl LogSchema {
    pub fn new(schema_uri: impl Into<String>) -> Self {
        Self {
            schema_uri: schema_uri.into(),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<LogFormat>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_schema_version(mut self, version: impl Into<String>) -> Self {
        self.schema_version = Some(version.into());
        self
    }

    /// Structural check of the descriptor itself.
    ///
    /// # Errors
    ///
    /// - `DescriptorError::MissingUri`: `schema_uri` is empty.
    /// - `DescriptorError::InvalidUriScheme`: `schema_uri` is not an
    ///   absolute `http://` or `https://` URI.
    /// - `DescriptorError::UnknownFormat`: `format` is set to a value outside
    ///   the enumerated formats.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.schema_uri.is_empty() {
            return Err(DescriptorError::MissingUri);
        }
        if !has_http_scheme(&self.schema_uri) {
            return Err(DescriptorError::InvalidUriScheme {
                uri: self.schema_uri.clone(),
            });
        }
        match &self.format {
            Some(format) if !format.canonical().is_known() => Err(DescriptorError::UnknownFormat {
                format: format.as_str().to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// The declared media type, or `application/json` when none is set.
    pub fn media_type_or_default(&self) -> &str {
        self.media_type
            .as_deref()
            .filter(|mt| !mt.is_empty())
            .unwrap_or(DEFAULT_MEDIA_TYPE)
    }
}

/// True when `value` starts with an `http://` or `https://` scheme prefix.
pub(crate) fn has_http_scheme(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn empty_format_as_none<'de, D>(deserializer: D) -> Result<Option<LogFormat>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(LogFormat::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_opm_schema() {
        let schema = LogSchema::new("https://www.w3.org/TR/prov-o/").with_format(LogFormat::Opm);
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_valid_ro_crate_schema() {
        let schema = LogSchema::new("https://w3id.org/ro/crate/1.1").with_format(LogFormat::RoCrate);
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_missing_schema_uri() {
        let schema = LogSchema::default().with_format(LogFormat::Opm);
        assert_eq!(schema.validate(), Err(DescriptorError::MissingUri));
    }

    #[test]
    fn test_relative_schema_uri_rejected() {
        for uri in ["/relative/path", "ftp://example.com/schema", "example.com/schema"] {
            let err = LogSchema::new(uri).validate().unwrap_err();
            match err {
                DescriptorError::InvalidUriScheme { uri: got } => assert_eq!(got, uri),
                other => panic!("Expected InvalidUriScheme, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_unknown_format_rejected() {
        let schema = LogSchema::new("https://example.com/schema").with_format("not-a-format");
        match schema.validate().unwrap_err() {
            DescriptorError::UnknownFormat { format } => assert_eq!(format, "not-a-format"),
            other => panic!("Expected UnknownFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_wrapped_known_identifier_is_valid() {
        let schema = LogSchema::new("https://www.w3.org/TR/prov-o/")
            .with_format(LogFormat::Unrecognized("opm".to_string()));
        assert!(schema.validate().is_ok());

        let schema = LogSchema::new("https://www.w3.org/TR/prov-o/")
            .with_format(LogFormat::Unrecognized("OPM".to_string()));
        assert!(schema.validate().is_err());

        assert_eq!(LogFormat::Unrecognized("ro-crate".to_string()).canonical(), LogFormat::RoCrate);
    }

    #[test]
    fn test_every_known_format_and_unset_is_valid() {
        let formats = [
            None,
            Some(LogFormat::Opm),
            Some(LogFormat::RoCrate),
            Some(LogFormat::JsonSchema),
            Some(LogFormat::Custom),
        ];
        for format in formats {
            let schema = LogSchema {
                format: format.clone(),
                ..LogSchema::new("http://example.com/schema")
            };
            assert!(schema.validate().is_ok(), "format {:?} should be valid", format);
        }
    }

    #[test]
    fn test_media_type_or_default() {
        let schema = LogSchema::new("https://example.com/schema");
        assert_eq!(schema.media_type_or_default(), "application/json");

        let schema = schema.with_media_type("application/ld+json");
        assert_eq!(schema.media_type_or_default(), "application/ld+json");

        let schema = LogSchema::new("https://example.com/schema").with_media_type("");
        assert_eq!(schema.media_type_or_default(), DEFAULT_MEDIA_TYPE);
    }

    #[test]
    fn test_format_wire_values() {
        assert_eq!(LogFormat::from("opm"), LogFormat::Opm);
        assert_eq!(LogFormat::from("ro-crate"), LogFormat::RoCrate);
        assert_eq!(LogFormat::from("json-schema"), LogFormat::JsonSchema);
        assert_eq!(LogFormat::from("custom"), LogFormat::Custom);
        assert_eq!(
            LogFormat::from("cwlprov"),
            LogFormat::Unrecognized("cwlprov".to_string())
        );
        assert_eq!(LogFormat::RoCrate.to_string(), "ro-crate");
    }

    #[test]
    fn test_schema_serde_omits_empty_fields() {
        let schema = LogSchema::new("https://w3id.org/ro/crate/1.1");
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value, json!({ "schema_uri": "https://w3id.org/ro/crate/1.1" }));

        let schema = schema
            .with_format(LogFormat::RoCrate)
            .with_media_type("application/ld+json")
            .with_schema_version("1.1");
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["format"], json!("ro-crate"));
        assert_eq!(value["media_type"], json!("application/ld+json"));
        assert_eq!(value["schema_version"], json!("1.1"));
    }

    #[test]
    fn test_schema_deserialize_keeps_unknown_format() {
        let schema: LogSchema = serde_json::from_value(json!({
            "schema_uri": "https://example.com/schema",
            "format": "bogus"
        }))
        .unwrap();
        assert_eq!(schema.format, Some(LogFormat::Unrecognized("bogus".to_string())));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_schema_deserialize_empty_format_is_unset() {
        let schema: LogSchema = serde_json::from_value(json!({
            "schema_uri": "https://example.com/schema",
            "format": ""
        }))
        .unwrap();
        assert_eq!(schema.format, None);
        assert!(schema.validate().is_ok());
    }
}
