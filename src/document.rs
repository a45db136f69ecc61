//! Document payload submitted through the gate.
//!
//! Field names follow the document API's JSON contract: mostly snake_case,
//! with a couple of camelCase keys. Dates are sent as `yyyy-MM-dd`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A goods introduction document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub description: Description,
    pub doc_id: String,
    pub doc_status: String,
    pub doc_type: DocType,
    #[serde(rename = "importRequest")]
    pub import_request: bool,
    pub owner_inn: String,
    pub participant_inn: String,
    pub producer_inn: String,
    pub production_date: NaiveDate,
    pub production_type: String,
    #[serde(default)]
    pub products: Vec<Product>,
    pub reg_date: String,
    pub reg_number: String,
}

/// Participant description block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(rename = "participantInn")]
    pub participant_inn: String,
}

/// A single product line of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub certificate_document: String,
    pub certificate_document_date: NaiveDate,
    pub certificate_document_number: String,
    pub owner_inn: String,
    pub producer_inn: String,
    pub production_date: NaiveDate,
    pub tnved_code: String,
    pub uit_code: String,
    pub uitu_code: String,
}

/// Document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocType {
    LpIntroduceGoods,
}

impl Document {
    /// Encode the document as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a document from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::Value;

    pub(crate) fn sample_document() -> Document {
        let date = NaiveDate::from_ymd_opt(2020, 1, 23).unwrap();
        Document {
            description: Description {
                participant_inn: "7700000000".to_string(),
            },
            doc_id: "doc-1".to_string(),
            doc_status: "DRAFT".to_string(),
            doc_type: DocType::LpIntroduceGoods,
            import_request: true,
            owner_inn: "7700000001".to_string(),
            participant_inn: "7700000000".to_string(),
            producer_inn: "7700000002".to_string(),
            production_date: date,
            production_type: "OWN_PRODUCTION".to_string(),
            products: vec![Product {
                certificate_document: "CONFORMITY_CERTIFICATE".to_string(),
                certificate_document_date: date,
                certificate_document_number: "RU-001".to_string(),
                owner_inn: "7700000001".to_string(),
                producer_inn: "7700000002".to_string(),
                production_date: date,
                tnved_code: "6401100000".to_string(),
                uit_code: "010460043993125621JgXJ5.T".to_string(),
                uitu_code: "".to_string(),
            }],
            reg_date: "2020-01-23".to_string(),
            reg_number: "42".to_string(),
        }
    }

    #[test]
    fn test_wire_field_names() {
        let json: Value = serde_json::to_value(sample_document()).unwrap();

        assert_eq!(json["doc_type"], "LP_INTRODUCE_GOODS");
        assert_eq!(json["importRequest"], true);
        assert_eq!(json["description"]["participantInn"], "7700000000");
        assert_eq!(json["production_date"], "2020-01-23");
        assert_eq!(json["products"][0]["certificate_document_date"], "2020-01-23");
        assert!(json.get("import_request").is_none());
    }

    #[test]
    fn test_decode_without_products() {
        let json = r#"{
            "description": {"participantInn": "1"},
            "doc_id": "d",
            "doc_status": "s",
            "doc_type": "LP_INTRODUCE_GOODS",
            "importRequest": false,
            "owner_inn": "o",
            "participant_inn": "p",
            "producer_inn": "r",
            "production_date": "2021-12-31",
            "production_type": "t",
            "reg_date": "2021-12-31",
            "reg_number": "n"
        }"#;

        let document = Document::from_json(json).unwrap();
        assert!(document.products.is_empty());
        assert_eq!(
            document.production_date,
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_invalid_date_rejected() {
        let mut json = serde_json::to_value(sample_document()).unwrap();
        json["production_date"] = Value::from("23.01.2020");
        assert!(serde_json::from_value::<Document>(json).is_err());
    }
}
