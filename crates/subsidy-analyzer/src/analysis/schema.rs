use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Validated model output. Serialized keys are the Spanish field names the
/// prompts ask for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredResult {
    #[serde(rename = "identificacion")]
    pub identification: Identification,
    #[serde(rename = "detalles")]
    pub details: Details,
    #[serde(rename = "condiciones_economicas")]
    pub economic_conditions: EconomicConditions,
    #[serde(rename = "plazos_procedimiento")]
    pub deadlines: Deadlines,
    /// Filled in after analysis; see [`AnalysisMetadata`].
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identification {
    #[serde(rename = "organismo_emisor")]
    pub issuing_body: String,
    #[serde(rename = "titulo_convocatoria")]
    pub title: String,
    #[serde(rename = "base_reguladora")]
    pub legal_basis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Details {
    #[serde(rename = "beneficiarios")]
    pub beneficiaries: Vec<String>,
    #[serde(rename = "finalidad_ayuda")]
    pub purpose: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicConditions {
    #[serde(rename = "presupuesto_total")]
    pub total_budget: String,
    /// Territories in the order the model listed them.
    #[serde(rename = "distribucion_territorial", default)]
    pub territorial_distribution: Option<IndexMap<String, String>>,
    #[serde(rename = "cuantia_por_solicitud")]
    pub amount_per_application: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deadlines {
    #[serde(rename = "plazo_presentacion")]
    pub submission_period: String,
    #[serde(rename = "plazo_resolucion")]
    pub resolution_period: String,
    #[serde(rename = "medio_presentacion")]
    pub submission_channel: String,
    #[serde(rename = "enlace_tramite", default)]
    pub application_link: Option<String>,
}

impl StructuredResult {
    /// Validates a parsed JSON object against the result shape. All four
    /// sections and their required fields must be present with the right
    /// types; extra keys are ignored.
    pub fn from_json(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Plain JSON mapping, as written to the artifact.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Metadata attached to every analysis outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub analysis_date: String,
    pub subsidy_code: String,
    pub used_pdf: bool,
    pub pdf_count: usize,
    pub model_used: String,
    pub version: String,
    pub token_usage: Option<crate::llm::TokenUsage>,
}

impl AnalysisMetadata {
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Renders the per-territory budget breakdown for display.
pub fn format_territorial_distribution(distribution: Option<&IndexMap<String, String>>) -> String {
    match distribution {
        Some(entries) if !entries.is_empty() => {
            let mut lines = vec!["Distribución territorial:".to_string()];
            lines.extend(
                entries
                    .iter()
                    .map(|(territory, amount)| format!("  - {}: {}", territory, amount)),
            );
            lines.join("\n")
        }
        _ => "No hay distribución territorial especificada".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "identificacion": {
                "organismo_emisor": "Consejería de Agricultura",
                "titulo_convocatoria": "Ayudas a la modernización de explotaciones",
                "base_reguladora": "Orden de 12 de marzo de 2024"
            },
            "detalles": {
                "beneficiarios": ["Agricultores jóvenes", "Cooperativas"],
                "finalidad_ayuda": "Inversiones en maquinaria"
            },
            "condiciones_economicas": {
                "presupuesto_total": "5.000.000 EUR",
                "distribucion_territorial": {"Sevilla": "1.000.000 EUR", "Almería": "800.000 EUR"},
                "cuantia_por_solicitud": "Hasta 50.000 EUR"
            },
            "plazos_procedimiento": {
                "plazo_presentacion": "Del 01/04/2024 al 30/04/2024",
                "plazo_resolucion": "Seis meses",
                "medio_presentacion": "Electrónica exclusivamente",
                "enlace_tramite": null
            }
        })
    }

    #[test]
    fn test_valid_result() {
        let result = StructuredResult::from_json(&sample()).unwrap();
        assert_eq!(result.identification.issuing_body, "Consejería de Agricultura");
        assert_eq!(result.details.beneficiaries.len(), 2);
        assert_eq!(
            result
                .economic_conditions
                .territorial_distribution
                .as_ref()
                .unwrap()
                .get("Sevilla")
                .map(String::as_str),
            Some("1.000.000 EUR")
        );
        assert!(result.deadlines.application_link.is_none());
        assert!(result.metadata.is_empty());
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let mut value = sample();
        value["condiciones_economicas"]
            .as_object_mut()
            .unwrap()
            .remove("distribucion_territorial");
        value["plazos_procedimiento"]
            .as_object_mut()
            .unwrap()
            .remove("enlace_tramite");

        assert!(StructuredResult::from_json(&value).is_ok());
    }

    #[test]
    fn test_missing_section_rejected() {
        let mut value = sample();
        value.as_object_mut().unwrap().remove("plazos_procedimiento");
        assert!(StructuredResult::from_json(&value).is_err());
    }

    #[test]
    fn test_wrong_type_rejected() {
        let mut value = sample();
        value["detalles"]["beneficiarios"] = json!("Agricultores");
        assert!(StructuredResult::from_json(&value).is_err());
    }

    #[test]
    fn test_serializes_with_spanish_keys() {
        let result = StructuredResult::from_json(&sample()).unwrap();
        let json = result.to_json().unwrap();

        assert_eq!(json["identificacion"]["titulo_convocatoria"], "Ayudas a la modernización de explotaciones");
        assert_eq!(json["plazos_procedimiento"]["plazo_resolucion"], "Seis meses");
        assert!(json.get("metadata").is_some());
    }

    #[test]
    fn test_serialized_result_deserializes_equal() {
        let mut result = StructuredResult::from_json(&sample()).unwrap();
        result.metadata.insert("subsidy_code".to_string(), json!("845133"));

        let text = serde_json::to_string_pretty(&result).unwrap();
        let back: StructuredResult = serde_json::from_str(&text).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_metadata_to_map() {
        let metadata = AnalysisMetadata {
            analysis_date: "2024-05-01T10:00:00+02:00".to_string(),
            subsidy_code: "845133".to_string(),
            used_pdf: true,
            pdf_count: 2,
            model_used: "gpt-4o-mini".to_string(),
            version: "0.1.0".to_string(),
            token_usage: None,
        };

        let map = metadata.to_map();
        assert_eq!(map["pdf_count"], 2);
        assert_eq!(map["used_pdf"], true);
        assert!(map["token_usage"].is_null());
    }

    #[test]
    fn test_format_territorial_distribution() {
        let mut distribution = IndexMap::new();
        distribution.insert("Sevilla".to_string(), "1M".to_string());
        distribution.insert("Almería".to_string(), "0.8M".to_string());

        assert_eq!(
            format_territorial_distribution(Some(&distribution)),
            "Distribución territorial:\n  - Sevilla: 1M\n  - Almería: 0.8M"
        );
    }

    #[test]
    fn test_territorial_order_follows_model_output() {
        let mut value = sample();
        value["condiciones_economicas"]["distribucion_territorial"] =
            serde_json::from_str(r#"{"Zaragoza": "3M", "Huesca": "1M", "Teruel": "2M"}"#).unwrap();
        let result = StructuredResult::from_json(&value).unwrap();

        assert_eq!(
            format_territorial_distribution(
                result.economic_conditions.territorial_distribution.as_ref()
            ),
            "Distribución territorial:\n  - Zaragoza: 3M\n  - Huesca: 1M\n  - Teruel: 2M"
        );

        let saved = serde_json::to_string(&result.to_json().unwrap()).unwrap();
        assert!(saved.contains(
            r#""distribucion_territorial":{"Zaragoza":"3M","Huesca":"1M","Teruel":"2M"}"#
        ));
    }

    #[test]
    fn test_format_territorial_distribution_empty() {
        let expected = "No hay distribución territorial especificada";
        assert_eq!(format_territorial_distribution(None), expected);
        assert_eq!(format_territorial_distribution(Some(&IndexMap::new())), expected);
    }
}
