//! Builders for registry payloads, model replies and PDF fixtures.

#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, Stream};
use serde_json::{json, Map, Value};

/// Builder for registry `convocatorias` records.
pub struct RegistryRecordBuilder {
    fields: Map<String, Value>,
    documents: Vec<Value>,
}

impl RegistryRecordBuilder {
    pub fn new() -> Self {
        Self {
            fields: Map::new(),
            documents: Vec::new(),
        }
    }

    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Adds a `documentos` entry shaped like the registry's.
    pub fn document(mut self, tipo: &str, name: &str, id: &str) -> Self {
        self.documents.push(json!({
            "tipo": tipo,
            "nombreFic": name,
            "id": id,
        }));
        self
    }

    pub fn raw_document(mut self, descriptor: Value) -> Self {
        self.documents.push(descriptor);
        self
    }

    pub fn build(self) -> Value {
        let mut fields = self.fields;
        fields.insert("documentos".to_string(), Value::Array(self.documents));
        Value::Object(fields)
    }
}

impl Default for RegistryRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A model answer that validates as a structured result.
pub fn structured_result_json(title: &str) -> Value {
    json!({
        "identificacion": {
            "organismo_emisor": "Ayuntamiento de Teruel",
            "titulo_convocatoria": title,
            "base_reguladora": "Ordenanza general de subvenciones"
        },
        "detalles": {
            "beneficiarios": ["Asociaciones culturales", "Fundaciones"],
            "finalidad_ayuda": "Actividades culturales"
        },
        "condiciones_economicas": {
            "presupuesto_total": "50.000 EUR",
            "distribucion_territorial": {"Teruel": "50.000 EUR"},
            "cuantia_por_solicitud": "Máximo 3.000 EUR"
        },
        "plazos_procedimiento": {
            "plazo_presentacion": "15 días hábiles",
            "plazo_resolucion": "Seis meses",
            "medio_presentacion": "Sede electrónica",
            "enlace_tramite": null
        }
    })
}

/// Wraps JSON in chatter the way models tend to answer.
pub fn chatty_reply(payload: &Value) -> String {
    format!("here is the result: {} thanks", payload)
}

/// Builds a PDF with one text line per page.
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = format!("BT /F1 12 Tf 50 700 Td ({}) Tj ET", text);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to serialize test PDF");
    bytes
}
