//! The drill-hole record: one worksheet row, plus its derived names.
//!
//! A record drives three filenames, all keyed by the trimmed code:
//!
//! * `{code} Layout.pdf`    — the layout PDF we expect to be supplied
//! * `{code}.png`           — the composed label image we produce
//! * `{code} Layout QR.pdf` — the stamped copy we produce
//!
//! The QR payload is a flat JSON object with exactly ten fixed keys
//! (the Spanish workbook column names). [`QrPayload`] is a borrowed
//! struct whose field order matches the column order, so serde_json
//! produces the same key sequence on every run — scanners don't care,
//! but deterministic payloads make outputs reproducible byte-for-byte.

use serde::Serialize;

/// Suffix appended to a code to find its supplied layout PDF.
pub const LAYOUT_SUFFIX: &str = " Layout.pdf";

/// Suffix for the stamped output document.
pub const STAMPED_SUFFIX: &str = " Layout QR.pdf";

/// One row of the project workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based worksheet row this record came from, for diagnostics.
    pub row: usize,
    /// Contractor / executing entity ("EE").
    pub entity: String,
    /// Drill-hole code ("Cod Sondaje"), trimmed of surrounding whitespace.
    /// Unique key; drives all output file naming and document lookup.
    pub code: String,
    /// Hole type ("Tipo").
    pub kind: String,
    /// Exploration target ("Target").
    pub target: String,
    /// Vein ("Veta").
    pub vein: String,
    /// Mine level ("Nivel").
    pub level: String,
    /// Working / heading ("Labor").
    pub working: String,
    /// Resource category ("Categoria").
    pub category: String,
    /// Inclination in degrees ("Inclinacion").
    pub inclination: f64,
    /// Azimuth in degrees ("Azimut").
    pub azimuth: f64,
}

impl Record {
    /// Name of the layout PDF this record expects to be supplied.
    pub fn layout_name(&self) -> String {
        format!("{}{}", self.code, LAYOUT_SUFFIX)
    }

    /// Name of the stamped output document.
    pub fn stamped_name(&self) -> String {
        format!("{}{}", self.code, STAMPED_SUFFIX)
    }

    /// Name of the composed label image.
    pub fn image_name(&self) -> String {
        format!("{}.png", self.code)
    }

    /// Human-readable caption drawn above the QR symbol.
    pub fn caption(&self) -> String {
        format!("{} | {} | {}", self.code, self.vein, self.level)
    }

    /// Compact JSON payload encoded into the QR symbol.
    pub fn payload_json(&self) -> String {
        // Serialising a struct of strings and floats cannot fail.
        serde_json::to_string(&QrPayload::from(self))
            .unwrap_or_else(|e| unreachable!("payload serialisation failed: {e}"))
    }
}

/// The ten fixed QR payload fields, keyed by workbook column name.
///
/// Field declaration order is the wire order.
#[derive(Debug, Serialize)]
pub struct QrPayload<'a> {
    #[serde(rename = "EE")]
    pub entity: &'a str,
    #[serde(rename = "Cod Sondaje")]
    pub code: &'a str,
    #[serde(rename = "Tipo")]
    pub kind: &'a str,
    #[serde(rename = "Target")]
    pub target: &'a str,
    #[serde(rename = "Veta")]
    pub vein: &'a str,
    #[serde(rename = "Nivel")]
    pub level: &'a str,
    #[serde(rename = "Labor")]
    pub working: &'a str,
    #[serde(rename = "Categoria")]
    pub category: &'a str,
    #[serde(rename = "Inclinacion")]
    pub inclination: f64,
    #[serde(rename = "Azimut")]
    pub azimuth: f64,
}

impl<'a> From<&'a Record> for QrPayload<'a> {
    fn from(r: &'a Record) -> Self {
        Self {
            entity: &r.entity,
            code: &r.code,
            kind: &r.kind,
            target: &r.target,
            vein: &r.vein,
            level: &r.level,
            working: &r.working,
            category: &r.category,
            inclination: r.inclination,
            azimuth: r.azimuth,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_record(code: &str) -> Record {
    Record {
        row: 2,
        entity: "MDH".into(),
        code: code.into(),
        kind: "DDH".into(),
        target: "Esperanza".into(),
        vein: "Milagros".into(),
        level: "NV-4490".into(),
        working: "GL-225".into(),
        category: "Inferido".into(),
        inclination: -55.0,
        azimuth: 230.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_names_use_the_code() {
        let r = sample_record("DDH-001");
        assert_eq!(r.layout_name(), "DDH-001 Layout.pdf");
        assert_eq!(r.stamped_name(), "DDH-001 Layout QR.pdf");
        assert_eq!(r.image_name(), "DDH-001.png");
    }

    #[test]
    fn caption_is_code_vein_level() {
        let r = sample_record("DDH-001");
        assert_eq!(r.caption(), "DDH-001 | Milagros | NV-4490");
    }

    #[test]
    fn payload_has_exactly_ten_fixed_keys() {
        let r = sample_record("DDH-001");
        let v: serde_json::Value = serde_json::from_str(&r.payload_json()).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 10);
        for key in [
            "EE",
            "Cod Sondaje",
            "Tipo",
            "Target",
            "Veta",
            "Nivel",
            "Labor",
            "Categoria",
            "Inclinacion",
            "Azimut",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(obj["Cod Sondaje"], "DDH-001");
        assert_eq!(obj["Inclinacion"], -55.0);
    }

    #[test]
    fn payload_keys_keep_declaration_order() {
        let r = sample_record("DDH-001");
        let json = r.payload_json();
        let ee = json.find("\"EE\"").unwrap();
        let cod = json.find("\"Cod Sondaje\"").unwrap();
        let azi = json.find("\"Azimut\"").unwrap();
        assert!(ee < cod && cod < azi, "got: {json}");
    }

    #[test]
    fn payload_keeps_utf8_unescaped() {
        let mut r = sample_record("DDH-001");
        r.vein = "Veta Ñusta".into();
        assert!(r.payload_json().contains("Veta Ñusta"));
    }
}
