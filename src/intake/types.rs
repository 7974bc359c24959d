//! Wizard state and catalogues

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shares::ContributionRecord;

/// Legal form of the structure being created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureType {
    Sarl,
    Sa,
    Sas,
    Suarl,
    Snc,
    Scs,
    Ei,
    Association,
    Ong,
    Cooperative,
    Gie,
}

impl StructureType {
    pub const ALL: [StructureType; 11] = [
        Self::Sarl,
        Self::Sa,
        Self::Sas,
        Self::Suarl,
        Self::Snc,
        Self::Scs,
        Self::Ei,
        Self::Association,
        Self::Ong,
        Self::Cooperative,
        Self::Gie,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sarl => "sarl",
            Self::Sa => "sa",
            Self::Sas => "sas",
            Self::Suarl => "suarl",
            Self::Snc => "snc",
            Self::Scs => "scs",
            Self::Ei => "ei",
            Self::Association => "association",
            Self::Ong => "ong",
            Self::Cooperative => "cooperative",
            Self::Gie => "gie",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sarl => "SARL - Société à Responsabilité Limitée",
            Self::Sa => "SA - Société Anonyme",
            Self::Sas => "SAS - Société par Actions Simplifiée",
            Self::Suarl => "SUARL - Société Unipersonnelle à Responsabilité Limitée",
            Self::Snc => "SNC - Société en Nom Collectif",
            Self::Scs => "SCS - Société en Commandite Simple",
            Self::Ei => "Entreprise Individuelle",
            Self::Association => "Association",
            Self::Ong => "ONG",
            Self::Cooperative => "Coopérative",
            Self::Gie => "GIE - Groupement d'Intérêt Économique",
        }
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StructureType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("Unknown structure type: {s}"))
    }
}

/// Regions where a company can be registered
pub const REGIONS: [&str; 20] = [
    "Abidjan",
    "Yamoussoukro",
    "Bouaké",
    "Daloa",
    "San-Pédro",
    "Korhogo",
    "Man",
    "Gagnoa",
    "Divo",
    "Soubré",
    "Abengourou",
    "Bondoukou",
    "Dimbokro",
    "Séguéla",
    "Odienné",
    "Touba",
    "Ferkessédougou",
    "Boundiali",
    "Tingréla",
    "Danané",
];

pub fn is_known_region(region: &str) -> bool {
    REGIONS.contains(&region.trim())
}

/// Add-on administrative services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdditionalService {
    Dfe,
    Ncc,
    Cnps,
    Idu,
    Ntd,
    Domiciliation,
}

impl AdditionalService {
    pub const ALL: [AdditionalService; 6] = [
        Self::Dfe,
        Self::Ncc,
        Self::Cnps,
        Self::Idu,
        Self::Ntd,
        Self::Domiciliation,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Dfe => "dfe",
            Self::Ncc => "ncc",
            Self::Cnps => "cnps",
            Self::Idu => "idu",
            Self::Ntd => "ntd",
            Self::Domiciliation => "domiciliation",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dfe => "DFE - Déclaration Fiscale d'Existence",
            Self::Ncc => "NCC - Numéro Compte Contribuable",
            Self::Cnps => "CNPS - Immatriculation",
            Self::Idu => "IDU - Identification Unique",
            Self::Ntd => "NTD - Numéro de Télédéclarant",
            Self::Domiciliation => "Domiciliation commerciale",
        }
    }
}

impl FromStr for AdditionalService {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|svc| svc.id() == s.trim())
            .ok_or_else(|| format!("Unknown service: {s}"))
    }
}

/// Parse a monetary amount typed into the wizard.
///
/// Spaces (including the narrow no-break space used as thousands separator)
/// are ignored. Empty, unparsable and non-finite input yields `0`.
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{202f}' && *c != '\u{a0}')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Accept an amount sent either as a JSON number or as the raw input text;
/// anything else, blank or unparsable reads as `0`
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => parse_amount(&s),
        _ => 0.0,
    })
}

/// Accept a numeric field either as a JSON number or as text
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// One associate as entered in the wizard
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssociateDraft {
    /// Client-side identifier, used to key the share preview
    pub id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub id_number: Option<String>,
    pub birth_date: Option<String>,
    pub birth_place: Option<String>,
    pub marital_status: Option<String>,
    pub marital_regime: Option<String>,
    pub children_count: Option<u32>,
    pub residence_address: Option<String>,
    pub is_manager: bool,
    #[serde(deserialize_with = "lenient_amount")]
    pub cash_contribution: f64,
    pub nature_contribution_description: Option<String>,
    #[serde(deserialize_with = "lenient_amount")]
    pub nature_contribution_value: f64,
}

impl AssociateDraft {
    pub fn total_contribution(&self) -> f64 {
        self.cash_contribution + self.nature_contribution_value
    }
}

/// Complete wizard state at submission time
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyRequestDraft {
    pub structure_type: String,
    pub region: String,
    pub city: String,
    pub address: String,
    pub company_name: String,
    pub activity: String,
    /// Declared capital as typed; see [`parse_amount`]
    #[serde(deserialize_with = "text_or_number")]
    pub capital: String,
    #[serde(deserialize_with = "text_or_number")]
    pub associates_count: String,
    pub contact_name: String,
    pub phone: String,
    pub email: String,
    pub additional_services: Vec<String>,
    pub associates: Vec<AssociateDraft>,
}

impl CompanyRequestDraft {
    pub fn declared_capital(&self) -> f64 {
        parse_amount(&self.capital)
    }

    /// Identifier used for the associate at `index` in calculator input
    pub fn associate_key(&self, index: usize) -> String {
        match self.associates.get(index) {
            Some(a) if !a.id.trim().is_empty() => a.id.clone(),
            _ => format!("associate-{}", index + 1),
        }
    }

    /// Calculator input, in wizard order
    pub fn contribution_records(&self) -> Vec<ContributionRecord> {
        self.associates
            .iter()
            .enumerate()
            .map(|(i, a)| {
                ContributionRecord::new(
                    self.associate_key(i),
                    a.cash_contribution,
                    a.nature_contribution_value,
                )
            })
            .collect()
    }

    /// Selected services that are part of the catalogue
    pub fn services(&self) -> Vec<AdditionalService> {
        self.additional_services
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1000000"), 1_000_000.0);
        assert_eq!(parse_amount("1 000 000"), 1_000_000.0);
        assert_eq!(parse_amount("1\u{202f}500"), 1_500.0);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("inf"), 0.0);
        assert_eq!(parse_amount("NaN"), 0.0);
        assert_eq!(parse_amount("-5000"), -5000.0);
    }

    #[test]
    fn test_structure_type_parsing() {
        assert_eq!("SARL".parse::<StructureType>(), Ok(StructureType::Sarl));
        assert_eq!(StructureType::Gie.to_string(), "gie");
        assert!("llc".parse::<StructureType>().is_err());
        assert_eq!(StructureType::ALL.len(), 11);
    }

    #[test]
    fn test_regions() {
        assert!(is_known_region("Abidjan"));
        assert!(is_known_region("San-Pédro"));
        assert!(!is_known_region("Paris"));
    }

    #[test]
    fn test_draft_accepts_numbers_and_text() {
        let draft: CompanyRequestDraft = serde_json::from_value(json!({
            "structureType": "sarl",
            "capital": 1000000,
            "associates": [
                {"id": "a1", "fullName": "Awa", "cashContribution": "600 000"},
                {"fullName": "Yao", "cashContribution": 400000, "natureContributionValue": null}
            ]
        }))
        .unwrap();

        assert_eq!(draft.declared_capital(), 1_000_000.0);
        let records = draft.contribution_records();
        assert_eq!(records[0].associate_id, "a1");
        assert_eq!(records[0].cash_contribution, 600_000.0);
        assert_eq!(records[1].associate_id, "associate-2");
        assert_eq!(records[1].in_kind_contribution_value, 0.0);
    }

    #[test]
    fn test_services_skip_unknown_ids() {
        let draft = CompanyRequestDraft {
            additional_services: vec!["dfe".into(), "visa".into(), "domiciliation".into()],
            ..Default::default()
        };
        assert_eq!(
            draft.services(),
            vec![AdditionalService::Dfe, AdditionalService::Domiciliation]
        );
    }
}
