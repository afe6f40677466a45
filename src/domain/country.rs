//! Country summary model, continent membership and flag glyphs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Continent
// ============================================================================

/// Region a country is listed under in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Continent {
    Asia,
    Europe,
    Africa,
    Americas,
    Oceania,
    Other,
}

const ASIA: &[&str] = &[
    "AE", "AF", "AM", "AZ", "BD", "BH", "BN", "BT", "CN", "GE", "HK", "ID", "IL", "IN", "IQ",
    "IR", "JO", "JP", "KG", "KH", "KP", "KR", "KW", "KZ", "LA", "LB", "LK", "MM", "MN", "MO",
    "MV", "MY", "NP", "OM", "PH", "PK", "PS", "QA", "SA", "SG", "SY", "TH", "TJ", "TL", "TM",
    "TW", "UZ", "VN", "YE",
];

const EUROPE: &[&str] = &[
    "AD", "AL", "AT", "AX", "BA", "BE", "BG", "BY", "CH", "CY", "CZ", "DE", "DK", "EE", "ES",
    "FI", "FO", "FR", "GB", "GG", "GI", "GR", "HR", "HU", "IE", "IM", "IS", "IT", "JE", "LI",
    "LT", "LU", "LV", "MC", "MD", "ME", "MK", "MT", "NL", "NO", "PL", "PT", "RO", "RS", "RU",
    "SE", "SI", "SK", "SM", "TR", "UA", "VA", "XK",
];

const AFRICA: &[&str] = &[
    "AO", "BF", "BI", "BJ", "BW", "CD", "CF", "CG", "CI", "CM", "CV", "DJ", "DZ", "EG", "EH",
    "ER", "ET", "GA", "GH", "GM", "GN", "GQ", "GW", "KE", "KM", "LR", "LS", "LY", "MA", "MG",
    "ML", "MR", "MU", "MW", "MZ", "NA", "NE", "NG", "RE", "RW", "SC", "SD", "SH", "SL", "SN",
    "SO", "SS", "ST", "SZ", "TD", "TG", "TN", "TZ", "UG", "YT", "ZA", "ZM", "ZW",
];

const AMERICAS: &[&str] = &[
    "AG", "AI", "AR", "AW", "BB", "BL", "BM", "BO", "BQ", "BR", "BS", "BZ", "CA", "CL", "CO",
    "CR", "CU", "CW", "DM", "DO", "EC", "FK", "GD", "GF", "GL", "GP", "GT", "GY", "HN", "HT",
    "JM", "KN", "KY", "LC", "MF", "MQ", "MS", "MX", "NI", "PA", "PE", "PM", "PR", "PY", "SR",
    "SV", "SX", "TC", "TT", "US", "UY", "VC", "VE", "VG", "VI",
];

const OCEANIA: &[&str] = &[
    "AS", "AU", "CK", "FJ", "FM", "GU", "KI", "MH", "MP", "NC", "NF", "NR", "NU", "NZ", "PF",
    "PG", "PN", "PW", "SB", "TK", "TO", "TV", "VU", "WF", "WS",
];

impl Continent {
    /// Regions with a membership table, in display order
    pub const POPULATED: [Continent; 5] = [
        Continent::Asia,
        Continent::Europe,
        Continent::Africa,
        Continent::Americas,
        Continent::Oceania,
    ];

    fn members(self) -> &'static [&'static str] {
        match self {
            Continent::Asia => ASIA,
            Continent::Europe => EUROPE,
            Continent::Africa => AFRICA,
            Continent::Americas => AMERICAS,
            Continent::Oceania => OCEANIA,
            Continent::Other => &[],
        }
    }

    /// Classify an ISO2 code; unknown or missing codes land in `Other`
    pub fn from_code(code: Option<&str>) -> Self {
        let Some(code) = code else {
            return Continent::Other;
        };

        Self::POPULATED
            .into_iter()
            .find(|c| c.members().contains(&code))
            .unwrap_or(Continent::Other)
    }

    /// Every code listed under a populated region
    pub fn all_codes() -> Vec<String> {
        Self::POPULATED
            .iter()
            .flat_map(|c| c.members().iter().map(|code| code.to_string()))
            .collect()
    }
}

// ============================================================================
// Flags
// ============================================================================

const REGIONAL_INDICATOR_A: u32 = 0x1F1E6;

/// Flag emoji for an ISO2 code, empty unless the code is exactly two uppercase letters
pub fn flag_for(code: &str) -> String {
    let bytes = code.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_uppercase) {
        return String::new();
    }

    bytes
        .iter()
        .filter_map(|b| char::from_u32(REGIONAL_INDICATOR_A + u32::from(b - b'A')))
        .collect()
}

/// Normalize a vendor code to uppercase ISO2, rejecting anything else
pub fn normalize_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(trimmed.to_ascii_uppercase())
    } else {
        None
    }
}

// ============================================================================
// Country Summary
// ============================================================================

/// One deduplicated catalog entry per country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountrySummary {
    /// ISO 3166-1 alpha-2 code, null when it could not be resolved
    pub code: Option<String>,
    pub name: String,
    pub continent: Continent,
    /// Regional-indicator flag glyph, empty when there is no code
    pub flag: String,
    /// Cheapest positive plan price seen for this country
    pub from_price: Option<f64>,
}
