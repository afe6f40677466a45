//! Country name to ISO2 resolution tables
//!
//! Resolution consults, in order, the vendor override table, the code carried
//! by the plan record, the optional public registry ([`CountryReference`]) and
//! finally a small built-in fallback table.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::country::normalize_code;

/// Vendor-specific spellings that must win over whatever the vendor sends
const OVERRIDES: &[(&str, &str)] = &[
    ("Korea South", "KR"),
    ("South Korea", "KR"),
    ("Korea, Republic of", "KR"),
    ("Republic of Korea", "KR"),
    ("Korea North", "KP"),
    ("Hong Kong (China)", "HK"),
    ("Hongkong", "HK"),
    ("Macau", "MO"),
    ("Macao (China)", "MO"),
    ("Taiwan (China)", "TW"),
    ("USA", "US"),
    ("United States of America", "US"),
    ("UK", "GB"),
    ("England", "GB"),
    ("Great Britain", "GB"),
    ("Turkiye", "TR"),
    ("Türkiye", "TR"),
    ("Czech Republic", "CZ"),
    ("Viet Nam", "VN"),
    ("Russian Federation", "RU"),
    ("Lao PDR", "LA"),
    ("Laos", "LA"),
    ("UAE", "AE"),
    ("Cote d'Ivoire", "CI"),
    ("Ivory Coast", "CI"),
    ("Macedonia", "MK"),
    ("Swaziland", "SZ"),
    ("Burma", "MM"),
    ("Holland", "NL"),
    ("Kosovo", "XK"),
];

/// Common destinations, used when neither the record nor the registry resolves a name
const FALLBACK: &[(&str, &str)] = &[
    ("Albania", "AL"),
    ("Argentina", "AR"),
    ("Armenia", "AM"),
    ("Australia", "AU"),
    ("Austria", "AT"),
    ("Azerbaijan", "AZ"),
    ("Bahrain", "BH"),
    ("Bangladesh", "BD"),
    ("Belgium", "BE"),
    ("Bolivia", "BO"),
    ("Bosnia and Herzegovina", "BA"),
    ("Brazil", "BR"),
    ("Brunei", "BN"),
    ("Bulgaria", "BG"),
    ("Cambodia", "KH"),
    ("Canada", "CA"),
    ("Chile", "CL"),
    ("China", "CN"),
    ("Colombia", "CO"),
    ("Costa Rica", "CR"),
    ("Croatia", "HR"),
    ("Cyprus", "CY"),
    ("Czechia", "CZ"),
    ("Denmark", "DK"),
    ("Dominican Republic", "DO"),
    ("Ecuador", "EC"),
    ("Egypt", "EG"),
    ("Estonia", "EE"),
    ("Finland", "FI"),
    ("France", "FR"),
    ("Georgia", "GE"),
    ("Germany", "DE"),
    ("Greece", "GR"),
    ("Guatemala", "GT"),
    ("Hong Kong", "HK"),
    ("Hungary", "HU"),
    ("Iceland", "IS"),
    ("India", "IN"),
    ("Indonesia", "ID"),
    ("Ireland", "IE"),
    ("Israel", "IL"),
    ("Italy", "IT"),
    ("Jamaica", "JM"),
    ("Japan", "JP"),
    ("Jordan", "JO"),
    ("Kazakhstan", "KZ"),
    ("Kenya", "KE"),
    ("Kuwait", "KW"),
    ("Kyrgyzstan", "KG"),
    ("Latvia", "LV"),
    ("Lithuania", "LT"),
    ("Luxembourg", "LU"),
    ("Macao", "MO"),
    ("Malaysia", "MY"),
    ("Maldives", "MV"),
    ("Malta", "MT"),
    ("Mexico", "MX"),
    ("Moldova", "MD"),
    ("Mongolia", "MN"),
    ("Montenegro", "ME"),
    ("Morocco", "MA"),
    ("Myanmar", "MM"),
    ("Nepal", "NP"),
    ("Netherlands", "NL"),
    ("New Zealand", "NZ"),
    ("Nigeria", "NG"),
    ("North Macedonia", "MK"),
    ("Norway", "NO"),
    ("Oman", "OM"),
    ("Pakistan", "PK"),
    ("Panama", "PA"),
    ("Paraguay", "PY"),
    ("Peru", "PE"),
    ("Philippines", "PH"),
    ("Poland", "PL"),
    ("Portugal", "PT"),
    ("Puerto Rico", "PR"),
    ("Qatar", "QA"),
    ("Romania", "RO"),
    ("Russia", "RU"),
    ("Saudi Arabia", "SA"),
    ("Serbia", "RS"),
    ("Singapore", "SG"),
    ("Slovakia", "SK"),
    ("Slovenia", "SI"),
    ("South Africa", "ZA"),
    ("Spain", "ES"),
    ("Sri Lanka", "LK"),
    ("Sweden", "SE"),
    ("Switzerland", "CH"),
    ("Taiwan", "TW"),
    ("Tajikistan", "TJ"),
    ("Tanzania", "TZ"),
    ("Thailand", "TH"),
    ("Tunisia", "TN"),
    ("Turkey", "TR"),
    ("Uganda", "UG"),
    ("Ukraine", "UA"),
    ("United Arab Emirates", "AE"),
    ("United Kingdom", "GB"),
    ("United States", "US"),
    ("Uruguay", "UY"),
    ("Uzbekistan", "UZ"),
    ("Vietnam", "VN"),
];

static OVERRIDE_TABLE: Lazy<HashMap<String, &'static str>> = Lazy::new(|| build_table(OVERRIDES));
static FALLBACK_TABLE: Lazy<HashMap<String, &'static str>> = Lazy::new(|| build_table(FALLBACK));

fn build_table(entries: &[(&str, &'static str)]) -> HashMap<String, &'static str> {
    entries
        .iter()
        .map(|(name, code)| (normalize_name(name), *code))
        .collect()
}

/// Grouping key for a country name: lowercase, apostrophes stripped, whitespace collapsed
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '\'' && *c != '\u{2019}')
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Code from the vendor override table
pub fn override_code(normalized_name: &str) -> Option<&'static str> {
    OVERRIDE_TABLE.get(normalized_name).copied()
}

/// Code from the built-in fallback table
pub fn fallback_code(normalized_name: &str) -> Option<&'static str> {
    FALLBACK_TABLE.get(normalized_name).copied()
}

/// Name to ISO2 mapping sourced from a public country registry
#[derive(Debug, Clone, Default)]
pub struct CountryReference {
    names: HashMap<String, String>,
}

impl CountryReference {
    /// Build from `(name, code)` pairs; invalid codes are dropped
    pub fn from_pairs<I, N, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        let names = pairs
            .into_iter()
            .filter_map(|(name, code)| {
                let code = normalize_code(code.as_ref())?;
                let key = normalize_name(name.as_ref());
                (!key.is_empty()).then_some((key, code))
            })
            .collect();

        CountryReference { names }
    }

    pub fn lookup(&self, normalized_name: &str) -> Option<&str> {
        self.names.get(normalized_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Cote   d'Ivoire "), "cote divoire");
        assert_eq!(normalize_name("Côte d’Ivoire"), "côte divoire");
        assert_eq!(normalize_name("KOREA\tSouth"), "korea south");
    }

    #[test]
    fn test_override_and_fallback_tables() {
        assert_eq!(override_code("korea south"), Some("KR"));
        assert_eq!(override_code("thailand"), None);
        assert_eq!(fallback_code("thailand"), Some("TH"));
        assert_eq!(fallback_code("atlantis"), None);
    }

    #[test]
    fn test_tables_have_valid_codes() {
        for (_, code) in OVERRIDES.iter().chain(FALLBACK.iter()) {
            assert_eq!(normalize_code(code).as_deref(), Some(*code));
        }
    }

    #[test]
    fn test_reference_drops_invalid_codes() {
        let reference = CountryReference::from_pairs([
            ("Åland Islands", "ax"),
            ("Nowhere", "NWH"),
            ("", "ZZ"),
        ]);

        assert_eq!(reference.len(), 1);
        assert_eq!(reference.lookup("åland islands"), Some("AX"));
    }
}
