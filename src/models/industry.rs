use serde::Serialize;

/// Film industry offered during onboarding, keyed by original-language code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Industry {
    pub code: &'static str,
    pub name: &'static str,
}

pub const INDUSTRIES: &[Industry] = &[
    Industry { code: "en", name: "Hollywood (English)" },
    Industry { code: "hi", name: "Bollywood (Hindi)" },
    Industry { code: "te", name: "Tollywood (Telugu)" },
    Industry { code: "ta", name: "Kollywood (Tamil)" },
    Industry { code: "ml", name: "Mollywood (Malayalam)" },
    Industry { code: "ko", name: "K-Drama (Korean)" },
    Industry { code: "ja", name: "Anime (Japanese)" },
    Industry { code: "es", name: "Spanish" },
    Industry { code: "fr", name: "French" },
];

impl Industry {
    pub fn by_code(code: &str) -> Option<&'static Industry> {
        INDUSTRIES.iter().find(|industry| industry.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_code() {
        assert_eq!(Industry::by_code("hi").unwrap().name, "Bollywood (Hindi)");
        assert!(Industry::by_code("xx").is_none());
    }
}
