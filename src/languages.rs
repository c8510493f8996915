#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub code: String,
    pub name: String,
}

impl Language {
    pub fn new(code: &str, name: &str) -> Self {
        Language {
            code: code.to_owned(),
            name: name.to_owned(),
        }
    }
}

pub const DEFAULT_TARGET_LANGUAGE: &str = "English";

const BUILT_IN: &[(&str, &str)] = &[
    ("en", "English"),
    ("ru", "Russian"),
    ("tr", "Turkish"),
    ("de", "German"),
    ("fr", "French"),
    ("es", "Spanish"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("zh", "Chinese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("kk", "Kazakh"),
    ("ky", "Kyrgyz"),
    ("tg", "Tajik"),
    ("tk", "Turkmen"),
];

pub fn default_languages() -> Vec<Language> {
    BUILT_IN
        .iter()
        .map(|(code, name)| Language::new(code, name))
        .collect()
}

/// Languages given only by display name get a lowercased name as code.
/// Names are trimmed and blank ones skipped.
pub fn from_names(names: &[String]) -> Vec<Language> {
    let built_in = default_languages();
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| {
            find_by_name(&built_in, name)
                .cloned()
                .unwrap_or_else(|| Language::new(&name.to_lowercase(), name))
        })
        .collect()
}

pub fn find_by_name<'a>(languages: &'a [Language], name: &str) -> Option<&'a Language> {
    languages.iter().find(|lang| lang.name == name)
}
