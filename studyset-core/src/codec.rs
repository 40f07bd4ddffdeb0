//! Packs an optional image URL next to the definition text inside the one
//! `definition` column, behind sentinel markers. Records without an image
//! are stored as plain text, so everything written before images existed
//! decodes unchanged.

pub const IMG_MARKER: &str = "__IMG__:";
pub const DEF_MARKER: &str = "__DEF__:";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedDefinition {
    pub image_url: String,
    pub text: String,
}

/// Empty `image_url` is a pass-through: the text is stored as-is.
pub fn encode(definition_text: &str, image_url: &str) -> String {
    if image_url.is_empty() {
        return definition_text.to_string();
    }
    format!("{IMG_MARKER}{image_url}{DEF_MARKER}{definition_text}")
}

/// Splits a packed definition back into URL and text. The URL is the
/// shortest non-empty prefix followed by the definition marker and
/// non-empty text; anything that does not fit that shape is returned
/// whole, with an empty URL.
///
/// A URL that itself contains the definition marker cannot round-trip;
/// the format has no escaping, and callers must not expect one.
pub fn decode(packed: &str) -> DecodedDefinition {
    if let Some(rest) = packed.strip_prefix(IMG_MARKER) {
        for (pos, _) in rest.match_indices(DEF_MARKER) {
            let url = &rest[..pos];
            let text = &rest[pos + DEF_MARKER.len()..];
            if !url.is_empty() && !text.is_empty() {
                return DecodedDefinition {
                    image_url: url.to_string(),
                    text: text.to_string(),
                };
            }
        }
    }
    DecodedDefinition {
        image_url: String::new(),
        text: packed.to_string(),
    }
}
