// Small helpers shared by the engine and any front end.

/// Flag emoji built from the ISO-2 code's regional indicator symbols.
pub fn flag_emoji(iso2: &str) -> String {
    iso2.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .filter_map(|c| char::from_u32(0x1F1E6 + (c.to_ascii_uppercase() as u32 - 'A' as u32)))
        .collect()
}

/// Lowercased name with whitespace runs replaced by `-`.
pub fn slugify(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase()
}
