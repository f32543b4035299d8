//! Profile identifier tokenizer
//!
//! Splits a machine profile id such as `Standard_D4s_v5` into a typed
//! `ProfileIdentifier { family: "D", tier: 4, features: "s", version: 5 }`.
//! Parsing is a single pure function; any input outside the expected
//! shape yields `None` rather than an error.

/// Typed decomposition of a profile identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileIdentifier {
    /// Leading letters naming the series family (e.g. "D", "NC")
    pub family: String,
    /// Numeric size tier, absent for a few legacy names
    pub tier: Option<u32>,
    /// Trailing lowercase feature letters (e.g. "s" for premium storage)
    pub features: String,
    /// Version from the `_vN` suffix; 1 when the suffix is absent
    pub version: u32,
}

impl ProfileIdentifier {
    /// Normalized family key used for registry lookups
    pub fn family_key(&self) -> String {
        self.family.to_lowercase()
    }

    /// Registry key including the version, e.g. `d_v5`
    pub fn versioned_key(&self) -> String {
        format!("{}_v{}", self.family_key(), self.version)
    }
}

/// Parse a profile identifier into its typed parts
///
/// Accepts an optional `Standard_` or `Basic_` tier prefix. Returns
/// `None` for anything that does not match the family/tier/features
/// shape, including empty input and stray characters.
pub fn parse(profile_id: &str) -> Option<ProfileIdentifier> {
    let trimmed = profile_id.trim();
    let body = strip_tier_prefix(trimmed);
    if body.is_empty() {
        return None;
    }

    let mut rest = body;

    let family: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if family.is_empty() {
        return None;
    }
    rest = &rest[family.len()..];

    let tier_str: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let tier = if tier_str.is_empty() {
        None
    } else {
        Some(tier_str.parse().ok()?)
    };
    rest = &rest[tier_str.len()..];

    let features: String = rest
        .chars()
        .take_while(|c| c.is_ascii_lowercase())
        .collect();
    rest = &rest[features.len()..];

    let version = match rest {
        "" => 1,
        suffix => parse_version_suffix(suffix)?,
    };

    Some(ProfileIdentifier {
        family,
        tier,
        features,
        version,
    })
}

fn strip_tier_prefix(id: &str) -> &str {
    for prefix in ["standard_", "basic_"] {
        if id.len() > prefix.len() && id[..prefix.len()].eq_ignore_ascii_case(prefix) {
            return &id[prefix.len()..];
        }
    }
    id
}

fn parse_version_suffix(suffix: &str) -> Option<u32> {
    let digits = suffix
        .strip_prefix("_v")
        .or_else(|| suffix.strip_prefix("_V"))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_shape() {
        let ident = parse("Standard_D4s_v5").unwrap();
        assert_eq!(ident.family, "D");
        assert_eq!(ident.tier, Some(4));
        assert_eq!(ident.features, "s");
        assert_eq!(ident.version, 5);
        assert_eq!(ident.versioned_key(), "d_v5");
    }

    #[test]
    fn test_parse_without_prefix() {
        let ident = parse("E8ads_v5").unwrap();
        assert_eq!(ident.family, "E");
        assert_eq!(ident.tier, Some(8));
        assert_eq!(ident.features, "ads");
        assert_eq!(ident.version, 5);
    }

    #[test]
    fn test_parse_pre_versioning_name() {
        let ident = parse("DS3").unwrap();
        assert_eq!(ident.family, "DS");
        assert_eq!(ident.tier, Some(3));
        assert_eq!(ident.features, "");
        assert_eq!(ident.version, 1);
    }

    #[test]
    fn test_parse_basic_prefix() {
        let ident = parse("Basic_A2").unwrap();
        assert_eq!(ident.family, "A");
        assert_eq!(ident.tier, Some(2));
        assert_eq!(ident.version, 1);
    }

    #[test]
    fn test_parse_family_only() {
        let ident = parse("M").unwrap();
        assert_eq!(ident.family, "M");
        assert_eq!(ident.tier, None);
        assert_eq!(ident.version, 1);
    }

    #[test]
    fn test_parse_multi_letter_family_with_features() {
        let ident = parse("NC24ads_v4").unwrap();
        assert_eq!(ident.family, "NC");
        assert_eq!(ident.tier, Some(24));
        assert_eq!(ident.features, "ads");
        assert_eq!(ident.version, 4);
    }

    #[test]
    fn test_parse_rejects_malformed_inputs() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   "), None);
        assert_eq!(parse("Standard_"), None);
        assert_eq!(parse("42"), None);
        assert_eq!(parse("D4s_v"), None);
        assert_eq!(parse("D4s_vX"), None);
        assert_eq!(parse("D4s_v5_extra"), None);
        assert_eq!(parse("D4s-v5"), None);
        assert_eq!(parse("D4s v5"), None);
    }

    #[test]
    fn test_parse_rejects_uppercase_after_tier() {
        // Feature letters are lowercase by convention; an uppercase run
        // after the tier is not a valid shape.
        assert_eq!(parse("D4S_v5"), None);
    }

    #[test]
    fn test_parse_is_deterministic() {
        assert_eq!(parse("Standard_D4s_v5"), parse("Standard_D4s_v5"));
    }
}
