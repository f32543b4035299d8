//! Premium-storage naming correction
//!
//! The capability backend sometimes omits premium storage support for
//! profiles whose name carries the premium-capable `s` feature letter
//! (e.g. `D4s_v5`). This post-fetch step forces the flag on for those
//! profiles. It is a heuristic patch over incomplete backend data, kept
//! as a separate step so it can be disabled via `CatalogConfig`.

use crate::models::ProfileCapabilities;
use crate::series::parser;

/// Force `premium_storage_supported` for profiles with the premium
/// naming suffix. Returns the number of corrected profiles.
pub fn apply_premium_suffix_correction(profiles: &mut [ProfileCapabilities]) -> usize {
    let mut corrected = 0;
    for profile in profiles.iter_mut() {
        if !profile.premium_storage_supported && has_premium_suffix(&profile.profile_id) {
            profile.premium_storage_supported = true;
            corrected += 1;
        }
    }
    corrected
}

/// Whether a profile id carries the premium-capable `s` feature letter
fn has_premium_suffix(profile_id: &str) -> bool {
    parser::parse(profile_id)
        .map(|ident| ident.features.contains('s'))
        .unwrap_or(false)
}
