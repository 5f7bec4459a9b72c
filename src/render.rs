//! Platform-specific renderings of resolved version parts.

use serde::Serialize;

/// Largest value a Mach-O dylib version component can hold.
pub const DYLIB_COMPONENT_MAX: u32 = 255;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VersionParts {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl VersionParts {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

/// `MAJOR.MINOR.PATCH.0`, used for `CFBundleVersion` style plist fields.
pub fn plist_version_string(parts: &VersionParts) -> String {
    format!("{}.{}.{}.0", parts.major, parts.minor, parts.patch)
}

/// `<MAJOR><MINOR>.<PATCH / 255>.<PATCH % 255>`.
///
/// The second and third dylib components are capped at 255, so PATCH is
/// spread over both of them.
pub fn dylib_version_string(parts: &VersionParts) -> String {
    format!(
        "{}{}.{}.{}",
        parts.major,
        parts.minor,
        parts.patch / DYLIB_COMPONENT_MAX,
        parts.patch % DYLIB_COMPONENT_MAX
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plist_appends_zero_field() {
        assert_eq!(plist_version_string(&VersionParts::new(74, 0, 1)), "74.0.1.0");
        assert_eq!(
            plist_version_string(&VersionParts::new(3, 3729, 1921)),
            "3.3729.1921.0"
        );
    }

    #[test]
    fn dylib_splits_patch_over_two_fields() {
        let parts = VersionParts::new(74, 0, 256);
        let rendered = dylib_version_string(&parts);
        assert_eq!(rendered, "740.1.1");

        let fields: Vec<u32> = rendered
            .split('.')
            .skip(1)
            .map(|field| field.parse().expect("numeric field"))
            .collect();
        assert_eq!(fields[0] * DYLIB_COMPONENT_MAX + fields[1], parts.patch);
    }

    #[test]
    fn dylib_fields_stay_in_range() {
        for patch in [0, 1, 254, 255, 256, 509, 510, 65_024] {
            let rendered = dylib_version_string(&VersionParts::new(74, 2, patch));
            let fields: Vec<u32> = rendered
                .split('.')
                .map(|field| field.parse().expect("numeric field"))
                .collect();
            assert_eq!(fields.len(), 3);
            assert_eq!(fields[0], 742);
            assert!(fields[1] <= DYLIB_COMPONENT_MAX && fields[2] < DYLIB_COMPONENT_MAX);
            assert_eq!(fields[1] * DYLIB_COMPONENT_MAX + fields[2], patch);
        }
    }
}
