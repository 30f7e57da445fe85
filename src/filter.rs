//! Selection of the zones compiled by a batch.

/// Regions whose locales are grouped one level deeper
const NESTED_REGIONS: [&str; 2] = ["America/Argentina", "America/Indiana"];

/// Filter removing obsolete, legacy and abbreviation-only zone ids from a batch
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ZoneFilter {
    /// Zone ids always skipped
    skipped_zones: &'static [&'static str],
    /// Regions whose zones are skipped
    skipped_regions: &'static [&'static str],
    /// Skip regions shaped like an abbreviation, such as `EST` or `EST5EDT`
    skip_abbreviation_regions: bool,
    /// Zone ids kept even when their region is skipped or they have no locale
    kept_zones: &'static [&'static str],
}

impl ZoneFilter {
    /// Filter keeping the canonical `Region/Locale` zones and the legacy zones with distinct rules
    pub const STANDARD: Self = Self {
        skipped_zones: &["America/Indianapolis", "America/Knox_IN", "Asia/Riyadh87", "Asia/Riyadh88", "Asia/Riyadh89"],
        skipped_regions: &["Etc", "GB", "GB-Eire", "GMT0", "NZ", "NZ-CHAT", "SystemV", "W-SU", "Zulu", "Mideast"],
        skip_abbreviation_regions: true,
        kept_zones: &[
            "CST6CDT",
            "EET",
            "EST5EDT",
            "MST7MDT",
            "PST8PDT",
            "SystemV/AST4ADT",
            "SystemV/CST6CDT",
            "SystemV/EST5EDT",
            "SystemV/MST7MDT",
            "SystemV/PST8PDT",
            "SystemV/YST9YDT",
            "WET",
        ],
    };

    /// Construct a filter
    pub const fn new(
        skipped_zones: &'static [&'static str],
        skipped_regions: &'static [&'static str],
        skip_abbreviation_regions: bool,
        kept_zones: &'static [&'static str],
    ) -> Self {
        Self { skipped_zones, skipped_regions, skip_abbreviation_regions, kept_zones }
    }

    /// Returns zone ids always skipped
    pub const fn skipped_zones(&self) -> &'static [&'static str] {
        self.skipped_zones
    }

    /// Returns regions whose zones are skipped
    pub const fn skipped_regions(&self) -> &'static [&'static str] {
        self.skipped_regions
    }

    /// Returns zone ids kept even when their region is skipped or they have no locale
    pub const fn kept_zones(&self) -> &'static [&'static str] {
        self.kept_zones
    }

    /// Check if a zone id passes the filter
    pub fn keeps(&self, zone_id: &str) -> bool {
        if contains(self.skipped_zones, zone_id) {
            return false;
        }

        let (region, locale) = split_zone_id(zone_id);
        let skipped_region = contains(self.skipped_regions, region) || (self.skip_abbreviation_regions && is_abbreviation(region));

        !(locale.is_none() || skipped_region) || contains(self.kept_zones, zone_id)
    }
}

impl Default for ZoneFilter {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Check if a list of ids contains an id
fn contains(ids: &[&str], id: &str) -> bool {
    ids.iter().any(|&x| x == id)
}

/// Split a zone id into its region and locale
fn split_zone_id(zone_id: &str) -> (&str, Option<&str>) {
    for region in NESTED_REGIONS {
        if let Some(locale) = zone_id.strip_prefix(region).and_then(|rest| rest.strip_prefix('/')) {
            if !locale.is_empty() {
                return (region, Some(locale));
            }
        }
    }

    match zone_id.split_once('/') {
        Some((region, locale)) => (region, Some(locale)),
        None => (zone_id, None),
    }
}

/// Check if a region is three uppercase letters, optionally followed by a digit and three more uppercase letters
fn is_abbreviation(region: &str) -> bool {
    let bytes = region.as_bytes();
    let is_upper = |chunk: &[u8]| chunk.iter().all(u8::is_ascii_uppercase);

    match bytes {
        [a, b, c] => is_upper(&[*a, *b, *c]),
        [a, b, c, digit, d, e, f] => is_upper(&[*a, *b, *c, *d, *e, *f]) && digit.is_ascii_digit(),
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split_zone_id() {
        assert_eq!(split_zone_id("Europe/Paris"), ("Europe", Some("Paris")));
        assert_eq!(split_zone_id("America/Indiana/Knox"), ("America/Indiana", Some("Knox")));
        assert_eq!(split_zone_id("America/Argentina/Buenos_Aires"), ("America/Argentina", Some("Buenos_Aires")));
        assert_eq!(split_zone_id("America/Indianapolis"), ("America", Some("Indianapolis")));
        assert_eq!(split_zone_id("Etc/GMT+1"), ("Etc", Some("GMT+1")));
        assert_eq!(split_zone_id("UTC"), ("UTC", None));
    }

    #[test]
    fn test_is_abbreviation() {
        assert!(is_abbreviation("EST"));
        assert!(is_abbreviation("EST5EDT"));
        assert!(is_abbreviation("PRC"));
        assert!(!is_abbreviation("Est"));
        assert!(!is_abbreviation("ESTEDT"));
        assert!(!is_abbreviation("Europe"));
        assert!(!is_abbreviation("GMT0"));
    }

    #[test]
    fn test_standard_filter() {
        let filter = ZoneFilter::STANDARD;

        for zone_id in ["Europe/Paris", "America/Indiana/Knox", "America/Argentina/Salta", "CST6CDT", "EET", "SystemV/EST5EDT", "Pacific/Auckland"] {
            assert!(filter.keeps(zone_id), "{zone_id}");
        }

        for zone_id in ["America/Indianapolis", "America/Knox_IN", "Asia/Riyadh87", "Etc/GMT+1", "UTC", "EST", "GB", "NZ-CHAT", "SystemV/AST4", "Zulu"] {
            assert!(!filter.keeps(zone_id), "{zone_id}");
        }
    }

    #[test]
    fn test_custom_filter() {
        const FILTER: ZoneFilter = ZoneFilter::new(&["Test/Skipped"], &["Old"], false, &["Old/Kept", "Single"]);

        assert!(!FILTER.keeps("Test/Skipped"));
        assert!(FILTER.keeps("Test/Zone"));
        assert!(!FILTER.keeps("Old/Zone"));
        assert!(FILTER.keeps("Old/Kept"));
        assert!(FILTER.keeps("Single"));
        assert!(!FILTER.keeps("Other"));
        assert!(FILTER.keeps("ABC/Zone"));

        assert_eq!(FILTER.skipped_zones(), ["Test/Skipped"]);
        assert_eq!(FILTER.skipped_regions(), ["Old"]);
        assert_eq!(FILTER.kept_zones(), ["Old/Kept", "Single"]);
    }
}
