use crate::models::delivery_zones::DeliveryZoneEntity;

/// Membership test against a comma-separated config list. Tokens and the
/// needle are trimmed and lowercased, so " 10002 " matches "10001, 10002".
fn list_contains(list: Option<&str>, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    match list {
        Some(list) => list
            .split(',')
            .map(|token| token.trim().to_lowercase())
            .any(|token| token == needle),
        None => false,
    }
}

/// First zone whose postal-code list contains the code. `zones` must already
/// be in configuration order (sort_order ascending): zones are allowed to
/// overlap and the first match is authoritative.
pub fn find_zone_by_postal_code<'a>(
    zones: &'a [DeliveryZoneEntity],
    postal_code: &str,
) -> Option<&'a DeliveryZoneEntity> {
    zones
        .iter()
        .find(|zone| list_contains(zone.postal_codes.as_deref(), postal_code))
}

/// Symmetric lookup over the zones' area-name lists.
pub fn find_zone_by_area<'a>(
    zones: &'a [DeliveryZoneEntity],
    area_name: &str,
) -> Option<&'a DeliveryZoneEntity> {
    zones
        .iter()
        .find(|zone| list_contains(zone.area_names.as_deref(), area_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn zone(name: &str, postal_codes: Option<&str>, area_names: Option<&str>) -> DeliveryZoneEntity {
        DeliveryZoneEntity {
            id: Uuid::from_u128(name.len() as u128),
            name: name.to_string(),
            description: None,
            delivery_fee: "3.99".parse::<Decimal>().unwrap(),
            minimum_order: None,
            estimated_delivery_minutes: Some(30),
            postal_codes: postal_codes.map(str::to_string),
            area_names: area_names.map(str::to_string),
            is_active: true,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn matches_postal_code_with_whitespace_and_case_noise() {
        let zones = vec![zone("Downtown", Some("10001, 10002"), None)];
        assert!(find_zone_by_postal_code(&zones, " 10002 ").is_some());
        assert!(find_zone_by_postal_code(&zones, "10003").is_none());
    }

    #[test]
    fn area_names_match_case_insensitively() {
        let zones = vec![zone("North", None, Some("Riverside , Old Town"))];
        assert_eq!(
            find_zone_by_area(&zones, "old town").unwrap().name,
            "North"
        );
        assert_eq!(
            find_zone_by_area(&zones, "  RIVERSIDE").unwrap().name,
            "North"
        );
        assert!(find_zone_by_area(&zones, "Harbor").is_none());
    }

    #[test]
    fn overlapping_zones_resolve_to_the_first_in_config_order() {
        // Both zones list 400001; the caller supplies them sorted by
        // sort_order, so the first entry must win every time.
        let zones = vec![
            zone("Inner", Some("400001"), None),
            zone("Outer", Some("400001, 400002"), None),
        ];
        assert_eq!(
            find_zone_by_postal_code(&zones, "400001").unwrap().name,
            "Inner"
        );
        assert_eq!(
            find_zone_by_postal_code(&zones, "400002").unwrap().name,
            "Outer"
        );
    }

    #[test]
    fn zone_without_a_postal_list_never_matches_by_postal_code() {
        let zones = vec![zone("AreaOnly", None, Some("Midtown"))];
        assert!(find_zone_by_postal_code(&zones, "10001").is_none());
        assert!(find_zone_by_area(&zones, "Midtown").is_some());
    }
}
