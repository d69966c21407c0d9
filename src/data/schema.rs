use std::collections::BTreeMap;

use tracing::debug;

pub const SCHEME_NAME: &str = "SchemeName";
pub const DATE_VALUED: &str = "DateValued";
pub const NET_ASSET_VALUE: &str = "NetAssetValue";
pub const NAV_PER_UNIT: &str = "NavPerUnit";
pub const SALE_PRICE_PER_UNIT: &str = "SalePricePerUnit";
pub const REPURCHASE_PRICE_UNIT: &str = "RepurchasePriceUnit";
pub const OUTSTANDING_UNITS: &str = "OutstandingNumberofUnits";

pub const PROFIT: &str = "Profit";
pub const PROFIT_MARGIN: &str = "ProfitMargin";
pub const DAILY_RETURN: &str = "DailyReturn";
pub const NAV_MA7: &str = "NAV_MA7";
pub const VOLATILITY_7D: &str = "7DVolatility";

/// Columns every input table must have after header normalization.
pub const MANDATORY_COLUMNS: [&str; 7] = [
    SCHEME_NAME,
    DATE_VALUED,
    NET_ASSET_VALUE,
    NAV_PER_UNIT,
    SALE_PRICE_PER_UNIT,
    REPURCHASE_PRICE_UNIT,
    OUTSTANDING_UNITS,
];

/// Financial columns that are always cast to float, even if the generic pass left them as text.
pub const FLOAT_COLUMNS: [&str; 4] = [
    SALE_PRICE_PER_UNIT,
    REPURCHASE_PRICE_UNIT,
    OUTSTANDING_UNITS,
    NET_ASSET_VALUE,
];

/// Columns the metrics engine computes. They are never read from input.
pub const DERIVED_COLUMNS: [&str; 5] = [PROFIT, PROFIT_MARGIN, DAILY_RETURN, NAV_MA7, VOLATILITY_7D];

/// Strips whitespace and `/` from a raw header, then applies the rename map.
///
/// Unknown headers pass through with only the stripping applied.
pub fn normalize_header(raw: &str, renames: &BTreeMap<String, String>) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '/')
        .collect();
    match renames.get(&stripped) {
        Some(canonical) => canonical.clone(),
        None => stripped,
    }
}

pub fn normalize_headers(raw: &[String], renames: &BTreeMap<String, String>) -> Vec<String> {
    raw.iter()
        .map(|header| {
            let normalized = normalize_header(header, renames);
            if normalized != *header {
                debug!("Renamed column {:?} to {:?}", header, normalized);
            }
            normalized
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_renames() -> BTreeMap<String, String> {
        BTreeMap::from([(
            "SalePriceperUnit".to_string(),
            "SalePricePerUnit".to_string(),
        )])
    }

    #[test]
    fn test_strips_whitespace_and_slashes() {
        let raw = vec![
            " Scheme Name ".to_string(),
            "Date\tValued".to_string(),
            "Nav Per Unit/".to_string(),
            "Outstanding Number of Units".to_string(),
        ];
        let headers = normalize_headers(&raw, &default_renames());
        assert_eq!(
            headers,
            vec![
                "SchemeName",
                "DateValued",
                "NavPerUnit",
                "OutstandingNumberofUnits"
            ]
        );
        for header in &headers {
            assert!(!header.chars().any(|c| c.is_whitespace() || c == '/'));
        }
    }

    #[test]
    fn test_applies_rename_after_stripping() {
        assert_eq!(
            normalize_header("Sale Price per Unit", &default_renames()),
            "SalePricePerUnit"
        );
        assert_eq!(
            normalize_header("SalePriceperUnit", &default_renames()),
            "SalePricePerUnit"
        );
    }

    #[test]
    fn test_unknown_headers_pass_through() {
        assert_eq!(normalize_header("Remarks", &default_renames()), "Remarks");
        assert_eq!(normalize_header("", &default_renames()), "");
    }
}
