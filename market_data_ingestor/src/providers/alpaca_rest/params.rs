use crate::{
    models::{asset::AssetClass, request_params::BarsRequestParams},
    providers::{ProviderError, ValidationSnafu},
};

const DAILY_TIMEFRAME: &str = "1Day";

pub(crate) fn validate_asset_class(class: AssetClass) -> Result<(), ProviderError> {
    match class {
        AssetClass::UsEquity => Ok(()),
        AssetClass::Index => ValidationSnafu {
            message: "Alpaca does not serve index data".to_string(),
        }
        .fail(),
    }
}

/// Builds the query string for one page of a daily bars request.
///
/// Closes are split-adjusted so moving averages stay continuous across splits.
pub(crate) fn construct_params(params: &BarsRequestParams) -> Vec<(String, String)> {
    vec![
        ("symbols".to_string(), params.symbols.join(",")),
        ("timeframe".to_string(), DAILY_TIMEFRAME.to_string()),
        ("start".to_string(), params.start.to_rfc3339()),
        ("end".to_string(), params.end.to_rfc3339()),
        ("adjustment".to_string(), "split".to_string()),
    ]
}
