use async_trait::async_trait;
use governor::DefaultDirectRateLimiter;
use indexmap::IndexMap;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{
        bar::{Bar, BarSeries},
        request_params::BarsRequestParams,
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidApiKeySnafu, MarketConfig,
        MissingEnvVarSnafu, ProviderError, ProviderInitError, ReqwestSnafu,
        alpaca_rest::{
            params::{construct_params, validate_asset_class},
            response::{AlpacaBar, AlpacaResponse},
        },
        rate_limiter,
    },
    session::{DEFAULT_EXCHANGE_TZ, session_date},
};

const BASE_URL: &str = "https://data.alpaca.markets";

pub struct AlpacaProvider {
    client: Client,
    base_url: String,
    limiter: DefaultDirectRateLimiter,
    _api_key: SecretString,
    _secret_key: SecretString,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables.
    pub fn new(config: &MarketConfig) -> Result<Self, ProviderInitError> {
        let api_key = SecretString::new(get_env_var("APCA_API_KEY_ID").context(MissingEnvVarSnafu)?.into());
        let secret_key =
            SecretString::new(get_env_var("APCA_API_SECRET_KEY").context(MissingEnvVarSnafu)?.into());

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(api_key.expose_secret()).context(InvalidApiKeySnafu)?,
        );
        headers.insert(
            "APCA-API-SECRET-KEY",
            header::HeaderValue::from_str(secret_key.expose_secret()).context(InvalidApiKeySnafu)?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone().unwrap_or_else(|| BASE_URL.to_string()),
            limiter: rate_limiter(config.requests_per_second),
            _api_key: api_key,
            _secret_key: secret_key,
        })
    }
}

fn to_bar(ab: AlpacaBar) -> Bar {
    Bar {
        timestamp: ab.timestamp,
        date: session_date(ab.timestamp, DEFAULT_EXCHANGE_TZ),
        open: ab.open,
        high: ab.high,
        low: ab.low,
        close: ab.close,
        volume: ab.volume,
        trade_count: Some(ab.trade_count),
        vwap: Some(ab.vwap),
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        // Validate the request before spending a round trip on it.
        validate_asset_class(params.asset_class)?;

        let url = format!("{}/v2/stocks/bars", self.base_url.trim_end_matches('/'));
        let mut all_bars: IndexMap<String, Vec<AlpacaBar>> = IndexMap::new();
        let mut next_page_token: Option<String> = None;

        loop {
            let mut query_params = construct_params(&params);
            if let Some(token) = &next_page_token {
                query_params.push(("page_token".to_string(), token.clone()));
            }

            self.limiter.until_ready().await;
            let response = self
                .client
                .get(&url)
                .query(&query_params)
                .send()
                .await
                .context(ReqwestSnafu)?;

            if !response.status().is_success() {
                let status = response.status();
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown API error".to_string());
                return ApiSnafu {
                    message: format!("{status}: {error_msg}"),
                }
                .fail();
            }

            let alpaca_response = response.json::<AlpacaResponse>().await.context(ReqwestSnafu)?;

            // Merge the bars from the current page into our collection.
            for (symbol, bars) in alpaca_response.bars.unwrap_or_default() {
                all_bars.entry(symbol).or_default().extend(bars);
            }

            // If there's a next page token, use it for the next iteration. Otherwise, we're done.
            match alpaca_response.next_page_token {
                Some(token) => {
                    debug!(page_token = %token, "alpaca: fetching next page");
                    next_page_token = Some(token);
                }
                None => break,
            }
        }

        // One series per requested symbol, in request order, empty when Alpaca had nothing.
        let result = params
            .symbols
            .iter()
            .map(|symbol| BarSeries {
                symbol: symbol.clone(),
                bars: all_bars
                    .shift_remove(symbol)
                    .unwrap_or_default()
                    .into_iter()
                    .map(to_bar)
                    .collect(),
            })
            .collect();

        Ok(result)
    }
}
