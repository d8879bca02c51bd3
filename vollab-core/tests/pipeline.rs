//! Fetch → normalize → compute for a single symbol against the in-memory provider.

use chrono::{TimeZone, Utc};
use vollab_core::data::{normalize, synthetic_candles, InMemoryProvider, SeriesFetcher};
use vollab_core::domain::{MarketCategory, Resolution, Symbol, WindowSize};
use vollab_core::indicators::VolatilityComputer;

const FIFTEEN_MIN_MS: i64 = 15 * 60 * 1000;

#[test]
fn default_window_over_two_days_of_fifteen_minute_candles() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    // 48h of 15m candles, newest first, like the live endpoint.
    let candles = synthetic_candles(192, now.timestamp_millis(), FIFTEEN_MIN_MS, 3_000.0);
    let provider = InMemoryProvider::new().with_candles("ETHUSDT", candles);

    let fetcher = SeriesFetcher::new(&provider, MarketCategory::Spot);
    let raw = fetcher
        .fetch_at(&Symbol::from("ETHUSDT"), 48, Resolution::Min15, now)
        .unwrap();

    let prices = normalize(&raw);
    assert_eq!(prices.len(), 192);
    assert!(prices.is_strictly_ascending());

    let result = VolatilityComputer::new(WindowSize::DEFAULT).run(Symbol::from("ETHUSDT"), prices);
    assert_eq!(result.returns.len(), 191);
    assert_eq!(result.volatility.len(), 191);
    // first window_size - 1 entries are warmup
    assert_eq!(result.volatility.defined_count(), 191 - 7);
    let latest = result.latest_volatility().unwrap();
    assert!(latest > 0.0 && latest < 0.05, "unexpected volatility {latest}");
}

#[test]
fn unparseable_closes_surface_as_missing_latest_value() {
    let provider = InMemoryProvider::new().with_closes(
        "MAVIAUSDT",
        0,
        FIFTEEN_MIN_MS,
        &["1.0", "1.1", "1.2", "1.3", "bad"],
    );
    let fetcher = SeriesFetcher::new(&provider, MarketCategory::Spot);
    let raw = fetcher
        .fetch(&Symbol::from("MAVIAUSDT"), 48, Resolution::Min15)
        .unwrap();
    let result = VolatilityComputer::new(WindowSize::new(2).unwrap())
        .run(Symbol::from("MAVIAUSDT"), normalize(&raw));
    assert_eq!(result.latest_volatility(), None);
    assert!(result.volatility.defined_count() > 0);
}
