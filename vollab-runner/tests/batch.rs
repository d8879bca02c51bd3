use vollab_core::data::{FetchCause, InMemoryProvider, RawCandle};
use vollab_core::domain::{Symbol, WindowSize};
use vollab_runner::{
    aggregate, rank, BatchConfig, BatchOutcome, BatchRunner, ColorBand, SymbolError,
};

const STEP_MS: i64 = 15 * 60 * 1000;

/// Candles (newest first, like the exchange) whose closes swing by `amplitude`.
fn swinging(count: usize, amplitude: f64) -> Vec<RawCandle> {
    (0..count)
        .rev()
        .map(|i| {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            let close = 100.0 * (1.0 + sign * amplitude);
            RawCandle::from_close(1_700_000_000_000 + STEP_MS * i as i64, format!("{close:.6}"))
        })
        .collect()
}

fn symbols(names: &[&str]) -> Vec<Symbol> {
    names.iter().copied().map(Symbol::from).collect()
}

fn config(concurrency: usize) -> BatchConfig {
    BatchConfig {
        window_size: WindowSize::new(8).unwrap(),
        max_concurrency: concurrency,
        ..BatchConfig::default()
    }
}

#[test]
fn one_failing_symbol_does_not_sink_the_batch() {
    let provider = InMemoryProvider::new()
        .with_candles("A", swinging(40, 0.01))
        .with_failure("B", FetchCause::Timeout { timeout_secs: 10 })
        .with_candles("C", swinging(40, 0.03));

    let batch = aggregate(&provider, &symbols(&["A", "B", "C"]), &config(4));

    let present: Vec<&str> = batch.entries().iter().map(|e| e.symbol().as_str()).collect();
    assert_eq!(present, vec!["A", "C"]);
    assert_eq!(batch.failures().len(), 1);
    let failure = &batch.failures()[0];
    assert_eq!(failure.input_index, 1);
    assert_eq!(failure.error.symbol().as_str(), "B");
    assert!(matches!(
        &failure.error,
        SymbolError::Fetch(e) if e.cause == FetchCause::Timeout { timeout_secs: 10 }
    ));

    let ranked = rank(&batch);
    assert_eq!(ranked[0].symbol.as_str(), "C");
    assert_eq!(ranked[0].band, ColorBand::Hot);
    assert_eq!(ranked[1].symbol.as_str(), "A");
    assert_eq!(ranked[1].band, ColorBand::Calm);
}

#[test]
fn equal_volatility_keeps_input_order_through_a_parallel_batch() {
    let provider = InMemoryProvider::new()
        .with_candles("X", swinging(40, 0.01))
        .with_candles("Y", swinging(40, 0.04))
        .with_candles("Z", swinging(40, 0.01));

    let batch = aggregate(&provider, &symbols(&["X", "Y", "Z"]), &config(3));
    let ranked = rank(&batch);

    let order: Vec<&str> = ranked.iter().map(|e| e.symbol.as_str()).collect();
    assert_eq!(order, vec!["Y", "X", "Z"]);
    assert_eq!(ranked[1].value, ranked[2].value);
    assert_eq!(ranked[0].normalized_position, 1.0);
    assert_eq!(ranked[1].normalized_position, 0.0);
    assert_eq!(ranked[2].normalized_position, 0.0);
}

#[test]
fn all_symbols_failing_gives_an_empty_batch() {
    let provider = InMemoryProvider::new()
        .with_failure("A", FetchCause::EmptyData)
        .with_candles("B", swinging(5, 0.02));

    let batch = aggregate(&provider, &symbols(&["A", "B", "UNKNOWN"]), &config(2));

    assert!(batch.is_empty());
    assert_eq!(batch.failures().len(), 3);
    assert_eq!(batch.failures()[1].error.kind(), "insufficient_history");
    assert!(rank(&batch).is_empty());
}

#[test]
fn output_order_does_not_depend_on_concurrency() {
    let names: Vec<String> = (0..12).map(|i| format!("SYM{i}USDT")).collect();
    let provider = names
        .iter()
        .enumerate()
        .fold(InMemoryProvider::new(), |p, (i, name)| {
            p.with_candles(name, swinging(60, 0.002 * (i % 5 + 1) as f64))
        });
    let list: Vec<Symbol> = names.iter().map(|n| Symbol::from(n.as_str())).collect();

    let serial = aggregate(&provider, &list, &config(1));
    let parallel = aggregate(&provider, &list, &config(4));

    assert_eq!(serial, parallel);
    assert_eq!(rank(&serial), rank(&parallel));
    let order: Vec<usize> = parallel.entries().iter().map(|e| e.input_index).collect();
    assert_eq!(order, (0..12).collect::<Vec<_>>());
}

#[test]
fn alternating_prices_give_the_expected_latest_value() {
    // Closes alternate 101 / 99, so returns alternate +-(2/99 or 2/101).
    let provider = InMemoryProvider::new().with_candles("ETHUSDT", swinging(30, 0.01));
    let batch = aggregate(&provider, &symbols(&["ETHUSDT"]), &config(1));

    let result = batch.result_for(&Symbol::from("ETHUSDT")).unwrap();
    assert_eq!(result.prices.len(), 30);
    assert_eq!(result.returns.len(), 29);
    assert_eq!(result.volatility.defined_count(), 29 - 8 + 1);

    let tail: Vec<f64> = result.returns.values()[21..]
        .iter()
        .map(|v| v.unwrap())
        .collect();
    let mean = tail.iter().sum::<f64>() / 8.0;
    let var = tail.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 7.0;
    let latest = batch.latest(&Symbol::from("ETHUSDT")).unwrap();
    assert!((latest - var.sqrt()).abs() < 1e-12);
}

#[test]
fn runner_completes_when_nothing_interrupts_it() {
    let provider = InMemoryProvider::new().with_candles("SOLUSDT", swinging(20, 0.01));
    let runner = BatchRunner::new();
    match runner.run(&provider, &symbols(&["SOLUSDT"]), &config(2)) {
        BatchOutcome::Completed(batch) => assert_eq!(batch.len(), 1),
        BatchOutcome::Superseded => panic!("batch should not be superseded"),
    }
}
