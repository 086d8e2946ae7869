//! Pure transforms from provider payloads to indicators and decisions.
//!
//! Nothing in here keeps state between calls: the same inputs always produce
//! the same indicators.

use crate::core::error::ComputationError;
use crate::core::model::{Decision, Indicator, IndicatorKind, TickerSnapshot};
use crate::core::numeric::{SENTINEL, format_fixed, format_percent};
use crate::core::observation::{Payload, RawObservation, SignalLabels, TickerQuote, Valuation};

/// Number of daily closes the moving average needs.
pub const MA_PERIOD: usize = 128;
/// Above the average by more than this percentage is a sell.
pub const MA_SELL_ABOVE_PCT: f64 = 7.0;
/// Below the average by more than this percentage is a buy.
pub const MA_BUY_BELOW_PCT: f64 = -20.0;

/// Inputs of the indicator domain for one asset, merged from every provider
/// call of a cycle (or read whole from the backup).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorInputs {
    pub closes: Option<Vec<f64>>,
    pub price: Option<f64>,
    pub funding_rate: Option<f64>,
    pub labels: SignalLabels,
    pub fear_greed: Option<Valuation>,
    pub mining_cost: Option<Valuation>,
    pub search_interest: Option<Valuation>,
}

impl IndicatorInputs {
    /// Merges one observation into the inputs.
    pub fn absorb(&mut self, observation: RawObservation) -> Result<(), ComputationError> {
        match observation.payload {
            Payload::Closes(closes) => self.closes = Some(closes),
            Payload::Price(price) => self.price = Some(price),
            Payload::FundingRate(rate) => self.funding_rate = Some(rate),
            Payload::SignalLabels(labels) => self.labels = labels,
            Payload::Valuation(valuation) => match valuation.kind {
                IndicatorKind::FearGreedIndex => self.fear_greed = Some(valuation),
                IndicatorKind::MiningCostRatio => self.mining_cost = Some(valuation),
                IndicatorKind::SearchInterest => self.search_interest = Some(valuation),
                other => {
                    return Err(ComputationError::MissingInput(format!(
                        "{} does not carry an upstream valuation",
                        other
                    )));
                }
            },
            Payload::IndicatorBundle(bundle) => *self = bundle,
            other => {
                return Err(ComputationError::MissingInput(format!(
                    "unexpected {} payload from {}",
                    other.kind_name(),
                    observation.provider
                )));
            }
        }
        Ok(())
    }

    pub fn from_observations(
        observations: impl IntoIterator<Item = RawObservation>,
    ) -> Result<Self, ComputationError> {
        let mut inputs = IndicatorInputs::default();
        for observation in observations {
            inputs.absorb(observation)?;
        }
        Ok(inputs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingAverageSignal {
    pub sma: f64,
    pub pct_diff: f64,
    pub decision: Decision,
}

/// Simple average over the last [`MA_PERIOD`] closes.
pub fn simple_moving_average(closes: &[f64], period: usize) -> Result<f64, ComputationError> {
    if period == 0 || closes.len() < period {
        return Err(ComputationError::InsufficientData {
            needed: period,
            got: closes.len(),
        });
    }
    let window = &closes[closes.len() - period..];
    let sma = window.iter().sum::<f64>() / period as f64;
    if !sma.is_finite() {
        return Err(ComputationError::NonFinite("moving average".to_string()));
    }
    Ok(sma)
}

pub fn moving_average_signal(
    closes: &[f64],
    price: f64,
) -> Result<MovingAverageSignal, ComputationError> {
    let sma = simple_moving_average(closes, MA_PERIOD)?;
    let pct_diff = (price - sma) / sma * 100.0;
    if !pct_diff.is_finite() {
        return Err(ComputationError::NonFinite("moving average distance".to_string()));
    }

    let decision = if price > sma {
        if pct_diff > MA_SELL_ABOVE_PCT {
            Decision::Sell
        } else {
            Decision::Hold
        }
    } else if pct_diff < MA_BUY_BELOW_PCT {
        Decision::Buy
    } else {
        Decision::Hold
    };

    Ok(MovingAverageSignal {
        sma,
        pct_diff,
        decision,
    })
}

/// Negative funding (shorts pay longs) is a buy, anything else a sell.
pub fn funding_rate_decision(rate: f64) -> Decision {
    if rate < 0.0 { Decision::Buy } else { Decision::Sell }
}

pub fn knn_decision(label: &str) -> Decision {
    match label.trim() {
        "Above" => Decision::Buy,
        "Below" => Decision::Hold,
        _ => Decision::Unknown,
    }
}

pub fn keltner_decision(label: &str) -> Decision {
    match label.trim() {
        "Upper" => Decision::Buy,
        "Middle" => Decision::Hold,
        "Lower" => Decision::Sell,
        _ => Decision::Unknown,
    }
}

pub fn ai_trend_decision(label: &str) -> Decision {
    match label.trim() {
        "Green" => Decision::Buy,
        "Red" => Decision::Sell,
        _ => Decision::Unknown,
    }
}

fn unknown(kind: IndicatorKind) -> Indicator {
    Indicator {
        kind,
        value: SENTINEL.to_string(),
        decision: Decision::Unknown,
    }
}

fn moving_average_indicator(inputs: &IndicatorInputs) -> Indicator {
    let kind = IndicatorKind::MovingAverage128;
    let (Some(closes), Some(price)) = (inputs.closes.as_deref(), inputs.price) else {
        return unknown(kind);
    };
    match moving_average_signal(closes, price) {
        Ok(signal) => Indicator {
            kind,
            value: format_fixed(signal.sma, 2),
            decision: signal.decision,
        },
        Err(e) => {
            tracing::debug!(error = %e, "Moving average unavailable");
            unknown(kind)
        }
    }
}

fn funding_rate_indicator(inputs: &IndicatorInputs) -> Indicator {
    let kind = IndicatorKind::FundingRate;
    match inputs.funding_rate.filter(|r| r.is_finite()) {
        Some(rate) => Indicator {
            kind,
            value: format_percent(rate * 100.0, 4),
            decision: funding_rate_decision(rate),
        },
        None => unknown(kind),
    }
}

fn label_indicator(
    kind: IndicatorKind,
    label: Option<&str>,
    rule: fn(&str) -> Decision,
) -> Indicator {
    match label.map(str::trim).filter(|l| !l.is_empty()) {
        Some(label) => Indicator {
            kind,
            value: label.to_string(),
            decision: rule(label),
        },
        None => unknown(kind),
    }
}

fn valuation_indicator(kind: IndicatorKind, valuation: Option<&Valuation>) -> Indicator {
    let Some(valuation) = valuation.filter(|v| v.value.is_finite()) else {
        return unknown(kind);
    };
    let value = match kind {
        IndicatorKind::MiningCostRatio => format_fixed(valuation.value, 2),
        _ => format_percent(valuation.value, 2),
    };
    Indicator {
        kind,
        value,
        decision: Decision::from_label(&valuation.label),
    }
}

/// Computes every indicator of the table, in display order.
pub fn compute_indicators(inputs: &IndicatorInputs) -> Vec<Indicator> {
    IndicatorKind::ALL
        .iter()
        .map(|kind| match kind {
            IndicatorKind::MovingAverage128 => moving_average_indicator(inputs),
            IndicatorKind::FundingRate => funding_rate_indicator(inputs),
            IndicatorKind::KnnTrendLine => label_indicator(
                *kind,
                inputs.labels.knn_moving_average.as_deref(),
                knn_decision,
            ),
            IndicatorKind::KeltnerChannel => label_indicator(
                *kind,
                inputs.labels.keltner_channels.as_deref(),
                keltner_decision,
            ),
            IndicatorKind::AiTrendNavigator => label_indicator(
                *kind,
                inputs.labels.ai_trend_navigator.as_deref(),
                ai_trend_decision,
            ),
            IndicatorKind::FearGreedIndex => {
                valuation_indicator(*kind, inputs.fear_greed.as_ref())
            }
            IndicatorKind::MiningCostRatio => {
                valuation_indicator(*kind, inputs.mining_cost.as_ref())
            }
            IndicatorKind::SearchInterest => {
                valuation_indicator(*kind, inputs.search_interest.as_ref())
            }
        })
        .collect()
}

pub fn ticker_snapshot(quote: &TickerQuote) -> Result<TickerSnapshot, ComputationError> {
    if !quote.last_price.is_finite() || !quote.change_percent.is_finite() {
        return Err(ComputationError::NonFinite("ticker".to_string()));
    }
    Ok(TickerSnapshot {
        price: format_fixed(quote.last_price, 2),
        change_percent: format_fixed(quote.change_percent, 2),
        is_loss: quote.change_percent < 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(value: f64) -> Vec<f64> {
        vec![value; MA_PERIOD]
    }

    fn indicator(indicators: &[Indicator], kind: IndicatorKind) -> &Indicator {
        indicators.iter().find(|i| i.kind == kind).unwrap()
    }

    #[test]
    fn test_sma_decision_boundaries() {
        let v = 100.0;
        let eps = 1e-6;

        let sell = moving_average_signal(&flat(v), 1.07 * v + eps).unwrap();
        assert_eq!(sell.decision, Decision::Sell);

        let at_threshold = moving_average_signal(&flat(v), 1.07 * v - eps).unwrap();
        assert_eq!(at_threshold.decision, Decision::Hold);

        let buy = moving_average_signal(&flat(v), 0.79 * v - eps).unwrap();
        assert_eq!(buy.decision, Decision::Buy);

        let dip = moving_average_signal(&flat(v), 0.85 * v).unwrap();
        assert_eq!(dip.decision, Decision::Hold);

        let equal = moving_average_signal(&flat(v), v).unwrap();
        assert_eq!(equal.decision, Decision::Hold);
        assert_eq!(equal.pct_diff, 0.0);
    }

    #[test]
    fn test_sma_uses_last_128_closes() {
        let mut closes = vec![1_000_000.0; 10];
        closes.extend(flat(50.0));
        let signal = moving_average_signal(&closes, 50.0).unwrap();
        assert_eq!(signal.sma, 50.0);
    }

    #[test]
    fn test_sma_insufficient_data_is_unknown() {
        let closes = vec![100.0; MA_PERIOD - 1];
        assert_eq!(
            moving_average_signal(&closes, 100.0),
            Err(ComputationError::InsufficientData {
                needed: MA_PERIOD,
                got: MA_PERIOD - 1
            })
        );

        let inputs = IndicatorInputs {
            closes: Some(closes),
            price: Some(100.0),
            ..Default::default()
        };
        let ma = compute_indicators(&inputs)[0].clone();
        assert_eq!(ma.kind, IndicatorKind::MovingAverage128);
        assert_eq!(ma.value, SENTINEL);
        assert_eq!(ma.decision, Decision::Unknown);
    }

    #[test]
    fn test_increasing_ramp_above_average_sells() {
        // Ramp from 100 to 227: average is 163.5, price 8% above it.
        let closes: Vec<f64> = (0..MA_PERIOD).map(|i| 100.0 + i as f64).collect();
        let sma = simple_moving_average(&closes, MA_PERIOD).unwrap();
        let price = sma * 1.08;
        let signal = moving_average_signal(&closes, price).unwrap();
        assert!((signal.pct_diff - 8.0).abs() < 1e-9);
        assert_eq!(signal.decision, Decision::Sell);
    }

    #[test]
    fn test_funding_rate_decision() {
        assert_eq!(funding_rate_decision(-0.0001), Decision::Buy);
        assert_eq!(funding_rate_decision(0.0001), Decision::Sell);
        assert_eq!(funding_rate_decision(0.0), Decision::Sell);
    }

    #[test]
    fn test_funding_rate_display() {
        let inputs = IndicatorInputs {
            funding_rate: Some(-0.000_123_45),
            ..Default::default()
        };
        let funding = indicator(&compute_indicators(&inputs), IndicatorKind::FundingRate).clone();
        assert_eq!(funding.value, "-0.0123%");
        assert_eq!(funding.decision, Decision::Buy);
    }

    #[test]
    fn test_label_decisions() {
        assert_eq!(knn_decision("Above"), Decision::Buy);
        assert_eq!(knn_decision("Below"), Decision::Hold);
        assert_eq!(keltner_decision("Upper"), Decision::Buy);
        assert_eq!(keltner_decision("Middle"), Decision::Hold);
        assert_eq!(keltner_decision("Lower"), Decision::Sell);
        assert_eq!(ai_trend_decision("Green"), Decision::Buy);
        assert_eq!(ai_trend_decision("Red"), Decision::Sell);
        assert_eq!(ai_trend_decision("N/A"), Decision::Unknown);
    }

    #[test]
    fn test_compute_indicators_full_table() {
        let inputs = IndicatorInputs {
            closes: Some(flat(100.0)),
            price: Some(110.0),
            funding_rate: Some(0.0001),
            labels: SignalLabels {
                knn_moving_average: Some("Above".to_string()),
                keltner_channels: Some("Lower".to_string()),
                ai_trend_navigator: None,
            },
            fear_greed: Some(Valuation {
                kind: IndicatorKind::FearGreedIndex,
                value: -3.456,
                label: "Buy".to_string(),
            }),
            mining_cost: Some(Valuation {
                kind: IndicatorKind::MiningCostRatio,
                value: 1.234,
                label: "Sell".to_string(),
            }),
            search_interest: Some(Valuation {
                kind: IndicatorKind::SearchInterest,
                value: 12.0,
                label: "Neutral".to_string(),
            }),
        };

        let indicators = compute_indicators(&inputs);
        let kinds: Vec<_> = indicators.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, IndicatorKind::ALL.to_vec());

        let ma = indicator(&indicators, IndicatorKind::MovingAverage128);
        assert_eq!(ma.value, "100.00");
        assert_eq!(ma.decision, Decision::Sell);

        assert_eq!(
            indicator(&indicators, IndicatorKind::FundingRate).value,
            "0.0100%"
        );
        assert_eq!(
            indicator(&indicators, IndicatorKind::KnnTrendLine).decision,
            Decision::Buy
        );
        assert_eq!(
            indicator(&indicators, IndicatorKind::KeltnerChannel).decision,
            Decision::Sell
        );

        let ai = indicator(&indicators, IndicatorKind::AiTrendNavigator);
        assert_eq!(ai.value, SENTINEL);
        assert_eq!(ai.decision, Decision::Unknown);

        let fg = indicator(&indicators, IndicatorKind::FearGreedIndex);
        assert_eq!(fg.value, "-3.46%");
        assert_eq!(fg.decision, Decision::Buy);

        let mining = indicator(&indicators, IndicatorKind::MiningCostRatio);
        assert_eq!(mining.value, "1.23");
        assert_eq!(mining.decision, Decision::Sell);

        let trends = indicator(&indicators, IndicatorKind::SearchInterest);
        assert_eq!(trends.value, "12.00%");
        assert_eq!(trends.decision, Decision::Hold);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let inputs = IndicatorInputs {
            closes: Some((0..200).map(|i| 50.0 + (i as f64).sin()).collect()),
            price: Some(51.3),
            funding_rate: Some(-0.00007),
            ..Default::default()
        };
        assert_eq!(compute_indicators(&inputs), compute_indicators(&inputs));
    }

    #[test]
    fn test_absorb_merges_observations() {
        let observations = vec![
            RawObservation::new("klines", None, Payload::Closes(flat(10.0))),
            RawObservation::new("price", None, Payload::Price(10.0)),
            RawObservation::new("funding", None, Payload::FundingRate(-0.001)),
            RawObservation::new(
                "fear-greed",
                None,
                Payload::Valuation(Valuation {
                    kind: IndicatorKind::FearGreedIndex,
                    value: 1.0,
                    label: "Sell".to_string(),
                }),
            ),
        ];
        let inputs = IndicatorInputs::from_observations(observations).unwrap();
        assert_eq!(inputs.closes.as_ref().map(Vec::len), Some(MA_PERIOD));
        assert_eq!(inputs.price, Some(10.0));
        assert_eq!(inputs.funding_rate, Some(-0.001));
        assert!(inputs.fear_greed.is_some());
        assert!(inputs.mining_cost.is_none());
    }

    #[test]
    fn test_absorb_rejects_foreign_payload() {
        let observation = RawObservation::new("calendar", None, Payload::Calendar(vec![]));
        let result = IndicatorInputs::from_observations(vec![observation]);
        assert!(matches!(result, Err(ComputationError::MissingInput(_))));
    }

    #[test]
    fn test_ticker_snapshot() {
        let snapshot = ticker_snapshot(&TickerQuote {
            last_price: 64123.456,
            change_percent: -1.2351,
        })
        .unwrap();
        assert_eq!(snapshot.price, "64123.46");
        assert_eq!(snapshot.change_percent, "-1.24");
        assert!(snapshot.is_loss);

        assert!(
            ticker_snapshot(&TickerQuote {
                last_price: f64::NAN,
                change_percent: 0.0
            })
            .is_err()
        );
    }
}
