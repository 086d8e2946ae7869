use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;

use crate::aggregation::poller::Refresh;
use crate::core::calendar::group_by_date;
use crate::core::error::{BackupUnavailable, ComputationError, RefreshError};
use crate::core::holdings::compute_holdings;
use crate::core::indicators::{IndicatorInputs, compute_indicators, ticker_snapshot};
use crate::core::model::{Asset, Domain};
use crate::core::observation::{Payload, RawObservation};
use crate::core::provider::ProviderClient;
use crate::core::view::ViewContent;
use crate::providers::BackupSnapshotStore;

/// Turns the observations of one key into its view content.
pub fn compute_view(
    domain: Domain,
    observations: Vec<RawObservation>,
) -> Result<ViewContent, ComputationError> {
    if domain == Domain::Indicators {
        let inputs = IndicatorInputs::from_observations(observations)?;
        return Ok(ViewContent::Indicators(compute_indicators(&inputs)));
    }

    let mut observations = observations.into_iter();
    let observation = observations
        .next()
        .ok_or_else(|| ComputationError::MissingInput(format!("no {domain} observation")))?;
    if let Some(extra) = observations.next() {
        return Err(ComputationError::MissingInput(format!(
            "unexpected second {domain} observation from {}",
            extra.provider
        )));
    }

    let provider = observation.provider;
    match (domain, observation.payload) {
        (Domain::Entities, Payload::Entities(reports)) => {
            Ok(ViewContent::Entities(compute_holdings(&reports)))
        }
        (Domain::EconomicCalendar, Payload::Calendar(events)) => {
            Ok(ViewContent::EconomicCalendar(group_by_date(&events)))
        }
        (Domain::SignalHistory, Payload::SignalHistory(entries)) => {
            Ok(ViewContent::SignalHistory(entries))
        }
        (Domain::Ticker, Payload::Ticker(quote)) => {
            Ok(ViewContent::Ticker(ticker_snapshot(&quote)?))
        }
        (domain, payload) => Err(ComputationError::MissingInput(format!(
            "unexpected {} payload from {provider} for {domain}",
            payload.kind_name()
        ))),
    }
}

/// Refresher backed by a set of provider clients and the backup snapshot.
///
/// Every client is called for each key in a live attempt; a single failure
/// fails the attempt.
pub struct DomainRefresh {
    domain: Domain,
    providers: Vec<Arc<dyn ProviderClient>>,
    backup: Arc<BackupSnapshotStore>,
}

impl DomainRefresh {
    pub fn new(
        domain: Domain,
        providers: Vec<Arc<dyn ProviderClient>>,
        backup: Arc<BackupSnapshotStore>,
    ) -> Self {
        debug_assert!(providers.iter().all(|p| p.domain() == domain));
        DomainRefresh {
            domain,
            providers,
            backup,
        }
    }
}

#[async_trait]
impl Refresh for DomainRefresh {
    fn domain(&self) -> Domain {
        self.domain
    }

    async fn live(&self, asset: Option<&Asset>) -> Result<ViewContent, RefreshError> {
        let observations =
            try_join_all(self.providers.iter().map(|provider| provider.fetch(asset))).await?;
        Ok(compute_view(self.domain, observations)?)
    }

    async fn backup(&self, asset: Option<&Asset>) -> Result<ViewContent, BackupUnavailable> {
        let observation = self.backup.load(self.domain, asset).await?;
        compute_view(self.domain, vec![observation])
            .map_err(|e| BackupUnavailable::new(self.domain, asset, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{ProviderError, ProviderErrorKind};
    use crate::core::model::{Decision, EconomicEvent, IndicatorKind};
    use crate::core::numeric::SENTINEL;
    use crate::core::observation::{SignalLabels, TickerQuote};
    use crate::providers::backup::BackupDocument;

    struct Fixed {
        name: &'static str,
        domain: Domain,
        result: Result<Payload, ProviderErrorKind>,
    }

    impl Fixed {
        fn ok(name: &'static str, domain: Domain, payload: Payload) -> Arc<dyn ProviderClient> {
            Arc::new(Fixed {
                name,
                domain,
                result: Ok(payload),
            })
        }

        fn failing(name: &'static str, domain: Domain) -> Arc<dyn ProviderClient> {
            Arc::new(Fixed {
                name,
                domain,
                result: Err(ProviderErrorKind::Status(502)),
            })
        }
    }

    #[async_trait]
    impl ProviderClient for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn domain(&self) -> Domain {
            self.domain
        }

        async fn fetch(&self, asset: Option<&Asset>) -> Result<RawObservation, ProviderError> {
            match &self.result {
                Ok(payload) => Ok(RawObservation::new(self.name, asset, payload.clone())),
                Err(kind) => Err(ProviderError::new(self.name, kind.clone())),
            }
        }
    }

    fn empty_backup() -> Arc<BackupSnapshotStore> {
        Arc::new(BackupSnapshotStore::from_document(BackupDocument::default()))
    }

    fn event(date: &str, name: &str) -> EconomicEvent {
        EconomicEvent {
            date: date.to_string(),
            time: "08:30:00".to_string(),
            event_name: name.to_string(),
            actual_value: None,
            consensus_value: None,
            previous_value: None,
            forecast_value: None,
        }
    }

    #[tokio::test]
    async fn test_indicator_live_merges_all_providers() {
        let closes: Vec<f64> = (1..=128).map(f64::from).collect();
        let refresh = DomainRefresh::new(
            Domain::Indicators,
            vec![
                Fixed::ok("klines", Domain::Indicators, Payload::Closes(closes)),
                Fixed::ok("price", Domain::Indicators, Payload::Price(64.5)),
                Fixed::ok("funding", Domain::Indicators, Payload::FundingRate(-0.0001)),
                Fixed::ok(
                    "labels",
                    Domain::Indicators,
                    Payload::SignalLabels(SignalLabels {
                        keltner_channels: Some("Lower".to_string()),
                        ..Default::default()
                    }),
                ),
            ],
            empty_backup(),
        );

        let content = refresh.live(Some(&Asset::new("BTC"))).await.unwrap();
        let ViewContent::Indicators(indicators) = content else {
            panic!("expected indicators");
        };
        assert_eq!(indicators.len(), IndicatorKind::ALL.len());
        let by_kind = |kind| indicators.iter().find(|i| i.kind == kind).unwrap();
        assert_eq!(by_kind(IndicatorKind::MovingAverage128).value, "64.50");
        assert_eq!(by_kind(IndicatorKind::FundingRate).decision, Decision::Buy);
        assert_eq!(by_kind(IndicatorKind::KeltnerChannel).decision, Decision::Sell);
        assert_eq!(by_kind(IndicatorKind::AiTrendNavigator).value, SENTINEL);
    }

    #[tokio::test]
    async fn test_one_failing_provider_fails_the_attempt() {
        let refresh = DomainRefresh::new(
            Domain::Indicators,
            vec![
                Fixed::ok("price", Domain::Indicators, Payload::Price(1.0)),
                Fixed::failing("funding", Domain::Indicators),
            ],
            empty_backup(),
        );
        let err = refresh.live(Some(&Asset::new("BTC"))).await.unwrap_err();
        match err {
            RefreshError::Provider(e) => assert_eq!(e.provider, "funding"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unexpected_payload_is_computation_error() {
        let refresh = DomainRefresh::new(
            Domain::Entities,
            vec![Fixed::ok("wrong", Domain::Entities, Payload::Price(1.0))],
            empty_backup(),
        );
        let err = refresh.live(Some(&Asset::new("BTC"))).await.unwrap_err();
        assert!(matches!(err, RefreshError::Computation(_)));
    }

    #[tokio::test]
    async fn test_calendar_and_ticker_views() {
        let refresh = DomainRefresh::new(
            Domain::EconomicCalendar,
            vec![Fixed::ok(
                "calendar",
                Domain::EconomicCalendar,
                Payload::Calendar(vec![
                    event("2024-05-01", "CPI"),
                    event("2024-05-02", "PPI"),
                    event("2024-05-01", "Retail Sales"),
                ]),
            )],
            empty_backup(),
        );
        let ViewContent::EconomicCalendar(days) = refresh.live(None).await.unwrap() else {
            panic!("expected calendar");
        };
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].events.len(), 2);

        let refresh = DomainRefresh::new(
            Domain::Ticker,
            vec![Fixed::ok(
                "ticker",
                Domain::Ticker,
                Payload::Ticker(TickerQuote {
                    last_price: 100.0,
                    change_percent: -0.5,
                }),
            )],
            empty_backup(),
        );
        let ViewContent::Ticker(ticker) = refresh.live(Some(&Asset::new("BTC"))).await.unwrap()
        else {
            panic!("expected ticker");
        };
        assert!(ticker.is_loss);
    }

    #[tokio::test]
    async fn test_backup_without_entry_is_unavailable() {
        let refresh = DomainRefresh::new(Domain::SignalHistory, vec![], empty_backup());
        let err = refresh.backup(None).await.unwrap_err();
        assert_eq!(err.domain, Domain::SignalHistory);
    }
}
