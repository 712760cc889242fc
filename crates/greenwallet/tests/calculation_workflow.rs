//! End-to-end scenarios for the calculators and the record service.
//!
//! Everything here goes through the public crate surface: the calculator dispatch, the
//! calculation service with in-memory collaborators, and the HTTP router.

mod common {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    use chrono::Utc;

    use greenwallet::calculators::{CalculationType, ImpactSummary};
    use greenwallet::config::HistoryConfig;
    use greenwallet::records::{
        AggregatorError, CalculationId, CalculationRecord, CalculationRepository,
        CalculationService, HistoryQuery, NewCalculation, NewProfilePreset, ProfileId,
        ProfilePreset, ProfileRepository, RepositoryError, StatsAggregator, StatsTally, UserId,
        UserStats,
    };

    #[derive(Default)]
    pub struct Records {
        rows: Mutex<Vec<CalculationRecord>>,
        sequence: AtomicU64,
    }

    impl CalculationRepository for Records {
        fn create(&self, calculation: NewCalculation) -> Result<CalculationRecord, RepositoryError> {
            let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            let record = calculation.into_record(CalculationId(format!("calc-{seq:06}")), Utc::now());
            self.rows.lock().expect("records poisoned").push(record.clone());
            Ok(record)
        }

        fn list(
            &self,
            user_id: &UserId,
            query: &HistoryQuery,
        ) -> Result<Vec<CalculationRecord>, RepositoryError> {
            let rows = self.rows.lock().expect("records poisoned");
            Ok(query.apply(rows.iter().filter(|row| &row.user_id == user_id).cloned()))
        }

        fn fetch(
            &self,
            user_id: &UserId,
            id: &CalculationId,
        ) -> Result<Option<CalculationRecord>, RepositoryError> {
            let rows = self.rows.lock().expect("records poisoned");
            Ok(rows
                .iter()
                .find(|row| &row.user_id == user_id && &row.id == id)
                .cloned())
        }

        fn delete(
            &self,
            user_id: &UserId,
            id: &CalculationId,
        ) -> Result<CalculationRecord, RepositoryError> {
            let mut rows = self.rows.lock().expect("records poisoned");
            let index = rows
                .iter()
                .position(|row| &row.user_id == user_id && &row.id == id)
                .ok_or(RepositoryError::NotFound)?;
            Ok(rows.remove(index))
        }
    }

    #[derive(Default)]
    pub struct Presets {
        rows: Mutex<Vec<ProfilePreset>>,
    }

    impl ProfileRepository for Presets {
        fn create(&self, preset: NewProfilePreset) -> Result<ProfilePreset, RepositoryError> {
            let mut rows = self.rows.lock().expect("presets poisoned");
            let preset =
                preset.into_preset(ProfileId(format!("profile-{}", rows.len() + 1)), Utc::now());
            rows.push(preset.clone());
            Ok(preset)
        }

        fn by_type(
            &self,
            user_id: &UserId,
            calculation_type: CalculationType,
        ) -> Result<Vec<ProfilePreset>, RepositoryError> {
            let rows = self.rows.lock().expect("presets poisoned");
            Ok(rows
                .iter()
                .filter(|row| &row.user_id == user_id && row.calculation_type == calculation_type)
                .cloned()
                .collect())
        }

        fn delete(&self, user_id: &UserId, id: &ProfileId) -> Result<(), RepositoryError> {
            let mut rows = self.rows.lock().expect("presets poisoned");
            let before = rows.len();
            rows.retain(|row| !(&row.user_id == user_id && &row.id == id));
            if rows.len() == before {
                Err(RepositoryError::NotFound)
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    pub struct Totals {
        tallies: Mutex<HashMap<UserId, StatsTally>>,
    }

    impl StatsAggregator for Totals {
        fn record_added(
            &self,
            user_id: &UserId,
            summary: &ImpactSummary,
        ) -> Result<UserStats, AggregatorError> {
            let mut tallies = self.tallies.lock().expect("totals poisoned");
            let tally = tallies.entry(user_id.clone()).or_default();
            tally.add(summary);
            Ok(tally.stats())
        }

        fn record_removed(
            &self,
            user_id: &UserId,
            summary: &ImpactSummary,
        ) -> Result<UserStats, AggregatorError> {
            let mut tallies = self.tallies.lock().expect("totals poisoned");
            let tally = tallies.entry(user_id.clone()).or_default();
            tally.remove(summary);
            Ok(tally.stats())
        }

        fn rebuild(
            &self,
            user_id: &UserId,
            records: &[CalculationRecord],
        ) -> Result<UserStats, AggregatorError> {
            let tally = StatsTally::from_records(records);
            self.tallies
                .lock()
                .expect("totals poisoned")
                .insert(user_id.clone(), tally);
            Ok(tally.stats())
        }

        fn stats(&self, user_id: &UserId) -> Result<UserStats, AggregatorError> {
            let tallies = self.tallies.lock().expect("totals poisoned");
            Ok(tallies.get(user_id).map(StatsTally::stats).unwrap_or_default())
        }
    }

    pub type Service = CalculationService<Records, Presets, Totals>;

    pub fn service() -> Arc<Service> {
        Arc::new(CalculationService::new(
            Arc::new(Records::default()),
            Arc::new(Presets::default()),
            Arc::new(Totals::default()),
            HistoryConfig::default(),
        ))
    }
}

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use greenwallet::calculators::{
    ApplianceAction, CalculationOutcome, CalculationRequest, ElectricityInput, Frequency,
    ImpactOutcome, RateTable, SolarInput, TransportInput, TransportMode, ValidationError,
    WaterAction, WaterInput,
};
use greenwallet::records::{calculation_router, CalculationServiceError, UserId, USER_HEADER};
use serde_json::{json, Value};
use tower::ServiceExt;

fn close(actual: f64, expected: f64, tolerance: f64) -> bool {
    (actual - expected).abs() < tolerance
}

fn run(request: CalculationRequest) -> CalculationOutcome {
    request
        .calculate(&RateTable::STANDARD)
        .expect("valid input")
}

#[test]
fn solar_scenario() {
    let outcome = run(CalculationRequest::Solar(SolarInput {
        monthly_bill_rupees: None,
        rooftop_area_sqft: Some(500.0),
        sunlight_hours_per_day: Some(6.0),
    }));
    let CalculationOutcome::Solar(result) = &outcome else {
        panic!("expected solar outcome");
    };

    assert!(close(result.system_capacity_kw, 5.0, 1e-9));
    assert!(close(result.monthly_generation_kwh, 720.0, 1e-9));
    assert!(close(result.money_saved, 4320.0, 1e-9));
    assert!(close(result.annual_co2_reduction_kg, 7084.8, 1e-6));
    assert_eq!(result.points, 70_848);
    assert!(close(outcome.summary().co2_reduced_kg, 590.4, 1e-6));
}

#[test]
fn electricity_scenario() {
    let outcome = run(CalculationRequest::Electricity(ElectricityInput {
        appliance_action: Some(ApplianceAction::AcToFan),
        hours_per_day: Some(8.0),
        days_per_month: Some(30.0),
    }));
    let summary = outcome.summary();

    assert!(close(summary.money_saved, 2394.0, 1e-6));
    assert!(close(summary.co2_reduced_kg, 280.44, 1e-6));
    assert_eq!(summary.points, 2674);
    assert_eq!(outcome.details()["before_consumption"], "360 kWh");
}

#[test]
fn transport_scenario_and_mode_conflict() {
    let request = |current, alternate| {
        CalculationRequest::Transport(TransportInput {
            distance_km: Some(15.0),
            frequency: Some(Frequency::Daily),
            current_mode: Some(current),
            alternate_mode: Some(alternate),
        })
    };

    let summary = run(request(TransportMode::Taxi, TransportMode::Metro)).summary();
    assert!(close(summary.money_saved, 6975.0, 1e-6));
    assert!(close(summary.co2_reduced_kg, 59.4, 1e-6));
    assert_eq!(summary.points, 7034);

    let reverse = run(request(TransportMode::Metro, TransportMode::Taxi)).summary();
    assert_eq!(reverse.money_saved, 0.0);
    assert_eq!(reverse.co2_reduced_kg, 0.0);
    assert_eq!(reverse.points, 0);

    let conflict = CalculationRequest::Transport(TransportInput {
        distance_km: None,
        frequency: None,
        current_mode: Some(TransportMode::Car),
        alternate_mode: Some(TransportMode::Car),
    });
    assert_eq!(
        conflict.calculate(&RateTable::STANDARD).unwrap_err(),
        ValidationError::SameTransportMode
    );
}

#[test]
fn water_bill_scenario() {
    let summary = run(CalculationRequest::Water(WaterInput::Bill {
        monthly_bill_rupees: Some(800.0),
    }))
    .summary();

    assert!(close(summary.money_saved, 240.0, 1e-9));
    assert!(close(summary.co2_reduced_kg, 42.67, 0.01));
    assert_eq!(summary.points, 283);
}

#[test]
fn calculators_are_pure_and_never_negative() {
    let requests = vec![
        CalculationRequest::Water(WaterInput::Action {
            liters_per_month: Some(2500.0),
            action: Some(WaterAction::Leak),
        }),
        CalculationRequest::Electricity(ElectricityInput {
            appliance_action: Some(ApplianceAction::LedBulb),
            hours_per_day: Some(24.0),
            days_per_month: Some(1.0),
        }),
        CalculationRequest::Transport(TransportInput {
            distance_km: Some(3.5),
            frequency: Some(Frequency::Weekly),
            current_mode: Some(TransportMode::Bus),
            alternate_mode: Some(TransportMode::Car),
        }),
    ];

    for request in requests {
        let first = run(request.clone());
        let second = run(request);
        assert_eq!(first, second);

        let summary = first.summary();
        assert!(summary.money_saved >= 0.0);
        assert!(summary.co2_reduced_kg >= 0.0);
    }
}

#[test]
fn delete_and_re_add_round_trip_through_service() {
    let service = common::service();
    let user = UserId("asha".to_string());
    let solar = CalculationRequest::Solar(SolarInput {
        monthly_bill_rupees: Some(2500.0),
        rooftop_area_sqft: Some(320.0),
        sunlight_hours_per_day: Some(5.5),
    });
    let water = CalculationRequest::Water(WaterInput::Action {
        liters_per_month: Some(1800.0),
        action: Some(WaterAction::Rainwater),
    });

    service.save(&user, &solar, None).expect("save solar");
    let baseline = service.stats(&user).expect("stats");

    let saved = service.save(&user, &water, None).expect("save water");
    let with_water = service.stats(&user).expect("stats");
    assert_eq!(with_water.calculation_count, baseline.calculation_count + 1);
    assert_eq!(
        with_water.total_points,
        baseline.total_points + saved.record.points
    );

    service.delete(&user, &saved.record.id).expect("delete water");
    assert_eq!(service.stats(&user).expect("stats"), baseline);

    service.save(&user, &water, None).expect("re-add water");
    assert_eq!(service.stats(&user).expect("stats"), with_water);

    match service.delete(&user, &saved.record.id) {
        Err(CalculationServiceError::Repository(_)) => {}
        other => panic!("expected repository error, got {other:?}"),
    }
}

#[tokio::test]
async fn http_save_then_read_stats() {
    let router = calculation_router(common::service());
    let payload = json!({
        "calculation": {
            "type": "water",
            "input": { "mode": "bill", "monthly_bill_rupees": 800 }
        }
    });

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/v1/calculations")
                .header(USER_HEADER, "asha")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(
            Request::get("/api/v1/users/stats")
                .header(USER_HEADER, "asha")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    let stats: Value = serde_json::from_slice(&body).expect("json payload");
    assert_eq!(stats["total_points"], 283);
    assert_eq!(stats["calculation_count"], 1);
    assert_eq!(stats["total_saved"], 240.0);
}
