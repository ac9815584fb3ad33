use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use spend_forecast::insights::SUGGESTION_FAILURE_MARKER;
use spend_forecast::{
    train_model, FeatureSample, ForecastError, ForecastResult, Forecaster, ModelStore,
    SuggestionError, SuggestionPrompt, SuggestionSource, TemplateSuggestions,
    TrainedForecastModel, Transaction, Trend,
};
use std::cell::RefCell;
use tempfile::TempDir;

/// Predicts a fixed amount and remembers the lag vectors it was given
#[derive(Debug)]
struct FixedModel {
    amount: f64,
    seen: std::sync::Mutex<Vec<[f64; 3]>>,
}

impl FixedModel {
    fn new(amount: f64) -> Self {
        Self {
            amount,
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl TrainedForecastModel for FixedModel {
    fn predict(&self, samples: &[FeatureSample]) -> spend_forecast::Result<Vec<f64>> {
        let mut seen = self.seen.lock().unwrap();
        seen.extend(samples.iter().map(FeatureSample::features));
        Ok(vec![self.amount; samples.len()])
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

struct UnreachableGenerator {
    calls: RefCell<Vec<String>>,
}

impl SuggestionSource for UnreachableGenerator {
    fn suggest(&self, prompt: &SuggestionPrompt) -> Result<String, SuggestionError> {
        self.calls.borrow_mut().push(prompt.category.clone());
        Err(SuggestionError::Request("connection refused".to_string()))
    }
}

fn ts(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// One transaction per month starting January 2023
fn monthly(category: &str, totals: &[i64]) -> Vec<Transaction> {
    totals
        .iter()
        .enumerate()
        .map(|(i, total)| {
            let i = i as u32;
            Transaction::new(
                Decimal::from(*total),
                category,
                ts(2023 + (i / 12) as i32, i % 12 + 1, 14),
            )
        })
        .collect()
}

#[test]
fn test_food_scenario_end_to_end() {
    // Two purchases in the last month sum to 130
    let mut transactions = monthly("Food", &[100, 120, 110]);
    transactions.push(Transaction::new(dec!(80), "Food", ts(2023, 4, 2)));
    transactions.push(Transaction::new(dec!(50), "Food", ts(2023, 4, 28)));

    let forecaster = Forecaster::new(FixedModel::new(200.0));

    let forecasts = forecaster.forecast(&transactions).unwrap();
    assert_eq!(
        forecasts,
        vec![ForecastResult {
            category: "Food".to_string(),
            predicted_amount: dec!(200.00),
        }]
    );
    assert_eq!(
        forecaster.model().seen.lock().unwrap().as_slice(),
        &[[130.0, 110.0, 120.0]]
    );

    let insights = forecaster
        .forecast_with_insights(&transactions, &TemplateSuggestions)
        .unwrap();
    assert_eq!(insights.len(), 1);
    let food = &insights[0];
    assert_eq!(food.category, "Food");
    assert_eq!(food.predicted_amount, dec!(200.00));
    assert_eq!(food.monthly_avg, dec!(115.00));
    assert_eq!(food.difference, dec!(85.00));
    assert_eq!(food.trend, Trend::Up);
}

#[test]
fn test_no_transactions_is_not_enough_data() {
    let forecaster = Forecaster::new(FixedModel::new(200.0));

    let err = forecaster.forecast(&[]).unwrap_err();
    assert!(err.is_insufficient_data());

    let err = forecaster
        .forecast_with_insights(&[], &TemplateSuggestions)
        .unwrap_err();
    assert!(err.is_insufficient_data());
}

#[test]
fn test_short_histories_are_not_enough_data() {
    let mut transactions = monthly("Food", &[100, 120, 110]);
    transactions.extend(monthly("Rent", &[900]));

    let forecaster = Forecaster::new(FixedModel::new(1.0));
    assert!(forecaster.forecast(&transactions).unwrap_err().is_insufficient_data());
}

#[test]
fn test_only_qualifying_categories_are_forecast() {
    let mut transactions = monthly("Food", &[100, 120, 110, 130, 90]);
    transactions.extend(monthly("Gym", &[30, 30, 30]));
    transactions.extend(monthly("Bills", &[60, 60, 60, 60]));

    let forecaster = Forecaster::new(FixedModel::new(75.556));
    let forecasts = forecaster.forecast(&transactions).unwrap();

    let categories: Vec<&str> = forecasts.iter().map(|f| f.category.as_str()).collect();
    assert_eq!(categories, vec!["Bills", "Food"]);
    assert!(forecasts.iter().all(|f| f.predicted_amount == dec!(75.56)));
}

#[test]
fn test_suggestion_failures_do_not_abort_batch() {
    let mut transactions = monthly("Food", &[100, 120, 110, 130]);
    transactions.extend(monthly("Bills", &[60, 60, 60, 60]));

    let generator = UnreachableGenerator {
        calls: RefCell::new(Vec::new()),
    };
    let forecaster = Forecaster::new(FixedModel::new(200.0));
    let insights = forecaster
        .forecast_with_insights(&transactions, &generator)
        .unwrap();

    assert_eq!(insights.len(), 2);
    assert_eq!(*generator.calls.borrow(), vec!["Bills", "Food"]);
    for insight in &insights {
        assert!(insight.suggestion.starts_with(SUGGESTION_FAILURE_MARKER));
        assert!(insight.suggestion.contains("connection refused"));
        assert_eq!(insight.trend, Trend::Up);
    }
    assert_eq!(insights[0].monthly_avg, dec!(60.00));
    assert_eq!(insights[0].difference, dec!(140.00));
}

#[test]
fn test_train_persist_and_serve() {
    let dir = TempDir::new().unwrap();
    let store = ModelStore::new(dir.path().join("spending_model.json"));

    // Two users, three categories between them
    let first: Vec<i64> = (0..10).map(|i| 100 + i * 10).collect();
    let second: Vec<i64> = [50, 80, 65, 95, 60, 70, 85, 75].to_vec();
    let mut user_a = monthly("Food", &first);
    user_a.extend(monthly("Travel", &second.iter().map(|v| v * 3).collect::<Vec<_>>()));
    let user_b = monthly("Food", &[300, 250, 320, 260, 310, 270, 330]);

    let trained = train_model(&[user_a.clone(), user_b], &store).unwrap();
    assert_eq!(trained.sample_count(), (10 - 4) + (8 - 4) + (7 - 4));
    assert!(store.exists());

    let forecaster = Forecaster::load(&store).unwrap();
    let forecasts = forecaster.forecast(&user_a).unwrap();
    assert_eq!(forecasts.len(), 2);
    assert_eq!(forecasts[0].category, "Food");
    assert_eq!(forecasts[1].category, "Travel");
}

#[test]
fn test_empty_training_keeps_previous_artifact() {
    let dir = TempDir::new().unwrap();
    let store = ModelStore::new(dir.path().join("spending_model.json"));

    let history = monthly("Food", &[100, 120, 110, 130, 125, 140]);
    train_model(&[history], &store).unwrap();
    let before = std::fs::read(store.path()).unwrap();

    let short = monthly("Food", &[100, 120, 110, 130]);
    let err = train_model(&[short, Vec::new()], &store).unwrap_err();
    assert!(matches!(err, ForecastError::TrainingDataEmpty));
    assert_eq!(std::fs::read(store.path()).unwrap(), before);
}

#[test]
fn test_empty_training_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let store = ModelStore::new(dir.path().join("spending_model.json"));

    let err = train_model(&[], &store).unwrap_err();
    assert!(matches!(err, ForecastError::TrainingDataEmpty));
    assert!(!store.exists());
}

#[test]
fn test_missing_model_is_fatal() {
    let dir = TempDir::new().unwrap();
    let store = ModelStore::new(dir.path().join("never_trained.json"));

    let err = Forecaster::load(&store).unwrap_err();
    assert!(matches!(err, ForecastError::ModelUnavailable { .. }));
    assert!(!err.is_insufficient_data());
}
