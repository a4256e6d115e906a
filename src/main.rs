use std::sync::Arc;

use anyhow::Context;

use car_price_predictor::catalog::{self, Catalog};
use car_price_predictor::config::AppConfig;
use car_price_predictor::model::{CategoryField, LinearModel};
use car_price_predictor::predictor::Predictor;
use car_price_predictor::server::{self, AppState};
use car_price_predictor::session::SessionStore;
use car_price_predictor::types::PredictionRequest;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    let port = config.port;

    // Both startup inputs are load-or-die: without them the form is never
    // served, and the error chain lands on stderr.
    let records = catalog::load_dataset(&config.dataset_path)
        .context("startup failed: could not load the car dataset")?;
    let catalog = Catalog::from_records(records);
    tracing::info!(
        "loaded dataset: {} records, {} companies, {} fuel types",
        catalog.len(),
        catalog.companies().len(),
        catalog.fuel_types().len()
    );

    let model = LinearModel::load(&config.model_path)
        .context("startup failed: could not load the trained model")?;
    tracing::info!("loaded model: {} columns", model.column_count());

    warn_on_catalog_model_gaps(&catalog, &model);

    // Score one real listing to prove the pair works before serving anything
    if let Some(rec) = catalog.records().first() {
        let sample = PredictionRequest {
            name: rec.name.clone(),
            company: rec.company.clone(),
            year: rec.year,
            kms_driven: rec.kms_driven,
            fuel_type: rec.fuel_type.clone(),
        };
        model
            .predict_raw(&sample)
            .context("startup check: model rejected the first dataset record")?;
        tracing::info!("startup check: model scored a sample listing");
    }

    let catalog = Arc::new(catalog);
    let predictor = Arc::new(Predictor::new(
        Arc::new(model),
        Arc::clone(&catalog),
        &config,
    ));
    let state = AppState {
        catalog,
        predictor,
        sessions: Arc::new(SessionStore::new()),
        config: Arc::new(config),
    };

    let app = server::router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Catalog values the model cannot encode will be offered by the form but
/// rejected at submission, so flag them loudly at startup.
fn warn_on_catalog_model_gaps(catalog: &Catalog, model: &LinearModel) {
    let companies: Vec<&str> = catalog
        .companies()
        .iter()
        .filter(|c| !model.knows(CategoryField::Company, c))
        .map(|c| c.as_str())
        .collect();
    if !companies.is_empty() {
        tracing::warn!("companies missing from the model: {:?}", companies);
    }

    let fuels: Vec<&str> = catalog
        .fuel_types()
        .iter()
        .filter(|f| !model.knows(CategoryField::FuelType, f))
        .map(|f| f.as_str())
        .collect();
    if !fuels.is_empty() {
        tracing::warn!("fuel types missing from the model: {:?}", fuels);
    }

    let mut names: Vec<&str> = catalog
        .records()
        .iter()
        .map(|r| r.name.as_str())
        .filter(|n| !model.knows(CategoryField::Name, n))
        .collect();
    names.sort_unstable();
    names.dedup();
    if !names.is_empty() {
        tracing::warn!("models missing from the model artifact: {:?}", names);
    }
}
