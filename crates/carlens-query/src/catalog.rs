//! Catalog service tying interpretation, extraction and storage together.
//!
//! [`CarCatalog`] is what front ends talk to. Every write path validates the
//! car before it reaches the store, and every read path goes through
//! [`QueryPlan`]s so stores never see raw user text in statement position.

use carlens_core::{
    Car, CarStore, ExtractedFields, FilterSpec, ImageToText, NewCar, Predicate, QueryPlan,
    Result, StoreStats,
};
use carlens_extract::{ImageFieldExtractor, TesseractOcr};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::executor::FilterQueryEngine;
use crate::parser::{CommandInterpreter, Intent};

/// What an interpreted instruction did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A car was stored
    Added(Car),
    /// A query ran
    Found(Vec<Car>),
}

/// Front door for adding and finding cars.
pub struct CarCatalog {
    store: Arc<dyn CarStore>,
    engine: FilterQueryEngine,
    interpreter: CommandInterpreter,
    images: ImageFieldExtractor,
}

impl CarCatalog {
    /// Create a catalog over `store` with the default interpreter and
    /// Tesseract OCR.
    #[must_use]
    pub fn new(store: Arc<dyn CarStore>) -> Self {
        Self {
            engine: FilterQueryEngine::new(Arc::clone(&store)),
            store,
            interpreter: CommandInterpreter::default(),
            images: ImageFieldExtractor::new(Arc::new(TesseractOcr::default())),
        }
    }

    #[must_use]
    pub fn with_interpreter(mut self, interpreter: CommandInterpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    #[must_use]
    pub fn with_ocr(mut self, ocr: Arc<dyn ImageToText>) -> Self {
        self.images = ImageFieldExtractor::new(ocr);
        self
    }

    /// The interpreter used for text commands.
    #[must_use]
    pub fn interpreter(&self) -> &CommandInterpreter {
        &self.interpreter
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Validate and store a car.
    pub async fn add(&self, car: NewCar) -> Result<Car> {
        car.validate()?;

        let id = self.store.insert(&car).await?;
        info!("Added car {} ({} {})", id, car.brand, car.model);
        Ok(car.with_id(id))
    }

    /// Store a car described by an add instruction, prefix excluded.
    pub async fn add_from_text(&self, prompt: &str) -> Result<Car> {
        let car = self.interpreter.parse_add(prompt);
        debug!("Parsed add prompt into {:?}", car);
        self.add(car).await
    }

    /// OCR an image and store the car it describes.
    ///
    /// Unreadable images store the placeholder record.
    pub async fn add_from_image(&self, path: &Path) -> Result<Car> {
        let fields = self.analyze_image(path).await;
        self.add(fields.into()).await
    }

    /// OCR an image without storing anything.
    pub async fn analyze_image(&self, path: &Path) -> ExtractedFields {
        self.images.analyze(path).await
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Run a query instruction, prefix excluded.
    pub async fn query_from_text(&self, prompt: &str) -> Result<Vec<Car>> {
        let spec = self.interpreter.parse_query(prompt);
        debug!("Parsed query prompt into {:?}", spec);
        self.filter(&spec).await
    }

    /// Run a structured filter.
    pub async fn filter(&self, spec: &FilterSpec) -> Result<Vec<Car>> {
        self.engine.run(spec).await
    }

    /// Every car in insertion order.
    pub async fn all(&self) -> Result<Vec<Car>> {
        Ok(self.store.query(&QueryPlan::all()).await?)
    }

    /// Cars with exactly this brand, in insertion order.
    pub async fn by_brand(&self, brand: &str) -> Result<Vec<Car>> {
        let plan = QueryPlan::all().with_predicate(Predicate::BrandEq(brand.to_string()));
        Ok(self.store.query(&plan).await?)
    }

    /// Cars with exactly this model, in insertion order.
    pub async fn by_model(&self, model: &str) -> Result<Vec<Car>> {
        let plan = QueryPlan::all().with_predicate(Predicate::ModelEq(model.to_string()));
        Ok(self.store.query(&plan).await?)
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        Ok(self.store.stats().await?)
    }

    /// Classify a full instruction and carry it out.
    ///
    /// Returns `Ok(None)` when the input has no recognized prefix.
    pub async fn handle(&self, input: &str) -> Result<Option<Outcome>> {
        let Some(intent) = self.interpreter.interpret(input) else {
            debug!("Unrecognized instruction: {}", input);
            return Ok(None);
        };

        let outcome = match intent {
            Intent::Add(car) => Outcome::Added(self.add(car).await?),
            Intent::Query(spec) => Outcome::Found(self.filter(&spec).await?),
        };
        Ok(Some(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use carlens_core::{DecodeError, Error, ValidationError};
    use carlens_store::MemoryStore;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    struct CannedOcr(&'static str);

    #[async_trait]
    impl ImageToText for CannedOcr {
        fn engine_name(&self) -> &str {
            "canned"
        }

        async fn image_to_text(&self, _path: &Path) -> std::result::Result<String, DecodeError> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenOcr;

    #[async_trait]
    impl ImageToText for BrokenOcr {
        fn engine_name(&self) -> &str {
            "broken"
        }

        async fn image_to_text(&self, path: &Path) -> std::result::Result<String, DecodeError> {
            Err(DecodeError::Unreadable {
                path: path.to_path_buf(),
                reason: "corrupt".to_string(),
            })
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn catalog() -> CarCatalog {
        CarCatalog::new(Arc::new(MemoryStore::new()))
            .with_interpreter(CommandInterpreter::default().with_today(ymd(2024, 5, 20)))
    }

    fn new_car(brand: &str, model: &str, rating: f64) -> NewCar {
        NewCar {
            brand: brand.to_string(),
            model: model.to_string(),
            price: 100_000.0,
            rating,
            launch_date: None,
        }
    }

    #[tokio::test]
    async fn test_add_assigns_ids() {
        let catalog = catalog();
        let a = catalog.add(new_car("Fiat", "Uno", 3.0)).await.unwrap();
        let b = catalog.add(new_car("Fiat", "Palio", 4.0)).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_car() {
        let catalog = catalog();
        let err = catalog.add(new_car("", "Uno", 3.0)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidCar(ValidationError::EmptyBrand)));
        assert!(catalog.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_from_text() {
        let catalog = catalog();
        let car = catalog
            .add_from_text("o novo carro da Nissan lançado ontem é nota 4")
            .await
            .unwrap();

        assert_eq!(car.brand, "Nissan");
        assert_eq!(car.model, "New Model");
        assert_eq!(car.launch_date, Some(ymd(2024, 5, 19)));
    }

    #[tokio::test]
    async fn test_add_from_text_out_of_range_rating() {
        let catalog = catalog();
        let err = catalog
            .add_from_text("o novo carro da Nissan lançado ontem é nota 9")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::InvalidCar(ValidationError::RatingOutOfRange(_))
        ));
        assert_eq!(catalog.stats().await.unwrap().total_cars, 0);
    }

    #[tokio::test]
    async fn test_add_from_text_overflowing_rating() {
        let catalog = catalog();
        let err = catalog
            .add_from_text("carro da Kia nota 99999999999")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::InvalidCar(ValidationError::RatingOutOfRange(_))
        ));
        assert_eq!(catalog.stats().await.unwrap().total_cars, 0);
    }

    #[tokio::test]
    async fn test_add_from_image() {
        let catalog = catalog().with_ocr(Arc::new(CannedOcr(
            "Marca: Honda\nModelo: Civic\nR$ 150.000\nNota: 4.7",
        )));
        let car = catalog
            .add_from_image(&PathBuf::from("civic.png"))
            .await
            .unwrap();

        assert_eq!(car.brand, "Honda");
        assert_eq!(car.model, "Civic");
        assert!((car.rating - 4.7).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_add_from_unreadable_image_stores_placeholder() {
        let catalog = catalog().with_ocr(Arc::new(BrokenOcr));
        let car = catalog
            .add_from_image(&PathBuf::from("broken.png"))
            .await
            .unwrap();

        assert_eq!(car.brand, "Example Brand");
        assert_eq!(car.model, "Example Model");
    }

    #[tokio::test]
    async fn test_lookup_by_brand_and_model() {
        let catalog = catalog();
        catalog.add(new_car("Fiat", "Uno", 3.0)).await.unwrap();
        catalog.add(new_car("Kia", "Rio", 4.0)).await.unwrap();
        catalog.add(new_car("Fiat", "Palio", 5.0)).await.unwrap();

        let fiats = catalog.by_brand("Fiat").await.unwrap();
        let ids: Vec<i64> = fiats.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let rios = catalog.by_model("Rio").await.unwrap();
        assert_eq!(rios.len(), 1);
        assert_eq!(rios[0].brand, "Kia");

        assert!(catalog.by_brand("fiat").await.unwrap().is_empty());
        assert_eq!(catalog.all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_query_from_text() {
        let catalog = catalog();
        for rating in [3.0, 4.5, 5.0] {
            catalog.add(new_car("Nissan", "Kicks", rating)).await.unwrap();
        }
        catalog.add(new_car("Honda", "Fit", 4.9)).await.unwrap();

        let cars = catalog
            .query_from_text("quais os 2 melhores carros da Nissan")
            .await
            .unwrap();

        let ratings: Vec<f64> = cars.iter().map(|c| c.rating).collect();
        assert_eq!(ratings, vec![5.0, 4.5]);
    }

    #[tokio::test]
    async fn test_handle_dispatch() {
        let catalog = catalog();

        let added = catalog
            .handle("adicionar o carro da Kia lançado hoje nota 4")
            .await
            .unwrap();
        assert!(matches!(added, Some(Outcome::Added(ref car)) if car.brand == "Kia"));

        let found = catalog.handle("consultar carros da Kia").await.unwrap();
        let Some(Outcome::Found(cars)) = found else {
            panic!("expected query outcome, got {found:?}");
        };
        assert_eq!(cars.len(), 1);

        assert!(catalog.handle("remover tudo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_handle_zero_limit_query() {
        let catalog = catalog();
        let err = catalog
            .handle("consultar os 0 melhores carros")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidFilter(_)));
    }
}
