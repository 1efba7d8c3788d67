//! Read-only model context shared by the agents and the severity scan.
//!
//! Built once at startup and handed out behind an `Arc`; nothing in it is
//! mutated afterwards.

use std::fmt;
use std::sync::Arc;

use crate::config::SeveritySettings;
use crate::error::CrewResult;
use crate::forecast::{SeasonalModel, SeasonalProfileModel, MIN_MODEL_ROWS};
use crate::severity::{BandClassifier, ModelRegistry, SeverityClassifier};

/// Models available to the pipeline.
#[derive(Clone)]
pub struct ModelContext {
    hospital_model: Option<Arc<dyn SeasonalModel>>,
    registry: ModelRegistry,
    classifier: Arc<dyn SeverityClassifier>,
}

impl ModelContext {
    pub fn new(
        hospital_model: Option<Arc<dyn SeasonalModel>>,
        registry: ModelRegistry,
        classifier: Arc<dyn SeverityClassifier>,
    ) -> Self {
        Self {
            hospital_model,
            registry,
            classifier,
        }
    }

    /// Context with the seasonal-profile model for hospitals, one registry
    /// entry per configured disease and a band classifier.
    pub fn from_settings(settings: &SeveritySettings) -> CrewResult<Self> {
        let hospital_model: Arc<dyn SeasonalModel> =
            Arc::new(SeasonalProfileModel::new().with_min_observations(MIN_MODEL_ROWS));
        let disease_model: Arc<dyn SeasonalModel> = Arc::new(SeasonalProfileModel::new());
        let registry = ModelRegistry::with_shared_model(&settings.models, disease_model);
        let classifier = BandClassifier::new(settings.bands.clone())?;
        Ok(Self::new(Some(hospital_model), registry, Arc::new(classifier)))
    }

    /// Context without a hospital model: every forecast uses the fallback.
    pub fn fallback_only() -> Self {
        Self::new(
            None,
            ModelRegistry::new(),
            Arc::new(BandClassifier::default()),
        )
    }

    pub fn hospital_model(&self) -> Option<&Arc<dyn SeasonalModel>> {
        self.hospital_model.as_ref()
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn classifier(&self) -> &dyn SeverityClassifier {
        self.classifier.as_ref()
    }
}

impl fmt::Debug for ModelContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelContext")
            .field(
                "hospital_model",
                &self.hospital_model.as_ref().map(|m| m.name().to_string()),
            )
            .field("registry", &self.registry)
            .finish()
    }
}
