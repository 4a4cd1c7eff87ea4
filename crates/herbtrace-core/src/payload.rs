//! Per-stage payload schemas carried in `ProvenanceRecord::data`.

use herbtrace_canonical::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{EntityType, GeoPoint};

/// Attested fields of a record, keyed by stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity_type", rename_all = "lowercase")]
pub enum StagePayload {
    /// Field harvest.
    Collection(CollectionData),
    /// Processing step.
    Processing(ProcessingData),
    /// Lab test.
    Testing(TestingData),
    /// Product batch formulation.
    Manufacturing(ManufacturingData),
    /// Packaging.
    Packaging(PackagingData),
}

impl StagePayload {
    /// Stage this payload belongs to.
    pub fn entity_type(&self) -> EntityType {
        match self {
            StagePayload::Collection(_) => EntityType::Collection,
            StagePayload::Processing(_) => EntityType::Processing,
            StagePayload::Testing(_) => EntityType::Testing,
            StagePayload::Manufacturing(_) => EntityType::Manufacturing,
            StagePayload::Packaging(_) => EntityType::Packaging,
        }
    }

    /// Input-level checks; every problem is reported, nothing is raised.
    pub fn validate(&self) -> Vec<String> {
        match self {
            StagePayload::Collection(data) => data.validate(),
            StagePayload::Processing(data) => data.validate(),
            StagePayload::Testing(data) => data.validate(),
            StagePayload::Manufacturing(data) => data.validate(),
            StagePayload::Packaging(data) => data.validate(),
        }
    }
}

/// Collector's field scores.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// 0-10.
    pub freshness: f64,
    /// 0-10.
    pub maturity: f64,
    /// Damaged fraction score, 0-10.
    pub damage: f64,
}

/// Herb collection event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionData {
    /// Common species name, matched against zone allow-lists.
    pub species: String,
    /// Latin name.
    #[serde(default)]
    pub botanical_name: String,
    /// Harvested quantity.
    pub quantity_kg: f64,
    /// Harvest time.
    pub harvested_at: Timestamp,
    /// Device location at harvest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
    /// Field scores.
    #[serde(default)]
    pub quality_metrics: QualityMetrics,
    /// Collector identity.
    pub collector_id: String,
    /// Zone the harvest was approved in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    /// Free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CollectionData {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.species.trim().is_empty() {
            errors.push("Species is required".to_string());
        }
        if !(self.quantity_kg > 0.0) {
            errors.push("Quantity must be greater than 0".to_string());
        }
        if self.coordinates.is_none() {
            errors.push("Location data is required".to_string());
        }
        errors
    }
}

/// Kind of processing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    /// Rinse.
    Washing,
    /// Shade or oven drying.
    Drying,
    /// Milling to powder.
    Grinding,
    /// Solvent extraction.
    Extraction,
    /// Steam distillation.
    Distillation,
    /// Bulk packing at the processor.
    Packaging,
}

/// Processing step applied to a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingData {
    /// Collection being processed.
    pub collection_event_id: String,
    /// Facility performing the step.
    pub facility_id: String,
    /// Step kind.
    pub step_type: StepType,
    /// Start of the step.
    pub started_at: Timestamp,
    /// End of the step, once finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<Timestamp>,
    /// Machine parameters (temperature, humidity, duration, pressure, ph).
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    /// Operator identity.
    pub operator_id: String,
    /// Operator's quality sign-off.
    #[serde(default)]
    pub quality_checks_passed: bool,
    /// Free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ProcessingData {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.collection_event_id.trim().is_empty() {
            errors.push("Collection event is required".to_string());
        }
        if self.facility_id.trim().is_empty() {
            errors.push("Facility is required".to_string());
        }
        if self.operator_id.trim().is_empty() {
            errors.push("Operator is required".to_string());
        }
        if let Some(ended_at) = self.ended_at {
            if ended_at < self.started_at {
                errors.push("Processing step ends before it starts".to_string());
            }
        }
        errors
    }
}

/// Laboratory test kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    /// Identity and purity.
    Purity,
    /// Active marker content.
    Potency,
    /// Lead, arsenic, mercury, cadmium.
    HeavyMetals,
    /// Pesticide residue.
    Pesticides,
    /// Microbial load.
    Microbial,
    /// Loss on drying.
    Moisture,
    /// Total ash.
    AshContent,
}

/// Measured value of a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Measurement.
    pub value: f64,
    /// Unit of `value`.
    #[serde(default)]
    pub unit: String,
    /// Method name.
    #[serde(default)]
    pub method: String,
    /// Instrument used.
    #[serde(default)]
    pub equipment: String,
}

/// Quality test on a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestingData {
    /// Sample (collection or processing output) under test.
    pub sample_id: String,
    /// Test kind.
    pub test_type: TestType,
    /// Result.
    pub result: TestResult,
    /// Lower acceptance bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_min: Option<f64>,
    /// Upper acceptance bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_max: Option<f64>,
    /// Lab verdict.
    pub passed: bool,
    /// When the test ran.
    pub tested_at: Timestamp,
    /// Lab identity.
    pub lab_id: String,
    /// Issued certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_number: Option<String>,
}

impl TestingData {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.sample_id.trim().is_empty() {
            errors.push("Sample is required".to_string());
        }
        if self.passed
            && !passes_thresholds(self.result.value, self.threshold_min, self.threshold_max)
        {
            errors.push(format!(
                "Test result {} is outside threshold [{}, {}]",
                self.result.value,
                bound(self.threshold_min),
                bound(self.threshold_max)
            ));
        }
        errors
    }
}

fn bound(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// True when `value` lies within the optional inclusive bounds.
pub fn passes_thresholds(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_some_and(|min| value < min) {
        return false;
    }
    if max.is_some_and(|max| value > max) {
        return false;
    }
    true
}

/// Finished product form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    /// Capsule.
    Capsule,
    /// Churna.
    Powder,
    /// Liquid or dry extract.
    Extract,
    /// Tablet.
    Tablet,
    /// Syrup.
    Syrup,
    /// Medicated oil.
    Oil,
}

/// One herb's share of a formulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionItem {
    /// Share of the formulation, 0-100.
    pub percentage: f64,
    /// Source batch.
    pub batch_id: String,
    /// Certificate covering the source batch.
    #[serde(default)]
    pub test_certificate: String,
}

/// Product batch formulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturingData {
    /// Batch code printed on the product.
    pub batch_code: String,
    /// Product name.
    pub product_name: String,
    /// Product form.
    pub product_type: ProductType,
    /// Lab tests the batch relies on.
    #[serde(default)]
    pub test_result_ids: Vec<String>,
    /// Herb to share mapping.
    #[serde(default)]
    pub composition: BTreeMap<String, CompositionItem>,
    /// Raw herb input.
    #[serde(default)]
    pub total_herb_quantity_kg: f64,
    /// Units produced.
    pub final_product_quantity: f64,
    /// Manufacturing date.
    pub manufactured_at: Timestamp,
    /// Manufacturer identity.
    pub manufacturing_company_id: String,
}

/// Allowed deviation of the composition total from 100%.
const COMPOSITION_TOLERANCE: f64 = 0.1;

impl ManufacturingData {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.product_name.trim().is_empty() {
            errors.push("Product name is required".to_string());
        }
        if self.batch_code.trim().is_empty() {
            errors.push("Batch code is required".to_string());
        }
        if !(self.final_product_quantity > 0.0) {
            errors.push("Final product quantity must be greater than 0".to_string());
        }
        if self.composition.is_empty() {
            errors.push("At least one composition item is required".to_string());
        }
        let total: f64 = self.composition.values().map(|item| item.percentage).sum();
        if (total - 100.0).abs() > COMPOSITION_TOLERANCE {
            errors.push("Composition percentages must sum to 100%".to_string());
        }
        errors
    }
}

/// Packaging of finished product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackagingData {
    /// Packaged product.
    pub product_id: String,
    /// Manufacturing batches in the package.
    pub batch_ids: Vec<String>,
    /// Packaging time.
    pub packaged_at: Timestamp,
    /// Public verification page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_url: Option<String>,
}

impl PackagingData {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.product_id.trim().is_empty() {
            errors.push("Product is required".to_string());
        }
        if self.batch_ids.is_empty() {
            errors.push("At least one batch is required".to_string());
        }
        errors
    }
}
