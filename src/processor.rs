use crate::catalog::{Assessor, RatingSignals, PROCESSING_ERROR};
use crate::llm::CallExecutor;
use crate::loader::ControlRecord;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// All fourteen judgment fields plus the combined documentation column and
/// the evidence list for one control, joined with the original input row.
/// Every field always holds either a real value or a marker string.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub record: ControlRecord,

    /// Combined Present/Missing 6W breakdown
    pub documentation: String,
    pub suggestions: String,

    pub objective_answer: String,
    pub objective_explanation: String,
    pub execution_answer: String,
    pub execution_explanation: String,
    pub type_answer: String,
    pub type_explanation: String,
    pub frequency_answer: String,
    pub frequency_explanation: String,

    pub systems: String,

    pub segregation_answer: String,
    pub segregation_explanation: String,

    pub overall_rating: String,
    pub overall_explanation: String,

    pub evidence: String,
}

impl RecordOutcome {
    /// Outcome with every output field set to the given marker
    pub fn failed(record: ControlRecord, marker: &str) -> Self {
        let m = marker.to_string();
        Self {
            record,
            documentation: m.clone(),
            suggestions: m.clone(),
            objective_answer: m.clone(),
            objective_explanation: m.clone(),
            execution_answer: m.clone(),
            execution_explanation: m.clone(),
            type_answer: m.clone(),
            type_explanation: m.clone(),
            frequency_answer: m.clone(),
            frequency_explanation: m.clone(),
            systems: m.clone(),
            segregation_answer: m.clone(),
            segregation_explanation: m.clone(),
            overall_rating: m.clone(),
            overall_explanation: m.clone(),
            evidence: m,
        }
    }

    /// Output fields in the fixed column order of the result table
    pub fn output_fields(&self) -> [&str; 16] {
        [
            &self.documentation,
            &self.suggestions,
            &self.objective_answer,
            &self.objective_explanation,
            &self.execution_answer,
            &self.execution_explanation,
            &self.type_answer,
            &self.type_explanation,
            &self.frequency_answer,
            &self.frequency_explanation,
            &self.systems,
            &self.segregation_answer,
            &self.segregation_explanation,
            &self.overall_rating,
            &self.overall_explanation,
            &self.evidence,
        ]
    }
}

/// One outcome per input record, in input order.
pub type ResultTable = Vec<RecordOutcome>;

/// Progress notifications, injectable so library callers are not tied to
/// this crate's logging setup.
pub trait ProgressObserver: Send + Sync {
    fn record_started(&self, index: usize, total: usize, control: &str);
    fn record_finished(&self, index: usize, total: usize, control: &str);
}

/// Default observer: tracing at info level
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn record_started(&self, index: usize, total: usize, control: &str) {
        info!("Processing [{}/{}]: {}", index + 1, total, control);
    }

    fn record_finished(&self, index: usize, total: usize, control: &str) {
        info!("Completed [{}/{}]: {}", index + 1, total, control);
    }
}

/// Drives the assessment catalog across the whole inventory. Records fan out
/// under a semaphore (`concurrency` = 1 reproduces the sequential reference
/// behavior); within one record the operations run in dependency order.
pub struct RecordProcessor {
    executor: CallExecutor,
    concurrency: usize,
    observer: Arc<dyn ProgressObserver>,
}

impl RecordProcessor {
    pub fn new(executor: CallExecutor, concurrency: usize) -> Self {
        Self {
            executor,
            concurrency,
            observer: Arc::new(LogProgress),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Always returns exactly one outcome per input record, in input order.
    /// A record whose task dies fills its row with `Processing error`
    /// markers; the batch itself never aborts.
    pub async fn process_all(&self, records: Vec<ControlRecord>) -> ResultTable {
        let total = records.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency.max(1)));
        let mut handles = Vec::with_capacity(total);

        for (idx, record) in records.into_iter().enumerate() {
            let fallback = record.clone();
            match semaphore.clone().acquire_owned().await {
                Ok(permit) => {
                    let executor = self.executor.clone();
                    let observer = self.observer.clone();
                    let handle = tokio::spawn(async move {
                        let _permit = permit;
                        observer.record_started(idx, total, &record.control);
                        let outcome = analyze_record(&executor, record).await;
                        observer.record_finished(idx, total, &outcome.record.control);
                        outcome
                    });
                    handles.push((idx, fallback, Some(handle)));
                }
                Err(e) => {
                    warn!("Semaphore closed while scheduling record {}: {}", idx + 1, e);
                    handles.push((idx, fallback, None));
                }
            }
        }

        // Arena in input order, regardless of completion order
        let mut table = Vec::with_capacity(total);
        for (idx, fallback, handle) in handles {
            let outcome = match handle {
                Some(handle) => match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!("Record {} processing failed unexpectedly: {}", idx + 1, e);
                        RecordOutcome::failed(fallback, PROCESSING_ERROR)
                    }
                },
                None => RecordOutcome::failed(fallback, PROCESSING_ERROR),
            };
            table.push(outcome);
        }
        table
    }
}

/// Run the nine operations for one record. Completeness first (its output
/// feeds the overall rating), then the six independent assessments, then the
/// overall rating over the five judgment answers, then expected evidence.
async fn analyze_record(executor: &CallExecutor, record: ControlRecord) -> RecordOutcome {
    let assessor = Assessor::new(executor);
    let desc = record.control_description.as_str();

    let completeness = assessor.completeness(desc).await;
    let objective = assessor.objective_fit(&record.risk_description, desc).await;
    let execution = assessor
        .execution_fit(&record.automation, &record.risk_description, desc)
        .await;
    let type_fit = assessor
        .type_fit(&record.control_type, &record.risk_description, desc)
        .await;
    let frequency = assessor
        .frequency_fit(&record.frequency, &record.risk_description, desc)
        .await;
    let systems = assessor.dependencies(desc).await;
    let segregation = assessor.segregation(desc).await;

    let overall = assessor
        .overall_rating(&RatingSignals {
            objective: &objective.answer,
            execution: &execution.answer,
            control_type: &type_fit.answer,
            frequency: &frequency.answer,
            systems: &systems,
            present: &completeness.present,
            missing: &completeness.missing,
        })
        .await;

    let evidence = assessor.evidence(desc).await;

    RecordOutcome {
        documentation: completeness.documentation(),
        suggestions: completeness.suggestions,
        objective_answer: objective.answer,
        objective_explanation: objective.explanation,
        execution_answer: execution.answer,
        execution_explanation: execution.explanation,
        type_answer: type_fit.answer,
        type_explanation: type_fit.explanation,
        frequency_answer: frequency.answer,
        frequency_explanation: frequency.explanation,
        systems,
        segregation_answer: segregation.answer,
        segregation_explanation: segregation.explanation,
        overall_rating: overall.answer,
        overall_explanation: overall.explanation,
        evidence,
        record,
    }
}
