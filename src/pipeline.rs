// src/pipeline.rs
pub mod cancel;
pub mod config;
pub mod context;

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::correlator::correlate;
use crate::error::ExtractionError;
use crate::pattern_extraction::Parser;
use crate::stats::aggregate;

use cancel::CancellationToken;
use config::PipelineConfig;
use context::ExtractionResult;

/// A collaborator that receives the finished result (console, file export)
pub trait ResultSink {
    fn name(&self) -> &str;
    fn deliver(&mut self, result: &ExtractionResult) -> Result<(), ExtractionError>;
}

/// Runs Parser -> Correlator -> Aggregator and hands the result to sinks.
///
/// The first failing stage ends the run; later stages and sinks never see
/// partial output.
pub struct ExtractionPipeline {
    config: PipelineConfig,
    sinks: Vec<Box<dyn ResultSink>>,
    cancel: CancellationToken,
    last_duration: Option<Duration>,
}

impl ExtractionPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        ExtractionPipeline {
            config,
            sinks: Vec::new(),
            cancel: CancellationToken::new(),
            last_duration: None,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn ResultSink>) {
        self.sinks.push(sink);
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Wall time of the most recent successful run
    pub fn last_duration(&self) -> Option<Duration> {
        self.last_duration
    }

    /// Compute the result without delivering it to any sink
    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> Result<ExtractionResult, ExtractionError> {
        let cancel = &self.cancel;
        let config = &self.config;

        config
            .validate()
            .and_then(|_| Parser::new(&config.patterns))
            .and_then(|parser| parser.parse(lines, cancel))
            .and_then(|records| {
                let groups = match &config.correlation_field {
                    Some(field) => correlate(&records, field, cancel)?,
                    None => Vec::new(),
                };
                Ok((records, groups))
            })
            .and_then(|(records, groups)| {
                aggregate(&records, cancel).map(|aggregation| ExtractionResult {
                    records,
                    groups,
                    columns: aggregation.columns,
                    statistics: aggregation.statistics,
                    patterns_used: config.patterns.clone(),
                    correlation_field: config.correlation_field.clone(),
                })
            })
    }

    /// Compute the result and deliver it to every sink in order
    pub fn run<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<ExtractionResult, ExtractionError> {
        let start_time = Instant::now();
        let result = self.extract(lines)?;

        for sink in &mut self.sinks {
            self.cancel.check()?;
            debug!(sink = sink.name(), "delivering result");
            sink.deliver(&result)?;
        }

        let elapsed = start_time.elapsed();
        self.last_duration = Some(elapsed);
        info!(
            records = result.records.len(),
            groups = result.groups.len(),
            columns = result.columns.len(),
            elapsed = %humantime::format_duration(elapsed),
            "extraction finished"
        );
        Ok(result)
    }
}
