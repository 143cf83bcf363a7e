//! Scrape orchestration: runs the configured collectors against one target
//! and turns the parsed, classified records into gauge samples.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::{CollectorName, SafeConfig};
use crate::metrics::{Desc, Descriptors, MetricSet};
use crate::parser::{self, ParseError, SensorKind, SensorState};
use crate::system::executor::{CommandRunner, ExecError, IpmiCommand, IpmiTarget};

#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("failed to parse ipmitool output: {0}")]
    Parse(#[from] ParseError),
}

/// Label value used for the chassis power series.
const POWER_STATE_NAME: &str = "PowerState";

#[derive(Clone)]
pub struct Scraper {
    runner: Arc<dyn CommandRunner>,
    config: Arc<SafeConfig>,
    descriptors: Arc<Descriptors>,
}

impl Scraper {
    pub fn new(runner: Arc<dyn CommandRunner>, config: Arc<SafeConfig>, descriptors: Arc<Descriptors>) -> Self {
        Self {
            runner,
            config,
            descriptors,
        }
    }

    pub fn config(&self) -> &Arc<SafeConfig> {
        &self.config
    }

    /// Scrape one target. An empty `target` means the local BMC.
    pub async fn scrape(&self, target: &str, module: &str) -> MetricSet {
        let start = Instant::now();
        let d = &self.descriptors;
        let mut metrics = MetricSet::new();

        let target = IpmiTarget::new(target, self.config.config_for_target(target, module));

        for &collector in &target.module.collectors {
            debug!("Running collector: {}", collector);
            let up = match self.collect(collector, &target, &mut metrics).await {
                Ok(()) => 1.0,
                Err(e) => {
                    error!("Collector {} failed for {}: {}", collector, target.display_name(), e);
                    0.0
                }
            };
            metrics.gauge(&d.up, &[collector.as_str()], up);
        }

        // chassis power is always collected and has no `up` series
        if let Err(e) = self.collect_power_state(&target, &mut metrics).await {
            debug!("Failed to collect ipmitool power data from {}: {}", target.display_name(), e);
        }

        let duration = start.elapsed().as_secs_f64();
        debug!("Scrape of target {} took {} seconds.", target.display_name(), duration);
        metrics.gauge(&d.scrape_duration, &[], duration);

        metrics
    }

    async fn collect(
        &self,
        collector: CollectorName,
        target: &IpmiTarget,
        metrics: &mut MetricSet,
    ) -> Result<(), CollectError> {
        let output = self.runner.run(target, IpmiCommand::from(collector)).await?;

        match collector {
            CollectorName::Sensor => self.emit_sensors(&output, target, metrics),
            CollectorName::Fru => self.emit_fru(&output, target, metrics),
            CollectorName::Lan => self.emit_info(&self.descriptors.lan_info, parser::parse_lan_print(&output), metrics),
            CollectorName::Bmc => self.emit_info(&self.descriptors.bmc_info, parser::parse_bmc_info(&output), metrics),
            CollectorName::Fwum => self.emit_fwum(&output, metrics),
            CollectorName::DcmiPower => self.emit_dcmi_power(&output, target, metrics),
        }
    }

    fn emit_sensors(&self, output: &str, target: &IpmiTarget, metrics: &mut MetricSet) -> Result<(), CollectError> {
        let parsed = parser::parse_sensor_list(output);
        if let Some(e) = &parsed.error {
            warn!("Skipped unparseable ipmitool sensor rows from {}: {}", target.display_name(), e);
        }

        for record in &parsed.records {
            let state = SensorState::classify(&record.raw_state);
            let kind = SensorKind::classify(&record.unit, &record.name);
            let series = self.descriptors.sensor_series(&kind);

            if series.generic {
                let labels = [record.name.as_str(), record.unit.as_str()];
                metrics.gauge(series.value, &labels, record.value);
                metrics.gauge(series.state, &labels, state.value());
            } else {
                metrics.gauge(series.value, &[record.name.as_str()], record.value);
                metrics.gauge(series.state, &[record.name.as_str()], state.value());
            }
        }
        Ok(())
    }

    fn emit_fru(&self, output: &str, target: &IpmiTarget, metrics: &mut MetricSet) -> Result<(), CollectError> {
        let parsed = parser::parse_fru_list(output);
        if let Some(e) = &parsed.error {
            warn!("Skipped unparseable ipmitool fru lines from {}: {}", target.display_name(), e);
        }
        self.emit_info(&self.descriptors.fru_info, parsed.records, metrics)
    }

    fn emit_info(
        &self,
        desc: &Desc,
        records: Vec<parser::KeyValueRecord<String>>,
        metrics: &mut MetricSet,
    ) -> Result<(), CollectError> {
        for record in &records {
            metrics.gauge(desc, &[record.name.as_str(), record.value.as_str()], 1.0);
        }
        Ok(())
    }

    /// Any non-numeric field fails the whole collector.
    fn emit_fwum(&self, output: &str, metrics: &mut MetricSet) -> Result<(), CollectError> {
        let records = parser::parse_fwum_info(output).into_result()?;

        let mut firmware_revision = String::new();
        let mut manufacturer_id = String::new();
        for record in &records {
            match record.name.as_str() {
                "FirmwareRevision" => firmware_revision = format!("{:.6}", record.value),
                "ManufacturerId" => manufacturer_id = format!("{:.6}", record.value),
                _ => {}
            }
        }

        metrics.gauge(&self.descriptors.fwum_info, &[firmware_revision.as_str(), manufacturer_id.as_str()], 1.0);
        Ok(())
    }

    fn emit_dcmi_power(&self, output: &str, target: &IpmiTarget, metrics: &mut MetricSet) -> Result<(), CollectError> {
        let parsed = parser::parse_dcmi_power(output);
        if let Some(e) = &parsed.error {
            warn!("Skipped unparseable ipmitool dcmi power readings from {}: {}", target.display_name(), e);
        }
        for record in &parsed.records {
            metrics.gauge(&self.descriptors.power_consumption, &[record.reading.label()], record.watts);
        }
        Ok(())
    }

    async fn collect_power_state(&self, target: &IpmiTarget, metrics: &mut MetricSet) -> Result<(), CollectError> {
        let output = self.runner.run(target, IpmiCommand::Power).await?;
        let state = parser::parse_chassis_power(&output);
        metrics.gauge(&self.descriptors.chassis_power_state, &[POWER_STATE_NAME], state.value());
        Ok(())
    }
}
