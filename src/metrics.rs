//! Prometheus text exposition (format 0.0.4).
//! Scrapes push gauge samples into a `MetricSet`, which groups them by
//! metric family and renders the HELP/TYPE headers once per family.

pub mod descriptors;

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use tracing::warn;

pub use descriptors::{Desc, Descriptors};

/// Content type of the rendered exposition.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Debug, Clone, PartialEq)]
struct Sample {
    label_values: Vec<String>,
    value: f64,
}

#[derive(Debug, Clone)]
struct Family {
    name: String,
    help: &'static str,
    labels: &'static [&'static str],
    samples: Vec<Sample>,
    seen: HashSet<Vec<String>>,
}

/// Gauge samples collected during one scrape.
#[derive(Debug, Clone, Default)]
pub struct MetricSet {
    families: Vec<Family>,
    index: HashMap<String, usize>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one gauge sample. Samples whose label values do not match the
    /// descriptor, or that repeat an existing series, are dropped with a warning.
    pub fn gauge(&mut self, desc: &Desc, label_values: &[&str], value: f64) {
        if label_values.len() != desc.labels.len() {
            warn!(
                "Dropping {} sample: expected {} label values, got {}",
                desc.name,
                desc.labels.len(),
                label_values.len()
            );
            return;
        }

        let idx = match self.index.get(&desc.name) {
            Some(&idx) => idx,
            None => {
                self.families.push(Family {
                    name: desc.name.clone(),
                    help: desc.help,
                    labels: desc.labels,
                    samples: Vec::new(),
                    seen: HashSet::new(),
                });
                self.index.insert(desc.name.clone(), self.families.len() - 1);
                self.families.len() - 1
            }
        };

        let family = &mut self.families[idx];
        let label_values: Vec<String> = label_values.iter().map(|v| v.to_string()).collect();
        if !family.seen.insert(label_values.clone()) {
            warn!("Dropping duplicate {} series {:?}", family.name, label_values);
            return;
        }
        family.samples.push(Sample { label_values, value });
    }

    /// Value of the first sample of `name` whose labels equal `label_values`.
    pub fn get(&self, name: &str, label_values: &[&str]) -> Option<f64> {
        let family = &self.families[*self.index.get(name)?];
        family
            .samples
            .iter()
            .find(|s| s.label_values.iter().map(String::as_str).eq(label_values.iter().copied()))
            .map(|s| s.value)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for family in &self.families {
            let _ = writeln!(out, "# HELP {} {}", family.name, escape_help(family.help));
            let _ = writeln!(out, "# TYPE {} gauge", family.name);
            for sample in &family.samples {
                out.push_str(&family.name);
                if !family.labels.is_empty() {
                    out.push('{');
                    for (i, (label, value)) in family.labels.iter().zip(&sample.label_values).enumerate() {
                        if i > 0 {
                            out.push(',');
                        }
                        let _ = write!(out, "{}=\"{}\"", label, escape_label_value(value));
                    }
                    out.push('}');
                }
                let _ = writeln!(out, " {}", format_value(sample.value));
            }
        }
        out
    }
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

fn escape_help(help: &str) -> String {
    help.replace('\\', r"\\").replace('\n', r"\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', "\\\"")
        .replace('\n', r"\n")
}
