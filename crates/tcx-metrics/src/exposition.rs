//! Prometheus text exposition format.
//!
//! Renders a store snapshot for scraping by a Prometheus server or
//! compatible agent. Every exported metric is a gauge; names and label
//! sets are whatever the scrape pipelines produced.

use std::collections::BTreeMap;

use crate::store::Sample;

/// Render samples in the Prometheus text format.
///
/// Samples are grouped by metric name with one HELP/TYPE header pair per
/// group (the help text is the metric name itself). Groups and the samples
/// within them are emitted in a deterministic order so consecutive scrapes
/// are diffable.
pub fn render_prometheus(samples: &[Sample]) -> String {
    let mut groups: BTreeMap<&str, Vec<&Sample>> = BTreeMap::new();
    for sample in samples {
        groups.entry(sample.name.as_str()).or_default().push(sample);
    }

    let mut out = String::new();
    for (name, mut group) in groups {
        group.sort_by(|a, b| {
            let a_values = a.labels.iter().map(|l| l.value.as_str());
            let b_values = b.labels.iter().map(|l| l.value.as_str());
            a_values.cmp(b_values)
        });

        out.push_str(&format!("# HELP {name} {name}\n"));
        out.push_str(&format!("# TYPE {name} gauge\n"));
        for sample in group {
            out.push_str(&render_sample(sample));
        }
    }
    out
}

fn render_sample(sample: &Sample) -> String {
    if sample.labels.is_empty() {
        return format!("{} {}\n", sample.name, sample.value);
    }

    let labels = sample
        .labels
        .iter()
        .map(|l| format!("{}=\"{}\"", l.name, escape_label_value(&l.value)))
        .collect::<Vec<_>>()
        .join(",");
    format!("{}{{{}}} {}\n", sample.name, labels, sample.value)
}

/// Escape a label value per the exposition format: backslash, double
/// quote, and newline.
fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
