//! Cluster usage over time

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::fmt::Write;
use std::time::Duration;
use webui_core::{Snapshot, StateHub, Tab};

/// 24 minutes at one sample per second.
pub const SERIES_CAPACITY: usize = 1440;
pub const SERIES_STEP: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub at: DateTime<Utc>,
    pub cpus: f64,
    pub mem: f64,
}

/// Used cpus and mem, newest last, bounded to `SERIES_CAPACITY` samples.
#[derive(Debug, Clone, Default)]
pub struct DashboardSeries {
    samples: VecDeque<Sample>,
}

impl DashboardSeries {
    pub fn record(&mut self, snapshot: &Snapshot) {
        self.record_at(snapshot, snapshot.fetched_at);
    }

    /// Samples closer than `SERIES_STEP` to the previous one are dropped.
    pub fn record_at(&mut self, snapshot: &Snapshot, at: DateTime<Utc>) {
        if let Some(last) = self.samples.back() {
            let step = chrono::Duration::milliseconds(SERIES_STEP.as_millis() as i64);
            if at - last.at < step {
                return;
            }
        }
        if self.samples.len() == SERIES_CAPACITY {
            self.samples.pop_front();
        }
        let used = snapshot.aggregates.used;
        self.samples.push_back(Sample { at, cpus: used.cpus, mem: used.mem });
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
}

pub struct DashboardView;

impl DashboardView {
    pub fn open(hub: &StateHub) -> Self {
        hub.set_tab(Tab::Dashboard);
        Self
    }

    pub fn render(&self, snapshot: &Snapshot, series: &DashboardSeries) -> String {
        let agg = &snapshot.aggregates;
        let mut out = String::new();
        let _ = writeln!(out, "== Dashboard ({} samples)", series.len());
        let _ = writeln!(
            out,
            "CPUs used {:.2} / {:.2}   Mem used {:.0} / {:.0} MB",
            agg.used.cpus, agg.total.cpus, agg.used.mem, agg.total.mem
        );
        let peak_cpus = series.samples().map(|s| s.cpus).fold(0.0, f64::max);
        let peak_mem = series.samples().map(|s| s.mem).fold(0.0, f64::max);
        let _ = writeln!(out, "Peak cpus {:.2}   Peak mem {:.0} MB", peak_cpus, peak_mem);
        if let Some(latest) = series.latest() {
            let _ = writeln!(out, "Last sample {}", latest.at.format("%H:%M:%S"));
        }
        out
    }
}
