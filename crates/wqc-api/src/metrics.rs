//! Prometheus counters for query cycles, exported on `/metrics`.
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use wqc_core::{ConsoleError, ResponseShape};

pub struct Metrics {
    registry: Registry,
    cycles: IntCounterVec,
    errors: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let cycles = IntCounterVec::new(
            Opts::new("wqc_cycles_total", "Completed query cycles by response shape"),
            &["shape"],
        )?;
        let errors = IntCounterVec::new(
            Opts::new("wqc_errors_total", "Aborted query cycles by error kind"),
            &["kind"],
        )?;
        registry.register(Box::new(cycles.clone()))?;
        registry.register(Box::new(errors.clone()))?;
        Ok(Self {
            registry,
            cycles,
            errors,
        })
    }

    pub fn record_cycle(&self, shape: ResponseShape) {
        self.cycles.with_label_values(&[shape.as_str()]).inc();
    }

    pub fn record_error(&self, err: &ConsoleError) {
        self.errors.with_label_values(&[err.kind()]).inc();
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_encoded() {
        let metrics = Metrics::new().unwrap();
        metrics.record_cycle(ResponseShape::AgentList);
        metrics.record_cycle(ResponseShape::AgentList);
        metrics.record_error(&ConsoleError::input("empty"));

        let text = metrics.encode().unwrap();
        assert!(text.contains(r#"wqc_cycles_total{shape="agent_list"} 2"#));
        assert!(text.contains(r#"wqc_errors_total{kind="input"} 1"#));
    }
}
