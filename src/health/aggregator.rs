//! Stateless health aggregation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::health::probes::DependencyProbe;
use crate::health::{DependencyHealth, DependencyStatus, HealthReport, OverallStatus};
use crate::observability::metrics;

/// Run every probe under `probe_timeout` and fold the results into one
/// report. Probe failures and timeouts become unhealthy dependency entries;
/// nothing escapes this function as an error.
pub async fn aggregate(
    service: &str,
    version: &str,
    environment: &str,
    probes: &[Arc<dyn DependencyProbe>],
    probe_timeout: Duration,
) -> HealthReport {
    let mut dependencies = Vec::with_capacity(probes.len());
    let mut required_failure = false;
    let mut optional_failure = false;

    for probe in probes {
        let start = Instant::now();
        let outcome = tokio::time::timeout(probe_timeout, probe.check()).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let entry = match outcome {
            Ok(Ok(())) => DependencyHealth {
                name: probe.name().to_string(),
                status: DependencyStatus::Healthy,
                response_time_ms: Some(elapsed_ms),
                error: None,
            },
            Ok(Err(message)) => DependencyHealth {
                name: probe.name().to_string(),
                status: DependencyStatus::Unhealthy,
                response_time_ms: Some(elapsed_ms),
                error: Some(message),
            },
            Err(_) => DependencyHealth {
                name: probe.name().to_string(),
                status: DependencyStatus::Unhealthy,
                response_time_ms: Some(elapsed_ms),
                error: Some(format!(
                    "health check timed out after {}ms",
                    probe_timeout.as_millis()
                )),
            },
        };

        let healthy = entry.status == DependencyStatus::Healthy;
        metrics::record_dependency_health(probe.name(), healthy);
        if !healthy {
            if probe.required() {
                required_failure = true;
            } else {
                optional_failure = true;
            }
            tracing::warn!(
                dependency = probe.name(),
                error = entry.error.as_deref().unwrap_or(""),
                "Dependency check failed"
            );
        }

        dependencies.push(entry);
    }

    let status = if required_failure {
        OverallStatus::Unhealthy
    } else if optional_failure {
        OverallStatus::Degraded
    } else {
        OverallStatus::Ok
    };

    HealthReport {
        status,
        timestamp: Utc::now(),
        service: service.to_string(),
        version: version.to_string(),
        environment: environment.to_string(),
        dependencies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::probes::FnProbe;

    fn ok_probe(name: &str, required: bool) -> Arc<dyn DependencyProbe> {
        Arc::new(FnProbe::new(name, required, || Box::pin(async { Ok(()) })))
    }

    fn failing_probe(name: &str, required: bool) -> Arc<dyn DependencyProbe> {
        Arc::new(FnProbe::new(name, required, || {
            Box::pin(async { Err("connection refused".to_string()) })
        }))
    }

    fn slow_probe(name: &str) -> Arc<dyn DependencyProbe> {
        Arc::new(FnProbe::new(name, true, || {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
        }))
    }

    async fn run(probes: Vec<Arc<dyn DependencyProbe>>) -> HealthReport {
        aggregate("gateway", "0.1.0", "test", &probes, Duration::from_millis(100)).await
    }

    #[tokio::test]
    async fn test_all_healthy() {
        let report = run(vec![ok_probe("database", true), ok_probe("shipping", true)]).await;

        assert_eq!(report.status, OverallStatus::Ok);
        assert_eq!(report.dependencies.len(), 2);
        assert!(report
            .dependencies
            .iter()
            .all(|d| d.status == DependencyStatus::Healthy));
    }

    #[tokio::test]
    async fn test_required_failure_is_unhealthy() {
        let report = run(vec![ok_probe("shipping", true), failing_probe("database", true)]).await;

        assert_eq!(report.status, OverallStatus::Unhealthy);
        let db = report
            .dependencies
            .iter()
            .find(|d| d.name == "database")
            .unwrap();
        assert_eq!(db.status, DependencyStatus::Unhealthy);
        assert_eq!(db.error.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_optional_failure_is_degraded() {
        let report = run(vec![ok_probe("database", true), failing_probe("redis", false)]).await;

        assert_eq!(report.status, OverallStatus::Degraded);
    }

    #[tokio::test]
    async fn test_slow_probe_times_out() {
        let report = run(vec![slow_probe("stock-api")]).await;

        assert_eq!(report.status, OverallStatus::Unhealthy);
        let dep = &report.dependencies[0];
        assert!(dep.error.as_deref().unwrap_or("").contains("timed out"));
    }

    #[tokio::test]
    async fn test_report_serialization_shape() {
        let report = run(vec![ok_probe("database", true)]).await;
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["status"], "ok");
        assert_eq!(json["dependencies"][0]["name"], "database");
        assert_eq!(json["dependencies"][0]["status"], "healthy");
        assert!(json["dependencies"][0]["responseTimeMs"].is_number());
        assert!(json["dependencies"][0].get("error").is_none());
    }
}
