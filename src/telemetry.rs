//! Telemetry and structured logging for the card export worker.

use crate::job::{CardExportJob, JobStatus};
use opentelemetry::trace::{Span, Tracer};
use opentelemetry::{global, KeyValue};
use tracing::{info, warn};

/// Records telemetry for a completed or failed job.
///
/// This function emits structured logs and OpenTelemetry spans for monitoring
/// export pipeline health. Metrics include:
/// - Job duration (ms)
/// - Success/failure status
/// - Retry count
/// - Error messages (if failed)
///
/// # Arguments
///
/// * `job` - The completed or failed job
pub fn record_job_telemetry(job: &CardExportJob) {
    let tracer = global::tracer("card-export-worker");
    let mut span = tracer.start("card_export_job");

    // Add span attributes
    span.set_attribute(KeyValue::new("job_id", job.job_id.clone()));
    span.set_attribute(KeyValue::new("health_id", job.record.health_id.clone()));
    span.set_attribute(KeyValue::new("status", job.status.to_string()));
    span.set_attribute(KeyValue::new("retry_count", job.retry_count as i64));

    if let Some(duration_ms) = job.processing_duration_ms() {
        span.set_attribute(KeyValue::new("duration_ms", duration_ms));

        // Log performance metrics
        info!(
            job_id = %job.job_id,
            health_id = %job.record.health_id,
            duration_ms = duration_ms,
            status = %job.status,
            "card export job completed"
        );

        // Warn if exceeding performance threshold (5 seconds)
        if duration_ms > 5000 {
            warn!(
                job_id = %job.job_id,
                duration_ms = duration_ms,
                "card export exceeded performance threshold (5000ms)"
            );
        }
    }

    // Record error details if job failed
    if job.status == JobStatus::Failed {
        if let Some(ref error) = job.error {
            span.set_attribute(KeyValue::new("error", error.clone()));
            warn!(
                job_id = %job.job_id,
                error = %error,
                retry_count = job.retry_count,
                "card export job failed"
            );
        }
    }

    // Record metadata
    span.set_attribute(KeyValue::new("office_code", job.metadata.office_code.clone()));
    span.set_attribute(KeyValue::new("district", job.record.district.clone()));
    span.set_attribute(KeyValue::new(
        "portal_version",
        job.metadata.portal_version.clone(),
    ));

    span.end();
}

/// Records a worker heartbeat for monitoring worker health.
///
/// This should be called periodically by the worker loop to signal
/// that the worker is alive and processing jobs.
///
/// # Arguments
///
/// * `queue_length` - Current number of jobs in the queue
pub fn record_worker_heartbeat(queue_length: usize) {
    let tracer = global::tracer("card-export-worker");
    let mut span = tracer.start("worker_heartbeat");

    span.set_attribute(KeyValue::new("queue_length", queue_length as i64));
    span.end();

    info!(queue_length = queue_length, "worker heartbeat");
}

/// Initializes OpenTelemetry with OTLP exporter.
///
/// This should be called once at worker startup. Reads configuration
/// from environment variables:
/// - `OTEL_EXPORTER_OTLP_ENDPOINT` - Collector endpoint (default: http://localhost:4317)
/// - `OTEL_SERVICE_NAME` - Service name (default: card-export-worker)
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if initialization fails.
pub fn init_telemetry() -> Result<(), Box<dyn std::error::Error>> {
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::Config;

    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "card-export-worker".to_string());

    // Initialize OTLP exporter
    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(&endpoint),
        )
        .with_trace_config(Config::default().with_resource(
            opentelemetry_sdk::Resource::new(vec![
                KeyValue::new("service.name", service_name),
                KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            ]),
        ))
        .install_batch(opentelemetry_sdk::runtime::Tokio)?;

    global::set_tracer_provider(tracer.provider().unwrap());

    info!("Telemetry initialized: endpoint={}", endpoint);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::HealthCardRecord;
    use crate::job::JobMetadata;

    fn sample_job() -> CardExportJob {
        CardExportJob::new(
            HealthCardRecord {
                health_id: "HLTH0001".to_string(),
                full_name: "Raj Kumar".to_string(),
                district: "Ernakulam".to_string(),
                ..Default::default()
            },
            "/tmp/test.pdf".to_string(),
            JobMetadata {
                office_code: "EKM-01".to_string(),
                portal_version: "0.1.0".to_string(),
                requested_by: None,
            },
        )
    }

    #[test]
    fn test_record_job_telemetry() {
        let mut job = sample_job();
        job.mark_complete();

        // Should not panic
        record_job_telemetry(&job);
    }

    #[test]
    fn test_record_failed_job() {
        let mut job = sample_job();
        job.mark_failed("Test error".to_string());

        // Should not panic and should log error
        record_job_telemetry(&job);
    }
}
