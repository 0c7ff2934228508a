//! Reachability report for the managed services

use log::{debug, error, info, warn};
use std::fmt;

use crate::gateway::RemoteGateway;

/// Outcome of probing one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Ok,
    Warning(String),
    Error(String),
}

/// One probed service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCheck {
    pub service: &'static str,
    pub outcome: CheckOutcome,
}

impl ServiceCheck {
    fn from_probe(service: &'static str, result: crate::error::Result<()>) -> Self {
        let outcome = match result {
            Ok(()) => {
                debug!("{}: reachable", service);
                CheckOutcome::Ok
            }
            Err(e) => {
                error!("{}: {}", service, e);
                CheckOutcome::Error(format!("{} unreachable: {}", service, e))
            }
        };
        Self { service, outcome }
    }
}

/// All probes of one run
#[derive(Debug, Clone, Default)]
pub struct ServiceReport {
    pub checks: Vec<ServiceCheck>,
}

impl ServiceReport {
    pub fn errors(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter_map(|c| match &c.outcome {
                CheckOutcome::Error(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter_map(|c| match &c.outcome {
                CheckOutcome::Warning(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }

    /// No errors; warnings are allowed
    pub fn is_healthy(&self) -> bool {
        self.errors().is_empty()
    }
}

impl fmt::Display for ServiceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Service Report ===")?;

        let errors = self.errors();
        let warnings = self.warnings();
        if errors.is_empty() && warnings.is_empty() {
            return writeln!(f, "All services are reachable");
        }

        if !errors.is_empty() {
            writeln!(f, "ERRORS:")?;
            for msg in errors {
                writeln!(f, "  - {}", msg)?;
            }
        }
        if !warnings.is_empty() {
            writeln!(f, "WARNINGS:")?;
            for msg in warnings {
                writeln!(f, "  - {}", msg)?;
            }
        }
        Ok(())
    }
}

/// Probe the identity service, the document store and the image bucket
pub async fn check_services(gateway: &RemoteGateway) -> ServiceReport {
    let bucket_name = gateway.options().image_bucket.clone();
    let storage = gateway.storage();

    let (auth, documents, bucket) = tokio::join!(
        gateway.auth().health(),
        gateway.document_store().health(),
        storage.get_bucket(&bucket_name),
    );

    let storage_check = match bucket {
        Ok(Some(_)) => ServiceCheck {
            service: "storage",
            outcome: CheckOutcome::Ok,
        },
        Ok(None) => {
            warn!("Bucket {} does not exist", bucket_name);
            ServiceCheck {
                service: "storage",
                outcome: CheckOutcome::Warning(format!(
                    "bucket {} not found, image uploads will fail",
                    bucket_name
                )),
            }
        }
        Err(e) => ServiceCheck::from_probe("storage", Err(e)),
    };

    let report = ServiceReport {
        checks: vec![
            ServiceCheck::from_probe("auth", auth),
            ServiceCheck::from_probe("database", documents),
            storage_check,
        ],
    };
    info!("{}", report);
    report
}
