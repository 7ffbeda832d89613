//! Tag taxonomy reconciliation
//!
//! Creates whatever canonical tag is missing and resets the attributes of
//! every canonical tag. A failure on one tag is recorded and the walk goes on.

use tracing::{debug, info, warn};

use super::taxonomy::canonical_tags;
use super::TagStore;

/// Outcome of one reconciliation pass
#[derive(Debug, Default, Clone)]
pub struct TagReconcileReport {
    /// Keys created during this pass, in taxonomy order
    pub created: Vec<String>,
    /// Keys whose creation or update failed, with the reason
    pub failures: Vec<(String, String)>,
}

impl TagReconcileReport {
    pub fn was_created(&self, key: &str) -> bool {
        self.created.iter().any(|k| k == key)
    }
}

pub fn reconcile_tags(store: &dyn TagStore) -> TagReconcileReport {
    let mut report = TagReconcileReport::default();

    for (key, attributes) in canonical_tags() {
        match store.tag_exists(&key) {
            Ok(true) => {}
            Ok(false) => match store.create_tag(&key) {
                Ok(_) => {
                    debug!(key = %key, "Created tag");
                    report.created.push(key.clone());
                }
                Err(e) => {
                    warn!(key = %key, "Failed to create tag: {}", e);
                    report.failures.push((key, e.to_string()));
                    continue;
                }
            },
            Err(e) => {
                warn!(key = %key, "Failed to look up tag: {}", e);
                report.failures.push((key, e.to_string()));
                continue;
            }
        }

        if let Err(e) = store.set_tag_attributes(&key, &attributes) {
            warn!(key = %key, "Failed to update tag attributes: {}", e);
            report.failures.push((key, e.to_string()));
        }
    }

    info!(
        "Reconciled tag taxonomy: {} created, {} failed",
        report.created.len(),
        report.failures.len()
    );
    report
}
