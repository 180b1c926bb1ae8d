//! Partial update composition.
//!
//! Only `status` and `amount` may change after creation. A status change also rewrites
//! the two index attributes derived from it, so the mirrors never go stale.

use super::error::InvoiceError;
use super::keys::{status_date_sk, ATTR_STATUS_DATE, ATTR_STATUS_PK};
use super::types::{InvoiceRecord, Status};

/// A caller-supplied change to one updatable field.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdatableField {
    Status(Status),
    Amount(f64),
}

/// A single attribute write produced by an [`UpdatePlan`].
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Status(Status),
    /// Partition of the status index. Always equal to the new status.
    StatusPartition(String),
    /// Sort key of the customer index, recomputed from the new status and stored date.
    StatusDate(String),
    Amount(f64),
}

impl Assignment {
    /// Name of the stored attribute this assignment writes.
    pub fn attribute(&self) -> &'static str {
        match self {
            Assignment::Status(_) => "status",
            Assignment::StatusPartition(_) => ATTR_STATUS_PK,
            Assignment::StatusDate(_) => ATTR_STATUS_DATE,
            Assignment::Amount(_) => "amount",
        }
    }

    /// Short identifier used to build expression placeholders (`#status`, `:status`).
    pub fn placeholder(&self) -> &'static str {
        match self {
            Assignment::Status(_) => "status",
            Assignment::StatusPartition(_) => "status_pk",
            Assignment::StatusDate(_) => "status_date",
            Assignment::Amount(_) => "amount",
        }
    }

    /// Applies the write to an in-memory record.
    pub fn apply_to(&self, record: &mut InvoiceRecord) {
        match self {
            Assignment::Status(status) => record.invoice.status = status.clone(),
            Assignment::StatusPartition(value) => record.keys.status_pk = value.clone(),
            Assignment::StatusDate(value) => record.keys.status_date = value.clone(),
            Assignment::Amount(amount) => record.invoice.amount = *amount,
        }
    }
}

/// The set of fields a partial update changes.
///
/// Construction fails with [`InvoiceError::NoUpdatableFields`] when nothing would change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdatePlan {
    status: Option<Status>,
    amount: Option<f64>,
}

impl UpdatePlan {
    /// Collects fields into a plan. A repeated field keeps its last value.
    pub fn new(fields: impl IntoIterator<Item = UpdatableField>) -> Result<Self, InvoiceError> {
        let mut plan = Self::default();
        for field in fields {
            match field {
                UpdatableField::Status(status) => plan.status = Some(status),
                UpdatableField::Amount(amount) => plan.amount = Some(amount),
            }
        }

        if plan.is_empty() {
            return Err(InvoiceError::NoUpdatableFields);
        }
        Ok(plan)
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn amount(&self) -> Option<f64> {
        self.amount
    }

    fn is_empty(&self) -> bool {
        self.status.is_none() && self.amount.is_none()
    }

    /// Expands the plan into attribute writes.
    ///
    /// `date` is the stored invoice date, needed to rebuild the customer index sort key
    /// when the status changes. The amount is written alone and touches no index.
    pub fn assignments(&self, date: &str) -> Vec<Assignment> {
        let mut assignments = Vec::with_capacity(4);
        if let Some(status) = &self.status {
            assignments.push(Assignment::Status(status.clone()));
            assignments.push(Assignment::StatusPartition(status.as_str().to_string()));
            assignments.push(Assignment::StatusDate(status_date_sk(status, date)));
        }
        if let Some(amount) = self.amount {
            assignments.push(Assignment::Amount(amount));
        }
        assignments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{derive_customer_id, generate_invoice_id, Invoice};

    fn record(status: &str) -> InvoiceRecord {
        InvoiceRecord::new(Invoice {
            customer_id: derive_customer_id("a@x.com"),
            invoice_id: generate_invoice_id(),
            email: "a@x.com".to_string(),
            name: "A".to_string(),
            amount: 100.0,
            date: "2024-01-01".to_string(),
            status: Status::normalize(status),
        })
    }

    #[test]
    fn test_empty_plan_is_rejected() {
        assert_eq!(
            UpdatePlan::new(Vec::new()),
            Err(InvoiceError::NoUpdatableFields)
        );
    }

    #[test]
    fn test_status_update_rewrites_mirrors() {
        let plan = UpdatePlan::new([UpdatableField::Status(Status::normalize("Overdue"))]).unwrap();
        let assignments = plan.assignments("2024-01-01");

        assert_eq!(
            assignments,
            vec![
                Assignment::Status(Status::normalize("overdue")),
                Assignment::StatusPartition("overdue".to_string()),
                Assignment::StatusDate("status#overdue#date#2024-01-01".to_string()),
            ]
        );
    }

    #[test]
    fn test_amount_update_touches_no_index() {
        let plan = UpdatePlan::new([UpdatableField::Amount(250.5)]).unwrap();
        assert_eq!(plan.assignments("2024-01-01"), vec![Assignment::Amount(250.5)]);
    }

    #[test]
    fn test_zero_amount_is_an_update() {
        let plan = UpdatePlan::new([UpdatableField::Amount(0.0)]).unwrap();
        assert_eq!(plan.amount(), Some(0.0));
    }

    #[test]
    fn test_last_value_wins() {
        let plan = UpdatePlan::new([
            UpdatableField::Amount(1.0),
            UpdatableField::Status(Status::normalize("open")),
            UpdatableField::Amount(2.0),
        ])
        .unwrap();

        assert_eq!(plan.amount(), Some(2.0));
        assert_eq!(plan.status().map(Status::as_str), Some("open"));
    }

    #[test]
    fn test_applied_status_update_keeps_record_consistent() {
        let mut record = record("open");
        let plan = UpdatePlan::new([UpdatableField::Status(Status::normalize("Paid"))]).unwrap();

        for assignment in plan.assignments(&record.invoice.date) {
            assignment.apply_to(&mut record);
        }

        assert_eq!(record.invoice.status.as_str(), "paid");
        assert_eq!(record.keys.status_pk, "paid");
        assert_eq!(record.keys.status_date, "status#paid#date#2024-01-01");
        assert_eq!(record.invoice.amount, 100.0);
        assert!(record.is_consistent());
    }

    #[test]
    fn test_attribute_names_and_placeholders() {
        let plan = UpdatePlan::new([
            UpdatableField::Status(Status::normalize("paid")),
            UpdatableField::Amount(5.0),
        ])
        .unwrap();
        let assignments = plan.assignments("2024-01-01");

        let attributes: Vec<_> = assignments.iter().map(Assignment::attribute).collect();
        assert_eq!(attributes, vec!["status", "PK_STATUS", "StatusDate", "amount"]);

        let placeholders: Vec<_> = assignments.iter().map(Assignment::placeholder).collect();
        assert_eq!(
            placeholders,
            vec!["status", "status_pk", "status_date", "amount"]
        );
    }
}
