//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and invoice types,
//! and for building the expressions the repository sends. These are testable in
//! isolation without DynamoDB access.
//!
//! Every attribute name goes through a `#placeholder`: `status`, `name` and `date` are
//! reserved words in DynamoDB expressions.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use invoices_core::invoice::{
    customer_pk, invoice_sk, Assignment, CustomerId, Invoice, InvoiceId, InvoiceKey,
    InvoiceRecord, KeyAttributes, KeyCondition, PageKey, Status, ATTR_CUSTOMER_ID,
    ATTR_CUSTOMER_INDEX_PK, ATTR_GLOBAL_PK, ATTR_GLOBAL_SK, ATTR_INVOICE_ID, ATTR_STATUS_DATE,
    ATTR_STATUS_PK, ATTR_STATUS_SK,
};
use invoices_core::storage::RepositoryError;

pub type Item = HashMap<String, AttributeValue>;

/// Attribute names and values referenced by an expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    pub text: String,
    pub names: HashMap<String, String>,
    pub values: Item,
}

// ============================================================================
// Invoice conversions
// ============================================================================

/// Convert an InvoiceRecord to a DynamoDB item.
pub fn record_to_item(record: &InvoiceRecord) -> Item {
    let invoice = &record.invoice;
    let keys = &record.keys;
    let mut item = HashMap::new();

    // Table keys
    insert_s(&mut item, ATTR_CUSTOMER_ID, &keys.customer_pk);
    insert_s(&mut item, ATTR_INVOICE_ID, &keys.invoice_sk);

    // Index mirrors
    insert_s(&mut item, ATTR_CUSTOMER_INDEX_PK, &keys.customer_index_pk);
    insert_s(&mut item, ATTR_STATUS_DATE, &keys.status_date);
    insert_s(&mut item, ATTR_STATUS_PK, &keys.status_pk);
    insert_s(&mut item, ATTR_STATUS_SK, &keys.status_index_date);
    insert_s(&mut item, ATTR_GLOBAL_PK, &keys.global_pk);
    insert_s(&mut item, ATTR_GLOBAL_SK, &keys.global_index_date);

    // Data
    insert_s(&mut item, "customerId", invoice.customer_id.as_str());
    insert_s(&mut item, "invoiceId", invoice.invoice_id.as_str());
    insert_s(&mut item, "email", &invoice.email);
    insert_s(&mut item, "name", &invoice.name);
    item.insert(
        "amount".to_string(),
        AttributeValue::N(invoice.amount.to_string()),
    );
    insert_s(&mut item, "date", &invoice.date);
    insert_s(&mut item, "status", invoice.status.as_str());

    item
}

/// Convert a DynamoDB item to an InvoiceRecord.
///
/// Identifiers are taken from the table keys, so items written without the plain
/// `customerId` attribute still load.
pub fn item_to_record(item: &Item) -> Result<InvoiceRecord, RepositoryError> {
    let keys = KeyAttributes {
        customer_pk: get_string(item, ATTR_CUSTOMER_ID)?,
        invoice_sk: get_string(item, ATTR_INVOICE_ID)?,
        customer_index_pk: get_string(item, ATTR_CUSTOMER_INDEX_PK)?,
        status_date: get_string(item, ATTR_STATUS_DATE)?,
        status_pk: get_string(item, ATTR_STATUS_PK)?,
        status_index_date: get_string(item, ATTR_STATUS_SK)?,
        global_pk: get_string(item, ATTR_GLOBAL_PK)?,
        global_index_date: get_string(item, ATTR_GLOBAL_SK)?,
    };

    let customer_id = CustomerId::parse(&keys.customer_pk).ok_or_else(|| {
        RepositoryError::InvalidData(format!("Invalid field: {ATTR_CUSTOMER_ID}"))
    })?;
    let invoice_id = InvoiceId::parse(&keys.invoice_sk).ok_or_else(|| {
        RepositoryError::InvalidData(format!("Invalid field: {ATTR_INVOICE_ID}"))
    })?;

    let invoice = Invoice {
        customer_id,
        invoice_id,
        email: get_string(item, "email")?,
        name: get_string(item, "name")?,
        amount: get_number(item, "amount")?,
        date: get_string(item, "date")?,
        status: Status::normalize(&get_string(item, "status")?),
    };

    Ok(InvoiceRecord { invoice, keys })
}

/// Table key of an invoice.
pub fn key_to_item(key: &InvoiceKey) -> Item {
    let mut item = HashMap::new();
    insert_s(&mut item, ATTR_CUSTOMER_ID, &customer_pk(&key.customer_id));
    insert_s(&mut item, ATTR_INVOICE_ID, &invoice_sk(&key.invoice_id));
    item
}

// ============================================================================
// Page key conversions
// ============================================================================

/// Convert a page key to an ExclusiveStartKey.
pub fn page_key_to_item(key: &PageKey) -> Item {
    key.iter()
        .map(|(name, value)| (name.clone(), AttributeValue::S(value.clone())))
        .collect()
}

/// Convert a LastEvaluatedKey to a page key. Every key attribute is a string.
pub fn item_to_page_key(item: &Item) -> Result<PageKey, RepositoryError> {
    item.keys()
        .map(|name| Ok((name.clone(), get_string(item, name)?)))
        .collect()
}

// ============================================================================
// Expressions
// ============================================================================

/// `SET` expression for a partial update, guarded so it never creates an item.
pub fn update_expression(assignments: &[Assignment]) -> Expression {
    let mut expression = Expression::default();
    let mut clauses = Vec::with_capacity(assignments.len());

    for assignment in assignments {
        let placeholder = assignment.placeholder();
        clauses.push(format!("#{placeholder} = :{placeholder}"));
        expression
            .names
            .insert(format!("#{placeholder}"), assignment.attribute().to_string());
        expression
            .values
            .insert(format!(":{placeholder}"), assignment_value(assignment));
    }

    expression.text = format!("SET {}", clauses.join(", "));
    expression
        .names
        .insert("#pk".to_string(), ATTR_CUSTOMER_ID.to_string());
    expression
}

/// Condition under which an update applies: the item exists.
pub const UPDATE_CONDITION: &str = "attribute_exists(#pk)";

/// Condition under which a put applies: no item with this key exists yet.
pub const CREATE_CONDITION: &str = "attribute_not_exists(#pk)";

/// Key condition expression for a query.
pub fn key_condition_expression(condition: &KeyCondition) -> Expression {
    let mut expression = Expression::default();
    expression
        .names
        .insert("#pk".to_string(), condition.partition_attribute.to_string());
    expression.values.insert(
        ":pk".to_string(),
        AttributeValue::S(condition.partition_value.clone()),
    );

    match &condition.sort_prefix {
        Some(prefix) => {
            expression.text = "#pk = :pk AND begins_with(#sk, :sk_prefix)".to_string();
            expression
                .names
                .insert("#sk".to_string(), condition.sort_attribute.to_string());
            expression
                .values
                .insert(":sk_prefix".to_string(), AttributeValue::S(prefix.clone()));
        }
        None => expression.text = "#pk = :pk".to_string(),
    }

    expression
}

fn assignment_value(assignment: &Assignment) -> AttributeValue {
    match assignment {
        Assignment::Status(status) => AttributeValue::S(status.as_str().to_string()),
        Assignment::StatusPartition(value) | Assignment::StatusDate(value) => {
            AttributeValue::S(value.clone())
        }
        Assignment::Amount(amount) => AttributeValue::N(amount.to_string()),
    }
}

// ============================================================================
// Helper functions
// ============================================================================

fn insert_s(item: &mut Item, key: &str, value: &str) {
    item.insert(key.to_string(), AttributeValue::S(value.to_string()));
}

/// Get a required string attribute.
fn get_string(item: &Item, key: &str) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))
}

/// Get a required numeric attribute. Numbers stored as strings are accepted.
fn get_number(item: &Item, key: &str) -> Result<f64, RepositoryError> {
    let raw = item
        .get(key)
        .and_then(|v| v.as_n().or_else(|_| v.as_s()).ok())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))?;

    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Invalid number {}: {}", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoices_core::invoice::{
        route, CreateInvoiceRequest, ListFilter, PageSize, UpdatableField, UpdatePlan,
    };

    fn sample_record() -> InvoiceRecord {
        CreateInvoiceRequest::new()
            .with_email("a@x.com")
            .with_name("A")
            .with_amount(100.5)
            .with_date("2024-01-01")
            .with_status("Open")
            .validate()
            .unwrap()
            .into_record()
    }

    fn s<'a>(item: &'a Item, key: &str) -> &'a str {
        item.get(key).unwrap().as_s().unwrap()
    }

    #[test]
    fn test_record_item_has_correct_keys() {
        let record = sample_record();
        let item = record_to_item(&record);

        assert_eq!(s(&item, "CUSTOMER_ID"), "CUSTOMER-478abec7430569163161dfea");
        assert_eq!(
            s(&item, "INVOICE_ID"),
            format!("INVOICE-{}", record.invoice.invoice_id)
        );
        assert_eq!(s(&item, "CustomerID"), "CUSTOMER-478abec7430569163161dfea");
        assert_eq!(s(&item, "StatusDate"), "status#open#date#2024-01-01");
        assert_eq!(s(&item, "PK_STATUS"), "open");
        assert_eq!(s(&item, "SK_DATE"), "2024-01-01");
        assert_eq!(s(&item, "PK2_INVOICE"), "INVOICE");
        assert_eq!(s(&item, "SK2_Date"), "2024-01-01");
        assert_eq!(item.get("amount").unwrap().as_n().unwrap(), "100.5");
    }

    #[test]
    fn test_record_round_trip() {
        let record = sample_record();
        let parsed = item_to_record(&record_to_item(&record)).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_item_without_plain_ids_loads_from_keys() {
        let record = sample_record();
        let mut item = record_to_item(&record);
        item.remove("customerId");
        item.remove("invoiceId");

        let parsed = item_to_record(&item).unwrap();
        assert_eq!(parsed.key(), record.key());
    }

    #[test]
    fn test_amount_stored_as_string_is_accepted() {
        let mut item = record_to_item(&sample_record());
        item.insert("amount".to_string(), AttributeValue::S("42".to_string()));

        assert_eq!(item_to_record(&item).unwrap().invoice.amount, 42.0);
    }

    #[test]
    fn test_missing_field_is_invalid_data() {
        let mut item = record_to_item(&sample_record());
        item.remove("email");

        let result = item_to_record(&item);
        assert_eq!(
            result,
            Err(RepositoryError::InvalidData(
                "Missing or invalid field: email".to_string()
            ))
        );
    }

    #[test]
    fn test_key_to_item() {
        let key = InvoiceKey::parse("abc", "def").unwrap();
        let item = key_to_item(&key);

        assert_eq!(item.len(), 2);
        assert_eq!(s(&item, "CUSTOMER_ID"), "CUSTOMER-abc");
        assert_eq!(s(&item, "INVOICE_ID"), "INVOICE-def");
    }

    #[test]
    fn test_page_key_round_trip() {
        let record = sample_record();
        let query = route(&ListFilter::new(), PageSize::default(), None).unwrap();
        let key = record.page_key(query.index);

        assert_eq!(item_to_page_key(&page_key_to_item(&key)).unwrap(), key);
    }

    #[test]
    fn test_non_string_last_evaluated_key_is_rejected() {
        let mut item = Item::new();
        item.insert("SK_DATE".to_string(), AttributeValue::N("1".to_string()));

        assert!(matches!(
            item_to_page_key(&item),
            Err(RepositoryError::InvalidData(_))
        ));
    }

    #[test]
    fn test_update_expression_for_status() {
        let plan = UpdatePlan::new([UpdatableField::Status(Status::normalize("Overdue"))]).unwrap();
        let expression = update_expression(&plan.assignments("2024-01-01"));

        assert_eq!(
            expression.text,
            "SET #status = :status, #status_pk = :status_pk, #status_date = :status_date"
        );
        assert_eq!(expression.names["#status"], "status");
        assert_eq!(expression.names["#status_pk"], "PK_STATUS");
        assert_eq!(expression.names["#status_date"], "StatusDate");
        assert_eq!(expression.names["#pk"], "CUSTOMER_ID");
        assert_eq!(
            expression.values[":status_date"].as_s().unwrap(),
            "status#overdue#date#2024-01-01"
        );
        assert!(!expression.values.contains_key(":amount"));
    }

    #[test]
    fn test_update_expression_for_amount() {
        let plan = UpdatePlan::new([UpdatableField::Amount(0.0)]).unwrap();
        let expression = update_expression(&plan.assignments("2024-01-01"));

        assert_eq!(expression.text, "SET #amount = :amount");
        assert_eq!(expression.values[":amount"].as_n().unwrap(), "0");
    }

    #[test]
    fn test_key_condition_without_prefix() {
        let query = route(&ListFilter::new().with_status("paid"), PageSize::default(), None)
            .unwrap();
        let expression = key_condition_expression(&query.condition);

        assert_eq!(expression.text, "#pk = :pk");
        assert_eq!(expression.names["#pk"], "PK_STATUS");
        assert_eq!(expression.values[":pk"].as_s().unwrap(), "paid");
    }

    #[test]
    fn test_key_condition_with_prefix() {
        let filter = ListFilter::new().with_customer("abc").with_status("paid");
        let query = route(&filter, PageSize::default(), None).unwrap();
        let expression = key_condition_expression(&query.condition);

        assert_eq!(expression.text, "#pk = :pk AND begins_with(#sk, :sk_prefix)");
        assert_eq!(expression.names["#pk"], "CustomerID");
        assert_eq!(expression.names["#sk"], "StatusDate");
        assert_eq!(expression.values[":pk"].as_s().unwrap(), "CUSTOMER-abc");
        assert_eq!(
            expression.values[":sk_prefix"].as_s().unwrap(),
            "status#paid#date#"
        );
    }
}
