//! Customer roster cleaning.

use chrono::NaiveDate;

use crate::error::{CleanError, CleanResult};
use crate::logs::TableLog;
use crate::models::{Customer, EntityId, RawCustomer};

const LOG: TableLog = TableLog::new("customers");

/// Age the roster uses when the customer never provided one.
pub const AGE_NOT_PROVIDED: u32 = 118;

/// Parse a membership date written as exactly eight digits, YYYYMMDD.
pub fn parse_member_since(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y%m%d").ok()
}

/// Clean one raw customer. `row` is the 0-based position used in errors.
pub fn clean_customer(row: usize, raw: RawCustomer) -> CleanResult<Customer> {
    let since = raw.became_member_on.as_text();
    let became_member_on =
        parse_member_since(&since).ok_or_else(|| CleanError::InvalidMemberSince {
            row,
            value: since.to_string(),
        })?;

    Ok(Customer {
        customer_id: EntityId::Source(raw.id),
        gender: raw.gender,
        age: raw.age.filter(|&age| age != AGE_NOT_PROVIDED),
        income: raw.income,
        became_member_on,
    })
}

/// Clean the customer roster.
///
/// The first malformed membership date aborts the whole table.
pub fn clean_customers(raw: Vec<RawCustomer>) -> CleanResult<Vec<Customer>> {
    let sentinel_ages = raw
        .iter()
        .filter(|c| c.age == Some(AGE_NOT_PROVIDED))
        .count();

    let customers = raw
        .into_iter()
        .enumerate()
        .map(|(row, c)| clean_customer(row, c))
        .collect::<CleanResult<Vec<_>>>()?;

    LOG.done(format!("{} cleaned", customers.len()));
    if sentinel_ages > 0 {
        LOG.detail(format!("{} ages of {} marked as not provided", sentinel_ages, AGE_NOT_PROVIDED));
    }
    Ok(customers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberSince;

    fn raw_customer(id: &str, age: Option<u32>, since: MemberSince) -> RawCustomer {
        RawCustomer {
            id: id.to_string(),
            gender: Some("F".to_string()),
            age,
            income: Some(112000.0),
            became_member_on: since,
        }
    }

    #[test]
    fn test_parse_member_since() {
        assert_eq!(parse_member_since("20170715"), NaiveDate::from_ymd_opt(2017, 7, 15));
        assert_eq!(parse_member_since("2017-07-15"), None);
        assert_eq!(parse_member_since("2017715"), None);
        assert_eq!(parse_member_since("201707150"), None);
        assert_eq!(parse_member_since("20171315"), None);
        assert_eq!(parse_member_since("+2017071"), None);
    }

    #[test]
    fn test_age_sentinel_becomes_missing() {
        let customers = clean_customers(vec![
            raw_customer("a", Some(118), MemberSince::Number(20170212)),
            raw_customer("b", Some(55), MemberSince::Number(20170715)),
            raw_customer("c", None, MemberSince::Number(20180712)),
        ])
        .unwrap();

        assert_eq!(customers[0].age, None);
        assert_eq!(customers[1].age, Some(55));
        assert_eq!(customers[2].age, None);
    }

    #[test]
    fn test_missing_fields_pass_through() {
        let mut raw = raw_customer("a", Some(118), MemberSince::Text("20170212".into()));
        raw.gender = None;
        raw.income = None;

        let customer = clean_customer(0, raw).unwrap();
        assert_eq!(customer.customer_id, EntityId::from("a"));
        assert_eq!(customer.gender, None);
        assert_eq!(customer.income, None);
        assert_eq!(customer.became_member_on, NaiveDate::from_ymd_opt(2017, 2, 12).unwrap());
    }

    #[test]
    fn test_invalid_date_is_fatal() {
        let result = clean_customers(vec![
            raw_customer("a", Some(40), MemberSince::Number(20170212)),
            raw_customer("b", Some(41), MemberSince::Text("2017/02/12".into())),
        ]);

        match result {
            Err(CleanError::InvalidMemberSince { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "2017/02/12");
            }
            other => panic!("expected InvalidMemberSince, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_date_with_wrong_width_is_fatal() {
        let result = clean_customer(0, raw_customer("a", None, MemberSince::Number(2017021)));
        assert!(matches!(result, Err(CleanError::InvalidMemberSince { .. })));
    }
}
