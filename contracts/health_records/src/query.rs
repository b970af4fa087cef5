//! Typed selector queries over requests and grants.
//!
//! A [`Query`] is a conjunction of `(field, operator, value)` conditions.
//! Every queryable entity exposes its fields as `u64` through [`Queryable`];
//! a field the entity does not carry never matches.

use soroban_sdk::{contracttype, Env, Vec};

use crate::request_ledger::RequestStatus;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum QueryField {
    /// Request lifecycle status, compared by discriminant.
    Status,
    CreatedAt,
    StatusChangedAt,
    /// Proposed expiration on requests, `expires_at` on grants.
    Expiration,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum QueryOp {
    Equal,
    GreaterThan,
    LessThan,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Condition {
    pub field: QueryField,
    pub op: QueryOp,
    pub value: u64,
}

impl Condition {
    fn holds(&self, actual: u64) -> bool {
        match self.op {
            QueryOp::Equal => actual == self.value,
            QueryOp::GreaterThan => actual > self.value,
            QueryOp::LessThan => actual < self.value,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Query {
    pub conditions: Vec<Condition>,
}

pub trait Queryable {
    fn field_value(&self, field: &QueryField) -> Option<u64>;
}

impl Query {
    /// A query with no conditions; matches everything.
    pub fn all(env: &Env) -> Self {
        Query {
            conditions: Vec::new(env),
        }
    }

    pub fn and(mut self, field: QueryField, op: QueryOp, value: u64) -> Self {
        self.conditions.push_back(Condition { field, op, value });
        self
    }

    pub fn with_status(self, status: RequestStatus) -> Self {
        self.and(QueryField::Status, QueryOp::Equal, status as u64)
    }

    /// Keeps entries whose expiration is strictly after `now`.
    pub fn live_at(self, now: u64) -> Self {
        self.and(QueryField::Expiration, QueryOp::GreaterThan, now)
    }

    pub fn matches<T: Queryable>(&self, item: &T) -> bool {
        self.conditions.iter().all(|cond| {
            item.field_value(&cond.field)
                .map(|actual| cond.holds(actual))
                .unwrap_or(false)
        })
    }
}
