use crate::calc;
use axum::extract::Query;
use serde::Deserialize;

/// Missing operands default to zero.
#[derive(Debug, Deserialize)]
pub struct IntOperands {
    #[serde(default)]
    pub num1: i32,
    #[serde(default)]
    pub num2: i32,
}

#[derive(Debug, Deserialize)]
pub struct DoubleOperands {
    #[serde(default)]
    pub num1: f64,
    #[serde(default)]
    pub num2: f64,
}

pub async fn sum(Query(q): Query<IntOperands>) -> String {
    calc::sum(q.num1, q.num2)
}

pub async fn sum_ints(Query(q): Query<IntOperands>) -> String {
    calc::sum_ints(q.num1, q.num2)
}

pub async fn sum_doubles(Query(q): Query<DoubleOperands>) -> String {
    calc::sum_doubles(q.num1, q.num2)
}
