//! Sum formatting for the calculator API.
//!
//! Integer sums wrap on 32-bit overflow. Floats use the shortest representation
//! that round-trips, so `5.0` prints as `5`.

pub fn sum(num1: i32, num2: i32) -> String {
    format!("{} + {} = {}.", num1, num2, num1.wrapping_add(num2))
}

pub fn sum_ints(num1: i32, num2: i32) -> String {
    format!("[ints]  {}", sum(num1, num2))
}

pub fn sum_doubles(num1: f64, num2: f64) -> String {
    format!("[doubles]  {} + {} = {}.", num1, num2, num1 + num2)
}
