//! Trip cost estimate

use serde::{Deserialize, Serialize};

use crate::models::BudgetBreakdown;
use crate::models::budget::CURRENCY;

pub const DEFAULT_DAILY_EXPENSE: f64 = 2000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BudgetEstimate {
    Success {
        breakdown: BudgetBreakdown,
        total_cost: f64,
        currency: String,
    },
}

/// Daily spend is charged per night, matching how the stay is priced
#[must_use]
pub fn estimate(
    flight_price: f64,
    hotel_price_per_night: f64,
    num_nights: u32,
    daily_expense: f64,
) -> BudgetEstimate {
    let breakdown = BudgetBreakdown::new(flight_price, hotel_price_per_night, num_nights, daily_expense);
    BudgetEstimate::Success {
        total_cost: breakdown.total(),
        breakdown,
        currency: CURRENCY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_three_nights() {
        let BudgetEstimate::Success {
            breakdown,
            total_cost,
            currency,
        } = estimate(5000.0, 2000.0, 3, 1000.0);
        assert_eq!(breakdown.hotel.total, 6000.0);
        assert_eq!(breakdown.daily_expenses.total, 3000.0);
        assert_eq!(total_cost, 14000.0);
        assert_eq!(currency, "INR");
    }

    #[test]
    fn test_estimate_json_shape() {
        let json = serde_json::to_value(estimate(4500.0, 3000.0, 2, DEFAULT_DAILY_EXPENSE)).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["breakdown"]["hotel"]["per_night"], 3000.0);
        assert_eq!(json["breakdown"]["hotel"]["total_nights"], 2);
        assert_eq!(json["breakdown"]["daily_expenses"]["total"], 4000.0);
        assert_eq!(json["total_cost"], 14500.0);
    }
}
