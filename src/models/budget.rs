//! Trip budget breakdown

use serde::{Deserialize, Serialize};

/// Currency used by every catalog price
pub const CURRENCY: &str = "INR";

/// Derived cost breakdown for one trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub flight: f64,
    pub hotel: HotelCost,
    pub daily_expenses: DailyCost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelCost {
    pub per_night: f64,
    pub total_nights: u32,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCost {
    pub per_day: f64,
    pub total_days: u32,
    pub total: f64,
}

impl BudgetBreakdown {
    /// Multiply nightly and daily rates out over the stay
    #[must_use]
    pub fn new(flight: f64, hotel_per_night: f64, nights: u32, daily_expense: f64) -> Self {
        let nights_f = f64::from(nights);
        Self {
            flight,
            hotel: HotelCost {
                per_night: hotel_per_night,
                total_nights: nights,
                total: hotel_per_night * nights_f,
            },
            daily_expenses: DailyCost {
                per_day: daily_expense,
                total_days: nights,
                total: daily_expense * nights_f,
            },
        }
    }

    /// Grand total across flight, lodging and daily spend
    #[must_use]
    pub fn total(&self) -> f64 {
        self.flight + self.hotel.total + self.daily_expenses.total
    }
}
