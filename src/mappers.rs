//! Display labels for currencies and review ratings.

use crate::models::{Currency, Rating};

/// Symbol shown in front of a salary
pub fn salary_mapper(currency: Currency) -> &'static str {
    match currency {
        Currency::Gbp => "£",
        Currency::Usd => "$",
        Currency::Eur => "€",
        Currency::Jpy => "JPY (¥)",
        Currency::Cny => "CNY (¥)",
    }
}

/// Label shown for a review's overall rating
pub fn ratings_mapper(rating: Rating) -> &'static str {
    match rating {
        Rating::Good => "Good",
        Rating::Average => "Meh",
        Rating::Bad => "Rat-race",
    }
}

/// Same as [`salary_mapper`], keyed by the backend key (`"GBP"`)
pub fn salary_mapper_key(key: &str) -> Option<&'static str> {
    Currency::from_key(key).map(salary_mapper)
}

/// Same as [`ratings_mapper`], keyed by the backend key (`"GOOD"`)
pub fn ratings_mapper_key(key: &str) -> Option<&'static str> {
    Rating::from_key(key).map(ratings_mapper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salary_symbols() {
        assert_eq!(salary_mapper(Currency::Gbp), "£");
        assert_eq!(salary_mapper(Currency::Usd), "$");
        assert_eq!(salary_mapper(Currency::Eur), "€");
        assert_eq!(salary_mapper(Currency::Jpy), "JPY (¥)");
        assert_eq!(salary_mapper(Currency::Cny), "CNY (¥)");
    }

    #[test]
    fn test_rating_labels() {
        assert_eq!(ratings_mapper(Rating::Good), "Good");
        assert_eq!(ratings_mapper(Rating::Average), "Meh");
        assert_eq!(ratings_mapper(Rating::Bad), "Rat-race");
    }

    #[test]
    fn test_key_variants() {
        assert_eq!(salary_mapper_key("gbp"), Some("£"));
        assert_eq!(ratings_mapper_key("BAD"), Some("Rat-race"));
        assert_eq!(salary_mapper_key("BTC"), None);
        assert_eq!(ratings_mapper_key(""), None);
    }
}
