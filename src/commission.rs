const DEFAULT_COMMISSION: f64 = 0.05;

/// Commission an exchange takes from net winnings on a lay bet.
pub fn commission_for(exchange: &str) -> f64 {
    match exchange.to_ascii_lowercase().as_str() {
        "betfair" => 0.02,
        "matchbook" => 0.02,
        "smarkets" => 0.0,
        _ => DEFAULT_COMMISSION,
    }
}
