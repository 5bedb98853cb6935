use lazy_static::lazy_static;
use regex::Regex;

// Parse "<amount> <token>" from command arguments, e.g. "1.5 NEL"
pub fn parse_amount_and_token(input: &str) -> Option<(&str, &str)> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^(\d+(?:\.\d+)?)\s+(\w+)$").unwrap();
    }

    RE.captures(input.trim()).and_then(|cap| {
        let amount = cap.get(1)?.as_str();
        let token = cap.get(2)?.as_str();
        Some((amount, token))
    })
}
