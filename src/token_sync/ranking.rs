use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::warn;

use super::{ExplorerToken, RankedToken};

const ERC20_TYPE: &str = "ERC-20";

/// Reduces the raw aggregated listing to the ranked top-N window: ERC-20
/// records with a known price and market cap, sorted by cap descending.
/// Ties keep their upstream order. The cap is compared as a decimal, not a
/// float, so very large caps rank correctly.
pub fn filter_and_rank(raw: Vec<ExplorerToken>, top_n: usize) -> Vec<RankedToken> {
    let mut ranked: Vec<RankedToken> = raw
        .into_iter()
        .filter_map(|token| {
            if token.token_type != ERC20_TYPE {
                return None;
            }
            token.exchange_rate.as_ref()?;
            let cap = token.circulating_market_cap.as_deref()?;
            match cap.parse::<Decimal>() {
                Ok(market_cap) => Some(RankedToken { market_cap, token }),
                Err(e) => {
                    warn!(
                        "Skipping token {} with unparseable market cap: {}",
                        token.address, e
                    );
                    None
                }
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.market_cap.cmp(&a.market_cap));
    ranked.truncate(top_n);
    ranked
}

/// Deterministic last-write-wins merge by address, applied before persistence.
/// A duplicate keeps the rank slot of its first occurrence but carries the
/// data of its last one.
pub fn merge_by_address(ranked: Vec<RankedToken>) -> Vec<RankedToken> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<RankedToken> = Vec::with_capacity(ranked.len());

    for token in ranked {
        match slots.get(&token.token.address) {
            Some(&slot) => merged[slot] = token,
            None => {
                slots.insert(token.token.address.clone(), merged.len());
                merged.push(token);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(
        address: &str,
        token_type: &str,
        cap: Option<&str>,
        price: Option<&str>,
    ) -> ExplorerToken {
        ExplorerToken {
            address: address.to_string(),
            circulating_market_cap: cap.map(String::from),
            decimals: Some("18".to_string()),
            exchange_rate: price.map(String::from),
            holders: Some("10".to_string()),
            icon_url: None,
            name: Some(format!("Token {}", address)),
            symbol: Some("TKN".to_string()),
            total_supply: Some("1000".to_string()),
            token_type: token_type.to_string(),
        }
    }

    #[test]
    fn keeps_only_priced_erc20_records_with_a_cap() {
        let input = vec![
            raw("0xA", "ERC-20", Some("1000"), Some("1")),
            raw("0xB", "ERC-20", None, Some("1")),
            raw("0xC", "ERC-721", Some("500"), Some("2")),
        ];

        let ranked = filter_and_rank(input, 100);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].token.address, "0xA");
    }

    #[test]
    fn records_without_a_price_are_excluded() {
        let input = vec![raw("0xA", "ERC-20", Some("1000"), None)];
        assert!(filter_and_rank(input, 100).is_empty());
    }

    #[test]
    fn sorts_descending_and_truncates_to_the_window() {
        let input: Vec<ExplorerToken> = (0..120)
            .map(|i| {
                raw(
                    &format!("0x{:03}", i),
                    "ERC-20",
                    Some(&format!("{}", i + 1)),
                    Some("1"),
                )
            })
            .collect();

        let ranked = filter_and_rank(input, 100);
        assert_eq!(ranked.len(), 100);
        assert_eq!(ranked[0].token.address, "0x119");
        for pair in ranked.windows(2) {
            assert!(pair[0].market_cap >= pair[1].market_cap);
        }
        // the 20 smallest caps fell off the window
        assert_eq!(ranked[99].market_cap, Decimal::from(21));
    }

    #[test]
    fn large_caps_do_not_lose_precision() {
        // distinct at a magnitude where f64 comparison would tie
        let input = vec![
            raw("0xSMALL", "ERC-20", Some("123456789123456789123456788"), Some("1")),
            raw("0xBIG", "ERC-20", Some("123456789123456789123456789"), Some("1")),
        ];

        let ranked = filter_and_rank(input, 100);
        assert_eq!(ranked[0].token.address, "0xBIG");
    }

    #[test]
    fn equal_caps_preserve_upstream_order() {
        let input = vec![
            raw("0xFIRST", "ERC-20", Some("500"), Some("1")),
            raw("0xSECOND", "ERC-20", Some("500"), Some("1")),
            raw("0xTOP", "ERC-20", Some("900"), Some("1")),
        ];

        let ranked = filter_and_rank(input, 100);
        let addresses: Vec<&str> = ranked.iter().map(|r| r.token.address.as_str()).collect();
        assert_eq!(addresses, vec!["0xTOP", "0xFIRST", "0xSECOND"]);
    }

    #[test]
    fn unparseable_cap_is_excluded_not_fatal() {
        let input = vec![
            raw("0xGOOD", "ERC-20", Some("100"), Some("1")),
            raw("0xBAD", "ERC-20", Some("not-a-number"), Some("1")),
        ];

        let ranked = filter_and_rank(input, 100);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].token.address, "0xGOOD");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(filter_and_rank(Vec::new(), 100).is_empty());
    }

    #[test]
    fn merge_keeps_the_last_write_in_the_first_slot() {
        let ranked = filter_and_rank(
            vec![
                raw("0xDUP", "ERC-20", Some("900"), Some("1")),
                raw("0xOTHER", "ERC-20", Some("800"), Some("1")),
                raw("0xDUP", "ERC-20", Some("700"), Some("2")),
            ],
            100,
        );

        let merged = merge_by_address(ranked);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].token.address, "0xDUP");
        // last write wins: the later record's data replaced the first
        assert_eq!(merged[0].market_cap, Decimal::from(700));
        assert_eq!(merged[0].token.exchange_rate.as_deref(), Some("2"));
        assert_eq!(merged[1].token.address, "0xOTHER");
    }
}
