use lotobot_engine::errors::CardError;
use lotobot_engine::rules::{card_wins, parse_card, FULL_CARD, NUMBER_MAX};
use std::collections::BTreeSet;

fn tokens_of(values: &[i64]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn generated_valid_cards_are_accepted() {
    // Deterministic spread of valid 5-number cards across the full range.
    for base in 0..19 {
        let values: Vec<i64> = (0..FULL_CARD as i64).map(|i| base * 5 + i + 1).collect();
        let card = parse_card(&tokens_of(&values), FULL_CARD).expect("valid card accepted");
        assert_eq!(card.len(), FULL_CARD);
    }
}

#[test]
fn mutating_any_value_out_of_range_flips_to_reject() {
    let values = [4_i64, 23, 56, 78, 90];
    for position in 0..values.len() {
        for bad in [0_i64, 101, -3] {
            let mut mutated = values;
            mutated[position] = bad;
            let err = parse_card(&tokens_of(&mutated), FULL_CARD).unwrap_err();
            assert_eq!(err, CardError::OutOfRange(bad));
        }
    }
}

#[test]
fn duplicating_any_value_flips_to_reject() {
    let values = [4_i64, 23, 56, 78, 90];
    for position in 1..values.len() {
        let mut mutated = values;
        mutated[position] = values[0];
        let err = parse_card(&tokens_of(&mutated), FULL_CARD).unwrap_err();
        assert_eq!(err, CardError::Duplicate(values[0] as u8));
    }
}

#[test]
fn win_verdict_matches_subset_relation_for_every_card() {
    let drawn: BTreeSet<u8> = [3, 14, 15, 92, 65, 35, 89, 79, 32, 38]
        .into_iter()
        .collect();

    for start in 1..=(NUMBER_MAX - 4) {
        let card: Vec<u8> = (start..start + 5).collect();
        let expected = card.iter().all(|n| drawn.contains(n));
        assert_eq!(card_wins(&card, &drawn), expected);
    }
}
