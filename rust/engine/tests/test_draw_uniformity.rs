use lotobot_engine::draw::Drum;

/// Chi-square goodness-of-fit for the roulette index over a small N.
///
/// With 10 bins and 20_000 seeded draws the statistic is deterministic;
/// 27.88 is the 99.9% critical value for 9 degrees of freedom.
#[test]
fn roulette_index_is_uniform_over_small_n() {
    const PARTICIPANTS: usize = 10;
    const TRIALS: usize = 20_000;

    let mut drum = Drum::new(Some(0xB1A5));
    let mut counts = [0_usize; PARTICIPANTS];
    for _ in 0..TRIALS {
        let index = drum.roulette_index(PARTICIPANTS);
        counts[index - 1] += 1;
    }

    let expected = TRIALS as f64 / PARTICIPANTS as f64;
    let chi_square: f64 = counts
        .iter()
        .map(|&observed| {
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum();

    assert!(
        chi_square < 27.88,
        "chi-square {} exceeds the 99.9% critical value",
        chi_square
    );
}

#[test]
fn every_number_is_eventually_called() {
    let mut drum = Drum::new(Some(99));
    let mut seen = [false; 100];
    for _ in 0..2_000 {
        for number in drum.bingo_row() {
            seen[number as usize - 1] = true;
        }
    }
    assert!(seen.iter().all(|&called| called));
}
