//! Win streaks

/// Longest run of consecutive wins in a chronologically ordered sequence
pub fn longest_win_streak<I>(outcomes: I) -> usize
where
    I: IntoIterator<Item = bool>,
{
    let mut best = 0;
    let mut current = 0;

    for won in outcomes {
        if won {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }

    best
}
