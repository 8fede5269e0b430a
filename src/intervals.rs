// Interval Aggregator - producers with the smallest and largest win gaps
//
// Reads every winning prize through the repository, folds the win years per
// producer and keeps every producer sitting on the global minimum and the
// global maximum interval.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error};

use crate::repository::{PrizeRecord, PrizeRepository};

// ============================================================================
// POLICY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntervalPolicy {
    /// Two-slot window per producer, reordered by every new win (`WinWindow`)
    #[default]
    RollingPair,

    /// Full sorted win history; every gap between consecutive wins counts
    ConsecutiveWins,
}

// ============================================================================
// RESULT SHAPE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerInterval {
    pub producer: String,
    pub interval: i32,
    pub previous_win: i32,
    pub following_win: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeIntervals {
    pub min: Vec<ProducerInterval>,
    pub max: Vec<ProducerInterval>,
}

impl PrizeIntervals {
    pub fn is_empty(&self) -> bool {
        self.min.is_empty() && self.max.is_empty()
    }
}

// ============================================================================
// ROLLING WINDOW ACCUMULATOR
// ============================================================================

/// Per-producer accumulator for `IntervalPolicy::RollingPair`.
///
/// Only two win years are kept. The first update orders the seed year and the
/// new year. Every later year `y` is compared with `previous_win`: when
/// `previous_win >= y` the pair becomes `(y, previous_win)`, otherwise
/// `(following_win, y)`. With out-of-order input the pair can end up
/// descending and the interval negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinWindow {
    pub producer: String,
    seed: i32,
    pub previous_win: Option<i32>,
    pub following_win: Option<i32>,
}

impl WinWindow {
    pub fn new(producer: &str, year: i32) -> Self {
        WinWindow {
            producer: producer.to_string(),
            seed: year,
            previous_win: None,
            following_win: None,
        }
    }

    pub fn update(&mut self, year: i32) {
        let (previous, following) = match (self.previous_win, self.following_win) {
            (Some(previous), Some(following)) => {
                if previous >= year {
                    (year, previous)
                } else {
                    (following, year)
                }
            }
            _ => {
                if self.seed >= year {
                    (year, self.seed)
                } else {
                    (self.seed, year)
                }
            }
        };

        self.previous_win = Some(previous);
        self.following_win = Some(following);
    }

    /// Defined once the producer has at least two wins
    pub fn interval(&self) -> Option<i32> {
        Some(self.following_win? - self.previous_win?)
    }

    pub fn to_interval(&self) -> Option<ProducerInterval> {
        Some(ProducerInterval {
            producer: self.producer.clone(),
            interval: self.interval()?,
            previous_win: self.previous_win?,
            following_win: self.following_win?,
        })
    }
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Candidate intervals in producer encounter order
pub fn collect_intervals(winners: &[PrizeRecord], policy: IntervalPolicy) -> Vec<ProducerInterval> {
    match policy {
        IntervalPolicy::RollingPair => rolling_pair_intervals(winners),
        IntervalPolicy::ConsecutiveWins => consecutive_win_intervals(winners),
    }
}

fn rolling_pair_intervals(winners: &[PrizeRecord]) -> Vec<ProducerInterval> {
    let mut windows: Vec<WinWindow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in winners {
        match index.get(record.producer_name.as_str()) {
            Some(&slot) => windows[slot].update(record.year),
            None => {
                index.insert(&record.producer_name, windows.len());
                windows.push(WinWindow::new(&record.producer_name, record.year));
            }
        }
    }

    windows.iter().filter_map(WinWindow::to_interval).collect()
}

fn consecutive_win_intervals(winners: &[PrizeRecord]) -> Vec<ProducerInterval> {
    let mut histories: Vec<(&str, Vec<i32>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in winners {
        let producer = record.producer_name.as_str();
        let slot = *index.entry(producer).or_insert_with(|| {
            histories.push((producer, Vec::new()));
            histories.len() - 1
        });
        histories[slot].1.push(record.year);
    }

    let mut intervals = Vec::new();
    for (producer, mut years) in histories {
        years.sort_unstable();
        for pair in years.windows(2) {
            intervals.push(ProducerInterval {
                producer: producer.to_string(),
                interval: pair[1] - pair[0],
                previous_win: pair[0],
                following_win: pair[1],
            });
        }
    }

    intervals
}

/// Keep the candidates on the minimum and on the maximum interval, each group
/// sorted by `previous_win` (stable, so ties keep encounter order).
pub fn select_extremes(candidates: Vec<ProducerInterval>) -> PrizeIntervals {
    let (Some(min), Some(max)) = (
        candidates.iter().map(|c| c.interval).min(),
        candidates.iter().map(|c| c.interval).max(),
    ) else {
        return PrizeIntervals::default();
    };

    let group = |value: i32| -> Vec<ProducerInterval> {
        let mut members: Vec<ProducerInterval> = candidates
            .iter()
            .filter(|c| c.interval == value)
            .cloned()
            .collect();
        members.sort_by_key(|c| c.previous_win);
        members
    };

    PrizeIntervals {
        min: group(min),
        max: group(max),
    }
}

pub fn compute_extreme_intervals<R: PrizeRepository + ?Sized>(
    repo: &R,
    policy: IntervalPolicy,
) -> Result<PrizeIntervals> {
    let winners = repo
        .all_winners()
        .context("Failed to read winning prizes")?;

    let candidates = collect_intervals(&winners, policy);
    debug!(
        winners = winners.len(),
        candidates = candidates.len(),
        ?policy,
        "folded win intervals"
    );

    Ok(select_extremes(candidates))
}

// ============================================================================
// REPORT (never fails)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalReport {
    pub status: ReportStatus,
    pub message: String,
    pub intervals: PrizeIntervals,
}

impl IntervalReport {
    pub fn is_ok(&self) -> bool {
        self.status == ReportStatus::Ok
    }
}

/// Aggregate and convert any fault into an `ReportStatus::Error` report
pub fn show_prize_intervals<R: PrizeRepository + ?Sized>(
    repo: &R,
    policy: IntervalPolicy,
) -> IntervalReport {
    match compute_extreme_intervals(repo, policy) {
        Ok(intervals) => IntervalReport {
            status: ReportStatus::Ok,
            message: "Prize intervals retrieved successfully".to_string(),
            intervals,
        },
        Err(e) => {
            error!(error = %format!("{:#}", e), "prize interval aggregation failed");
            IntervalReport {
                status: ReportStatus::Error,
                message: "An unexpected error has occurred when it was retrieving prize intervals data."
                    .to_string(),
                intervals: PrizeIntervals::default(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryPrizeRepository, MovieInput};
    use anyhow::anyhow;

    fn wins(entries: &[(&str, i32)]) -> Vec<PrizeRecord> {
        entries
            .iter()
            .enumerate()
            .map(|(i, (producer, year))| PrizeRecord {
                id: i as i64 + 1,
                year: *year,
                movie_name: format!("Movie {}", i),
                producer_name: producer.to_string(),
                studio_name: "Studio".to_string(),
                winner: true,
            })
            .collect()
    }

    fn interval(producer: &str, interval: i32, previous: i32, following: i32) -> ProducerInterval {
        ProducerInterval {
            producer: producer.to_string(),
            interval,
            previous_win: previous,
            following_win: following,
        }
    }

    fn rolling(entries: &[(&str, i32)]) -> PrizeIntervals {
        select_extremes(collect_intervals(&wins(entries), IntervalPolicy::RollingPair))
    }

    // ------------------------------------------------------------------------
    // WinWindow
    // ------------------------------------------------------------------------

    #[test]
    fn test_window_needs_two_wins() {
        let window = WinWindow::new("Bo Derek", 1984);

        assert_eq!(window.interval(), None);
        assert_eq!(window.to_interval(), None);
    }

    #[test]
    fn test_window_orders_first_pair() {
        let mut window = WinWindow::new("Bo Derek", 1990);
        window.update(1984);

        assert_eq!(window.previous_win, Some(1984));
        assert_eq!(window.following_win, Some(1990));
        assert_eq!(window.interval(), Some(6));
    }

    #[test]
    fn test_window_slides_forward() {
        let mut window = WinWindow::new("Matthew Vaughn", 1980);
        window.update(1990);
        window.update(1991);

        assert_eq!((window.previous_win, window.following_win), (Some(1990), Some(1991)));
        assert_eq!(window.interval(), Some(1));
    }

    #[test]
    fn test_window_with_descending_input() {
        let mut window = WinWindow::new("Matthew Vaughn", 1991);
        window.update(1990);
        window.update(1980);

        assert_eq!((window.previous_win, window.following_win), (Some(1980), Some(1990)));
        assert_eq!(window.interval(), Some(10));
    }

    #[test]
    fn test_window_out_of_order_can_go_negative() {
        let mut window = WinWindow::new("Joel Silver", 2000);
        window.update(2010);
        window.update(2005);

        assert_eq!((window.previous_win, window.following_win), (Some(2010), Some(2005)));
        assert_eq!(window.interval(), Some(-5));
    }

    // ------------------------------------------------------------------------
    // Extremes
    // ------------------------------------------------------------------------

    #[test]
    fn test_single_multi_win_producer_is_min_and_max() {
        let result = rolling(&[
            ("Allan Carr", 1980),
            ("Bo Derek", 1984),
            ("Jerry Weintraub", 1985),
            ("Bo Derek", 1990),
        ]);

        let expected = vec![interval("Bo Derek", 6, 1984, 1990)];
        assert_eq!(result.min, expected);
        assert_eq!(result.max, expected);
    }

    #[test]
    fn test_min_and_max_groups() {
        let result = rolling(&[
            ("Bo Derek", 1984),
            ("Matthew Vaughn", 2002),
            ("Bo Derek", 1990),
            ("Joel Silver", 1990),
            ("Joel Silver", 1991),
            ("Matthew Vaughn", 2015),
        ]);

        assert_eq!(result.min, vec![interval("Joel Silver", 1, 1990, 1991)]);
        assert_eq!(result.max, vec![interval("Matthew Vaughn", 13, 2002, 2015)]);
    }

    #[test]
    fn test_ties_sorted_by_previous_win() {
        let result = rolling(&[
            ("Late", 2000),
            ("Late", 2001),
            ("Early", 1980),
            ("Early", 1981),
            ("Wide", 1980),
            ("Wide", 2000),
        ]);

        let producers: Vec<&str> = result.min.iter().map(|p| p.producer.as_str()).collect();
        assert_eq!(producers, vec!["Early", "Late"]);
        assert_eq!(result.max, vec![interval("Wide", 20, 1980, 2000)]);
    }

    #[test]
    fn test_equal_previous_win_keeps_encounter_order() {
        let result = rolling(&[("B", 1990), ("A", 1990), ("B", 1995), ("A", 1995)]);

        let producers: Vec<&str> = result.min.iter().map(|p| p.producer.as_str()).collect();
        assert_eq!(producers, vec!["B", "A"]);
        assert_eq!(result.min, result.max);
    }

    #[test]
    fn test_no_multi_win_producer_is_empty() {
        let result = rolling(&[("Allan Carr", 1980), ("Bo Derek", 1984)]);

        assert!(result.is_empty());
        assert!(rolling(&[]).is_empty());
    }

    #[test]
    fn test_every_interval_between_min_and_max() {
        let entries = [
            ("A", 1980),
            ("B", 1981),
            ("A", 1985),
            ("C", 1986),
            ("B", 1999),
            ("C", 1987),
            ("D", 2001),
            ("D", 2003),
        ];

        for policy in [IntervalPolicy::RollingPair, IntervalPolicy::ConsecutiveWins] {
            let candidates = collect_intervals(&wins(&entries), policy);
            let result = select_extremes(candidates.clone());
            let min = result.min[0].interval;
            let max = result.max[0].interval;

            assert!(candidates.iter().all(|c| min <= c.interval && c.interval <= max));
            assert!(result.min.iter().all(|c| c.interval == min));
            assert!(result.max.iter().all(|c| c.interval == max));
        }
    }

    // ------------------------------------------------------------------------
    // Consecutive wins policy
    // ------------------------------------------------------------------------

    #[test]
    fn test_consecutive_wins_uses_full_history() {
        let entries = [("Joel Silver", 2000), ("Joel Silver", 2010), ("Joel Silver", 2005)];

        let rolling_result = rolling(&entries);
        assert_eq!(rolling_result.min[0].interval, -5);

        let result = select_extremes(collect_intervals(
            &wins(&entries),
            IntervalPolicy::ConsecutiveWins,
        ));

        assert_eq!(
            result.min,
            vec![
                interval("Joel Silver", 5, 2000, 2005),
                interval("Joel Silver", 5, 2005, 2010),
            ]
        );
        assert_eq!(result.min, result.max);
    }

    #[test]
    fn test_consecutive_wins_same_year_twice() {
        let result = select_extremes(collect_intervals(
            &wins(&[("Bo Derek", 1984), ("Bo Derek", 1984), ("Bo Derek", 1990)]),
            IntervalPolicy::ConsecutiveWins,
        ));

        assert_eq!(result.min, vec![interval("Bo Derek", 0, 1984, 1984)]);
        assert_eq!(result.max, vec![interval("Bo Derek", 6, 1984, 1990)]);
    }

    // ------------------------------------------------------------------------
    // Repository-backed
    // ------------------------------------------------------------------------

    struct BrokenRepository;

    impl PrizeRepository for BrokenRepository {
        fn create(&mut self, _year: i32, _movie: &MovieInput, _winner: bool) -> Result<()> {
            Err(anyhow!("connection lost"))
        }

        fn all_winners(&self) -> Result<Vec<PrizeRecord>> {
            Err(anyhow!("connection lost"))
        }

        fn delete_all(&mut self) -> Result<()> {
            Err(anyhow!("connection lost"))
        }
    }

    #[test]
    fn test_compute_from_repository_ignores_losers() {
        let mut repo = InMemoryPrizeRepository::new();
        let movie = |name: &str, producer: &str| MovieInput {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            producer_name: producer.to_string(),
            studio_name: "Studio".to_string(),
        };

        repo.create(1984, &movie("Bolero", "Bo Derek"), true).unwrap();
        repo.create(1986, &movie("Tarzan", "Bo Derek"), false).unwrap();
        repo.create(1990, &movie("Ghosts Can't Do It", "Bo Derek"), true)
            .unwrap();

        let result = compute_extreme_intervals(&repo, IntervalPolicy::RollingPair).unwrap();

        assert_eq!(result.min, vec![interval("Bo Derek", 6, 1984, 1990)]);
    }

    #[test]
    fn test_report_converts_failure() {
        let report = show_prize_intervals(&BrokenRepository, IntervalPolicy::RollingPair);

        assert_eq!(report.status, ReportStatus::Error);
        assert!(report.intervals.is_empty());
    }

    #[test]
    fn test_report_ok_on_empty_store() {
        let report = show_prize_intervals(&InMemoryPrizeRepository::new(), IntervalPolicy::RollingPair);

        assert!(report.is_ok());
        assert!(report.intervals.is_empty());
    }

    #[test]
    fn test_response_shape() {
        let json = serde_json::to_value(PrizeIntervals {
            min: vec![interval("Bo Derek", 6, 1984, 1990)],
            max: vec![],
        })
        .unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "min": [{"producer": "Bo Derek", "interval": 6, "previousWin": 1984, "followingWin": 1990}],
                "max": []
            })
        );
    }
}
