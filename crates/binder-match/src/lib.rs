//! Auction matcher (C7): ε-scaling bipartite matching over a dense score
//! matrix, used by the document-diff algorithm to pair old and new
//! relation-list elements before computing `insert`/`remove` mutations.

///
/// AuctionOptions
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AuctionOptions {
    pub epsilon: f64,
    pub threshold: f64,
}

impl Default for AuctionOptions {
    fn default() -> Self {
        Self { epsilon: 0.01, threshold: 0.0 }
    }
}

///
/// Assignment
///
/// The result of running the auction: matched bidder/item pairs plus
/// whichever bidders or items were left unassigned.
///

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub pairs: Vec<(usize, usize)>,
    pub unassigned_bidders: Vec<usize>,
    pub unassigned_items: Vec<usize>,
}

/// Run the Bertsekas auction algorithm over `scores[bidder][item]`.
///
/// Terminates because every won bid raises the winning item's price by at
/// least `epsilon`, and a bidder can only ever re-bid on an item whose
/// price has strictly increased since their last bid on it — so for fixed
/// `epsilon > 0` and finite bidders/items, total price growth is bounded
/// and the loop cannot run forever.
#[must_use]
pub fn auction(scores: &[Vec<f64>], options: AuctionOptions) -> Assignment {
    let num_bidders = scores.len();
    let num_items = scores.first().map_or(0, Vec::len);

    if num_bidders == 0 || num_items == 0 {
        return Assignment {
            pairs: Vec::new(),
            unassigned_bidders: (0..num_bidders).collect(),
            unassigned_items: (0..num_items).collect(),
        };
    }

    let mut prices = vec![0.0_f64; num_items];
    let mut owner_of_item: Vec<Option<usize>> = vec![None; num_items];
    let mut item_of_bidder: Vec<Option<usize>> = vec![None; num_bidders];
    let mut permanently_unassigned = vec![false; num_bidders];

    loop {
        let Some(bidder) = (0..num_bidders).find(|&i| item_of_bidder[i].is_none() && !permanently_unassigned[i]) else {
            break;
        };

        let (best_item, best_value, second_value) = best_and_second_best(&scores[bidder], &prices, options.threshold);

        if best_value < options.threshold {
            permanently_unassigned[bidder] = true;
            tracing::trace!(bidder, "permanently unassigned: best value below threshold");
            continue;
        }

        if let Some(previous_owner) = owner_of_item[best_item] {
            item_of_bidder[previous_owner] = None;
        }
        owner_of_item[best_item] = Some(bidder);
        item_of_bidder[bidder] = Some(best_item);
        prices[best_item] += (best_value - second_value) + options.epsilon;
    }

    let pairs = item_of_bidder
        .iter()
        .enumerate()
        .filter_map(|(bidder, item)| item.map(|item| (bidder, item)))
        .collect();
    let unassigned_bidders = (0..num_bidders).filter(|&i| item_of_bidder[i].is_none()).collect();
    let unassigned_items = (0..num_items).filter(|&j| owner_of_item[j].is_none()).collect();

    Assignment { pairs, unassigned_bidders, unassigned_items }
}

/// The best and second-best `score - price` values for one bidder, with
/// ties broken toward the lowest item index. When there is only one item,
/// the second-best is clamped to `threshold` rather than left at `-inf`.
fn best_and_second_best(row: &[f64], prices: &[f64], threshold: f64) -> (usize, f64, f64) {
    let mut best_item = 0;
    let mut best_value = f64::NEG_INFINITY;
    let mut second_value = f64::NEG_INFINITY;

    for (item, &score) in row.iter().enumerate() {
        let value = score - prices[item];
        if value > best_value {
            second_value = best_value;
            best_value = value;
            best_item = item;
        } else if value > second_value {
            second_value = value;
        }
    }

    if second_value == f64::NEG_INFINITY {
        second_value = threshold;
    }

    (best_item, best_value, second_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matrix_yields_empty_assignment() {
        let assignment = auction(&[], AuctionOptions::default());
        assert!(assignment.pairs.is_empty());
        assert!(assignment.unassigned_bidders.is_empty());
        assert!(assignment.unassigned_items.is_empty());
    }

    #[test]
    fn symmetric_2x2_with_clear_winner_yields_diagonal() {
        let scores = vec![vec![10.0, 0.0], vec![0.0, 10.0]];
        let assignment = auction(&scores, AuctionOptions::default());
        let mut pairs = assignment.pairs;
        pairs.sort_unstable();
        assert_eq!(pairs, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn asymmetric_backup_case_avoids_greedy_trap() {
        let scores = vec![vec![0.9, 0.1], vec![0.91, 0.89]];
        let assignment = auction(&scores, AuctionOptions::default());
        let mut pairs = assignment.pairs;
        pairs.sort_unstable();
        assert_eq!(pairs, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn scores_below_threshold_yield_empty_assignment() {
        let scores = vec![vec![-5.0, -5.0], vec![-5.0, -5.0]];
        let assignment = auction(&scores, AuctionOptions { epsilon: 0.01, threshold: 0.0 });
        assert!(assignment.pairs.is_empty());
        assert_eq!(assignment.unassigned_bidders, vec![0, 1]);
        assert_eq!(assignment.unassigned_items, vec![0, 1]);
    }

    #[test]
    fn rectangular_matrix_leaves_extra_bidders_unassigned() {
        let scores = vec![vec![5.0], vec![4.0]];
        let assignment = auction(&scores, AuctionOptions::default());
        assert_eq!(assignment.pairs.len(), 1);
        assert_eq!(assignment.unassigned_bidders.len(), 1);
        assert!(assignment.unassigned_items.is_empty());
    }

    #[test]
    fn ties_resolve_to_lowest_item_index() {
        let scores = vec![vec![5.0, 5.0, 5.0]];
        let assignment = auction(&scores, AuctionOptions::default());
        assert_eq!(assignment.pairs, vec![(0, 0)]);
    }
}
