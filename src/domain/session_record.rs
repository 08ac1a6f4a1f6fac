//! Financial aggregation and archived sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EntityId, Money, Player};

/// Frozen financial totals of a closed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Sum of buy-ins and rebuys.
    pub total_in: Money,
    /// Sum of cash-outs.
    pub total_out: Money,
    /// `total_in - total_out`.
    pub balance: Money,
    /// Number of player records, playing and finished.
    pub player_count: u32,
}

impl SessionSummary {
    /// Aggregates over every player record.
    #[must_use]
    pub fn from_players(players: &[Player]) -> Self {
        let total_in: Money = players.iter().map(Player::invested).sum();
        let total_out: Money = players.iter().map(|p| p.cash_out).sum();
        Self {
            total_in,
            total_out,
            balance: total_in - total_out,
            player_count: u32::try_from(players.len()).unwrap_or(u32::MAX),
        }
    }
}

/// An archived session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionRecord {
    /// Creation-time id.
    pub id: EntityId,
    /// When the session was closed.
    pub date: DateTime<Utc>,
    /// Totals captured at close time.
    pub summary: SessionSummary,
}

/// Live dashboard numbers.
///
/// Field names follow the labels of the stats bar: "Jogando" is
/// `active_count`, "Na Mesa" is `total_invested`, "Saíram" is
/// `finished_count` and "Balanço" is `balance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TableStats {
    /// Players still at the table.
    pub active_count: u32,
    /// Players that checked out.
    pub finished_count: u32,
    /// Buy-ins plus rebuys over all records.
    pub total_invested: Money,
    /// Cash-outs over all records.
    pub total_cash_out: Money,
    /// `total_invested - total_cash_out`.
    pub balance: Money,
    /// Occupied table positions.
    pub seated_count: u32,
}

impl TableStats {
    /// Computes the dashboard from the player list and the occupied seat
    /// count.
    #[must_use]
    pub fn compute(players: &[Player], seated: usize) -> Self {
        let summary = SessionSummary::from_players(players);
        let count = |pred: fn(&Player) -> bool| {
            u32::try_from(players.iter().filter(|p| pred(p)).count()).unwrap_or(u32::MAX)
        };
        Self {
            active_count: count(Player::is_playing),
            finished_count: count(Player::is_finished),
            total_invested: summary.total_in,
            total_cash_out: summary.total_out,
            balance: summary.balance,
            seated_count: u32::try_from(seated).unwrap_or(u32::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: i64, buy_in: i64, rebuy: i64, cash_out: Option<i64>) -> Player {
        let mut p = Player::new(
            EntityId::new(id),
            format!("p{id}"),
            Money::from_reais(buy_in),
            None,
            false,
            Utc::now(),
        );
        p.rebuy = Money::from_reais(rebuy);
        if let Some(out) = cash_out {
            p.check_out(Money::from_reais(out), Utc::now());
        }
        p
    }

    #[test]
    fn aggregates_invested_and_cashed_out() {
        let players = vec![player(1, 100, 20, Some(150)), player(2, 50, 0, None)];
        let summary = SessionSummary::from_players(&players);
        assert_eq!(summary.total_in, Money::from_reais(170));
        assert_eq!(summary.total_out, Money::from_reais(150));
        assert_eq!(summary.balance, Money::from_reais(20));
        assert_eq!(summary.player_count, 2);
    }

    #[test]
    fn stats_split_active_and_finished() {
        let players = vec![player(1, 100, 20, Some(150)), player(2, 50, 0, None)];
        let stats = TableStats::compute(&players, 1);
        assert_eq!(stats.active_count, 1);
        assert_eq!(stats.finished_count, 1);
        assert_eq!(stats.total_invested, Money::from_reais(170));
        assert_eq!(stats.balance, Money::from_reais(20));
        assert_eq!(stats.seated_count, 1);
    }

    #[test]
    fn empty_table_is_all_zero() {
        let stats = TableStats::compute(&[], 0);
        assert_eq!(stats.active_count, 0);
        assert_eq!(stats.total_invested, Money::ZERO);
        assert_eq!(stats.balance, Money::ZERO);
    }
}
